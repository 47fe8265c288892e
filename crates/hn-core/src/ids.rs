use core::fmt;

/// Identifier of a node or link, assigned by the live model layer.
///
/// The core never allocates these; it only re-indexes them into dense
/// positions for columnar storage (see `hn_graph::IdMapper`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AssetId(u32);

impl AssetId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw integer value, as written into id columns.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for AssetId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({})", self.0)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_id_round_trip_raw() {
        for raw in [0_u32, 1, 2, 42, 10_000, u32::MAX] {
            let id = AssetId::new(raw);
            assert_eq!(id.get(), raw);
            assert_eq!(AssetId::from(raw), id);
        }
    }

    #[test]
    fn asset_id_display() {
        assert_eq!(AssetId::new(7).to_string(), "7");
        assert_eq!(format!("{:?}", AssetId::new(7)), "AssetId(7)");
    }
}
