//! Dense indexing for columnar encoding.
//!
//! Maps sparse asset ids onto contiguous indices `0..N` in first-seen order.

use std::collections::HashMap;

use hn_core::AssetId;

use crate::error::{GraphError, GraphResult};

/// Bidirectional mapping between asset ids and dense indices.
///
/// Indices are handed out in insertion order and never reused, so
/// `ids()[i]` is the id that was assigned index `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMapper {
    /// index -> id
    ids: Vec<AssetId>,
    /// id -> index
    to_idx: HashMap<AssetId, u32>,
}

impl IdMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Vec::with_capacity(capacity),
            to_idx: HashMap::with_capacity(capacity),
        }
    }

    /// Build a mapper whose index `i` is the `i`-th id yielded. Duplicates are rejected.
    pub fn from_ids(ids: impl IntoIterator<Item = AssetId>) -> GraphResult<Self> {
        let iter = ids.into_iter();
        let mut mapper = Self::with_capacity(iter.size_hint().0);
        for id in iter {
            if mapper.to_idx.contains_key(&id) {
                return Err(GraphError::DuplicateId { id });
            }
            mapper.push(id)?;
        }
        Ok(mapper)
    }

    /// Existing index for `id`, or the next free one.
    ///
    /// # Panics
    /// Panics if every `u32` index is already taken. Use
    /// [`try_get_or_assign_idx`](Self::try_get_or_assign_idx) to handle that case.
    pub fn get_or_assign_idx(&mut self, id: AssetId) -> u32 {
        match self.try_get_or_assign_idx(id) {
            Ok(idx) => idx,
            Err(e) => panic!("{}", e),
        }
    }

    /// Like [`get_or_assign_idx`](Self::get_or_assign_idx), but fails instead
    /// of panicking once the index space is exhausted.
    pub fn try_get_or_assign_idx(&mut self, id: AssetId) -> GraphResult<u32> {
        if let Some(&idx) = self.to_idx.get(&id) {
            return Ok(idx);
        }
        self.push(id)
    }

    /// Index for an id that must already be mapped.
    pub fn idx(&self, id: AssetId) -> GraphResult<u32> {
        self.try_idx(id).ok_or(GraphError::IdNotFound { id })
    }

    pub fn try_idx(&self, id: AssetId) -> Option<u32> {
        self.to_idx.get(&id).copied()
    }

    pub fn contains(&self, id: AssetId) -> bool {
        self.to_idx.contains_key(&id)
    }

    /// Id at a dense index.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    pub fn id(&self, index: u32) -> AssetId {
        self.ids[index as usize]
    }

    /// Reverse-lookup table ordered by index.
    pub fn ids(&self) -> &[AssetId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn push(&mut self, id: AssetId) -> GraphResult<u32> {
        let idx = next_index(self.ids.len())?;
        self.ids.push(id);
        self.to_idx.insert(id, idx);
        Ok(idx)
    }
}

fn next_index(len: usize) -> GraphResult<u32> {
    u32::try_from(len).map_err(|_| GraphError::MalformedBuffer {
        what: "id mapper",
        detail: format!("{} ids exceed the u32 index space", len),
    })
}
