//! Node and link labels as recorded by the solver.

use std::collections::HashMap;

use crate::layout::ID_LENGTH;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationIds {
    pub node_ids: Vec<String>,
    pub link_ids: Vec<String>,
    node_index: HashMap<String, usize>,
    link_index: HashMap<String, usize>,
}

impl SimulationIds {
    /// Build from labels in solver order. A repeated label maps to its last position.
    pub fn from_labels(node_ids: Vec<String>, link_ids: Vec<String>) -> Self {
        let node_index = index_of(&node_ids);
        let link_index = index_of(&link_ids);
        Self {
            node_ids,
            link_ids,
            node_index,
            link_index,
        }
    }

    /// Parse the fixed-width id sections of the results file.
    pub fn from_sections(node_section: &[u8], link_section: &[u8]) -> Self {
        Self::from_labels(parse_section(node_section), parse_section(link_section))
    }

    pub fn node_index(&self, label: &str) -> Option<usize> {
        self.node_index.get(label).copied()
    }

    pub fn link_index(&self, label: &str) -> Option<usize> {
        self.link_index.get(label).copied()
    }
}

fn index_of(labels: &[String]) -> HashMap<String, usize> {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| (label.clone(), i))
        .collect()
}

fn parse_section(section: &[u8]) -> Vec<String> {
    section
        .chunks(ID_LENGTH as usize)
        .map(|raw| {
            let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
            String::from_utf8_lossy(&raw[..end]).trim().to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padded(label: &str) -> Vec<u8> {
        let mut raw = label.as_bytes().to_vec();
        raw.resize(ID_LENGTH as usize, 0);
        raw
    }

    #[test]
    fn parses_nul_padded_labels() {
        let mut nodes = padded("J1");
        nodes.extend(padded(" T-1 "));
        let mut full = vec![b'x'; ID_LENGTH as usize];
        full[0] = b'L';
        let ids = SimulationIds::from_sections(&nodes, &full);

        assert_eq!(ids.node_ids, vec!["J1".to_string(), "T-1".to_string()]);
        assert_eq!(ids.node_index("T-1"), Some(1));
        assert_eq!(ids.link_ids[0].len(), ID_LENGTH as usize);
        assert_eq!(ids.link_index("missing"), None);
    }
}
