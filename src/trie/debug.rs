//! Structural checks for tests and troubleshooting.

use std::collections::HashSet;

use crate::arena::NodeId;
use crate::node::Children;

use super::TrieCore;

impl<V> TrieCore<V> {
    /// Verify tree integrity - returns list of issues found.
    ///
    /// Checks that every child id resolves, that no node is reachable
    /// twice, that no node other than the root is vacant, that child maps
    /// are well formed, and that the live counters agree with what is
    /// reachable.
    pub fn verify_integrity(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut values = 0usize;
        let mut stack: Vec<(NodeId, Vec<u8>)> = vec![(self.root, Vec::new())];

        while let Some((id, path)) = stack.pop() {
            if !seen.insert(id) {
                issues.push(format!("node {:?} reachable more than once", id));
                continue;
            }
            let Some(node) = self.nodes.get(id) else {
                issues.push(format!("dangling child {:?} at path {:?}", id, path));
                continue;
            };

            if node.has_value() {
                values += 1;
            }
            if id != self.root && node.is_vacant() {
                issues.push(format!("vacant node left at path {:?}", path));
            }

            match &node.children {
                Children::Sparse(entries) => {
                    if !entries.windows(2).all(|w| w[0].0 < w[1].0) {
                        issues.push(format!("unsorted sparse children at path {:?}", path));
                    }
                    if entries.len() > self.config.dense_threshold {
                        issues.push(format!(
                            "sparse node with {} children at path {:?} exceeds threshold",
                            entries.len(),
                            path
                        ));
                    }
                }
                Children::Dense { table, len } => {
                    let actual = table.iter().filter(|c| c.is_some()).count();
                    if actual != *len as usize {
                        issues.push(format!(
                            "dense node has {} children but len={} at path {:?}",
                            actual, len, path
                        ));
                    }
                }
            }

            for (byte, child) in node.children.iter() {
                let mut child_path = path.clone();
                child_path.push(byte);
                stack.push((child, child_path));
            }
        }

        if values != self.count {
            issues.push(format!(
                "{} reachable values but len={}",
                values, self.count
            ));
        }
        if seen.len() != self.nodes.live() {
            issues.push(format!(
                "{} reachable nodes but arena holds {} live",
                seen.len(),
                self.nodes.live()
            ));
        }
        issues
    }
}
