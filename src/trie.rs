use std::collections::BTreeMap;
use std::path::{Component, Path};
use tracing::trace;

/// Line and byte totals for a file or a whole subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub lines: usize,
    pub bytes: usize,
}

impl std::ops::Add for Totals {
    type Output = Totals;

    fn add(self, other: Totals) -> Totals {
        Totals {
            lines: self.lines + other.lines,
            bytes: self.bytes + other.bytes,
        }
    }
}

/// A node in the path trie. Leaves carry the totals of one file.
#[derive(Default)]
pub struct TrieNode {
    pub children: BTreeMap<String, TrieNode>,
    pub totals: Option<Totals>,
}

impl TrieNode {
    /// Totals of this node plus everything below it.
    pub fn subtree_totals(&self) -> Totals {
        self.children
            .values()
            .map(TrieNode::subtree_totals)
            .fold(self.totals.unwrap_or_default(), |acc, t| acc + t)
    }
}

#[derive(Default)]
pub struct Trie {
    root: TrieNode,
}

impl Trie {
    pub fn new() -> Self {
        Trie::default()
    }

    pub fn insert(&mut self, path: &Path, totals: Totals) {
        trace!("Inserting {:?} with {:?}", path, totals);
        let mut current_node = &mut self.root;
        for component in path.components() {
            let name = match component {
                Component::Normal(part) => part.to_string_lossy().into_owned(),
                Component::ParentDir => "..".to_owned(),
                Component::RootDir | Component::Prefix(_) => {
                    component.as_os_str().to_string_lossy().into_owned()
                }
                Component::CurDir => continue,
            };
            current_node = current_node.children.entry(name).or_default();
        }
        if current_node.totals.is_some() {
            trace!("Overwriting existing totals for path: {:?}", path);
        }
        current_node.totals = Some(totals);
    }

    pub fn get_root(&self) -> &TrieNode {
        &self.root
    }
}
