use crate::copy::FileStats;
use crate::trie::{Totals, Trie, TrieNode};
use std::path::Path;
use tracing::debug;

/// Renders the copied files as a tree with per-file and per-directory totals.
pub fn render_stats(stats: &[FileStats]) -> String {
    debug!("Rendering statistics for {} files", stats.len());
    let mut trie = Trie::new();
    for file in stats {
        trie.insert(
            Path::new(&file.display_path),
            Totals {
                lines: file.lines,
                bytes: file.bytes,
            },
        );
    }

    let overall = trie.get_root().subtree_totals();
    let mut out = format!(
        "Overall: {} files, {} lines, {} bytes\n",
        stats.len(),
        overall.lines,
        overall.bytes
    );
    render_tree(trie.get_root(), "", &mut out);
    out
}

fn render_tree(node: &TrieNode, prefix: &str, out: &mut String) {
    let count = node.children.len();
    for (i, (name, child)) in node.children.iter().enumerate() {
        let is_last_child = i + 1 == count;
        let connector = if is_last_child { "┗━━" } else { "┣━━" };

        match child.totals {
            Some(totals) if child.children.is_empty() => {
                out.push_str(&format!(
                    "{}{} {} ({} lines, {} bytes)\n",
                    prefix, connector, name, totals.lines, totals.bytes
                ));
            }
            _ => {
                let totals = child.subtree_totals();
                out.push_str(&format!(
                    "{}{} {}/ ({} lines, {} bytes)\n",
                    prefix, connector, name, totals.lines, totals.bytes
                ));
                let guide = if is_last_child { " " } else { "┃" };
                let new_prefix = format!("{}{}   ", prefix, guide);
                render_tree(child, &new_prefix, out);
            }
        }
    }
}
