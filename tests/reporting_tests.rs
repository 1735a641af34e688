use code2clip::copy::FileStats;
use code2clip::reporting::render_stats;
use code2clip::trie::{Totals, Trie};
use std::path::Path;

fn stats(display_path: &str, lines: usize, bytes: usize) -> FileStats {
    FileStats {
        path: display_path.to_string(),
        display_path: display_path.to_string(),
        lines,
        bytes,
        encoding: "UTF-8",
    }
}

#[test]
fn test_trie_totals() {
    let mut trie = Trie::new();
    trie.insert(Path::new("src/a.rs"), Totals { lines: 3, bytes: 30 });
    trie.insert(Path::new("src/b.rs"), Totals { lines: 2, bytes: 20 });
    trie.insert(Path::new("./README.md"), Totals { lines: 1, bytes: 5 });

    let root = trie.get_root();
    assert_eq!(root.subtree_totals(), Totals { lines: 6, bytes: 55 });
    assert_eq!(
        root.children["src"].subtree_totals(),
        Totals { lines: 5, bytes: 50 }
    );
    assert!(root.children.contains_key("README.md"));
}

#[test]
fn test_render_stats_tree() {
    let rendered = render_stats(&[
        stats("src/main.rs", 10, 100),
        stats("src/util/mod.rs", 4, 40),
        stats("README.md", 2, 12),
    ]);

    let expected = "\
Overall: 3 files, 16 lines, 152 bytes
┣━━ README.md (2 lines, 12 bytes)
┗━━ src/ (14 lines, 140 bytes)
    ┣━━ main.rs (10 lines, 100 bytes)
    ┗━━ util/ (4 lines, 40 bytes)
        ┗━━ mod.rs (4 lines, 40 bytes)
";
    assert_eq!(rendered, expected);
}

#[test]
fn test_render_stats_empty() {
    assert_eq!(render_stats(&[]), "Overall: 0 files, 0 lines, 0 bytes\n");
}
