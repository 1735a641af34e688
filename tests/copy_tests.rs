mod common;

use code2clip::copy::{concatenate_files, MemorySink, TextSink};
use code2clip::remote::RemoteFs;
use code2clip::template::{Template, TemplatePreset};
use code2clip::{BasicClipboardCopier, ClipError, ClipboardCopier, ClipboardCopierConfig};
use common::FakeRemote;
use std::path::Path;
use tempfile::tempdir;
use tokio::fs;
use tracing_test::traced_test;

async fn write(root: &Path, relative: &str, content: &[u8]) -> String {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).await.unwrap();
    fs::write(&path, content).await.unwrap();
    path.to_string_lossy().into_owned()
}

fn config_for(root: &Path, template: Template) -> ClipboardCopierConfig {
    ClipboardCopierConfig {
        root_path: Some(root.to_string_lossy().into_owned()),
        template,
        interpret_escape_sequences: true,
    }
}

#[tokio::test]
async fn test_concatenate_with_markdown_template() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"hello").await;
    let b = write(dir.path(), "src/b.rs", b"fn b() {}\n").await;

    let config = config_for(dir.path(), Template::default());
    let result = concatenate_files(&[a, b], &config, None).await.unwrap();

    let expected_b = Path::new("src").join("b.rs").to_string_lossy().into_owned();
    assert_eq!(
        result.text,
        format!(
            "a.txt\n```\nhello\n```\n\n{}\n```\nfn b() {{}}\n\n```\n\n",
            expected_b
        )
    );
    assert!(result.warnings.is_empty());
    assert_eq!(result.stats.len(), 2);
    assert_eq!(result.stats[1].lines, 1);
    assert_eq!(result.stats[1].bytes, 10);
}

#[tokio::test]
async fn test_concatenate_with_xml_template_and_no_root() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "deep/dir/notes.md", b"# Notes").await;

    let config = ClipboardCopierConfig {
        root_path: None,
        template: Template::from_preset(TemplatePreset::Xml, "", ""),
        interpret_escape_sequences: true,
    };
    let result = concatenate_files(&[a], &config, None).await.unwrap();
    assert_eq!(result.text, "<file filename=\"notes.md\">\n# Notes\n</file>\n");
}

#[tokio::test]
async fn test_escapes_can_be_kept_literally() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"x").await;

    let mut config = config_for(dir.path(), Template::new("--$filename\\t", "\\n--"));
    config.interpret_escape_sequences = false;
    let result = concatenate_files(&[a.clone()], &config, None).await.unwrap();
    assert_eq!(result.text, "--a.txt\\t\nx\n\\n--\n");

    config.interpret_escape_sequences = true;
    let result = concatenate_files(&[a], &config, None).await.unwrap();
    assert_eq!(result.text, "--a.txt\t\nx\n\n--\n");
}

#[tokio::test]
async fn test_empty_selection_is_an_error() {
    let config = ClipboardCopierConfig::default();
    let result = concatenate_files(&[], &config, None).await;
    assert!(matches!(result, Err(ClipError::NoFiles)));
}

#[tokio::test]
async fn test_unreadable_file_aborts() {
    let dir = tempdir().unwrap();
    let good = write(dir.path(), "good.txt", b"ok").await;
    let missing = dir.path().join("missing.txt").to_string_lossy().into_owned();

    let config = config_for(dir.path(), Template::default());
    let result = concatenate_files(&[good, missing.clone()], &config, None).await;
    match result {
        Err(ClipError::FileReadError(path, _)) => assert_eq!(path, missing),
        other => panic!("Expected FileReadError, got {:?}", other.map(|r| r.text)),
    }
}

#[tokio::test]
async fn test_binary_file_aborts() {
    let dir = tempdir().unwrap();
    let bin = write(dir.path(), "blob.bin", b"\x00\x01\x02\x03").await;
    let config = config_for(dir.path(), Template::default());
    let result = concatenate_files(&[bin], &config, None).await;
    assert!(matches!(result, Err(ClipError::DecodeError(_, _))));
}

#[tokio::test]
async fn test_malformed_template_escape_is_reported() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"x").await;
    let config = config_for(dir.path(), Template::new("\\x", ""));
    let result = concatenate_files(&[a], &config, None).await;
    assert!(matches!(result, Err(ClipError::EscapeError(_))));
}

#[tokio::test]
async fn test_remote_files_are_read_through_remote() {
    let remote = FakeRemote::connected()
        .with_file("/srv/app/main.py", "print('remote')")
        .with_file("/srv/app/lib/util.py", "X = 1");
    let config = ClipboardCopierConfig {
        root_path: Some("/srv/app".to_string()),
        template: Template::new("# $filepath", "# end"),
        interpret_escape_sequences: true,
    };
    let files = vec![
        "/srv/app/main.py".to_string(),
        "/srv/app/lib/util.py".to_string(),
    ];
    let remote_ref: &dyn RemoteFs = &remote;
    let result = concatenate_files(&files, &config, Some(remote_ref))
        .await
        .unwrap();

    let util = Path::new("lib").join("util.py").to_string_lossy().into_owned();
    assert_eq!(
        result.text,
        format!(
            "# main.py\nprint('remote')\n# end\n# {}\nX = 1\n# end\n",
            util
        )
    );
}

#[tokio::test]
#[traced_test]
async fn test_copier_writes_to_sink_and_logs() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "one.txt", b"1").await;
    let b = write(dir.path(), "two.txt", b"2").await;

    let sink = MemorySink::default();
    let config = config_for(dir.path(), Template::new("$filepath", "--"));
    let mut copier = BasicClipboardCopier::new(config, sink.clone());
    let result = copier.copy_files_to_clipboard(&[a, b]).await.unwrap();

    assert_eq!(sink.contents(), "one.txt\n1\n--\ntwo.txt\n2\n--\n");
    assert_eq!(sink.contents(), result.text);
    assert!(logs_contain("Concatenated 2 files."));
}

#[tokio::test]
async fn test_boxed_sink() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "x.md", b"x").await;

    let memory = MemorySink::default();
    let sink: Box<dyn TextSink> = Box::new(memory.clone());
    let config = config_for(dir.path(), Template::new("$filename", ""));
    let mut copier = BasicClipboardCopier::new(config, sink);
    copier.copy_files_to_clipboard(&[a]).await.unwrap();

    assert_eq!(memory.contents(), "x.md\nx\n\n");
}
