mod common;

use code2clip::ignore::IgnoreFilter;
use code2clip::remote::ssh::build_find_command;
use code2clip::remote::{shell_quote, RemoteFileType, RemoteFs, SshSession};
use code2clip::ClipError;
use common::{failed_output, ok_output, FakeRunner};

fn session(responses: Vec<code2clip::remote::CommandOutput>) -> SshSession<FakeRunner> {
    SshSession::with_runner(
        Some("build.example.com".to_string()),
        Some("dev".to_string()),
        FakeRunner::with_responses(responses),
    )
}

#[test]
fn test_shell_quote() {
    assert_eq!(shell_quote("plain"), "'plain'");
    assert_eq!(shell_quote("it's"), "'it'\\''s'");
    assert_eq!(shell_quote("/path with spaces/$HOME"), "'/path with spaces/$HOME'");
}

#[test]
fn test_find_command_prunes_ignored_folders() {
    let ignore = IgnoreFilter::new([".git", "app/build"]);
    assert_eq!(
        build_find_command("/srv/app", &ignore),
        "find '/srv/app' -mindepth 1 -type d \\( -name '.git' -o -path '*/app/build' \\) -prune -o \\( -type f -o -type l -xtype f \\) -print"
    );

    let none = IgnoreFilter::default();
    assert_eq!(
        build_find_command("/srv/app", &none),
        "find '/srv/app' \\( -type f -o -type l -xtype f \\) -print"
    );
}

#[tokio::test]
async fn test_unconfigured_session() {
    let mut ssh = SshSession::with_runner(None, Some(" ".to_string()), FakeRunner::default());
    assert!(!ssh.is_configured());
    assert!(matches!(ssh.connect(true).await, Err(ClipError::SshNotConfigured)));
    assert!(ssh.runner().calls().is_empty());
}

#[tokio::test]
async fn test_connect_with_keys_uses_batch_mode() {
    let mut ssh = session(vec![ok_output("")]);
    ssh.connect(false).await.unwrap();
    assert!(ssh.is_connected());

    let calls = ssh.runner().calls();
    assert_eq!(calls.len(), 1);
    let (program, args, interactive) = &calls[0];
    assert_eq!(program, "ssh");
    assert!(!interactive);
    assert!(args.contains(&"BatchMode=yes".to_string()));
    assert!(args.contains(&"ConnectTimeout=10".to_string()));
    assert!(args.contains(&"ServerAliveInterval=30".to_string()));
    assert!(args.contains(&"dev@build.example.com".to_string()));

    // Already connected: no new handshake.
    ssh.connect(false).await.unwrap();
    assert_eq!(ssh.runner().calls().len(), 1);
}

#[tokio::test]
async fn test_auth_failure_without_interactive_login() {
    let mut ssh = session(vec![failed_output(
        255,
        "dev@build: Permission denied (publickey,password).",
    )]);
    let result = ssh.connect(false).await;
    assert!(matches!(result, Err(ClipError::SshAuthError(_))));
    assert!(!ssh.is_connected());
    assert_eq!(ssh.runner().calls().len(), 1);
}

#[tokio::test]
async fn test_auth_failure_retries_interactively() {
    let mut ssh = session(vec![
        failed_output(255, "Permission denied (publickey,password)."),
        ok_output(""),
    ]);
    ssh.connect(true).await.unwrap();
    assert!(ssh.is_connected());

    let calls = ssh.runner().calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[1].2, "second attempt should be interactive");
    assert!(calls[1].1.contains(&"BatchMode=no".to_string()));
}

#[tokio::test]
async fn test_interactive_failure_and_cancel() {
    let mut ssh = session(vec![
        failed_output(255, "Permission denied"),
        failed_output(255, "Permission denied"),
    ]);
    assert!(matches!(ssh.connect(true).await, Err(ClipError::SshAuthError(_))));

    let mut ssh = session(vec![
        failed_output(255, "Permission denied"),
        failed_output(130, ""),
    ]);
    assert!(matches!(ssh.connect(true).await, Err(ClipError::Cancelled(_))));
}

#[tokio::test]
async fn test_network_failure_is_not_retried() {
    let mut ssh = session(vec![failed_output(255, "ssh: Could not resolve hostname build")]);
    assert!(matches!(ssh.connect(true).await, Err(ClipError::SshError(_))));
    assert_eq!(ssh.runner().calls().len(), 1);
}

#[tokio::test]
async fn test_remote_operations() {
    let mut ssh = session(vec![
        ok_output(""),
        ok_output("regular file\n"),
        ok_output("directory\n"),
        failed_output(1, "stat: cannot statx '/nope': No such file or directory"),
        ok_output("hello remote"),
        ok_output("/srv/app/a.py\n/srv/app/b/c.py\n"),
    ]);
    ssh.connect(false).await.unwrap();

    assert_eq!(ssh.stat("/srv/app/a.py").await.unwrap(), Some(RemoteFileType::File));
    assert_eq!(ssh.stat("/srv/app").await.unwrap(), Some(RemoteFileType::Directory));
    assert_eq!(ssh.stat("/nope").await.unwrap(), None);
    assert_eq!(ssh.read_bytes("/srv/app/a.py").await.unwrap(), b"hello remote");
    assert_eq!(
        ssh.list_tree("/srv/app", &IgnoreFilter::default()).await.unwrap(),
        vec!["/srv/app/a.py", "/srv/app/b/c.py"]
    );

    let calls = ssh.runner().calls();
    assert_eq!(calls[1].1.last().unwrap(), "stat -L -c %F '/srv/app/a.py'");
    assert_eq!(calls[4].1.last().unwrap(), "cat -- '/srv/app/a.py'");
}

#[tokio::test]
async fn test_commands_require_connection() {
    let ssh = session(Vec::new());
    assert!(ssh.stat("/srv").await.is_err());
    assert!(!ssh.path_exists("/srv").await);
}

#[tokio::test]
async fn test_configure_closes_live_session() {
    let mut ssh = session(vec![ok_output(""), ok_output("")]);
    ssh.connect(false).await.unwrap();
    ssh.configure("other.example.com", "ops").await;

    assert!(!ssh.is_connected());
    assert_eq!(ssh.host(), Some("other.example.com"));
    assert_eq!(ssh.username(), Some("ops"));

    let calls = ssh.runner().calls();
    assert_eq!(calls.len(), 2);
    let close_args = &calls[1].1;
    assert!(close_args.windows(2).any(|w| w[0] == "-O" && w[1] == "exit"));
}
