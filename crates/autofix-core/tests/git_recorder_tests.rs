use std::fs;
use std::path::Path;

use autofix_core::{ChangeRecorder, GitRecorder};
use autofix_git::{BotIdentity, Committer, DiffCapture};
use git2::{Repository, Signature};
use tempfile::TempDir;

fn repo_with(path: &str, content: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    let file = dir.path().join(path);
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(&file, content).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(path)).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = Signature::now("dev", "dev@example.com").unwrap();
    repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
        .unwrap();
    dir
}

#[test]
fn test_write_diff_commit_cycle() {
    let path = "calculator/calculator.py";
    let dir = repo_with(path, "def multiply(a, b):\n    return a * b + 1\n");
    let recorder = GitRecorder::new(
        dir.path().to_path_buf(),
        DiffCapture::new(),
        Committer::new(BotIdentity::from_actor("ci-bot")),
    );

    assert!(recorder.exists(path));
    assert!(!recorder.exists("calculator/missing.py"));

    recorder
        .write(path, "def multiply(a, b):\n    return a * b\n")
        .unwrap();
    assert_eq!(
        recorder.read(path).unwrap(),
        "def multiply(a, b):\n    return a * b\n"
    );

    let diff = recorder.diff(path).unwrap();
    assert!(diff.contains("-    return a * b + 1"));
    assert!(diff.contains("+    return a * b"));

    let oid = recorder
        .commit(path, "fix: Auto-fix attempt 1 for calculator/calculator.py")
        .unwrap();
    let repo = Repository::open(dir.path()).unwrap();
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    assert_eq!(head.id().to_string(), oid);
    assert_eq!(head.author().email(), Some("ci-bot@users.noreply.github.com"));
    assert!(recorder.diff(path).unwrap().is_empty());
}

#[test]
fn test_read_missing_file_is_io_error() {
    let dir = repo_with("a.py", "x = 1\n");
    let recorder = GitRecorder::new(
        dir.path().to_path_buf(),
        DiffCapture::new(),
        Committer::new(BotIdentity::default()),
    );
    let err = recorder.read("b.py").unwrap_err();
    assert!(err.to_string().starts_with("Failed to access b.py"));
}
