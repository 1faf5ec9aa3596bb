use tempfile::tempdir;

// Kept apart from tests/logging.rs: the global subscriber can only be
// installed once per test binary.
#[test]
fn init_without_file_creates_no_log() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log.txt");

    gesture_engine::logging::init(false, None);
    tracing::info!("test");

    assert!(!path.exists(), "log file should not be created");
    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}
