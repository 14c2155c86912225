//! Sandbox behaviour tests
//!
//! Each test compiles real extension sources and runs them through the public
//! API, so every call gets its own isolated realm.

mod security;

use camino::Utf8PathBuf;
use rung_config::Store;

/// Writes `files` into a fresh directory
fn temp_extension(files: &[(&str, &str)]) -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 tempdir");
    for (path, contents) in files {
        let path = root.join(path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("mkdir");
        }
        std::fs::write(path, contents).expect("write");
    }
    (dir, root)
}

/// Store rooted in its own temporary directory
fn temp_store() -> (tempfile::TempDir, Store) {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 tempdir");
    (dir, Store::new(root))
}

fn compile(source: &str) -> String {
    rung_compiler::compile(source).expect("source should compile")
}
