//! Service-specific tests
//!
//! Each service has its own test file with dedicated fixtures and helpers.


// Common test utilities for services
#[cfg(test)]
pub mod common {
    use shared::{Collection, Record};
    use tempfile::TempDir;

    use crate::services::RealFileStore;

    /// Store rooted in a fresh temporary directory
    pub fn temp_store() -> (RealFileStore, TempDir) {
        let temp_dir = TempDir::new().expect("create temp dir");
        let store = RealFileStore::with_base_dir(temp_dir.path().to_path_buf());
        (store, temp_dir)
    }

    pub fn sample_collection() -> Collection {
        vec![
            Record::new().with("id", 1).with("name", "Ada").with("email", "ada@example.com"),
            Record::new().with("id", 2).with("name", "Grace").with("email", "grace@example.com"),
        ]
        .into()
    }
}
