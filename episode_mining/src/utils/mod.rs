/// Paths of test fixtures
pub mod test_utils {
    use std::path::PathBuf;

    /// Directory holding the test event streams
    pub fn get_test_data_path() -> PathBuf {
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data")
    }
}
