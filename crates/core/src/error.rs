#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Interval series has {actual} entries, expected {expected}")]
    ShapeMismatch { expected: usize, actual: usize },
}
