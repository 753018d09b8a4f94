use thiserror::Error;

/// Errors surfaced by the trainer and its numeric substrate.
///
/// Missing optional resources (an absent config file, an absent weight file
/// during checkpoint restore) are not errors; they are logged and skipped at
/// the function that looks for them.
#[derive(Debug, Error)]
pub enum TrainError {
    /// Caller supplied an argument the trainer cannot work with
    /// (e.g. a sample pair with the wrong number of elements).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("shape mismatch in {op}: {left:?} vs {right:?}")]
    ShapeMismatch {
        op: &'static str,
        left: Vec<usize>,
        right: Vec<usize>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, TrainError>;

impl TrainError {
    pub(crate) fn shape(op: &'static str, left: &[usize], right: &[usize]) -> Self {
        TrainError::ShapeMismatch {
            op,
            left: left.to_vec(),
            right: right.to_vec(),
        }
    }
}
