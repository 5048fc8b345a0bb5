use thiserror::Error;

/// Failures of a pipeline worker thread.
#[derive(Error, Debug)]
pub enum PumpError {
    #[error("input record exceeds the {0} byte line buffer (missing newline, or corrupt input)")]
    LineTooLong(usize),

    #[error(transparent)]
    Translate(#[from] anyhow::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
