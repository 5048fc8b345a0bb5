use thiserror::Error;

/// Record-level translation failures.
///
/// Any of these aborts the conversion: a malformed record in a streaming
/// context cannot be skipped without silently corrupting coordinates
/// downstream.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum XlateError {
    #[error("{format}: expected {expected} fields, found {found}")]
    FieldCount { format: &'static str, expected: &'static str, found: usize },

    #[error("{format}: invalid {field} field '{value}'")]
    InvalidField { format: &'static str, field: &'static str, value: String },

    #[error("wig: data line encountered before any fixedStep/variableStep declaration")]
    WigOrphanData,
}

impl XlateError {
    pub(crate) fn invalid(format: &'static str, field: &'static str, value: &[u8]) -> Self {
        Self::InvalidField {
            format,
            field,
            value: String::from_utf8_lossy(value).into_owned(),
        }
    }
}
