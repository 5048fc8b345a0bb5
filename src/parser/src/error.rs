use thiserror::Error;

/// Post-parse validation failures for command line arguments.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParserError {
    #[error("--do-not-sort is not compatible with '--output starch': Starch archives require sorted BED input")]
    UnsortedStarch,

    #[error("--starch-bzip2 and --starch-gzip are mutually exclusive")]
    StarchCompressionConflict,

    #[error("--keep-header on PSL input requires --headered")]
    HeaderlessKeepHeader,
}
