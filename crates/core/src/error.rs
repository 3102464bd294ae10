use thiserror::Error;

/// Errors raised while configuring mention parsers.
///
/// Scanning itself never fails: an `@` that does not start a mention is left
/// as literal text.
#[derive(Error, Debug)]
pub enum Error {
    #[error("link template must contain exactly one `%s` slot, got {0:?}")]
    InvalidLinkTemplate(String),

    #[error("invalid handle pattern {pattern:?}: {source}")]
    InvalidHandlePattern {
        pattern: String,
        #[source]
        source: Box<fancy_regex::Error>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
