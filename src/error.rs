//! error handling stuff
use thiserror::Error;

#[derive(Debug, Error)]
/// An error
pub enum TcError {
    /// an IO error
    #[error("i/o error: {0}")]
    IO(#[from] std::io::Error),

    /// a reqwest error
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// a json error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// a url parse error
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    /// a report from color_eyre
    #[error("{0}")]
    EyreReport(#[from] color_eyre::Report),

    /// a source answered with a non-success status
    #[error("failed to load {url} ({status})")]
    SourceFetch {
        /// the url that was requested
        url: String,
        /// the http status that came back
        status: u16,
    },

    /// a dataset document couldn't be turned into entries
    #[error("failed to parse {source_id}: {reason}")]
    Parse {
        /// the id of the source being parsed
        source_id: String,
        /// what went wrong
        reason: String,
    },

    /// the source manifest was unreachable or malformed
    #[error("manifest error: {0}")]
    Manifest(String),

    /// a custom error
    #[error("error: {0}")]
    Other(String),
}

impl From<String> for TcError {
    fn from(value: String) -> Self {
        Self::Other(value)
    }
}

impl TcError {
    /// make a parse error for a given source
    pub fn parse(source_id: impl Into<String>, reason: impl ToString) -> Self {
        Self::Parse {
            source_id: source_id.into(),
            reason: reason.to_string(),
        }
    }
}

/// A result using [`TcError`] as the `Err` variant
pub type Result<T, U = TcError> = std::result::Result<T, U>;

/// bail
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::error::TcError::from(String::from($msg)))
    };

    ($err:expr $(,)?) => {
        return Err($crate::error::TcError::from($err))
    };

    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::error::TcError::from(format!($fmt, $($arg)*)))
    };
}
