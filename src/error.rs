use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("Invalid date \"{input}\" (expected YYYYMMDD or YYYY-MM-DD)")]
    InvalidDate { input: String },

    #[error("Invalid timezone: {input}")]
    InvalidTimezone { input: String },

    #[error("Invalid expand key \"{input}\" (expected YEAR or YEAR-QUARTER)")]
    InvalidExpandKey { input: String },

    #[error("Invalid quarter mapping: {reason}")]
    InvalidQuarterMapping { reason: String },

    #[error("Missing setting `{name}` (set it in the config file or pass --input)")]
    MissingSetting { name: &'static str },
}

/// Failure while pulling records from a source.
///
/// Never shown to the user directly: the loader logs it and continues with
/// an empty record set.
#[derive(Debug, Error)]
pub(crate) enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] ureq::Error),

    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("failed to decode {context}: {message}")]
    Decode { context: String, message: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid input pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}
