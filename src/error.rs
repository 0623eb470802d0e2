//! Error types for this crate.
//!
//! All fallible operations return [`Result<T>`] which uses [`ReasonerError`]
//! as the error type.

use thiserror::Error;

/// A [`Result`](std::result::Result) alias using [`ReasonerError`] as the error type.
pub type Result<T> = std::result::Result<T, ReasonerError>;

/// The unified error type for all crate errors.
///
/// The first three variants form the dispatch-visible taxonomy: they are the
/// kinds a caller receives through the response envelope's `error` field.
/// The remaining variants cover provider setup (model download, device
/// initialization) and internal invariant violations.
///
/// # Example
///
/// ```rust,no_run
/// use code_reasoner::error::ReasonerError;
///
/// fn handle_error(e: ReasonerError) {
///     match &e {
///         ReasonerError::MalformedInput(_) => {
///             // Bad input text - fix the request
///         }
///         ReasonerError::InvalidOptions(_) => {
///             // Empty option set - supply candidates
///         }
///         ReasonerError::InferenceUnavailable(_) => {
///             // Model unreachable or timed out - caller may retry later
///         }
///         ReasonerError::Download(_) => {
///             // Network issue - retry with backoff
///         }
///         ReasonerError::Device(_) => {
///             // GPU unavailable - fall back to CPU
///         }
///         ReasonerError::Unexpected(_) => {
///             // Internal error - report bug
///             eprintln!("Internal error: {e}");
///         }
///         _ => {
///             // Future error variants
///         }
///     }
/// }
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReasonerError {
    /// Bad or oversized input, or no mask marker where one is required.
    #[error("{0}")]
    MalformedInput(String),

    /// Empty or unusable option set passed to scoring.
    #[error("{0}")]
    InvalidOptions(String),

    /// Model unreachable, deadline expired, or a malformed distribution.
    /// The core never retries; that decision belongs to the caller.
    #[error("{0}")]
    InferenceUnavailable(String),

    /// Network or download failure while fetching model assets.
    #[error("{0}")]
    Download(String),

    /// Device initialization failure. Fall back to CPU.
    #[error("{0}")]
    Device(String),

    /// Internal error. Report if seen.
    #[error("{0}")]
    Unexpected(String),
}

impl ReasonerError {
    /// Stable machine-readable kind, used by the dispatch envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            ReasonerError::MalformedInput(_) => "malformed_input",
            ReasonerError::InvalidOptions(_) => "invalid_options",
            ReasonerError::InferenceUnavailable(_) => "inference_unavailable",
            ReasonerError::Download(_) => "download",
            ReasonerError::Device(_) => "device",
            ReasonerError::Unexpected(_) => "unexpected",
        }
    }
}

impl From<hf_hub::api::sync::ApiError> for ReasonerError {
    fn from(value: hf_hub::api::sync::ApiError) -> Self {
        ReasonerError::Download(format!("HuggingFace API error: {value}"))
    }
}

impl From<candle_core::Error> for ReasonerError {
    fn from(value: candle_core::Error) -> Self {
        ReasonerError::Unexpected(value.to_string())
    }
}

impl From<std::io::Error> for ReasonerError {
    fn from(value: std::io::Error) -> Self {
        ReasonerError::Unexpected(value.to_string())
    }
}

impl From<serde_json::Error> for ReasonerError {
    fn from(value: serde_json::Error) -> Self {
        ReasonerError::Unexpected(value.to_string())
    }
}
