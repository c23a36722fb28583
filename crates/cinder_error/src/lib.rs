use std::error::Error;
use std::fmt;

/// Result type used throughout the engine.
pub type Result<T, E = CinderError> = std::result::Result<T, E>;

/// Error type used throughout the engine.
///
/// Errors are message-oriented. Anything that needs to carry a foreign error
/// wraps it as a source via `ResultExt`.
#[derive(Debug)]
pub struct CinderError {
    /// Message for the error.
    message: String,

    /// Optional underlying error.
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl CinderError {
    pub fn new(message: impl Into<String>) -> Self {
        CinderError {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: Box<dyn Error + Send + Sync>) -> Self {
        CinderError {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CinderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl Error for CinderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

/// Extension trait for attaching context to errors from other crates.
pub trait ResultExt<T, E> {
    /// Wrap an error with a static context message.
    fn context(self, msg: &'static str) -> Result<T>;

    /// Wrap an error with a lazily computed context message.
    fn context_fn<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: Error + Send + Sync + 'static,
{
    fn context(self, msg: &'static str) -> Result<T> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(CinderError::with_source(msg, Box::new(e))),
        }
    }

    fn context_fn<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(CinderError::with_source(f(), Box::new(e))),
        }
    }
}

/// Return a "not implemented" error.
///
/// Accepts format args for describing the thing that's not implemented.
#[macro_export]
macro_rules! not_implemented {
    ($($arg:tt)*) => {{
        let msg = format!($($arg)*);
        return Err($crate::CinderError::new(format!("Not yet implemented: {msg}")));
    }};
}
