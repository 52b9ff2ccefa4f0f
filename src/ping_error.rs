use std::{error::Error, fmt, io};

pub type GenericError = Box<dyn Error + Send + Sync + 'static>;

pub type PingResult<T> = std::result::Result<T, PingError>;

#[derive(Debug)]
pub struct PingError {
    pub message: String,
    pub source: Option<GenericError>,
}

impl PingError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        PingError { message: message.into(), source: None }
    }

    pub(crate) fn with_source(message: impl Into<String>, source: impl Into<GenericError>) -> Self {
        PingError { message: message.into(), source: Some(source.into()) }
    }
}

impl fmt::Display for PingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "PingError")?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(source) = &self.source {
            write!(f, " ({source})")?;
        }
        Ok(())
    }
}

impl Error for PingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        let source: &(dyn Error + 'static) = self.source.as_deref()?;
        Some(source)
    }
}

impl From<io::Error> for PingError {
    fn from(error: io::Error) -> PingError {
        PingError { message: error.to_string(), source: None }
    }
}

#[cfg(test)]
mod tests {
    use std::io::ErrorKind;

    use super::*;

    #[test]
    fn derive_debug() {
        let ping_error = PingError::new("testing std::fmt::Debug");
        let fmt_debug_str = format!("{ping_error:?}");
        assert_eq!("PingError { message: \"testing std::fmt::Debug\", source: None }", fmt_debug_str);
    }

    #[test]
    fn fmt_without_message() {
        let ping_error = PingError::new("");
        assert_eq!("PingError", format!("{ping_error}"));
    }

    #[test]
    fn fmt_with_message() {
        let ping_error = PingError::new("testing std::fmt::Display");
        assert_eq!("PingError: testing std::fmt::Display", format!("{ping_error}"));
    }

    #[test]
    fn fmt_with_source() {
        let source = io::Error::new(ErrorKind::PermissionDenied, "operation not permitted");
        let ping_error = PingError::with_source("could not open raw socket", source);
        assert_eq!("PingError: could not open raw socket (operation not permitted)", format!("{ping_error}"));
    }

    #[test]
    fn source() {
        assert!(PingError::new("").source().is_none());

        let source = io::Error::from(ErrorKind::PermissionDenied);
        assert!(PingError::with_source("denied", source).source().is_some());
    }

    #[test]
    fn ping_error_from_std_io_error() {
        let std_io_error = io::Error::from(ErrorKind::Other);
        let ping_error: PingError = PingError::from(std_io_error);
        assert!(ping_error.source().is_none());
        assert!(!ping_error.message.is_empty());
    }
}
