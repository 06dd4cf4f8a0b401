//! Error types and the tri-state invocation outcome.

use std::fmt;
use std::path::PathBuf;

/// Result type for transcoding operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for transcoding operations.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// A `WxH+X+Y` geometry parameter did not parse or does not fit the image.
    BadGeometry(String),
    /// More than one geometric transform was requested for one invocation.
    ConflictingTransform,
    /// File open/read/write failure, with the offending path.
    Io {
        /// Path of the file the operation failed on.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The codec reported a condition it cannot proceed past.
    CodecFatal(String),
    /// A non-transformable edge block under the perfect edge policy.
    NonTransformableEdge,
    /// Drop region does not match the inserted image's block grid.
    DropSizeMismatch(String),
    /// Accumulated codec warnings escalated by strict mode.
    StrictWarnings(u64),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BadGeometry(spec) => write!(f, "bogus geometry argument '{}'", spec),
            Error::ConflictingTransform => {
                write!(f, "can only do one image transformation at a time")
            }
            Error::Io { path, source } => {
                write!(f, "cannot access {}: {}", path.display(), source)
            }
            Error::CodecFatal(msg) => write!(f, "codec failure: {}", msg),
            Error::NonTransformableEdge => write!(f, "transformation is not perfect"),
            Error::DropSizeMismatch(detail) => {
                write!(f, "drop region does not match drop file: {}", detail)
            }
            Error::StrictWarnings(n) => {
                write!(f, "{} corrupt-data warning(s) treated as fatal", n)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Final disposition of one transcode/transform invocation.
///
/// Maps onto the process exit-code convention of the original tooling:
/// 0 for success, 2 for success with recorded warnings, 1 for failure.
#[derive(Debug)]
#[non_exhaustive]
pub enum Outcome {
    /// Clean run, no codec warnings.
    Success,
    /// The destination was written, but the codec recorded recoverable
    /// anomalies (the count sums the read and write phases).
    SuccessWithWarnings(u64),
    /// No usable destination was produced.
    Failure(Error),
}

impl Outcome {
    /// Process exit-code mapping: 0 success, 2 warnings, 1 failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Success => 0,
            Outcome::SuccessWithWarnings(_) => 2,
            Outcome::Failure(_) => 1,
        }
    }

    /// True unless the invocation failed.
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Failure(_))
    }

    pub(crate) fn from_warnings(warnings: u64, strict: bool) -> Outcome {
        if strict && warnings > 0 {
            Outcome::Failure(Error::StrictWarnings(warnings))
        } else if warnings > 0 {
            Outcome::SuccessWithWarnings(warnings)
        } else {
            Outcome::Success
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let cases = [
            (
                Error::BadGeometry("12q34".into()),
                "bogus geometry argument '12q34'",
            ),
            (
                Error::ConflictingTransform,
                "can only do one image transformation at a time",
            ),
            (Error::NonTransformableEdge, "transformation is not perfect"),
            (
                Error::CodecFatal("Not a JPEG file".into()),
                "codec failure: Not a JPEG file",
            ),
            (
                Error::StrictWarnings(3),
                "3 corrupt-data warning(s) treated as fatal",
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn io_error_keeps_path() {
        let err = Error::io(
            "/no/such/file.jpg",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        let text = err.to_string();
        assert!(text.contains("/no/such/file.jpg"));
        assert!(text.contains("not found"));
    }

    #[test]
    fn outcome_exit_codes() {
        assert_eq!(Outcome::Success.exit_code(), 0);
        assert_eq!(Outcome::SuccessWithWarnings(2).exit_code(), 2);
        assert_eq!(Outcome::Failure(Error::ConflictingTransform).exit_code(), 1);
    }

    #[test]
    fn outcome_from_warnings() {
        assert!(matches!(Outcome::from_warnings(0, false), Outcome::Success));
        assert!(matches!(
            Outcome::from_warnings(2, false),
            Outcome::SuccessWithWarnings(2)
        ));
        assert!(matches!(
            Outcome::from_warnings(2, true),
            Outcome::Failure(Error::StrictWarnings(2))
        ));
    }
}
