use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// `element` names the malformed part of the input; `message` says what is
    /// wrong with it.
    pub fn invalid_format(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidFormat {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    pub fn format_mismatch(identifier: impl Into<String>, expected: impl Into<String>) -> Error {
        Error(
            ErrorKind::FormatMismatch {
                identifier: identifier.into(),
                expected: expected.into(),
            }
            .into(),
        )
    }

    pub fn param_mismatch(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::ParamMismatch {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    /// Reading `requested` bits at bit offset `position` would cross the declared
    /// stream end `end`.
    pub fn bounds_exceeded(position: u64, requested: u64, end: u64) -> Error {
        Error(
            ErrorKind::BoundsExceeded {
                position,
                requested,
                end,
            }
            .into(),
        )
    }

    pub fn is_bounds_exceeded(&self) -> bool {
        matches!(self.kind(), ErrorKind::BoundsExceeded { .. })
    }

    pub fn is_format_mismatch(&self) -> bool {
        matches!(self.kind(), ErrorKind::FormatMismatch { .. })
    }

    pub fn is_param_mismatch(&self) -> bool {
        matches!(self.kind(), ErrorKind::ParamMismatch { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("invalid format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error("unsupported feature format '{identifier}', expected '{expected}'")]
    FormatMismatch { identifier: String, expected: String },

    #[error("parameter mismatch for '{element}': {message}")]
    ParamMismatch { element: String, message: String },

    #[error("read of {requested} bits at bit offset {position} exceeds stream end {end}")]
    BoundsExceeded {
        position: u64,
        requested: u64,
        end: u64,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}
