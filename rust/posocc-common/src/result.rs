//! Result alias and the checks that turn a failed condition into an error
//! naming the offending value.

use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Returns `InvalidArgument` from the enclosing function unless the condition
/// holds. The error names `$name` and carries the condition text.
#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $cond:expr) => {
        if !$cond {
            return Err($crate::result::arg_failed(stringify!($name), stringify!($cond)));
        }
    };
}

/// Like [`verify_arg!`], for values decoded from a stream: the error is
/// `InvalidFormat`.
#[macro_export]
macro_rules! verify_data {
    ($name:expr, $cond:expr) => {
        if !$cond {
            return Err($crate::result::data_failed(stringify!($name), stringify!($cond)));
        }
    };
}

#[doc(hidden)]
#[cold]
pub fn arg_failed(name: &str, condition: &str) -> Error {
    Error::invalid_arg(name, condition)
}

#[doc(hidden)]
#[cold]
pub fn data_failed(name: &str, condition: &str) -> Error {
    Error::invalid_format(name, condition)
}
