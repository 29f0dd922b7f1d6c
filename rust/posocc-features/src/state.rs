use posocc_common::{Result, error::Error};

/// Lifecycle of an encode or decode context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextState {
    /// Created; code parameters are the field defaults and may still change.
    Constructed,
    /// Header written or read. Parameters are frozen and features may be streamed.
    HeaderReady,
    /// At least one document went through the context.
    Streaming,
    /// Decoder cursor reached the end of the stream.
    Done,
}

impl ContextState {
    pub(crate) fn check_header_op(self, op: &str) -> Result<()> {
        match self {
            ContextState::Constructed | ContextState::HeaderReady => Ok(()),
            _ => Err(Error::invalid_operation(format!("{op} after streaming started"))),
        }
    }

    /// Parameters are described by the header, so they freeze once it is
    /// written or read.
    pub(crate) fn check_set_params(self) -> Result<()> {
        match self {
            ContextState::Constructed => Ok(()),
            _ => Err(Error::invalid_operation("set_params after header")),
        }
    }

    pub(crate) fn check_feature_op(self, op: &str) -> Result<()> {
        match self {
            ContextState::HeaderReady | ContextState::Streaming => Ok(()),
            ContextState::Constructed => {
                Err(Error::invalid_operation(format!("{op} before header")))
            }
            ContextState::Done => Err(Error::invalid_operation(format!("{op} at end of stream"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        assert!(ContextState::Constructed.check_set_params().is_ok());
        assert!(ContextState::HeaderReady.check_set_params().is_err());
        assert!(ContextState::Streaming.check_set_params().is_err());

        assert!(ContextState::Constructed.check_feature_op("read").is_err());
        assert!(ContextState::HeaderReady.check_feature_op("read").is_ok());
        assert!(ContextState::Streaming.check_feature_op("read").is_ok());
        assert!(ContextState::Done.check_feature_op("read").is_err());
    }
}
