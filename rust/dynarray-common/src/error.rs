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

    pub fn out_of_range(index: usize, len: usize) -> Error {
        Error(ErrorKind::OutOfRange { index, len }.into())
    }

    pub fn capacity_overflow(requested: usize) -> Error {
        Error(ErrorKind::CapacityOverflow { requested }.into())
    }

    pub fn allocation_failed(bytes: usize) -> Error {
        Error(ErrorKind::AllocationFailed { bytes }.into())
    }

    /// Returns `true` if this is the range error of a checked element access.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self.kind(), ErrorKind::OutOfRange { .. })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("index {index} is out of range for length {len}")]
    OutOfRange { index: usize, len: usize },

    #[error("capacity overflow: {requested} elements cannot be allocated")]
    CapacityOverflow { requested: usize },

    #[error("memory allocation of {bytes} bytes failed")]
    AllocationFailed { bytes: usize },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}
