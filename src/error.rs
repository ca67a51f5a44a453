//! Error type shared by every allocator operation.

use thiserror::Error;

/// Errors reported by the allocator.
///
/// Every public operation returns one of these instead of touching a
/// process-wide status code, so the error always belongs to the call that
/// produced it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
  /// Invalid pointer, size or chunk ordering.
  #[error("bad arguments")]
  BadArguments,

  /// Operation attempted before `init` or after `destroy`.
  #[error("allocator is not initialized")]
  Uninitialized,

  /// No free chunk is large enough for the request.
  #[error("out of memory: no free chunk can hold {requested} bytes")]
  OutOfMemory {
    /// Payload bytes that were requested.
    requested: usize,
  },

  /// An internal precondition did not hold, or an OS query failed.
  #[error("call failed: {0}")]
  CallFailed(&'static str),

  /// Acquiring or releasing memory from the OS failed.
  #[error("{call} failed with errno {errno}")]
  SyscallFailed {
    /// Name of the failing system call.
    call: &'static str,
    /// OS error code reported for the call.
    errno: i32,
  },
}

impl Error {
  /// Builds a [`Error::SyscallFailed`] from the calling thread's errno.
  pub(crate) fn last_os_error(call: &'static str) -> Self {
    let errno = std::io::Error::last_os_error()
      .raw_os_error()
      .unwrap_or_default();
    Self::SyscallFailed { call, errno }
  }
}

pub type Result<T> = std::result::Result<T, Error>;
