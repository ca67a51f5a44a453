//! Thin wrappers over the OS calls the arena needs.

use std::ptr::{self, NonNull};

use crate::error::{Error, Result};

/// Size of a virtual memory page.
pub fn page_size() -> Result<usize> {
  let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };

  if size <= 0 {
    return Err(Error::CallFailed("page size is unavailable"));
  }

  Ok(size as usize)
}

/// Maps `len` bytes of zero-filled, private, read-write memory.
///
/// `len` must be a non-zero multiple of the page size.
pub fn map_zeroed(len: usize) -> Result<NonNull<u8>> {
  let address = unsafe {
    libc::mmap(
      ptr::null_mut(),
      len,
      libc::PROT_READ | libc::PROT_WRITE,
      libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
      -1,
      0,
    )
  };

  if address == libc::MAP_FAILED {
    return Err(Error::last_os_error("mmap"));
  }

  NonNull::new(address as *mut u8).ok_or(Error::SyscallFailed {
    call: "mmap",
    errno: 0,
  })
}

/// Unmaps a region returned by [`map_zeroed`].
///
/// # Safety
///
/// `base` and `len` must describe exactly one live mapping from
/// [`map_zeroed`]; nothing may access the region afterwards.
pub unsafe fn unmap(
  base: NonNull<u8>,
  len: usize,
) -> Result<()> {
  let status = unsafe { libc::munmap(base.as_ptr() as *mut libc::c_void, len) };

  if status == -1 {
    return Err(Error::last_os_error("munmap"));
  }

  Ok(())
}
