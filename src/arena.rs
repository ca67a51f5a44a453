//! The mapped region backing an allocator.
//!
//! ```text
//!   start                                                          end
//!   ┌────────┬──────────────┬────────┬─────────┬────────┬────────────┐
//!   │ header │   payload    │ header │ payload │ header │  payload   │
//!   └────────┴──────────────┴────────┴─────────┴────────┴────────────┘
//!   ▲ +0                    ▲ +HEADER_SIZE + size
//! ```
//!
//! Headers are addressed by [`ChunkOffset`] and copied in and out by value.
//! Every access is checked against the mapped length, so a bad offset turns
//! into [`Error::BadArguments`] rather than a stray read or write.

use std::mem::ManuallyDrop;
use std::ptr::{self, NonNull};

use crate::chunk::{Chunk, ChunkOffset, HEADER_SIZE, Header};
use crate::error::{Error, Result};
use crate::sys;

pub(crate) struct Arena {
  base: NonNull<u8>,
  len: usize,
}

// SAFETY: the arena exclusively owns its mapping; nothing else holds the base
// pointer, so moving it to another thread moves sole ownership with it.
unsafe impl Send for Arena {}

impl Arena {
  /// Maps a fresh zero-filled region of `len` bytes.
  pub fn map(len: usize) -> Result<Self> {
    let base = sys::map_zeroed(len)?;
    Ok(Self { base, len })
  }

  pub fn len(&self) -> usize {
    self.len
  }

  /// Address of the first byte.
  pub fn start(&self) -> usize {
    self.base.as_ptr().addr()
  }

  /// Address one past the last byte.
  pub fn end(&self) -> usize {
    self.start() + self.len
  }

  fn header_ptr(
    &self,
    offset: ChunkOffset,
  ) -> Result<*mut Header> {
    let end = offset
      .get()
      .checked_add(HEADER_SIZE)
      .ok_or(Error::BadArguments)?;

    if end > self.len {
      return Err(Error::BadArguments);
    }

    // In bounds: `offset + HEADER_SIZE <= len`.
    Ok(unsafe { self.base.as_ptr().add(offset.get()) } as *mut Header)
  }

  /// Reads the header stored at `offset`.
  pub fn read(
    &self,
    offset: ChunkOffset,
  ) -> Result<Chunk> {
    let header = unsafe { ptr::read_unaligned(self.header_ptr(offset)?) };
    Ok(Chunk::from_header(offset, header))
  }

  /// Stores `chunk` at its own offset.
  pub fn write(
    &mut self,
    chunk: &Chunk,
  ) -> Result<()> {
    let target = self.header_ptr(chunk.offset())?;
    unsafe { ptr::write_unaligned(target, chunk.to_header()) };
    Ok(())
  }

  /// Pointer to the payload of the chunk at `offset`.
  pub fn payload_ptr(
    &self,
    offset: ChunkOffset,
  ) -> Result<NonNull<u8>> {
    let payload = offset.payload();

    if payload > self.len {
      return Err(Error::BadArguments);
    }

    Ok(unsafe { self.base.add(payload) })
  }

  /// Recovers the header offset for a payload pointer.
  ///
  /// The pointer must lie in `[start, end]` and leave room for a header in
  /// front of it.
  pub fn header_offset(
    &self,
    payload: *const u8,
  ) -> Result<ChunkOffset> {
    if payload.is_null() {
      return Err(Error::BadArguments);
    }

    let address = payload.addr();

    if address < self.start() || address > self.end() {
      return Err(Error::BadArguments);
    }

    (address - self.start())
      .checked_sub(HEADER_SIZE)
      .map(ChunkOffset::new)
      .ok_or(Error::BadArguments)
  }

  /// Unmaps the region. On failure the arena is handed back still mapped.
  pub fn release(self) -> std::result::Result<(), (Self, Error)> {
    let arena = ManuallyDrop::new(self);

    match unsafe { sys::unmap(arena.base, arena.len) } {
      Ok(()) => Ok(()),
      Err(err) => Err((ManuallyDrop::into_inner(arena), err)),
    }
  }
}

impl Drop for Arena {
  fn drop(&mut self) {
    if let Err(err) = unsafe { sys::unmap(self.base, self.len) } {
      log::warn!("leaking arena at {:p}: {err}", self.base);
    }
  }
}
