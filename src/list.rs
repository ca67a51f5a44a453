//! Address-ordered chunk list threaded through the arena.
//!
//! Every chunk, free or allocated, is linked. `fwd` always names the chunk
//! that starts right after this one's payload and `bwd` the one that ends
//! right before its header, so walking from the head covers the whole arena.

use std::ptr::NonNull;

use crate::arena::Arena;
use crate::chunk::{Chunk, ChunkOffset, HEADER_SIZE};
use crate::error::{Error, Result};

pub(crate) struct ChunkList {
  arena: Arena,
  head: ChunkOffset,
}

impl ChunkList {
  /// Installs a single free chunk spanning the whole arena.
  pub fn new(mut arena: Arena) -> Result<Self> {
    let size = arena
      .len()
      .checked_sub(HEADER_SIZE)
      .ok_or(Error::BadArguments)?;

    arena.write(&Chunk::new(ChunkOffset::HEAD, size, true, None, None))?;

    Ok(Self {
      arena,
      head: ChunkOffset::HEAD,
    })
  }

  pub fn arena(&self) -> &Arena {
    &self.arena
  }

  /// Unmaps the arena. On failure the list is handed back untouched.
  pub fn release(self) -> std::result::Result<(), (Self, Error)> {
    let head = self.head;

    self
      .arena
      .release()
      .map_err(|(arena, err)| (Self { arena, head }, err))
  }

  pub fn read(
    &self,
    offset: ChunkOffset,
  ) -> Result<Chunk> {
    self.arena.read(offset)
  }

  pub fn write(
    &mut self,
    chunk: &Chunk,
  ) -> Result<()> {
    self.arena.write(chunk)
  }

  pub fn head(&self) -> Result<Chunk> {
    self.read(self.head)
  }

  pub fn payload_ptr(
    &self,
    chunk: &Chunk,
  ) -> Result<NonNull<u8>> {
    self.arena.payload_ptr(chunk.offset())
  }

  /// Upper bound on how many chunks can exist, used to cut off traversal of
  /// a corrupted, cyclic list.
  fn max_chunks(&self) -> usize {
    self.arena.len() / HEADER_SIZE
  }

  /// First chunk in address order that is free and holds at least `size`
  /// payload bytes.
  pub fn find_first_fit(
    &self,
    size: usize,
  ) -> Result<Option<Chunk>> {
    let mut next = Some(self.head);

    for _ in 0..=self.max_chunks() {
      let Some(offset) = next else {
        return Ok(None);
      };

      let chunk = self.read(offset)?;

      if chunk.is_free() && chunk.size() >= size {
        return Ok(Some(chunk));
      }

      next = chunk.fwd();
    }

    Err(Error::CallFailed("chunk list does not terminate"))
  }

  /// Header of the chunk owning `payload`.
  pub fn lookup(
    &self,
    payload: *const u8,
  ) -> Result<Chunk> {
    let offset = self.arena.header_offset(payload)?;
    self.read(offset)
  }

  /// Whether `chunk` is actually part of the list, judged by its neighbors
  /// pointing back at it.
  ///
  /// Headers left behind by a merge, or payload bytes that merely look like a
  /// header, fail this check.
  pub fn is_linked(
    &self,
    chunk: &Chunk,
  ) -> Result<bool> {
    let offset = chunk.offset();

    let bwd_ok = match chunk.bwd() {
      None => offset == self.head,
      Some(bwd) => bwd < offset && self.read(bwd)?.fwd() == Some(offset),
    };

    if !bwd_ok {
      return Ok(false);
    }

    let fwd_ok = match chunk.fwd() {
      None => chunk.end() == Some(self.arena.len()),
      Some(fwd) => {
        chunk.end() == Some(fwd.get()) && self.read(fwd)?.bwd() == Some(offset)
      }
    };

    Ok(fwd_ok)
  }

  pub fn iter(&self) -> Chunks<'_> {
    Chunks {
      list: self,
      next: Some(self.head),
      remaining: self.max_chunks(),
    }
  }

  /// Walks the whole list and checks link symmetry, contiguity, full
  /// coverage of the arena and that no two neighbors are both free.
  pub fn validate(&self) -> Result<()> {
    let mut covered = 0usize;
    let mut prev: Option<Chunk> = None;
    let mut next = Some(self.head);

    if self.head != ChunkOffset::HEAD {
      return Err(Error::CallFailed("head is not at the arena start"));
    }

    for _ in 0..self.max_chunks() {
      let Some(offset) = next else {
        break;
      };

      let chunk = self.read(offset)?;

      if offset.get() != covered {
        return Err(Error::CallFailed("gap or overlap between chunks"));
      }

      if chunk.bwd() != prev.map(|prev| prev.offset()) {
        return Err(Error::CallFailed("backward link does not match"));
      }

      if let Some(prev) = prev {
        if prev.is_free() && chunk.is_free() {
          return Err(Error::CallFailed("adjacent free chunks"));
        }
      }

      covered = chunk
        .end()
        .ok_or(Error::CallFailed("chunk size overflows"))?;
      prev = Some(chunk);
      next = chunk.fwd();
    }

    if next.is_some() {
      return Err(Error::CallFailed("chunk list does not terminate"));
    }

    if covered != self.arena.len() {
      return Err(Error::CallFailed("chunks do not cover the arena"));
    }

    Ok(())
  }
}

/// Iterator over the chunks of an arena in address order.
///
/// Stops early if a link points outside the arena.
pub struct Chunks<'a> {
  list: &'a ChunkList,
  next: Option<ChunkOffset>,
  remaining: usize,
}

impl Iterator for Chunks<'_> {
  type Item = Chunk;

  fn next(&mut self) -> Option<Self::Item> {
    if self.remaining == 0 {
      return None;
    }
    self.remaining -= 1;

    let chunk = self.list.read(self.next?).ok()?;
    self.next = chunk.fwd();

    Some(chunk)
  }
}
