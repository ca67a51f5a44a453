use std::ops::Range;
use std::ptr::NonNull;

use crate::arena::Arena;
use crate::chunk::{Chunk, ChunkOffset, HEADER_SIZE};
use crate::config::AllocatorConfig;
use crate::error::{Error, Result};
use crate::list::{ChunkList, Chunks};
use crate::{align_to, sys};

/// First-fit allocator over a single mapped arena.
///
/// Starts uninitialized. [`init`](Self::init) maps the arena and
/// [`destroy`](Self::destroy) (or dropping the allocator) unmaps it again.
pub struct Allocator {
  config: AllocatorConfig,
  list: Option<ChunkList>,
}

impl Allocator {
  pub fn new() -> Self {
    Self::with_config(AllocatorConfig::default())
  }

  pub fn with_config(config: AllocatorConfig) -> Self {
    Self { config, list: None }
  }

  pub fn config(&self) -> &AllocatorConfig {
    &self.config
  }

  pub fn is_initialized(&self) -> bool {
    self.list.is_some()
  }

  /// Bytes reserved from the OS, header space included.
  pub fn reserved(&self) -> Option<usize> {
    self.list.as_ref().map(|list| list.arena().len())
  }

  /// Addresses spanned by the arena.
  pub fn arena_bounds(&self) -> Option<Range<usize>> {
    self
      .list
      .as_ref()
      .map(|list| list.arena().start()..list.arena().end())
  }

  fn list(&self) -> Result<&ChunkList> {
    self.list.as_ref().ok_or(Error::Uninitialized)
  }

  fn list_mut(&mut self) -> Result<&mut ChunkList> {
    self.list.as_mut().ok_or(Error::Uninitialized)
  }

  /// Maps an arena of at least `size` bytes, rounded up to whole pages, and
  /// returns the number of bytes actually reserved.
  pub fn init(
    &mut self,
    size: usize,
  ) -> Result<usize> {
    if self.list.is_some() {
      return Err(Error::CallFailed("allocator is already initialized"));
    }

    if size == 0 || size > self.config.max_arena_size {
      return Err(Error::BadArguments);
    }

    let page = sys::page_size()?;
    let aligned = align_to!(size, page).ok_or(Error::BadArguments)?;

    let arena = Arena::map(aligned).inspect_err(|err| {
      log::warn!("init({size}): {err}");
    })?;

    log::debug!(
      "mapped arena {:#x}..{:#x} ({aligned} bytes for a {size} byte request)",
      arena.start(),
      arena.end()
    );

    self.list = Some(ChunkList::new(arena)?);

    Ok(aligned)
  }

  /// Unmaps the arena. Every pointer handed out so far becomes invalid.
  pub fn destroy(&mut self) -> Result<()> {
    let list = self.list.take().ok_or(Error::Uninitialized)?;
    let (start, len) = (list.arena().start(), list.arena().len());

    match list.release() {
      Ok(()) => {
        log::debug!("unmapped arena {start:#x} ({len} bytes)");
        Ok(())
      }
      Err((list, err)) => {
        log::warn!("destroy: {err}");
        self.list = Some(list);
        Err(err)
      }
    }
  }

  /// Hands out `size` payload bytes from the first free chunk that fits.
  pub fn mem_alloc(
    &mut self,
    size: usize,
  ) -> Result<NonNull<u8>> {
    let list = self.list_mut()?;

    if size == 0 {
      return Err(Error::BadArguments);
    }

    let Some(chunk) = list.find_first_fit(size)? else {
      log::trace!("mem_alloc({size}): no free chunk fits");
      return Err(Error::OutOfMemory { requested: size });
    };

    let chunk = split(list, chunk, size)?;
    let payload = list.payload_ptr(&chunk)?;

    log::trace!("mem_alloc({size}) -> {payload:p} [{chunk}]");

    Ok(payload)
  }

  /// Returns the chunk owning `ptr` to the free pool and merges it with any
  /// free neighbor.
  ///
  /// Pointers that are null, outside the arena, not at the start of a live
  /// chunk's payload, or already freed are rejected without touching the
  /// list.
  pub fn mem_free(
    &mut self,
    ptr: *mut u8,
  ) -> Result<()> {
    let list = self.list_mut()?;

    let mut chunk = list.lookup(ptr).inspect_err(|_| {
      log::warn!("mem_free({ptr:p}): pointer is not inside the arena");
    })?;

    if !list.is_linked(&chunk)? {
      log::warn!("mem_free({ptr:p}): pointer does not start a chunk");
      return Err(Error::BadArguments);
    }

    if chunk.is_free() {
      log::warn!("mem_free({ptr:p}): chunk is already free");
      return Err(Error::BadArguments);
    }

    chunk.is_free = true;
    list.write(&chunk)?;

    log::trace!("mem_free({ptr:p}) [{chunk}]");

    let (bwd, fwd) = (chunk.bwd(), chunk.fwd());

    if bwd.is_none() && fwd.is_none() {
      return Ok(());
    }

    if let Some(bwd) = bwd {
      if list.read(bwd)?.is_free() {
        merge(list, Some(bwd), Some(chunk.offset()))?;

        if let Some(fwd) = fwd {
          if list.read(fwd)?.is_free() {
            merge(list, Some(bwd), Some(fwd))?;
          }
        }

        return Ok(());
      }
    }

    if let Some(fwd) = fwd {
      if list.read(fwd)?.is_free() {
        merge(list, Some(chunk.offset()), Some(fwd))?;
      }
    }

    Ok(())
  }

  /// Merges `back` into `front`.
  ///
  /// Both chunks must be free and `back` must directly follow `front`.
  /// Passing the same chunk twice does nothing.
  pub fn coalesce(
    &mut self,
    front: Option<ChunkOffset>,
    back: Option<ChunkOffset>,
  ) -> Result<()> {
    merge(self.list_mut()?, front, back)
  }

  /// Header in front of `ptr`.
  ///
  /// Only bounds are checked; a pointer into the middle of a payload yields
  /// whatever bytes sit where a header would be.
  pub fn header(
    &self,
    ptr: *const u8,
  ) -> Result<Chunk> {
    self.list()?.lookup(ptr)
  }

  /// The chunk at the start of the arena.
  pub fn head(&self) -> Result<Chunk> {
    self.list()?.head()
  }

  /// Every chunk in address order.
  pub fn chunks(&self) -> Result<Chunks<'_>> {
    Ok(self.list()?.iter())
  }

  /// Verifies link symmetry, coverage of the arena and that no two free
  /// chunks are adjacent.
  pub fn check_invariants(&self) -> Result<()> {
    self.list()?.validate()
  }
}

impl Default for Allocator {
  fn default() -> Self {
    Self::new()
  }
}

/// Marks `chunk` allocated for `size` bytes, carving the tail off as a new
/// free chunk when it can hold at least a header.
fn split(
  list: &mut ChunkList,
  mut chunk: Chunk,
  size: usize,
) -> Result<Chunk> {
  let leftover = chunk.size() - size;

  if leftover == 0 {
    chunk.is_free = false;
    list.write(&chunk)?;
    return Ok(chunk);
  }

  if leftover < HEADER_SIZE {
    // Too small to ever hold a chunk; the caller never sees these bytes.
    chunk.is_free = false;
    list.write(&chunk)?;
    return Ok(chunk);
  }

  let remainder = Chunk::new(
    ChunkOffset::new(chunk.offset().payload() + size),
    leftover - HEADER_SIZE,
    true,
    chunk.fwd(),
    Some(chunk.offset()),
  );

  if let Some(next) = chunk.fwd() {
    let mut next = list.read(next)?;
    next.bwd = Some(remainder.offset());
    list.write(&next)?;
  }
  list.write(&remainder)?;

  chunk.size = size;
  chunk.fwd = Some(remainder.offset());
  chunk.is_free = false;
  list.write(&chunk)?;

  log::trace!("split {chunk} -> {remainder}");

  Ok(chunk)
}

fn merge(
  list: &mut ChunkList,
  front: Option<ChunkOffset>,
  back: Option<ChunkOffset>,
) -> Result<()> {
  let (Some(front), Some(back)) = (front, back) else {
    return Err(Error::BadArguments);
  };

  if front == back {
    return Ok(());
  }

  if front > back {
    return Err(Error::BadArguments);
  }

  let mut front = list.read(front)?;
  let back = list.read(back)?;

  if front.fwd() != Some(back.offset()) {
    return Err(Error::BadArguments);
  }

  if !(front.is_free() && back.is_free()) {
    return Err(Error::CallFailed("coalescing a chunk that is not free"));
  }

  front.size += back.size() + HEADER_SIZE;
  front.fwd = back.fwd();

  if let Some(next) = back.fwd() {
    let mut next = list.read(next)?;
    next.bwd = Some(front.offset());
    list.write(&next)?;
  }
  list.write(&front)?;

  log::trace!("coalesced {} into {front}", back.offset());

  Ok(())
}
