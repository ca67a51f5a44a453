use std::fmt;
use std::mem;

/// Bytes occupied by a chunk header in front of every payload.
pub const HEADER_SIZE: usize = mem::size_of::<Header>();

const NONE: usize = usize::MAX;

/// On-arena header layout.
///
/// Every field is a machine word so any bit pattern read back from the arena
/// is a valid `Header`. Neighbors are stored as byte offsets from the arena
/// start, with `usize::MAX` meaning "no neighbor".
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub(crate) struct Header {
  size: usize,
  is_free: usize,
  fwd: usize,
  bwd: usize,
}

/// Byte offset of a chunk header from the start of its arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkOffset(usize);

impl ChunkOffset {
  /// The first chunk always starts at the arena base.
  pub const HEAD: Self = Self(0);

  pub(crate) fn new(offset: usize) -> Self {
    Self(offset)
  }

  pub fn get(self) -> usize {
    self.0
  }

  /// Offset of this chunk's payload.
  pub fn payload(self) -> usize {
    self.0 + HEADER_SIZE
  }

  fn encode(offset: Option<Self>) -> usize {
    offset.map_or(NONE, |offset| offset.0)
  }

  fn decode(raw: usize) -> Option<Self> {
    (raw != NONE).then_some(Self(raw))
  }
}

impl fmt::Display for ChunkOffset {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "+{:#x}", self.0)
  }
}

/// Decoded copy of a chunk header.
///
/// This is a snapshot: changing it does nothing until it is written back
/// through the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chunk {
  pub(crate) offset: ChunkOffset,
  pub(crate) size: usize,
  pub(crate) is_free: bool,
  pub(crate) fwd: Option<ChunkOffset>,
  pub(crate) bwd: Option<ChunkOffset>,
}

impl Chunk {
  pub(crate) fn new(
    offset: ChunkOffset,
    size: usize,
    is_free: bool,
    fwd: Option<ChunkOffset>,
    bwd: Option<ChunkOffset>,
  ) -> Self {
    Self {
      offset,
      size,
      is_free,
      fwd,
      bwd,
    }
  }

  pub(crate) fn from_header(
    offset: ChunkOffset,
    header: Header,
  ) -> Self {
    Self::new(
      offset,
      header.size,
      header.is_free != 0,
      ChunkOffset::decode(header.fwd),
      ChunkOffset::decode(header.bwd),
    )
  }

  pub(crate) fn to_header(self) -> Header {
    Header {
      size: self.size,
      is_free: self.is_free as usize,
      fwd: ChunkOffset::encode(self.fwd),
      bwd: ChunkOffset::encode(self.bwd),
    }
  }

  pub fn offset(&self) -> ChunkOffset {
    self.offset
  }

  /// Payload bytes, not counting the header.
  pub fn size(&self) -> usize {
    self.size
  }

  pub fn is_free(&self) -> bool {
    self.is_free
  }

  pub fn fwd(&self) -> Option<ChunkOffset> {
    self.fwd
  }

  pub fn bwd(&self) -> Option<ChunkOffset> {
    self.bwd
  }

  pub fn has_fwd(&self) -> bool {
    self.fwd.is_some()
  }

  pub fn has_bwd(&self) -> bool {
    self.bwd.is_some()
  }

  /// Offset one past the last payload byte, i.e. where the next header
  /// begins.
  pub(crate) fn end(&self) -> Option<usize> {
    self.offset.payload().checked_add(self.size)
  }
}

impl fmt::Display for Chunk {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    let link = |offset: Option<ChunkOffset>| match offset {
      Some(offset) => offset.to_string(),
      None => "-".to_string(),
    };

    write!(
      f,
      "chunk {} size={} fwd={} bwd={} is_free={}",
      self.offset,
      self.size,
      link(self.fwd),
      link(self.bwd),
      self.is_free
    )
  }
}

/// Prints a chunk header, one field per line.
pub fn print_chunk(chunk: &Chunk) {
  println!("Header->offset: {}", chunk.offset);
  println!("Header->size: {}", chunk.size);
  println!("Header->fwd: {:?}", chunk.fwd.map(ChunkOffset::get));
  println!("Header->bwd: {:?}", chunk.bwd.map(ChunkOffset::get));
  println!("Header->is_free: {}", chunk.is_free);
}
