//! Allocator configuration.

use std::env;

/// Largest arena `init` accepts unless configured otherwise.
pub const DEFAULT_MAX_ARENA_SIZE: usize = 0x7FFF_FFFF;

/// Environment variable read by [`AllocatorConfig::from_env`].
pub const MAX_ARENA_SIZE_ENV: &str = "FIRSTFIT_MAX_ARENA_SIZE";

/// Limits applied by an [`Allocator`](crate::Allocator).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocatorConfig {
  /// Upper bound on the byte size passed to `init`, checked before page
  /// rounding.
  pub max_arena_size: usize,
}

impl AllocatorConfig {
  pub fn new() -> Self {
    Self {
      max_arena_size: DEFAULT_MAX_ARENA_SIZE,
    }
  }

  pub fn with_max_arena_size(
    mut self,
    max_arena_size: usize,
  ) -> Self {
    self.max_arena_size = max_arena_size;
    self
  }

  /// Reads `FIRSTFIT_MAX_ARENA_SIZE` as a decimal byte count.
  ///
  /// Missing or malformed values fall back to [`DEFAULT_MAX_ARENA_SIZE`].
  pub fn from_env() -> Self {
    let config = Self::new();

    match env::var(MAX_ARENA_SIZE_ENV) {
      Ok(raw) => match raw.trim().parse::<usize>() {
        Ok(max) => config.with_max_arena_size(max),
        Err(_) => {
          log::warn!("ignoring malformed {MAX_ARENA_SIZE_ENV}={raw:?}");
          config
        }
      },
      Err(_) => config,
    }
  }
}

impl Default for AllocatorConfig {
  fn default() -> Self {
    Self::new()
  }
}
