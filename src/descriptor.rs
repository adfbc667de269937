use serde::Deserialize;

/// Declares one size class: `chunk_count` chunks of `chunk_size` bytes each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SizeClassDescriptor {
  pub chunk_size: usize,
  pub chunk_count: usize,
}

/// Ordered list of size classes a pool is carved from.
pub type MempoolConfig = Vec<SizeClassDescriptor>;

impl SizeClassDescriptor {
  pub const fn new(
    chunk_size: usize,
    chunk_count: usize,
  ) -> Self {
    Self {
      chunk_size,
      chunk_count,
    }
  }

  /// Bytes this size class occupies in the arena, `None` on overflow.
  pub const fn footprint(&self) -> Option<usize> {
    self.chunk_size.checked_mul(self.chunk_count)
  }
}

impl From<(usize, usize)> for SizeClassDescriptor {
  fn from((chunk_size, chunk_count): (usize, usize)) -> Self {
    Self::new(chunk_size, chunk_count)
  }
}
