use serde::Deserialize;

use crate::{
  align_to,
  descriptor::{MempoolConfig, SizeClassDescriptor},
  error::{MempoolError, Result},
};

/// Hard ceiling on the summed footprint of all size classes, in bytes.
pub const MAX_POOL_SIZE: usize = 2048;

/// Full pool configuration: the size classes plus the arena alignment.
///
/// Can be built in code or loaded from TOML:
///
/// ```toml
/// alignment = 2048
///
/// [[size_classes]]
/// chunk_size = 8
/// chunk_count = 20
///
/// [[size_classes]]
/// chunk_size = 16
/// chunk_count = 15
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PoolConfig {
  pub alignment: usize,
  #[serde(default)]
  pub size_classes: MempoolConfig,
}

impl PoolConfig {
  pub fn new(
    size_classes: impl IntoIterator<Item = SizeClassDescriptor>,
    alignment: usize,
  ) -> Self {
    Self {
      alignment,
      size_classes: size_classes.into_iter().collect(),
    }
  }

  pub fn from_toml_str(source: &str) -> Result<Self> {
    let config: PoolConfig = toml::from_str(source)?;
    config.validate()?;
    Ok(config)
  }

  /// Exact byte count covered by chunks, before alignment padding.
  pub fn total_size(&self) -> Option<usize> {
    self
      .size_classes
      .iter()
      .try_fold(0usize, |total, descriptor| total.checked_add(descriptor.footprint()?))
  }

  /// Arena size: `total_size` rounded up to the alignment.
  pub fn arena_size(&self) -> Option<usize> {
    if !self.alignment.is_power_of_two() {
      return None;
    }

    let total = self.total_size()?;
    total.checked_add(self.alignment - 1)?;
    Some(align_to!(total, self.alignment))
  }

  /// Checks every rule a pool needs before any memory is reserved.
  ///
  /// Chunk sizes must divide the alignment, not merely be compatible with
  /// it.
  pub fn validate(&self) -> Result<()> {
    if !self.alignment.is_power_of_two() {
      return Err(MempoolError::InvalidAlignment(self.alignment));
    }

    for descriptor in &self.size_classes {
      if descriptor.chunk_size == 0 {
        return Err(MempoolError::ZeroChunkSize);
      }

      if self.alignment % descriptor.chunk_size != 0 {
        return Err(MempoolError::ChunkSizeNotDivisor {
          chunk_size: descriptor.chunk_size,
          alignment: self.alignment,
        });
      }
    }

    match self.total_size() {
      Some(total) if total <= MAX_POOL_SIZE => Ok(()),
      total => Err(MempoolError::CapacityExceeded {
        total: total.unwrap_or(usize::MAX),
        max: MAX_POOL_SIZE,
      }),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn config(
    classes: &[(usize, usize)],
    alignment: usize,
  ) -> PoolConfig {
    PoolConfig::new(classes.iter().copied().map(SizeClassDescriptor::from), alignment)
  }

  #[test]
  fn test_valid_config() {
    let config = config(&[(8, 20), (16, 15), (32, 10)], 2048);

    assert_eq!(config.validate(), Ok(()));
    assert_eq!(config.total_size(), Some(720));
    assert_eq!(config.arena_size(), Some(2048));
  }

  #[test]
  fn test_chunk_size_must_divide_alignment() {
    let config = config(&[(8, 20), (16, 15), (21, 10), (32, 5)], 256);

    assert_eq!(
      config.validate(),
      Err(MempoolError::ChunkSizeNotDivisor {
        chunk_size: 21,
        alignment: 256
      })
    );
  }

  #[test]
  fn test_total_size_ceiling() {
    let config = config(&[(8, 1000)], 256);

    assert_eq!(
      config.validate(),
      Err(MempoolError::CapacityExceeded {
        total: 8000,
        max: MAX_POOL_SIZE
      })
    );
  }

  #[test]
  fn test_footprint_overflow_is_rejected() {
    let config = config(&[(8, usize::MAX / 4)], 256);

    assert_eq!(config.total_size(), None);
    assert!(matches!(
      config.validate(),
      Err(MempoolError::CapacityExceeded { .. })
    ));
  }

  #[test]
  fn test_alignment_must_be_power_of_two() {
    assert_eq!(
      config(&[(8, 1)], 0).validate(),
      Err(MempoolError::InvalidAlignment(0))
    );
    assert_eq!(
      config(&[(8, 1)], 24).validate(),
      Err(MempoolError::InvalidAlignment(24))
    );
  }

  #[test]
  fn test_zero_chunk_size() {
    assert_eq!(
      config(&[(0, 4)], 64).validate(),
      Err(MempoolError::ZeroChunkSize)
    );
  }

  #[test]
  fn test_empty_config_is_valid() {
    let config = config(&[], 64);

    assert_eq!(config.validate(), Ok(()));
    assert_eq!(config.arena_size(), Some(0));
  }

  #[test]
  fn test_from_toml_str() {
    let source = r#"
      alignment = 2048

      [[size_classes]]
      chunk_size = 8
      chunk_count = 20

      [[size_classes]]
      chunk_size = 16
      chunk_count = 15
    "#;

    let config = PoolConfig::from_toml_str(source).unwrap();

    assert_eq!(config.alignment, 2048);
    assert_eq!(
      config.size_classes,
      vec![SizeClassDescriptor::new(8, 20), SizeClassDescriptor::new(16, 15)]
    );
  }

  #[test]
  fn test_from_toml_str_rejects_invalid() {
    let malformed = "alignment = \"big\"";
    assert!(matches!(
      PoolConfig::from_toml_str(malformed),
      Err(MempoolError::Config(_))
    ));

    let not_divisor = r#"
      alignment = 256

      [[size_classes]]
      chunk_size = 15
      chunk_count = 4
    "#;
    assert!(matches!(
      PoolConfig::from_toml_str(not_divisor),
      Err(MempoolError::ChunkSizeNotDivisor { chunk_size: 15, .. })
    ));
  }
}
