use thiserror::Error;

/// Construction-time failures.
///
/// Every variant describes a configuration defect: a pool is never handed
/// out when one of these is returned. Runtime exhaustion is not an error,
/// `Mempool::alloc` reports it as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MempoolError {
  #[error("alignment {0} is not a non-zero power of two")]
  InvalidAlignment(usize),

  #[error("size class declared with a zero chunk size")]
  ZeroChunkSize,

  #[error("chunk size {chunk_size} does not divide alignment {alignment}")]
  ChunkSizeNotDivisor { chunk_size: usize, alignment: usize },

  #[error("pool footprint of {total} bytes exceeds the {max} byte ceiling")]
  CapacityExceeded { total: usize, max: usize },

  #[error("could not reserve a {size} byte arena aligned to {alignment}")]
  ArenaReservation { size: usize, alignment: usize },

  #[error("invalid pool configuration: {0}")]
  Config(String),
}

impl From<toml::de::Error> for MempoolError {
  fn from(err: toml::de::Error) -> Self {
    MempoolError::Config(err.message().to_string())
  }
}

pub type Result<T> = std::result::Result<T, MempoolError>;
