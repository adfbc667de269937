use std::fmt;

/// Usage counters of a single size class.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Statistic {
  /// Chunks currently handed out.
  pub count: usize,
  /// Highest `count` ever observed.
  pub peak: usize,
}

impl Statistic {
  pub const fn new(
    count: usize,
    peak: usize,
  ) -> Self {
    Self { count, peak }
  }

  #[inline]
  pub(crate) fn record_alloc(&mut self) {
    self.count += 1;
    self.peak = self.peak.max(self.count);
  }

  #[inline]
  pub(crate) fn record_free(&mut self) {
    self.count -= 1;
  }
}

/// Snapshot of one size class, as shown in a [`PoolReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeClassReport {
  pub chunk_size: usize,
  /// Chunks sitting on the free stack.
  pub free: usize,
  pub statistic: Statistic,
}

/// Point-in-time view over every size class, smallest chunk size first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolReport {
  pub size_classes: Vec<SizeClassReport>,
}

impl PoolReport {
  /// Chunks still outstanding across all size classes.
  pub fn outstanding(&self) -> usize {
    self.size_classes.iter().map(|class| class.statistic.count).sum()
  }

  /// Size classes that still have chunks handed out.
  pub fn leaked(&self) -> impl Iterator<Item = &SizeClassReport> {
    self.size_classes.iter().filter(|class| class.statistic.count > 0)
  }
}

impl fmt::Display for SizeClassReport {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(
      f,
      "Subpool[{}]: unfreed chunks: {}, peak usage: {}, free chunks: {}",
      self.chunk_size, self.statistic.count, self.statistic.peak, self.free
    )
  }
}

impl fmt::Display for PoolReport {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    for class in &self.size_classes {
      writeln!(f, "{class}")?;
    }
    Ok(())
  }
}
