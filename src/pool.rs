use std::{
  collections::{BTreeMap, HashMap},
  ptr::NonNull,
};

use log::{debug, info, trace, warn};
use parking_lot::Mutex;

use crate::{
  arena::Arena,
  config::PoolConfig,
  descriptor::SizeClassDescriptor,
  error::{MempoolError, Result},
  stats::{PoolReport, SizeClassReport, Statistic},
};

/// Mutable pool bookkeeping. Everything in here is guarded by one lock.
///
/// Chunks are tracked as byte offsets from the arena base, so a chunk is
/// always either on its size class stack in `sub_pools` or a key of
/// `allocs`, never both.
struct PoolState {
  /// chunk size -> LIFO stack of free chunk offsets.
  sub_pools: BTreeMap<usize, Vec<usize>>,
  /// live chunk offset -> chunk size it was drawn from.
  allocs: HashMap<usize, usize>,
  stats: BTreeMap<usize, Statistic>,
}

impl PoolState {
  /// Lays the size classes out back to back, in configuration order.
  fn carve(config: &PoolConfig) -> Self {
    let mut sub_pools: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    let mut stats = BTreeMap::new();
    let mut offset = 0;
    let mut total_chunks = 0;

    for &SizeClassDescriptor {
      chunk_size,
      chunk_count,
    } in &config.size_classes
    {
      stats.entry(chunk_size).or_default();

      let free = sub_pools.entry(chunk_size).or_default();
      free.reserve_exact(chunk_count);

      for _ in 0..chunk_count {
        free.push(offset);
        offset += chunk_size;
      }

      total_chunks += chunk_count;
    }

    // Sized for every chunk at once: neither the stacks nor the index ever
    // grow after construction.
    Self {
      sub_pools,
      allocs: HashMap::with_capacity(total_chunks),
      stats,
    }
  }

  fn alloc(
    &mut self,
    size: usize,
  ) -> Option<(usize, usize)> {
    let (&largest, _) = self.sub_pools.last_key_value()?;
    if largest < size {
      return None;
    }

    // Ceiling search, then walk up into bigger classes until one has a
    // free chunk left.
    let (chunk_size, offset) = self
      .sub_pools
      .range_mut(size..)
      .find_map(|(&chunk_size, free)| free.pop().map(|offset| (chunk_size, offset)))?;

    self.allocs.insert(offset, chunk_size);
    self.stats.entry(chunk_size).or_default().record_alloc();

    Some((chunk_size, offset))
  }

  fn free(
    &mut self,
    offset: usize,
  ) -> Option<usize> {
    let chunk_size = self.allocs.remove(&offset)?;

    // `carve` created both entries for every chunk size in `allocs`.
    self.sub_pools.entry(chunk_size).or_default().push(offset);
    self.stats.entry(chunk_size).or_default().record_free();

    Some(chunk_size)
  }

  fn report(&self) -> PoolReport {
    let size_classes = self
      .stats
      .iter()
      .map(|(&chunk_size, &statistic)| SizeClassReport {
        chunk_size,
        free: self.sub_pools.get(&chunk_size).map_or(0, Vec::len),
        statistic,
      })
      .collect();

    PoolReport { size_classes }
  }
}

/// Fixed-capacity allocator serving chunks out of segregated size classes.
///
/// All memory is reserved by [`Mempool::new`]. Afterwards `alloc` and `free`
/// only move chunks between the free stacks and the live index, both under a
/// single mutex, so a `Mempool` can be shared between threads as is.
///
/// ```rust
/// use rmempool::{Mempool, SizeClassDescriptor};
///
/// let pool = Mempool::new(
///   [SizeClassDescriptor::new(8, 20), SizeClassDescriptor::new(16, 15)],
///   2048,
/// )
/// .unwrap();
///
/// let chunk = pool.alloc(12).unwrap();
/// assert_eq!(pool.chunk_size_of(chunk.as_ptr()), Some(16));
///
/// pool.free(chunk.as_ptr());
/// assert_eq!(pool.outstanding(), 0);
/// ```
pub struct Mempool {
  state: Mutex<PoolState>,
  arena: Arena,
}

impl Mempool {
  /// Builds a pool from size class descriptors and an arena alignment.
  ///
  /// Fails without reserving anything if a chunk size does not divide
  /// `alignment`, or the summed footprint is above [`crate::MAX_POOL_SIZE`].
  pub fn new(
    size_classes: impl IntoIterator<Item = SizeClassDescriptor>,
    alignment: usize,
  ) -> Result<Self> {
    Self::from_config(&PoolConfig::new(size_classes, alignment))
  }

  pub fn from_config(config: &PoolConfig) -> Result<Self> {
    config.validate()?;

    let arena_size = config
      .arena_size()
      .ok_or(MempoolError::ArenaReservation {
        size: usize::MAX,
        alignment: config.alignment,
      })?;

    let arena = Arena::reserve(arena_size, config.alignment)?;
    let state = PoolState::carve(config);

    debug!(
      "mempool ready: {} size classes, {} byte arena at {:#x} aligned to {}",
      state.sub_pools.len(),
      arena.len(),
      arena.base(),
      arena.alignment()
    );

    Ok(Self {
      state: Mutex::new(state),
      arena,
    })
  }

  /// Hands out a chunk of at least `size` bytes.
  ///
  /// Draws from the smallest size class that fits, falling through to
  /// larger classes when it is exhausted. Returns `None` when nothing at
  /// or above `size` is free, which callers are expected to handle.
  pub fn alloc(
    &self,
    size: usize,
  ) -> Option<NonNull<u8>> {
    let allocated = self.state.lock().alloc(size);

    match allocated {
      Some((chunk_size, offset)) => {
        trace!("alloc({size}) -> chunk {offset:#x} from subpool[{chunk_size}]");
        Some(self.arena.ptr_at(offset))
      }
      None => {
        trace!("alloc({size}) failed: no free chunk large enough");
        None
      }
    }
  }

  /// Returns a chunk to its size class.
  ///
  /// Pointers the pool did not hand out, null, and chunks already freed are
  /// ignored.
  pub fn free(
    &self,
    ptr: *mut u8,
  ) {
    let Some(offset) = self.arena.offset_of(ptr) else {
      debug!("free({ptr:?}) ignored: pointer is outside the arena");
      return;
    };

    let released = self.state.lock().free(offset);

    match released {
      Some(chunk_size) => trace!("free({ptr:?}) -> subpool[{chunk_size}]"),
      None => debug!("free({ptr:?}) ignored: chunk is not allocated"),
    }
  }

  /// Size of the chunk behind a live allocation.
  pub fn chunk_size_of(
    &self,
    ptr: *const u8,
  ) -> Option<usize> {
    let offset = self.arena.offset_of(ptr)?;
    self.state.lock().allocs.get(&offset).copied()
  }

  /// Whether `ptr` is a chunk currently handed out by this pool.
  pub fn owns(
    &self,
    ptr: *const u8,
  ) -> bool {
    self.chunk_size_of(ptr).is_some()
  }

  /// Chunk sizes of every size class, ascending.
  pub fn size_classes(&self) -> Vec<usize> {
    self.state.lock().stats.keys().copied().collect()
  }

  /// Chunks left on the free stack of `chunk_size`.
  pub fn free_chunks(
    &self,
    chunk_size: usize,
  ) -> Option<usize> {
    self.state.lock().sub_pools.get(&chunk_size).map(Vec::len)
  }

  pub fn statistic(
    &self,
    chunk_size: usize,
  ) -> Option<Statistic> {
    self.state.lock().stats.get(&chunk_size).copied()
  }

  /// Copy of the per size class statistics.
  pub fn stats(&self) -> BTreeMap<usize, Statistic> {
    self.state.lock().stats.clone()
  }

  /// Total chunks currently handed out.
  pub fn outstanding(&self) -> usize {
    self.state.lock().allocs.len()
  }

  pub fn report(&self) -> PoolReport {
    self.state.lock().report()
  }

  /// Arena size in bytes, alignment padding included.
  pub fn arena_size(&self) -> usize {
    self.arena.len()
  }

  pub fn alignment(&self) -> usize {
    self.arena.alignment()
  }
}

impl Drop for Mempool {
  fn drop(&mut self) {
    let report = self.state.get_mut().report();

    for class in &report.size_classes {
      if class.statistic.count > 0 {
        warn!("{class}");
      } else {
        info!("{class}");
      }
    }
  }
}
