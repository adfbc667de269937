use std::{mem, ptr::NonNull};

use libc::{c_void, posix_memalign};

use crate::error::{MempoolError, Result};

/// One contiguous block of raw memory, reserved once and released on drop.
///
/// ```text
///   base                                     base + len
///   ┌───┬───┬───┬────┬────┬───┬────┬───┬─────────┐
///   │ 8 │ 8 │ … │ 16 │ 16 │ … │ 32 │ … │ padding │
///   └───┴───┴───┴────┴────┴───┴────┴───┴─────────┘
///   chunks are carved front to back, padding is never handed out
/// ```
pub struct Arena {
  base: NonNull<u8>,
  len: usize,
  alignment: usize,
}

// The arena is a plain byte region; all access goes through the pool lock.
unsafe impl Send for Arena {}
unsafe impl Sync for Arena {}

impl Arena {
  /// Reserves `len` bytes aligned to `alignment` (a power of two).
  ///
  /// A zero-byte arena does not touch the system allocator.
  pub fn reserve(
    len: usize,
    alignment: usize,
  ) -> Result<Self> {
    debug_assert!(alignment.is_power_of_two());

    if len == 0 {
      return Ok(Self {
        base: NonNull::dangling(),
        len,
        alignment,
      });
    }

    // posix_memalign wants at least pointer alignment. Any larger power of
    // two is still a multiple of the requested one.
    let sys_alignment = alignment.max(mem::size_of::<*mut c_void>());
    let mut raw: *mut c_void = std::ptr::null_mut();

    let status = unsafe { posix_memalign(&mut raw, sys_alignment, len) };

    let base = match NonNull::new(raw as *mut u8) {
      Some(base) if status == 0 => base,
      _ => {
        return Err(MempoolError::ArenaReservation {
          size: len,
          alignment,
        });
      }
    };

    debug_assert_eq!(base.as_ptr().align_offset(alignment), 0);

    Ok(Self {
      base,
      len,
      alignment,
    })
  }

  #[inline]
  pub fn base(&self) -> usize {
    self.base.as_ptr() as usize
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.len
  }

  #[inline]
  pub fn alignment(&self) -> usize {
    self.alignment
  }

  /// Pointer to the byte at `offset`. `offset` must lie inside the arena.
  #[inline]
  pub(crate) fn ptr_at(
    &self,
    offset: usize,
  ) -> NonNull<u8> {
    debug_assert!(offset < self.len);
    unsafe { self.base.add(offset) }
  }

  /// Offset of `ptr` from the arena base, `None` when it points elsewhere.
  #[inline]
  pub fn offset_of(
    &self,
    ptr: *const u8,
  ) -> Option<usize> {
    let addr = ptr as usize;
    self.contains(addr).then(|| addr - self.base())
  }

  /// Whether `addr` falls inside the reserved region.
  #[inline]
  pub fn contains(
    &self,
    addr: usize,
  ) -> bool {
    addr >= self.base() && addr - self.base() < self.len
  }
}

impl Drop for Arena {
  fn drop(&mut self) {
    if self.len == 0 {
      return;
    }

    unsafe { libc::free(self.base.as_ptr() as *mut c_void) };
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_reserve_aligned() {
    for alignment in [1, 2, 8, 64, 256, 2048] {
      let arena = Arena::reserve(2048, alignment).unwrap();

      assert_eq!(arena.len(), 2048);
      assert_eq!(arena.alignment(), alignment);
      assert_eq!(arena.base() % alignment, 0);
    }
  }

  #[test]
  fn test_arena_is_writable() {
    let arena = Arena::reserve(256, 256).unwrap();

    unsafe {
      let base = arena.base() as *mut u8;
      std::ptr::write_bytes(base, 0xAB, arena.len());

      for i in 0..arena.len() {
        assert_eq!(*base.add(i), 0xAB);
      }
    }
  }

  #[test]
  fn test_contains() {
    let arena = Arena::reserve(64, 64).unwrap();
    let base = arena.base();

    assert!(arena.contains(base));
    assert!(arena.contains(base + 63));
    assert!(!arena.contains(base + 64));
    assert!(!arena.contains(base.wrapping_sub(1)));
  }

  #[test]
  fn test_offset_of() {
    let arena = Arena::reserve(128, 64).unwrap();

    assert_eq!(arena.offset_of(arena.ptr_at(40).as_ptr()), Some(40));
    assert_eq!(arena.offset_of(std::ptr::null()), None);
    assert_eq!(arena.offset_of((arena.base() + 128) as *const u8), None);
  }

  #[test]
  fn test_empty_arena() {
    let arena = Arena::reserve(0, 64).unwrap();

    assert_eq!(arena.len(), 0);
    assert!(!arena.contains(arena.base()));
  }
}
