/// Rounds `value` up to the next multiple of `alignment`.
///
/// `alignment` must be a power of two, the arena sizing code validates that
/// before it ever reaches this macro.
///
/// # Examples
///
/// ```rust
/// use rmempool::align_to;
///
/// assert_eq!(align_to!(0, 64), 0);
/// assert_eq!(align_to!(1, 64), 64);
/// assert_eq!(align_to!(440, 2048), 2048);
/// assert_eq!(align_to!(4096, 2048), 4096);
/// ```
#[macro_export]
macro_rules! align_to {
  ($value:expr, $alignment:expr) => {
    (($value) + ($alignment) - 1) & !(($alignment) - 1)
  };
}
