/// Rounds `value` up to the next multiple of `align`.
///
/// Evaluates to `None` when the rounded value does not fit in a `usize`.
/// `align` does not need to be a power of two.
///
/// # Examples
///
/// ```rust
/// use firstfit::align_to;
///
/// assert_eq!(align_to!(1usize, 4096usize), Some(4096));
/// assert_eq!(align_to!(4096usize, 4096usize), Some(4096));
/// assert_eq!(align_to!(4097usize, 4096usize), Some(8192));
/// assert_eq!(align_to!(usize::MAX, 4096usize), None);
/// ```
#[macro_export]
macro_rules! align_to {
  ($value:expr, $align:expr) => {
    ($value).div_ceil($align).checked_mul($align)
  };
}
