/// Element capacity a typed array starts with on its first push.
pub const ARRAY_INIT_CAPACITY: usize = 256;

/// Capacity needed to hold `len + additional` bytes: the next power of two,
/// or the exact requirement when the power of two does not fit in `usize`.
///
/// # Panics
///
/// If `len + additional` itself overflows.
pub fn next_capacity(
  len: usize,
  additional: usize,
) -> usize {
  let Some(required) = len.checked_add(additional) else {
    panic!("capacity overflow");
  };

  required.checked_next_power_of_two().unwrap_or(required)
}

/// Doubling policy for typed arrays, starting at [`ARRAY_INIT_CAPACITY`].
///
/// # Panics
///
/// If doubling overflows.
pub fn grow_array_capacity(current: usize) -> usize {
  if current == 0 {
    return ARRAY_INIT_CAPACITY;
  }

  let Some(doubled) = current.checked_mul(2) else {
    panic!("capacity overflow");
  };
  doubled
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_next_capacity() {
    assert_eq!(next_capacity(0, 0), 1);
    assert_eq!(next_capacity(0, 1), 1);
    assert_eq!(next_capacity(3, 2), 8);
    assert_eq!(next_capacity(60, 4), 64);
    assert_eq!(next_capacity(64, 1), 128);
  }

  #[test]
  fn test_next_capacity_falls_back_to_exact() {
    let huge = usize::MAX / 2 + 2;
    assert_eq!(next_capacity(huge, 0), huge);
  }

  #[test]
  #[should_panic(expected = "capacity overflow")]
  fn test_next_capacity_overflow() {
    next_capacity(usize::MAX, 1);
  }

  #[test]
  fn test_grow_array_capacity() {
    assert_eq!(grow_array_capacity(0), ARRAY_INIT_CAPACITY);
    assert_eq!(grow_array_capacity(256), 512);
    assert_eq!(grow_array_capacity(512), 1024);
  }

  #[test]
  #[should_panic(expected = "capacity overflow")]
  fn test_grow_array_capacity_overflow() {
    grow_array_capacity(usize::MAX / 2 + 1);
  }
}
