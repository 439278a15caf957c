use std::{fmt, marker::PhantomData, mem, ptr};

use crate::{arena::Arena, growth::grow_array_capacity};

/// Growable array of `Copy` values stored in an [`Arena`].
///
/// Arena blocks are byte-granular, so elements may sit at unaligned
/// addresses. They are only ever moved in and out by value with unaligned
/// reads and writes; no `&T` into the storage is handed out.
///
/// The first push reserves [`ARRAY_INIT_CAPACITY`](crate::ARRAY_INIT_CAPACITY) elements
/// and every later growth doubles the capacity through
/// [`Arena::realloc_slice`], leaving the old storage behind in the arena.
pub struct ArenaVec<'a, T: Copy> {
  arena: &'a Arena,
  data: &'a mut [u8],
  len: usize,
  _marker: PhantomData<T>,
}

impl<'a, T: Copy> ArenaVec<'a, T> {
  /// # Panics
  ///
  /// If `T` is zero-sized.
  pub fn new(arena: &'a Arena) -> Self {
    assert!(
      mem::size_of::<T>() != 0,
      "zero-sized element types are not supported"
    );

    Self {
      arena,
      data: &mut [],
      len: 0,
      _marker: PhantomData,
    }
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  pub fn capacity(&self) -> usize {
    self.data.len() / mem::size_of::<T>()
  }

  pub fn push(
    &mut self,
    value: T,
  ) {
    if self.len == self.capacity() {
      self.grow();
    }

    let index = self.len;
    self.len += 1;
    self.write(index, value);
  }

  /// Returns the element at `index`, or `None` past the end.
  pub fn get(
    &self,
    index: usize,
  ) -> Option<T> {
    if index >= self.len {
      return None;
    }

    Some(unsafe { ptr::read_unaligned(self.slot(index) as *const T) })
  }

  /// # Panics
  ///
  /// If `index >= self.len()`.
  pub fn at(
    &self,
    index: usize,
  ) -> T {
    match self.get(index) {
      Some(value) => value,
      None => panic!("index {index} out of bounds (len {})", self.len),
    }
  }

  /// # Panics
  ///
  /// If `index >= self.len()`.
  pub fn set_at(
    &mut self,
    index: usize,
    value: T,
  ) {
    assert!(
      index < self.len,
      "index {index} out of bounds (len {})",
      self.len
    );

    self.write(index, value);
  }

  pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
    (0..self.len).map(|index| self.at(index))
  }

  pub fn to_vec(&self) -> Vec<T> {
    self.iter().collect()
  }

  fn grow(&mut self) {
    let capacity = grow_array_capacity(self.capacity());
    let Some(bytes) = capacity.checked_mul(mem::size_of::<T>()) else {
      panic!("capacity overflow");
    };

    let old = mem::take(&mut self.data);
    self.data = self.arena.realloc_slice(old, bytes);
  }

  fn slot(
    &self,
    index: usize,
  ) -> *const u8 {
    self.data[index * mem::size_of::<T>()..][..mem::size_of::<T>()].as_ptr()
  }

  fn write(
    &mut self,
    index: usize,
    value: T,
  ) {
    let size = mem::size_of::<T>();
    let slot = self.data[index * size..][..size].as_mut_ptr();
    unsafe { ptr::write_unaligned(slot as *mut T, value) };
  }
}

impl<T: Copy + fmt::Debug> fmt::Debug for ArenaVec<'_, T> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_list().entries(self.iter()).finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::growth::ARRAY_INIT_CAPACITY;

  #[test]
  fn test_push_starts_at_init_capacity_then_doubles() {
    let arena = Arena::new(4096).unwrap();
    let mut values = ArenaVec::<u64>::new(&arena);
    assert_eq!(values.capacity(), 0);

    values.push(0);
    assert_eq!(values.capacity(), ARRAY_INIT_CAPACITY);

    for i in 1..300u64 {
      values.push(i * 3);
    }

    assert_eq!(values.len(), 300);
    assert_eq!(values.capacity(), 2 * ARRAY_INIT_CAPACITY);
    assert!((0..300).all(|i| values.at(i) == i as u64 * 3));

    // The outgrown storage stays in the arena.
    assert_eq!(arena.stats().used(), (256 + 512) * mem::size_of::<u64>());
  }

  #[test]
  fn test_unaligned_storage() {
    let arena = Arena::new(4096).unwrap();
    arena.allocate(1);

    let mut values = ArenaVec::<u32>::new(&arena);
    values.push(0xDEAD_BEEF);
    values.push(7);

    assert_eq!(values.to_vec(), vec![0xDEAD_BEEF, 7]);
  }

  #[test]
  fn test_get_and_set_at() {
    let arena = Arena::new(4096).unwrap();
    let mut points = ArenaVec::<(i32, i32)>::new(&arena);

    points.push((1, 2));
    points.push((3, 4));
    points.set_at(0, (-1, -2));

    assert_eq!(points.get(0), Some((-1, -2)));
    assert_eq!(points.at(1), (3, 4));
    assert_eq!(points.get(2), None);
    assert_eq!(format!("{points:?}"), "[(-1, -2), (3, 4)]");
  }

  #[test]
  #[should_panic(expected = "index 2 out of bounds (len 2)")]
  fn test_at_out_of_bounds() {
    let arena = Arena::new(4096).unwrap();
    let mut values = ArenaVec::<u16>::new(&arena);
    values.push(1);
    values.push(2);

    values.at(2);
  }

  #[test]
  #[should_panic(expected = "index 0 out of bounds (len 0)")]
  fn test_set_at_on_empty() {
    let arena = Arena::new(4096).unwrap();
    let mut values = ArenaVec::<u16>::new(&arena);

    values.set_at(0, 1);
  }

  #[test]
  #[should_panic(expected = "zero-sized")]
  fn test_zero_sized_elements_rejected() {
    let arena = Arena::new(64).unwrap();
    let _ = ArenaVec::<()>::new(&arena);
  }
}
