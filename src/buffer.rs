use std::{fmt, mem, str};

use crate::{arena::Arena, growth::next_capacity};

/// Growable byte buffer whose storage lives in an [`Arena`].
///
/// Growth goes through [`Arena::realloc_slice`], so every time the buffer
/// outgrows its capacity the previous storage stays behind in the arena as
/// dead space. Capacities grow to the next power of two.
pub struct ArenaBuf<'a> {
  arena: &'a Arena,
  data: &'a mut [u8],
  len: usize,
}

impl<'a> ArenaBuf<'a> {
  pub fn new(arena: &'a Arena) -> Self {
    Self {
      arena,
      data: &mut [],
      len: 0,
    }
  }

  pub fn with_capacity(
    arena: &'a Arena,
    capacity: usize,
  ) -> Self {
    Self {
      arena,
      data: arena.alloc_slice(capacity),
      len: 0,
    }
  }

  pub fn from_bytes(
    arena: &'a Arena,
    bytes: &[u8],
  ) -> Self {
    let mut buf = Self::new(arena);
    buf.append(bytes);
    buf
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  pub fn capacity(&self) -> usize {
    self.data.len()
  }

  pub fn as_bytes(&self) -> &[u8] {
    &self.data[..self.len]
  }

  pub fn as_str(&self) -> Result<&str, str::Utf8Error> {
    str::from_utf8(self.as_bytes())
  }

  /// # Panics
  ///
  /// If `index >= self.len()`.
  pub fn at(
    &self,
    index: usize,
  ) -> u8 {
    assert!(
      index < self.len,
      "index {index} out of bounds (len {})",
      self.len
    );

    self.data[index]
  }

  /// # Panics
  ///
  /// If `index >= self.len()`.
  pub fn set_at(
    &mut self,
    index: usize,
    byte: u8,
  ) {
    assert!(
      index < self.len,
      "index {index} out of bounds (len {})",
      self.len
    );

    self.data[index] = byte;
  }

  /// Makes room for `additional` more bytes.
  pub fn reserve(
    &mut self,
    additional: usize,
  ) {
    if additional <= self.capacity() - self.len {
      return;
    }

    let capacity = next_capacity(self.len, additional);
    let old = mem::take(&mut self.data);
    self.data = self.arena.realloc_slice(old, capacity);
  }

  pub fn push(
    &mut self,
    byte: u8,
  ) {
    self.append(&[byte]);
  }

  pub fn append(
    &mut self,
    bytes: &[u8],
  ) {
    self.insert(self.len, bytes);
  }

  pub fn append_buf(
    &mut self,
    other: &ArenaBuf<'_>,
  ) {
    self.append(other.as_bytes());
  }

  /// Inserts `bytes` at `pos`, shifting the tail to the right.
  ///
  /// # Panics
  ///
  /// If `pos > self.len()`.
  pub fn insert(
    &mut self,
    pos: usize,
    bytes: &[u8],
  ) {
    assert!(
      pos <= self.len,
      "insert position {pos} out of bounds (len {})",
      self.len
    );

    let n = bytes.len();
    self.reserve(n);

    self.data.copy_within(pos..self.len, pos + n);
    self.data[pos..pos + n].copy_from_slice(bytes);
    self.len += n;
  }

  /// Replaces the contents with `bytes`, keeping the current storage when it
  /// is large enough.
  pub fn set(
    &mut self,
    bytes: &[u8],
  ) {
    self.clear();
    self.append(bytes);
  }

  pub fn clear(&mut self) {
    self.len = 0;
  }
}

impl AsRef<[u8]> for ArenaBuf<'_> {
  fn as_ref(&self) -> &[u8] {
    self.as_bytes()
  }
}

impl fmt::Display for ArenaBuf<'_> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.write_str(&String::from_utf8_lossy(self.as_bytes()))
  }
}

impl fmt::Debug for ArenaBuf<'_> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("ArenaBuf")
      .field("len", &self.len)
      .field("capacity", &self.capacity())
      .field("bytes", &String::from_utf8_lossy(self.as_bytes()))
      .finish()
  }
}
