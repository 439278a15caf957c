use std::{io, mem, ptr::{self, NonNull}};

use libc::{MAP_ANONYMOUS, MAP_FAILED, MAP_PRIVATE, PROT_READ, PROT_WRITE, c_void, mmap, munmap};
use tracing::debug;

use crate::error::{ArenaError, Result};

/// Header written at the front of every mapping.
///
/// ```text
///   ┌──────────────────┬──────────────────────────────────────────┐
///   │  Region header   │  usable bytes                            │
///   │  next, capacity, │  ┌────────── count ─────────┬─ remaining ┐│
///   │  count, ...      │  │ handed out               │            ││
///   └──────────────────┴──┴──────────────────────────┴────────────┘┘
///                      ▲                            ▲
///                    bytes                        cursor
/// ```
#[repr(C)]
pub struct Region {
  pub next: *mut Region,
  pub capacity: usize,
  pub count: usize,
  pub remaining: usize,
  pub bytes: *mut u8,
}

impl Region {
  pub const HEADER_SIZE: usize = mem::size_of::<Region>();

  /// Maps `size` bytes of zeroed anonymous memory and writes a header at the
  /// front. `size` must already be a page-rounded total that covers the header.
  pub fn map(size: usize) -> Result<NonNull<Region>> {
    debug_assert!(size >= Self::HEADER_SIZE);

    let address = unsafe {
      mmap(
        ptr::null_mut(),
        size,
        PROT_READ | PROT_WRITE,
        MAP_ANONYMOUS | MAP_PRIVATE,
        -1,
        0,
      )
    };

    if address == MAP_FAILED {
      return Err(ArenaError::MapFailed {
        size,
        source: io::Error::last_os_error(),
      });
    }

    let region = address as *mut Region;
    let capacity = size - Self::HEADER_SIZE;

    unsafe {
      region.write(Region {
        next: ptr::null_mut(),
        capacity,
        count: 0,
        remaining: capacity,
        bytes: (address as *mut u8).add(Self::HEADER_SIZE),
      });
    }

    debug!(?address, size, capacity, "mapped region");

    // mmap never hands out the null page on success.
    Ok(unsafe { NonNull::new_unchecked(region) })
  }

  /// Releases the mapping behind `region`.
  ///
  /// # Safety
  ///
  /// `region` must come from [`Region::map`] and must not be used afterwards.
  pub unsafe fn unmap(region: NonNull<Region>) -> Result<()> {
    unsafe {
      let size = Self::HEADER_SIZE + region.as_ref().capacity;
      let address = region.as_ptr() as *mut c_void;

      if munmap(address, size) != 0 {
        return Err(ArenaError::UnmapFailed {
          size,
          source: io::Error::last_os_error(),
        });
      }

      debug!(?address, size, "unmapped region");
    }

    Ok(())
  }

  /// Hands out `size` bytes at the cursor, or `None` if they do not fit.
  pub fn bump(
    &mut self,
    size: usize,
  ) -> Option<NonNull<u8>> {
    if size > self.remaining {
      return None;
    }

    let cursor = unsafe { self.bytes.add(self.count) };
    self.count += size;
    self.remaining -= size;

    NonNull::new(cursor)
  }

  /// Makes the whole capacity available again.
  pub fn reset(&mut self) {
    self.count = 0;
    self.remaining = self.capacity;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::os_page_size;

  #[test]
  fn test_map_and_bump() {
    let size = os_page_size();
    let mut region = Region::map(size).unwrap();

    unsafe {
      let r = region.as_mut();
      assert_eq!(r.capacity, size - Region::HEADER_SIZE);
      assert_eq!(r.remaining, r.capacity);
      assert_eq!(r.count, 0);
      assert!(r.next.is_null());
      assert_eq!(r.bytes, (region.as_ptr() as *mut u8).add(Region::HEADER_SIZE));

      // Fresh mappings are zeroed.
      assert!((0..r.capacity).all(|i| *r.bytes.add(i) == 0));

      let first = r.bump(10).unwrap();
      let second = r.bump(10).unwrap();
      assert_eq!(first.as_ptr(), r.bytes);
      assert_eq!(second.as_ptr(), r.bytes.add(10));
      assert_eq!(r.count, 20);
      assert_eq!(r.count + r.remaining, r.capacity);

      Region::unmap(region).unwrap();
    }
  }

  #[test]
  fn test_bump_exact_fit_then_miss() {
    let size = os_page_size();
    let mut region = Region::map(size).unwrap();

    unsafe {
      let r = region.as_mut();
      let capacity = r.capacity;

      assert!(r.bump(capacity + 1).is_none());
      assert_eq!(r.count, 0);

      assert!(r.bump(capacity).is_some());
      assert_eq!(r.remaining, 0);
      assert!(r.bump(1).is_none());

      // A zero-length request still succeeds and leaves the cursor alone.
      assert!(r.bump(0).is_some());
      assert_eq!(r.count, capacity);

      r.reset();
      assert_eq!(r.count, 0);
      assert_eq!(r.remaining, capacity);

      Region::unmap(region).unwrap();
    }
  }
}
