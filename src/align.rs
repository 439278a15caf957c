use crate::region::Region;

/// Rounds `value` up to the next multiple of `to`, which must be a power of two.
///
/// # Examples
///
/// ```rust
/// use marena::align;
///
/// assert_eq!(align!(1, 4096), 4096);
/// assert_eq!(align!(4096, 4096), 4096);
/// assert_eq!(align!(4097, 4096), 8192);
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr, $to:expr) => {
    ($value + $to - 1) & !($to - 1)
  };
}

/// Total mapping size needed for a region with `requested` usable bytes:
/// the region header plus the payload, rounded up to whole pages.
///
/// Returns `None` if the computation overflows `usize` or `page_size` is 0.
pub fn region_size(
  requested: usize,
  page_size: usize,
) -> Option<usize> {
  let total = Region::HEADER_SIZE.checked_add(requested)?;
  total.checked_add(page_size.checked_sub(1)?)?;

  Some(align!(total, page_size))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_align() {
    let page = 4096;

    let mut alignments = Vec::new();

    for i in 0..10 {
      let sizes = (page * i + 1)..=(page * (i + 1));

      let expected_alignment = page * (i + 1);

      alignments.push((sizes, expected_alignment));
    }

    for (sizes, expected) in alignments {
      for size in sizes.step_by(97) {
        assert_eq!(expected, align!(size, page));
      }
    }
  }

  #[test]
  fn test_region_size_includes_header() {
    let page = 4096;

    assert_eq!(region_size(0, page), Some(page));
    assert_eq!(region_size(page - Region::HEADER_SIZE, page), Some(page));
    assert_eq!(region_size(page - Region::HEADER_SIZE + 1, page), Some(2 * page));
    assert_eq!(region_size(page, page), Some(2 * page));
  }

  #[test]
  fn test_region_size_is_stable_on_aligned_payload() {
    let page = 64;

    for requested in 0..1000 {
      let size = region_size(requested, page).unwrap();
      assert_eq!(size % page, 0);
      assert!(size >= Region::HEADER_SIZE + requested);
      assert_eq!(region_size(size - Region::HEADER_SIZE, page), Some(size));
    }
  }

  #[test]
  fn test_region_size_overflow() {
    assert_eq!(region_size(usize::MAX, 4096), None);
    assert_eq!(region_size(usize::MAX - Region::HEADER_SIZE, 4096), None);
  }

  #[test]
  fn test_region_size_zero_page() {
    assert_eq!(region_size(0, 0), None);
    assert_eq!(region_size(4096, 0), None);
  }
}
