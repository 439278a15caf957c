use libc::{_SC_PAGESIZE, sysconf};
use once_cell::sync::Lazy;

use crate::error::{ArenaError, Result};

/// Page size of the running system, queried once.
static OS_PAGE_SIZE: Lazy<usize> = Lazy::new(|| {
  let size = unsafe { sysconf(_SC_PAGESIZE) };
  if size > 0 { size as usize } else { 4096 }
});

/// Returns the page size reported by the operating system.
pub fn os_page_size() -> usize {
  *OS_PAGE_SIZE
}

/// Sizing knobs for an [`Arena`](crate::Arena).
///
/// Both values default to what the OS reports: the page size comes from
/// `sysconf(_SC_PAGESIZE)` and the region floor is two pages. Overrides exist
/// so tests can use tiny pages and floors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArenaConfig {
  page_size: Option<usize>,
  region_floor: Option<usize>,
}

impl ArenaConfig {
  pub fn new() -> Self {
    Self::default()
  }

  /// Rounds region mappings to `page_size` instead of the OS page size.
  pub fn with_page_size(
    mut self,
    page_size: usize,
  ) -> Self {
    self.page_size = Some(page_size);
    self
  }

  /// Minimum usable size of a region appended on a miss.
  pub fn with_region_floor(
    mut self,
    region_floor: usize,
  ) -> Self {
    self.region_floor = Some(region_floor);
    self
  }

  pub fn page_size(&self) -> usize {
    self.page_size.unwrap_or_else(os_page_size)
  }

  pub fn region_floor(&self) -> usize {
    self.region_floor.unwrap_or_else(|| self.page_size() * 2)
  }

  pub fn validate(&self) -> Result<()> {
    let page_size = self.page_size();
    if page_size == 0 || !page_size.is_power_of_two() {
      return Err(ArenaError::InvalidConfig(format!(
        "page size {page_size} is not a power of two"
      )));
    }

    if self.region_floor() == 0 {
      return Err(ArenaError::InvalidConfig("region floor must be non-zero".into()));
    }

    Ok(())
  }
}
