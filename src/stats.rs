use std::fmt;

/// Snapshot of a single region in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionStats {
  /// Position in the chain, head is 0.
  pub index: usize,
  /// Address of the region header.
  pub address: usize,
  /// Address of the first usable byte.
  pub start: usize,
  pub capacity: usize,
  pub used: usize,
  pub free: usize,
}

/// Snapshot of every region of an arena, in chain order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArenaReport {
  pub regions: Vec<RegionStats>,
}

impl ArenaReport {
  pub fn capacity(&self) -> usize {
    self.regions.iter().map(|r| r.capacity).sum()
  }

  pub fn used(&self) -> usize {
    self.regions.iter().map(|r| r.used).sum()
  }

  pub fn free(&self) -> usize {
    self.regions.iter().map(|r| r.free).sum()
  }
}

impl fmt::Display for RegionStats {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    writeln!(f, "===> Region {}:", self.index)?;
    writeln!(f, "Address:    {:#x}", self.address)?;
    writeln!(f, "Starts at:  {:#x}", self.start)?;
    writeln!(f, "Capacity:   {} bytes", self.capacity)?;
    writeln!(f, "Used:       {} bytes", self.used)?;
    writeln!(f, "Free:       {} bytes", self.free)
  }
}

impl fmt::Display for ArenaReport {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    writeln!(f, "=============================")?;
    for region in &self.regions {
      writeln!(f, "{region}")?;
    }
    writeln!(f, "=============================")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn region(
    index: usize,
    capacity: usize,
    used: usize,
  ) -> RegionStats {
    RegionStats {
      index,
      address: 0x1000 * (index + 1),
      start: 0x1000 * (index + 1) + 40,
      capacity,
      used,
      free: capacity - used,
    }
  }

  #[test]
  fn test_totals() {
    let report = ArenaReport {
      regions: vec![region(0, 100, 30), region(1, 200, 0)],
    };

    assert_eq!(report.capacity(), 300);
    assert_eq!(report.used(), 30);
    assert_eq!(report.free(), 270);
  }

  #[test]
  fn test_display_lists_every_region() {
    let report = ArenaReport {
      regions: vec![region(0, 100, 30), region(1, 200, 0)],
    };
    let text = report.to_string();

    assert!(text.contains("===> Region 0:"));
    assert!(text.contains("===> Region 1:"));
    assert!(text.contains("Used:       30 bytes"));
    assert!(text.contains("Free:       200 bytes"));
  }
}
