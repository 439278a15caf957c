use std::{iter, mem, process, ptr::{self, NonNull}, slice};

use parking_lot::Mutex;
use tracing::{debug, error, trace};

use crate::{
  align::region_size,
  config::ArenaConfig,
  error::{ArenaError, Result},
  region::Region,
  stats::{ArenaReport, RegionStats},
};

/// Region chain guarded by the arena mutex.
///
/// `head` is null exactly when the arena is not initialized.
struct Chain {
  head: *mut Region,
  tail: *mut Region,
}

// Regions are only reached through the chain, and the chain only through the
// arena mutex or `&mut Arena`.
unsafe impl Send for Chain {}

impl Default for Chain {
  fn default() -> Self {
    Self {
      head: ptr::null_mut(),
      tail: ptr::null_mut(),
    }
  }
}

impl Chain {
  fn regions(&self) -> impl Iterator<Item = NonNull<Region>> {
    iter::successors(NonNull::new(self.head), |region| {
      NonNull::new(unsafe { region.as_ref().next })
    })
  }

  fn is_initialized(&self) -> bool {
    !self.head.is_null()
  }

  /// First-fit scan from the head; appends one region on a miss.
  fn allocate(
    &mut self,
    size: usize,
    config: &ArenaConfig,
  ) -> Result<NonNull<u8>> {
    assert!(self.is_initialized(), "arena is not initialized");

    for mut region in self.regions() {
      if let Some(ptr) = unsafe { region.as_mut() }.bump(size) {
        return Ok(ptr);
      }
    }

    let mut region = self.append(size, config)?;
    match unsafe { region.as_mut() }.bump(size) {
      Some(ptr) => Ok(ptr),
      None => unreachable!("fresh region is sized for the request"),
    }
  }

  fn append(
    &mut self,
    size: usize,
    config: &ArenaConfig,
  ) -> Result<NonNull<Region>> {
    let requested = size.max(config.region_floor());
    let mapped = region_size(requested, config.page_size())
      .ok_or(ArenaError::SizeOverflow { requested: size })?;

    let region = Region::map(mapped)?;
    unsafe { (*self.tail).next = region.as_ptr() };
    self.tail = region.as_ptr();

    debug!(size, mapped, "appended region");

    Ok(region)
  }

  /// Unmaps every region, in chain order, even past a failure. Returns the
  /// first error.
  fn release(&mut self) -> Result<()> {
    let regions: Vec<_> = self.regions().collect();
    *self = Chain::default();

    let mut first_error = None;
    for region in regions {
      if let Err(err) = unsafe { Region::unmap(region) } {
        error!(error = %err, "failed to release region");
        if first_error.is_none() {
          first_error = Some(err);
        }
      }
    }

    match first_error {
      Some(err) => Err(err),
      None => Ok(()),
    }
  }
}

/// A thread-safe region allocator.
///
/// ```text
///   Arena
///   ┌───────────────┐
///   │ Mutex<Chain>  │
///   │ head ─────────┼──► ┌──────────┐   ┌──────────┐   ┌──────────┐
///   │ tail ───┐     │    │ Region 0 │──►│ Region 1 │──►│ Region 2 │
///   └─────────┼─────┘    └──────────┘   └──────────┘   └──────────┘
///             └────────────────────────────────────────────▲
/// ```
///
/// Allocations bump a cursor inside the first region with enough room,
/// scanning from the head. When no region fits, one new region is mapped,
/// sized for the request (never smaller than the configured floor), and
/// appended after the tail.
///
/// There is no per-block free. [`reallocate`](Arena::reallocate) copies into
/// a fresh block and leaves the old one behind as dead space until the arena
/// is [`reset`](Arena::reset) or [`destroy`](Arena::destroy)ed, so repeated
/// growth of the same logical buffer consumes memory monotonically.
///
/// Every allocating call holds one mutex for its whole duration. `reset` and
/// `destroy` take `&mut self`, which rules out any concurrent use and any
/// outstanding borrow handed out by the safe slice methods.
pub struct Arena {
  chain: Mutex<Chain>,
  config: ArenaConfig,
}

impl Arena {
  /// Initializes an arena whose first region holds at least `size` bytes.
  pub fn new(size: usize) -> Result<Self> {
    Self::with_config(size, ArenaConfig::default())
  }

  pub fn with_config(
    size: usize,
    config: ArenaConfig,
  ) -> Result<Self> {
    let mut arena = Self::uninit(config);
    arena.init(size)?;
    Ok(arena)
  }

  /// An arena with no regions. It must be [`init`](Arena::init)ed before use.
  pub fn uninit(config: ArenaConfig) -> Self {
    Self {
      chain: Mutex::new(Chain::default()),
      config,
    }
  }

  /// Maps the first region, rounded up to whole pages with the header.
  ///
  /// # Panics
  ///
  /// If the arena is already initialized.
  pub fn init(
    &mut self,
    size: usize,
  ) -> Result<()> {
    self.config.validate()?;

    let chain = self.chain.get_mut();
    assert!(!chain.is_initialized(), "arena is already initialized");

    let mapped = region_size(size, self.config.page_size())
      .ok_or(ArenaError::SizeOverflow { requested: size })?;
    let region = Region::map(mapped)?;

    chain.head = region.as_ptr();
    chain.tail = region.as_ptr();

    debug!(size, mapped, "initialized arena");

    Ok(())
  }

  pub fn config(&self) -> &ArenaConfig {
    &self.config
  }

  pub fn is_initialized(&self) -> bool {
    self.chain.lock().is_initialized()
  }

  pub fn region_count(&self) -> usize {
    self.chain.lock().regions().count()
  }

  /// Returns `size` bytes valid until the arena is reset or destroyed.
  ///
  /// A zero-byte request returns the current cursor of the head region
  /// without advancing it.
  ///
  /// # Panics
  ///
  /// If the arena is not initialized. If the OS refuses to map a new region
  /// the process is aborted.
  pub fn allocate(
    &self,
    size: usize,
  ) -> NonNull<u8> {
    self.try_allocate(size).unwrap_or_else(|err| fatal(err))
  }

  /// Like [`allocate`](Arena::allocate), but hands mapping failures back.
  pub fn try_allocate(
    &self,
    size: usize,
  ) -> Result<NonNull<u8>> {
    let ptr = self.chain.lock().allocate(size, &self.config)?;
    trace!(size, ?ptr, "allocated");
    Ok(ptr)
  }

  /// Grows a block by copying it into a fresh allocation.
  ///
  /// When `old` is `Some` and `new_size < old_size` nothing happens and `old`
  /// is returned as is. Otherwise `old_size` bytes are copied from `old` (if
  /// any) into a new block of `new_size` bytes. The old block is not
  /// reclaimed.
  ///
  /// With `old == None` a fresh block of `new_size` bytes is always
  /// allocated, whatever `old_size` says: there is no pointer to hand back.
  ///
  /// # Safety
  ///
  /// When `old` is `Some`, it must be valid for reads of `old_size` bytes and
  /// must not overlap memory that has not been handed out yet.
  pub unsafe fn reallocate(
    &self,
    old: Option<NonNull<u8>>,
    old_size: usize,
    new_size: usize,
  ) -> NonNull<u8> {
    unsafe { self.try_reallocate(old, old_size, new_size) }.unwrap_or_else(|err| fatal(err))
  }

  /// Like [`reallocate`](Arena::reallocate), but hands mapping failures back.
  ///
  /// # Safety
  ///
  /// Same contract as [`reallocate`](Arena::reallocate).
  pub unsafe fn try_reallocate(
    &self,
    old: Option<NonNull<u8>>,
    old_size: usize,
    new_size: usize,
  ) -> Result<NonNull<u8>> {
    if let Some(old) = old {
      if new_size < old_size {
        return Ok(old);
      }
    }

    let mut chain = self.chain.lock();
    let new = chain.allocate(new_size, &self.config)?;

    if let Some(old) = old {
      unsafe { ptr::copy_nonoverlapping(old.as_ptr(), new.as_ptr(), old_size) };
    }

    trace!(old_size, new_size, ?new, "reallocated");

    Ok(new)
  }

  /// Safe view of [`allocate`](Arena::allocate) as a byte slice.
  #[allow(clippy::mut_from_ref)]
  pub fn alloc_slice(
    &self,
    size: usize,
  ) -> &mut [u8] {
    let ptr = self.allocate(size);
    unsafe { slice::from_raw_parts_mut(ptr.as_ptr(), size) }
  }

  /// Copies `src` into a new allocation.
  #[allow(clippy::mut_from_ref)]
  pub fn alloc_copy(
    &self,
    src: &[u8],
  ) -> &mut [u8] {
    let dst = self.alloc_slice(src.len());
    dst.copy_from_slice(src);
    dst
  }

  /// Safe view of [`reallocate`](Arena::reallocate).
  ///
  /// Returns `old` untouched (with its original length) when `new_size` is
  /// smaller than `old.len()`.
  pub fn realloc_slice<'a>(
    &'a self,
    old: &'a mut [u8],
    new_size: usize,
  ) -> &'a mut [u8] {
    if new_size < old.len() {
      return old;
    }

    let new = unsafe { self.reallocate(NonNull::new(old.as_mut_ptr()), old.len(), new_size) };
    unsafe { slice::from_raw_parts_mut(new.as_ptr(), new_size) }
  }

  /// Makes every region's full capacity available again without releasing
  /// memory, and re-arms the mutex.
  pub fn reset(&mut self) {
    let chain = mem::take(self.chain.get_mut());

    let mut regions = 0;
    for mut region in chain.regions() {
      unsafe { region.as_mut() }.reset();
      regions += 1;
    }

    self.chain = Mutex::new(chain);

    debug!(regions, "reset arena");
  }

  /// Releases every region back to the OS, in chain order. The arena can be
  /// [`init`](Arena::init)ed again afterwards.
  pub fn destroy(&mut self) {
    if let Err(err) = self.try_destroy() {
      fatal(err);
    }
  }

  pub fn try_destroy(&mut self) -> Result<()> {
    let mut chain = mem::take(self.chain.get_mut());
    let regions = chain.regions().count();
    chain.release()?;

    self.chain = Mutex::new(Chain::default());

    debug!(regions, "destroyed arena");

    Ok(())
  }

  /// Snapshot of every region, in chain order.
  pub fn stats(&self) -> ArenaReport {
    let chain = self.chain.lock();

    let regions = chain
      .regions()
      .enumerate()
      .map(|(index, region)| {
        let r = unsafe { region.as_ref() };
        RegionStats {
          index,
          address: region.as_ptr() as usize,
          start: r.bytes as usize,
          capacity: r.capacity,
          used: r.count,
          free: r.remaining,
        }
      })
      .collect();

    ArenaReport { regions }
  }

  /// Prints every region's address, capacity and usage to stdout.
  pub fn dump(&self) {
    println!("{}", self.stats());
  }
}

impl Drop for Arena {
  fn drop(&mut self) {
    if self.chain.get_mut().is_initialized() {
      self.destroy();
    }
  }
}

fn fatal(err: ArenaError) -> ! {
  error!(error = %err, "arena cannot continue");
  process::abort()
}
