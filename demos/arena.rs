use std::{io::Read, ptr, thread};

use marena::{Arena, ArenaBuf, ArenaConfig};
use tracing_subscriber::EnvFilter;

/// Waits until the user presses ENTER when `MARENA_PAUSE` is set.
/// Useful when you want to inspect the process mappings with `pmap` or
/// `/proc/<pid>/maps` between steps.
fn block_until_enter_pressed() {
  if std::env::var_os("MARENA_PAUSE").is_none() {
    return;
  }
  println!("\n>>> Press ENTER to continue (PID = {})...", std::process::id());
  let _ = std::io::stdin().bytes().next();
}

fn main() -> marena::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let config = ArenaConfig::default();
  println!(
    "page size = {} bytes, region floor = {} bytes",
    config.page_size(),
    config.region_floor()
  );

  let mut arena = Arena::with_config(config.page_size(), config)?;
  arena.dump();
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 1) Two small allocations land next to each other in the head region.
  // --------------------------------------------------------------------
  let first = arena.allocate(10);
  let second = arena.allocate(10);
  println!("\n[1] first = {:?}, second = {:?}", first, second);
  arena.dump();
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 2) A request bigger than anything left maps a new region.
  // --------------------------------------------------------------------
  let big = arena.allocate(5 * config.region_floor());
  println!("\n[2] big = {:?}", big);
  arena.dump();
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 3) Reallocation copies; shrinking hands the same pointer back.
  // --------------------------------------------------------------------
  unsafe {
    let block = arena.allocate(4);
    ptr::copy_nonoverlapping(b"ABCD".as_ptr(), block.as_ptr(), 4);

    let shrunk = arena.reallocate(Some(block), 4, 2);
    let grown = arena.reallocate(Some(block), 4, 8);
    println!(
      "\n[3] block = {:?}, shrunk = {:?}, grown = {:?}, grown starts with {:?}",
      block,
      shrunk,
      grown,
      std::str::from_utf8(std::slice::from_raw_parts(grown.as_ptr(), 4)).unwrap_or("?"),
    );
  }
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 4) A growable buffer leaves each outgrown copy behind.
  // --------------------------------------------------------------------
  {
    let mut name = ArenaBuf::new(&arena);
    for _ in 0..3 {
      name.append(b"ring");
    }
    println!("\n[4] {name} (len = {}, capacity = {})", name.len(), name.capacity());
  }
  arena.dump();
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 5) Several threads share the arena.
  // --------------------------------------------------------------------
  thread::scope(|scope| {
    for id in 0..4u8 {
      let arena = &arena;
      scope.spawn(move || {
        for size in 1..=64 {
          arena.alloc_slice(size).fill(id);
        }
      });
    }
  });
  let report = arena.stats();
  println!(
    "\n[5] {} regions, {} bytes used, {} bytes free",
    report.regions.len(),
    report.used(),
    report.free()
  );
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 6) Reset keeps the mappings, destroy releases them.
  // --------------------------------------------------------------------
  arena.reset();
  println!("\n[6] after reset:");
  arena.dump();

  arena.destroy();
  println!("[6] destroyed, initialized = {}", arena.is_initialized());

  Ok(())
}
