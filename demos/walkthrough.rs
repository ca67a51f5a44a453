use std::io::Read;

use firstfit::{Allocator, AllocatorConfig, print_chunk};

/// Waits until the user presses ENTER.
/// Handy for inspecting the mapping with `pmap` or `gdb` between steps.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

/// Prints every chunk in address order.
fn print_chunks(
  label: &str,
  allocator: &Allocator,
) {
  println!("\n[{label}]");
  match allocator.chunks() {
    Ok(chunks) => {
      for chunk in chunks {
        println!("  {chunk}");
      }
    }
    Err(err) => println!("  ({err})"),
  }
}

fn main() {
  let mut allocator = Allocator::with_config(AllocatorConfig::from_env());

  // ----------------------------------------------------------------------
  // 1) Map a one-page arena. The request is rounded up to whole pages.
  // ----------------------------------------------------------------------
  let reserved = allocator.init(1000).expect("init failed");
  let bounds = allocator.arena_bounds().expect("arena is mapped");
  println!(
    "[1] PID = {}, reserved {} bytes at {:#x}..{:#x}",
    std::process::id(),
    reserved,
    bounds.start,
    bounds.end
  );
  print_chunks("1", &allocator);
  block_until_enter_pressed();

  // ----------------------------------------------------------------------
  // 2) Four 64-byte allocations. Each one splits the trailing free chunk.
  // ----------------------------------------------------------------------
  let blocks: Vec<_> = (0..4)
    .map(|i| {
      let ptr = allocator.mem_alloc(64).expect("arena has room");
      unsafe { ptr.as_ptr().write_bytes(0xA0 + i, 64) };
      ptr
    })
    .collect();
  for ptr in &blocks {
    println!("[2] allocated 64 bytes at {ptr:p}");
  }
  print_chunks("2", &allocator);
  block_until_enter_pressed();

  // ----------------------------------------------------------------------
  // 3) Free the second block, then allocate something smaller. First-fit
  //    reuses the hole and splits it again.
  // ----------------------------------------------------------------------
  allocator.mem_free(blocks[1].as_ptr()).expect("live block");
  print_chunks("3 after free", &allocator);

  let small = allocator.mem_alloc(16).expect("hole has room");
  println!(
    "[3] 16-byte block at {small:p}, reused the hole: {}",
    small == blocks[1]
  );
  print_chunks("3 after reuse", &allocator);
  block_until_enter_pressed();

  // ----------------------------------------------------------------------
  // 4) Ask for more than the arena holds.
  // ----------------------------------------------------------------------
  match allocator.mem_alloc(reserved) {
    Ok(ptr) => println!("[4] unexpectedly got {ptr:p}"),
    Err(err) => println!("[4] mem_alloc({reserved}) -> {err}"),
  }

  // ----------------------------------------------------------------------
  // 5) Free everything. Neighbors merge until one free chunk is left.
  // ----------------------------------------------------------------------
  for ptr in [blocks[0], small, blocks[2], blocks[3]] {
    allocator.mem_free(ptr.as_ptr()).expect("live block");
  }
  print_chunks("5", &allocator);

  let head = allocator.head().expect("arena is mapped");
  println!("\n[5] head header:");
  print_chunk(&head);
  block_until_enter_pressed();

  allocator.destroy().expect("destroy failed");
  println!("\n[6] arena unmapped; initialized = {}", allocator.is_initialized());
}
