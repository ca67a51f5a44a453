use firstfit::{Allocator, Error, HEADER_SIZE};

fn page_size() -> usize {
  unsafe { libc::sysconf(libc::_SC_PAGESIZE) as usize }
}

#[test]
fn test_four_blocks_freed_in_order_coalesce_to_one() {
  let page = page_size();
  let mut allocator = Allocator::new();

  assert_eq!(allocator.init(page).unwrap(), page);

  let size = 64;
  let buff = allocator.mem_alloc(size).unwrap();
  let buff2 = allocator.mem_alloc(size).unwrap();
  let buff3 = allocator.mem_alloc(size).unwrap();
  let buff4 = allocator.mem_alloc(size).unwrap();

  for (a, b) in [(buff, buff2), (buff2, buff3), (buff3, buff4)] {
    assert_eq!(b.as_ptr().addr() - a.as_ptr().addr(), size + HEADER_SIZE);
  }

  for ptr in [buff, buff2, buff3, buff4] {
    allocator.mem_free(ptr.as_ptr()).unwrap();
    allocator.check_invariants().unwrap();
  }

  let header = allocator.header(buff.as_ptr()).unwrap();
  assert_eq!(header.size(), page - HEADER_SIZE);
  assert!(header.is_free());
  assert!(!header.has_bwd());
  assert!(!header.has_fwd());

  allocator.destroy().unwrap();
}

#[test]
fn test_four_blocks_freed_in_reverse_coalesce_to_one() {
  let page = page_size();
  let mut allocator = Allocator::new();
  allocator.init(page).unwrap();

  let blocks: Vec<_> = (0..4).map(|_| allocator.mem_alloc(64).unwrap()).collect();

  for ptr in blocks.iter().rev() {
    allocator.mem_free(ptr.as_ptr()).unwrap();
    allocator.check_invariants().unwrap();
  }

  let chunks: Vec<_> = allocator.chunks().unwrap().collect();
  assert_eq!(chunks.len(), 1);
  assert_eq!(chunks[0].size(), page - HEADER_SIZE);
  assert!(chunks[0].is_free());
}

#[test]
fn test_payloads_do_not_overlap() {
  let mut allocator = Allocator::new();
  allocator.init(page_size()).unwrap();

  let blocks: Vec<_> = (0u8..8)
    .map(|i| {
      let ptr = allocator.mem_alloc(48).unwrap();
      unsafe { ptr.as_ptr().write_bytes(i, 48) };
      ptr
    })
    .collect();

  for (i, ptr) in blocks.iter().enumerate() {
    let bytes = unsafe { std::slice::from_raw_parts(ptr.as_ptr(), 48) };
    assert!(bytes.iter().all(|byte| *byte == i as u8));
  }

  allocator.check_invariants().unwrap();
}

#[test]
fn test_pointers_stay_inside_arena() {
  let mut allocator = Allocator::new();
  allocator.init(page_size()).unwrap();
  let bounds = allocator.arena_bounds().unwrap();

  while let Ok(ptr) = allocator.mem_alloc(100) {
    let address = ptr.as_ptr().addr();
    assert!(bounds.contains(&address));
    assert_eq!(
      allocator.header(ptr.as_ptr()).unwrap().offset().get(),
      address - bounds.start - HEADER_SIZE
    );
  }

  assert_eq!(
    allocator.mem_alloc(100),
    Err(Error::OutOfMemory { requested: 100 })
  );
  allocator.check_invariants().unwrap();
}

#[test]
fn test_free_outside_arena_is_rejected() {
  let mut allocator = Allocator::new();
  allocator.init(page_size()).unwrap();
  let ptr = allocator.mem_alloc(64).unwrap();
  let before: Vec<_> = allocator.chunks().unwrap().collect();

  let mut local = [0u8; 16];
  assert_eq!(
    allocator.mem_free(local.as_mut_ptr()),
    Err(Error::BadArguments)
  );

  let past_end = allocator.arena_bounds().unwrap().end + 1;
  assert_eq!(
    allocator.mem_free(ptr.as_ptr().with_addr(past_end)),
    Err(Error::BadArguments)
  );

  let after: Vec<_> = allocator.chunks().unwrap().collect();
  assert_eq!(before, after);
}

#[test]
fn test_independent_allocators() {
  let mut first = Allocator::new();
  let mut second = Allocator::new();
  first.init(page_size()).unwrap();
  second.init(page_size()).unwrap();

  let ptr = first.mem_alloc(64).unwrap();

  assert_eq!(second.mem_free(ptr.as_ptr()), Err(Error::BadArguments));
  assert!(second.head().unwrap().is_free());
  first.mem_free(ptr.as_ptr()).unwrap();
}

#[test]
fn test_allocator_moves_across_threads() {
  let mut allocator = Allocator::new();
  allocator.init(page_size()).unwrap();

  let handle = std::thread::spawn(move || {
    let ptr = allocator.mem_alloc(32).unwrap();
    allocator.mem_free(ptr.as_ptr()).unwrap();
    allocator
  });

  let allocator = handle.join().unwrap();
  assert!(allocator.head().unwrap().is_free());
}
