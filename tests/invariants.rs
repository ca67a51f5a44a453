use std::ptr::NonNull;

use firstfit::{Allocator, Error, HEADER_SIZE};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
  Alloc(usize),
  Free(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
  prop_oneof![
    (1usize..600).prop_map(Op::Alloc),
    any::<usize>().prop_map(Op::Free),
  ]
}

struct Live {
  ptr: NonNull<u8>,
  len: usize,
  tag: u8,
}

fn fill(live: &Live) {
  unsafe { live.ptr.as_ptr().write_bytes(live.tag, live.len) };
}

fn intact(live: &Live) -> bool {
  let bytes = unsafe { std::slice::from_raw_parts(live.ptr.as_ptr(), live.len) };
  bytes.iter().all(|byte| *byte == live.tag)
}

proptest! {
  #[test]
  fn invariants_hold_across_alloc_and_free(
    pages in 1usize..4,
    ops in proptest::collection::vec(arb_op(), 1..80),
  ) {
    let page = unsafe { libc::sysconf(libc::_SC_PAGESIZE) as usize };
    let mut allocator = Allocator::new();
    let reserved = allocator.init(pages * page).unwrap();
    prop_assert_eq!(reserved, pages * page);

    let mut live: Vec<Live> = Vec::new();
    let mut tag = 0u8;

    for op in ops {
      match op {
        Op::Alloc(len) => {
          let before: Vec<_> = allocator.chunks().unwrap().collect();
          match allocator.mem_alloc(len) {
            Ok(ptr) => {
              tag = tag.wrapping_add(1);
              let block = Live { ptr, len, tag };
              fill(&block);
              live.push(block);
            }
            Err(err) => {
              prop_assert_eq!(err, Error::OutOfMemory { requested: len });
              let after: Vec<_> = allocator.chunks().unwrap().collect();
              prop_assert_eq!(before, after);
            }
          }
        }
        Op::Free(pick) => {
          if live.is_empty() {
            continue;
          }
          let block = live.swap_remove(pick % live.len());
          prop_assert!(intact(&block));
          allocator.mem_free(block.ptr.as_ptr()).unwrap();
        }
      }

      prop_assert!(allocator.check_invariants().is_ok());

      let covered: usize = allocator
        .chunks()
        .unwrap()
        .map(|chunk| HEADER_SIZE + chunk.size())
        .sum();
      prop_assert_eq!(covered, reserved);
    }

    for block in &live {
      prop_assert!(intact(block));
    }

    for block in live.drain(..) {
      allocator.mem_free(block.ptr.as_ptr()).unwrap();
    }

    let chunks: Vec<_> = allocator.chunks().unwrap().collect();
    prop_assert_eq!(chunks.len(), 1);
    prop_assert_eq!(chunks[0].size(), reserved - HEADER_SIZE);
    prop_assert!(chunks[0].is_free());
  }

  #[test]
  fn split_leaves_exact_remainder(len in 1usize..3000) {
    let page = unsafe { libc::sysconf(libc::_SC_PAGESIZE) as usize };
    let mut allocator = Allocator::new();
    allocator.init(page).unwrap();
    let total = page - HEADER_SIZE;
    prop_assume!(len <= total);

    allocator.mem_alloc(len).unwrap();
    let chunks: Vec<_> = allocator.chunks().unwrap().collect();

    if total - len < HEADER_SIZE {
      prop_assert_eq!(chunks.len(), 1);
      prop_assert_eq!(chunks[0].size(), total);
    } else {
      prop_assert_eq!(chunks.len(), 2);
      prop_assert_eq!(chunks[0].size(), len);
      prop_assert!(!chunks[0].is_free());
      prop_assert_eq!(chunks[1].size(), total - len - HEADER_SIZE);
      prop_assert!(chunks[1].is_free());
    }
  }
}
