use filament::InlineVec;
use std::mem;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct CountOnDrop(Arc<AtomicUsize>);

impl Drop for CountOnDrop {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Default)]
struct MaybeCounted(Option<CountOnDrop>);

#[test]
fn test_empty() {
    let v: InlineVec<i32, 4> = InlineVec::new();

    assert_eq!(v.len(), 0);
    assert!(v.is_empty());
    assert_eq!(v.capacity(), 4);
    assert_eq!(v.inline_capacity(), 4);
    assert!(v.iter().next().is_none());
}

#[test]
fn test_push_within_inline_capacity() {
    let mut v: InlineVec<i32, 4> = InlineVec::new();

    v.push(10);
    v.push(20);
    v.push(30);

    assert_eq!(v.len(), 3);
    assert_eq!(v.capacity(), 4);
    assert_eq!(v.as_slice(), &[10, 20, 30]);
    assert_eq!(v[1], 20);
}

#[test]
fn test_index_assign_within_inline_capacity() {
    let mut v: InlineVec<String, 4> = InlineVec::new();
    v.resize(3);

    v[0] = "A".to_string();
    v[1] = "B".to_string();
    v[2] = "C".to_string();

    assert_eq!(v.len(), 3);
    assert_eq!(v[0], "A");
    assert_eq!(v[1], "B");
    assert_eq!(v[2], "C");
}

#[test]
fn test_index_assign_beyond_inline_capacity() {
    let mut v: InlineVec<String, 1> = InlineVec::new();
    v.resize(4);

    v[0] = "A".to_string();
    v[1] = "B".to_string();
    v[2] = "C".to_string();
    v[3] = "D".to_string();

    assert_eq!(v.len(), 4);
    assert!(v.capacity() >= 4);
    assert_eq!(v[0], "A");
    assert_eq!(v[1], "B");
    assert_eq!(v[2], "C");
    assert_eq!(v[3], "D");
}

#[test]
fn test_push_pop_within_inline_capacity() {
    let mut v: InlineVec<String, 4> = InlineVec::new();

    v.push("A".to_string());
    v.push("B".to_string());
    v.push("C".to_string());

    assert_eq!(v.len(), 3);
    assert_eq!(v.front(), "A");
    assert_eq!(v.back(), "C");

    assert_eq!(v.pop(), "C");
    assert_eq!(v.len(), 2);
    assert_eq!(v.front(), "A");
    assert_eq!(v.back(), "B");

    assert_eq!(v.pop(), "B");
    assert_eq!(v.len(), 1);
    assert_eq!(v.front(), "A");
    assert_eq!(v.back(), "A");

    assert_eq!(v.pop(), "A");
    assert_eq!(v.len(), 0);
    assert!(v.is_empty());
}

#[test]
fn test_push_pop_beyond_inline_capacity() {
    let mut v: InlineVec<String, 1> = InlineVec::new();

    v.push("A".to_string());
    v.push("B".to_string());
    v.push("C".to_string());
    v.push("D".to_string());

    assert_eq!(v.len(), 4);
    assert!(v.capacity() >= 4);
    assert_eq!(v.front(), "A");
    assert_eq!(v.back(), "D");

    assert_eq!(v.pop(), "D");
    assert_eq!(v.pop(), "C");
    assert_eq!(v.pop(), "B");
    assert_eq!(v.len(), 1);
    assert_eq!(v.front(), "A");
    assert_eq!(v.back(), "A");

    // Shrinking back under the inline capacity keeps the spilled storage.
    assert_eq!(v.pop(), "A");
    assert!(v.is_empty());
    assert!(v.capacity() >= 4);
}

#[test]
fn test_spill_preserves_elements() {
    let mut v: InlineVec<u32, 4> = InlineVec::new();

    for i in 0..100 {
        v.push(i);
    }

    assert_eq!(v.len(), 100);
    assert!(v.capacity() >= 100);
    assert!(v.iter().copied().eq(0..100));
}

#[test]
fn test_growth_is_amortized() {
    let mut v: InlineVec<u8, 2> = InlineVec::new();
    assert_eq!(v.capacity(), 2);

    v.push(1);
    v.push(2);
    assert_eq!(v.capacity(), 2);

    // The spill takes at least double the inline capacity.
    v.push(3);
    let spilled = v.capacity();
    assert!(spilled >= 4);

    // Pushes within the new capacity do not grow again.
    v.push(4);
    assert_eq!(v.capacity(), spilled);
}

#[test]
fn test_clear_drops_elements_keeps_capacity() {
    let drops = Arc::new(AtomicUsize::new(0));
    let mut v: InlineVec<CountOnDrop, 2> = InlineVec::new();

    for _ in 0..5 {
        v.push(CountOnDrop(Arc::clone(&drops)));
    }
    let capacity = v.capacity();

    v.clear();

    assert_eq!(drops.load(Ordering::Relaxed), 5);
    assert!(v.is_empty());
    assert_eq!(v.capacity(), capacity);

    v.push(CountOnDrop(Arc::clone(&drops)));
    assert_eq!(v.len(), 1);
}

#[test]
fn test_resize_shrink_drops_tail_only() {
    let drops = Arc::new(AtomicUsize::new(0));
    let mut v: InlineVec<MaybeCounted, 4> = InlineVec::new();

    for _ in 0..3 {
        v.push(MaybeCounted(Some(CountOnDrop(Arc::clone(&drops)))));
    }

    v.resize(1);
    assert_eq!(v.len(), 1);
    assert_eq!(drops.load(Ordering::Relaxed), 2);
    assert!(v[0].0.is_some(), "kept element should be untouched");

    // Growing back appends defaults without touching the survivor.
    v.resize(3);
    assert_eq!(v.len(), 3);
    assert_eq!(drops.load(Ordering::Relaxed), 2);
    assert!(v[0].0.is_some());
    assert!(v[1].0.is_none());
    assert!(v[2].0.is_none());
}

#[test]
fn test_pop_moves_element_out() {
    let drops = Arc::new(AtomicUsize::new(0));
    let mut v: InlineVec<CountOnDrop, 4> = InlineVec::new();

    v.push(CountOnDrop(Arc::clone(&drops)));
    v.push(CountOnDrop(Arc::clone(&drops)));

    let popped = v.pop();
    assert_eq!(
        drops.load(Ordering::Relaxed),
        0,
        "pop hands the element over instead of dropping it"
    );

    drop(popped);
    assert_eq!(drops.load(Ordering::Relaxed), 1);
}

#[test]
fn test_clone_is_independent() {
    let mut v: InlineVec<String, 4> = InlineVec::new();
    v.push("A".to_string());
    v.push("B".to_string());

    let snapshot = v.clone();

    v.push("C".to_string());
    v[0] = "mutated".to_string();

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0], "A");
    assert_eq!(snapshot[1], "B");
    assert_eq!(v.len(), 3);
}

#[test]
fn test_copy_from_across_inline_capacities() {
    let mut src: InlineVec<String, 4> = InlineVec::new();
    src.push("A".to_string());
    src.push("B".to_string());
    src.push("C".to_string());

    // Prior contents are replaced, and the three elements exceed the
    // destination's inline capacity.
    let mut dst: InlineVec<String, 2> = InlineVec::new();
    dst.push("junk".to_string());
    dst.copy_from(&src);

    assert_eq!(dst.len(), 3);
    assert_eq!(dst[0], "A");
    assert_eq!(dst[1], "B");
    assert_eq!(dst[2], "C");

    // The source is untouched.
    assert_eq!(src.len(), 3);
    assert_eq!(src[0], "A");
}

#[test]
fn test_take_from_inline_source() {
    let mut src: InlineVec<String, 4> = InlineVec::new();
    src.push("A".to_string());
    src.push("B".to_string());
    src.push("C".to_string());

    let mut dst: InlineVec<String, 2> = InlineVec::new();
    dst.take_from(&mut src);

    assert_eq!(dst.len(), 3);
    assert_eq!(dst[0], "A");
    assert_eq!(dst[1], "B");
    assert_eq!(dst[2], "C");

    // The source is drained but stays usable.
    assert_eq!(src.len(), 0);
    src.push("fresh".to_string());
    assert_eq!(src.len(), 1);
}

#[test]
fn test_take_from_spilled_source() {
    let mut src: InlineVec<u32, 1> = InlineVec::new();
    for i in 0..5 {
        src.push(i);
    }

    let mut dst: InlineVec<u32, 8> = InlineVec::new();
    dst.push(99);
    dst.take_from(&mut src);

    assert_eq!(dst.len(), 5);
    assert!(dst.iter().copied().eq(0..5));
    assert_eq!(src.len(), 0);
}

#[test]
fn test_mem_take_moves_contents() {
    let mut v: InlineVec<String, 4> = InlineVec::new();
    v.push("A".to_string());
    v.push("B".to_string());

    let taken = mem::take(&mut v);

    assert_eq!(taken.len(), 2);
    assert_eq!(taken[0], "A");
    assert!(v.is_empty());

    v.push("reused".to_string());
    assert_eq!(v.len(), 1);
}

#[test]
fn test_with_capacity() {
    let v: InlineVec<i32, 4> = InlineVec::with_capacity(2);
    assert_eq!(v.capacity(), 4, "requests within N stay inline");

    let v: InlineVec<i32, 4> = InlineVec::with_capacity(10);
    assert!(v.capacity() >= 10);
    assert_eq!(v.len(), 0);
}

#[test]
fn test_reserve() {
    let mut v: InlineVec<i32, 4> = InlineVec::new();

    v.reserve(50);
    assert!(v.capacity() >= 50);
    assert_eq!(v.len(), 0);

    // A smaller request is a no-op.
    let capacity = v.capacity();
    v.reserve(1);
    assert_eq!(v.capacity(), capacity);
}

#[test]
fn test_zero_inline_capacity() {
    let mut v: InlineVec<i32, 0> = InlineVec::new();
    assert_eq!(v.capacity(), 0);
    assert_eq!(v.inline_capacity(), 0);

    v.push(7);
    assert_eq!(v.len(), 1);
    assert_eq!(v.pop(), 7);
}

#[test]
fn test_front_back_mut() {
    let mut v: InlineVec<i32, 4> = InlineVec::new();
    v.push(1);
    v.push(2);
    v.push(3);

    *v.front_mut() = 10;
    *v.back_mut() += 20;

    assert_eq!(v.as_slice(), &[10, 2, 23]);
}

#[test]
fn test_slice_access_through_deref() {
    let mut v: InlineVec<i32, 2> = InlineVec::new();
    for i in [3, 1, 2] {
        v.push(i);
    }

    assert!(v.contains(&3));
    assert_eq!(v.iter().sum::<i32>(), 6);

    v.as_mut_slice().sort();
    assert_eq!(v.as_slice(), &[1, 2, 3]);

    for x in &mut v {
        *x *= 10;
    }
    assert_eq!(v.as_slice(), &[10, 20, 30]);
}

#[test]
fn test_eq_ignores_inline_capacity() {
    let mut a: InlineVec<i32, 2> = InlineVec::new();
    let mut b: InlineVec<i32, 8> = InlineVec::new();

    for i in 0..3 {
        a.push(i);
        b.push(i);
    }
    assert_eq!(a, b);

    b.push(3);
    assert_ne!(a, b);
}

#[test]
fn test_debug_formats_as_slice() {
    let mut v: InlineVec<i32, 4> = InlineVec::new();
    v.push(1);
    v.push(2);

    assert_eq!(format!("{v:?}"), "[1, 2]");
}

#[test]
#[should_panic(expected = "pop called on an empty")]
fn test_pop_empty_panics() {
    let mut v: InlineVec<i32, 4> = InlineVec::new();
    v.pop();
}

#[test]
#[should_panic(expected = "front called on an empty")]
fn test_front_empty_panics() {
    let v: InlineVec<i32, 4> = InlineVec::new();
    v.front();
}

#[test]
#[should_panic(expected = "back called on an empty")]
fn test_back_empty_panics() {
    let v: InlineVec<i32, 4> = InlineVec::new();
    v.back();
}

#[test]
#[should_panic(expected = "out of bounds")]
fn test_index_out_of_bounds_panics() {
    let mut v: InlineVec<i32, 4> = InlineVec::new();
    v.push(1);
    let _ = v[3];
}
