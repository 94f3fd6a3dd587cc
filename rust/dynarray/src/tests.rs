use std::cell::Cell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use dynarray_common::ErrorKind;

use crate::{DynamicArray, ReserveHint, dyn_array, reserve};

/// Counts how many of its values are alive.
#[derive(Debug)]
struct Tracked {
    value: i32,
    alive: Rc<Cell<usize>>,
}

impl Tracked {
    fn new(value: i32, alive: &Rc<Cell<usize>>) -> Tracked {
        alive.set(alive.get() + 1);
        Tracked {
            value,
            alive: alive.clone(),
        }
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Tracked {
        Tracked::new(self.value, &self.alive)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.alive.set(self.alive.get() - 1);
    }
}

/// Panics on the clone numbered `fail_at` (shared across all values).
#[derive(Debug, PartialEq)]
struct FallibleClone {
    value: i32,
    clones: Rc<Cell<usize>>,
    fail_at: usize,
}

impl Clone for FallibleClone {
    fn clone(&self) -> FallibleClone {
        let n = self.clones.get() + 1;
        self.clones.set(n);
        if n == self.fail_at {
            panic!("clone failed");
        }
        FallibleClone {
            value: self.value,
            clones: self.clones.clone(),
            fail_at: self.fail_at,
        }
    }
}

fn values(a: &DynamicArray<Tracked>) -> Vec<i32> {
    a.iter().map(|t| t.value).collect()
}

#[test]
fn test_new_is_empty_without_allocation() {
    let a = DynamicArray::<u64>::new();
    assert_eq!(a.len(), 0);
    assert_eq!(a.capacity(), 0);
    assert!(a.is_empty());
    assert_eq!(a.begin(), a.end());
    assert_eq!(a.as_slice(), &[] as &[u64]);
}

#[test]
fn test_with_len_fills_defaults() {
    let a = DynamicArray::<String>::with_len(5);
    assert_eq!(a.len(), 5);
    assert_eq!(a.capacity(), 5);
    assert!(a.iter().all(|s| s.is_empty()));

    let z = DynamicArray::<i32>::with_len(0);
    assert!(z.is_empty());
    assert_eq!(z.capacity(), 0);
}

#[test]
fn test_with_value_fills_copies() {
    let a = DynamicArray::with_value(3, String::from("ab"));
    assert_eq!(a, ["ab", "ab", "ab"]);
    assert_eq!(a.capacity(), 3);
    assert_eq!(dyn_array![7u8; 4], [7, 7, 7, 7]);
}

#[test]
fn test_from_literal_list() {
    let a = dyn_array![String::from("x"), String::from("y")];
    assert_eq!(a.len(), 2);
    assert_eq!(a.capacity(), 2);
    assert_eq!(a, ["x", "y"]);

    let b = DynamicArray::from(vec![1, 2, 3]);
    assert_eq!(b.capacity(), 3);
    let c = DynamicArray::from(&[4, 5][..]);
    assert_eq!(c, [4, 5]);
    let empty: DynamicArray<i32> = dyn_array![];
    assert_eq!(empty.capacity(), 0);
}

#[test]
fn test_with_reserve_presizes_capacity() {
    let a: DynamicArray<i32> = DynamicArray::with_reserve(reserve(8));
    assert!(a.is_empty());
    assert_eq!(a.capacity(), 8);

    let b: DynamicArray<i32> = ReserveHint::new(3).into();
    assert_eq!(b.capacity(), 3);
    assert_eq!(ReserveHint::new(3).capacity(), 3);
}

#[test]
fn test_from_iter_uses_size_hint() {
    let a: DynamicArray<u32> = (0..10).collect();
    assert_eq!(a.len(), 10);
    assert_eq!(a.capacity(), 10);

    let b: DynamicArray<u32> = (0..10).filter(|x| x % 2 == 0).collect();
    assert_eq!(b, [0, 2, 4, 6, 8]);
    assert_eq!(b.capacity(), 8);
}

#[test]
fn test_push_back_doubles_capacity() {
    let mut a = DynamicArray::new();
    let mut capacities = Vec::new();
    for i in 0..9 {
        a.push_back(i);
        capacities.push(a.capacity());
    }
    assert_eq!(capacities, [1, 2, 4, 4, 8, 8, 8, 8, 16]);
    assert_eq!(a, [0, 1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn test_push_back_after_reserve_does_not_reallocate() {
    let mut a = DynamicArray::with_reserve(reserve(3));
    a.push_back(1);
    a.push_back(2);
    a.push_back(3);
    assert_eq!(a.capacity(), 3);
    a.push_back(4);
    assert_eq!(a.capacity(), 6);
}

#[test]
fn test_push_pop_scenario() {
    let mut a = DynamicArray::new();
    a.push_back(1);
    a.push_back(2);
    a.push_back(3);
    assert_eq!(a.len(), 3);
    assert_eq!(a.capacity(), 4);

    let pos = a.insert(a.position(1), 99);
    assert_eq!(pos.index(), 1);
    assert_eq!(a, [1, 99, 2, 3]);
    assert_eq!(a.len(), 4);

    let pos = a.erase(pos);
    assert_eq!(pos.index(), 1);
    assert_eq!(a, [1, 2, 3]);
    assert_eq!(a.len(), 3);

    assert!(a.at(10).unwrap_err().is_out_of_range());
    assert_eq!(a, dyn_array![1, 2, 3]);
}

#[test]
fn test_insert_into_empty_allocates_one_slot() {
    let mut a = DynamicArray::new();
    let pos = a.insert(a.begin(), 'a');
    assert_eq!(a.capacity(), 1);
    assert_eq!(*a.at_position(pos), 'a');
}

#[test]
fn test_insert_in_place_and_with_growth() {
    let mut a = dyn_array![1, 2, 3];
    a.reserve(5);

    // Room left: shifted in place.
    a.insert(a.begin(), 0);
    assert_eq!(a, [0, 1, 2, 3]);
    assert_eq!(a.capacity(), 5);
    a.insert(a.end(), 4);
    assert_eq!(a, [0, 1, 2, 3, 4]);
    assert_eq!(a.capacity(), 5);

    // Full: reallocated to double.
    let pos = a.insert(a.position(2), 10);
    assert_eq!(a, [0, 1, 10, 2, 3, 4]);
    assert_eq!(a.capacity(), 10);
    *a.at_position_mut(pos) += 1;
    assert_eq!(a[2], 11);
}

#[test]
#[should_panic(expected = "should be <= len")]
fn test_insert_past_end_panics() {
    let mut a = dyn_array![1, 2];
    let pos = a.end();
    a.truncate(1);
    a.insert(pos, 3);
}

#[test]
fn test_erase_returns_following_position() {
    let mut a = dyn_array!['a', 'b', 'c'];
    let next = a.erase(a.begin());
    assert_eq!(*a.at_position(next), 'b');
    let next = a.erase(a.position(1));
    assert_eq!(next, a.end());
    assert_eq!(a, ['b']);
    assert_eq!(a.capacity(), 3);
}

#[test]
#[should_panic(expected = "should be < len")]
fn test_erase_at_end_panics() {
    let mut a = dyn_array![1, 2];
    a.erase(a.end());
}

#[test]
fn test_remove_returns_value() {
    let mut a = dyn_array![String::from("a"), String::from("b"), String::from("c")];
    assert_eq!(a.remove(1), "b");
    assert_eq!(a, ["a", "c"]);
    assert_eq!(a.remove(1), "c");
    assert_eq!(a.remove(0), "a");
    assert!(a.is_empty());
}

#[test]
fn test_pop_back_keeps_capacity() {
    let mut a = dyn_array![1, 2, 3];
    a.pop_back();
    assert_eq!(a, [1, 2]);
    assert_eq!(a.capacity(), 3);
    assert_eq!(a.pop(), Some(2));
    assert_eq!(a.pop(), Some(1));
    assert_eq!(a.pop(), None);
}

#[test]
#[cfg(any(debug_assertions, feature = "strict-contracts"))]
#[should_panic(expected = "pop_back on an empty DynamicArray")]
fn test_pop_back_on_empty_is_a_contract_violation() {
    let mut a = DynamicArray::<i32>::new();
    a.pop_back();
}

#[test]
fn test_at_is_checked() {
    let mut a = dyn_array![10, 20];
    assert_eq!(*a.at(1).unwrap(), 20);
    *a.at_mut(0).unwrap() = 11;
    assert_eq!(a[0], 11);

    let err = a.at(2).unwrap_err();
    assert_eq!(err.into_kind(), ErrorKind::OutOfRange { index: 2, len: 2 });
    assert!(a.at_mut(5).is_err());
    assert!(DynamicArray::<i32>::new().at(0).is_err());
}

#[test]
fn test_unchecked_access() {
    let mut a = dyn_array![1, 2, 3];
    unsafe {
        assert_eq!(*a.get_unchecked(2), 3);
        *a.get_unchecked_mut(0) = 5;
    }
    assert_eq!(a, [5, 2, 3]);
}

#[test]
#[should_panic]
fn test_index_out_of_range_panics() {
    let a = dyn_array![1, 2, 3];
    let _value = a[3];
}

#[test]
fn test_index_and_slice_access() {
    let mut a = dyn_array![1, 2, 3, 4];
    a[1] = 20;
    assert_eq!(&a[1..3], &[20, 3]);
    assert_eq!(a.first(), Some(&1));
    a.as_mut_slice().reverse();
    assert_eq!(a, [4, 3, 20, 1]);
    for x in &mut a {
        *x *= 2;
    }
    assert_eq!((&a).into_iter().sum::<i32>(), 56);
}

#[test]
fn test_reserve_never_shrinks() {
    let mut a = dyn_array![1, 2, 3];
    a.reserve(2);
    assert_eq!(a.capacity(), 3);
    a.reserve(3);
    assert_eq!(a.capacity(), 3);
    a.reserve(7);
    assert_eq!(a.capacity(), 7);
    assert_eq!(a, [1, 2, 3]);
}

#[test]
fn test_try_reserve_reports_overflow() {
    let mut a = dyn_array![1u64, 2];
    let err = a.try_reserve(usize::MAX).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::CapacityOverflow { .. }));
    assert_eq!(a.capacity(), 2);
    assert_eq!(a, [1, 2]);

    a.try_reserve(10).unwrap();
    assert_eq!(a.capacity(), 10);
    a.try_reserve(1).unwrap();
    assert_eq!(a.capacity(), 10);
}

#[test]
#[should_panic(expected = "capacity overflow")]
fn test_resize_overflow_panics() {
    let mut a = DynamicArray::<u8>::new();
    a.resize(usize::MAX / 2 + 1);
}

#[test]
fn test_resize_shrinks_length_only() {
    let mut a = dyn_array![1, 2, 3, 4];
    a.resize(2);
    assert_eq!(a, [1, 2]);
    assert_eq!(a.capacity(), 4);
    a.resize(2);
    assert_eq!(a, [1, 2]);
}

#[test]
fn test_resize_within_capacity_fills_defaults() {
    let mut a = dyn_array![1, 2, 3, 4];
    a.resize(1);
    a.resize(3);
    assert_eq!(a, [1, 0, 0]);
    assert_eq!(a.capacity(), 4);
}

#[test]
fn test_resize_growth_uses_twice_new_len() {
    let mut a = dyn_array![1, 2];
    a.resize(5);
    assert_eq!(a, [1, 2, 0, 0, 0]);
    assert_eq!(a.capacity(), 10);

    // Reaching exactly the capacity reallocates as well.
    let mut b = DynamicArray::<i32>::with_reserve(reserve(4));
    b.resize(4);
    assert_eq!(b.capacity(), 8);
    assert_eq!(b, [0, 0, 0, 0]);
}

#[test]
fn test_resize_with_generator() {
    let mut next = 0;
    let mut a = DynamicArray::new();
    a.resize_with(3, || {
        next += 1;
        next
    });
    assert_eq!(a, [1, 2, 3]);
    assert_eq!(a.capacity(), 6);
}

#[test]
fn test_clear_keeps_buffer() {
    let mut a = dyn_array![1, 2, 3];
    a.reserve(10);
    a.clear();
    assert!(a.is_empty());
    assert_eq!(a.capacity(), 10);
    a.push_back(4);
    assert_eq!(a, [4]);
    assert_eq!(a.capacity(), 10);
}

#[test]
fn test_swap_exchanges_state() {
    let mut a = dyn_array![1, 2, 3];
    let mut b = DynamicArray::with_reserve(reserve(10));
    b.push_back(9);
    a.swap(&mut b);
    assert_eq!(a, [9]);
    assert_eq!(a.capacity(), 10);
    assert_eq!(b, [1, 2, 3]);
    assert_eq!(b.capacity(), 3);
}

#[test]
fn test_clone_is_deep_and_tight() {
    let mut a = dyn_array![String::from("a"), String::from("b")];
    a.reserve(10);
    let mut b = a.clone();
    assert_eq!(a, b);
    assert_eq!(b.capacity(), 2);

    b[0].push('!');
    b.push_back(String::from("c"));
    assert_eq!(a, ["a", "b"]);
    assert_eq!(b, ["a!", "b", "c"]);
}

#[test]
fn test_clone_from_replaces_contents() {
    let mut a = dyn_array![1, 2, 3, 4, 5];
    let b = dyn_array![7, 8];
    a.clone_from(&b);
    assert_eq!(a, [7, 8]);
    assert_eq!(a.capacity(), 2);
}

#[test]
fn test_clone_from_leaves_receiver_intact_on_panic() {
    let clones = Rc::new(Cell::new(0));
    let make = |value| FallibleClone {
        value,
        clones: clones.clone(),
        fail_at: 2,
    };
    let source = dyn_array![make(1), make(2), make(3)];
    let mut target = dyn_array![make(10)];

    let res = catch_unwind(AssertUnwindSafe(|| target.clone_from(&source)));
    assert!(res.is_err());
    assert_eq!(target.len(), 1);
    assert_eq!(target[0].value, 10);
}

#[test]
fn test_take_leaves_source_empty() {
    let mut a = dyn_array![1, 2, 3];
    let b = a.take();
    assert_eq!(b, [1, 2, 3]);
    assert_eq!(b.capacity(), 3);
    assert!(a.is_empty());
    assert_eq!(a.capacity(), 0);

    let c = std::mem::take(&mut a);
    assert!(c.is_empty());
}

#[test]
fn test_move_assign_moves_elements() {
    let mut target: DynamicArray<String> = DynamicArray::new();
    let mut source = dyn_array![String::from("a"), String::from("b"), String::from("c")];
    target.move_assign(&mut source);
    assert_eq!(target, ["a", "b", "c"]);
    assert_eq!(target.capacity(), 6);
    assert!(source.is_empty());
    assert_eq!(source.capacity(), 3);

    // A larger receiver is truncated first and keeps its buffer.
    let mut big = dyn_array![String::from("x"); 8];
    let mut small = dyn_array![String::from("y")];
    big.move_assign(&mut small);
    assert_eq!(big, ["y"]);
    assert_eq!(big.capacity(), 8);
}

#[test]
#[cfg(any(debug_assertions, feature = "strict-contracts"))]
#[should_panic(expected = "stale position")]
fn test_stale_position_is_detected() {
    let mut a = dyn_array![1, 2];
    let pos = a.begin();
    a.push_back(3);
    a.erase(pos);
}

#[test]
#[cfg(any(debug_assertions, feature = "strict-contracts"))]
#[should_panic(expected = "stale position")]
fn test_position_is_stale_after_take() {
    let mut a = DynamicArray::<i32>::new();
    let pos = a.end();
    a.push_back(1);
    let _taken = a.take();
    a.insert(pos, 5);
}

#[test]
#[cfg(any(debug_assertions, feature = "strict-contracts"))]
#[should_panic(expected = "stale position")]
fn test_empty_array_position_is_rejected_by_another_array() {
    let a = DynamicArray::<i32>::new();
    let mut b = DynamicArray::<i32>::new();
    b.insert(a.end(), 5);
}

#[test]
fn test_fresh_arrays_have_distinct_generations() {
    let a = DynamicArray::<i32>::new();
    let b = DynamicArray::<i32>::default();
    let c = DynamicArray::<i32>::with_reserve(reserve(0));
    assert_ne!(a.end(), b.end());
    assert_ne!(b.end(), c.end());
    assert_ne!(a.end(), c.end());
}

#[test]
fn test_positions_survive_non_reallocating_changes() {
    let mut a: DynamicArray<i32> = DynamicArray::with_reserve(reserve(4));
    a.extend([1, 2, 3]);
    let pos = a.position(1);
    a.push_back(4);
    assert_eq!(*a.at_position(pos), 2);
    a.erase(a.begin());
    assert_eq!(*a.at_position(pos), 3);
}

#[test]
fn test_every_value_dropped_exactly_once() {
    let alive = Rc::new(Cell::new(0));
    {
        let mut a = DynamicArray::new();
        for i in 0..10 {
            a.push_back(Tracked::new(i, &alive));
        }
        assert_eq!(alive.get(), 10);

        a.insert(a.position(3), Tracked::new(100, &alive));
        a.erase(a.position(0));
        a.pop_back();
        assert_eq!(alive.get(), 9);
        assert_eq!(values(&a), [1, 2, 100, 3, 4, 5, 6, 7, 8]);

        a.resize_with(4, || unreachable!());
        assert_eq!(alive.get(), 4);

        let b = a.clone();
        assert_eq!(alive.get(), 8);
        drop(b);

        let mut c = a.clone();
        c.truncate(1);
        a.swap(&mut c);
        assert_eq!(alive.get(), 5);
        assert_eq!(values(&a), [1]);

        c.clear();
        assert_eq!(alive.get(), 1);
    }
    assert_eq!(alive.get(), 0);
}

#[test]
fn test_zero_sized_elements() {
    let mut a = DynamicArray::new();
    for _ in 0..5 {
        a.push_back(());
    }
    assert_eq!(a.len(), 5);
    assert_eq!(a.capacity(), 8);
    a.insert(a.begin(), ());
    a.erase(a.begin());
    a.resize(20);
    assert_eq!(a.len(), 20);
    assert_eq!(a.capacity(), 40);
}

#[test]
fn test_debug_format_lists_live_elements() {
    let mut a = dyn_array![1, 2, 3];
    a.pop_back();
    assert_eq!(format!("{a:?}"), "[1, 2]");
}

#[test]
fn test_array_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DynamicArray<String>>();
}
