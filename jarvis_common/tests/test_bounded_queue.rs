/// unit tests for BoundedQueue (drop-oldest ringbuffer)
/// run with "cargo test --test test_bounded_queue -- --nocapture"

use std::collections::VecDeque;
use jarvis_common::collections::{BoundedQueue, push_to_ringbuffer, DEFAULT_QUEUE_CAPACITY};

#[test]
fn test_bound () {
    println!("--- testing queue bound for various push counts");
    let cap = 5;

    for n in [0usize, 1, 4, 5, 6, 12] {
        let mut q: BoundedQueue<usize> = BoundedQueue::new(cap);
        for i in 0..n { q.push(i); }

        println!("{n} pushes -> {:?}", q.to_vec());
        assert_eq!( q.len(), n.min(cap));

        // retained elements are exactly the last `cap` pushed, in push order
        let expected: Vec<usize> = (n.saturating_sub(cap)..n).collect();
        assert_eq!( q.to_vec(), expected);
    }
}

#[test]
fn test_push_returns_evicted () {
    let mut q: BoundedQueue<&str> = BoundedQueue::new(2);
    assert_eq!( q.push("a"), None);
    assert_eq!( q.push("b"), None);
    assert!( q.is_full());
    assert_eq!( q.push("c"), Some("a"));
    assert_eq!( q.to_vec(), vec!["b","c"]);
}

#[test]
fn test_shift () {
    let mut q: BoundedQueue<u32> = BoundedQueue::new(3);
    assert_eq!( q.shift(), None);

    for i in 1..=4 { q.push(i); }
    assert_eq!( q.shift(), Some(2));
    assert_eq!( q.shift(), Some(3));
    assert_eq!( q.len(), 1);
    assert_eq!( q.shift(), Some(4));
    assert!( q.is_empty());
}

#[test]
fn test_drain_latest () {
    let mut q: BoundedQueue<u32> = BoundedQueue::new(10);
    assert_eq!( q.drain_latest(), None);

    for i in 1..=7 { q.push(i); }
    assert_eq!( q.drain_latest(), Some(7));
    assert!( q.is_empty());
    assert_eq!( q.drain_latest(), None);
}

#[test]
fn test_capacity () {
    let q: BoundedQueue<u8> = BoundedQueue::default();
    assert_eq!( q.capacity(), DEFAULT_QUEUE_CAPACITY);

    let mut q: BoundedQueue<u8> = BoundedQueue::new(0); // clamped
    assert_eq!( q.capacity(), 1);
    q.push(1);
    q.push(2);
    assert_eq!( q.to_vec(), vec![2]);

    q.clear();
    assert!( q.is_empty());
    assert_eq!( q.iter().count(), 0);
}

#[test]
fn test_ringbuffer_fn () {
    let mut v: VecDeque<usize> = VecDeque::with_capacity(3);
    for d in 0..9 {
        push_to_ringbuffer( &mut v, 3, d);
    }
    assert_eq!( vec![6,7,8], Vec::from(v));
}
