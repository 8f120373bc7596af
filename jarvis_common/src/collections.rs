/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use std::collections::VecDeque;

pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// make sure a VecDeque used as a ringbuffer with the given bound has space for an additional element.
/// Note that we can't use `VecDeque::capacity()` as the bound since allocation might round it up
#[inline]
pub fn ensure_ringbuffer_space<T> (v: &mut VecDeque<T>, bound: usize) -> Option<T> {
    if v.len() >= bound {
        v.pop_front()
    } else {
        None
    }
}

/// push a new element to the end of a VecDeque used as a ringbuffer (i.e. in bounded space).
/// Returns the evicted (oldest) element if the ringbuffer was full
#[inline]
pub fn push_to_ringbuffer<T> (v: &mut VecDeque<T>, bound: usize, t: T) -> Option<T> {
    let evicted = ensure_ringbuffer_space(v, bound);
    v.push_back(t);
    evicted
}

/// a fixed capacity FIFO with drop-oldest overflow policy.
///
/// This is the backpressure valve between producers that must not block (e.g. socket receive loops)
/// and slower consumers: `push` never fails or waits, it silently evicts the oldest element once
/// `capacity` is reached. The invariant `len() <= capacity()` holds at all times.
///
/// The queue itself is not synchronized - wrap it into a Mutex if it is shared between tasks
#[derive(Debug,Clone)]
pub struct BoundedQueue<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// a capacity of 0 would make the queue useless and is clamped to 1
    pub fn new (capacity: usize)->Self {
        let capacity = capacity.max(1);
        BoundedQueue { items: VecDeque::with_capacity(capacity), capacity }
    }

    /// append `item`, evicting (and returning) the front element if the queue is full
    pub fn push (&mut self, item: T) -> Option<T> {
        push_to_ringbuffer( &mut self.items, self.capacity, item)
    }

    /// remove and return the front (oldest) element
    pub fn shift (&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// empty the queue and return the most recently pushed element, discarding all older ones
    pub fn drain_latest (&mut self) -> Option<T> {
        let latest = self.items.pop_back();
        self.items.clear();
        latest
    }

    pub fn len (&self)->usize { self.items.len() }
    pub fn is_empty (&self)->bool { self.items.is_empty() }
    pub fn is_full (&self)->bool { self.items.len() >= self.capacity }
    pub fn capacity (&self)->usize { self.capacity }

    pub fn clear (&mut self) { self.items.clear() }

    pub fn iter (&self)->impl Iterator<Item=&T> { self.items.iter() }
}

impl<T> Default for BoundedQueue<T> {
    fn default()->Self { BoundedQueue::new( DEFAULT_QUEUE_CAPACITY) }
}

impl<T: Clone> BoundedQueue<T> {
    pub fn to_vec (&self)->Vec<T> { self.items.iter().cloned().collect() }
}
