//! Fixed-capacity object pool
//!
//! The entity, sprite and animation managers all share the same storage
//! contract: a bounded, densely packed list of owned objects. Adding past
//! capacity is rejected (never reallocated), removal shifts later entries
//! left so iteration never sees holes, and clearing is idempotent.
//!
//! # Rust Learning: Returning ownership on failure
//!
//! `add` takes the item by value. When the pool is full the item comes back
//! inside the error, so the caller decides whether to drop it, retry, or
//! free resources it holds. Nothing is leaked and nothing is silently lost.

use std::fmt;

/// Error returned when an add is rejected
pub enum PoolError<T> {
    /// The pool already holds `capacity` items; the rejected item is returned
    Full { capacity: usize, item: T },
}

impl<T> PoolError<T> {
    /// Take back the item that could not be added
    pub fn into_item(self) -> T {
        match self {
            PoolError::Full { item, .. } => item,
        }
    }
}

impl<T> fmt::Debug for PoolError<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PoolError::Full { capacity, .. } => {
                f.debug_struct("Full").field("capacity", capacity).finish()
            }
        }
    }
}

impl<T> fmt::Display for PoolError<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PoolError::Full { capacity, .. } => write!(f, "pool is full ({} items)", capacity),
        }
    }
}

impl<T> std::error::Error for PoolError<T> {}

/// Bounded, compacting list of owned objects
#[derive(Debug)]
pub struct ObjectPool<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> ObjectPool<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        ObjectPool {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Append an item, or hand it back if the pool is full
    pub fn add(&mut self, item: T) -> Result<(), PoolError<T>> {
        if self.is_full() {
            return Err(PoolError::Full {
                capacity: self.capacity,
                item,
            });
        }
        self.items.push(item);
        Ok(())
    }

    /// Remove the first item matching `pred`, shifting later items left
    pub fn remove_where<F>(&mut self, pred: F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        let index = self.items.iter().position(pred)?;
        Some(self.items.remove(index))
    }

    /// First item matching `pred` (earlier entries shadow later duplicates)
    pub fn find<F>(&self, mut pred: F) -> Option<&T>
    where
        F: FnMut(&T) -> bool,
    {
        self.items.iter().find(|item| pred(item))
    }

    pub fn find_mut<F>(&mut self, mut pred: F) -> Option<&mut T>
    where
        F: FnMut(&T) -> bool,
    {
        self.items.iter_mut().find(|item| pred(item))
    }

    /// All items matching `pred`, in pool order
    pub fn filter<F>(&self, mut pred: F) -> Vec<&T>
    where
        F: FnMut(&T) -> bool,
    {
        self.items.iter().filter(|item| pred(item)).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Take every item out, leaving the pool empty
    ///
    /// Safe to call on an empty pool.
    pub fn drain(&mut self) -> std::vec::Drain<'_, T> {
        self.items.drain(..)
    }
}
