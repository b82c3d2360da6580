//! Insertion Order Module
//!
//! Tracks the canonical listing order of cache keys.

// == Insertion Order ==
/// Keeps keys in the order they were first inserted.
///
/// Overwriting an existing key does not move it. Positions are 1-based and
/// only valid until the next mutation.
#[derive(Debug, Default)]
pub struct InsertionOrder {
    order: Vec<String>,
}

impl InsertionOrder {
    // == Push ==
    /// Appends a key if it is not already tracked.
    pub fn push(&mut self, key: &str) {
        if !self.contains(key) {
            self.order.push(key.to_string());
        }
    }

    // == Remove At ==
    /// Removes and returns the key at a 1-based position.
    pub fn remove_at(&mut self, position: usize) -> Option<String> {
        let idx = position.checked_sub(1)?;
        if idx < self.order.len() {
            Some(self.order.remove(idx))
        } else {
            None
        }
    }

    // == Iter ==
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.order.clear();
    }

    pub fn contains(&self, key: &str) -> bool {
        self.order.iter().any(|k| k == key)
    }
}
