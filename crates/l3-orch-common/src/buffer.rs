//! Results of copying a list into a caller-sized buffer.

/// Items copied into a buffer of limited capacity, plus the full length of
/// the source list.
///
/// `items.len() < total` means the buffer was too small; a short result with
/// `items.len() == total` is simply a short list. A capacity of 0 is a
/// count-only read: no items, only `total`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferFill<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T: Clone> BufferFill<T> {
    /// Copies at most `capacity` items from `source`, in order.
    pub fn fill<'a, I>(source: I, capacity: usize) -> Self
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let mut items = Vec::new();
        let mut total = 0;
        for item in source {
            if items.len() < capacity {
                items.push(item.clone());
            }
            total += 1;
        }
        Self { items, total }
    }
}

impl<T> BufferFill<T> {
    /// Returns true if the source list did not fit.
    pub fn is_truncated(&self) -> bool {
        self.items.len() < self.total
    }

    /// Returns true if no items were copied (count-only read or empty list).
    pub fn is_count_only(&self) -> bool {
        self.items.is_empty()
    }
}
