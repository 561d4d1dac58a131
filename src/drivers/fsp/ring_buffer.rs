/// Fixed capacity FIFO with a head index and a fill count. Pushing into a
/// full buffer overwrites the oldest entry instead of growing.
#[derive(Debug, Clone)]
pub struct RingBuffer<T, const N: usize> {
    buffer: [T; N],
    head: usize,
    count: usize,
}

impl<T: Copy + Default, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default, const N: usize> RingBuffer<T, N> {
    pub fn new() -> Self {
        Self {
            buffer: [T::default(); N],
            head: 0,
            count: 0,
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == N
    }

    /// Append an entry. Returns the entry that had to be dropped to make room.
    pub fn push(&mut self, value: T) -> Option<T> {
        if N == 0 {
            return Some(value);
        }
        let tail = (self.head + self.count) % N;
        if self.is_full() {
            let dropped = self.buffer[self.head];
            self.buffer[tail] = value;
            self.head = (self.head + 1) % N;
            return Some(dropped);
        }
        self.buffer[tail] = value;
        self.count += 1;
        None
    }

    /// Remove and return the oldest entry
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let value = self.buffer[self.head];
        self.head = (self.head + 1) % N;
        self.count -= 1;
        Some(value)
    }

    /// Oldest entry without removing it
    pub fn peek(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        self.buffer.get(self.head)
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.count = 0;
    }
}
