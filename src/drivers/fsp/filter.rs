/// Moving average over the last `N` samples of one coordinate axis.
///
/// Until the window has filled the sum is divided by the number of samples
/// actually collected, so a fresh filter passes its first sample through
/// unchanged.
#[derive(Debug, Clone)]
pub struct MotionFilter<const N: usize> {
    buffer: [i32; N],
    index: usize,
    count: usize,
    sum: i32,
}

impl<const N: usize> Default for MotionFilter<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MotionFilter<N> {
    pub fn new() -> Self {
        Self {
            buffer: [0; N],
            index: 0,
            count: 0,
            sum: 0,
        }
    }

    /// Add a sample and return the average of the current window
    pub fn filter(&mut self, sample: i32) -> i32 {
        if N == 0 {
            return sample;
        }
        self.sum += sample;
        // Overwriting the oldest sample once the window is full
        if self.count == N {
            self.sum -= self.buffer[self.index];
        }
        self.buffer[self.index] = sample;
        self.index = (self.index + 1) % N;
        if self.count < N {
            self.count += 1;
        }

        self.sum / self.count as i32
    }

    /// Forget all history
    pub fn reset(&mut self) {
        self.index = 0;
        self.count = 0;
        self.sum = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
