/// Scale applied to every delta leaving the smoother
pub const SCROLL_DELTA_FACTOR: i32 = 32;
/// Fraction of the fling delta kept on every timer tick
pub const FLING_RETENTION: f64 = 0.6;
/// Gestures with at least this many samples end without momentum
pub const FLING_MAX_INPUTS: u32 = 10;

/// Direction of a two finger scroll gesture
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

impl ScrollDirection {
    /// Split a positive delta into (vertical, horizontal) scroll axes
    pub fn axes(&self, delta: i32) -> (i32, i32) {
        match self {
            ScrollDirection::Up => (delta, 0),
            ScrollDirection::Down => (-delta, 0),
            ScrollDirection::Right => (0, delta),
            ScrollDirection::Left => (0, -delta),
        }
    }
}

/// How the latest smoothed delta compares to the previous one
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Trend {
    #[default]
    Even,
    Increase,
    Decrease,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SmootherState {
    Idle,
    Accumulating,
    Fling,
}

/// Smooths the per-packet deltas of a scroll gesture by pairing consecutive
/// samples, and produces the decaying momentum after the fingers lift.
#[derive(Debug, Clone, Default)]
pub struct ScrollSmoother {
    direction: Option<ScrollDirection>,
    history: [i32; 2],
    history_index: usize,
    last_delta: i32,
    trend: Trend,
    input_count: u32,
    max_delta: i32,
    fling_delta: i32,
}

impl ScrollSmoother {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SmootherState {
        if self.input_count > 0 {
            SmootherState::Accumulating
        } else if self.fling_delta > 0 {
            SmootherState::Fling
        } else {
            SmootherState::Idle
        }
    }

    pub fn direction(&self) -> Option<ScrollDirection> {
        self.direction
    }

    pub fn set_direction(&mut self, direction: ScrollDirection) {
        self.direction = Some(direction);
    }

    pub fn trend(&self) -> Trend {
        self.trend
    }

    /// Feed one raw delta and return the delta to emit (0 for none)
    pub fn filter(&mut self, delta: i32) -> i32 {
        // New motion cancels any momentum still running
        if delta > 0 && self.fling_delta > 0 {
            self.fling_delta = 0;
        }

        if self.history_index >= self.history.len() {
            self.history_index = 0;
        }
        self.history[self.history_index] = delta;
        self.history_index += 1;
        self.input_count += 1;

        if self.input_count % 2 == 1 {
            if self.input_count > 2 {
                return self.last_delta * SCROLL_DELTA_FACTOR;
            }
            return 0;
        }

        let mean = (self.history[0] + self.history[1]) / 2;
        self.trend = match self.last_delta.cmp(&mean) {
            std::cmp::Ordering::Greater => Trend::Decrease,
            std::cmp::Ordering::Less => Trend::Increase,
            std::cmp::Ordering::Equal => Trend::Even,
        };
        if mean > self.max_delta {
            self.max_delta = delta;
        }

        mean * SCROLL_DELTA_FACTOR
    }

    /// End the gesture. Returns the initial fling delta, or 0 when the
    /// gesture was long enough that no momentum should follow.
    pub fn stop(&mut self) -> i32 {
        if self.input_count == 0 {
            return 0;
        }

        self.fling_delta = if self.input_count < FLING_MAX_INPUTS {
            self.max_delta * SCROLL_DELTA_FACTOR
        } else {
            0
        };
        log::trace!(
            "Scroll stopped after {} inputs, fling delta {}",
            self.input_count,
            self.fling_delta
        );

        self.history = [0; 2];
        self.history_index = 0;
        self.last_delta = 0;
        self.trend = Trend::Even;
        self.input_count = 0;
        self.max_delta = 0;

        self.fling_delta
    }

    /// Next momentum delta. Each call decays the stored delta for the next
    /// one; returns 0 once the momentum has run out.
    pub fn fling_delta(&mut self) -> i32 {
        if self.fling_delta <= 0 {
            self.fling_delta = 0;
            return 0;
        }
        let delta = self.fling_delta;
        self.fling_delta = (delta as f64 * FLING_RETENTION) as i32;
        delta
    }

    /// Drop all momentum and gesture state
    pub fn reset(&mut self) {
        *self = Self {
            direction: self.direction,
            ..Self::default()
        };
    }
}
