//! The slider capability: an integer stepper over `[0, max]`.
//!
//! Setting the slider never calls back into the timeline controller; the
//! caller forwards the resulting value itself. That keeps programmatic
//! updates free of re-entrant feedback loops, and the controller's
//! same-index guard absorbs any duplicate notification.

/// Integer range stepper.
pub trait Slider: Send {
    /// Current value.
    fn get(&self) -> usize;

    /// Set the value, clamped to `[0, max]`, and return the value taken.
    fn set(&mut self, index: usize) -> usize;

    /// Upper bound of the range.
    fn max(&self) -> usize;
}

/// In-memory slider state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SliderState {
    value: usize,
    max: usize,
}

impl SliderState {
    /// A slider over `[0, max]` starting at 0.
    pub const fn new(max: usize) -> Self {
        Self { value: 0, max }
    }
}

impl Slider for SliderState {
    fn get(&self) -> usize {
        self.value
    }

    fn set(&mut self, index: usize) -> usize {
        self.value = index.min(self.max);
        self.value
    }

    fn max(&self) -> usize {
        self.max
    }
}
