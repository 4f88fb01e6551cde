//! The closed set of task bodies run by the controller's scheduler.

use crate::time::Ticks;

/// Number of standard tasks.
pub const TASK_COUNT: usize = 4;

/// Work items dispatched from the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Task {
    /// Consume button events and apply state transitions.
    ButtonScan,
    /// Run the per-second step once for every second elapsed since the last run.
    SecondStep,
    /// Toggle flashing lights.
    FlashUpdate,
    /// Redraw the display if anything changed.
    DisplayUpdate,
}

impl Task {
    /// Every task, in registration order.
    pub const ALL: [Task; TASK_COUNT] = [
        Task::ButtonScan,
        Task::SecondStep,
        Task::FlashUpdate,
        Task::DisplayUpdate,
    ];

    /// Initial delay used when the controller registers this task.
    pub const fn delay(self) -> Ticks {
        match self {
            Task::ButtonScan | Task::SecondStep | Task::DisplayUpdate => Ticks::ZERO,
            Task::FlashUpdate => Ticks::from_millis(500),
        }
    }

    /// Period used when the controller registers this task.
    pub const fn period(self) -> Ticks {
        match self {
            Task::ButtonScan | Task::SecondStep => Ticks(1),
            Task::FlashUpdate => Ticks::from_millis(500),
            Task::DisplayUpdate => Ticks::from_millis(100),
        }
    }
}
