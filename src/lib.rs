#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`Controller`**: Owns everything; `split()` it into a `Ticker` for the 10 ms interrupt and a `Dispatcher` for the main loop
//! - **`TickDriver`**: Advances the scheduler and derives the one second time base
//! - **`Shared`**: The atomic cells the two halves communicate through
//! - **`Scheduler`**: Fixed-capacity table of delayed and periodic tasks
//! - **`ButtonBank`**: Debounces four buttons into one-shot press and long-press flags
//! - **`TrafficFsm`**: Automatic, configuration and manual operation of both signal heads
//! - **`InputSource`**: Trait to implement for your button GPIO
//! - **`LightActuator`**: Trait to implement for your signal head outputs
//! - **`DisplaySink`**: Trait to implement for your two-line character display
//! - **`DurationStore`**: Trait for persisting durations (`DefaultStore`, `FlashStore`)
//!
//! Nothing in this crate blocks or allocates. All hardware is reached through
//! the traits above, so the whole controller runs unchanged in host tests.

mod log;

pub mod time;
pub mod types;
pub mod input;
pub mod scheduler;
pub mod task;
pub mod light;
pub mod display;
pub mod storage;
pub mod fsm;
pub mod tick;
pub mod controller;

pub use controller::{Controller, Dispatcher, Shared, Ticker};
pub use display::{DISPLAY_WIDTH, DisplaySink, Frame};
pub use fsm::{ControlState, INIT_SECONDS, TrafficFsm};
pub use input::{BUTTON_COUNT, Button, ButtonBank, ButtonEvent, ButtonEvents, Debouncer, InputSource};
pub use light::{LightActuator, SignalHeads};
pub use scheduler::{DEFAULT_CAPACITY, Scheduler, SchedulerError, TaskId};
pub use storage::{DefaultStore, DurationStore, FlashStore, StoreError};
pub use task::Task;
pub use tick::{TickDriver, TickSignals};
pub use time::{TICK_PERIOD_MS, TICKS_PER_SECOND, Ticks};
pub use types::{Direction, DurationKind, Durations, FsmState, LightColor, ManualSubState, Phase};
