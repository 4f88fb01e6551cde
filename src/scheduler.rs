//! Cooperative task scheduler.
//!
//! A fixed-capacity table of delayed and periodic tasks. The tick context calls
//! [`Scheduler::advance`] once per tick to count delays down; the main loop calls
//! [`Scheduler::dispatch`] to run whatever became ready. Tasks are plain values
//! (usually a small `Copy` enum) handed back to the caller's runner closure, so
//! the table never stores code pointers.
//!
//! `advance` and `dispatch` both take `&self`. Each slot's delay is written only
//! by `advance` and its ready bit is a single-producer/single-consumer cell, so
//! the tick context can preempt a running dispatch without a lock. Adding and
//! removing tasks needs `&mut self`.

use portable_atomic::{AtomicBool, AtomicU32, Ordering};

use crate::time::Ticks;

/// Default number of task slots.
pub const DEFAULT_CAPACITY: usize = 10;

/// Identifier handed out by [`Scheduler::register`].
///
/// Ids increase monotonically and are never reused, so a stale handle cannot
/// accidentally address a task registered later in the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskId(u32);

impl TaskId {
    /// Reserved id that never names a task.
    pub const INVALID: TaskId = TaskId(0);

    /// Returns the raw id value.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// True unless this is [`TaskId::INVALID`].
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl From<TaskId> for u32 {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

/// Errors that can occur during scheduler operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SchedulerError {
    /// Every slot is occupied.
    Full { capacity: usize },

    /// No occupied slot carries this id.
    UnknownTask(TaskId),

    /// The id counter has run out; no further tasks can be registered.
    IdsExhausted,
}

impl core::fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SchedulerError::Full { capacity } => {
                write!(f, "scheduler is full ({} tasks)", capacity)
            }
            SchedulerError::UnknownTask(id) => {
                write!(f, "task {} is not registered", id.0)
            }
            SchedulerError::IdsExhausted => {
                write!(f, "task id space exhausted")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SchedulerError {}

#[derive(Debug)]
struct Slot<T> {
    task: T,
    period: u32,
    id: TaskId,
    delay: AtomicU32,
    ready: AtomicBool,
    // Cleared when a one-shot is dispatched; the slot is then free for reuse.
    live: AtomicBool,
}

impl<T> Slot<T> {
    fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}

/// Fixed-capacity delay/period scheduler.
///
/// # Type Parameters
/// * `T` - Task value returned to the runner on dispatch
/// * `N` - Number of slots
#[derive(Debug)]
pub struct Scheduler<T, const N: usize = DEFAULT_CAPACITY> {
    slots: [Option<Slot<T>>; N],
    last_id: u32,
}

impl<T: Copy, const N: usize> Default for Scheduler<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy, const N: usize> Scheduler<T, N> {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
            last_id: 0,
        }
    }

    /// Registers `task` in the first free slot.
    ///
    /// The task first becomes ready after `delay` ticks (at least one) and then,
    /// if `period` is non-zero, every `period` ticks. A zero period makes a
    /// one-shot task that is removed after it runs.
    ///
    /// # Errors
    /// * `Full` - No free slot; nothing was registered
    /// * `IdsExhausted` - The id counter would wrap
    pub fn register(&mut self, task: T, delay: Ticks, period: Ticks) -> Result<TaskId, SchedulerError> {
        let Some(slot) = self
            .slots
            .iter_mut()
            .find(|slot| slot.as_ref().is_none_or(|s| !s.is_live()))
        else {
            warn!("scheduler full, registration rejected");
            return Err(SchedulerError::Full { capacity: N });
        };

        let next = self
            .last_id
            .checked_add(1)
            .ok_or(SchedulerError::IdsExhausted)?;
        self.last_id = next;

        let id = TaskId(next);
        *slot = Some(Slot {
            task,
            period: period.count(),
            id,
            delay: AtomicU32::new(delay.count()),
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        });

        debug!("registered task {} (delay {}, period {})", next, delay.count(), period.count());
        Ok(id)
    }

    /// Removes the task with this id.
    ///
    /// # Errors
    /// Returns `UnknownTask` if no registered task carries `id`.
    pub fn unregister(&mut self, id: TaskId) -> Result<(), SchedulerError> {
        if !id.is_valid() {
            return Err(SchedulerError::UnknownTask(id));
        }

        let slot = self
            .slots
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|s| s.id == id && s.is_live()))
            .ok_or(SchedulerError::UnknownTask(id))?;

        *slot = None;
        Ok(())
    }

    /// Advances every task by one tick.
    ///
    /// Must stay O(N) and allocation free; this runs in the tick context.
    pub fn advance(&self) {
        for slot in self.live_slots() {
            let mut delay = slot.delay.load(Ordering::Relaxed);
            if delay > 0 {
                delay -= 1;
            }
            if delay == 0 {
                slot.ready.store(true, Ordering::Release);
                if slot.period > 0 {
                    delay = slot.period;
                }
            }
            slot.delay.store(delay, Ordering::Relaxed);
        }
    }

    /// Runs every ready task once, in slot order.
    ///
    /// One-shot tasks are removed as they run. Returns the number of tasks run.
    pub fn dispatch<F: FnMut(T)>(&self, mut run: F) -> usize {
        let mut ran = 0;

        for slot in self.live_slots() {
            if !slot.ready.swap(false, Ordering::AcqRel) {
                continue;
            }
            if slot.period == 0 {
                slot.live.store(false, Ordering::Release);
            }

            run(slot.task);
            ran += 1;
        }

        ran
    }

    fn live_slots(&self) -> impl Iterator<Item = &Slot<T>> {
        self.slots.iter().flatten().filter(|slot| slot.is_live())
    }

    /// Returns true if a task with this id is registered.
    pub fn contains(&self, id: TaskId) -> bool {
        id.is_valid() && self.live_slots().any(|slot| slot.id == id)
    }

    /// Returns true if the task with this id is waiting to be dispatched.
    pub fn is_ready(&self, id: TaskId) -> bool {
        self.live_slots()
            .any(|slot| slot.id == id && slot.ready.load(Ordering::Acquire))
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.live_slots().count()
    }

    /// True if no task is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of slots.
    pub const fn capacity(&self) -> usize {
        N
    }
}
