//! The assembled controller.
//!
//! [`Controller`] owns every piece of the system. [`Controller::split`] hands
//! out the two halves a platform runs in different contexts:
//!
//! * [`Ticker`] for the 10 ms timer interrupt. It owns the input hardware, the
//!   debouncers and the tick counters.
//! * [`Dispatcher`] for the main loop. It owns the state machine with the
//!   lights, the display and the store.
//!
//! The halves meet only in [`Shared`], whose contents are single-producer /
//! single-consumer atomic cells. The interrupt can preempt a dispatch at any
//! point and the main loop never needs to mask it.
//!
//! On a host, or when both calls come from the same context, use
//! [`Controller::tick`] and [`Controller::dispatch`] directly.

use crate::display::DisplaySink;
use crate::fsm::TrafficFsm;
use crate::input::{ButtonBank, ButtonEvents, InputSource};
use crate::light::LightActuator;
use crate::scheduler::{DEFAULT_CAPACITY, Scheduler, SchedulerError, TaskId};
use crate::storage::DurationStore;
use crate::task::{TASK_COUNT, Task};
use crate::tick::{TickDriver, TickSignals};

/// State reached from both the tick and dispatch contexts.
///
/// Written by the tick side: button flags, pending seconds, task delays and
/// ready bits. Consumed by the dispatch side.
#[derive(Debug)]
pub struct Shared<const N: usize = DEFAULT_CAPACITY> {
    scheduler: Scheduler<Task, N>,
    events: ButtonEvents,
    signals: TickSignals,
}

impl<const N: usize> Shared<N> {
    /// The task table.
    pub fn scheduler(&self) -> &Scheduler<Task, N> {
        &self.scheduler
    }

    /// The one-shot button flags.
    pub fn events(&self) -> &ButtonEvents {
        &self.events
    }

    /// The tick flag and pending seconds.
    pub fn signals(&self) -> &TickSignals {
        &self.signals
    }
}

/// Tick context half of a split [`Controller`].
pub struct Ticker<'a, I: InputSource, const N: usize = DEFAULT_CAPACITY> {
    input: &'a mut I,
    buttons: &'a mut ButtonBank,
    driver: &'a mut TickDriver,
    shared: &'a Shared<N>,
}

impl<I: InputSource, const N: usize> Ticker<'_, I, N> {
    /// Timer entry point. Call every 10 ms.
    ///
    /// Buttons are sampled before the scheduler advances, so a press accepted
    /// on this tick is seen by the dispatch that follows it.
    /// Returns true if this tick completed a second.
    pub fn tick(&mut self) -> bool {
        self.buttons.sample_all(&mut *self.input, &self.shared.events);
        self.driver
            .on_tick(&self.shared.scheduler, &self.shared.signals)
    }

    /// Returns the button sampler.
    pub fn buttons(&self) -> &ButtonBank {
        &*self.buttons
    }
}

/// Dispatch context half of a split [`Controller`].
pub struct Dispatcher<'a, A, D, S, const N: usize = DEFAULT_CAPACITY>
where
    A: LightActuator,
    D: DisplaySink,
    S: DurationStore,
{
    fsm: &'a mut TrafficFsm<A, D, S>,
    shared: &'a Shared<N>,
}

impl<A, D, S, const N: usize> Dispatcher<'_, A, D, S, N>
where
    A: LightActuator,
    D: DisplaySink,
    S: DurationStore,
{
    /// Main loop entry point. Runs every task that became ready.
    ///
    /// Returns the number of tasks run.
    pub fn dispatch(&mut self) -> usize {
        let fsm = &mut *self.fsm;
        let shared = self.shared;

        shared.scheduler.dispatch(|task| match task {
            Task::ButtonScan => fsm.scan_buttons(&shared.events),
            Task::SecondStep => {
                for _ in 0..shared.signals.take_seconds() {
                    fsm.on_second();
                }
            }
            Task::FlashUpdate => fsm.flash_update(),
            Task::DisplayUpdate => {
                fsm.display_update();
            }
        })
    }

    /// Returns the state machine.
    pub fn fsm(&self) -> &TrafficFsm<A, D, S> {
        &*self.fsm
    }
}

/// Two-direction traffic light controller.
///
/// # Type Parameters
/// * `I` - Button input hardware
/// * `A` - Signal head hardware
/// * `D` - Display hardware
/// * `S` - Duration store
/// * `N` - Scheduler capacity (at least the four standard tasks)
pub struct Controller<I, A, D, S, const N: usize = DEFAULT_CAPACITY>
where
    I: InputSource,
    A: LightActuator,
    D: DisplaySink,
    S: DurationStore,
{
    input: I,
    buttons: ButtonBank,
    ticks: TickDriver,
    fsm: TrafficFsm<A, D, S>,
    shared: Shared<N>,
    task_ids: [TaskId; TASK_COUNT],
}

impl<I, A, D, S, const N: usize> Controller<I, A, D, S, N>
where
    I: InputSource,
    A: LightActuator,
    D: DisplaySink,
    S: DurationStore,
{
    /// Builds the controller and registers the standard tasks.
    ///
    /// # Errors
    /// Returns the scheduler error if the standard tasks do not fit.
    pub fn new(
        input: I,
        buttons: ButtonBank,
        actuator: A,
        display: D,
        store: S,
    ) -> Result<Self, SchedulerError> {
        let mut scheduler = Scheduler::<Task, N>::new();
        let mut task_ids = [TaskId::INVALID; TASK_COUNT];

        for (slot, task) in task_ids.iter_mut().zip(Task::ALL) {
            *slot = scheduler.register(task, task.delay(), task.period())?;
        }

        info!("controller ready, {} of {} task slots used", TASK_COUNT, N);

        Ok(Self {
            input,
            buttons,
            ticks: TickDriver::new(),
            fsm: TrafficFsm::new(actuator, display, store),
            shared: Shared {
                scheduler,
                events: ButtonEvents::new(),
                signals: TickSignals::new(),
            },
            task_ids,
        })
    }

    /// Splits the controller into its tick and dispatch halves.
    ///
    /// Both halves borrow the controller. Keep the controller in a `static` to
    /// give the interrupt a `'static` [`Ticker`].
    pub fn split(&mut self) -> (Ticker<'_, I, N>, Dispatcher<'_, A, D, S, N>) {
        let Self {
            input,
            buttons,
            ticks,
            fsm,
            shared,
            ..
        } = self;
        let shared: &Shared<N> = shared;

        (
            Ticker {
                input,
                buttons,
                driver: ticks,
                shared,
            },
            Dispatcher { fsm, shared },
        )
    }

    /// See [`Ticker::tick`].
    pub fn tick(&mut self) -> bool {
        let (mut ticker, _) = self.split();
        ticker.tick()
    }

    /// See [`Dispatcher::dispatch`].
    pub fn dispatch(&mut self) -> usize {
        let (_, mut dispatcher) = self.split();
        dispatcher.dispatch()
    }

    /// Runs `ticks` ticks, dispatching after each one.
    pub fn run_ticks(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.tick();
            self.dispatch();
        }
    }

    /// Id the scheduler assigned to a standard task.
    pub fn task_id(&self, task: Task) -> TaskId {
        Task::ALL
            .iter()
            .position(|t| *t == task)
            .map_or(TaskId::INVALID, |i| self.task_ids[i])
    }

    /// Returns the state machine.
    pub fn fsm(&self) -> &TrafficFsm<A, D, S> {
        &self.fsm
    }

    /// Returns the button sampler.
    pub fn buttons(&self) -> &ButtonBank {
        &self.buttons
    }

    /// Returns the state shared by both halves.
    pub fn shared(&self) -> &Shared<N> {
        &self.shared
    }

    /// Returns the scheduler.
    pub fn scheduler(&self) -> &Scheduler<Task, N> {
        &self.shared.scheduler
    }

    /// Returns the scheduler for registering or removing tasks.
    pub fn scheduler_mut(&mut self) -> &mut Scheduler<Task, N> {
        &mut self.shared.scheduler
    }

    /// Returns the tick counters.
    pub fn ticks(&self) -> &TickDriver {
        &self.ticks
    }

    /// Returns the input hardware.
    pub fn input(&self) -> &I {
        &self.input
    }

    /// Returns the input hardware mutably.
    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }
}
