//! Traffic light state machine.
//!
//! Provides [`TrafficFsm`], which owns the control state, the signal heads, the
//! display and the duration store. It is driven from the dispatch context
//! through four step functions, one per scheduled task:
//!
//! * [`TrafficFsm::scan_buttons`] applies button presses
//! * [`TrafficFsm::on_second`] runs the boot timer and the phase countdown
//! * [`TrafficFsm::flash_update`] toggles flashing heads
//! * [`TrafficFsm::display_update`] redraws the display when something changed

use crate::display::{self, DisplaySink, Frame};
use crate::input::{Button, ButtonEvents};
use crate::light::{LightActuator, SignalHeads};
use crate::storage::DurationStore;
use crate::types::{Durations, FsmState, LightColor, ManualSubState, Phase};

/// Seconds the boot screen stays up before automatic operation starts.
pub const INIT_SECONDS: u8 = 3;

/// The complete mutable state of the controller.
///
/// Owned by [`TrafficFsm`]; everything else only gets a shared view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlState {
    /// Top-level state.
    pub state: FsmState,
    /// Light pattern used while in [`FsmState::Manual`].
    pub manual: ManualSubState,
    /// Current phase of automatic operation.
    pub phase: Phase,
    /// Configured durations.
    pub durations: Durations,
    /// Seconds left in the current phase, North-South.
    pub ns_countdown: u8,
    /// Seconds left in the current phase, East-West.
    pub ew_countdown: u8,
    /// `durations.is_balanced()` as of the last entry into automatic operation.
    pub balanced: bool,
    /// Seconds spent on the boot screen.
    pub init_seconds: u8,
    /// Whether the flashing heads are currently lit.
    pub flash_on: bool,
}

impl ControlState {
    /// Boot state with the given durations.
    pub const fn new(durations: Durations) -> Self {
        Self {
            state: FsmState::Init,
            manual: ManualSubState::NsRedEwGreen,
            phase: Phase::NsGreenEwRed,
            durations,
            ns_countdown: 0,
            ew_countdown: 0,
            balanced: durations.is_balanced(),
            init_seconds: 0,
            flash_on: false,
        }
    }
}

/// Controls both signal heads and the display from button input and the
/// one second time base.
///
/// # Type Parameters
/// * `A` - Signal head hardware
/// * `D` - Display hardware
/// * `S` - Duration store
pub struct TrafficFsm<A: LightActuator, D: DisplaySink, S: DurationStore> {
    control: ControlState,
    lights: SignalHeads<A>,
    display: D,
    store: S,
    dirty: bool,
}

impl<A: LightActuator, D: DisplaySink, S: DurationStore> TrafficFsm<A, D, S> {
    /// Creates the state machine in [`FsmState::Init`] with the heads off.
    ///
    /// Durations are loaded from `store`; if that fails the factory defaults
    /// are used.
    pub fn new(actuator: A, display: D, mut store: S) -> Self {
        let durations = match store.load() {
            Ok(durations) => durations,
            Err(_) => {
                warn!("stored durations unavailable, using defaults");
                Durations::DEFAULT
            }
        };

        Self {
            control: ControlState::new(durations),
            lights: SignalHeads::new(actuator),
            display,
            store,
            dirty: true,
        }
    }

    /// Consumes pending button presses and applies the resulting transitions.
    ///
    /// All four press flags are consumed on every call. Presses on the boot
    /// screen are discarded.
    pub fn scan_buttons(&mut self, events: &ButtonEvents) {
        let pressed = Button::ALL.map(|button| events.consume_pressed(button.index()));

        if self.control.state == FsmState::Init {
            return;
        }

        for (button, was_pressed) in Button::ALL.into_iter().zip(pressed) {
            if was_pressed {
                self.handle_press(button);
            }
        }
    }

    /// Applies a single button press.
    pub fn handle_press(&mut self, button: Button) {
        match button {
            Button::Mode => self.on_mode(),
            Button::Cycle => self.on_cycle(),
            Button::Increase => self.on_adjust(true),
            Button::Decrease => self.on_adjust(false),
        }
    }

    fn on_mode(&mut self) {
        match self.control.state {
            FsmState::Init => {}
            state if state.is_manual() => self.enter_auto_normal(),
            _ => self.enter_manual(),
        }
    }

    fn on_cycle(&mut self) {
        match self.control.state {
            FsmState::AutoNormal => {
                self.set_state(FsmState::AutoRed);
                self.lights.off_all();
            }
            FsmState::AutoRed => self.set_state(FsmState::AutoYellow),
            FsmState::AutoYellow => self.set_state(FsmState::AutoGreen),
            FsmState::AutoGreen => {
                if self.store.save(&self.control.durations).is_err() {
                    warn!("failed to save durations");
                }
                self.enter_auto_normal();
            }
            FsmState::Manual => {
                self.control.manual = self.control.manual.toggled();
                self.lights.set_pair(self.control.manual.colors());
                debug!("manual pattern {}", self.control.manual);
                self.dirty = true;
            }
            FsmState::Init | FsmState::ManualFlashYellow | FsmState::ManualFlashRed => {}
        }
    }

    /// Increase / Decrease. Edits a duration in the editors, otherwise controls
    /// flashing in manual operation.
    fn on_adjust(&mut self, increase: bool) {
        let state = self.control.state;

        if let Some(kind) = state.edited_duration() {
            if increase {
                self.control.durations.increment(kind);
            } else {
                self.control.durations.decrement(kind);
            }
            self.dirty = true;
            return;
        }

        let flash_state = if increase {
            FsmState::ManualFlashYellow
        } else {
            FsmState::ManualFlashRed
        };

        if state == FsmState::Manual {
            self.control.flash_on = false;
            self.set_state(flash_state);
        } else if state == flash_state {
            self.enter_manual();
        }
    }

    /// Advances the one second time base.
    ///
    /// Call exactly once per elapsed second.
    pub fn on_second(&mut self) {
        match self.control.state {
            FsmState::Init => {
                self.control.init_seconds = self.control.init_seconds.saturating_add(1);
                if self.control.init_seconds >= INIT_SECONDS {
                    self.enter_auto_normal();
                }
            }
            FsmState::AutoNormal if self.control.balanced => self.countdown_step(),
            _ => {}
        }
    }

    fn countdown_step(&mut self) {
        let c = &mut self.control;
        c.ns_countdown = c.ns_countdown.saturating_sub(1);
        c.ew_countdown = c.ew_countdown.saturating_sub(1);

        // At most one phase step per second, even if both ran out.
        if c.ns_countdown == 0 || c.ew_countdown == 0 {
            c.phase = c.phase.next();
            (c.ns_countdown, c.ew_countdown) = c.phase.countdowns(&c.durations);
            self.lights.set_pair(c.phase.colors());
            debug!("phase {}", c.phase);
        }

        self.dirty = true;
    }

    /// Flash step, called every 500 ms. Does nothing in steady states.
    pub fn flash_update(&mut self) {
        let Some(color) = self.flash_color() else {
            return;
        };

        self.lights.toggle_both(color);
        self.control.flash_on = self.lights.is_lit();

        // Only the manual flash screens show the blink.
        if self.control.state.is_manual() {
            self.dirty = true;
        }
    }

    /// Color the heads flash in the current state, if they flash at all.
    pub fn flash_color(&self) -> Option<LightColor> {
        match self.control.state {
            FsmState::AutoNormal if !self.control.balanced => Some(LightColor::Yellow),
            FsmState::AutoRed | FsmState::ManualFlashRed => Some(LightColor::Red),
            FsmState::AutoYellow | FsmState::ManualFlashYellow => Some(LightColor::Yellow),
            FsmState::AutoGreen => Some(LightColor::Green),
            _ => None,
        }
    }

    /// Redraws the display if the state changed since the last redraw.
    ///
    /// Returns true if the display was written.
    pub fn display_update(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.dirty = false;

        let frame = display::render(&self.control);
        self.display.show(frame.top(), frame.bottom());
        true
    }

    fn enter_auto_normal(&mut self) {
        self.set_state(FsmState::AutoNormal);

        let c = &mut self.control;
        c.manual = ManualSubState::default();
        c.phase = Phase::NsGreenEwRed;
        c.balanced = c.durations.is_balanced();

        if c.balanced {
            (c.ns_countdown, c.ew_countdown) = c.phase.countdowns(&c.durations);
            self.lights.set_pair(c.phase.colors());
        } else {
            warn!("durations unbalanced: {}", c.durations);
            c.ns_countdown = 0;
            c.ew_countdown = 0;
            self.lights.off_all();
        }
    }

    fn enter_manual(&mut self) {
        self.set_state(FsmState::Manual);
        self.control.manual = ManualSubState::default();
        self.lights.set_pair(self.control.manual.colors());
    }

    fn set_state(&mut self, next: FsmState) {
        if self.control.state != next {
            info!("state {} -> {}", self.control.state, next);
        }
        self.control.state = next;
        self.dirty = true;
    }

    /// Returns the control state.
    pub fn control(&self) -> &ControlState {
        &self.control
    }

    /// Returns the current top-level state.
    pub fn state(&self) -> FsmState {
        self.control.state
    }

    /// Returns the current automatic phase.
    pub fn phase(&self) -> Phase {
        self.control.phase
    }

    /// Returns the (NS, EW) countdowns in seconds.
    pub fn countdowns(&self) -> (u8, u8) {
        (self.control.ns_countdown, self.control.ew_countdown)
    }

    /// Returns the configured durations.
    pub fn durations(&self) -> Durations {
        self.control.durations
    }

    /// Returns whether the durations were balanced on the last entry into
    /// automatic operation.
    pub fn is_balanced(&self) -> bool {
        self.control.balanced
    }

    /// Returns true if a redraw is pending.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Renders the current display contents without touching the display.
    pub fn frame(&self) -> Frame {
        display::render(&self.control)
    }

    /// Returns the signal heads.
    pub fn lights(&self) -> &SignalHeads<A> {
        &self.lights
    }

    /// Returns the display.
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Returns the duration store.
    pub fn store(&self) -> &S {
        &self.store
    }
}
