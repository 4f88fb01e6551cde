//! Debounced button input.
//!
//! Raw pin levels are sampled once per tick and filtered by a per-channel
//! [`Debouncer`]. Accepted edges are published as one-shot flags in
//! [`ButtonEvents`], which the dispatch side consumes at its own pace. Each
//! flag is raised at most once per physical press and cleared by the first
//! read, so a slow consumer never handles the same press twice.

use portable_atomic::{AtomicBool, Ordering};

/// Number of button channels.
pub const BUTTON_COUNT: usize = 4;

/// Consecutive equal samples required before a level is accepted.
pub const DEBOUNCE_TICKS: u8 = 5;

/// Ticks a button must stay pressed to count as a long press (one second).
pub const LONG_PRESS_TICKS: u16 = 100;

/// Trait for abstracting the digital inputs the buttons are wired to.
///
/// Implement this for your GPIO. Return the electrical level; the sampler
/// handles active-low wiring.
pub trait InputSource {
    /// Reads the raw level of channel `index` (`true` = high).
    fn read_raw(&mut self, index: usize) -> bool;
}

/// The four front panel buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// Switches between automatic and manual operation.
    Mode = 0,
    /// Cycles the duration editors, or the manual light pattern.
    Cycle = 1,
    /// Increments the edited duration, or starts flashing yellow.
    Increase = 2,
    /// Decrements the edited duration, or starts flashing red.
    Decrease = 3,
}

impl Button {
    /// All buttons in scan order.
    pub const ALL: [Button; BUTTON_COUNT] =
        [Button::Mode, Button::Cycle, Button::Increase, Button::Decrease];

    /// Channel index of this button.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Looks up the button wired to channel `index`.
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Button::Mode),
            1 => Some(Button::Cycle),
            2 => Some(Button::Increase),
            3 => Some(Button::Decrease),
            _ => None,
        }
    }
}

/// Event produced by a debouncer sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    /// Stable transition into the pressed level.
    Pressed,
    /// The button has been held for `LONG_PRESS_TICKS`.
    LongPressed,
    /// Stable transition back to the released level.
    Released,
}

/// Debounce and long-press state for one channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct Debouncer {
    last: bool,
    stable: bool,
    counter: u8,
    held_ticks: u16,
    long_fired: bool,
}

impl Debouncer {
    /// Creates a debouncer in the released state.
    pub const fn new() -> Self {
        Self {
            last: false,
            stable: false,
            counter: 0,
            held_ticks: 0,
            long_fired: false,
        }
    }

    /// Feeds one sample (`true` = pressed) and reports any accepted event.
    pub fn update(&mut self, pressed: bool) -> Option<ButtonEvent> {
        if pressed != self.last {
            // Any bounce restarts the window.
            self.counter = 0;
            self.last = pressed;
            return None;
        }

        if self.counter < DEBOUNCE_TICKS {
            self.counter += 1;
        }
        if self.counter < DEBOUNCE_TICKS {
            return None;
        }

        let mut event = None;
        if pressed != self.stable {
            self.stable = pressed;
            if pressed {
                self.held_ticks = 0;
                event = Some(ButtonEvent::Pressed);
            } else {
                event = Some(ButtonEvent::Released);
            }
        }

        if self.stable {
            self.held_ticks = self.held_ticks.saturating_add(1);
            if self.held_ticks >= LONG_PRESS_TICKS && !self.long_fired {
                self.long_fired = true;
                event = Some(ButtonEvent::LongPressed);
            }
        } else {
            self.held_ticks = 0;
            self.long_fired = false;
        }

        event
    }

    /// Debounced level (`true` = pressed).
    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.stable
    }

    /// Ticks spent stably pressed in the current press.
    #[inline]
    pub fn held_ticks(&self) -> u16 {
        self.held_ticks
    }
}

/// One-shot press flags shared between the tick and dispatch contexts.
///
/// The tick side raises flags, the dispatch side consumes them. Both sides only
/// need `&self`.
#[derive(Debug)]
pub struct ButtonEvents {
    pressed: [AtomicBool; BUTTON_COUNT],
    long_pressed: [AtomicBool; BUTTON_COUNT],
}

impl Default for ButtonEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl ButtonEvents {
    /// Creates a set with every flag cleared.
    pub const fn new() -> Self {
        Self {
            pressed: [const { AtomicBool::new(false) }; BUTTON_COUNT],
            long_pressed: [const { AtomicBool::new(false) }; BUTTON_COUNT],
        }
    }

    /// Returns whether `index` was pressed since the last call, clearing the flag.
    ///
    /// Out-of-range indices read as not pressed.
    pub fn consume_pressed(&self, index: usize) -> bool {
        self.pressed
            .get(index)
            .is_some_and(|flag| flag.swap(false, Ordering::AcqRel))
    }

    /// Returns whether `index` was long-pressed since the last call, clearing the flag.
    ///
    /// Out-of-range indices read as not pressed.
    pub fn consume_long_pressed(&self, index: usize) -> bool {
        self.long_pressed
            .get(index)
            .is_some_and(|flag| flag.swap(false, Ordering::AcqRel))
    }

    /// Clears every pending flag.
    pub fn clear(&self) {
        for flag in self.pressed.iter().chain(self.long_pressed.iter()) {
            flag.store(false, Ordering::Release);
        }
    }

    fn publish(&self, index: usize, event: ButtonEvent) {
        match event {
            ButtonEvent::Pressed => self.pressed[index].store(true, Ordering::Release),
            ButtonEvent::LongPressed => self.long_pressed[index].store(true, Ordering::Release),
            ButtonEvent::Released => {}
        }
    }

    fn clear_long_pressed(&self, index: usize) {
        self.long_pressed[index].store(false, Ordering::Release);
    }
}

/// The sampler for all button channels.
///
/// Owned by the tick context. Accepted presses are published into a
/// [`ButtonEvents`] that the dispatch context reads through a shared reference.
#[derive(Debug)]
pub struct ButtonBank {
    channels: [Debouncer; BUTTON_COUNT],
    active_low: bool,
}

impl ButtonBank {
    /// Creates a bank for buttons that pull the pin low when pressed.
    pub const fn active_low() -> Self {
        Self::with_polarity(true)
    }

    /// Creates a bank for buttons that drive the pin high when pressed.
    pub const fn active_high() -> Self {
        Self::with_polarity(false)
    }

    const fn with_polarity(active_low: bool) -> Self {
        Self {
            channels: [Debouncer::new(); BUTTON_COUNT],
            active_low,
        }
    }

    /// Samples channel `index` once. Out-of-range indices are ignored.
    pub fn sample<S: InputSource>(&mut self, index: usize, source: &mut S, events: &ButtonEvents) {
        let Some(channel) = self.channels.get_mut(index) else {
            return;
        };

        let pressed = source.read_raw(index) != self.active_low;
        match channel.update(pressed) {
            Some(ButtonEvent::Released) => {
                events.clear_long_pressed(index);
                debug!("button {} released", index);
            }
            Some(event) => {
                events.publish(index, event);
                debug!("button {} {}", index, event);
            }
            None => {}
        }
    }

    /// Samples every channel in index order.
    pub fn sample_all<S: InputSource>(&mut self, source: &mut S, events: &ButtonEvents) {
        for index in 0..BUTTON_COUNT {
            self.sample(index, source, events);
        }
    }

    /// Debounced level of channel `index`; out-of-range reads as released.
    pub fn is_held(&self, index: usize) -> bool {
        self.channels.get(index).is_some_and(Debouncer::is_pressed)
    }
}
