//! Core types shared by the state machine, the light heads and the display.

/// Shortest configurable phase duration, in seconds.
pub const MIN_DURATION: u8 = 1;

/// Longest configurable phase duration, in seconds.
pub const MAX_DURATION: u8 = 99;

/// Color shown by one signal head, encoded as the 2-bit code driven onto its
/// control lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LightColor {
    /// `00`
    Off = 0b00,
    /// `01`
    Green = 0b01,
    /// `10`
    Yellow = 0b10,
    /// `11`
    Red = 0b11,
}

impl LightColor {
    /// Returns the 2-bit code for this color.
    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Decodes a 2-bit code. Only the low two bits are considered.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => LightColor::Off,
            0b01 => LightColor::Green,
            0b10 => LightColor::Yellow,
            _ => LightColor::Red,
        }
    }

    /// Single letter used on the display.
    pub const fn letter(self) -> char {
        match self {
            LightColor::Off => '-',
            LightColor::Green => 'G',
            LightColor::Yellow => 'Y',
            LightColor::Red => 'R',
        }
    }
}

/// Traffic direction served by one signal head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// North-South.
    NorthSouth,
    /// East-West.
    EastWest,
}

/// Top-level state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FsmState {
    /// Boot screen, left after a fixed number of seconds.
    Init,
    /// Automatic cycling through the four phases.
    AutoNormal,
    /// Editing the red duration.
    AutoRed,
    /// Editing the yellow duration.
    AutoYellow,
    /// Editing the green duration.
    AutoGreen,
    /// Operator controlled, steady lights.
    Manual,
    /// Operator controlled, both heads flashing yellow.
    ManualFlashYellow,
    /// Operator controlled, both heads flashing red.
    ManualFlashRed,
}

impl FsmState {
    /// True for the automatic group (normal operation and the three editors).
    pub const fn is_auto(self) -> bool {
        matches!(
            self,
            FsmState::AutoNormal | FsmState::AutoRed | FsmState::AutoYellow | FsmState::AutoGreen
        )
    }

    /// True for the manual group.
    pub const fn is_manual(self) -> bool {
        matches!(
            self,
            FsmState::Manual | FsmState::ManualFlashYellow | FsmState::ManualFlashRed
        )
    }

    /// The duration edited in this state, if it is one of the editors.
    pub const fn edited_duration(self) -> Option<DurationKind> {
        match self {
            FsmState::AutoRed => Some(DurationKind::Red),
            FsmState::AutoYellow => Some(DurationKind::Yellow),
            FsmState::AutoGreen => Some(DurationKind::Green),
            _ => None,
        }
    }
}

/// Steady light pattern used in manual operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ManualSubState {
    /// NS red, EW green.
    #[default]
    NsRedEwGreen,
    /// NS green, EW red.
    NsGreenEwRed,
}

impl ManualSubState {
    /// The other sub-state.
    pub const fn toggled(self) -> Self {
        match self {
            ManualSubState::NsRedEwGreen => ManualSubState::NsGreenEwRed,
            ManualSubState::NsGreenEwRed => ManualSubState::NsRedEwGreen,
        }
    }

    /// Colors for (NS, EW).
    pub const fn colors(self) -> (LightColor, LightColor) {
        match self {
            ManualSubState::NsRedEwGreen => (LightColor::Red, LightColor::Green),
            ManualSubState::NsGreenEwRed => (LightColor::Green, LightColor::Red),
        }
    }
}

/// One of the four phases of automatic operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// NS green, EW red.
    #[default]
    NsGreenEwRed,
    /// NS yellow, EW red.
    NsYellowEwRed,
    /// NS red, EW green.
    NsRedEwGreen,
    /// NS red, EW yellow.
    NsRedEwYellow,
}

impl Phase {
    /// The phase that follows this one in the fixed cycle.
    pub const fn next(self) -> Self {
        match self {
            Phase::NsGreenEwRed => Phase::NsYellowEwRed,
            Phase::NsYellowEwRed => Phase::NsRedEwGreen,
            Phase::NsRedEwGreen => Phase::NsRedEwYellow,
            Phase::NsRedEwYellow => Phase::NsGreenEwRed,
        }
    }

    /// Colors for (NS, EW).
    pub const fn colors(self) -> (LightColor, LightColor) {
        match self {
            Phase::NsGreenEwRed => (LightColor::Green, LightColor::Red),
            Phase::NsYellowEwRed => (LightColor::Yellow, LightColor::Red),
            Phase::NsRedEwGreen => (LightColor::Red, LightColor::Green),
            Phase::NsRedEwYellow => (LightColor::Red, LightColor::Yellow),
        }
    }

    /// Countdown values (NS, EW) loaded on entry to this phase.
    ///
    /// Yellow phases load the yellow duration into both directions, so the
    /// phase ends as soon as the yellow runs out.
    pub const fn countdowns(self, durations: &Durations) -> (u8, u8) {
        match self {
            Phase::NsGreenEwRed => (durations.green, durations.red),
            Phase::NsYellowEwRed => (durations.yellow, durations.yellow),
            Phase::NsRedEwGreen => (durations.red, durations.green),
            Phase::NsRedEwYellow => (durations.yellow, durations.yellow),
        }
    }
}

/// Selects one of the three configurable durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DurationKind {
    /// Red duration.
    Red,
    /// Yellow duration.
    Yellow,
    /// Green duration.
    Green,
}

/// Configured phase durations in seconds, each in `MIN_DURATION..=MAX_DURATION`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Durations {
    /// Red, in seconds.
    pub red: u8,
    /// Yellow, in seconds.
    pub yellow: u8,
    /// Green, in seconds.
    pub green: u8,
}

impl Default for Durations {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Durations {
    /// Factory durations: red 5 s, yellow 2 s, green 3 s (balanced).
    pub const DEFAULT: Self = Durations {
        red: 5,
        yellow: 2,
        green: 3,
    };

    /// Creates a duration set, returning `None` if any value is out of range.
    pub const fn new(red: u8, yellow: u8, green: u8) -> Option<Self> {
        if in_range(red) && in_range(yellow) && in_range(green) {
            Some(Durations { red, yellow, green })
        } else {
            None
        }
    }

    /// Red must cover exactly one yellow plus one green of the crossing direction.
    #[inline]
    pub const fn is_balanced(&self) -> bool {
        self.red as u16 == self.yellow as u16 + self.green as u16
    }

    /// Returns the selected duration.
    pub const fn get(&self, kind: DurationKind) -> u8 {
        match kind {
            DurationKind::Red => self.red,
            DurationKind::Yellow => self.yellow,
            DurationKind::Green => self.green,
        }
    }

    fn slot(&mut self, kind: DurationKind) -> &mut u8 {
        match kind {
            DurationKind::Red => &mut self.red,
            DurationKind::Yellow => &mut self.yellow,
            DurationKind::Green => &mut self.green,
        }
    }

    /// Adds one second, wrapping from `MAX_DURATION` to `MIN_DURATION`.
    pub fn increment(&mut self, kind: DurationKind) {
        let slot = self.slot(kind);
        *slot = if *slot >= MAX_DURATION {
            MIN_DURATION
        } else {
            *slot + 1
        };
    }

    /// Removes one second, wrapping from `MIN_DURATION` to `MAX_DURATION`.
    pub fn decrement(&mut self, kind: DurationKind) {
        let slot = self.slot(kind);
        *slot = if *slot <= MIN_DURATION {
            MAX_DURATION
        } else {
            *slot - 1
        };
    }
}

const fn in_range(value: u8) -> bool {
    value >= MIN_DURATION && value <= MAX_DURATION
}
