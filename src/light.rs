//! Signal head control.
//!
//! Defines the [`LightActuator`] trait for the hardware and [`SignalHeads`],
//! which layers "both directions" and flash toggling on top of it.

use crate::types::{Direction, LightColor};

/// Trait for abstracting the signal head hardware.
///
/// Implement this for whatever drives the lamps (two GPIO lines per direction
/// carrying [`LightColor::bits`], a shift register, ...). Handle hardware errors
/// internally; this method cannot fail.
pub trait LightActuator {
    /// Shows `color` on the head for `direction`.
    fn set_color(&mut self, direction: Direction, color: LightColor);
}

/// Both signal heads of the intersection.
///
/// Tracks the last commanded color per direction so flashing can be expressed
/// as a toggle, and so unchanged colors are not written again.
pub struct SignalHeads<A: LightActuator> {
    actuator: A,
    ns: LightColor,
    ew: LightColor,
}

impl<A: LightActuator> SignalHeads<A> {
    /// Takes ownership of the actuator and switches both heads off.
    pub fn new(mut actuator: A) -> Self {
        actuator.set_color(Direction::NorthSouth, LightColor::Off);
        actuator.set_color(Direction::EastWest, LightColor::Off);

        Self {
            actuator,
            ns: LightColor::Off,
            ew: LightColor::Off,
        }
    }

    /// Sets one head.
    pub fn set(&mut self, direction: Direction, color: LightColor) {
        let current = match direction {
            Direction::NorthSouth => &mut self.ns,
            Direction::EastWest => &mut self.ew,
        };

        // Update the hardware only if the color changed
        if *current != color {
            *current = color;
            self.actuator.set_color(direction, color);
        }
    }

    /// Sets the North-South head.
    #[inline]
    pub fn set_ns(&mut self, color: LightColor) {
        self.set(Direction::NorthSouth, color);
    }

    /// Sets the East-West head.
    #[inline]
    pub fn set_ew(&mut self, color: LightColor) {
        self.set(Direction::EastWest, color);
    }

    /// Sets the heads to (NS, EW).
    pub fn set_pair(&mut self, (ns, ew): (LightColor, LightColor)) {
        self.set_ns(ns);
        self.set_ew(ew);
    }

    /// Sets both heads to the same color.
    pub fn set_both(&mut self, color: LightColor) {
        self.set_pair((color, color));
    }

    /// Switches both heads off.
    pub fn off_all(&mut self) {
        self.set_both(LightColor::Off);
    }

    /// Flash step for one head: off if lit, otherwise `color`.
    pub fn toggle(&mut self, direction: Direction, color: LightColor) {
        let next = if self.color(direction) != LightColor::Off {
            LightColor::Off
        } else {
            color
        };
        self.set(direction, next);
    }

    /// Flash step for the North-South head.
    #[inline]
    pub fn toggle_ns(&mut self, color: LightColor) {
        self.toggle(Direction::NorthSouth, color);
    }

    /// Flash step for the East-West head.
    #[inline]
    pub fn toggle_ew(&mut self, color: LightColor) {
        self.toggle(Direction::EastWest, color);
    }

    /// Flash step for both heads together: both off if either is lit,
    /// otherwise both `color`. Keeps the two heads in phase.
    pub fn toggle_both(&mut self, color: LightColor) {
        if self.is_lit() {
            self.off_all();
        } else {
            self.set_both(color);
        }
    }

    /// Last color commanded for `direction`.
    pub fn color(&self, direction: Direction) -> LightColor {
        match direction {
            Direction::NorthSouth => self.ns,
            Direction::EastWest => self.ew,
        }
    }

    /// Last colors commanded as (NS, EW).
    pub fn colors(&self) -> (LightColor, LightColor) {
        (self.ns, self.ew)
    }

    /// True if either head is showing a color.
    pub fn is_lit(&self) -> bool {
        self.ns != LightColor::Off || self.ew != LightColor::Off
    }

    /// Returns a reference to the actuator.
    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Returns a mutable reference to the actuator.
    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }
}
