//! Shared test infrastructure for traffic-controller integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use embedded_storage::{ReadStorage, Storage};
use traffic_controller::{
    Button, ButtonBank, Controller, DefaultStore, Direction, DisplaySink, InputSource,
    LightActuator, LightColor, TICKS_PER_SECOND,
};

// ============================================================================
// Mock Input
// ============================================================================

/// Active-low button wiring: a released button reads high.
pub struct MockInput {
    levels: [bool; 4],
}

impl MockInput {
    pub fn new() -> Self {
        Self { levels: [true; 4] }
    }

    pub fn press(&mut self, button: Button) {
        self.levels[button.index()] = false;
    }

    pub fn release(&mut self, button: Button) {
        self.levels[button.index()] = true;
    }

    pub fn set_raw(&mut self, index: usize, level: bool) {
        self.levels[index] = level;
    }
}

impl InputSource for MockInput {
    fn read_raw(&mut self, index: usize) -> bool {
        self.levels.get(index).copied().unwrap_or(true)
    }
}

// ============================================================================
// Mock Signal Heads
// ============================================================================

/// Mock actuator that records every write
pub struct MockActuator {
    ns: LightColor,
    ew: LightColor,
    history: heapless::Vec<(Direction, LightColor), 64>,
}

impl MockActuator {
    pub fn new() -> Self {
        Self {
            ns: LightColor::Off,
            ew: LightColor::Off,
            history: heapless::Vec::new(),
        }
    }

    pub fn colors(&self) -> (LightColor, LightColor) {
        (self.ns, self.ew)
    }

    pub fn history(&self) -> &[(Direction, LightColor)] {
        &self.history
    }
}

impl LightActuator for MockActuator {
    fn set_color(&mut self, direction: Direction, color: LightColor) {
        match direction {
            Direction::NorthSouth => self.ns = color,
            Direction::EastWest => self.ew = color,
        }
        let _ = self.history.push((direction, color));
    }
}

// ============================================================================
// Mock Display
// ============================================================================

/// Mock display that keeps the last frame and counts redraws
pub struct MockDisplay {
    pub top: String,
    pub bottom: String,
    pub redraws: usize,
}

impl MockDisplay {
    pub fn new() -> Self {
        Self {
            top: String::new(),
            bottom: String::new(),
            redraws: 0,
        }
    }
}

impl DisplaySink for MockDisplay {
    fn show(&mut self, top: &str, bottom: &str) {
        self.top = top.to_string();
        self.bottom = bottom.to_string();
        self.redraws += 1;
    }
}

// ============================================================================
// Mock Flash
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashFault;

/// RAM-backed storage device, erased to 0xFF
#[derive(Clone)]
pub struct MemoryFlash {
    pub data: [u8; 64],
    pub failing: bool,
    pub writes: usize,
}

impl MemoryFlash {
    pub fn erased() -> Self {
        Self {
            data: [0xFF; 64],
            failing: false,
            writes: 0,
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::erased()
        }
    }
}

impl ReadStorage for MemoryFlash {
    type Error = FlashFault;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        if self.failing {
            return Err(FlashFault);
        }
        let start = offset as usize;
        let end = start + bytes.len();
        let src = self.data.get(start..end).ok_or(FlashFault)?;
        bytes.copy_from_slice(src);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }
}

impl Storage for MemoryFlash {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.failing {
            return Err(FlashFault);
        }
        let start = offset as usize;
        let end = start + bytes.len();
        let dst = self.data.get_mut(start..end).ok_or(FlashFault)?;
        dst.copy_from_slice(bytes);
        self.writes += 1;
        Ok(())
    }
}

// ============================================================================
// Test Helper Functions
// ============================================================================

pub type TestController = Controller<MockInput, MockActuator, MockDisplay, DefaultStore>;

pub fn controller() -> TestController {
    Controller::new(
        MockInput::new(),
        ButtonBank::active_low(),
        MockActuator::new(),
        MockDisplay::new(),
        DefaultStore,
    )
    .unwrap()
}

/// Runs whole seconds of ticks, dispatching after each tick
pub fn run_seconds(controller: &mut TestController, seconds: u32) {
    controller.run_ticks(seconds * TICKS_PER_SECOND);
}

/// Holds a button long enough to be accepted, then releases it
pub fn click(controller: &mut TestController, button: Button) {
    controller.input_mut().press(button);
    controller.run_ticks(10);
    controller.input_mut().release(button);
    controller.run_ticks(10);
}
