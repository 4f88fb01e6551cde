//! Two-line character display output.

use core::fmt::Write;

use heapless::String;

use crate::fsm::ControlState;
use crate::types::{FsmState, LightColor};

/// Characters per display line.
pub const DISPLAY_WIDTH: usize = 20;

/// A single display line.
pub type Line = String<DISPLAY_WIDTH>;

/// Trait for abstracting the character display.
///
/// Lines are at most [`DISPLAY_WIDTH`] characters. Pad or clear the rest of
/// the row as the hardware requires.
pub trait DisplaySink {
    /// Replaces the display contents.
    fn show(&mut self, top: &str, bottom: &str);
}

/// Rendered display contents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    top: Line,
    bottom: Line,
}

impl Frame {
    /// The first line.
    pub fn top(&self) -> &str {
        &self.top
    }

    /// The second line.
    pub fn bottom(&self) -> &str {
        &self.bottom
    }
}

/// Renders the control state into display lines.
pub fn render(state: &ControlState) -> Frame {
    let mut frame = Frame::default();

    // Lines are sized for the longest text below; a failed write only truncates.
    match state.state {
        FsmState::Init => {
            let _ = frame.top.push_str("TRAFFIC LIGHT");
            let _ = frame.bottom.push_str("STARTING...");
        }
        FsmState::AutoNormal if state.balanced => {
            let (ns, ew) = state.phase.colors();
            countdown_line(&mut frame.top, "NS", ns, state.ns_countdown);
            countdown_line(&mut frame.bottom, "EW", ew, state.ew_countdown);
        }
        FsmState::AutoNormal => {
            let _ = frame.top.push_str("ERR: UNBALANCED");
            durations_line(&mut frame.bottom, state);
        }
        FsmState::AutoRed | FsmState::AutoYellow | FsmState::AutoGreen => {
            let label = match state.state {
                FsmState::AutoRed => "RED",
                FsmState::AutoYellow => "YELLOW",
                _ => "GREEN",
            };
            let _ = write!(frame.top, "CONFIG {}", label);
            durations_line(&mut frame.bottom, state);
        }
        FsmState::Manual => {
            let _ = frame.top.push_str("MODE: MANUAL");
            let (ns, ew) = state.manual.colors();
            let _ = write!(frame.bottom, "NS:{} EW:{}", ns.letter(), ew.letter());
        }
        FsmState::ManualFlashYellow | FsmState::ManualFlashRed => {
            let _ = frame.top.push_str("MODE: MANUAL");
            let label = if state.state == FsmState::ManualFlashYellow {
                "YEL"
            } else {
                "RED"
            };
            let marker = if state.flash_on { " *" } else { "" };
            let _ = write!(frame.bottom, "FLASH {}{}", label, marker);
        }
    }

    frame
}

fn countdown_line(line: &mut Line, name: &str, color: LightColor, seconds: u8) {
    let _ = write!(line, "{}", name);
    for (field, field_color) in [
        ('R', LightColor::Red),
        ('Y', LightColor::Yellow),
        ('G', LightColor::Green),
    ] {
        if color == field_color {
            let _ = write!(line, " {}:{:02}", field, seconds);
        } else {
            let _ = write!(line, " {}:--", field);
        }
    }
}

fn durations_line(line: &mut Line, state: &ControlState) {
    let d = state.durations;
    let _ = write!(line, "R:{:02} Y:{:02} G:{:02}", d.red, d.yellow, d.green);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Durations, ManualSubState, Phase};

    fn state(fsm: FsmState) -> ControlState {
        ControlState {
            state: fsm,
            ..ControlState::new(Durations::DEFAULT)
        }
    }

    #[test]
    fn balanced_auto_shows_countdown_in_active_color_field() {
        let mut s = state(FsmState::AutoNormal);
        s.balanced = true;
        s.phase = Phase::NsGreenEwRed;
        s.ns_countdown = 3;
        s.ew_countdown = 5;
        let frame = render(&s);
        assert_eq!(frame.top(), "NS R:-- Y:-- G:03");
        assert_eq!(frame.bottom(), "EW R:05 Y:-- G:--");
    }

    #[test]
    fn unbalanced_auto_shows_error_and_durations() {
        let mut s = state(FsmState::AutoNormal);
        s.durations = Durations::new(5, 2, 4).unwrap();
        s.balanced = false;
        let frame = render(&s);
        assert_eq!(frame.top(), "ERR: UNBALANCED");
        assert_eq!(frame.bottom(), "R:05 Y:02 G:04");
    }

    #[test]
    fn config_screen_names_edited_color() {
        let frame = render(&state(FsmState::AutoYellow));
        assert_eq!(frame.top(), "CONFIG YELLOW");
        assert_eq!(frame.bottom(), "R:05 Y:02 G:03");
    }

    #[test]
    fn manual_screen_shows_both_heads() {
        let mut s = state(FsmState::Manual);
        s.manual = ManualSubState::NsGreenEwRed;
        assert_eq!(render(&s).bottom(), "NS:G EW:R");
    }

    #[test]
    fn flash_screen_shows_blink_marker() {
        let mut s = state(FsmState::ManualFlashRed);
        assert_eq!(render(&s).bottom(), "FLASH RED");
        s.flash_on = true;
        assert_eq!(render(&s).bottom(), "FLASH RED *");
    }

    #[test]
    fn every_line_fits_the_display() {
        for fsm in [
            FsmState::Init,
            FsmState::AutoNormal,
            FsmState::AutoRed,
            FsmState::AutoYellow,
            FsmState::AutoGreen,
            FsmState::Manual,
            FsmState::ManualFlashYellow,
            FsmState::ManualFlashRed,
        ] {
            let mut s = state(fsm);
            s.durations = Durations::new(99, 99, 99).unwrap();
            s.ns_countdown = 99;
            s.ew_countdown = 99;
            s.flash_on = true;
            let frame = render(&s);
            assert!(!frame.top().is_empty());
            assert!(!frame.bottom().is_empty());
            assert!(frame.top().len() <= DISPLAY_WIDTH);
        }
    }
}
