//! End-to-end tests driving the controller through ticks and mock GPIO

mod common;
use common::*;

use traffic_controller::{
    Button, ButtonBank, Controller, DefaultStore, Durations, FsmState, LightColor, Phase,
    SchedulerError, Shared, TICKS_PER_SECOND, Task,
};

use LightColor::{Green, Off, Red, Yellow};

fn heads(c: &TestController) -> (LightColor, LightColor) {
    c.fsm().lights().actuator().colors()
}

#[test]
fn registers_the_standard_tasks() {
    let c = controller();
    assert_eq!(c.scheduler().len(), Task::ALL.len());

    let mut ids: Vec<_> = Task::ALL.iter().map(|t| c.task_id(*t)).collect();
    assert!(ids.iter().all(|id| id.is_valid()));
    assert!(ids.iter().all(|id| c.scheduler().contains(*id)));

    ids.dedup();
    assert_eq!(ids.len(), Task::ALL.len());
}

#[test]
fn too_small_a_scheduler_is_rejected() {
    let result = Controller::<MockInput, MockActuator, MockDisplay, DefaultStore, 3>::new(
        MockInput::new(),
        ButtonBank::active_low(),
        MockActuator::new(),
        MockDisplay::new(),
        DefaultStore,
    );
    assert!(matches!(result, Err(SchedulerError::Full { capacity: 3 })));
}

#[test]
fn boots_into_automatic_after_three_seconds() {
    let mut c = controller();

    run_seconds(&mut c, 2);
    assert_eq!(c.fsm().state(), FsmState::Init);
    assert_eq!(heads(&c), (Off, Off));

    run_seconds(&mut c, 1);
    assert_eq!(c.fsm().state(), FsmState::AutoNormal);
    assert_eq!(c.fsm().durations(), Durations::DEFAULT);
    assert_eq!(c.fsm().phase(), Phase::NsGreenEwRed);
    assert_eq!(c.fsm().countdowns(), (3, 5));
    assert_eq!(heads(&c), (Green, Red));
}

#[test]
fn display_follows_within_a_hundred_milliseconds() {
    let mut c = controller();

    c.run_ticks(1);
    assert_eq!(c.fsm().display().top, "TRAFFIC LIGHT");
    assert_eq!(c.fsm().display().redraws, 1);

    // Nothing changes on the boot screen, so nothing is redrawn.
    c.run_ticks(299);
    assert_eq!(c.fsm().display().redraws, 1);
    assert_eq!(c.fsm().display().bottom, "STARTING...");

    c.run_ticks(1);
    assert_eq!(c.fsm().display().top, "NS R:-- Y:-- G:03");
    assert_eq!(c.fsm().display().bottom, "EW R:05 Y:-- G:--");
    assert_eq!(c.fsm().display().redraws, 2);
}

#[test]
fn uptime_tracks_the_tick_count() {
    let mut c = controller();
    c.run_ticks(5 * TICKS_PER_SECOND + 30);
    assert_eq!(c.ticks().uptime_seconds(), 5);
    assert_eq!(c.ticks().sub_second_ticks(), 30);
    assert_eq!(c.shared().signals().pending_seconds(), 0);
}

#[test]
fn seconds_are_not_lost_when_the_main_loop_stalls() {
    let mut c = controller();

    for _ in 0..3 * TICKS_PER_SECOND {
        c.tick();
    }
    assert_eq!(c.shared().signals().pending_seconds(), 3);
    assert_eq!(c.fsm().state(), FsmState::Init);

    c.dispatch();
    assert_eq!(c.fsm().state(), FsmState::AutoNormal);
    assert_eq!(c.shared().signals().pending_seconds(), 0);
}

#[test]
fn full_automatic_cycle_takes_ten_seconds() {
    let mut c = controller();
    run_seconds(&mut c, 3);

    run_seconds(&mut c, 3);
    assert_eq!(c.fsm().phase(), Phase::NsYellowEwRed);
    assert_eq!(heads(&c), (Yellow, Red));

    run_seconds(&mut c, 2);
    assert_eq!(c.fsm().phase(), Phase::NsRedEwGreen);
    assert_eq!(heads(&c), (Red, Green));

    run_seconds(&mut c, 3);
    assert_eq!(c.fsm().phase(), Phase::NsRedEwYellow);
    assert_eq!(heads(&c), (Red, Yellow));

    run_seconds(&mut c, 2);
    assert_eq!(c.fsm().phase(), Phase::NsGreenEwRed);
    assert_eq!(c.fsm().countdowns(), (3, 5));
}

#[test]
fn clicks_reach_the_state_machine() {
    let mut c = controller();
    run_seconds(&mut c, 3);

    click(&mut c, Button::Mode);
    assert_eq!(c.fsm().state(), FsmState::Manual);
    assert_eq!(heads(&c), (Red, Green));

    click(&mut c, Button::Cycle);
    assert_eq!(heads(&c), (Green, Red));

    click(&mut c, Button::Mode);
    assert_eq!(c.fsm().state(), FsmState::AutoNormal);
}

#[test]
fn holding_a_button_counts_as_one_press() {
    let mut c = controller();
    run_seconds(&mut c, 3);

    c.input_mut().press(Button::Cycle);
    run_seconds(&mut c, 3);
    c.input_mut().release(Button::Cycle);
    c.run_ticks(10);

    assert_eq!(c.fsm().state(), FsmState::AutoRed);
}

#[test]
fn editing_durations_end_to_end() {
    let mut c = controller();
    run_seconds(&mut c, 3);

    // Yellow 2 -> 3 and red 5 -> 6 keeps the set balanced.
    click(&mut c, Button::Cycle);
    click(&mut c, Button::Increase);
    click(&mut c, Button::Cycle);
    click(&mut c, Button::Increase);
    click(&mut c, Button::Cycle);

    c.run_ticks(10);
    assert_eq!(c.fsm().state(), FsmState::AutoGreen);
    assert_eq!(c.fsm().display().top, "CONFIG GREEN");
    assert_eq!(c.fsm().display().bottom, "R:06 Y:03 G:03");

    click(&mut c, Button::Cycle);
    assert_eq!(c.fsm().state(), FsmState::AutoNormal);
    assert!(c.fsm().is_balanced());
    assert_eq!(c.fsm().countdowns(), (3, 6));
}

#[test]
fn editor_heads_flash_on_the_half_second() {
    let mut c = controller();
    run_seconds(&mut c, 3);
    click(&mut c, Button::Cycle);
    assert_eq!(heads(&c), (Off, Off));

    let mut lit = 0;
    let mut dark = 0;
    for _ in 0..2 * TICKS_PER_SECOND {
        c.run_ticks(1);
        match heads(&c) {
            (Red, Red) => lit += 1,
            (Off, Off) => dark += 1,
            other => panic!("unexpected heads {:?}", other),
        }
    }
    assert!(lit > 0);
    assert!(dark > 0);
}

#[test]
fn manual_flash_yellow_end_to_end() {
    let mut c = controller();
    run_seconds(&mut c, 3);
    click(&mut c, Button::Mode);
    click(&mut c, Button::Increase);
    assert_eq!(c.fsm().state(), FsmState::ManualFlashYellow);

    let mut seen_yellow = false;
    for _ in 0..TICKS_PER_SECOND {
        c.run_ticks(1);
        seen_yellow |= heads(&c) == (Yellow, Yellow);
    }
    assert!(seen_yellow);

    click(&mut c, Button::Increase);
    assert_eq!(c.fsm().state(), FsmState::Manual);
    assert_eq!(heads(&c), (Red, Green));
}

#[test]
fn press_is_handled_by_the_dispatch_after_its_tick() {
    let mut c = controller();
    run_seconds(&mut c, 3);

    c.input_mut().press(Button::Mode);
    let mut accepted_on = None;
    for tick in 1..=20 {
        c.tick();
        let held = c.buttons().is_held(Button::Mode.index());
        c.dispatch();

        if held {
            accepted_on = Some(tick);
            assert_eq!(c.fsm().state(), FsmState::Manual);
            break;
        }
        assert_eq!(c.fsm().state(), FsmState::AutoNormal);
    }
    assert!(accepted_on.is_some());
}

#[test]
fn split_halves_run_side_by_side() {
    let mut c = controller();
    let (mut ticker, mut dispatcher) = c.split();

    // Dispatch runs between ticks without the interrupt side being locked out.
    for _ in 0..3 * TICKS_PER_SECOND {
        ticker.tick();
        dispatcher.dispatch();
    }
    assert_eq!(dispatcher.fsm().state(), FsmState::AutoNormal);
    assert!(!ticker.buttons().is_held(Button::Mode.index()));
}

#[test]
fn tick_half_can_run_in_another_context() {
    let mut c = controller();
    let (mut ticker, mut dispatcher) = c.split();

    std::thread::scope(|scope| {
        scope.spawn(move || {
            for _ in 0..3 * TICKS_PER_SECOND {
                ticker.tick();
            }
        });
    });

    // Every elapsed second was queued for the stalled main loop.
    dispatcher.dispatch();
    assert_eq!(dispatcher.fsm().state(), FsmState::AutoNormal);
}

#[test]
fn shared_state_is_sync() {
    fn assert_sync<T: Sync>() {}
    assert_sync::<Shared>();
}
