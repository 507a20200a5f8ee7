mod common;

use embassy_time::Instant;
use padmacro::NUM_BUTTONS;
use padmacro::event::InputEvent;
use padmacro::instance::MacroStatus;
use padmacro::scheduler::AlertReason;
use padmacro::types::action::{ActionSpec, ActionStep};
use padmacro::types::color::{ColorOverrides, ColorRole, Palette, Rgb};
use padmacro::types::definition::{MacroDefinition, MacroKind};

use crate::common::*;

fn waiting_toggle(name: &str, wait: u32, cycle: u32) -> MacroDefinition {
    definition(name, MacroKind::Toggle, &[ActionStep::new(ActionSpec::Wait(wait))]).with_cycle_wait(cycle)
}

#[test]
fn test_snapshot_reports_buttons_and_queue() {
    let mut scheduler: TestScheduler = create_scheduler(profile([
        (0, waiting_toggle("first", 500, 1000)),
        (1, waiting_toggle("second", 500, 1000)),
        (4, definition("tap", MacroKind::Press, &[KEY_A])),
    ]));

    tick(&mut scheduler, 0, &[InputEvent::down(0)]);
    tick(&mut scheduler, 10, &[InputEvent::down(1)]);

    let snapshot = scheduler.snapshot(Instant::from_millis(100));
    assert_eq!(snapshot.slot, Some(0));
    assert_eq!(snapshot.buttons[0].status, MacroStatus::Wait);
    assert_eq!(snapshot.buttons[0].kind, Some(MacroKind::Toggle));
    assert_eq!(snapshot.buttons[0].name.as_deref(), Some("first"));
    assert_eq!(snapshot.buttons[0].remaining_ms, Some(400));
    assert_eq!(snapshot.buttons[1].status, MacroStatus::InQueue);
    assert_eq!(snapshot.buttons[4].status, MacroStatus::Off);
    assert_eq!(snapshot.buttons[4].kind, Some(MacroKind::Press));
    assert_eq!(snapshot.buttons[5].kind, None);
    assert_eq!(snapshot.buttons[5].name, None);

    assert_eq!(snapshot.queue.len(), 1);
    assert_eq!(snapshot.queue[0].position, 0);
    assert_eq!(snapshot.queue[0].button, 1);
    assert_eq!(snapshot.queue[0].name.as_str(), "second");
    assert_eq!(snapshot.sleeping, 0);
    assert_eq!(snapshot.running().map(|(button, _)| button), Some(0));

    // Button 0 finishes its pass and goes to sleep, button 1 takes over
    tick(&mut scheduler, 500, &[]);
    let later = scheduler.snapshot(Instant::from_millis(700));
    assert_eq!(later.buttons[0].status, MacroStatus::Sleeping);
    assert_eq!(later.buttons[0].remaining_ms, Some(800));
    assert_eq!(later.buttons[1].status, MacroStatus::Active);
    assert_eq!(later.sleeping, 1);
    assert!(later.queue.is_empty());
    assert_eq!(later.changed_since(&snapshot).collect::<Vec<_>>(), [0, 1]);
}

#[test]
fn test_indicator_colors() {
    let mut overrides = ColorOverrides::default();
    overrides.set(ColorRole::Running, Rgb::new(1, 2, 3));
    let mut scheduler: TestScheduler = create_scheduler(profile([
        (0, waiting_toggle("running", 500, 1000).with_colors(overrides)),
        (1, waiting_toggle("queued", 500, 1000)),
        (2, waiting_toggle("ready", 500, 1000)),
        (3, waiting_toggle("sleeping", 0, 5000)),
    ]));
    let palette = Palette::default();

    tick(&mut scheduler, 0, &[InputEvent::down(3)]);
    tick(&mut scheduler, 1, &[]);
    assert_eq!(scheduler.status(3), MacroStatus::Sleeping);
    tick(&mut scheduler, 2, &[InputEvent::down(0)]);
    tick(&mut scheduler, 3, &[InputEvent::down(1)]);

    let colors = scheduler.indicator_colors(Instant::from_millis(3), &palette);
    assert_eq!(colors[0], Rgb::new(1, 2, 3));
    assert_eq!(colors[1], palette.queued);
    assert_eq!(colors[2], palette.ready);
    assert_eq!(colors[3], palette.sleeping);
    assert_eq!(colors[4], palette.off);

    tick(&mut scheduler, 4, &[InputEvent::down(1)]);
    let colors = scheduler.indicator_colors(Instant::from_millis(4), &palette);
    assert_eq!(colors[1], palette.ready);
}

#[test]
fn test_alert_lasts_until_it_expires() {
    let mut scheduler: TestScheduler = create_scheduler(profile([(0, waiting_toggle("loop", 500, 0))]));
    let palette = Palette::default();

    tick(&mut scheduler, 0, &[InputEvent::down(0)]);
    tick(&mut scheduler, 1000, &[InputEvent::EmergencyStop]);

    let alert = scheduler.alert(Instant::from_millis(1000)).unwrap();
    assert_eq!(alert.reason, AlertReason::EmergencyStop);
    let colors = scheduler.indicator_colors(Instant::from_millis(2499), &palette);
    assert_eq!(colors, [palette.alert; NUM_BUTTONS]);
    assert!(scheduler.snapshot(Instant::from_millis(2499)).alert.is_some());

    tick(&mut scheduler, 2500, &[]);
    assert!(scheduler.alert(Instant::from_millis(2500)).is_none());
    assert!(scheduler.snapshot(Instant::from_millis(2500)).alert.is_none());
    let colors = scheduler.indicator_colors(Instant::from_millis(2500), &palette);
    assert_eq!(colors[0], palette.ready);

    tick(&mut scheduler, 2501, &[InputEvent::down(0)]);
    assert!(scheduler.status(0).is_running());
}
