mod common;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::Instant;
use padmacro::channel::{INPUT_EVENT_CHANNEL, REPORT_CHANNEL};
use padmacro::descriptor::{KeyboardReport, MouseReport};
use padmacro::event::InputEvent;
use padmacro::hid::{Report, ReportOutput};
use padmacro::instance::MacroStatus;
use padmacro::processor::{MacroProcessor, NoProfiles, ProfileSource};
use padmacro::scheduler::Scheduler;
use padmacro::types::action::{ActionSpec, ActionStep};
use padmacro::types::definition::{MacroKind, ProfileSlots};
use padmacro::types::keycode::HidKeyCode;
use padmacro::types::mouse_button::MouseButton;
use rand::rngs::SmallRng;

use crate::common::*;

fn first_profile() -> ProfileSlots {
    profile([(0, definition("first", MacroKind::Toggle, &[KEY_A.wait(50)]))])
}

fn second_profile() -> ProfileSlots {
    profile([(1, definition("second", MacroKind::Toggle, &[KEY_B.wait(50)]))])
}

/// Rotates between two fixed profiles
struct TwoProfiles {
    current: i32,
}

impl ProfileSource for TwoProfiles {
    fn rotate(&mut self, step: i8) -> Option<ProfileSlots> {
        self.current = (self.current + step as i32).rem_euclid(2);
        Some(if self.current == 0 { first_profile() } else { second_profile() })
    }
}

fn keyboard(modifier: u8, first_key: u8) -> Report {
    Report::KeyboardReport(KeyboardReport {
        modifier,
        reserved: 0,
        keycodes: [first_key, 0, 0, 0, 0, 0],
    })
}

#[test]
fn test_poll_drains_pending_events() {
    let channel: Channel<NoopRawMutex, InputEvent, 16> = Channel::new();
    let scheduler: TestScheduler = create_scheduler(first_profile());
    let mut processor = MacroProcessor::new(scheduler, NoProfiles, channel.receiver());

    channel.try_send(InputEvent::down(0)).unwrap();
    channel.try_send(InputEvent::up(0)).unwrap();
    // Without profiles the rotation changes nothing
    channel.try_send(InputEvent::Rotate(1)).unwrap();
    processor.poll(Instant::from_millis(0));

    assert!(channel.is_empty());
    assert!(processor.scheduler().status(0).is_running());
    assert_eq!(processor.scheduler().output().presses(), [HidKeyCode::A]);

    processor.poll_with(Some(InputEvent::EmergencyStop), Instant::from_millis(1));
    assert_eq!(processor.scheduler().status(0), MacroStatus::Off);
    assert!(processor.scheduler().check_invariants().is_ok());
}

#[test]
fn test_rotation_loads_next_profile() {
    let channel: Channel<NoopRawMutex, InputEvent, 16> = Channel::new();
    let scheduler: TestScheduler = create_scheduler(first_profile());
    let mut processor = MacroProcessor::new(scheduler, TwoProfiles { current: 0 }, channel.receiver());

    channel.try_send(InputEvent::down(0)).unwrap();
    processor.poll(Instant::from_millis(0));
    assert!(processor.scheduler().status(0).is_running());

    // The first event belongs to the old profile and is dropped
    channel.try_send(InputEvent::down(1)).unwrap();
    channel.try_send(InputEvent::Rotate(1)).unwrap();
    channel.try_send(InputEvent::down(1)).unwrap();
    processor.poll(Instant::from_millis(10));

    let scheduler = processor.scheduler();
    assert!(scheduler.instance(0).unwrap().definition().is_none());
    assert_eq!(scheduler.instance(1).unwrap().definition().unwrap().name.as_str(), "second");
    assert!(scheduler.status(1).is_running());
    assert_eq!(scheduler.output().presses(), [HidKeyCode::A, HidKeyCode::B]);
    assert_eq!(scheduler.output().count(OutputEvent::ReleaseAll), 1);
    assert!(scheduler.check_invariants().is_ok());

    channel.try_send(InputEvent::Rotate(-1)).unwrap();
    processor.poll(Instant::from_millis(20));
    assert_eq!(processor.profiles().current, 0);
    assert_eq!(processor.scheduler().status(1), MacroStatus::Off);
    assert_eq!(
        processor.scheduler().instance(0).unwrap().definition().unwrap().name.as_str(),
        "first"
    );
}

#[test]
fn test_macro_output_as_hid_reports() {
    let reports: Channel<NoopRawMutex, Report, 32> = Channel::new();
    let mut scheduler: Scheduler<_, SmallRng> = Scheduler::with_seed(ReportOutput::new(reports.sender()), 1);
    scheduler.load_profile(profile([(
        0,
        definition(
            "copy and greet",
            MacroKind::Press,
            &[
                ActionStep::new(ActionSpec::PressCombo(&[HidKeyCode::LCtrl, HidKeyCode::C])),
                ActionStep::new(ActionSpec::TypeText("Hi")),
                ActionStep::new(ActionSpec::MouseClick(MouseButton::Left)),
            ],
        ),
    )]));
    // Profile load releases everything
    assert_eq!(reports.try_receive().ok(), Some(keyboard(0, 0)));
    assert_eq!(reports.try_receive().ok(), Some(Report::MouseReport(MouseReport::default())));

    for t in 0..5 {
        let down = [InputEvent::down(0)];
        scheduler.tick(Instant::from_millis(t), if t == 0 { &down } else { &[] });
    }

    let mut received = Vec::new();
    while let Ok(report) = reports.try_receive() {
        received.push(report);
    }
    let click = |buttons| {
        Report::MouseReport(MouseReport {
            buttons,
            ..Default::default()
        })
    };
    assert_eq!(
        received,
        [
            keyboard(0x01, 0),
            keyboard(0x01, HidKeyCode::C as u8),
            keyboard(0x01, 0),
            keyboard(0, 0),
            keyboard(0x02, HidKeyCode::H as u8),
            keyboard(0, 0),
            keyboard(0, HidKeyCode::I as u8),
            keyboard(0, 0),
            click(0x01),
            click(0),
        ]
    );
}

#[test]
fn test_static_channels() {
    let scheduler: Scheduler<_, SmallRng> = Scheduler::with_seed(ReportOutput::new(REPORT_CHANNEL.sender()), 1);
    let mut processor = MacroProcessor::new(scheduler, NoProfiles, INPUT_EVENT_CHANNEL.receiver());
    processor.scheduler_mut().load_profile(first_profile());
    REPORT_CHANNEL.clear();

    INPUT_EVENT_CHANNEL.try_send(InputEvent::down(0)).unwrap();
    processor.poll(Instant::from_millis(0));

    assert_eq!(REPORT_CHANNEL.try_receive().ok(), Some(keyboard(0, HidKeyCode::A as u8)));
    assert_eq!(REPORT_CHANNEL.try_receive().ok(), Some(keyboard(0, 0)));
    assert!(REPORT_CHANNEL.is_empty());
}
