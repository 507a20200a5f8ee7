#![allow(dead_code)]

use embassy_time::Instant;
use padmacro::QUEUE_CAPACITY;
use padmacro::event::InputEvent;
use padmacro::instance::MacroStatus;
use padmacro::output::MacroOutput;
use padmacro::scheduler::Scheduler;
use padmacro::types::action::{ActionSpec, ActionStep, ActionTree};
use padmacro::types::definition::{MacroDefinition, MacroKind, ProfileSlots, empty_slots};
use padmacro::types::keycode::HidKeyCode;
use padmacro::types::mouse_button::MouseButton;
use rand::rngs::SmallRng;
use rand_core::RngCore;

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

pub const KEY_A: ActionStep = ActionStep::new(ActionSpec::PressCombo(&[HidKeyCode::A]));
pub const KEY_B: ActionStep = ActionStep::new(ActionSpec::PressCombo(&[HidKeyCode::B]));
pub const KEY_C: ActionStep = ActionStep::new(ActionSpec::PressCombo(&[HidKeyCode::C]));
pub const KEY_D: ActionStep = ActionStep::new(ActionSpec::PressCombo(&[HidKeyCode::D]));
pub const KEY_E: ActionStep = ActionStep::new(ActionSpec::PressCombo(&[HidKeyCode::E]));
pub const SHIFT_DOWN: ActionStep = ActionStep::new(ActionSpec::PressDown(&[HidKeyCode::LShift]));
pub const SHIFT_UP: ActionStep = ActionStep::new(ActionSpec::PressUp(&[HidKeyCode::LShift]));

/// One call on [`RecordingOutput`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEvent {
    Press(HidKeyCode),
    Release(HidKeyCode),
    Type(char),
    Click(MouseButton),
    Move(i16, i16),
    Scroll(i8),
    ReleaseAll,
}

/// Records every output call, and the keys currently pressed.
///
/// `release_all` is recorded but does not clear `pressed`, so tests can tell
/// whether the engine released its keys itself.
#[derive(Debug, Default)]
pub struct RecordingOutput {
    pub events: Vec<OutputEvent>,
    pub pressed: Vec<HidKeyCode>,
}

impl RecordingOutput {
    /// Keys pressed so far, in order
    pub fn presses(&self) -> Vec<HidKeyCode> {
        self.events
            .iter()
            .filter_map(|e| match e {
                OutputEvent::Press(key) => Some(*key),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, event: OutputEvent) -> usize {
        self.events.iter().filter(|e| **e == event).count()
    }
}

impl MacroOutput for RecordingOutput {
    fn press(&mut self, key: HidKeyCode) {
        self.events.push(OutputEvent::Press(key));
        self.pressed.push(key);
    }

    fn release(&mut self, key: HidKeyCode) {
        self.events.push(OutputEvent::Release(key));
        if let Some(pos) = self.pressed.iter().position(|k| *k == key) {
            self.pressed.remove(pos);
        }
    }

    fn type_char(&mut self, c: char) {
        self.events.push(OutputEvent::Type(c));
    }

    fn mouse_click(&mut self, button: MouseButton) {
        self.events.push(OutputEvent::Click(button));
    }

    fn mouse_move(&mut self, dx: i16, dy: i16) {
        self.events.push(OutputEvent::Move(dx, dy));
    }

    fn mouse_scroll(&mut self, amount: i8) {
        self.events.push(OutputEvent::Scroll(amount));
    }

    fn release_all(&mut self) {
        self.events.push(OutputEvent::ReleaseAll);
    }
}

pub type TestScheduler<const Q: usize = QUEUE_CAPACITY> = Scheduler<RecordingOutput, SmallRng, Q>;

pub fn definition(name: &str, kind: MacroKind, steps: &[ActionStep]) -> MacroDefinition {
    MacroDefinition::new(name, kind, ActionTree::compile(steps).unwrap())
}

/// A profile with `definitions` on the given buttons and nothing elsewhere
pub fn profile(definitions: impl IntoIterator<Item = (usize, MacroDefinition)>) -> ProfileSlots {
    let mut slots = empty_slots();
    for (index, definition) in definitions {
        slots[index] = Some(definition);
    }
    slots
}

/// A scheduler with `slots` loaded and the output log cleared
pub fn create_scheduler<const Q: usize>(slots: ProfileSlots) -> TestScheduler<Q> {
    let mut scheduler = Scheduler::with_seed(RecordingOutput::default(), 0x5eed);
    scheduler.load_profile(slots);
    scheduler.output_mut().events.clear();
    scheduler
}

/// Run one tick at `t` ms and check the scheduler invariants
pub fn tick<R: RngCore, const Q: usize>(
    scheduler: &mut Scheduler<RecordingOutput, R, Q>,
    t: u64,
    events: &[InputEvent],
) {
    scheduler.tick(Instant::from_millis(t), events);
    if let Err(violation) = scheduler.check_invariants() {
        panic!("Invariant broken at {}ms: {:?}", t, violation);
    }
    assert_no_stray_keys(scheduler, t);
}

/// Every key down on the host belongs to the slot owner
pub fn assert_no_stray_keys<R: RngCore, const Q: usize>(scheduler: &Scheduler<RecordingOutput, R, Q>, t: u64) {
    let owner_keys = scheduler
        .slot()
        .and_then(|slot| scheduler.instance(slot as usize))
        .map(|instance| instance.exec().held_keys.clone())
        .unwrap_or_default();
    for key in scheduler.output().pressed.iter() {
        assert!(
            owner_keys.contains(key),
            "{:?} is down at {}ms but no running macro holds it",
            key,
            t
        );
    }
}

/// A button event scheduled at `time` ms
#[derive(Debug, Clone, Copy)]
pub struct TimedEvent {
    pub time: u64,
    pub event: InputEvent,
}

pub const fn at(time: u64, event: InputEvent) -> TimedEvent {
    TimedEvent { time, event }
}

/// Tick every millisecond from `start` to `end` inclusive, feeding `timeline`
/// to the ticks that match their time
pub fn run_timeline<const Q: usize>(scheduler: &mut TestScheduler<Q>, timeline: &[TimedEvent], start: u64, end: u64) {
    for t in start..=end {
        let events: Vec<InputEvent> = timeline.iter().filter(|e| e.time == t).map(|e| e.event).collect();
        tick(scheduler, t, &events);
    }
}

/// Statuses of the first `n` buttons
pub fn statuses<const Q: usize>(scheduler: &TestScheduler<Q>, n: usize) -> Vec<MacroStatus> {
    (0..n).map(|i| scheduler.status(i)).collect()
}
