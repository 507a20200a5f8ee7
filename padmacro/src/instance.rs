//! Per-button macro state machine.
use embassy_time::Instant;
use padmacro_types::definition::{MacroDefinition, MacroKind};
use rand_core::RngCore;

use crate::executor::{ExecState, Executor, Step};
use crate::output::MacroOutput;
use crate::timer::Deadline;

/// Status of a macro instance
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacroStatus {
    #[default]
    Off,
    /// Holds the slot, ready to run its next action
    Active,
    /// Holds the slot, waiting for its action deadline
    Wait,
    /// Toggle between two passes
    Sleeping,
    /// Toggle waiting for the slot
    InQueue,
}

impl MacroStatus {
    /// Holds the slot
    pub fn is_running(self) -> bool {
        matches!(self, MacroStatus::Active | MacroStatus::Wait)
    }

    /// Whether the state machine allows `self -> next`
    pub fn can_become(self, next: MacroStatus) -> bool {
        use MacroStatus::*;
        match (self, next) {
            // Cancel, finish, emergency stop
            (_, Off) => true,
            (Off | InQueue, Active) => true,
            // Delay reached, or a hold macro looping
            (Active | Wait, Active) => true,
            (Active | Wait, Wait) => true,
            // Pass finished or preempted
            (Active | Wait, Sleeping) => true,
            (Off | Sleeping, InQueue) => true,
            _ => false,
        }
    }
}

/// Runtime state of the macro bound to one button
#[derive(Debug, Clone, Default)]
pub struct MacroInstance {
    definition: Option<MacroDefinition>,
    status: MacroStatus,
    exec: ExecState,
    cycle_deadline: Deadline,
    holds_slot: bool,
    button_held: bool,
}

impl MacroInstance {
    pub fn new(definition: Option<MacroDefinition>) -> Self {
        Self {
            definition,
            ..Default::default()
        }
    }

    pub fn definition(&self) -> Option<&MacroDefinition> {
        self.definition.as_ref()
    }

    pub fn kind(&self) -> Option<MacroKind> {
        self.definition.as_ref().map(|d| d.kind)
    }

    pub fn status(&self) -> MacroStatus {
        self.status
    }

    pub fn exec(&self) -> &ExecState {
        &self.exec
    }

    pub fn cycle_deadline(&self) -> &Deadline {
        &self.cycle_deadline
    }

    pub fn holds_slot(&self) -> bool {
        self.holds_slot
    }

    pub fn button_held(&self) -> bool {
        self.button_held
    }

    pub(crate) fn set_button_held(&mut self, held: bool) {
        self.button_held = held;
    }

    fn set_status(&mut self, next: MacroStatus) {
        if !self.status.can_become(next) {
            error!("Illegal macro transition {:?} -> {:?}", self.status, next);
        }
        self.status = next;
    }

    /// Take the slot and start at the first root action, `OFF/IN_QUEUE -> ACTIVE`
    pub(crate) fn start(&mut self) {
        let Some(definition) = self.definition.as_ref() else {
            return;
        };
        let root = definition.actions.root();
        self.exec.held_keys.clear();
        self.exec.rewind(root);
        self.cycle_deadline.clear();
        self.holds_slot = true;
        self.set_status(MacroStatus::Active);
    }

    /// Start the next pass of a hold macro without giving up the slot
    pub(crate) fn restart_pass(&mut self) {
        if let Some(definition) = self.definition.as_ref() {
            self.exec.rewind(definition.actions.root());
            self.set_status(MacroStatus::Active);
        }
    }

    /// Run the executor once and update `ACTIVE`/`WAIT` from its result
    pub(crate) fn advance<O: MacroOutput, R: RngCore>(&mut self, now: Instant, output: &mut O, rng: &mut R) -> Step {
        let Some(definition) = self.definition.as_ref() else {
            return Step::Finished;
        };
        let step = Executor::new(output, rng).advance(&definition.actions, &mut self.exec, now);
        if step == Step::Progressed {
            if self.exec.action_deadline.is_pending(now) {
                self.set_status(MacroStatus::Wait);
            } else {
                self.set_status(MacroStatus::Active);
            }
        }
        step
    }

    /// Give up the slot until `wake_at`, `ACTIVE/WAIT -> SLEEPING`
    pub(crate) fn sleep<O: MacroOutput>(&mut self, wake_at: Instant, output: &mut O) {
        self.exec.stop(output);
        self.cycle_deadline.at(wake_at);
        self.holds_slot = false;
        self.set_status(MacroStatus::Sleeping);
    }

    /// Waiting for the slot, `OFF/SLEEPING -> IN_QUEUE`
    pub(crate) fn enqueue(&mut self) {
        self.cycle_deadline.clear();
        self.set_status(MacroStatus::InQueue);
    }

    /// Stop from any state: keys released, cursor and deadlines cleared
    pub(crate) fn stop<O: MacroOutput>(&mut self, output: &mut O) {
        self.exec.stop(output);
        self.cycle_deadline.clear();
        self.holds_slot = false;
        self.set_status(MacroStatus::Off);
    }
}
