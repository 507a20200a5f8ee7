//! Slot and queue manager.
//!
//! The [`Scheduler`] owns all macro instances, the single execution slot and
//! the FIFO queue. Nothing else mutates the slot or the queue: instances only
//! change their own status when the scheduler asks them to.
//!
//! Each [`Scheduler::tick`] runs four phases in order:
//!
//! 1. apply input events in arrival order,
//! 2. advance the slot occupant once,
//! 3. move sleeping toggles whose cycle deadline passed into the queue,
//! 4. if the slot is free, hand it to the front of the queue.
//!
//! Input-driven transitions therefore always win over timer-driven ones that
//! fall on the same tick.
use embassy_time::{Duration, Instant};
use padmacro_types::NUM_BUTTONS;
use padmacro_types::color::{Palette, Rgb};
use padmacro_types::definition::{MacroKind, ProfileSlots};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand_core::RngCore;

use crate::event::{Edge, InputEvent};
use crate::executor::Step;
use crate::indicator::button_color;
use crate::instance::{MacroInstance, MacroStatus};
use crate::output::MacroOutput;
use crate::queue::{ExecutionQueue, QueueFull};
use crate::snapshot::{ButtonStatus, QueueEntry, StatusSnapshot};
use crate::{EMERGENCY_ALERT_MS, OVERFLOW_ALERT_MS, QUEUE_CAPACITY};

/// Why everything was stopped
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertReason {
    EmergencyStop,
    QueueOverflow,
}

/// Alert shown on the pad after an emergency stop
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Alert {
    pub reason: AlertReason,
    pub until: Instant,
}

impl Alert {
    pub fn is_active(&self, now: Instant) -> bool {
        now < self.until
    }
}

/// A broken scheduler invariant, reported by [`Scheduler::check_invariants`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InvariantViolation {
    /// The slot owner is not ACTIVE or WAIT, or doesn't know it holds the slot
    SlotOwnerNotRunning(u8),
    /// An instance other than the slot owner claims the slot or runs
    StraySlotHolder(u8),
    DuplicateQueueEntry(u8),
    /// A queue entry whose instance is not IN_QUEUE
    QueueEntryNotQueued(u8),
    /// An IN_QUEUE instance that is not in the queue
    MissingFromQueue(u8),
    /// An OFF instance with held keys, a cursor or a deadline
    OffWithState(u8),
    /// Keys held by an instance without the slot
    HeldKeysWithoutSlot(u8),
    SleepingWithoutDeadline(u8),
}

/// Arbiter of the execution slot among the macros of the active profile
pub struct Scheduler<O: MacroOutput, R: RngCore = SmallRng, const Q: usize = QUEUE_CAPACITY> {
    instances: [MacroInstance; NUM_BUTTONS],
    slot: Option<u8>,
    queue: ExecutionQueue<u8, Q>,
    output: O,
    rng: R,
    alert: Option<Alert>,
}

impl<O: MacroOutput, const Q: usize> Scheduler<O, SmallRng, Q> {
    /// Create a scheduler whose random waits are drawn from a seeded `SmallRng`
    pub fn with_seed(output: O, seed: u64) -> Self {
        Self::new(output, SmallRng::seed_from_u64(seed))
    }
}

impl<O: MacroOutput, R: RngCore, const Q: usize> Scheduler<O, R, Q> {
    pub fn new(output: O, rng: R) -> Self {
        Self {
            instances: core::array::from_fn(|_| MacroInstance::default()),
            slot: None,
            queue: ExecutionQueue::new(),
            output,
            rng,
            alert: None,
        }
    }

    /// Replace all definitions. Every instance restarts from OFF.
    pub fn load_profile(&mut self, definitions: ProfileSlots) {
        self.stop_all();
        let mut configured = 0;
        for (index, (instance, definition)) in self.instances.iter_mut().zip(definitions).enumerate() {
            let definition = definition.map(|mut d| {
                d.id = index as u8;
                d
            });
            configured += definition.is_some() as usize;
            *instance = MacroInstance::new(definition);
        }
        info!("Profile loaded with {} macros", configured);
    }

    /// Run one scheduling round at `now`
    pub fn tick(&mut self, now: Instant, events: &[InputEvent]) {
        let mut granted = false;
        for event in events {
            granted |= self.handle_event(now, *event);
        }

        self.advance_slot(now);
        self.wake_sleepers(now);

        // At most one grant per tick
        if !granted {
            self.grant_from_queue();
        }

        if self.alert.is_some_and(|alert| !alert.is_active(now)) {
            self.alert = None;
        }
    }

    /// Stop every macro, release everything and clear the slot and the queue
    pub fn emergency_stop(&mut self, now: Instant, reason: AlertReason) {
        warn!("Emergency stop: {:?}", reason);
        self.stop_all();
        let ms = match reason {
            AlertReason::EmergencyStop => EMERGENCY_ALERT_MS,
            AlertReason::QueueOverflow => OVERFLOW_ALERT_MS,
        };
        self.alert = Some(Alert {
            reason,
            until: now + Duration::from_millis(ms),
        });
    }

    /// Returns `true` if the event granted the slot
    fn handle_event(&mut self, now: Instant, event: InputEvent) -> bool {
        match event {
            InputEvent::Button { index, edge } => {
                let i = index as usize;
                if i >= NUM_BUTTONS {
                    warn!("Button index {} out of range", index);
                    return false;
                }
                let Some(kind) = self.instances[i].kind() else {
                    debug!("No macro on button {}", index);
                    return false;
                };
                match edge {
                    Edge::Down => {
                        self.instances[i].set_button_held(true);
                        self.button_down(i, kind, now)
                    }
                    Edge::Up => {
                        self.instances[i].set_button_held(false);
                        if kind == MacroKind::Hold && self.instances[i].status() != MacroStatus::Off {
                            debug!("Hold macro {} released", index);
                            self.cancel(i);
                        }
                        false
                    }
                }
            }
            InputEvent::EmergencyStop => {
                self.emergency_stop(now, AlertReason::EmergencyStop);
                false
            }
            InputEvent::Rotate(steps) => {
                debug!("Ignoring encoder rotation {}, profiles are switched by the runner", steps);
                false
            }
        }
    }

    fn button_down(&mut self, index: usize, kind: MacroKind, now: Instant) -> bool {
        match kind {
            MacroKind::Press | MacroKind::Hold => {
                if let Some(occupant) = self.slot {
                    self.preempt(occupant as usize, now);
                }
                self.grant(index);
                true
            }
            MacroKind::Toggle => {
                if self.instances[index].status() != MacroStatus::Off {
                    debug!("Toggle macro {} cancelled", index);
                    self.cancel(index);
                    false
                } else if self.slot.is_none() && self.queue.is_empty() {
                    self.grant(index);
                    true
                } else {
                    self.enqueue(index, now);
                    false
                }
            }
        }
    }

    /// Take the slot away from its occupant
    fn preempt(&mut self, index: usize, now: Instant) {
        let instance = &mut self.instances[index];
        if instance.kind() == Some(MacroKind::Toggle) {
            // Eligible again right away, restarting from the first action
            debug!("Toggle macro {} preempted", index);
            instance.sleep(now, &mut self.output);
        } else {
            debug!("Macro {} preempted", index);
            instance.stop(&mut self.output);
        }
        self.slot = None;
    }

    fn grant(&mut self, index: usize) {
        debug!("Macro {} takes the slot", index);
        self.instances[index].start();
        self.slot = Some(index as u8);
    }

    /// Any state to OFF, leaving the queue and the slot
    fn cancel(&mut self, index: usize) {
        if self.instances[index].status() == MacroStatus::InQueue {
            self.queue.remove(index as u8);
        }
        if self.slot == Some(index as u8) {
            self.slot = None;
        }
        self.instances[index].stop(&mut self.output);
    }

    fn enqueue(&mut self, index: usize, now: Instant) {
        match self.queue.push(index as u8) {
            Ok(_) => self.instances[index].enqueue(),
            Err(QueueFull) => {
                error!("Execution queue overflow while queueing macro {}", index);
                self.emergency_stop(now, AlertReason::QueueOverflow);
            }
        }
    }

    fn advance_slot(&mut self, now: Instant) {
        let Some(occupant) = self.slot else {
            return;
        };
        let index = occupant as usize;
        let instance = &mut self.instances[index];
        if instance.advance(now, &mut self.output, &mut self.rng) != Step::Finished {
            return;
        }

        match instance.kind() {
            Some(MacroKind::Hold) if instance.button_held() => instance.restart_pass(),
            Some(MacroKind::Toggle) => {
                let cycle_wait = instance.definition().map_or(0, |d| d.cycle_wait_ms);
                debug!("Toggle macro {} sleeps for {}ms", index, cycle_wait);
                instance.sleep(now + Duration::from_millis(cycle_wait as u64), &mut self.output);
                self.slot = None;
            }
            _ => {
                debug!("Macro {} finished", index);
                instance.stop(&mut self.output);
                self.slot = None;
            }
        }
    }

    fn wake_sleepers(&mut self, now: Instant) {
        for index in 0..NUM_BUTTONS {
            let instance = &self.instances[index];
            if instance.status() == MacroStatus::Sleeping && instance.cycle_deadline().is_expired(now) {
                self.enqueue(index, now);
            }
        }
    }

    fn grant_from_queue(&mut self) {
        if self.slot.is_some() {
            return;
        }
        while let Some(entry) = self.queue.pop_front() {
            let index = entry as usize;
            if self.instances.get(index).map(|i| i.status()) == Some(MacroStatus::InQueue) {
                self.grant(index);
                return;
            }
            warn!("Dropping stale queue entry {}", entry);
        }
    }

    fn stop_all(&mut self) {
        for instance in self.instances.iter_mut() {
            instance.stop(&mut self.output);
            instance.set_button_held(false);
        }
        self.output.release_all();
        self.queue.clear();
        self.slot = None;
    }

    pub fn instance(&self, index: usize) -> Option<&MacroInstance> {
        self.instances.get(index)
    }

    /// Status of a button, OFF for indexes out of range
    pub fn status(&self, index: usize) -> MacroStatus {
        self.instances.get(index).map_or(MacroStatus::Off, |i| i.status())
    }

    /// Index of the instance holding the slot
    pub fn slot(&self) -> Option<u8> {
        self.slot
    }

    pub fn queue(&self) -> &ExecutionQueue<u8, Q> {
        &self.queue
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    pub fn alert(&self, now: Instant) -> Option<Alert> {
        self.alert.filter(|alert| alert.is_active(now))
    }

    pub fn sleeping_count(&self) -> usize {
        self.instances
            .iter()
            .filter(|i| i.status() == MacroStatus::Sleeping)
            .count()
    }

    /// Status of every button and of the queue, for lights and displays
    pub fn snapshot(&self, now: Instant) -> StatusSnapshot {
        let buttons = core::array::from_fn(|index| {
            let instance = &self.instances[index];
            let remaining_ms = match instance.status() {
                MacroStatus::Sleeping => instance.cycle_deadline().remaining_ms(now),
                MacroStatus::Wait => instance.exec().action_deadline.remaining_ms(now),
                _ => None,
            };
            ButtonStatus {
                status: instance.status(),
                kind: instance.kind(),
                name: instance.definition().map(|d| d.name.clone()),
                remaining_ms,
            }
        });

        let mut queue: heapless::Vec<QueueEntry, NUM_BUTTONS> = heapless::Vec::new();
        for (position, entry) in self.queue.iter().enumerate() {
            let name = self
                .instances
                .get(*entry as usize)
                .and_then(|i| i.definition())
                .map(|d| d.name.clone())
                .unwrap_or_default();
            let queued = QueueEntry {
                position,
                button: *entry,
                name,
            };
            if queue.push(queued).is_err() {
                break;
            }
        }

        StatusSnapshot {
            buttons,
            queue,
            sleeping: self.sleeping_count(),
            slot: self.slot,
            alert: self.alert(now),
        }
    }

    /// Light color of every button
    pub fn indicator_colors(&self, now: Instant, palette: &Palette) -> [Rgb; NUM_BUTTONS] {
        if self.alert(now).is_some() {
            return [palette.alert; NUM_BUTTONS];
        }
        core::array::from_fn(|index| button_color(&self.instances[index], palette))
    }

    /// Verify the slot and queue invariants
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if let Some(owner) = self.slot {
            let running = self
                .instances
                .get(owner as usize)
                .is_some_and(|i| i.holds_slot() && i.status().is_running());
            if !running {
                return Err(InvariantViolation::SlotOwnerNotRunning(owner));
            }
        }

        for (index, instance) in self.instances.iter().enumerate() {
            let id = index as u8;
            let is_owner = self.slot == Some(id);
            if !is_owner && (instance.holds_slot() || instance.status().is_running()) {
                return Err(InvariantViolation::StraySlotHolder(id));
            }
            if !instance.holds_slot() && !instance.exec().held_keys.is_empty() {
                return Err(InvariantViolation::HeldKeysWithoutSlot(id));
            }
            match instance.status() {
                MacroStatus::Off => {
                    let exec = instance.exec();
                    if !exec.held_keys.is_empty()
                        || !exec.cursor.is_idle()
                        || exec.action_deadline.is_set()
                        || instance.cycle_deadline().is_set()
                    {
                        return Err(InvariantViolation::OffWithState(id));
                    }
                }
                MacroStatus::InQueue if !self.queue.contains(id) => {
                    return Err(InvariantViolation::MissingFromQueue(id));
                }
                MacroStatus::Sleeping if !instance.cycle_deadline().is_set() => {
                    return Err(InvariantViolation::SleepingWithoutDeadline(id));
                }
                _ => {}
            }
        }

        for (position, entry) in self.queue.iter().enumerate() {
            if self.queue.iter().skip(position + 1).any(|e| e == entry) {
                return Err(InvariantViolation::DuplicateQueueEntry(*entry));
            }
            if self.status(*entry as usize) != MacroStatus::InQueue {
                return Err(InvariantViolation::QueueEntryNotQueued(*entry));
            }
        }
        Ok(())
    }
}
