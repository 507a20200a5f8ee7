//! The async task that feeds input events to the scheduler.
//!
//! [`MacroProcessor`] drains the input event channel, applies encoder rotation
//! through a [`ProfileSource`] and runs one [`Scheduler::tick`] per batch. In
//! firmware it is driven by [`Runnable::run`], which wakes on every event and
//! at least once per poll interval. Hosts with their own clock call
//! [`MacroProcessor::poll`] directly.
use embassy_futures::select::{Either, select};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Receiver;
use embassy_time::{Duration, Instant, Timer};
use heapless::Vec;
use padmacro_types::definition::ProfileSlots;
use rand_core::RngCore;

use crate::event::InputEvent;
use crate::output::MacroOutput;
use crate::scheduler::Scheduler;

/// Default time between two scheduler ticks when no event arrives
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// A long running task
#[allow(async_fn_in_trait)]
pub trait Runnable {
    async fn run(&mut self) -> !;
}

/// Where the definitions of the next profile come from when the encoder rotates
pub trait ProfileSource {
    /// Move `step` profiles forward, or backward if negative.
    ///
    /// Returns the definitions to load, `None` keeps the current profile.
    fn rotate(&mut self, step: i8) -> Option<ProfileSlots>;
}

/// A pad with a single, fixed profile
pub struct NoProfiles;

impl ProfileSource for NoProfiles {
    fn rotate(&mut self, step: i8) -> Option<ProfileSlots> {
        debug!("No profile to rotate to, ignoring {}", step);
        None
    }
}

pub struct MacroProcessor<'a, O: MacroOutput, R: RngCore, P: ProfileSource, M: RawMutex, const N: usize, const Q: usize> {
    scheduler: Scheduler<O, R, Q>,
    profiles: P,
    events: Receiver<'a, M, InputEvent, N>,
    poll_interval: Duration,
}

impl<'a, O: MacroOutput, R: RngCore, P: ProfileSource, M: RawMutex, const N: usize, const Q: usize>
    MacroProcessor<'a, O, R, P, M, N, Q>
{
    pub fn new(scheduler: Scheduler<O, R, Q>, profiles: P, events: Receiver<'a, M, InputEvent, N>) -> Self {
        Self {
            scheduler,
            profiles,
            events,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn scheduler(&self) -> &Scheduler<O, R, Q> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler<O, R, Q> {
        &mut self.scheduler
    }

    pub fn profiles(&self) -> &P {
        &self.profiles
    }

    /// Drain the pending events and run one scheduler tick at `now`
    pub fn poll(&mut self, now: Instant) {
        self.poll_with(None, now);
    }

    /// Like [`Self::poll`], with `first` handled before the pending events
    pub fn poll_with(&mut self, first: Option<InputEvent>, now: Instant) {
        let mut batch: Vec<InputEvent, N> = Vec::new();
        let mut next = first;
        while !batch.is_full() {
            let event = match next.take() {
                Some(event) => event,
                None => match self.events.try_receive() {
                    Ok(event) => event,
                    Err(_) => break,
                },
            };
            match event {
                InputEvent::Rotate(step) => {
                    if let Some(definitions) = self.profiles.rotate(step) {
                        // Earlier events belong to the previous profile
                        batch.clear();
                        self.scheduler.load_profile(definitions);
                    }
                }
                _ => {
                    // Capacity checked by the loop condition
                    let _ = batch.push(event);
                }
            }
        }
        self.scheduler.tick(now, &batch);
    }
}

impl<O: MacroOutput, R: RngCore, P: ProfileSource, M: RawMutex, const N: usize, const Q: usize> Runnable
    for MacroProcessor<'_, O, R, P, M, N, Q>
{
    async fn run(&mut self) -> ! {
        loop {
            let first = match select(Timer::after(self.poll_interval), self.events.receive()).await {
                Either::First(_) => None,
                Either::Second(event) => Some(event),
            };
            self.poll_with(first, Instant::now());
        }
    }
}
