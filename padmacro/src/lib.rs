//! # padmacro
//!
//! Execution core of a 12-button macro pad.
//!
//! Every button may carry a macro: a tree of key, text, mouse and wait
//! actions. The [`scheduler::Scheduler`] decides on each tick which macro owns
//! the single execution slot, how `press` and `hold` macros preempt `toggle`
//! macros, and how waiting toggles line up in a FIFO queue. Output goes through
//! the [`output::MacroOutput`] trait, [`hid::ReportOutput`] turns it into USB HID
//! reports. [`processor::MacroProcessor`] is the async task that feeds input
//! events to the scheduler.
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
#![no_std]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod channel;
pub mod descriptor;
pub mod event;
pub mod executor;
pub mod hid;
pub mod indicator;
pub mod instance;
pub mod output;
pub mod processor;
pub mod queue;
pub mod scheduler;
pub mod snapshot;
pub mod timer;

pub use padmacro_types as types;
pub use padmacro_types::NUM_BUTTONS;

/// Raw mutex used by the static channels
pub type RawMutex = embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

/// Capacity of the execution queue
pub const QUEUE_CAPACITY: usize = 1000;

/// Maximum number of keys a macro can hold down at the same time
pub const MAX_HELD_KEYS: usize = 16;

/// Capacity of the input event channel
pub const EVENT_CHANNEL_SIZE: usize = 16;

/// Capacity of the HID report channel
pub const REPORT_CHANNEL_SIZE: usize = 32;

/// How long the pad shows an alert after an emergency stop
pub const EMERGENCY_ALERT_MS: u64 = 1500;

/// How long the pad shows an alert after a queue overflow
pub const OVERFLOW_ALERT_MS: u64 = 3000;
