//! Channels connecting the pad's input tasks, the macro processor and the USB writer

use embassy_sync::channel::Channel;
pub use embassy_sync::{blocking_mutex, channel};

use crate::event::InputEvent;
use crate::hid::Report;
use crate::{EVENT_CHANNEL_SIZE, REPORT_CHANNEL_SIZE, RawMutex};

/// Button and encoder events, read by [`crate::processor::MacroProcessor`]
pub static INPUT_EVENT_CHANNEL: Channel<RawMutex, InputEvent, EVENT_CHANNEL_SIZE> = Channel::new();
/// HID reports written by [`crate::hid::ReportOutput`]
pub static REPORT_CHANNEL: Channel<RawMutex, Report, REPORT_CHANNEL_SIZE> = Channel::new();
