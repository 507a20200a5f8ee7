//! Status snapshot consumed by lights and displays.
use heapless::Vec;
use padmacro_types::NUM_BUTTONS;
use padmacro_types::definition::{MacroKind, MacroName};

use crate::instance::MacroStatus;
use crate::scheduler::Alert;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonStatus {
    pub status: MacroStatus,
    /// `None` when the button has no macro
    pub kind: Option<MacroKind>,
    pub name: Option<MacroName>,
    /// Time left before a sleeping toggle wakes up, or before a waiting macro
    /// runs its next action
    pub remaining_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QueueEntry {
    /// 0 is the next macro to run
    pub position: usize,
    pub button: u8,
    pub name: MacroName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusSnapshot {
    pub buttons: [ButtonStatus; NUM_BUTTONS],
    /// Queue contents, front first
    pub queue: Vec<QueueEntry, NUM_BUTTONS>,
    /// Number of sleeping toggles
    pub sleeping: usize,
    /// Button holding the execution slot
    pub slot: Option<u8>,
    pub alert: Option<Alert>,
}

impl StatusSnapshot {
    /// The button holding the slot and its status
    pub fn running(&self) -> Option<(u8, &ButtonStatus)> {
        let slot = self.slot?;
        self.buttons.get(slot as usize).map(|b| (slot, b))
    }

    /// Buttons whose status differs from `previous`
    pub fn changed_since<'a>(&'a self, previous: &'a StatusSnapshot) -> impl Iterator<Item = usize> + 'a {
        (0..NUM_BUTTONS).filter(move |&i| self.buttons[i].status != previous.buttons[i].status)
    }
}
