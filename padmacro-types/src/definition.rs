//! Macro definitions, one per configured button.
use heapless::String;

use crate::NUM_BUTTONS;
use crate::MAX_NAME_LEN;
use crate::action::ActionTree;
use crate::color::ColorOverrides;

pub type MacroName = String<MAX_NAME_LEN>;

/// How a macro reacts to its button
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacroKind {
    /// Run the action list once per button-down
    #[default]
    Press,
    /// Loop the action list while the button is held
    Hold,
    /// Loop the action list with `cycle_wait_ms` between passes, until pressed again
    Toggle,
}

impl MacroKind {
    /// Parse the profile name of a macro kind, `once` is an alias of `press`
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            n if n.eq_ignore_ascii_case("press") || n.eq_ignore_ascii_case("once") => Some(MacroKind::Press),
            n if n.eq_ignore_ascii_case("hold") => Some(MacroKind::Hold),
            n if n.eq_ignore_ascii_case("toggle") => Some(MacroKind::Toggle),
            _ => None,
        }
    }
}

/// Immutable definition of a macro
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDefinition {
    /// Unique in the active profile, the loader uses the button index
    pub id: u8,
    pub name: MacroName,
    pub kind: MacroKind,
    /// Pause between two passes of a toggle macro
    pub cycle_wait_ms: u32,
    pub actions: ActionTree,
    pub colors: ColorOverrides,
}

impl MacroDefinition {
    /// Create a definition, a name longer than `MAX_NAME_LEN` bytes is truncated
    pub fn new(name: &str, kind: MacroKind, actions: ActionTree) -> Self {
        Self {
            id: 0,
            name: truncate_name(name),
            kind,
            cycle_wait_ms: 0,
            actions,
            colors: ColorOverrides::default(),
        }
    }

    pub fn with_cycle_wait(mut self, cycle_wait_ms: u32) -> Self {
        self.cycle_wait_ms = cycle_wait_ms;
        self
    }

    pub fn with_colors(mut self, colors: ColorOverrides) -> Self {
        self.colors = colors;
        self
    }
}

/// Definitions of all buttons of a profile, `None` for unconfigured buttons
pub type ProfileSlots = [Option<MacroDefinition>; NUM_BUTTONS];

pub fn empty_slots() -> ProfileSlots {
    core::array::from_fn(|_| None)
}

fn truncate_name(name: &str) -> MacroName {
    let mut truncated = MacroName::new();
    for c in name.chars() {
        if truncated.push(c).is_err() {
            break;
        }
    }
    truncated
}
