//! Profile files as written by the user, before validation.
//!
//! ```json
//! {
//!   "name": "Coding",
//!   "buttons": [
//!     { "name": "Copy", "actions": [{ "type": "press", "keys": "CTRL+C" }] },
//!     null,
//!     { "name": "Farm", "type": "toggle", "wait": 5000,
//!       "actions": [{ "type": "mouse_click", "wait_random": { "min": 80, "max": 120 } }] }
//!   ]
//! }
//! ```
//!
//! Buttons can also be given as a `macros` table keyed by button index
//! (`"0"` to `"11"`), which reads better in TOML.
use std::collections::HashMap;

use config::{Value, ValueKind};
use padmacro_types::definition::ProfileSlots;
use serde_derive::Deserialize;
use serde_inline_default::serde_inline_default;

use crate::error::ConfigError;

#[derive(Clone, Debug, Deserialize)]
pub struct ProfileFile {
    pub name: String,
    /// One entry per button, `null` or `{}` for an unconfigured button
    #[serde(default)]
    pub buttons: Vec<Value>,
    #[serde(default)]
    pub macros: HashMap<String, Value>,
}

/// Whether a button entry leaves its button unconfigured
pub(crate) fn is_unconfigured(value: &Value) -> bool {
    match &value.kind {
        ValueKind::Nil => true,
        ValueKind::Table(table) => table.is_empty(),
        _ => false,
    }
}

#[serde_inline_default]
#[derive(Clone, Debug, Deserialize)]
pub struct RawMacro {
    #[serde(default)]
    pub name: Option<String>,
    /// `press`, `once`, `hold` or `toggle`
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Pause between two passes of a toggle macro, in ms
    #[serde_inline_default(0)]
    pub wait: u32,
    #[serde(default)]
    pub actions: Option<Vec<RawAction>>,
    /// Role name to `[r, g, b]`
    #[serde(default)]
    pub colors: HashMap<String, [u8; 3]>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawAction {
    #[serde(flatten)]
    pub operation: RawOperation,
    /// Fixed pause after the action, in ms
    #[serde(default)]
    pub wait: Option<u32>,
    #[serde(default)]
    pub wait_random: Option<RawRange>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawOperation {
    #[serde(alias = "combo")]
    Press { keys: RawKeys },
    PressDown { keys: RawKeys },
    PressUp { keys: RawKeys },
    #[serde(alias = "text")]
    Type { text: String },
    Wait { ms: u32 },
    WaitRandom { min: u32, max: u32 },
    #[serde(alias = "click")]
    MouseClick {
        #[serde(default)]
        button: Option<String>,
    },
    #[serde(alias = "move")]
    MouseMove { x: i16, y: i16 },
    #[serde(alias = "scroll")]
    MouseScroll { amount: i8 },
    Repeat { count: u32, actions: Vec<RawAction> },
}

/// Keys of a press action: `"CTRL+SHIFT+T"` or `["CTRL", "SHIFT", "T"]`
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RawKeys {
    Combo(String),
    List(Vec<String>),
}

impl RawKeys {
    pub fn names(&self) -> Vec<&str> {
        match self {
            RawKeys::Combo(combo) => combo.split('+').map(str::trim).collect(),
            RawKeys::List(names) => names.iter().map(|n| n.trim()).collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub struct RawRange {
    pub min: u32,
    pub max: u32,
}

/// A validated profile
#[derive(Clone, Debug)]
pub struct Profile {
    pub name: String,
    pub slots: ProfileSlots,
    /// Why buttons were dropped, one entry per dropped button
    pub errors: Vec<ConfigError>,
}

impl Profile {
    /// Number of configured buttons
    pub fn configured(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(RawKeys::Combo("Ctrl + Shift+T".to_string()).names(), ["Ctrl", "Shift", "T"]);
        assert_eq!(RawKeys::List(vec![" A ".to_string()]).names(), ["A"]);
        assert_eq!(RawKeys::Combo("CTRL+".to_string()).names(), ["CTRL", ""]);
    }

    #[test]
    fn test_unconfigured_entries() {
        assert!(is_unconfigured(&Value::new(None, ValueKind::Nil)));
        assert!(is_unconfigured(&Value::new(None, ValueKind::Table(Default::default()))));
        assert!(!is_unconfigured(&Value::new(None, ValueKind::I64(3))));
    }
}
