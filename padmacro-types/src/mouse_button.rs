//! Mouse buttons a macro can click, and the button byte of a mouse report.
use bitfield_struct::bitfield;
use serde::{Deserialize, Serialize};

/// Button byte of a HID mouse report
#[bitfield(u8, order = Lsb, defmt = cfg(feature = "defmt"))]
#[derive(Eq, PartialEq)]
pub struct MouseButtons {
    #[bits(1)]
    pub left: bool,
    #[bits(1)]
    pub right: bool,
    #[bits(1)]
    pub middle: bool,
    #[bits(5)]
    _reserved: u8,
}

/// A clickable mouse button
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

impl MouseButton {
    /// Parse `left`, `right` or `middle`, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("left") {
            Some(Self::Left)
        } else if name.eq_ignore_ascii_case("right") {
            Some(Self::Right)
        } else if name.eq_ignore_ascii_case("middle") {
            Some(Self::Middle)
        } else {
            None
        }
    }

    /// Report bits for this button alone
    pub const fn mask(self) -> MouseButtons {
        match self {
            MouseButton::Left => MouseButtons::new().with_left(true),
            MouseButton::Right => MouseButtons::new().with_right(true),
            MouseButton::Middle => MouseButtons::new().with_middle(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_mask() {
        assert_eq!(MouseButton::Left.mask().into_bits(), 0b001);
        assert_eq!(MouseButton::Right.mask().into_bits(), 0b010);
        assert_eq!(MouseButton::Middle.mask().into_bits(), 0b100);
    }

    #[test]
    fn test_button_name() {
        assert_eq!(MouseButton::from_name("Middle"), Some(MouseButton::Middle));
        assert_eq!(MouseButton::from_name("back"), None);
    }
}
