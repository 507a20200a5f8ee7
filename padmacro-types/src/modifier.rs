//! The modifier byte of a HID keyboard report.
use core::ops::{BitOr, BitOrAssign};

use bitfield_struct::bitfield;

use crate::keycode::HidKeyCode;

/// Modifier bits in HID report order.
///
/// | bit7 | bit6 | bit5 | bit4 | bit3 | bit2 | bit1 | bit0 |
/// | --- | --- | --- | --- | --- | --- | --- | --- |
/// | RGUI | RALT | RSHIFT | RCTRL | LGUI | LALT | LSHIFT | LCTRL |
#[bitfield(u8, order = Lsb, defmt = cfg(feature = "defmt"))]
#[derive(Eq, PartialEq)]
pub struct HidModifiers {
    #[bits(1)]
    pub left_ctrl: bool,
    #[bits(1)]
    pub left_shift: bool,
    #[bits(1)]
    pub left_alt: bool,
    #[bits(1)]
    pub left_gui: bool,
    #[bits(1)]
    pub right_ctrl: bool,
    #[bits(1)]
    pub right_shift: bool,
    #[bits(1)]
    pub right_alt: bool,
    #[bits(1)]
    pub right_gui: bool,
}

impl BitOr for HidModifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.into_bits() | rhs.into_bits())
    }
}

impl BitOrAssign for HidModifiers {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

impl HidModifiers {
    pub const LSHIFT: Self = Self::new().with_left_shift(true);

    /// The bit of a modifier key, empty for every other key
    pub fn from_keycode(key: HidKeyCode) -> Self {
        if key.is_modifier() {
            Self::from_bits(1 << (key as u8 - HidKeyCode::LCtrl as u8))
        } else {
            Self::new()
        }
    }

    /// Clear the bits set in `other`
    pub fn without(self, other: Self) -> Self {
        Self::from_bits(self.into_bits() & !other.into_bits())
    }
}
