//! Turning macro output into HID reports.
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Sender, TrySendError};
use padmacro_types::keycode::{HidKeyCode, from_ascii};
use padmacro_types::modifier::HidModifiers;
use padmacro_types::mouse_button::MouseButton;
use serde::Serialize;
use usbd_hid::descriptor::AsInputReport;

use crate::descriptor::{KeyboardReport, MouseReport};
use crate::output::MacroOutput;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Report {
    /// Normal keyboard hid report
    KeyboardReport(KeyboardReport),
    /// Mouse hid report
    MouseReport(MouseReport),
}

impl AsInputReport for Report {}

/// [`MacroOutput`] that keeps the current keyboard report and sends a new
/// report to the channel on every change.
///
/// Reports are sent with `try_send`: when the channel is full the report is
/// dropped and a warning is logged, the macro engine never waits for the host.
pub struct ReportOutput<'a, M: RawMutex, const N: usize> {
    sender: Sender<'a, M, Report, N>,
    keyboard: KeyboardReport,
}

impl<'a, M: RawMutex, const N: usize> ReportOutput<'a, M, N> {
    pub fn new(sender: Sender<'a, M, Report, N>) -> Self {
        Self {
            sender,
            keyboard: KeyboardReport::default(),
        }
    }

    /// The keyboard report as last sent
    pub fn keyboard_report(&self) -> &KeyboardReport {
        &self.keyboard
    }

    fn modifiers(&self) -> HidModifiers {
        HidModifiers::from_bits(self.keyboard.modifier)
    }

    fn send(&mut self, report: Report) {
        if let Err(TrySendError::Full(report)) = self.sender.try_send(report) {
            warn!("Report channel full, dropping {:?}", report);
        }
    }

    fn send_keyboard(&mut self) {
        let report = Report::KeyboardReport(self.keyboard);
        self.send(report);
    }

    fn send_mouse(&mut self, buttons: u8, x: i8, y: i8, wheel: i8) {
        self.send(Report::MouseReport(MouseReport {
            buttons,
            x,
            y,
            wheel,
            pan: 0,
        }));
    }

    /// Put a non-modifier key in the first free slot of the 6KRO report
    fn add_key(&mut self, key: HidKeyCode) -> bool {
        let code = key as u8;
        if self.keyboard.keycodes.contains(&code) {
            return true;
        }
        match self.keyboard.keycodes.iter_mut().find(|k| **k == 0) {
            Some(slot) => {
                *slot = code;
                true
            }
            None => {
                warn!("Keyboard report full, {:?} is not sent", key);
                false
            }
        }
    }

    fn remove_key(&mut self, key: HidKeyCode) {
        let code = key as u8;
        for slot in self.keyboard.keycodes.iter_mut().filter(|k| **k == code) {
            *slot = 0;
        }
    }
}

impl<M: RawMutex, const N: usize> MacroOutput for ReportOutput<'_, M, N> {
    fn press(&mut self, key: HidKeyCode) {
        if key.is_modifier() {
            self.keyboard.modifier = (self.modifiers() | HidModifiers::from_keycode(key)).into_bits();
        } else if !self.add_key(key) {
            return;
        }
        self.send_keyboard();
    }

    fn release(&mut self, key: HidKeyCode) {
        if key.is_modifier() {
            self.keyboard.modifier = self.modifiers().without(HidModifiers::from_keycode(key)).into_bits();
        } else {
            self.remove_key(key);
        }
        self.send_keyboard();
    }

    fn type_char(&mut self, c: char) {
        let Some((key, shifted)) = u8::try_from(c).ok().and_then(from_ascii) else {
            warn!("Cannot type {:?}, no key for it", c);
            return;
        };
        let code = key as u8;
        let held_at = self.keyboard.keycodes.iter().position(|k| *k == code);
        if let Some(slot) = held_at {
            // Typing a held key needs a release edge first
            self.keyboard.keycodes[slot] = 0;
            self.send_keyboard();
        }
        let modifier = self.keyboard.modifier;
        if shifted {
            self.keyboard.modifier = (self.modifiers() | HidModifiers::LSHIFT).into_bits();
        }
        match held_at {
            Some(slot) => self.keyboard.keycodes[slot] = code,
            None => {
                if !self.add_key(key) {
                    self.keyboard.modifier = modifier;
                    return;
                }
            }
        }
        self.send_keyboard();
        // A key held before typing stays in its slot
        if held_at.is_none() {
            self.remove_key(key);
        }
        self.keyboard.modifier = modifier;
        self.send_keyboard();
    }

    fn mouse_click(&mut self, button: MouseButton) {
        self.send_mouse(button.mask().into_bits(), 0, 0, 0);
        self.send_mouse(0, 0, 0, 0);
    }

    fn mouse_move(&mut self, dx: i16, dy: i16) {
        // A report carries at most 127 counts per axis
        let (mut dx, mut dy) = (dx, dy);
        while dx != 0 || dy != 0 {
            let x = dx.clamp(-127, 127);
            let y = dy.clamp(-127, 127);
            self.send_mouse(0, x as i8, y as i8, 0);
            dx -= x;
            dy -= y;
        }
    }

    fn mouse_scroll(&mut self, amount: i8) {
        if amount != 0 {
            self.send_mouse(0, 0, 0, amount);
        }
    }

    fn release_all(&mut self) {
        self.keyboard = KeyboardReport::default();
        self.send_keyboard();
        self.send_mouse(0, 0, 0, 0);
    }
}
