//! The boundary between the engine and whatever emits input to the host.
use padmacro_types::keycode::HidKeyCode;
use padmacro_types::mouse_button::MouseButton;

/// Sink for the input a macro produces.
///
/// Calls are fire-and-forget: they must not block and cannot fail from the
/// engine's point of view.
pub trait MacroOutput {
    fn press(&mut self, key: HidKeyCode);

    fn release(&mut self, key: HidKeyCode);

    /// Type one character, press and release included
    fn type_char(&mut self, c: char);

    fn mouse_click(&mut self, button: MouseButton);

    fn mouse_move(&mut self, dx: i16, dy: i16);

    fn mouse_scroll(&mut self, amount: i8);

    /// Release every key and button, whoever pressed it
    fn release_all(&mut self);
}

impl<T: MacroOutput + ?Sized> MacroOutput for &mut T {
    fn press(&mut self, key: HidKeyCode) {
        (**self).press(key)
    }

    fn release(&mut self, key: HidKeyCode) {
        (**self).release(key)
    }

    fn type_char(&mut self, c: char) {
        (**self).type_char(c)
    }

    fn mouse_click(&mut self, button: MouseButton) {
        (**self).mouse_click(button)
    }

    fn mouse_move(&mut self, dx: i16, dy: i16) {
        (**self).mouse_move(dx, dy)
    }

    fn mouse_scroll(&mut self, amount: i8) {
        (**self).mouse_scroll(amount)
    }

    fn release_all(&mut self) {
        (**self).release_all()
    }
}
