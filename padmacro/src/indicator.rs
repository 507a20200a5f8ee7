//! Button light colors.
use padmacro_types::color::{ColorRole, Palette, Rgb};

use crate::instance::{MacroInstance, MacroStatus};

/// What a button's light should show
pub fn color_role(instance: &MacroInstance) -> ColorRole {
    if instance.definition().is_none() {
        return ColorRole::Off;
    }
    match instance.status() {
        MacroStatus::Off => ColorRole::Ready,
        MacroStatus::Active | MacroStatus::Wait => ColorRole::Running,
        MacroStatus::Sleeping => ColorRole::Sleeping,
        MacroStatus::InQueue => ColorRole::Queued,
    }
}

/// Color of a button, the macro's own overrides win over the palette
pub fn button_color(instance: &MacroInstance, palette: &Palette) -> Rgb {
    palette.resolve(color_role(instance), instance.definition().map(|d| &d.colors))
}
