//! Input events consumed by the macro engine.

/// Edge of a button event
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Down,
    Up,
}

/// An event produced by the pad's buttons or its rotary encoder
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputEvent {
    /// A macro button changed state, `index` is in `0..NUM_BUTTONS`
    Button { index: u8, edge: Edge },
    /// Encoder rotated by this many detents, positive is clockwise
    Rotate(i8),
    /// Encoder pressed: stop everything
    EmergencyStop,
}

impl InputEvent {
    pub const fn down(index: u8) -> Self {
        InputEvent::Button { index, edge: Edge::Down }
    }

    pub const fn up(index: u8) -> Self {
        InputEvent::Button { index, edge: Edge::Up }
    }
}
