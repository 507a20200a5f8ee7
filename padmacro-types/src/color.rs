//! Indicator colors.

/// An RGB color
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

/// What a button's light is telling the user
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorRole {
    /// Macro configured and idle
    Ready,
    /// Macro executing or waiting between actions
    Running,
    /// Toggle macro waiting for its next cycle
    Sleeping,
    /// Toggle macro waiting for the execution slot
    Queued,
    /// No macro on this button
    Off,
    /// Emergency stop or queue overflow
    Alert,
}

impl ColorRole {
    pub fn from_name(name: &str) -> Option<Self> {
        let role = match name {
            "ready" => ColorRole::Ready,
            "running" | "loop" => ColorRole::Running,
            "sleeping" | "wait" => ColorRole::Sleeping,
            "queued" => ColorRole::Queued,
            "off" => ColorRole::Off,
            "alert" | "emergency" | "error" => ColorRole::Alert,
            _ => return None,
        };
        Some(role)
    }
}

/// Per-macro colors that win over the palette
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ColorOverrides {
    pub ready: Option<Rgb>,
    pub running: Option<Rgb>,
    pub sleeping: Option<Rgb>,
    pub queued: Option<Rgb>,
}

impl ColorOverrides {
    pub fn get(&self, role: ColorRole) -> Option<Rgb> {
        match role {
            ColorRole::Ready => self.ready,
            ColorRole::Running => self.running,
            ColorRole::Sleeping => self.sleeping,
            ColorRole::Queued => self.queued,
            ColorRole::Off | ColorRole::Alert => None,
        }
    }

    /// Set an override, returns `false` for roles a macro cannot override
    pub fn set(&mut self, role: ColorRole, color: Rgb) -> bool {
        let slot = match role {
            ColorRole::Ready => &mut self.ready,
            ColorRole::Running => &mut self.running,
            ColorRole::Sleeping => &mut self.sleeping,
            ColorRole::Queued => &mut self.queued,
            ColorRole::Off | ColorRole::Alert => return false,
        };
        *slot = Some(color);
        true
    }
}

/// Color of every role
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Palette {
    pub ready: Rgb,
    pub running: Rgb,
    pub sleeping: Rgb,
    pub queued: Rgb,
    pub off: Rgb,
    pub alert: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            ready: Rgb::new(0, 80, 0),
            running: Rgb::new(0, 0, 80),
            sleeping: Rgb::new(80, 80, 0),
            queued: Rgb::new(60, 0, 60),
            off: Rgb::new(0, 0, 0),
            alert: Rgb::new(255, 0, 0),
        }
    }
}

impl Palette {
    pub fn get(&self, role: ColorRole) -> Rgb {
        match role {
            ColorRole::Ready => self.ready,
            ColorRole::Running => self.running,
            ColorRole::Sleeping => self.sleeping,
            ColorRole::Queued => self.queued,
            ColorRole::Off => self.off,
            ColorRole::Alert => self.alert,
        }
    }

    pub fn set(&mut self, role: ColorRole, color: Rgb) {
        match role {
            ColorRole::Ready => self.ready = color,
            ColorRole::Running => self.running = color,
            ColorRole::Sleeping => self.sleeping = color,
            ColorRole::Queued => self.queued = color,
            ColorRole::Off => self.off = color,
            ColorRole::Alert => self.alert = color,
        }
    }

    /// Color of `role`, taking a macro's overrides into account
    pub fn resolve(&self, role: ColorRole, overrides: Option<&ColorOverrides>) -> Rgb {
        overrides.and_then(|o| o.get(role)).unwrap_or_else(|| self.get(role))
    }
}
