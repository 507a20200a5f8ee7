//! Profile files of the padmacro macro pad.
//!
//! A profile is a JSON or TOML file naming up to 12 button macros. This
//! crate reads profile files, validates them into
//! [`MacroDefinition`](padmacro_types::definition::MacroDefinition)s and
//! keeps track of the current profile of a profile directory.

pub mod error;
mod loader;
pub mod manager;
pub mod profile;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_palette, load_profile};
pub use manager::{ProfileEntry, ProfileManager};
pub use profile::Profile;
pub use validation::{validate_macro, validate_profile};

// Init logger for tests
#[cfg(test)]
#[ctor::ctor]
fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}
