use std::collections::HashMap;
use std::fs;
use std::path::Path;

use config::{Config, File, FileFormat, Value};
use log::{debug, warn};
use padmacro_types::color::{ColorRole, Palette, Rgb};
use serde::de::DeserializeOwned;

use crate::error::{ConfigError, ConfigResult};
use crate::profile::{Profile, ProfileFile};
use crate::validation::validate_profile;

/// File format of `path`, from its extension
pub(crate) fn file_format(path: &Path) -> Option<FileFormat> {
    match path.extension()?.to_str()? {
        ext if ext.eq_ignore_ascii_case("json") => Some(FileFormat::Json),
        ext if ext.eq_ignore_ascii_case("toml") => Some(FileFormat::Toml),
        _ => None,
    }
}

/// Read a JSON or TOML file into `T`
pub(crate) fn read_file<T: DeserializeOwned>(path: &Path) -> ConfigResult<T> {
    let display = path.display().to_string();
    let format = file_format(path).ok_or_else(|| ConfigError::InvalidValue {
        field: "file extension".to_string(),
        value: display.clone(),
        expected: ".json or .toml".to_string(),
    })?;
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: display.clone(),
        message: e.to_string(),
    })?;

    Config::builder()
        .add_source(File::from_str(&contents, format))
        .build()
        .and_then(|config| config.try_deserialize())
        .map_err(|e| ConfigError::Parse {
            path: display,
            message: e.to_string(),
        })
}

/// Load and validate one profile file
pub fn load_profile(path: &Path) -> ConfigResult<Profile> {
    let file: ProfileFile = read_file(path)?;
    let profile = validate_profile(file)?;
    debug!(
        "Loaded profile '{}' from {}: {} buttons, {} dropped",
        profile.name,
        path.display(),
        profile.configured(),
        profile.errors.len()
    );
    Ok(profile)
}

/// Load a palette file on top of the default palette.
///
/// The file maps role names to `[r, g, b]`, either at top level or in a
/// `default` table. Unknown roles and malformed colors are skipped.
pub fn load_palette(path: &Path) -> ConfigResult<Palette> {
    let mut entries: HashMap<String, Value> = read_file(path)?;
    if let Some(section) = entries.remove("default") {
        entries = section
            .into_table()
            .map_err(|e| ConfigError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
            .into_iter()
            .collect();
    }

    let mut palette = Palette::default();
    for (name, value) in entries {
        let Some(role) = ColorRole::from_name(&name.to_lowercase()) else {
            warn!("Palette {}: unknown role '{}'", path.display(), name);
            continue;
        };
        match value.try_deserialize::<[u8; 3]>() {
            Ok(rgb) => palette.set(role, Rgb::from(rgb)),
            Err(e) => warn!("Palette {}: invalid color for '{}': {}", path.display(), name, e),
        }
    }
    Ok(palette)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_toml_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "games.toml",
            r#"
name = "Games"

[macros.0]
name = "Run"
type = "hold"
actions = [{ type = "press_down", keys = "SHIFT+W" }]

[macros.4]
type = "toggle"
wait = 3000
actions = [
    { type = "click", button = "left", wait_random = { min = 50, max = 90 } },
    { type = "repeat", count = 3, actions = [{ type = "scroll", amount = -1, wait = 10 }] },
]
"#,
        );

        let profile = load_profile(&path).unwrap();
        assert_eq!(profile.name, "Games");
        assert_eq!(profile.configured(), 2);
        assert_eq!(profile.slots[0].as_ref().unwrap().name.as_str(), "Run");
        assert_eq!(profile.slots[4].as_ref().unwrap().cycle_wait_ms, 3000);
        assert!(profile.errors.is_empty());
    }

    #[test]
    fn test_file_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        assert!(matches!(load_profile(&missing), Err(ConfigError::FileRead { .. })));

        let broken = write(&dir, "broken.json", r#"{"name": "x", "buttons": ["#);
        assert!(matches!(load_profile(&broken), Err(ConfigError::Parse { .. })));

        let nameless = write(&dir, "nameless.json", r#"{"buttons": []}"#);
        assert!(matches!(load_profile(&nameless), Err(ConfigError::Parse { .. })));

        let yaml = write(&dir, "profile.yaml", "name: x");
        assert!(matches!(load_profile(&yaml), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_palette() {
        let dir = tempfile::tempdir().unwrap();
        let flat = write(&dir, "colors.json", r#"{"ready": [0, 40, 0], "loop": [1, 2, 3], "sparkle": [9, 9, 9]}"#);
        let palette = load_palette(&flat).unwrap();
        assert_eq!(palette.ready, Rgb::new(0, 40, 0));
        assert_eq!(palette.running, Rgb::new(1, 2, 3));
        assert_eq!(palette.alert, Palette::default().alert);

        let sectioned = write(
            &dir,
            "colors.toml",
            "[default]\nemergency = [200, 0, 0]\nqueued = [300, 0, 0]\n",
        );
        let palette = load_palette(&sectioned).unwrap();
        assert_eq!(palette.alert, Rgb::new(200, 0, 0));
        assert_eq!(palette.queued, Palette::default().queued);
    }
}
