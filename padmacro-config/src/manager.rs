//! Profile directory with a persisted current profile
use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use serde_derive::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::loader::{file_format, load_profile};
use crate::profile::Profile;

/// A loaded profile and the file it came from
#[derive(Clone, Debug)]
pub struct ProfileEntry {
    pub file_name: String,
    pub profile: Profile,
}

/// Content of the state file
#[derive(Debug, Default, Serialize, Deserialize)]
struct ProfileState {
    /// File name of the current profile
    current: String,
}

/// All profiles of a directory, sorted by file name
#[derive(Debug)]
pub struct ProfileManager {
    profiles: Vec<ProfileEntry>,
    current: usize,
    state_file: Option<PathBuf>,
}

impl ProfileManager {
    /// Load every `.json` and `.toml` profile in `dir`.
    ///
    /// Files that fail to load are skipped with a warning. Fails when no
    /// profile loads at all.
    pub fn load(dir: impl AsRef<Path>) -> ConfigResult<Self> {
        let dir = dir.as_ref();
        let read_error = |e: std::io::Error| ConfigError::FileRead {
            path: dir.display().to_string(),
            message: e.to_string(),
        };

        let mut files: Vec<(String, PathBuf)> = Vec::new();
        for entry in fs::read_dir(dir).map_err(read_error)? {
            let path = entry.map_err(read_error)?.path();
            if !path.is_file() || file_format(&path).is_none() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                files.push((name.to_string(), path.clone()));
            }
        }
        files.sort();

        let mut profiles = Vec::new();
        for (file_name, path) in files {
            match load_profile(&path) {
                Ok(profile) => {
                    info!("Loaded profile '{}' from {}", profile.name, file_name);
                    profiles.push(ProfileEntry { file_name, profile });
                }
                Err(e) => warn!("Skipping profile {}: {}", file_name, e),
            }
        }

        if profiles.is_empty() {
            return Err(ConfigError::NoProfiles {
                dir: dir.display().to_string(),
            });
        }
        Ok(Self {
            profiles,
            current: 0,
            state_file: None,
        })
    }

    /// Persist the current profile to `path` and restore it from there.
    ///
    /// A missing or stale state file selects the first profile and is
    /// rewritten.
    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let restored = fs::read_to_string(&path)
            .ok()
            .and_then(|contents| match toml::from_str::<ProfileState>(&contents) {
                Ok(state) => Some(state),
                Err(e) => {
                    warn!("Ignoring state file {}: {}", path.display(), e);
                    None
                }
            })
            .and_then(|state| {
                let index = self.position(|entry| entry.file_name == state.current);
                if index.is_none() {
                    warn!("Profile file {} not found, using the first profile", state.current);
                }
                index
            });

        self.state_file = Some(path);
        match restored {
            Some(index) => self.current = index,
            None => {
                self.current = 0;
                self.save_state();
            }
        }
        self
    }

    fn position(&self, predicate: impl Fn(&ProfileEntry) -> bool) -> Option<usize> {
        self.profiles.iter().position(predicate)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Always `false`, a manager holds at least one profile
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn entries(&self) -> &[ProfileEntry] {
        &self.profiles
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|entry| entry.profile.name.as_str())
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &Profile {
        &self.profiles[self.current].profile
    }

    pub fn current_file_name(&self) -> &str {
        &self.profiles[self.current].file_name
    }

    /// Move `step` profiles forward, or backward when negative, wrapping around
    pub fn switch(&mut self, step: i32) -> &Profile {
        let len = self.profiles.len() as i64;
        self.current = (self.current as i64 + step as i64).rem_euclid(len) as usize;
        info!("Switched to profile '{}'", self.current().name);
        self.save_state();
        self.current()
    }

    /// Select a profile by name, ignoring case
    pub fn select_by_name(&mut self, name: &str) -> Option<&Profile> {
        let index = self.position(|entry| entry.profile.name.eq_ignore_ascii_case(name.trim()))?;
        self.current = index;
        self.save_state();
        Some(self.current())
    }

    /// Write the current profile to the state file, failures are logged
    fn save_state(&self) {
        let Some(path) = &self.state_file else {
            return;
        };
        let state = ProfileState {
            current: self.current_file_name().to_string(),
        };
        let result = toml::to_string(&state)
            .map_err(|e| e.to_string())
            .and_then(|contents| fs::write(path, contents).map_err(|e| e.to_string()));
        if let Err(e) = result {
            error!("Failed to save current profile to {}: {}", path.display(), e);
        }
    }
}
