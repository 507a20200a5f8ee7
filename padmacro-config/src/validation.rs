//! Validation of profile files into macro definitions
//!
//! A button whose macro fails validation is dropped from the profile, the
//! rest of the profile still loads. Only a profile that is broken as a whole
//! fails: more than 12 buttons, a `macros` key that is not a button index, or
//! both `buttons` and `macros` given.

use log::{debug, warn};
use padmacro_types::NUM_BUTTONS;
use padmacro_types::action::{ActionSource, ActionTree, Leaf, Lowered, NodePosition, PostWait, TreeError};
use padmacro_types::color::{ColorOverrides, ColorRole, Rgb};
use padmacro_types::definition::{MacroDefinition, MacroKind, empty_slots};
use padmacro_types::keycode::{HidKeyCode, KeySet};
use padmacro_types::mouse_button::MouseButton;

use crate::error::{ConfigError, ConfigResult};
use crate::profile::{Profile, ProfileFile, RawAction, RawKeys, RawMacro, RawOperation, is_unconfigured};

/// Validates a parsed profile file
pub fn validate_profile(file: ProfileFile) -> ConfigResult<Profile> {
    let entries = button_entries(&file)?;
    let mut profile = Profile {
        name: file.name,
        slots: empty_slots(),
        errors: Vec::new(),
    };

    for (index, entry) in entries {
        let scope = format!("buttons[{}]", index);
        let result = entry
            .try_deserialize::<RawMacro>()
            .map_err(|e| ConfigError::Validation {
                field: String::new(),
                message: e.to_string(),
            })
            .and_then(|raw| validate_macro(index, &raw))
            .map_err(|e| e.within(&scope));
        match result {
            Ok(definition) => {
                debug!("Button {}: {:?} macro '{}'", index, definition.kind, definition.name);
                profile.slots[index] = Some(definition);
            }
            Err(e) => {
                warn!("Profile '{}': dropping button {}: {}", profile.name, index, e);
                profile.errors.push(e);
            }
        }
    }

    Ok(profile)
}

/// Configured button entries of a profile file, with their button index
fn button_entries(file: &ProfileFile) -> ConfigResult<Vec<(usize, config::Value)>> {
    if !file.buttons.is_empty() && !file.macros.is_empty() {
        return Err(ConfigError::Validation {
            field: "buttons".to_string(),
            message: "use either 'buttons' or 'macros', not both".to_string(),
        });
    }
    if file.buttons.len() > NUM_BUTTONS {
        return Err(ConfigError::InvalidValue {
            field: "buttons".to_string(),
            value: file.buttons.len().to_string(),
            expected: format!("at most {} buttons", NUM_BUTTONS),
        });
    }

    let mut entries: Vec<(usize, config::Value)> = file
        .buttons
        .iter()
        .enumerate()
        .filter(|(_, value)| !is_unconfigured(value))
        .map(|(index, value)| (index, value.clone()))
        .collect();

    for (key, value) in file.macros.iter() {
        if is_unconfigured(value) {
            continue;
        }
        let index = key
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|index| *index < NUM_BUTTONS)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "macros".to_string(),
                value: key.clone(),
                expected: format!("a button index from 0 to {}", NUM_BUTTONS - 1),
            })?;
        entries.push((index, value.clone()));
    }
    entries.sort_by_key(|(index, _)| *index);

    Ok(entries)
}

/// Validates one macro, `index` is the button it sits on
pub fn validate_macro(index: usize, raw: &RawMacro) -> ConfigResult<MacroDefinition> {
    let kind = match raw.kind.as_deref() {
        None => MacroKind::default(),
        Some(name) => MacroKind::from_name(name).ok_or_else(|| ConfigError::InvalidValue {
            field: "type".to_string(),
            value: name.to_string(),
            expected: "press, once, hold or toggle".to_string(),
        })?,
    };

    let actions = raw.actions.as_deref().ok_or(ConfigError::MissingField {
        field: "actions".to_string(),
    })?;
    let tree = ActionTree::compile(actions)?;

    let mut colors = ColorOverrides::default();
    for (role_name, rgb) in raw.colors.iter() {
        let role = ColorRole::from_name(&role_name.to_lowercase());
        if !role.is_some_and(|role| colors.set(role, Rgb::from(*rgb))) {
            return Err(ConfigError::InvalidValue {
                field: "colors".to_string(),
                value: role_name.clone(),
                expected: "ready, running, sleeping or queued".to_string(),
            });
        }
    }

    let name = match raw.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("Button {}", index + 1),
    };
    let mut definition = MacroDefinition::new(&name, kind, tree)
        .with_cycle_wait(raw.wait)
        .with_colors(colors);
    definition.id = index as u8;
    Ok(definition)
}

fn action_field(position: NodePosition) -> String {
    if position.depth == 0 {
        format!("actions[{}]", position.index)
    } else {
        format!("actions[{}] (repeat level {})", position.index, position.depth)
    }
}

fn parse_keys(keys: &RawKeys, field: &str) -> ConfigResult<KeySet> {
    let mut set = KeySet::new();
    for name in keys.names() {
        let key = HidKeyCode::from_name(name).ok_or_else(|| ConfigError::InvalidValue {
            field: format!("{}.keys", field),
            value: name.to_string(),
            expected: "a key name such as CTRL, A or F5".to_string(),
        })?;
        set.push(key).map_err(|_| ConfigError::Validation {
            field: format!("{}.keys", field),
            message: TreeError::TooManyKeys.to_string(),
        })?;
    }
    Ok(set)
}

impl RawAction {
    fn post_wait(&self, field: &str) -> ConfigResult<PostWait> {
        match (self.wait, self.wait_random) {
            (None, None) => Ok(PostWait::None),
            (Some(ms), None) => Ok(PostWait::Fixed(ms)),
            (None, Some(range)) if range.min > range.max => Err(ConfigError::InvalidValue {
                field: format!("{}.wait_random", field),
                value: format!("{}..{}", range.min, range.max),
                expected: "min not greater than max".to_string(),
            }),
            (None, Some(range)) => Ok(PostWait::Random {
                min_ms: range.min,
                max_ms: range.max,
            }),
            (Some(_), Some(_)) => Err(ConfigError::Validation {
                field: field.to_string(),
                message: "use either 'wait' or 'wait_random', not both".to_string(),
            }),
        }
    }
}

impl ActionSource for RawAction {
    type Error = ConfigError;

    fn lower(&self, position: NodePosition) -> ConfigResult<Lowered<'_, Self>> {
        let field = action_field(position);
        let post_wait = self.post_wait(&field)?;
        let action = match &self.operation {
            RawOperation::Repeat { count, actions } => {
                return Ok(Lowered::Repeat {
                    count: *count,
                    post_wait,
                    body: actions,
                });
            }
            RawOperation::Press { keys } => Leaf::PressCombo(parse_keys(keys, &field)?),
            RawOperation::PressDown { keys } => Leaf::PressDown(parse_keys(keys, &field)?),
            RawOperation::PressUp { keys } => Leaf::PressUp(parse_keys(keys, &field)?),
            RawOperation::Type { text } => Leaf::TypeText(text),
            RawOperation::Wait { ms } => Leaf::Wait { ms: *ms },
            RawOperation::WaitRandom { min, max } => {
                if min > max {
                    return Err(ConfigError::InvalidValue {
                        field,
                        value: format!("{}..{}", min, max),
                        expected: "min not greater than max".to_string(),
                    });
                }
                Leaf::WaitRandom {
                    min_ms: *min,
                    max_ms: *max,
                }
            }
            RawOperation::MouseClick { button } => {
                let name = button.as_deref().unwrap_or("left");
                let button = MouseButton::from_name(name).ok_or_else(|| ConfigError::InvalidValue {
                    field: format!("{}.button", field),
                    value: name.to_string(),
                    expected: "left, right or middle".to_string(),
                })?;
                Leaf::MouseClick(button)
            }
            RawOperation::MouseMove { x, y } => Leaf::MouseMove { dx: *x, dy: *y },
            RawOperation::MouseScroll { amount } => Leaf::MouseScroll { amount: *amount },
        };
        Ok(Lowered::Leaf { action, post_wait })
    }
}

#[cfg(test)]
mod tests {
    use config::{Config, File, FileFormat};
    use padmacro_types::action::Action;

    use super::*;

    fn parse(json: &str) -> ProfileFile {
        Config::builder()
            .add_source(File::from_str(json, FileFormat::Json))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    fn single(macro_json: &str) -> ConfigResult<MacroDefinition> {
        let profile = validate_profile(parse(&format!(r#"{{"name": "t", "buttons": [{}]}}"#, macro_json)))?;
        match profile.errors.into_iter().next() {
            Some(e) => Err(e),
            None => Ok(profile.slots[0].clone().unwrap()),
        }
    }

    #[test]
    fn test_valid_macro() {
        let def = single(
            r#"{"name": "Copy", "type": "once", "actions": [
                {"type": "press", "keys": "ctrl+c", "wait": 20},
                {"type": "text", "text": "hi", "wait_random": {"min": 5, "max": 10}},
                {"type": "repeat", "count": 2, "actions": [{"type": "click", "button": "right"}]}
            ]}"#,
        )
        .unwrap();

        assert_eq!(def.name.as_str(), "Copy");
        assert_eq!(def.kind, MacroKind::Press);
        let root = def.actions.list(def.actions.root());
        assert_eq!(root.len(), 3);
        assert_eq!(
            root[0].action,
            Action::PressCombo(KeySet::from_slice(&[HidKeyCode::LCtrl, HidKeyCode::C]).unwrap())
        );
        assert_eq!(root[0].post_wait, PostWait::Fixed(20));
        assert_eq!(root[1].post_wait, PostWait::Random { min_ms: 5, max_ms: 10 });
        let Action::Repeat { count, body } = root[2].action else {
            panic!("expected repeat");
        };
        assert_eq!(count, 2);
        assert_eq!(def.actions.list(body)[0].action, Action::MouseClick(MouseButton::Right));
    }

    #[test]
    fn test_repeat_with_post_wait() {
        let def = single(
            r#"{"name": "R", "actions": [
                {"type": "repeat", "count": 2, "wait": 100, "actions": [{"type": "press", "keys": "A"}]}
            ]}"#,
        )
        .unwrap();
        let root = def.actions.list(def.actions.root());
        assert!(matches!(root[0].action, Action::Repeat { count: 2, .. }));
        assert_eq!(root[0].post_wait, PostWait::Fixed(100));

        let err = single(
            r#"{"actions": [{"type": "repeat", "count": 2, "wait_random": {"min": 9, "max": 1},
                "actions": [{"type": "press", "keys": "A"}]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "buttons[0].actions[0].wait_random"));
    }

    #[test]
    fn test_toggle_defaults() {
        let def = single(
            r#"{"type": "toggle", "wait": 1500, "colors": {"running": [1, 2, 3]},
                "actions": [{"type": "press_down", "keys": ["shift"]}, {"type": "press_up", "keys": ["shift"]}]}"#,
        )
        .unwrap();
        assert_eq!(def.name.as_str(), "Button 1");
        assert_eq!(def.kind, MacroKind::Toggle);
        assert_eq!(def.cycle_wait_ms, 1500);
        assert_eq!(def.colors.running, Some(Rgb::new(1, 2, 3)));
    }

    #[test]
    fn test_invalid_macros() {
        let err = single(r#"{"actions": [{"type": "press", "keys": "CTRL+NOPE"}]}"#).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                field: "buttons[0].actions[0].keys".to_string(),
                value: "NOPE".to_string(),
                expected: "a key name such as CTRL, A or F5".to_string(),
            }
        );

        let err = single(r#"{"name": "x"}"#).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingField {
                field: "buttons[0].actions".to_string()
            }
        );

        let err = single(r#"{"actions": []}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "buttons[0].actions"));

        let err = single(r#"{"type": "loop", "actions": [{"type": "wait", "ms": 1}]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref value, .. } if value == "loop"));

        let err = single(r#"{"actions": [{"type": "wait_random", "min": 9, "max": 1}]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = single(r#"{"actions": [{"type": "click", "button": "back"}]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "buttons[0].actions[0].button"));

        let err = single(r#"{"actions": [{"type": "wait", "ms": 5, "wait": 5}]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));

        let err = single(r#"{"actions": [{"type": "repeat", "count": 0, "actions": []}]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));

        let err = single(
            r#"{"actions": [{"type": "repeat", "count": 1, "actions": [
                {"type": "press", "keys": "A", "wait": 1, "wait_random": {"min": 1, "max": 2}}]}]}"#,
        )
        .unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation { ref field, .. } if field == "buttons[0].actions[0] (repeat level 1)")
        );
    }

    #[test]
    fn test_structural_errors_drop_the_button() {
        for bad in [
            r#"{"actions": [{"type": "dance"}]}"#,
            r#"{"actions": [{"type": "wait", "ms": -5}]}"#,
            r#"{"actions": [{"keys": "A"}]}"#,
            r#"{"actions": [{"type": "press"}]}"#,
        ] {
            let err = single(bad).unwrap_err();
            assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "buttons[0]"), "{}", bad);
        }
    }

    #[test]
    fn test_failing_button_is_dropped() {
        let profile = validate_profile(parse(
            r#"{"name": "Mixed", "buttons": [
                {"actions": [{"type": "press", "keys": "A"}]},
                null,
                {"actions": [{"type": "press", "keys": "BAD"}]},
                {},
                {"type": "hold", "actions": [{"type": "scroll", "amount": -3}]}
            ]}"#,
        ))
        .unwrap();

        assert_eq!(profile.name, "Mixed");
        assert_eq!(profile.configured(), 2);
        assert!(profile.slots[0].is_some());
        assert!(profile.slots[2].is_none());
        assert_eq!(profile.slots[4].as_ref().unwrap().id, 4);
        assert_eq!(profile.errors.len(), 1);
    }

    #[test]
    fn test_macros_table() {
        let profile = validate_profile(parse(
            r#"{"name": "Keyed", "macros": {
                "11": {"actions": [{"type": "move", "x": 10, "y": -4}]},
                "3": {"actions": [{"type": "type", "text": "x"}]},
                "5": {}
            }}"#,
        ))
        .unwrap();

        assert!(profile.slots[3].is_some());
        assert!(profile.slots[11].is_some());
        assert_eq!(profile.configured(), 2);
        assert!(profile.errors.is_empty());
    }

    #[test]
    fn test_profile_level_errors() {
        let thirteen = vec!["null"; NUM_BUTTONS + 1].join(",");
        let err = validate_profile(parse(&format!(r#"{{"name": "big", "buttons": [{}]}}"#, thirteen))).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "buttons"));

        let err = validate_profile(parse(
            r#"{"name": "both", "buttons": [{"actions": [{"type": "wait", "ms": 1}]}],
                "macros": {"1": {"actions": [{"type": "wait", "ms": 1}]}}}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));

        for key in ["two", "12"] {
            let json = format!(r#"{{"name": "k", "macros": {{"{}": {{"actions": []}}}}}}"#, key);
            let err = validate_profile(parse(&json)).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { ref value, .. } if value == key));
        }
    }
}
