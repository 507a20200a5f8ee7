//! # padmacro types
//!
//! Fundamental type definitions shared by the padmacro crates.
//!
//! ## Modules
//!
//! - [`keycode`] - HID keycodes, key-name lookup and ASCII mapping
//! - [`modifier`] - HID modifier byte
//! - [`mouse_button`] - Mouse buttons and the report button bitfield
//! - [`action`] - The compiled, immutable action tree of a macro
//! - [`definition`] - Macro definitions and profile slots
//! - [`color`] - Indicator colors and per-macro overrides
//!
//! - **padmacro**: the execution core consumes these types
//! - **padmacro-config**: profile parsing produces these types

#![no_std]

pub mod action;
pub mod color;
pub mod definition;
pub mod keycode;
pub mod modifier;
pub mod mouse_button;

/// Number of macro buttons on the pad
pub const NUM_BUTTONS: usize = 12;

/// Maximum number of action nodes in one macro, nested nodes included
pub const MAX_ACTIONS: usize = 64;

/// Maximum nesting depth of `repeat` nodes
pub const MAX_NESTING: usize = 8;

/// Maximum number of keys in a single press action
pub const MAX_COMBO_KEYS: usize = 8;

/// Maximum number of text bytes in one macro
pub const MAX_TEXT_LEN: usize = 256;

/// Maximum length of a macro name
pub const MAX_NAME_LEN: usize = 32;
