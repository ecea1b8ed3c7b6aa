//! # TDM Types
//!
//! Fundamental type definitions shared by the temporal dynamic macro firmware and host tools.
//!
//! ## Modules
//!
//! - [`keycode`] - Keycodes seen by the macro engine: HID keys, layer keys and macro control keys
//! - [`keypress`] - The recorded keypress and its flag byte

#![no_std]

pub mod keycode;
pub mod keypress;
