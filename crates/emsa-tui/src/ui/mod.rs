//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, the login view, the shell and overlays
//! - `input`: keyboard event handling
//! - `styles`: color palette and text styling
//! - `pages`: per-route content rendering

pub mod input;
pub mod pages;
pub mod render;
pub mod styles;
