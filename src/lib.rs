//! Recognition engine for pointer-drawn gestures.
//!
//! Input events drive a [`mouse_gestures::CaptureMachine`], which simplifies
//! the pointer track into a [`mouse_gestures::Pattern`] while it is drawn.
//! Finished patterns are matched against a catalog of
//! [`mouse_gestures::GestureRecord`]s; the matched record's command is left
//! to the caller to execute.

pub mod logging;
pub mod mouse_gestures;
pub mod settings;
