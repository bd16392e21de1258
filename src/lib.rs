//! Avatar motion and animation for a shared 3D space.
//!
//! Each character is driven either by the local keyboard or by snapshots
//! replicated from a remote user. Every tick a motion sample moves the
//! character and, when its classification changes, crossfades to the
//! matching clip of its loaded model.

pub mod core;
pub mod engine;
pub mod game;
