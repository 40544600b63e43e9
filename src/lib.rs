//! Dialogue Engine — scripted conversation playback for games.
//!
//! Sequences authored conversation blocks and reveals their text character
//! by character, interpreting inline `<...>` control directives for pacing,
//! visual effects, and emotion changes, with cooperative skip cancellation.
//! Rendering, audio, and asset loading stay on the host side behind the
//! one-way [`crate::core::display::DisplaySurface`] trait.

pub mod core;
pub mod schema;
