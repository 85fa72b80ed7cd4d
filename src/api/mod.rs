//! Clients for external devices.
//!
//! The only integration is the Philips Hue bridge. The run loop talks to it
//! through [`LightController`] so lights can be swapped for a test double.

use anyhow::Result;
use std::future::Future;

pub mod hue;

pub use hue::{Hue, HueConfig};

/// Switches lights into the break color and back.
///
/// Both calls run in detached tasks; their errors are only logged.
pub trait LightController: Send + Sync + 'static {
    /// Remembers the current state of every target light, then applies the
    /// break color.
    fn apply_break_state(&self) -> impl Future<Output = Result<()>> + Send;

    /// Puts back whatever [`apply_break_state`](Self::apply_break_state) saved.
    fn restore(&self) -> impl Future<Output = Result<()>> + Send;
}
