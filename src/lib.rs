//! # Teumnirm
//!
//! A break reminder for the terminal. It counts continuous keyboard and mouse
//! use, asks for a break once the configured interval is used up and can turn
//! Philips Hue lights red until the break is confirmed.
//!
//! - [`libs::controller`]: the usage/idle/break state machine
//! - [`libs::runtime`]: the event loop driving it
//! - [`libs::activity`]: global input listener
//! - [`api::hue`]: Hue bridge client
//!
//! ```rust,no_run
//! use teumnirm::commands::Cli;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod api;
pub mod commands;
pub mod libs;
