//! CLI module for RestMode.
//!
//! This module contains the client-side pieces:
//! - `commands`: clap command definitions
//! - `client`: IPC client for talking to the daemon
//! - `display`: formatted terminal output

pub mod client;
pub mod commands;
pub mod display;

pub use client::IpcClient;
pub use commands::{AddArgs, Cli, Commands, PostponeArgs};
pub use display::Display;
