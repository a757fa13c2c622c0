//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, enums, and subcommand handlers.

mod args;
mod commands;
mod enums;

pub use args::{Args, Command, ConfigAction, RenderArgs};
pub use commands::{
    draw_diagonal_gradient, handle_config_action, list_formats, put_banner, run_render,
};
pub use enums::{DitherMode, TextAttr};
