//! CLI subcommand implementations.

pub mod events;
pub mod import;
pub mod render;
pub mod session;
pub mod simulate;
pub mod trains;
pub mod util;
