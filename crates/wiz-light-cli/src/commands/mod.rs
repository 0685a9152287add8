//! Command implementations.

pub mod config;
pub mod discover;
pub mod listen;
pub mod pilot;

pub use config::run_config;
pub use discover::run_discover;
pub use listen::run_listen;
pub use pilot::run_pilot;
