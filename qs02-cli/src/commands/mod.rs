//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// The `inventory` command: classify a whole library.
pub mod inventory;

/// The `normalize` command: re-encode one film.
pub mod normalize;

pub use inventory::run_inventory_command;
pub use normalize::run_normalize_command;
