//! Reports produced from engine results: the inventory TSV and the per-file
//! comparison written next to normalized outputs.

pub mod comparison;
pub mod inventory;

pub use comparison::{ComparisonInput, render_comparison, write_comparison};
pub use inventory::{
    DEFAULT_TSV_FILENAME, InventoryEntry, InventoryError, InventoryReport,
};
