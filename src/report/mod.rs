//! Pure aggregation of listed indices into report documents.

pub mod aggregate;
pub mod inventory;
pub mod render;
pub mod settings;

pub use aggregate::{
    enrich, filter_below_threshold, group_by_policy, ManagedIndex, PolicyGroup, PolicyGroups,
};
pub use inventory::{inventory, inventory_csv_rows, InventoryEntry};
pub use render::{policy_csv_rows, policy_report, PolicyReport, RenderError, RenderOptions};
pub use settings::{attach_definitions_error, attach_policy_definitions, PolicySettings};
