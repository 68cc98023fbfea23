pub mod config;
pub mod manager;
pub mod workspace;

pub use config::{offered_field_names, Curve, Field, Graph, GraphConfig};
pub use manager::GraphConfigManager;
pub use workspace::{Workspaces, DEFAULT_WORKSPACE_FILE, WORKSPACE_SLOTS};
