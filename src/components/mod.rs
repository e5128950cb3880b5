pub mod associations;
pub mod force_graph;
pub mod popup;
pub mod sidebar;
pub mod toast;
pub mod toolbar;
