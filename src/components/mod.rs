pub mod flow;
pub mod sidebar;
