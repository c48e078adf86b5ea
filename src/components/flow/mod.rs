mod changes;
mod component;
mod config;
mod controller;
mod error;
mod render;
mod state;
mod store;
mod types;

pub use changes::{EdgeChange, NodeChange};
pub use component::FlowCanvas;
pub use config::FlowConfig;
pub use controller::{DropEvent, InteractionController};
pub use store::DiagramStore;
pub use types::{Connection, Edge, Node, NodeKind, NodeTemplate, Position};
