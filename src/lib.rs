pub mod config;
pub mod dom;
pub mod engine;
pub mod error;
pub mod message;
pub mod origin;
pub mod render;

pub use config::PopoverConfig;
pub use dom::{Document, Viewport};
pub use engine::lifecycle::{PopoverManager, ShowOutcome};
pub use error::InspectorError;
pub use message::{HoverMessage, SelectionMessage};
