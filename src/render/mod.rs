pub mod layout;
pub mod overlay;
pub mod position;
pub mod tooltip;
