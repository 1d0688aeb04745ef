pub mod lifecycle;
pub mod resolver;
