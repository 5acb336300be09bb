pub mod factory;
pub mod runner;

pub use factory::ComponentFactory;
pub use runner::{RunError, Runner};
