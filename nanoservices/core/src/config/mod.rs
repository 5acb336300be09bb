pub mod env;
pub mod loader;
pub mod params;
pub mod types;

pub use loader::{load_config, parse_config, validate, ConfigError};
pub use params::{ParamError, ParamValue, Params};
pub use types::{ComponentDecl, EtlConfig, PipelineDef, TaskDef};
