//! inspect_core: config-driven extract/transform/load for inspection data
//!
//! A YAML document declares named extractors, transformers and loaders, wires
//! them into pipelines and groups pipelines into tasks. The [`Runner`] looks a
//! name up (tasks first), builds fresh components through the [`Registry`]
//! and threads datasets through them in order, stopping at the first failure.
//!
//! Basic usage:
//!
//! ```no_run
//! use inspect_core::{Registry, Runner};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let runner = Runner::from_path("etl/pipeline.yml", Registry::with_builtins())?;
//! runner.run("daily").await?;
//! # Ok(())
//! # }
//! ```
//!
//! Components of your own are registered next to the built-ins:
//!
//! ```no_run
//! use inspect_core::registry::Registry;
//! use inspect_core::transformers::passthrough::Passthrough;
//!
//! let mut registry = Registry::with_builtins();
//! registry.register_transformer("my_app::cleaning", "Identity", |_params| Ok(Passthrough));
//! ```

pub mod config;
pub mod extractors;
pub mod failure;
pub mod loaders;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod registry;
pub mod store;
pub mod transformers;

pub use config::{load_config, parse_config, ConfigError, EtlConfig, Params};
pub use extractors::Extractor;
pub use loaders::Loader;
pub use pipeline::{ComponentFactory, RunError, Runner};
pub use registry::{BuildError, Category, Registry};
pub use transformers::Transformer;
