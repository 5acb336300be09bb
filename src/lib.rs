pub use inspect_core as core;
pub use inspect_utils as utils;

// Convenience re-exports for common usage
pub use inspect_core::config::{load_config, EtlConfig, Params};
pub use inspect_core::extractors::traits::Extractor;
pub use inspect_core::loaders::traits::Loader;
pub use inspect_core::pipeline::{RunError, Runner};
pub use inspect_core::registry::Registry;
pub use inspect_core::transformers::traits::Transformer;
pub use inspect_utils::{Dataset, InspectResult};
