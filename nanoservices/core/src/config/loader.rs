use std::path::{Path, PathBuf};

use crate::config::env;
use crate::config::types::EtlConfig;
use crate::failure;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration:\n  - {}", .0.join("\n  - "))]
    Invalid(Vec<String>),
}

/// Load, expand and validate a pipeline document from a YAML file.
pub fn load_config(path: impl AsRef<Path>) -> Result<EtlConfig, ConfigError> {
    let load = failure::instrument(concat!(module_path!(), "::load_config"), |path: PathBuf| -> Result<EtlConfig, ConfigError> {
        let content = std::fs::read_to_string(&path)?;
        parse_config(&content)
    });
    load(path.as_ref().to_path_buf())
}

/// Parse a pipeline document from a YAML string.
///
/// `${env:NAME}` placeholders are expanded before the document is checked
/// against the typed schema.
pub fn parse_config(yaml: &str) -> Result<EtlConfig, ConfigError> {
    let raw: serde_yaml::Value = serde_yaml::from_str(yaml)?;
    let config: EtlConfig = serde_yaml::from_value(env::expand(&raw))?;
    validate(&config)?;
    Ok(config)
}

/// Check every cross reference in the document, collecting all problems.
pub fn validate(config: &EtlConfig) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    for (name, pipeline) in &config.pipelines {
        if pipeline.extractors.is_empty() {
            errors.push(format!("pipeline '{name}': at least one extractor is required"));
        }
        let sections = [
            ("extractor", &pipeline.extractors, &config.extractors),
            ("transformer", &pipeline.transformers, &config.transformers),
            ("loader", &pipeline.loaders, &config.loaders),
        ];
        for (category, listed, declared) in sections {
            for component in listed {
                if !declared.contains_key(component) {
                    errors.push(format!(
                        "pipeline '{name}': {category} '{component}' is not declared"
                    ));
                }
            }
        }
    }

    for (name, task) in &config.tasks {
        if task.pipelines.is_empty() {
            errors.push(format!("task '{name}': at least one pipeline is required"));
        }
        for pipeline in &task.pipelines {
            if !config.pipelines.contains_key(pipeline) {
                errors.push(format!("task '{name}': pipeline '{pipeline}' is not defined"));
            }
        }
    }

    for (section, declared) in [
        ("extractors", &config.extractors),
        ("transformers", &config.transformers),
        ("loaders", &config.loaders),
    ] {
        for (name, decl) in declared {
            if decl.class_ref.trim().is_empty() {
                errors.push(format!("{section}.{name}: class reference is empty"));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(errors))
    }
}
