use std::path::Path;
use std::time::Instant;

use inspect_utils::error::Error as ComponentError;
use inspect_utils::Dataset;

use crate::config::loader::{self, ConfigError};
use crate::config::types::{EtlConfig, PipelineDef};
use crate::failure;
use crate::metrics;
use crate::pipeline::factory::ComponentFactory;
use crate::registry::{BuildError, Category, Registry};

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("'{0}' is neither a task nor a pipeline")]
    UnknownTarget(String),
    #[error("failed to build {category} '{component}': {source}")]
    Build {
        category: Category,
        component: String,
        #[source]
        source: BuildError,
    },
    #[error("{category} '{component}' failed: {source}")]
    Component {
        category: Category,
        component: String,
        #[source]
        source: ComponentError,
    },
    #[error("pipeline '{pipeline}': could not concatenate extracted datasets: {source}")]
    Concatenate {
        pipeline: String,
        #[source]
        source: ComponentError,
    },
}

impl RunError {
    /// True when the run failed because of the deployment's configuration
    /// rather than while a component was doing its work.
    pub fn is_configuration(&self) -> bool {
        match self {
            RunError::UnknownTarget(_) => true,
            RunError::Build { source, .. } => !matches!(source, BuildError::Construct(_)),
            RunError::Component { .. } | RunError::Concatenate { .. } => false,
        }
    }
}

/// Executes pipelines and tasks from a validated configuration.
pub struct Runner {
    config: EtlConfig,
    registry: Registry,
}

impl Runner {
    pub fn new(config: EtlConfig, registry: Registry) -> Result<Self, ConfigError> {
        loader::validate(&config)?;
        Ok(Self { config, registry })
    }

    /// Load the document at `path` and pair it with `registry`.
    pub fn from_path(path: impl AsRef<Path>, registry: Registry) -> Result<Self, ConfigError> {
        let config = loader::load_config(path)?;
        Ok(Self { config, registry })
    }

    pub fn config(&self) -> &EtlConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run the task or pipeline called `name`.
    ///
    /// Tasks are looked up before pipelines. A task runs its pipelines in
    /// order and stops at the first failure.
    pub async fn run(&self, name: &str) -> Result<(), RunError> {
        failure::observe(concat!(module_path!(), "::Runner::run"), name, async {
            for pipeline in self.resolve(name)? {
                self.run_pipeline(pipeline).await?;
            }
            Ok::<(), RunError>(())
        })
        .await
    }

    /// Pipeline names that running `name` would execute, in order.
    pub fn resolve(&self, name: &str) -> Result<Vec<&str>, RunError> {
        if let Some(task) = self.config.tasks.get(name) {
            return Ok(task.pipelines.iter().map(String::as_str).collect());
        }
        if let Some((pipeline, _)) = self.config.pipelines.get_key_value(name) {
            return Ok(vec![pipeline.as_str()]);
        }
        Err(RunError::UnknownTarget(name.to_string()))
    }

    /// Resolve every class reference `name` would use, without building or
    /// running anything.
    pub fn check(&self, name: &str) -> Result<(), RunError> {
        let factory = ComponentFactory::new(&self.config, &self.registry);
        for pipeline in self.resolve(name)? {
            let def = self.pipeline(pipeline)?;
            let stages = [
                (Category::Extractor, &def.extractors),
                (Category::Transformer, &def.transformers),
                (Category::Loader, &def.loaders),
            ];
            for (category, components) in stages {
                for component in components {
                    factory
                        .check(category, component)
                        .map_err(|source| build_error(category, component, source))?;
                }
            }
        }
        Ok(())
    }

    fn pipeline(&self, name: &str) -> Result<&PipelineDef, RunError> {
        self.config
            .pipelines
            .get(name)
            .ok_or_else(|| RunError::UnknownTarget(name.to_string()))
    }

    async fn run_pipeline(&self, name: &str) -> Result<(), RunError> {
        let def = self.pipeline(name)?;
        tracing::info!(pipeline = name, "pipeline started");
        metrics::inc_run(name);

        let started = Instant::now();
        let result = self.execute(name, def).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        metrics::observe_duration(name, elapsed_ms);

        match &result {
            Ok(()) => tracing::info!(pipeline = name, elapsed_ms, "pipeline finished"),
            Err(_) => metrics::inc_failure(name),
        }
        result
    }

    async fn execute(&self, name: &str, def: &PipelineDef) -> Result<(), RunError> {
        let factory = ComponentFactory::new(&self.config, &self.registry);

        let mut datasets = Vec::with_capacity(def.extractors.len());
        for component in &def.extractors {
            let mut extractor = factory
                .extractor(component)
                .map_err(|source| build_error(Category::Extractor, component, source))?;
            let data = extractor
                .extract()
                .await
                .map_err(|source| component_error(Category::Extractor, component, source))?;
            tracing::debug!(pipeline = name, extractor = %component, rows = data.num_rows(), "extracted");
            metrics::observe_rows(name, Category::Extractor, data.num_rows());
            datasets.push(data);
        }

        if def.concatenate {
            let merged = Dataset::concat(datasets).map_err(|source| RunError::Concatenate {
                pipeline: name.to_string(),
                source,
            })?;
            datasets = vec![merged];
        }

        let mut transformed = Vec::with_capacity(datasets.len());
        for mut data in datasets {
            for component in &def.transformers {
                let mut transformer = factory
                    .transformer(component)
                    .map_err(|source| build_error(Category::Transformer, component, source))?;
                data = transformer
                    .transform(data)
                    .await
                    .map_err(|source| component_error(Category::Transformer, component, source))?;
                tracing::debug!(pipeline = name, transformer = %component, rows = data.num_rows(), "transformed");
            }
            metrics::observe_rows(name, Category::Transformer, data.num_rows());
            transformed.push(data);
        }

        for data in &transformed {
            for component in &def.loaders {
                let mut loader = factory
                    .loader(component)
                    .map_err(|source| build_error(Category::Loader, component, source))?;
                loader
                    .load(data.clone())
                    .await
                    .map_err(|source| component_error(Category::Loader, component, source))?;
                tracing::debug!(pipeline = name, loader = %component, rows = data.num_rows(), "loaded");
            }
            metrics::observe_rows(name, Category::Loader, data.num_rows());
        }

        Ok(())
    }
}

fn build_error(category: Category, component: &str, source: BuildError) -> RunError {
    RunError::Build {
        category,
        component: component.to_string(),
        source,
    }
}

fn component_error(category: Category, component: &str, source: ComponentError) -> RunError {
    RunError::Component {
        category,
        component: component.to_string(),
        source,
    }
}
