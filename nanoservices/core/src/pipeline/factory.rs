use crate::config::types::{ComponentDecl, EtlConfig};
use crate::extractors::Extractor;
use crate::loaders::Loader;
use crate::registry::{BuildError, Category, Registry};
use crate::transformers::Transformer;

/// Builds components by their declared name.
///
/// Every call constructs a new instance; nothing is cached between calls.
pub struct ComponentFactory<'a> {
    config: &'a EtlConfig,
    registry: &'a Registry,
}

impl<'a> ComponentFactory<'a> {
    pub fn new(config: &'a EtlConfig, registry: &'a Registry) -> Self {
        Self { config, registry }
    }

    /// The declaration for `name` in the section matching `category`.
    pub fn declaration(&self, category: Category, name: &str) -> Result<&'a ComponentDecl, BuildError> {
        let section = match category {
            Category::Extractor => &self.config.extractors,
            Category::Transformer => &self.config.transformers,
            Category::Loader => &self.config.loaders,
        };
        section.get(name).ok_or_else(|| BuildError::UndeclaredComponent {
            category,
            name: name.to_string(),
        })
    }

    pub fn extractor(&self, name: &str) -> Result<Box<dyn Extractor>, BuildError> {
        let decl = self.declaration(Category::Extractor, name)?;
        tracing::debug!(extractor = name, class = %decl.class_ref, "building");
        self.registry.build_extractor(&decl.class_ref, &decl.params)
    }

    pub fn transformer(&self, name: &str) -> Result<Box<dyn Transformer>, BuildError> {
        let decl = self.declaration(Category::Transformer, name)?;
        tracing::debug!(transformer = name, class = %decl.class_ref, "building");
        self.registry.build_transformer(&decl.class_ref, &decl.params)
    }

    pub fn loader(&self, name: &str) -> Result<Box<dyn Loader>, BuildError> {
        let decl = self.declaration(Category::Loader, name)?;
        tracing::debug!(loader = name, class = %decl.class_ref, "building");
        self.registry.build_loader(&decl.class_ref, &decl.params)
    }

    /// Resolve the class reference for `name` without constructing it.
    pub fn check(&self, category: Category, name: &str) -> Result<(), BuildError> {
        let decl = self.declaration(category, name)?;
        self.registry.check(category, &decl.class_ref)
    }
}
