//! Class-reference lookup for extractors, transformers and loaders.
//!
//! A class reference names a component as `<module path>::<TypeName>`.
//! Component modules register their constructors under their own
//! `module_path!()` when the registry is created, so adding a new component
//! only means registering it; the runner never names concrete types.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::config::params::{ParamError, Params};
use crate::extractors::{self, Extractor};
use crate::loaders::{self, Loader};
use crate::transformers::{self, Transformer};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("{category} '{name}' is not declared in the configuration")]
    UndeclaredComponent { category: Category, name: String },
    #[error("class reference '{0}' must have the form <module>::<Type>")]
    MalformedReference(String),
    #[error("no {category} module '{module}' is registered")]
    UnknownModule { category: Category, module: String },
    #[error("module '{module}' has no {category} named '{class}'")]
    UnknownClass {
        category: Category,
        module: String,
        class: String,
    },
    #[error(transparent)]
    Params(#[from] ParamError),
    #[error("constructor failed: {0}")]
    Construct(#[from] inspect_utils::error::Error),
}

/// The three capability kinds a declaration can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Extractor,
    Transformer,
    Loader,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Extractor => "extractor",
            Category::Transformer => "transformer",
            Category::Loader => "loader",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Constructor<T> = Arc<dyn Fn(&Params) -> Result<Box<T>, BuildError> + Send + Sync>;

struct Catalog<T: ?Sized> {
    category: Category,
    modules: BTreeMap<String, BTreeMap<String, Constructor<T>>>,
}

impl<T: ?Sized> Catalog<T> {
    fn new(category: Category) -> Self {
        Self {
            category,
            modules: BTreeMap::new(),
        }
    }

    fn insert(&mut self, module: &str, class: &str, ctor: Constructor<T>) {
        let previous = self
            .modules
            .entry(module.to_string())
            .or_default()
            .insert(class.to_string(), ctor);
        if previous.is_some() {
            tracing::warn!(category = %self.category, module, class, "constructor re-registered");
        }
    }

    fn resolve(&self, class_ref: &str) -> Result<&Constructor<T>, BuildError> {
        let (module, class) = split_reference(class_ref)?;
        let classes = self
            .modules
            .get(module)
            .ok_or_else(|| BuildError::UnknownModule {
                category: self.category,
                module: module.to_string(),
            })?;
        classes.get(class).ok_or_else(|| BuildError::UnknownClass {
            category: self.category,
            module: module.to_string(),
            class: class.to_string(),
        })
    }

    fn references(&self) -> Vec<String> {
        self.modules
            .iter()
            .flat_map(|(module, classes)| classes.keys().map(move |c| format!("{module}::{c}")))
            .collect()
    }
}

/// Split `a::b::Type` into (`a::b`, `Type`) on the last separator.
pub fn split_reference(class_ref: &str) -> Result<(&str, &str), BuildError> {
    match class_ref.trim().rsplit_once("::") {
        Some((module, class)) if !module.is_empty() && !class.is_empty() => Ok((module, class)),
        _ => Err(BuildError::MalformedReference(class_ref.to_string())),
    }
}

/// Constructors for every known component, keyed by class reference.
pub struct Registry {
    extractors: Catalog<dyn Extractor>,
    transformers: Catalog<dyn Transformer>,
    loaders: Catalog<dyn Loader>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            extractors: Catalog::new(Category::Extractor),
            transformers: Catalog::new(Category::Transformer),
            loaders: Catalog::new(Category::Loader),
        }
    }

    /// A registry holding every component that ships with this crate.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        extractors::register(&mut registry);
        transformers::register(&mut registry);
        loaders::register(&mut registry);
        registry
    }

    pub fn register_extractor<E, F>(&mut self, module: &str, class: &str, ctor: F)
    where
        E: Extractor + 'static,
        F: Fn(&Params) -> Result<E, BuildError> + Send + Sync + 'static,
    {
        self.extractors.insert(
            module,
            class,
            Arc::new(move |params: &Params| -> Result<Box<dyn Extractor>, BuildError> {
                Ok(Box::new(ctor(params)?))
            }),
        );
    }

    pub fn register_transformer<T, F>(&mut self, module: &str, class: &str, ctor: F)
    where
        T: Transformer + 'static,
        F: Fn(&Params) -> Result<T, BuildError> + Send + Sync + 'static,
    {
        self.transformers.insert(
            module,
            class,
            Arc::new(move |params: &Params| -> Result<Box<dyn Transformer>, BuildError> {
                Ok(Box::new(ctor(params)?))
            }),
        );
    }

    pub fn register_loader<L, F>(&mut self, module: &str, class: &str, ctor: F)
    where
        L: Loader + 'static,
        F: Fn(&Params) -> Result<L, BuildError> + Send + Sync + 'static,
    {
        self.loaders.insert(
            module,
            class,
            Arc::new(move |params: &Params| -> Result<Box<dyn Loader>, BuildError> {
                Ok(Box::new(ctor(params)?))
            }),
        );
    }

    pub fn build_extractor(&self, class_ref: &str, params: &Params) -> Result<Box<dyn Extractor>, BuildError> {
        (self.extractors.resolve(class_ref)?)(params)
    }

    pub fn build_transformer(&self, class_ref: &str, params: &Params) -> Result<Box<dyn Transformer>, BuildError> {
        (self.transformers.resolve(class_ref)?)(params)
    }

    pub fn build_loader(&self, class_ref: &str, params: &Params) -> Result<Box<dyn Loader>, BuildError> {
        (self.loaders.resolve(class_ref)?)(params)
    }

    /// Confirm `class_ref` names a registered component without building it.
    pub fn check(&self, category: Category, class_ref: &str) -> Result<(), BuildError> {
        match category {
            Category::Extractor => self.extractors.resolve(class_ref).map(|_| ()),
            Category::Transformer => self.transformers.resolve(class_ref).map(|_| ()),
            Category::Loader => self.loaders.resolve(class_ref).map(|_| ()),
        }
    }

    /// Every registered class reference for `category`, sorted.
    pub fn references(&self, category: Category) -> Vec<String> {
        match category {
            Category::Extractor => self.extractors.references(),
            Category::Transformer => self.transformers.references(),
            Category::Loader => self.loaders.references(),
        }
    }
}
