use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::params::Params;

/// The whole pipeline document: component declarations, pipelines and tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtlConfig {
    pub extractors: IndexMap<String, ComponentDecl>,
    pub transformers: IndexMap<String, ComponentDecl>,
    pub loaders: IndexMap<String, ComponentDecl>,
    pub pipelines: IndexMap<String, PipelineDef>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub tasks: IndexMap<String, TaskDef>,
}

/// A named component: which registered type to build and its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentDecl {
    /// `<module path>::<TypeName>`, resolved against the registry when built.
    #[serde(rename = "class")]
    pub class_ref: String,
    #[serde(default, skip_serializing_if = "Params::is_empty")]
    pub params: Params,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineDef {
    pub extractors: Vec<String>,
    pub transformers: Vec<String>,
    pub loaders: Vec<String>,
    /// Union every extracted dataset into one before transforming.
    #[serde(default, alias = "merge")]
    pub concatenate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskDef {
    pub pipelines: Vec<String>,
}
