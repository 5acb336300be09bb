use async_trait::async_trait;

use inspect_utils::{Dataset, InspectResult};

use super::Transformer;
use crate::config::params::Params;
use crate::registry::BuildError;

pub(crate) const MODULE: &str = module_path!();

/// Hands the dataset on untouched.
#[derive(Debug, Default)]
pub struct Passthrough;

impl Passthrough {
    pub fn from_params(params: &Params) -> Result<Self, BuildError> {
        params.expect_only(&[])?;
        Ok(Self)
    }
}

#[async_trait]
impl Transformer for Passthrough {
    async fn transform(&mut self, data: Dataset) -> InspectResult<Dataset> {
        Ok(data)
    }
}
