//! Optional enrichment of bound values through embedding models.

use super::{ParamSpecs, ParamValue, ParamValues};
use crate::types::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Text embedding backend, keyed by name in [`EmbeddingModels`].
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

pub type EmbeddingModels = HashMap<String, Arc<dyn EmbeddingModel>>;

/// Replace string values of parameters marked `embedded_by` with vectors.
///
/// Passthrough when no models are configured.
pub async fn embed_params(
    specs: &ParamSpecs,
    values: ParamValues,
    models: &EmbeddingModels,
) -> Result<ParamValues> {
    if models.is_empty() {
        return Ok(values);
    }

    let mut out = values;
    for spec in specs {
        let Some(model_name) = &spec.embedded_by else {
            continue;
        };
        let Some(text) = out.get_str(&spec.name).map(str::to_string) else {
            continue;
        };
        let model = models.get(model_name).ok_or_else(|| {
            Error::config_validation(format!(
                "parameter {} references unknown embedding model {}",
                spec.name, model_name
            ))
        })?;
        let vector = model.embed(&text).await?;
        out.insert(
            spec.name.clone(),
            ParamValue::Array(
                vector
                    .into_iter()
                    .map(|f| ParamValue::Float(f64::from(f)))
                    .collect(),
            ),
        );
    }
    Ok(out)
}
