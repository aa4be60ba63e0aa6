use super::{model_set_record, LookerOperation};
use crate::looker::{LookerApi, WriteModelSet};
use crate::parameters::{ParamSpec, ParamValues};
use crate::tools::ToolOutput;
use crate::types::{Error, Result};
use async_trait::async_trait;
use tracing::debug;

/// `looker-create-model-set`: create a model set from a name and model list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateModelSet;

#[async_trait]
impl LookerOperation for CreateModelSet {
    const KIND: &'static str = "looker-create-model-set";
    const READ_ONLY: bool = false;

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::string("name", "The name of the model set."),
            ParamSpec::array(
                "models",
                "List of model names.",
                ParamSpec::string("model", "Model name"),
            )
            .optional(),
        ]
    }

    async fn run(&self, client: &dyn LookerApi, params: &ParamValues) -> Result<ToolOutput> {
        let body = WriteModelSet {
            name: params.get_str("name").map(str::to_string),
            models: params.get_string_list("models"),
        };
        debug!(name = ?body.name, models = ?body.models, "creating model set");

        let set = client
            .create_model_set(&body)
            .await
            .map_err(|e| Error::vendor("failed to create model set", e))?;
        Ok(ToolOutput::Record(model_set_record(set)))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::looker::{LookerError, ModelSet};
    use crate::parameters::Claims;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::error::Error as _;

    #[tokio::test]
    async fn test_creates_model_set() {
        let mut client = MockLooker::new();
        client
            .expect_create_model_set()
            .withf(|body| {
                body.name.as_deref() == Some("analysts")
                    && body.models == Some(vec!["ecommerce".to_string(), "finance".to_string()])
            })
            .times(1)
            .returning(|_| {
                Ok(ModelSet {
                    id: Some("7".to_string()),
                    name: Some("analysts".to_string()),
                    models: Some(vec!["ecommerce".to_string(), "finance".to_string()]),
                    all_access: Some(false),
                    built_in: Some(false),
                })
            });

        let sources = sources_with(client, false);
        let tool = tool::<CreateModelSet>(&sources);
        let params = tool
            .parse_params(
                &args(json!({"name": "analysts", "models": ["ecommerce", "finance"]})),
                &Claims::new(),
            )
            .unwrap();

        let out = tool.invoke(&sources, &params, None).await.unwrap();
        assert_eq!(
            out.to_value(),
            json!({
                "id": "7",
                "name": "analysts",
                "models": ["ecommerce", "finance"],
                "all_access": false
            })
        );
    }

    #[tokio::test]
    async fn test_models_omitted_when_not_supplied() {
        let mut client = MockLooker::new();
        client
            .expect_create_model_set()
            .withf(|body| body.models.is_none())
            .times(1)
            .returning(|_| {
                Ok(ModelSet {
                    id: Some("8".to_string()),
                    ..ModelSet::default()
                })
            });

        let sources = sources_with(client, false);
        let tool = tool::<CreateModelSet>(&sources);
        let params = tool
            .parse_params(&args(json!({"name": "empty"})), &Claims::new())
            .unwrap();

        let out = tool.invoke(&sources, &params, None).await.unwrap();
        assert_eq!(out.to_value(), json!({"id": "8"}));
    }

    #[test]
    fn test_name_required() {
        let sources = sources_with(MockLooker::new(), false);
        let tool = tool::<CreateModelSet>(&sources);
        let err = tool
            .parse_params(&args(json!({"models": ["a"]})), &Claims::new())
            .unwrap_err();
        assert!(matches!(err, Error::ParameterValidation { name, .. } if name == "name"));
    }

    #[tokio::test]
    async fn test_vendor_failure_names_operation() {
        let mut client = MockLooker::new();
        client.expect_create_model_set().times(1).returning(|_| {
            Err(LookerError::Api {
                status: 409,
                body: "model set already exists".to_string(),
            })
        });

        let sources = sources_with(client, false);
        let tool = tool::<CreateModelSet>(&sources);
        let params = tool
            .parse_params(&args(json!({"name": "dup"})), &Claims::new())
            .unwrap();

        let err = tool.invoke(&sources, &params, None).await.unwrap_err();
        assert!(err.to_string().starts_with("failed to create model set"));
        assert!(err.source().unwrap().to_string().contains("409"));
    }

    #[test]
    fn test_manifest_defaults_to_writable() {
        let sources = sources_with(MockLooker::new(), false);
        let tool = tool::<CreateModelSet>(&sources);
        let mcp = serde_json::to_value(tool.mcp_manifest()).unwrap();
        assert_eq!(mcp["annotations"]["readOnlyHint"], json!(false));
        assert_eq!(mcp["inputSchema"]["required"], json!(["name"]));
        assert_eq!(mcp["inputSchema"]["properties"]["models"]["type"], "array");
    }
}
