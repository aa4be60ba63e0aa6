use super::LookerOperation;
use crate::looker::{LookerApi, Role, WriteRole};
use crate::parameters::{ParamSpec, ParamValues};
use crate::tools::{RecordBuilder, ToolOutput};
use crate::types::{Error, Result};
use async_trait::async_trait;
use tracing::debug;

/// `looker-create-role`: bind a permission set and a model set under a new role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateRole;

#[async_trait]
impl LookerOperation for CreateRole {
    const KIND: &'static str = "looker-create-role";
    const READ_ONLY: bool = false;

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::string("name", "The name of the role."),
            ParamSpec::string("permission_set_id", "The id of the permission set."),
            ParamSpec::string("model_set_id", "The id of the model set."),
        ]
    }

    async fn run(&self, client: &dyn LookerApi, params: &ParamValues) -> Result<ToolOutput> {
        let body = WriteRole {
            name: params.get_str("name").map(str::to_string),
            permission_set_id: params.get_str("permission_set_id").map(str::to_string),
            model_set_id: params.get_str("model_set_id").map(str::to_string),
        };
        debug!(?body, "creating role");

        let role = client
            .create_role(&body)
            .await
            .map_err(|e| Error::vendor("failed to create role", e))?;
        Ok(ToolOutput::Record(role_record(role)))
    }
}

fn role_record(role: Role) -> crate::tools::Record {
    RecordBuilder::new()
        .field("id", role.id)
        .field("name", role.name)
        .field("permission_set_id", role.permission_set_id)
        .field("model_set_id", role.model_set_id)
        .build()
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::parameters::Claims;
    use serde_json::json;

    #[tokio::test]
    async fn test_creates_role() {
        let mut client = MockLooker::new();
        client
            .expect_create_role()
            .withf(|body| {
                *body
                    == WriteRole {
                        name: Some("analyst".to_string()),
                        permission_set_id: Some("3".to_string()),
                        model_set_id: Some("4".to_string()),
                    }
            })
            .times(1)
            .returning(|_| {
                Ok(Role {
                    id: Some("9".to_string()),
                    name: Some("analyst".to_string()),
                    permission_set_id: Some("3".to_string()),
                    model_set_id: Some("4".to_string()),
                    ..Role::default()
                })
            });

        let sources = sources_with(client, false);
        let tool = tool::<CreateRole>(&sources);
        let params = tool
            .parse_params(
                &args(json!({"name": "analyst", "permission_set_id": "3", "model_set_id": "4"})),
                &Claims::new(),
            )
            .unwrap();

        let out = tool.invoke(&sources, &params, None).await.unwrap();
        assert_eq!(
            out.to_value(),
            json!({
                "id": "9",
                "name": "analyst",
                "permission_set_id": "3",
                "model_set_id": "4"
            })
        );
    }

    #[test]
    fn test_all_parameters_required() {
        let sources = sources_with(MockLooker::new(), false);
        let tool = tool::<CreateRole>(&sources);
        let err = tool
            .parse_params(&args(json!({"name": "analyst", "permission_set_id": "3"})), &Claims::new())
            .unwrap_err();
        assert!(matches!(err, Error::ParameterValidation { name, .. } if name == "model_set_id"));
    }
}
