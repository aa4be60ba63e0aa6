use super::{permission_set_record, LookerOperation};
use crate::looker::{LookerApi, WritePermissionSet};
use crate::parameters::{ParamSpec, ParamValues};
use crate::tools::ToolOutput;
use crate::types::{Error, Result};
use async_trait::async_trait;
use tracing::debug;

/// `looker-create-permission-set`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreatePermissionSet;

#[async_trait]
impl LookerOperation for CreatePermissionSet {
    const KIND: &'static str = "looker-create-permission-set";
    const READ_ONLY: bool = false;

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::string("name", "The name of the permission set."),
            ParamSpec::array(
                "permissions",
                "List of permissions to include in the set.",
                ParamSpec::string("permission", "Permission name"),
            ),
        ]
    }

    async fn run(&self, client: &dyn LookerApi, params: &ParamValues) -> Result<ToolOutput> {
        let body = WritePermissionSet {
            name: params.get_str("name").map(str::to_string),
            permissions: params.get_string_list("permissions"),
        };
        debug!(name = ?body.name, permissions = ?body.permissions, "creating permission set");

        let set = client
            .create_permission_set(&body)
            .await
            .map_err(|e| Error::vendor("failed to create permission set", e))?;
        Ok(ToolOutput::Record(permission_set_record(set)))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::looker::PermissionSet;
    use crate::parameters::Claims;
    use serde_json::json;

    #[tokio::test]
    async fn test_creates_permission_set() {
        let mut client = MockLooker::new();
        client
            .expect_create_permission_set()
            .withf(|body| {
                body.name.as_deref() == Some("viewers")
                    && body.permissions
                        == Some(vec!["access_data".to_string(), "see_looks".to_string()])
            })
            .times(1)
            .returning(|body| {
                Ok(PermissionSet {
                    id: Some("12".to_string()),
                    name: body.name.clone(),
                    permissions: body.permissions.clone(),
                    all_access: Some(false),
                    built_in: None,
                })
            });

        let sources = sources_with(client, false);
        let tool = tool::<CreatePermissionSet>(&sources);
        let params = tool
            .parse_params(
                &args(json!({"name": "viewers", "permissions": ["access_data", "see_looks"]})),
                &Claims::new(),
            )
            .unwrap();

        let out = tool.invoke(&sources, &params, None).await.unwrap();
        assert_eq!(
            out.to_value(),
            json!({
                "id": "12",
                "name": "viewers",
                "permissions": ["access_data", "see_looks"],
                "all_access": false
            })
        );
    }

    #[test]
    fn test_permissions_required() {
        let sources = sources_with(MockLooker::new(), false);
        let tool = tool::<CreatePermissionSet>(&sources);
        let err = tool
            .parse_params(&args(json!({"name": "viewers"})), &Claims::new())
            .unwrap_err();
        assert!(matches!(err, Error::ParameterValidation { name, .. } if name == "permissions"));
    }

    #[test]
    fn test_permission_items_must_be_strings() {
        let sources = sources_with(MockLooker::new(), false);
        let tool = tool::<CreatePermissionSet>(&sources);
        let err = tool
            .parse_params(
                &args(json!({"name": "viewers", "permissions": ["access_data", 3]})),
                &Claims::new(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::ParameterValidation { name, .. } if name == "permissions"));
    }
}
