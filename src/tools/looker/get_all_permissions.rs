use super::LookerOperation;
use crate::looker::LookerApi;
use crate::parameters::{ParamSpec, ParamValues};
use crate::tools::{RecordBuilder, ToolOutput};
use crate::types::{Error, Result};
use async_trait::async_trait;
use tracing::debug;

/// `looker-get-all-permissions`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetAllPermissions;

#[async_trait]
impl LookerOperation for GetAllPermissions {
    const KIND: &'static str = "looker-get-all-permissions";
    const READ_ONLY: bool = true;

    fn parameters(&self) -> Vec<ParamSpec> {
        Vec::new()
    }

    async fn run(&self, client: &dyn LookerApi, _params: &ParamValues) -> Result<ToolOutput> {
        debug!("listing all permissions");
        let permissions = client
            .all_permissions()
            .await
            .map_err(|e| Error::vendor("failed to get all permissions", e))?;

        let records = permissions
            .into_iter()
            .map(|p| {
                RecordBuilder::new()
                    .field("permission", p.permission)
                    .field("parent", p.parent)
                    .field("description", p.description)
                    .build()
            })
            .collect();
        Ok(ToolOutput::Records(records))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::looker::{LookerError, Permission};
    use crate::parameters::Claims;
    use serde_json::json;
    use tracing_test::traced_test;

    #[tokio::test]
    #[traced_test]
    async fn test_lists_permissions() {
        let mut client = MockLooker::new();
        client.expect_all_permissions().times(1).returning(|| {
            Ok(vec![
                Permission {
                    permission: Some("access_data".to_string()),
                    parent: None,
                    description: Some("Access data".to_string()),
                },
                Permission {
                    permission: Some("see_looks".to_string()),
                    parent: Some("access_data".to_string()),
                    description: None,
                },
            ])
        });

        let sources = sources_with(client, false);
        let tool = tool::<GetAllPermissions>(&sources);
        let params = tool.parse_params(&args(json!({})), &Claims::new()).unwrap();
        assert!(params.is_empty());

        let out = tool.invoke(&sources, &params, None).await.unwrap();
        assert_eq!(
            out.to_value(),
            json!([
                {"permission": "access_data", "description": "Access data"},
                {"permission": "see_looks", "parent": "access_data"}
            ])
        );
        assert!(logs_contain("listing all permissions"));
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let mut client = MockLooker::new();
        client.expect_all_permissions().times(1).returning(|| Ok(Vec::new()));

        let sources = sources_with(client, false);
        let tool = tool::<GetAllPermissions>(&sources);
        let out = tool
            .invoke(&sources, &Default::default(), None)
            .await
            .unwrap();
        assert_eq!(out.to_value(), json!([]));
    }

    #[tokio::test]
    async fn test_vendor_failure() {
        let mut client = MockLooker::new();
        client
            .expect_all_permissions()
            .returning(|| Err(LookerError::Login("expired".to_string())));

        let sources = sources_with(client, false);
        let tool = tool::<GetAllPermissions>(&sources);
        let err = tool
            .invoke(&sources, &Default::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::VendorCall { ref operation, .. } if operation == "failed to get all permissions"));
    }

    #[test]
    fn test_read_only_manifest() {
        let sources = sources_with(MockLooker::new(), false);
        let tool = tool::<GetAllPermissions>(&sources);
        let mcp = serde_json::to_value(tool.mcp_manifest()).unwrap();
        assert_eq!(mcp["annotations"]["readOnlyHint"], json!(true));
        assert_eq!(mcp["inputSchema"], json!({"type": "object", "properties": {}, "required": []}));
        assert!(tool.manifest().parameters.is_empty());
    }
}
