use super::{permission_set_record, search, search_query, LookerOperation};
use crate::looker::{LookerApi, PermissionSet};
use crate::parameters::{ParamSpec, ParamValues};
use crate::tools::ToolOutput;
use crate::types::Result;
use async_trait::async_trait;

const FIELDS: &str = "id,name,permissions,all_access";

/// `looker-search-permission-sets`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchPermissionSets;

#[async_trait]
impl LookerOperation for SearchPermissionSets {
    const KIND: &'static str = "looker-search-permission-sets";
    const READ_ONLY: bool = true;

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::string("name", "The name of the permission set.").optional(),
            ParamSpec::int("id", "The unique id of the permission set.").optional(),
            ParamSpec::string("permission", "Filter the permission sets by permission.").optional(),
            ParamSpec::int("limit", "The number of permission sets to fetch. Default is 100")
                .with_default(100),
            ParamSpec::int(
                "offset",
                "The number of permission sets to skip before fetching. Default 0",
            )
            .with_default(0),
        ]
    }

    async fn run(&self, client: &dyn LookerApi, params: &ParamValues) -> Result<ToolOutput> {
        let query = search_query(FIELDS, params, &["name", "permission"]);
        let sets: Vec<PermissionSet> = search(
            client,
            "/permission_sets/search",
            &query,
            "error calling custom search permission sets",
        )
        .await?;
        Ok(ToolOutput::Records(
            sets.into_iter().map(permission_set_record).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::looker::QueryParams;
    use crate::parameters::Claims;
    use crate::types::Error;
    use serde_json::json;

    fn expected_query(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_search_with_defaults_and_filters() {
        let want = expected_query(&[
            ("fields", FIELDS),
            ("id", "5"),
            ("permission", "access_data"),
            ("limit", "100"),
            ("offset", "0"),
        ]);

        let mut client = MockLooker::new();
        client
            .expect_call()
            .withf(move |method, version, path, query| {
                method.as_str() == "GET"
                    && version.to_string() == "/4.0"
                    && path.to_string() == "/permission_sets/search"
                    && *query == want
            })
            .times(1)
            .returning(|_, _, _, _| {
                Ok(json!([
                    {"id": "5", "name": "Admin", "permissions": ["access_data"], "all_access": true, "built_in": true}
                ]))
            });

        let sources = sources_with(client, false);
        let tool = tool::<SearchPermissionSets>(&sources);
        let params = tool
            .parse_params(
                &args(json!({"name": "", "id": 5, "permission": "access_data"})),
                &Claims::new(),
            )
            .unwrap();

        let out = tool.invoke(&sources, &params, None).await.unwrap();
        assert_eq!(
            out.to_value(),
            json!([{"id": "5", "name": "Admin", "permissions": ["access_data"], "all_access": true}])
        );
    }

    #[tokio::test]
    async fn test_undecodable_rows_are_vendor_error() {
        let mut client = MockLooker::new();
        client
            .expect_call()
            .returning(|_, _, _, _| Ok(json!({"message": "not a list"})));

        let sources = sources_with(client, false);
        let tool = tool::<SearchPermissionSets>(&sources);
        let params = tool.parse_params(&args(json!({})), &Claims::new()).unwrap();

        let err = tool.invoke(&sources, &params, None).await.unwrap_err();
        assert!(matches!(err, Error::VendorCall { .. }));
        assert!(err.to_string().contains("search permission sets"));
    }

    #[test]
    fn test_id_must_be_integer() {
        let sources = sources_with(MockLooker::new(), false);
        let tool = tool::<SearchPermissionSets>(&sources);
        let err = tool
            .parse_params(&args(json!({"id": "five"})), &Claims::new())
            .unwrap_err();
        assert!(matches!(err, Error::ParameterValidation { name, .. } if name == "id"));
    }
}
