use super::{search, search_query, LookerOperation};
use crate::looker::{LookerApi, Role};
use crate::parameters::{ParamSpec, ParamValues};
use crate::tools::{Record, RecordBuilder, ToolOutput};
use crate::types::Result;
use async_trait::async_trait;

const FIELDS: &str = "id,name,permission_set,model_set";

/// `looker-search-roles`: roles flattened with their permission and model sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchRoles;

#[async_trait]
impl LookerOperation for SearchRoles {
    const KIND: &'static str = "looker-search-roles";
    const READ_ONLY: bool = true;

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::string("name", "The name of the role.").optional(),
            ParamSpec::int("id", "The unique id of the role.").optional(),
            ParamSpec::string(
                "permission_set_name",
                "The name of the permission set to filter by.",
            )
            .optional(),
            ParamSpec::string("model_set_name", "The name of the model set to filter by.")
                .optional(),
            ParamSpec::int("limit", "The number of roles to fetch. Default is 100").with_default(100),
            ParamSpec::int("offset", "The number of roles to skip before fetching. Default 0")
                .with_default(0),
        ]
    }

    async fn run(&self, client: &dyn LookerApi, params: &ParamValues) -> Result<ToolOutput> {
        let query = search_query(
            FIELDS,
            params,
            &["name", "permission_set_name", "model_set_name"],
        );
        let roles: Vec<Role> = search(
            client,
            "/roles/search",
            &query,
            "error calling custom search roles",
        )
        .await?;
        Ok(ToolOutput::Records(roles.into_iter().map(role_record).collect()))
    }
}

fn role_record(role: Role) -> Record {
    let (permission_set_name, permissions) = role
        .permission_set
        .map(|s| (s.name, s.permissions))
        .unwrap_or_default();
    let (model_set_name, models) = role
        .model_set
        .map(|s| (s.name, s.models))
        .unwrap_or_default();

    RecordBuilder::new()
        .field("id", role.id)
        .field("name", role.name)
        .field("permission_set_name", permission_set_name)
        .field("permissions", permissions)
        .field("model_set_name", model_set_name)
        .field("models", models)
        .build()
}
