//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use looker_toolbox::looker::{
    ApiSettings, LookerApi, LookerError, Method, ModelSet, Permission, PermissionSet,
    QueryParams, Role, WriteModelSet, WritePermissionSet, WriteRole,
};
use looker_toolbox::sources::LookerSource;
use looker_toolbox::SourceRegistry;
use mockall::mock;
use serde_json::{Map, Value};
use std::sync::Arc;

mock! {
    pub Looker {}

    #[async_trait]
    impl LookerApi for Looker {
        async fn create_model_set(&self, body: &WriteModelSet) -> Result<ModelSet, LookerError>;
        async fn create_permission_set(&self, body: &WritePermissionSet) -> Result<PermissionSet, LookerError>;
        async fn create_role(&self, body: &WriteRole) -> Result<Role, LookerError>;
        async fn all_permissions(&self) -> Result<Vec<Permission>, LookerError>;
        async fn call(
            &self,
            method: Method,
            api_version: &str,
            path: &str,
            query: &QueryParams,
        ) -> Result<Value, LookerError>;
        fn with_bearer_token(&self, token: &str) -> Arc<dyn LookerApi>;
    }
}

/// Source registry holding one Looker source `s` backed by `client`.
pub fn looker_sources(client: MockLooker, use_client_oauth: bool) -> SourceRegistry {
    let mut sources = SourceRegistry::new();
    sources.insert(
        "s",
        Arc::new(LookerSource::new(
            "s",
            ApiSettings::new("https://looker.test"),
            use_client_oauth,
            "Authorization",
            Arc::new(client),
        )),
    );
    sources
}

pub fn args(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}
