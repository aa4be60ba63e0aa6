//! Invocation pipeline: bind, embed, invoke.

use super::{AccessToken, Tool, ToolOutput};
use crate::parameters::{Claims, EmbeddingModels};
use crate::sources::SourceRegistry;
use crate::types::{Error, InvocationId, Result};
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, warn, Instrument};

/// Everything the host hands over for one call.
#[derive(Debug, Clone, Default)]
pub struct InvocationRequest {
    pub args: Map<String, Value>,
    /// Verified claims keyed by auth service name.
    pub claims: Claims,
    /// Raw value of the tool's auth token header, if the caller sent one.
    pub access_token: Option<AccessToken>,
}

impl InvocationRequest {
    pub fn new(args: Map<String, Value>) -> Self {
        Self {
            args,
            ..Self::default()
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(AccessToken::new(token));
        self
    }

    pub fn with_claims(mut self, claims: Claims) -> Self {
        self.claims = claims;
        self
    }
}

/// Run one invocation end to end.
///
/// Cancelling `cancel` abandons the pending vendor call; nothing is retried.
pub async fn invoke_tool(
    tool: &dyn Tool,
    sources: &SourceRegistry,
    models: &EmbeddingModels,
    request: &InvocationRequest,
    cancel: &CancellationToken,
) -> Result<ToolOutput> {
    let invocation_id = InvocationId::new();
    let span = info_span!(
        "tool_invoke",
        tool = %tool.name(),
        kind = %tool.kind(),
        invocation_id = %invocation_id,
    );

    async move {
        let params = tool.parse_params(&request.args, &request.claims)?;
        let params = tool.embed_params(params, models).await?;

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::cancelled(format!("invocation of {} cancelled", tool.name()))),
            result = tool.invoke(sources, &params, request.access_token.as_ref()) => result,
        };

        match &result {
            Ok(_) => debug!("tool invocation succeeded"),
            Err(err) => warn!(error = %err, "tool invocation failed"),
        }
        result
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::looker::{LookerError, ModelSet};
    use crate::tools::looker::testing::{args, sources_with, tool, MockLooker};
    use crate::tools::looker::CreateModelSet;
    use serde_json::json;
    use tracing_test::traced_test;

    #[tokio::test]
    async fn test_invoke_binds_then_calls() {
        let mut client = MockLooker::new();
        client
            .expect_create_model_set()
            .times(1)
            .returning(|_| Ok(ModelSet::default()));
        let sources = sources_with(client, false);
        let tool = tool::<CreateModelSet>(&sources);

        let request = InvocationRequest::new(args(json!({"name": "m"})));
        let out = invoke_tool(
            tool.as_ref(),
            &sources,
            &EmbeddingModels::new(),
            &request,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(out.to_value(), json!({}));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_failures_are_logged_in_invocation_span() {
        let mut client = MockLooker::new();
        client
            .expect_create_model_set()
            .returning(|_| Err(LookerError::Login("expired".to_string())));
        let sources = sources_with(client, false);
        let tool = tool::<CreateModelSet>(&sources);

        let request = InvocationRequest::new(args(json!({"name": "m"})));
        let err = invoke_tool(
            tool.as_ref(),
            &sources,
            &EmbeddingModels::new(),
            &request,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::VendorCall { .. }));
        assert!(logs_contain("tool invocation failed"));
        assert!(logs_contain("tool_invoke"));
    }

    #[tokio::test]
    async fn test_cancel_wins_over_pending_call() {
        let mut client = MockLooker::new();
        client.expect_create_model_set().never();
        let sources = sources_with(client, false);
        let tool = tool::<CreateModelSet>(&sources);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let request = InvocationRequest::new(args(json!({"name": "m"})));
        let err = invoke_tool(tool.as_ref(), &sources, &EmbeddingModels::new(), &request, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled(_)));
    }

    #[tokio::test]
    async fn test_parameter_error_skips_vendor() {
        let mut client = MockLooker::new();
        client.expect_create_model_set().never();
        let sources = sources_with(client, false);
        let tool = tool::<CreateModelSet>(&sources);

        let request = InvocationRequest::new(args(json!({"name": 5})));
        let err = invoke_tool(
            tool.as_ref(),
            &sources,
            &EmbeddingModels::new(),
            &request,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::ParameterValidation { .. }));
    }
}
