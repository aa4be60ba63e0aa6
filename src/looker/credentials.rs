//! Per-call credential selection.

use super::{ApiSettings, LookerApi};
use crate::tools::AccessToken;
use crate::types::{Error, Result};
use std::sync::Arc;
use tracing::debug;

/// Pick the client for one invocation.
///
/// With caller credentials, `access_token` must be a `Bearer <token>` header
/// value and a per-call client is derived from `client`. Otherwise `client` is
/// the shared service client and is returned unchanged.
pub fn get_client(
    use_client_oauth: bool,
    settings: &ApiSettings,
    client: &Arc<dyn LookerApi>,
    access_token: Option<&AccessToken>,
) -> Result<Arc<dyn LookerApi>> {
    if !use_client_oauth {
        return Ok(Arc::clone(client));
    }

    let token = access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::missing_credential("no access token supplied with request"))?;
    let bearer = token.parse_bearer_token()?;
    debug!(base_url = %settings.base_url, "using caller credentials for looker call");
    Ok(client.with_bearer_token(bearer))
}
