// Client creation with custom user-agent support for kube 2.x
use crate::error::Result as KwResult;
use hyper::http::{HeaderName, HeaderValue};
use kube::{Client, Config};
use tracing::warn;

/// Set a custom user-agent header on a kube `Config`. Invalid header values
/// are logged and skipped, keeping the default agent.
pub fn add_user_agent_header(config: &mut Config, custom_user_agent: Option<&str>) {
    if let Some(user_agent) = custom_user_agent {
        if let Ok(header_value) = HeaderValue::from_str(user_agent) {
            config
                .headers
                .push((HeaderName::from_static("user-agent"), header_value));
        } else {
            warn!("invalid user-agent {user_agent:?}, keeping default");
        }
    }
}

/// Create a new k8s client to interact with the k8s cluster api.
///
/// Waiters do not construct clients themselves; callers build one here (or
/// bring their own) and hand `Api` handles to the typed waiters.
///
/// # Errors
///
/// Will return `Err` if a configuration cannot be inferred from the
/// environment or the client cannot be constructed from it.
pub async fn new(custom_user_agent: Option<&str>) -> KwResult<Client> {
    let mut config = Config::infer().await?;

    // Helps identify waiter API calls in apiserver audit logs
    let user_agent = custom_user_agent.unwrap_or(crate::USER_AGENT);
    add_user_agent_header(&mut config, Some(user_agent));

    let client = Client::try_from(config)?;

    Ok(client)
}
