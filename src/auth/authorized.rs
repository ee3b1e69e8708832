//! Wraps a tool so it only runs after the user approved it out of band.

use async_trait::async_trait;
use serde_json::Value;

use super::ciba::{sanitize_binding_message, AuthorizationRequest, CibaClient};
use crate::tools::{Tool, ToolContext, ToolError};

/// Scopes requested for purchases.
pub const CHECKOUT_SCOPES: &[&str] = &["openid", "checkout:buy"];

const NOT_CONFIGURED: &str = "Checkout authorization is not configured";
const NO_USER: &str = "A logged-in user is required to authorize this action";

/// A tool whose calls need the user's confirmation.
#[async_trait]
pub trait AuthorizedTool: Tool {
    /// The text shown on the user's approving device for this call, or
    /// `None` when the call needs no authorization (the inner tool then runs
    /// without credentials).
    async fn binding_message(
        &self,
        ctx: &ToolContext,
        args: &Value,
    ) -> Result<Option<String>, ToolError>;
}

/// A tool gated behind a backchannel authorization request.
pub struct AsyncAuthorized<T> {
    inner: T,
    ciba: Option<CibaClient>,
    scopes: Vec<String>,
}

/// Gates `inner` behind a CIBA confirmation. With `ciba` unset every call
/// that needs authorization is denied.
pub fn with_async_authorization<T: AuthorizedTool>(
    inner: T,
    ciba: Option<CibaClient>,
) -> AsyncAuthorized<T> {
    AsyncAuthorized {
        inner,
        ciba,
        scopes: CHECKOUT_SCOPES.iter().map(|s| s.to_string()).collect(),
    }
}

impl<T: AuthorizedTool> AsyncAuthorized<T> {
    #[cfg(test)]
    fn inner(&self) -> &T {
        &self.inner
    }

    /// Records the denial and hands its message back as the tool result.
    fn unauthorized(&self, ctx: &ToolContext, message: String) -> String {
        tracing::warn!(tool = self.inner.name(), %message, "authorization failed");
        ctx.authorization.deny(message.clone());
        message
    }
}

#[async_trait]
impl<T: AuthorizedTool> Tool for AsyncAuthorized<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn parameters(&self) -> Value {
        self.inner.parameters()
    }

    async fn execute(&self, ctx: &ToolContext, args: Value) -> Result<String, ToolError> {
        if ctx.credentials.is_some() {
            return self.inner.execute(ctx, args).await;
        }

        let Some(message) = self.inner.binding_message(ctx, &args).await? else {
            return self.inner.execute(ctx, args).await;
        };
        let binding_message = sanitize_binding_message(&message);
        ctx.authorization.request(binding_message.clone());

        if ctx.user_id.is_empty() {
            return Ok(self.unauthorized(ctx, NO_USER.to_string()));
        }
        let Some(ciba) = &self.ciba else {
            return Ok(self.unauthorized(ctx, NOT_CONFIGURED.to_string()));
        };

        let request = AuthorizationRequest {
            user_id: ctx.user_id.clone(),
            binding_message,
            scopes: self.scopes.clone(),
        };

        match ciba
            .request_and_wait(&request, || ctx.authorization.mark_pending())
            .await
        {
            Ok(credentials) => {
                let ctx = ctx.with_credentials(credentials);
                self.inner.execute(&ctx, args).await
            }
            Err(e) => Ok(self.unauthorized(ctx, e.to_string())),
        }
    }
}
