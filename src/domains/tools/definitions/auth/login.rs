//! Login tool definition.
//!
//! Authenticates the shared session with TIDAL through the OAuth device flow.

use futures::FutureExt;
use rmcp::{
    handler::server::tool::{ToolCallContext, ToolRoute, schema_for_type},
    model::{Tool, ToolAnnotations},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::domains::tidal::{LoginOutcome, SessionManager, TidalError};
use crate::domains::tools::ToolError;
use crate::domains::tools::definitions::common::{into_call_result, parse_params};
use crate::domains::tools::definitions::schemas::{AuthResult, Status};

// ============================================================================
// Tool Parameters
// ============================================================================

/// The login tool takes no arguments.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct LoginParams {}

// ============================================================================
// Tool Definition
// ============================================================================

/// Login tool - runs the browser login unless a valid session exists.
pub struct LoginTool;

impl LoginTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "login";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Authenticate with TIDAL using OAuth browser flow. Opens browser automatically for secure login. Returns immediately if already authenticated.";

    /// Log in, or report that the session is already valid.
    #[instrument(skip_all)]
    pub async fn execute(
        _params: &LoginParams,
        session: &SessionManager,
    ) -> Result<AuthResult, ToolError> {
        info!("Login tool called");

        let message = match session.login().await {
            Ok(LoginOutcome::AlreadyAuthenticated) => "Already authenticated with TIDAL",
            Ok(LoginOutcome::Authenticated) => "Successfully authenticated with TIDAL",
            Err(TidalError::LoginTimeout(secs)) => return Err(ToolError::LoginTimeout(secs)),
            Err(e @ TidalError::LoginIncomplete) => {
                return Err(ToolError::AuthenticationFailed(e.to_string()));
            }
            Err(e) => return Err(ToolError::upstream("Authentication error")(e)),
        };

        Ok(AuthResult {
            status: Status::Success,
            message: message.to_string(),
            authenticated: true,
        })
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<LoginParams>().into(),
            annotations: Some(ToolAnnotations {
                title: Some("Authenticate with TIDAL".to_string()),
                read_only_hint: Some(false),
                destructive_hint: Some(false),
                idempotent_hint: Some(false),
                open_world_hint: Some(true),
            }),
            output_schema: Some(schema_for_type::<AuthResult>().into()),
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Create a ToolRoute for STDIO/TCP transport.
    pub fn create_route<S>(session: Arc<SessionManager>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let arguments = ctx.arguments.clone();
            let session = session.clone();
            async move {
                let params: LoginParams = parse_params(arguments)?;
                Ok(into_call_result(
                    Self::NAME,
                    Self::execute(&params, &session).await,
                ))
            }
            .boxed()
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
