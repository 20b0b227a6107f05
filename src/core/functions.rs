//! Function calls the assistant may make during a call.
//!
//! The catalog currently holds a single function, `setup_schedule`, which
//! forwards the collected meeting details to the schedule webhook.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use thiserror::Error;
use tracing::info;

use super::codec::realtime::{ClientEvent, FunctionCallItem, ToolDef};
use super::webhook::{ScheduleRequest, ScheduleWebhook, WebhookError};

/// Output returned to the model after a successful `setup_schedule` call.
pub const SCHEDULE_CONFIRMATION: &str = "Your schedule has been set successfully!";

/// Errors raised while handling a function call.
#[derive(Debug, Error)]
pub enum FunctionError {
    /// Name is not in the catalog
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Argument string is not a flat JSON object of strings
    #[error("Invalid function arguments: {0}")]
    InvalidArguments(String),

    /// Side effect failed
    #[error(transparent)]
    Webhook(#[from] WebhookError),
}

/// Result type for function dispatch.
pub type FunctionResult<T> = Result<T, FunctionError>;

/// Functions the assistant is allowed to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    SetupSchedule,
}

impl Function {
    /// All functions advertised to the model.
    pub const ALL: &'static [Function] = &[Function::SetupSchedule];

    /// Name as advertised to the model.
    pub fn as_str(&self) -> &'static str {
        match self {
            Function::SetupSchedule => "setup_schedule",
        }
    }

    /// Look up a function by the name the model used.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.as_str() == name)
    }

    /// Tool definition sent with `session.update`.
    pub fn tool(&self) -> ToolDef {
        match self {
            Function::SetupSchedule => ToolDef::function(
                self.as_str(),
                "Setup business meeting schedule",
                json!({
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "Please tell me your name"
                        },
                        "email": {
                            "type": "string",
                            "format": "email",
                            "description": "please provide your email address"
                        },
                        "datetime": {
                            "type": "string",
                            "format": "date-time",
                            "description": "Please provide the date and time of the meeting"
                        },
                        "description": {
                            "type": "string",
                            "description": "what is the purpose of the meeting?"
                        }
                    },
                    "required": ["name", "email", "description"]
                }),
            ),
        }
    }
}

/// Tool definitions for every function in the catalog.
pub fn tool_definitions() -> Vec<ToolDef> {
    Function::ALL.iter().map(Function::tool).collect()
}

/// Parse the model's JSON-encoded argument string into a flat string map.
///
/// `null` values become empty strings; any other non-string value is an error.
pub fn parse_arguments(arguments: &str) -> FunctionResult<HashMap<String, String>> {
    let args: HashMap<String, Option<String>> = serde_json::from_str(arguments)
        .map_err(|e| FunctionError::InvalidArguments(e.to_string()))?;

    Ok(args
        .into_iter()
        .map(|(key, value)| (key, value.unwrap_or_default()))
        .collect())
}

/// Runs function calls and produces the events that complete them.
pub struct FunctionDispatcher {
    webhook: Arc<dyn ScheduleWebhook>,
}

impl FunctionDispatcher {
    pub fn new(webhook: Arc<dyn ScheduleWebhook>) -> Self {
        Self { webhook }
    }

    /// Handle one function call for the caller at `phone_number`.
    ///
    /// On success returns the `function_call_output` item followed by
    /// `response.create`, to be written to the realtime socket in order.
    /// On failure nothing should be sent.
    pub async fn dispatch(
        &self,
        call: &FunctionCallItem,
        phone_number: &str,
    ) -> FunctionResult<Vec<ClientEvent>> {
        let function = Function::from_name(&call.name)
            .ok_or_else(|| FunctionError::UnknownFunction(call.name.clone()))?;

        match function {
            Function::SetupSchedule => self.setup_schedule(call, phone_number).await,
        }
    }

    async fn setup_schedule(
        &self,
        call: &FunctionCallItem,
        phone_number: &str,
    ) -> FunctionResult<Vec<ClientEvent>> {
        let mut args = parse_arguments(&call.arguments)?;
        let mut take = |key: &str| args.remove(key).unwrap_or_default();

        let request = ScheduleRequest {
            name: take("name"),
            email: take("email"),
            datetime: take("datetime"),
            description: take("description"),
            phone_number: phone_number.to_string(),
        };

        self.webhook.setup_schedule(&request).await?;

        info!(call_id = %call.call_id, "Schedule set up");

        Ok(vec![
            ClientEvent::function_call_output(&call.call_id, SCHEDULE_CONFIRMATION),
            ClientEvent::ResponseCreate,
        ])
    }
}
