//! Tool Registry — the two side-effecting tools the model may call.
//!
//! Lookup is an explicit name → `ToolKind` match built at startup; a name the
//! model invents resolves to `None` and the engine answers it with `{}`.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::notifier::Notifier;

pub mod spec;

pub use spec::ToolSpec;

pub const RECORD_USER_DETAILS: &str = "record_user_details";
pub const RECORD_UNKNOWN_QUESTION: &str = "record_unknown_question";

/// Tagged handler variant for each registered tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    RecordUserDetails,
    RecordUnknownQuestion,
}

impl ToolKind {
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::RecordUserDetails => RECORD_USER_DETAILS,
            ToolKind::RecordUnknownQuestion => RECORD_UNKNOWN_QUESTION,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UserDetailsArgs {
    pub email: String,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_notes")]
    pub notes: String,
}

fn default_name() -> String {
    "Name not provided".to_string()
}

fn default_notes() -> String {
    "not provided".to_string()
}

#[derive(Debug, Deserialize)]
pub struct UnknownQuestionArgs {
    pub question: String,
}

/// Acknowledgement returned by every known tool, regardless of delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub recorded: &'static str,
}

impl ToolResult {
    pub fn ok() -> Self {
        Self { recorded: "ok" }
    }
}

impl From<ToolResult> for Value {
    fn from(result: ToolResult) -> Self {
        json!({ "recorded": result.recorded })
    }
}

pub struct ToolRegistry {
    notifier: Arc<dyn Notifier>,
    specs: Vec<ToolSpec>,
}

impl ToolRegistry {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            specs: vec![spec::record_user_details(), spec::record_unknown_question()],
        }
    }

    pub fn resolve(&self, name: &str) -> Option<ToolKind> {
        match name {
            RECORD_USER_DETAILS => Some(ToolKind::RecordUserDetails),
            RECORD_UNKNOWN_QUESTION => Some(ToolKind::RecordUnknownQuestion),
            _ => None,
        }
    }

    /// Tool declarations advertised to the model, in a stable order.
    pub fn describe(&self) -> &[ToolSpec] {
        &self.specs
    }

    /// Runs `kind` with its JSON-encoded arguments.
    /// Only malformed arguments fail; delivery problems are logged and ignored.
    pub async fn invoke(
        &self,
        kind: ToolKind,
        arguments: &str,
    ) -> Result<ToolResult, serde_json::Error> {
        let arguments = if arguments.trim().is_empty() {
            "{}"
        } else {
            arguments
        };
        match kind {
            ToolKind::RecordUserDetails => {
                let args: UserDetailsArgs = serde_json::from_str(arguments)?;
                Ok(self.record_user_details(args).await)
            }
            ToolKind::RecordUnknownQuestion => {
                let args: UnknownQuestionArgs = serde_json::from_str(arguments)?;
                Ok(self.record_unknown_question(args).await)
            }
        }
    }

    pub async fn record_user_details(&self, args: UserDetailsArgs) -> ToolResult {
        self.push(&format!(
            "Recording {} with email {} and notes {}",
            args.name, args.email, args.notes
        ))
        .await;
        ToolResult::ok()
    }

    pub async fn record_unknown_question(&self, args: UnknownQuestionArgs) -> ToolResult {
        self.push(&format!("Recording {}", args.question)).await;
        ToolResult::ok()
    }

    async fn push(&self, message: &str) {
        if let Err(e) = self.notifier.push(message).await {
            warn!("Notification delivery failed: {e}");
        }
    }
}

/// Tool-result payload for a name that is not registered.
pub fn empty_result() -> Value {
    json!({})
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingNotifier;
    use super::*;

    fn registry() -> (Arc<RecordingNotifier>, ToolRegistry) {
        let notifier = Arc::new(RecordingNotifier::default());
        (notifier.clone(), ToolRegistry::new(notifier))
    }

    #[test]
    fn test_resolve_known_and_unknown_names() {
        let (_, registry) = registry();
        assert_eq!(
            registry.resolve("record_user_details"),
            Some(ToolKind::RecordUserDetails)
        );
        assert_eq!(
            registry.resolve("record_unknown_question"),
            Some(ToolKind::RecordUnknownQuestion)
        );
        assert_eq!(registry.resolve("delete_everything"), None);
        assert_eq!(registry.resolve("Record_User_Details"), None);
    }

    #[test]
    fn test_describe_order_matches_kinds() {
        let (_, registry) = registry();
        let names: Vec<_> = registry.describe().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                ToolKind::RecordUserDetails.name(),
                ToolKind::RecordUnknownQuestion.name()
            ]
        );
    }

    #[tokio::test]
    async fn test_user_details_fills_defaults() {
        let (notifier, registry) = registry();
        let result = registry
            .invoke(ToolKind::RecordUserDetails, r#"{"email":"a@b.com"}"#)
            .await
            .unwrap();

        assert_eq!(result, ToolResult::ok());
        assert_eq!(
            notifier.messages(),
            vec!["Recording Name not provided with email a@b.com and notes not provided"]
        );
    }

    #[tokio::test]
    async fn test_user_details_uses_supplied_fields() {
        let (notifier, registry) = registry();
        registry
            .invoke(
                ToolKind::RecordUserDetails,
                r#"{"email":"jo@x.io","name":"Jo","notes":"hiring for Rust"}"#,
            )
            .await
            .unwrap();

        assert_eq!(
            notifier.messages(),
            vec!["Recording Jo with email jo@x.io and notes hiring for Rust"]
        );
    }

    #[tokio::test]
    async fn test_unknown_question_pushes_question() {
        let (notifier, registry) = registry();
        registry
            .invoke(
                ToolKind::RecordUnknownQuestion,
                r#"{"question":"What is your favourite colour?"}"#,
            )
            .await
            .unwrap();

        assert_eq!(
            notifier.messages(),
            vec!["Recording What is your favourite colour?"]
        );
    }

    #[tokio::test]
    async fn test_delivery_failure_still_acknowledges() {
        let notifier = Arc::new(RecordingNotifier::failing());
        let registry = ToolRegistry::new(notifier.clone());

        let result = registry
            .invoke(ToolKind::RecordUnknownQuestion, r#"{"question":"q"}"#)
            .await
            .unwrap();

        assert_eq!(result, ToolResult::ok());
        assert_eq!(notifier.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_required_argument_is_an_error() {
        let (notifier, registry) = registry();
        let err = registry
            .invoke(ToolKind::RecordUserDetails, r#"{"name":"Jo"}"#)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("email"));
        assert!(notifier.messages().is_empty());
    }

    #[test]
    fn test_acknowledgement_shape() {
        assert_eq!(Value::from(ToolResult::ok()), json!({"recorded": "ok"}));
        assert_eq!(empty_result(), json!({}));
    }
}
