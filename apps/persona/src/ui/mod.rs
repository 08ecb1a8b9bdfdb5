//! UI Adapter — bridges the chat widget and the conversation engine.
//!
//! The widget keeps the transcript client-side and replays it on every
//! submission; the server never stores it.

use serde::{Deserialize, Serialize};

use crate::chat::ChatEngine;
use crate::llm_client::types::ChatMessage;

pub mod handlers;

/// Roles the widget is allowed to replay. System and tool messages are
/// produced server-side only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetRole {
    User,
    Assistant,
}

/// One transcript row as rendered by the widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: WidgetRole,
    pub content: String,
}

impl HistoryEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: WidgetRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: WidgetRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<&HistoryEntry> for ChatMessage {
    fn from(entry: &HistoryEntry) -> Self {
        match entry.role {
            WidgetRole::User => ChatMessage::user(entry.content.clone()),
            WidgetRole::Assistant => ChatMessage::assistant(entry.content.clone()),
        }
    }
}

/// Handles one submission. Returns the extended history and the new value of
/// the input box (always cleared).
///
/// A blank message is a no-op: the history comes back untouched and the
/// engine is not called.
pub async fn respond(
    engine: &ChatEngine,
    message: &str,
    mut history: Vec<HistoryEntry>,
) -> (Vec<HistoryEntry>, String) {
    if message.trim().is_empty() {
        return (history, String::new());
    }

    let messages: Vec<ChatMessage> = history.iter().map(ChatMessage::from).collect();
    let reply = engine.chat(message, &messages).await;

    history.push(HistoryEntry::user(message));
    history.push(HistoryEntry::assistant(reply));
    (history, String::new())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::chat::testing::{text_reply, ScriptedModel};
    use crate::chat::ChatLimits;
    use crate::notifier::DisabledNotifier;
    use crate::persona::Persona;
    use crate::tools::ToolRegistry;

    fn engine(model: Arc<ScriptedModel>) -> ChatEngine {
        ChatEngine::new(
            model,
            ToolRegistry::new(Arc::new(DisabledNotifier)),
            Persona {
                name: "Ada".to_string(),
                summary: String::new(),
                profile: String::new(),
            },
            "ada@example.com".to_string(),
            ChatLimits::default(),
        )
    }

    #[tokio::test]
    async fn test_empty_message_is_a_no_op() {
        let model = Arc::new(ScriptedModel::new(vec![text_reply("unused")]));
        let engine = engine(model.clone());
        let history = vec![HistoryEntry::user("hi"), HistoryEntry::assistant("hello")];

        let (returned, input) = respond(&engine, "", history.clone()).await;
        assert_eq!(returned, history);
        assert_eq!(input, "");

        let (returned, _) = respond(&engine, "  \n", history.clone()).await;
        assert_eq!(returned, history);
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_respond_appends_exchange_and_clears_input() {
        let model = Arc::new(ScriptedModel::new(vec![text_reply("I build compilers.")]));
        let engine = engine(model.clone());
        let history = vec![HistoryEntry::user("hi"), HistoryEntry::assistant("hello")];

        let (returned, input) = respond(&engine, "What do you do?", history).await;

        assert_eq!(input, "");
        assert_eq!(
            returned,
            vec![
                HistoryEntry::user("hi"),
                HistoryEntry::assistant("hello"),
                HistoryEntry::user("What do you do?"),
                HistoryEntry::assistant("I build compilers."),
            ]
        );

        let sent = model.request(0);
        assert_eq!(sent[1], ChatMessage::user("hi"));
        assert_eq!(sent[2], ChatMessage::assistant("hello"));
        assert_eq!(sent[3], ChatMessage::user("What do you do?"));
    }
}
