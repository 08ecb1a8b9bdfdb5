//! Conversation Engine — one user turn against the remote model.
//!
//! Flow: count prior questions → (limit reached | call model) →
//!       [execute tool calls → call model]* → final text.
//!
//! Session state is never stored: the question count is recomputed from the
//! history the widget replays on every submission.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::llm_client::types::{ChatMessage, Role, ToolCall};
use crate::llm_client::{ChatModel, LlmError};
use crate::persona::{build_system_prompt, Persona};
use crate::tools::{empty_result, ToolRegistry};

pub mod prompts;

use prompts::{error_advisory, question_limit_message, QUOTA_ADVISORY, TOOL_LOOP_ADVISORY};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Model(#[from] LlmError),

    #[error("invalid arguments for tool '{tool}': {source}")]
    ToolArguments {
        tool: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("model requested tools more than {iterations} times in one turn")]
    ToolLoopExceeded { iterations: usize },
}

impl ChatError {
    /// Text shown in the transcript in place of a model answer.
    pub fn advisory(&self) -> String {
        match self {
            ChatError::Model(e) if e.is_quota() => QUOTA_ADVISORY.to_string(),
            ChatError::ToolLoopExceeded { .. } => TOOL_LOOP_ADVISORY.to_string(),
            other => error_advisory(other),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ChatLimits {
    /// Prior user messages allowed before the canned reply takes over.
    pub max_questions: usize,
    /// Tool rounds allowed in a single turn.
    pub max_tool_iterations: usize,
}

impl Default for ChatLimits {
    fn default() -> Self {
        Self {
            max_questions: 10,
            max_tool_iterations: 8,
        }
    }
}

pub struct ChatEngine {
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    persona: Persona,
    contact_email: String,
    limits: ChatLimits,
}

impl ChatEngine {
    pub fn new(
        model: Arc<dyn ChatModel>,
        tools: ToolRegistry,
        persona: Persona,
        contact_email: String,
        limits: ChatLimits,
    ) -> Self {
        Self {
            model,
            tools,
            persona,
            contact_email,
            limits,
        }
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Answers `message` given the prior `history`.
    ///
    /// Never fails: model and tool errors are converted into advisory text so
    /// the session can carry on with the next message.
    pub async fn chat(&self, message: &str, history: &[ChatMessage]) -> String {
        let span = info_span!("chat_turn", turn_id = %Uuid::new_v4());
        async move {
            let asked = count_user_questions(history);
            if asked >= self.limits.max_questions {
                info!(
                    "Question limit reached ({asked}/{})",
                    self.limits.max_questions
                );
                return question_limit_message(self.limits.max_questions, &self.contact_email);
            }

            match self.run(message, history).await {
                Ok(reply) => reply,
                Err(e) => {
                    error!("Chat turn failed: {e}");
                    e.advisory()
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, message: &str, history: &[ChatMessage]) -> Result<String, ChatError> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(build_system_prompt(&self.persona)));
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(message));

        let mut tool_rounds = 0;
        loop {
            let completion = self
                .model
                .complete(&messages, self.tools.describe())
                .await?;
            let choice = completion
                .choices
                .into_iter()
                .next()
                .ok_or(LlmError::EmptyContent)?;

            if !choice.wants_tool_calls() {
                return choice
                    .message
                    .content
                    .filter(|text| !text.trim().is_empty())
                    .ok_or(ChatError::Model(LlmError::EmptyContent));
            }

            if tool_rounds == self.limits.max_tool_iterations {
                return Err(ChatError::ToolLoopExceeded {
                    iterations: tool_rounds,
                });
            }
            tool_rounds += 1;

            let calls = choice.message.tool_calls.as_deref().unwrap_or_default();
            let results = self.handle_tool_calls(calls).await?;
            messages.push(choice.message);
            messages.extend(results);
        }
    }

    /// One tool-result message per call, in request order.
    async fn handle_tool_calls(
        &self,
        calls: &[ToolCall],
    ) -> Result<Vec<ChatMessage>, ChatError> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            let name = call.function.name.as_str();
            info!("Tool called: {name}");

            let payload: Value = match self.tools.resolve(name) {
                Some(kind) => self
                    .tools
                    .invoke(kind, &call.function.arguments)
                    .await
                    .map_err(|source| ChatError::ToolArguments {
                        tool: kind.name().to_string(),
                        source,
                    })?
                    .into(),
                None => {
                    warn!("Model requested unknown tool '{name}'");
                    empty_result()
                }
            };

            results.push(ChatMessage::tool_result(call.id.clone(), payload.to_string()));
        }
        Ok(results)
    }
}

/// Number of user-role messages in `history`.
pub fn count_user_questions(history: &[ChatMessage]) -> usize {
    history.iter().filter(|m| m.role == Role::User).count()
}
