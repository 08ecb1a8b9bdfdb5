//! Static tool declarations advertised to the model.

use std::collections::BTreeMap;

use serde::Serialize;

/// A function declaration in the JSON-Schema dialect the Chat Completions API expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: ParameterSchema,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSchema {
    #[serde(rename = "type")]
    pub schema_type: &'static str,
    pub properties: BTreeMap<String, ParameterSpec>,
    pub required: Vec<String>,
    #[serde(rename = "additionalProperties")]
    pub additional_properties: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSpec {
    #[serde(rename = "type")]
    pub param_type: &'static str,
    pub description: String,
}

impl ParameterSchema {
    fn object(properties: &[(&str, &str)], required: &[&str]) -> Self {
        Self {
            schema_type: "object",
            properties: properties
                .iter()
                .map(|(name, description)| {
                    (
                        name.to_string(),
                        ParameterSpec {
                            param_type: "string",
                            description: description.to_string(),
                        },
                    )
                })
                .collect(),
            required: required.iter().map(|r| r.to_string()).collect(),
            additional_properties: false,
        }
    }
}

pub fn record_user_details() -> ToolSpec {
    ToolSpec {
        name: super::RECORD_USER_DETAILS.to_string(),
        description: "Use this tool to record that a user is interested in being in touch \
                      and provided an email address"
            .to_string(),
        parameters: ParameterSchema::object(
            &[
                ("email", "The email address of this user"),
                ("name", "The user's name, if they provided it"),
                (
                    "notes",
                    "Any additional information about the conversation that's worth recording to give context",
                ),
            ],
            &["email"],
        ),
    }
}

pub fn record_unknown_question() -> ToolSpec {
    ToolSpec {
        name: super::RECORD_UNKNOWN_QUESTION.to_string(),
        description: "Always use this tool to record any question that couldn't be answered \
                      as you didn't know the answer"
            .to_string(),
        parameters: ParameterSchema::object(
            &[("question", "The question that couldn't be answered")],
            &["question"],
        ),
    }
}
