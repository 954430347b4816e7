//! Free-text to command matching.
//!
//! Each agent declares an ordered list of [`CommandPattern`]s during
//! initialization. The [`CommandMatcher`] compiles them once and resolves
//! voice/free text against them:
//!
//! 1. Normalize the text (trim, lowercase)
//! 2. Try every regex of every pattern in registration order
//! 3. The first (case-insensitive, unanchored) match wins
//! 4. Captured groups become `param1`, `param2`, ... and the pattern's static
//!    parameters are merged over them

use crate::agents::base::AgentError;
use ah_protocol::agent_models::CommandPattern;
use ah_protocol::command_models::Command;
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

struct CompiledPattern {
    regexes: Vec<Regex>,
    pattern: CommandPattern,
}

/// The result of a successful match.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatch {
    pub action: String,
    pub parameters: HashMap<String, Value>,
}

/// A precompiled, ordered pattern list.
#[derive(Default)]
pub struct CommandMatcher {
    compiled: Vec<CompiledPattern>,
}

impl CommandMatcher {
    /// Compile all patterns.
    ///
    /// # Errors
    ///
    /// Returns `AgentError::InvalidPattern` for the first regex that does
    /// not compile.
    pub fn new(patterns: Vec<CommandPattern>) -> Result<Self, AgentError> {
        let compiled = patterns
            .into_iter()
            .map(|pattern| {
                let regexes = pattern
                    .patterns
                    .iter()
                    .map(|source| {
                        RegexBuilder::new(source)
                            .case_insensitive(true)
                            .build()
                            .map_err(|e| AgentError::InvalidPattern {
                                pattern: source.clone(),
                                reason: e.to_string(),
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(CompiledPattern { regexes, pattern })
            })
            .collect::<Result<Vec<_>, AgentError>>()?;

        Ok(Self { compiled })
    }

    /// Match `text` against the registered patterns.
    ///
    /// Returns `None` when nothing matches ("not understood").
    pub fn parse(&self, text: &str) -> Option<PatternMatch> {
        let normalized = text.trim().to_lowercase();

        for compiled in &self.compiled {
            for regex in &compiled.regexes {
                let Some(captures) = regex.captures(&normalized) else {
                    continue;
                };

                let mut parameters: HashMap<String, Value> = captures
                    .iter()
                    .skip(1)
                    .enumerate()
                    .filter_map(|(index, group)| {
                        group.map(|m| {
                            (
                                format!("param{}", index + 1),
                                Value::String(m.as_str().to_string()),
                            )
                        })
                    })
                    .collect();

                parameters.extend(
                    compiled
                        .pattern
                        .parameters
                        .iter()
                        .map(|(key, value)| (key.clone(), value.clone())),
                );

                return Some(PatternMatch {
                    action: compiled.pattern.action.clone(),
                    parameters,
                });
            }
        }

        None
    }

    /// Match `text` and build a ready-to-dispatch voice command.
    pub fn to_command(&self, text: &str, user_id: &str) -> Option<Command> {
        let matched = self.parse(text)?;
        Some(
            Command::new(matched.action, user_id)
                .with_parameters(matched.parameters)
                .with_context("voiceCommand", Value::String(text.to_string()))
                .with_request_id(format!("voice-{}", Uuid::new_v4())),
        )
    }

    /// The declared patterns, in registration order.
    pub fn patterns(&self) -> Vec<CommandPattern> {
        self.compiled.iter().map(|c| c.pattern.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    /// First pattern of each group, used to hint at what can be said.
    pub fn examples(&self) -> String {
        let examples: Vec<&str> = self
            .compiled
            .iter()
            .filter_map(|c| c.pattern.patterns.first().map(String::as_str))
            .collect();

        if examples.is_empty() {
            "No voice commands available".to_string()
        } else {
            examples.join(", ")
        }
    }
}
