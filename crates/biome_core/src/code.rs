//! The intermediate record passed between encoder, state machine and decoder
//! for one conversational turn.

use serde::{Deserialize, Serialize};

/// A slot value extracted from user input: the surface text plus the
/// grammatical phrase type assigned by the segmenter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Harvest {
    pub surface: String,
    pub phrase_type: String,
}

impl Harvest {
    pub fn new(surface: impl Into<String>, phrase_type: impl Into<String>) -> Self {
        Self {
            surface: surface.into(),
            phrase_type: phrase_type.into(),
        }
    }
}

/// Who produced the utterance carried by a [`Code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Owner {
    User,
    Bot,
    System,
}

/// Pipeline status. Anything other than `Ok` short-circuits rendering;
/// "no match" is NOT an error, it is an `Ok` code with `score == 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    Error(String),
}

impl Status {
    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }
}

/// Orchestration control emitted by a state machine instead of a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Hand the turn off from the main cell to the biome cascade.
    ToBiome,
}

/// The lingua franca of the pipeline.
///
/// `score` is only meaningful when `index` or `intent` is set. The wildcard
/// intent `"*"` of the script format is represented as `None` here, so any
/// `Some(intent)` is a concrete, routable intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Code {
    pub intent: Option<String>,
    pub index: Option<usize>,
    pub score: f32,
    pub harvests: Vec<Harvest>,
    pub text: String,
    pub status: Status,
    pub owner: Owner,
    pub avatar: Option<String>,
    pub command: Option<Command>,
}

impl Code {
    /// A fresh code for a raw user utterance, before any encoding.
    pub fn from_user(text: impl Into<String>) -> Self {
        Self {
            intent: None,
            index: None,
            score: 0.0,
            harvests: Vec::new(),
            text: text.into(),
            status: Status::Ok,
            owner: Owner::User,
            avatar: None,
            command: None,
        }
    }

    /// A system-injected code carrying a concrete intent, e.g. `enter` at
    /// session start or `not_found` when the biome cascade fell through.
    pub fn from_system(intent: impl Into<String>) -> Self {
        Self {
            intent: Some(intent.into()),
            owner: Owner::System,
            ..Self::from_user("")
        }
    }

    /// A recovered "no match": the inbound code with zero score, no line
    /// and no harvests. Owner and intent survive, so a system code that
    /// misses retrieval is still routable by the state machine.
    pub fn no_match(inbound: &Code) -> Self {
        Self {
            index: None,
            score: 0.0,
            harvests: Vec::new(),
            ..inbound.clone()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    /// True when the carried intent is a concrete label (set and not `"*"`).
    pub fn has_intent(&self) -> bool {
        matches!(self.intent.as_deref(), Some(i) if !i.is_empty() && i != "*")
    }

    pub fn with_status(mut self, message: impl Into<String>) -> Self {
        self.status = Status::Error(message.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_code_starts_clean() {
        let code = Code::from_user("こんにちは");
        assert!(code.is_ok());
        assert!(!code.has_intent());
        assert_eq!(code.score, 0.0);
        assert!(code.index.is_none());
        assert_eq!(code.owner, Owner::User);
    }

    #[test]
    fn wildcard_intent_is_not_concrete() {
        let mut code = Code::from_user("x");
        code.intent = Some("*".to_string());
        assert!(!code.has_intent());
        code.intent = Some("summon".to_string());
        assert!(code.has_intent());
    }

    #[test]
    fn error_status_short_circuits() {
        let code = Code::from_user("x").with_status("unknown intent");
        assert!(!code.is_ok());
    }

    #[test]
    fn no_match_keeps_owner_and_intent() {
        let mut inbound = Code::from_system("enter");
        inbound.index = Some(3);
        inbound.score = 1.0;
        let code = Code::no_match(&inbound);
        assert_eq!(code.owner, Owner::System);
        assert_eq!(code.intent.as_deref(), Some("enter"));
        assert_eq!(code.score, 0.0);
        assert!(code.index.is_none());
    }
}
