//! Script documents: the JSON format a cell is authored in, its validation,
//! and the closed set of module kinds a document may name.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::ScriptError;

/// One scripted exchange: input exemplars (or regular expressions), an
/// optional intent label, and reply template candidates.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptLine {
    #[serde(rename = "in", default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(rename = "out", default)]
    pub outputs: Vec<String>,
}

/// A cell definition as authored: module kinds, thresholds, biome children,
/// seed memory and the script itself. Field names follow the camelCase JSON
/// cell files.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptDocument {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub avatar_dir: String,
    #[serde(default = "default_avatar")]
    pub default_avatar: String,
    #[serde(default)]
    pub background_color: String,

    pub encoder: String,
    #[serde(default)]
    pub state_machine: Option<String>,
    pub decoder: String,

    #[serde(default)]
    pub precision: Option<f32>,
    #[serde(default)]
    pub retention: Option<f32>,
    #[serde(default)]
    pub refractory: Option<u32>,

    #[serde(default)]
    pub biome: Vec<String>,
    #[serde(default)]
    pub memory: HashMap<String, Vec<String>>,

    pub script: Vec<ScriptLine>,
}

fn default_avatar() -> String {
    "peace.svg".to_string()
}

impl ScriptDocument {
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Validate the line invariants: the script is non-empty, every line has
    /// non-empty `in` and `out`, and intents are unique (the wildcard `"*"`
    /// is exempt). Errors carry the offending line index.
    pub fn validate(&self) -> Result<(), ScriptError> {
        if self.script.is_empty() {
            return Err(ScriptError::Empty);
        }
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (i, line) in self.script.iter().enumerate() {
            if line.inputs.is_empty() || line.inputs.iter().any(|s| s.is_empty()) {
                return Err(ScriptError::BadInput { line: i });
            }
            if line.outputs.is_empty() {
                return Err(ScriptError::BadOutput { line: i });
            }
            if let Some(intent) = line.intent.as_deref() {
                if intent != "*" && seen.insert(intent, i).is_some() {
                    return Err(ScriptError::DuplicateIntent {
                        line: i,
                        intent: intent.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Map from concrete intent label to script line index.
    pub fn intent_index(&self) -> HashMap<String, usize> {
        let mut map = HashMap::new();
        for (i, line) in self.script.iter().enumerate() {
            if let Some(intent) = line.intent.as_deref() {
                if intent != "*" {
                    map.insert(intent.to_string(), i);
                }
            }
        }
        map
    }
}

/// The closed set of encoder implementations a script may name.
///
/// Resolving the document's module-name string at load time means an unknown
/// kind fails fast with a typed error instead of surfacing later as a missing
/// table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderKind {
    Pattern,
    BagOfWords,
    Harvest,
}

impl EncoderKind {
    pub fn from_name(name: &str) -> Result<Self, ScriptError> {
        match name {
            "PatternEncoder" => Ok(Self::Pattern),
            "BowEncoder" => Ok(Self::BagOfWords),
            "HarvestEncoder" => Ok(Self::Harvest),
            other => Err(ScriptError::UnknownKind(other.to_string())),
        }
    }
}

/// The closed set of state-machine dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateMachineKind {
    Basic,
    Enterless,
    Central,
}

impl StateMachineKind {
    /// A document that names no state machine gets the basic dialect.
    pub fn from_name(name: Option<&str>) -> Result<Self, ScriptError> {
        match name {
            None | Some("BasicStateMachine") => Ok(Self::Basic),
            Some("EnterlessStateMachine") => Ok(Self::Enterless),
            Some("CentralStateMachine") => Ok(Self::Central),
            Some(other) => Err(ScriptError::UnknownKind(other.to_string())),
        }
    }
}

/// The closed set of decoder implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderKind {
    Echo,
    Harvest,
}

impl DecoderKind {
    pub fn from_name(name: &str) -> Result<Self, ScriptError> {
        match name {
            "EchoDecoder" => Ok(Self::Echo),
            "HarvestDecoder" => Ok(Self::Harvest),
            other => Err(ScriptError::UnknownKind(other.to_string())),
        }
    }
}
