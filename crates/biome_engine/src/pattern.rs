//! Regular-expression retrieval in script order.
//!
//! Each `in` entry is compiled as a regex; the first entry matching the
//! utterance wins (`score = 1`), capture groups become harvests. With chomp
//! enabled the matched span is removed from the text, which lets a caller
//! split a compound sentence into successive clauses.

use std::collections::HashMap;

use biome_core::{Code, Harvest, ScriptDocument, ScriptError};
use regex::Regex;

pub struct PatternEncoder {
    /// Compiled patterns with their source line index, script order.
    patterns: Vec<(Regex, usize)>,
    intents: HashMap<String, usize>,
}

impl PatternEncoder {
    pub fn learn(doc: &ScriptDocument) -> Result<Self, ScriptError> {
        doc.validate()?;
        let mut patterns = Vec::new();
        for (line, entry) in doc.script.iter().enumerate() {
            for text in &entry.inputs {
                let regex = Regex::new(text).map_err(|e| ScriptError::BadPattern {
                    line,
                    pattern: text.clone(),
                    message: e.to_string(),
                })?;
                patterns.push((regex, line));
            }
        }
        Ok(Self {
            patterns,
            intents: doc.intent_index(),
        })
    }

    /// Resolve the inbound code. A concrete caller-supplied intent bypasses
    /// matching entirely; otherwise patterns are tried in script order.
    pub fn retrieve(&self, code: &Code, chomp: bool) -> Code {
        if let Some(resolved) = self.resolve_intent(code) {
            return resolved;
        }
        self.resolve_text(code, chomp)
    }

    fn resolve_intent(&self, code: &Code) -> Option<Code> {
        if !code.has_intent() {
            return None;
        }
        let intent = code.intent.as_deref().unwrap_or_default();
        Some(match self.intents.get(intent) {
            Some(&line) => Code {
                index: Some(line),
                score: 1.0,
                ..code.clone()
            },
            None => Code {
                intent: None,
                index: None,
                score: 0.0,
                ..code.clone()
            }
            .with_status(format!("no such intent \"{intent}\" in the script")),
        })
    }

    fn resolve_text(&self, code: &Code, chomp: bool) -> Code {
        for (regex, line) in &self.patterns {
            let Some(caps) = regex.captures(&code.text) else {
                continue;
            };
            let intent = self
                .intents
                .iter()
                .find(|(_, &i)| i == *line)
                .map(|(name, _)| name.clone());
            let harvests = caps
                .iter()
                .skip(1)
                .flatten()
                .map(|m| Harvest::new(m.as_str(), ""))
                .collect();
            let text = if chomp {
                code.text.replacen(caps.get(0).map_or("", |m| m.as_str()), "", 1)
            } else {
                code.text.clone()
            };
            tracing::debug!(line, intent = ?intent, "pattern matched");
            return Code {
                intent,
                index: Some(*line),
                score: 1.0,
                harvests,
                text,
                ..code.clone()
            };
        }

        Code {
            intent: None,
            index: None,
            score: 0.0,
            harvests: Vec::new(),
            ..code.clone()
        }
    }
}
