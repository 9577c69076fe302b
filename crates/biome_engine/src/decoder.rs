//! Rendering a resolved code as reply text.
//!
//! Templates come from the script line the code points at; `{TAG}` tokens are
//! expanded recursively from memory, so a memory value may itself contain
//! further tags. Expansion is depth-limited; past the limit the tag stays
//! literal.

use std::collections::HashMap;
use std::sync::Arc;

use biome_core::{Code, ScriptDocument, ScriptError, Status};
use biome_memory::MemoryStore;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use regex::Regex;

/// Default nesting limit for `{TAG}` expansion through memory values.
pub const TAG_DEPTH: usize = 8;

pub struct EchoDecoder {
    outputs: Vec<Vec<String>>,
    intents: HashMap<String, usize>,
    memory: Arc<MemoryStore>,
    tag: Regex,
    tag_depth: usize,
    rng: StdRng,
}

impl EchoDecoder {
    pub fn learn(doc: &ScriptDocument, memory: Arc<MemoryStore>) -> Result<Self, ScriptError> {
        doc.validate()?;
        Ok(Self {
            outputs: doc.script.iter().map(|line| line.outputs.clone()).collect(),
            intents: doc.intent_index(),
            memory,
            tag: Regex::new(r"\{[A-Z_][A-Z0-9_]*\}").expect("tag pattern is valid"),
            tag_depth: TAG_DEPTH,
            rng: StdRng::from_entropy(),
        })
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn set_tag_depth(&mut self, depth: usize) {
        self.tag_depth = depth;
    }

    pub fn render(&mut self, code: &Code) -> String {
        match self.pick_template(code) {
            Ok(template) => self.expand(&template, 0),
            Err(text) => text,
        }
    }

    /// One output candidate for the code, chosen uniformly. `Err` carries
    /// text that is already final and must not be tag-expanded; the empty
    /// string tells the orchestrator to substitute its fallback reply.
    fn pick_template(&mut self, code: &Code) -> Result<String, String> {
        if let Status::Error(message) = &code.status {
            tracing::warn!(%message, "rendering an errored code as the fallback");
            return Err(String::new());
        }
        // A known intent wins; an intent the script does not answer falls
        // back to the retrieved line index.
        let index = if code.has_intent() {
            let intent = code.intent.as_deref().unwrap_or_default();
            self.intents.get(intent).copied().or(code.index)
        } else {
            code.index
        };
        let Some(candidates) = index.and_then(|i| self.outputs.get(i)) else {
            return Err(String::new());
        };
        Ok(candidates
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default())
    }

    /// Replace every `{TAG}` with a random memory value, recursively.
    /// Unknown tags and tags past the depth limit stay literal.
    fn expand(&mut self, template: &str, depth: usize) -> String {
        if !self.tag.is_match(template) {
            return template.to_string();
        }
        if depth >= self.tag_depth {
            tracing::warn!(template, "tag expansion depth exceeded; left literal");
            return template.to_string();
        }

        let mut out = String::new();
        let mut cursor = 0;
        let spans: Vec<(usize, usize, String)> = self
            .tag
            .find_iter(template)
            .map(|m| (m.start(), m.end(), m.as_str().to_string()))
            .collect();
        for (start, end, key) in spans {
            out.push_str(&template[cursor..start]);
            let values = self.memory.values(&key);
            match values.choose(&mut self.rng) {
                Some(value) => {
                    let value = value.clone();
                    out.push_str(&self.expand(&value, depth + 1));
                }
                None => out.push_str(&key),
            }
            cursor = end;
        }
        out.push_str(&template[cursor..]);
        out
    }
}

/// [`EchoDecoder`] plus harvest splicing: the first `*` in the chosen
/// template is replaced with the first harvested surface.
pub struct HarvestDecoder {
    echo: EchoDecoder,
}

impl HarvestDecoder {
    pub fn learn(doc: &ScriptDocument, memory: Arc<MemoryStore>) -> Result<Self, ScriptError> {
        Ok(Self {
            echo: EchoDecoder::learn(doc, memory)?,
        })
    }

    pub fn reseed(&mut self, seed: u64) {
        self.echo.reseed(seed);
    }

    pub fn set_tag_depth(&mut self, depth: usize) {
        self.echo.set_tag_depth(depth);
    }

    pub fn render(&mut self, code: &Code) -> String {
        match self.echo.pick_template(code) {
            Ok(mut template) => {
                if let Some(harvest) = code.harvests.first() {
                    template = template.replacen('*', &harvest.surface, 1);
                }
                self.echo.expand(&template, 0)
            }
            Err(text) => text,
        }
    }
}
