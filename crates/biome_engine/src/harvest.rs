//! Slot-filling retrieval over segmented phrases.
//!
//! Exemplars and queries are phrase-segmented; typed phrases are abstracted
//! to `*\t<type>` wildcards before vectorization, so 「猫が好き」 and
//! 「犬が好き」 land on the same row. The concrete surfaces stripped from the
//! query come back as harvests, ready for the decoder to splice into a
//! template.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use biome_automaton::{PhraseSegmenter, TaggedToken};
use biome_core::{Code, Harvest, ScriptDocument, Tokenizer};
use biome_memory::MemoryStore;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::vectorizer::Vectorizer;
use crate::EngineError;

const BOT_NAME_KEY: &str = "{BOT_NAME}";

pub struct HarvestEncoder {
    vectorizer: Vectorizer,
    /// Phrase types the exemplars actually slot on.
    slots: HashSet<String>,
    intents: HashMap<String, usize>,
    segmenter: PhraseSegmenter,
    memory: Arc<MemoryStore>,
    rng: StdRng,
}

impl HarvestEncoder {
    pub fn learn(
        doc: &ScriptDocument,
        tokenizer: Arc<dyn Tokenizer>,
        memory: Arc<MemoryStore>,
    ) -> Result<Self, EngineError> {
        doc.validate()?;
        let segmenter = PhraseSegmenter::new(tokenizer)?;

        let mut exemplars = Vec::new();
        let mut slots = HashSet::new();
        for (line, entry) in doc.script.iter().enumerate() {
            for text in &entry.inputs {
                let tokens: Vec<String> = segmenter
                    .segment(text)?
                    .iter()
                    .map(|token| match TaggedToken::parse(token).phrase_type {
                        Some(phrase_type) => {
                            slots.insert(phrase_type.to_string());
                            TaggedToken::tagged("*", phrase_type)
                        }
                        None => token.clone(),
                    })
                    .collect();
                exemplars.push((line, tokens));
            }
        }

        Ok(Self {
            vectorizer: Vectorizer::learn(&exemplars),
            slots,
            intents: doc.intent_index(),
            segmenter,
            memory,
            rng: StdRng::from_entropy(),
        })
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn retrieve(&mut self, code: &Code) -> Code {
        if code.has_intent() {
            let intent = code.intent.as_deref().unwrap_or_default();
            return match self.intents.get(intent) {
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
            };
        }

        // The bot's own name is abstracted to its memory key before
        // segmentation so scripts can address it generically.
        let mut text = code.text.clone();
        for name in self.memory.values(BOT_NAME_KEY) {
            text = text.replace(&name, BOT_NAME_KEY);
        }

        let segmented = match self.segmenter.segment(&text) {
            Ok(tokens) => tokens,
            Err(e) => return code.clone().with_status(e.to_string()),
        };

        let mut founds: Vec<Harvest> = Vec::new();
        let query: Vec<String> = segmented
            .iter()
            .map(|token| match TaggedToken::parse(token) {
                TaggedToken {
                    surface,
                    phrase_type: Some(phrase_type),
                } => {
                    founds.push(Harvest::new(surface, phrase_type));
                    TaggedToken::tagged("*", phrase_type)
                }
                _ => token.clone(),
            })
            .collect();

        let Some(retrieval) = self.vectorizer.query(&query) else {
            return Code::no_match(code);
        };
        let index = retrieval.tied.choose(&mut self.rng).copied();

        let mut harvests: Vec<Harvest> = founds
            .iter()
            .filter(|h| self.slots.contains(&h.phrase_type))
            .cloned()
            .collect();
        if harvests.is_empty() {
            harvests.extend(founds.choose(&mut self.rng).cloned());
        }

        tracing::debug!(score = retrieval.score, index = ?index, harvests = harvests.len(), "harvest retrieval");
        Code {
            index,
            score: retrieval.score,
            harvests,
            ..code.clone()
        }
    }
}
