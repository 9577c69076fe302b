//! Bag-of-words retrieval: tokenize the utterance, query the TF-IDF space,
//! pick uniformly among the rows tied at the maximum score.

use std::collections::HashMap;
use std::sync::Arc;

use biome_core::{Code, ScriptDocument, ScriptError, Tokenizer};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::vectorizer::Vectorizer;

pub struct BowEncoder {
    vectorizer: Vectorizer,
    intents: HashMap<String, usize>,
    tokenizer: Arc<dyn Tokenizer>,
    rng: StdRng,
}

impl BowEncoder {
    pub fn learn(doc: &ScriptDocument, tokenizer: Arc<dyn Tokenizer>) -> Result<Self, ScriptError> {
        doc.validate()?;
        let mut exemplars = Vec::new();
        for (line, entry) in doc.script.iter().enumerate() {
            for text in &entry.inputs {
                exemplars.push((line, tokenizer.segment(text)));
            }
        }
        Ok(Self {
            vectorizer: Vectorizer::learn(&exemplars),
            intents: doc.intent_index(),
            tokenizer,
            rng: StdRng::from_entropy(),
        })
    }

    /// Pin the tie-break RNG, for deterministic tests.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Resolve the inbound code. A concrete caller-supplied intent bypasses
    /// the vector space entirely; otherwise the utterance is tokenized and
    /// queried.
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

        let tokens = self.tokenizer.segment(&code.text);
        let Some(retrieval) = self.vectorizer.query(&tokens) else {
            return Code::no_match(code);
        };
        let index = retrieval.tied.choose(&mut self.rng).copied();
        tracing::debug!(score = retrieval.score, index = ?index, "bow retrieval");
        Code {
            index,
            score: retrieval.score,
            ..code.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biome_core::{Owner, RunTokenizer};

    fn encoder() -> BowEncoder {
        let doc = ScriptDocument::parse(
            r#"{
                "encoder": "BowEncoder",
                "decoder": "EchoDecoder",
                "script": [
                    {"in": ["こんにちは"], "out": ["やっほー"]},
                    {"in": ["おはようございます"], "out": ["おはよ"]},
                    {"in": ["眠い", "ねむい"], "out": ["寝なよ"]}
                ]
            }"#,
        )
        .unwrap();
        let mut enc = BowEncoder::learn(&doc, Arc::new(RunTokenizer)).unwrap();
        enc.reseed(7);
        enc
    }

    #[test]
    fn exact_exemplar_scores_one() {
        let mut enc = encoder();
        let code = enc.retrieve(&Code::from_user("こんにちは"));
        assert_eq!(code.index, Some(0));
        assert!((code.score - 1.0).abs() < 1e-5);
        assert!(code.is_ok());
    }

    #[test]
    fn out_of_vocabulary_utterance_recovers() {
        let mut enc = encoder();
        let code = enc.retrieve(&Code::from_user("Bonjour"));
        assert!(code.is_ok());
        assert_eq!(code.score, 0.0);
        assert!(code.index.is_none());
    }

    fn tied_encoder() -> BowEncoder {
        let doc = ScriptDocument::parse(
            r#"{
                "encoder": "BowEncoder",
                "decoder": "EchoDecoder",
                "script": [
                    {"in": ["やあ"], "out": ["a"]},
                    {"in": ["やあ"], "out": ["b"]}
                ]
            }"#,
        )
        .unwrap();
        BowEncoder::learn(&doc, Arc::new(RunTokenizer)).unwrap()
    }

    #[test]
    fn ties_spread_across_candidates() {
        let mut enc = tied_encoder();
        enc.reseed(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..64 {
            let code = enc.retrieve(&Code::from_user("やあ"));
            seen.insert(code.index.unwrap());
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn tied_candidates_are_drawn_near_uniformly() {
        let mut enc = tied_encoder();
        enc.reseed(9);
        let mut counts = [0usize; 2];
        for _ in 0..400 {
            let code = enc.retrieve(&Code::from_user("やあ"));
            counts[code.index.unwrap()] += 1;
        }
        // Uniform share is 200 each; the band is wide enough that a seeded
        // uniform draw cannot miss it while a biased pick will.
        for &count in &counts {
            assert!(
                (140..=260).contains(&count),
                "tie-break skewed: {counts:?}"
            );
        }
    }

    #[test]
    fn system_intent_bypasses_the_vector_space() {
        let doc = ScriptDocument::parse(
            r#"{
                "encoder": "BowEncoder",
                "decoder": "EchoDecoder",
                "script": [
                    {"in": ["こんにちは"], "out": ["やっほー"]},
                    {"intent": "not_found", "in": ["知らない"], "out": ["わかんない"]}
                ]
            }"#,
        )
        .unwrap();
        let mut enc = BowEncoder::learn(&doc, Arc::new(RunTokenizer)).unwrap();
        let code = enc.retrieve(&Code::from_system("not_found"));
        assert_eq!(code.index, Some(1));
        assert_eq!(code.score, 1.0);
        assert_eq!(code.intent.as_deref(), Some("not_found"));
        assert_eq!(code.owner, Owner::System);
    }

    #[test]
    fn no_match_keeps_the_inbound_owner() {
        let mut enc = encoder();
        let mut inbound = Code::from_user("Bonjour");
        inbound.owner = Owner::Bot;
        let code = enc.retrieve(&inbound);
        assert_eq!(code.score, 0.0);
        assert_eq!(code.owner, Owner::Bot);
    }
}
