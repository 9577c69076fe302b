//! The per-cell processing stages: encoders turn an utterance into a
//! [`Code`], state machines resolve the code against conversational state,
//! decoders render the resolved code as reply text.
//!
//! Each stage is a closed enum of kinds resolved from the script document at
//! load time; an unknown kind is a load error, never a runtime lookup miss.

pub mod bow;
pub mod decoder;
pub mod harvest;
pub mod machines;
pub mod pattern;
pub mod vectorizer;

use std::sync::Arc;

use biome_core::{
    AutomatonError, Code, DecoderKind, EncoderKind, ScriptDocument, ScriptError, StateMachineKind,
    Tokenizer,
};
use biome_memory::MemoryStore;
use thiserror::Error;

pub use bow::BowEncoder;
pub use decoder::{EchoDecoder, HarvestDecoder, TAG_DEPTH};
pub use harvest::HarvestEncoder;
pub use machines::{BasicMachine, CentralMachine, EnterlessMachine};
pub use pattern::PatternEncoder;
pub use vectorizer::{Retrieval, Vectorizer};

/// Load-time failures of any stage.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error(transparent)]
    Automaton(#[from] AutomatonError),
}

/// One cell's encoder.
pub enum Encoder {
    Pattern(PatternEncoder),
    BagOfWords(BowEncoder),
    Harvest(HarvestEncoder),
}

impl Encoder {
    pub fn build(
        kind: EncoderKind,
        doc: &ScriptDocument,
        tokenizer: Arc<dyn Tokenizer>,
        memory: Arc<MemoryStore>,
    ) -> Result<Self, EngineError> {
        Ok(match kind {
            EncoderKind::Pattern => Self::Pattern(PatternEncoder::learn(doc)?),
            EncoderKind::BagOfWords => Self::BagOfWords(BowEncoder::learn(doc, tokenizer)?),
            EncoderKind::Harvest => Self::Harvest(HarvestEncoder::learn(doc, tokenizer, memory)?),
        })
    }

    pub fn retrieve(&mut self, code: &Code) -> Code {
        match self {
            Self::Pattern(e) => e.retrieve(code, false),
            Self::BagOfWords(e) => e.retrieve(code),
            Self::Harvest(e) => e.retrieve(code),
        }
    }

    /// Pin the tie-break RNG where the encoder has one.
    pub fn reseed(&mut self, seed: u64) {
        match self {
            Self::Pattern(_) => {}
            Self::BagOfWords(e) => e.reseed(seed),
            Self::Harvest(e) => e.reseed(seed),
        }
    }
}

/// One cell's state machine.
pub enum StateMachine {
    Basic(BasicMachine),
    Enterless(EnterlessMachine),
    Central(CentralMachine),
}

impl StateMachine {
    pub fn build(
        kind: StateMachineKind,
        doc: &ScriptDocument,
        memory: Arc<MemoryStore>,
    ) -> Result<Self, EngineError> {
        let precision = doc.precision.unwrap_or(0.0);
        Ok(match kind {
            StateMachineKind::Basic => Self::Basic(BasicMachine::new(precision)?),
            StateMachineKind::Enterless => Self::Enterless(EnterlessMachine::new(precision)?),
            StateMachineKind::Central => Self::Central(CentralMachine::new(doc, memory)?),
        })
    }

    pub fn run(&mut self, code: &Code) -> Result<Code, AutomatonError> {
        match self {
            Self::Basic(m) => m.run(code),
            Self::Enterless(m) => m.run(code),
            Self::Central(m) => m.run(code),
        }
    }

    pub fn reseed(&mut self, seed: u64) {
        if let Self::Central(m) = self {
            m.reseed(seed);
        }
    }
}

/// One cell's decoder.
pub enum Decoder {
    Echo(EchoDecoder),
    Harvest(HarvestDecoder),
}

impl Decoder {
    pub fn build(
        kind: DecoderKind,
        doc: &ScriptDocument,
        memory: Arc<MemoryStore>,
    ) -> Result<Self, EngineError> {
        Ok(match kind {
            DecoderKind::Echo => Self::Echo(EchoDecoder::learn(doc, memory)?),
            DecoderKind::Harvest => Self::Harvest(HarvestDecoder::learn(doc, memory)?),
        })
    }

    pub fn render(&mut self, code: &Code) -> String {
        match self {
            Self::Echo(d) => d.render(code),
            Self::Harvest(d) => d.render(code),
        }
    }

    pub fn reseed(&mut self, seed: u64) {
        match self {
            Self::Echo(d) => d.reseed(seed),
            Self::Harvest(d) => d.reseed(seed),
        }
    }

    pub fn set_tag_depth(&mut self, depth: usize) {
        match self {
            Self::Echo(d) => d.set_tag_depth(depth),
            Self::Harvest(d) => d.set_tag_depth(depth),
        }
    }
}
