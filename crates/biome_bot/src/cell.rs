//! One assembled cell: encoder, state machine and decoder built from a
//! validated script document, plus the presentation metadata a reply needs.

use std::sync::Arc;

use biome_core::{
    AutomatonError, Code, DecoderKind, EncoderKind, ScriptDocument, StateMachineKind, Tokenizer,
};
use biome_engine::{Decoder, Encoder, EngineError, StateMachine};
use biome_memory::MemoryStore;

pub struct Cell {
    name: String,
    avatar_dir: String,
    default_avatar: String,
    background_color: String,
    retention: f32,
    encoder: Encoder,
    machine: StateMachine,
    decoder: Decoder,
}

impl Cell {
    /// Assemble a cell. The document is validated and its module names are
    /// resolved through the closed kind enums, so a misauthored script fails
    /// here and the cell is never activated.
    pub fn build(
        name: impl Into<String>,
        doc: &ScriptDocument,
        tokenizer: Arc<dyn Tokenizer>,
        memory: Arc<MemoryStore>,
        tag_depth: usize,
    ) -> Result<Self, EngineError> {
        doc.validate()?;
        let encoder_kind = EncoderKind::from_name(&doc.encoder)?;
        let machine_kind = StateMachineKind::from_name(doc.state_machine.as_deref())?;
        let decoder_kind = DecoderKind::from_name(&doc.decoder)?;

        let encoder = Encoder::build(encoder_kind, doc, tokenizer, memory.clone())?;
        let machine = StateMachine::build(machine_kind, doc, memory.clone())?;
        let mut decoder = Decoder::build(decoder_kind, doc, memory)?;
        decoder.set_tag_depth(tag_depth);

        Ok(Self {
            name: name.into(),
            avatar_dir: doc.avatar_dir.clone(),
            default_avatar: doc.default_avatar.clone(),
            background_color: doc.background_color.clone(),
            retention: doc.retention.unwrap_or(0.0),
            encoder,
            machine,
            decoder,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn retention(&self) -> f32 {
        self.retention
    }

    pub fn background_color(&self) -> &str {
        &self.background_color
    }

    /// Encode the inbound code and resolve it against this cell's
    /// conversational state. Rendering is separate so the orchestrator can
    /// inspect the claim before committing to an answer.
    pub fn head(&mut self, code: &Code) -> Result<Code, AutomatonError> {
        let encoded = self.encoder.retrieve(code);
        self.machine.run(&encoded)
    }

    pub fn render(&mut self, code: &Code) -> String {
        self.decoder.render(code)
    }

    /// Avatar file for the resolved code, under this cell's avatar dir.
    pub fn avatar_path(&self, code: &Code) -> String {
        let file = code.avatar.as_deref().unwrap_or(&self.default_avatar);
        format!("{}{}", self.avatar_dir, file)
    }

    /// Pin every RNG in the cell, for deterministic tests.
    pub fn reseed(&mut self, seed: u64) {
        self.encoder.reseed(seed);
        self.machine.reseed(seed.wrapping_add(1));
        self.decoder.reseed(seed.wrapping_add(2));
    }
}
