//! The turn orchestrator: one main cell, a biome of helper cells, and the
//! stochastic most-recently-successful-first scheduler between them.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use biome_core::{Code, Command, ScriptError, Tokenizer, NOT_FOUND, PASS};
use biome_memory::{MemoryBackend, MemoryStore};

use crate::cell::Cell;
use crate::config::BotConfig;
use crate::order::{CellOrder, Mode};
use crate::source::{cell_name, ScriptSource};

/// One turn's answer, also emitted to the reply sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub avatar_path: String,
    pub background_color: String,
    pub speaker: String,
}

/// Caller-supplied consumer of replies; the sole output surface.
pub trait ReplySink: Send {
    fn emit(&mut self, reply: &Reply);
}

/// Discards every reply; callers that only use the returned value.
pub struct NullSink;

impl ReplySink for NullSink {
    fn emit(&mut self, _reply: &Reply) {}
}

enum Which {
    Main,
    Biome(usize),
}

pub struct Biomebot {
    order: CellOrder,
    memory: Arc<MemoryStore>,
    fallback_reply: String,
    sink: Box<dyn ReplySink>,
    rng: StdRng,
}

impl Biomebot {
    /// Fetch the main script and its biome children, seed the memory store
    /// and assemble every cell. Any failure aborts the whole load; a bot is
    /// only ever constructed from a fully valid cell set.
    pub async fn load(
        source: &dyn ScriptSource,
        uri: &str,
        backend: Arc<dyn MemoryBackend>,
        tokenizer: Arc<dyn Tokenizer>,
        config: &BotConfig,
        sink: Box<dyn ReplySink>,
    ) -> Result<Self> {
        let mut main_doc = source.fetch(uri).await?;
        config.apply_defaults(&mut main_doc);

        let bot_id = uri.strip_suffix(".json").unwrap_or(uri).to_string();
        let main_name = cell_name(uri);
        let dir = &uri[..uri.rfind('/').map_or(0, |i| i + 1)];

        let mut names: HashSet<String> = HashSet::from([main_name.clone()]);
        for child in &main_doc.biome {
            let name = cell_name(child);
            if !names.insert(name.clone()) {
                return Err(ScriptError::DuplicateCell(name).into());
            }
        }

        let mut children = Vec::with_capacity(main_doc.biome.len());
        for child in &main_doc.biome {
            let child_uri = format!("{dir}{child}");
            let mut doc = source
                .fetch(&child_uri)
                .await
                .with_context(|| format!("loading biome cell \"{child}\""))?;
            config.apply_defaults(&mut doc);
            children.push((cell_name(child), doc));
        }

        // Script seeds only apply to a store with no history for this bot.
        let mut seed = main_doc.memory.clone();
        for (_, doc) in &children {
            for (key, values) in &doc.memory {
                seed.entry(key.clone()).or_insert_with(|| values.clone());
            }
        }
        let memory = Arc::new(MemoryStore::open(backend, bot_id, seed).await?);

        let main = Cell::build(
            main_name,
            &main_doc,
            tokenizer.clone(),
            memory.clone(),
            config.tag_depth,
        )
        .with_context(|| format!("building main cell from \"{uri}\""))?;
        let mut biome = Vec::with_capacity(children.len());
        for (name, doc) in &children {
            let cell = Cell::build(
                name.clone(),
                doc,
                tokenizer.clone(),
                memory.clone(),
                config.tag_depth,
            )
            .with_context(|| format!("building biome cell \"{name}\""))?;
            biome.push(cell);
        }

        tracing::info!(bot = %memory.bot_id(), cells = biome.len() + 1, "bot loaded");
        Ok(Self {
            order: CellOrder::new(main, biome),
            memory,
            fallback_reply: config.fallback_reply.clone(),
            sink,
            rng: StdRng::from_entropy(),
        })
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    /// Current biome order, front first.
    pub fn biome_names(&self) -> Vec<&str> {
        self.order.biome_names()
    }

    /// Pin every RNG in the bot, for deterministic tests.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.order.reseed(seed.wrapping_add(100));
    }

    /// Open the session: the main cell receives a system `enter` code.
    pub fn start(&mut self) -> Result<Reply> {
        self.dispatch(Code::from_system("enter"))
    }

    /// Run one user turn through the pipeline.
    pub fn respond(&mut self, user_text: &str) -> Result<Reply> {
        self.dispatch(Code::from_user(user_text))
    }

    fn dispatch(&mut self, code: Code) -> Result<Reply> {
        match self.order.mode() {
            Mode::Main => {
                let out = self.order.main_mut().head(&code)?;
                if out.command == Some(Command::ToBiome) {
                    tracing::debug!("main cell hands off to the biome");
                    self.order.set_mode(Mode::Biome);
                    let mut handoff = out;
                    handoff.command = None;
                    self.cascade(&handoff)
                } else {
                    Ok(self.answer(Which::Main, &out))
                }
            }
            Mode::Biome => self.cascade(&code),
        }
    }

    /// Offer the turn to the biome cells in order; the first cell whose
    /// machine does not pass claims it. No claimer sends the turn back to
    /// the main cell as `not_found` and returns the bot to main mode.
    fn cascade(&mut self, code: &Code) -> Result<Reply> {
        for index in 0..self.order.biome_len() {
            let out = self.order.biome_cell_mut(index).head(code)?;
            if out.intent.as_deref() == Some(PASS) {
                continue;
            }

            let reply = self.answer(Which::Biome(index), &out);
            let retention = self.order.biome_cell(index).retention();
            if self.rng.gen::<f32>() < retention {
                self.order.hoist(index);
            } else {
                self.order.drop(index);
            }
            return Ok(reply);
        }

        tracing::debug!("no biome cell claimed the turn");
        self.order.set_mode(Mode::Main);
        let out = self.order.main_mut().head(&Code::from_system(NOT_FOUND))?;
        Ok(self.answer(Which::Main, &out))
    }

    fn answer(&mut self, which: Which, out: &Code) -> Reply {
        let cell = match which {
            Which::Main => self.order.main_mut(),
            Which::Biome(index) => self.order.biome_cell_mut(index),
        };
        let text = if out.intent.as_deref() == Some(PASS) {
            String::new()
        } else {
            cell.render(out)
        };
        let mut reply = Reply {
            text,
            avatar_path: cell.avatar_path(out),
            background_color: cell.background_color().to_string(),
            speaker: cell.name().to_string(),
        };
        if reply.text.is_empty() {
            reply.text = self.fallback_reply.clone();
        }
        self.sink.emit(&reply);
        reply
    }
}
