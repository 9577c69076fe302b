//! Bot assembly and orchestration.
//!
//! A bot is one main cell plus a biome of helper cells, all authored as JSON
//! script documents. Loading is an async warm-up phase; after that each user
//! turn runs synchronously through encode, state machine and decode, with
//! the biome competing for turns the main cell hands off.

pub mod bot;
pub mod cell;
pub mod config;
pub mod order;
pub mod source;

pub use bot::{Biomebot, NullSink, Reply, ReplySink};
pub use cell::Cell;
pub use config::BotConfig;
pub use order::{CellOrder, Mode};
pub use source::{cell_name, FsScriptSource, ScriptSource};
