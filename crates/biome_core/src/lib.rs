pub mod code;
pub mod error;
pub mod prelude;
pub mod script;
pub mod token;

pub use code::{Code, Command, Harvest, Owner, Status};
pub use error::{AutomatonError, ScriptError};
pub use script::{DecoderKind, EncoderKind, ScriptDocument, ScriptLine, StateMachineKind};
pub use token::{RunTokenizer, Tokenizer};

/// Intent label produced when no cell can answer a turn.
pub const NOT_FOUND: &str = "not_found";

/// Intent label a biome cell emits to yield the turn to the next cell.
pub const PASS: &str = "pass";
