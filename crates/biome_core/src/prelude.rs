//! Convenience re-exports for downstream crates.

pub use crate::code::{Code, Command, Harvest, Owner, Status};
pub use crate::error::{AutomatonError, ScriptError};
pub use crate::script::{DecoderKind, EncoderKind, ScriptDocument, ScriptLine, StateMachineKind};
pub use crate::token::{RunTokenizer, Tokenizer};
pub use crate::{NOT_FOUND, PASS};
