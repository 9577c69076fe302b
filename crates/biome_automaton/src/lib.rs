pub mod pushdown;
pub mod segmenter;
pub mod table;

pub use pushdown::{Drive, Flow, Lexicon, Pushdown, LOOP_CAP};
pub use segmenter::{PhraseSegmenter, TaggedToken};
pub use table::{TableSet, TransitionTable};
