//! Property-based tests for biome_core.
//!
//! Uses proptest to verify invariants that must hold for ALL possible inputs,
//! not just hand-picked examples.

use proptest::prelude::*;

use biome_core::{RunTokenizer, ScriptDocument, Tokenizer};

proptest! {
    /// Tokenization drops whitespace and nothing else.
    #[test]
    fn tokens_concatenate_back_to_the_text(text in "\\PC{0,40}") {
        let joined: String = RunTokenizer.segment(&text).concat();
        let expected: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        prop_assert_eq!(joined, expected);
    }

    /// No token is ever empty or contains whitespace.
    #[test]
    fn tokens_are_nonempty_and_whitespace_free(text in "\\PC{0,40}") {
        for token in RunTokenizer.segment(&text) {
            prop_assert!(!token.is_empty());
            prop_assert!(!token.chars().any(char::is_whitespace));
        }
    }

    /// A mixed Japanese utterance always splits into at most one token per
    /// character (runs only merge, never invent).
    #[test]
    fn token_count_never_exceeds_char_count(text in "[ぁ-んァ-ン一-鿆a-z0-9、。 ]{0,30}") {
        let chars = text.chars().filter(|c| !c.is_whitespace()).count();
        prop_assert!(RunTokenizer.segment(&text).len() <= chars);
    }

    /// Arbitrary text is rejected cleanly, never a panic.
    #[test]
    fn script_parse_never_panics(text in "\\PC{0,60}") {
        let _ = ScriptDocument::parse(&text);
    }
}
