//! The tokenizer seam.
//!
//! A morphological analyzer is an external collaborator: the engine only
//! consumes a token stream. [`RunTokenizer`] is a coarse built-in stand-in
//! (character-class runs) so the engine works without one; tests that need
//! real morpheme boundaries supply their own implementation.

/// A pure text-to-tokens function with no learned state.
pub trait Tokenizer: Send + Sync {
    fn segment(&self, text: &str) -> Vec<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Hiragana,
    Katakana,
    Ideograph,
    Alphanumeric,
    Space,
    Other,
}

fn class_of(c: char) -> CharClass {
    match c {
        'ぁ'..='ゖ' | 'ゝ' | 'ゞ' => CharClass::Hiragana,
        'ァ'..='ヺ' | 'ー' | 'ヽ' | 'ヾ' => CharClass::Katakana,
        '一'..='鿿' | '々' | '〆' => CharClass::Ideograph,
        c if c.is_alphanumeric() => CharClass::Alphanumeric,
        c if c.is_whitespace() => CharClass::Space,
        _ => CharClass::Other,
    }
}

/// Splits text into runs of a single character class. Whitespace is dropped;
/// punctuation and symbols come out one char at a time so sentence markers
/// survive as independent tokens.
#[derive(Debug, Default, Clone)]
pub struct RunTokenizer;

impl Tokenizer for RunTokenizer {
    fn segment(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        let mut run = String::new();
        let mut run_class = CharClass::Space;

        for c in text.chars() {
            let class = class_of(c);
            let extends = class == run_class && class != CharClass::Other;
            if !extends && !run.is_empty() {
                tokens.push(std::mem::take(&mut run));
            }
            run_class = class;
            if class != CharClass::Space {
                run.push(c);
            }
        }
        if !run.is_empty() {
            tokens.push(run);
        }
        tokens
    }
}
