//! Simple phrase segmentation over a morpheme token stream.
//!
//! Tokens are regrouped into grammatical phrases by driving the shared
//! pushdown runner with one table per phrase category. A recognized phrase
//! loses its case particle and gains a category tag instead, absorbing
//! notation differences like 「藤野先生が」/「藤野先生は」:
//!
//! 藤野先生が新宿の本屋にいる → 藤野先生\t主者 | 新宿\t修飾語 | 本屋\t目的語 | いる
//!
//! A person suffix (さん/君/…) switches the tag to its "-person" variant.
//! Independent words (conjunctions, punctuation) pass through normalized.
//! Only サ変 verbs are phrased; other conjugations stay raw morphemes.

use std::sync::Arc;

use biome_core::{AutomatonError, Tokenizer};

use crate::pushdown::{Flow, Lexicon, Pushdown};
use crate::table::TableSet;

/// Appended so the automaton never ends mid-phrase; stripped from output.
const SENTINEL: &str = "\t";

/// A segmenter output token split at the surface/tag boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaggedToken<'a> {
    pub surface: &'a str,
    pub phrase_type: Option<&'a str>,
}

impl<'a> TaggedToken<'a> {
    pub fn parse(token: &'a str) -> Self {
        match token.split_once('\t') {
            Some((surface, phrase_type)) => Self {
                surface,
                phrase_type: Some(phrase_type),
            },
            None => Self {
                surface: token,
                phrase_type: None,
            },
        }
    }

    pub fn tagged(surface: &str, phrase_type: &str) -> String {
        format!("{surface}\t{phrase_type}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhraseKind {
    Subj,
    Obj,
    Dest,
    Mod,
    By,
    Verb,
    /// A possessive run absorbed into the phrase that follows it; never
    /// emitted standalone.
    Posses,
}

impl PhraseKind {
    /// Tag text, with the person variant used after a person suffix.
    fn tag(self, person: bool) -> Option<&'static str> {
        let pair = match self {
            PhraseKind::Subj => ("主語", "主者"),
            PhraseKind::Obj => ("対象語", "対象者"),
            PhraseKind::Dest => ("目的語", "目的者"),
            PhraseKind::Mod => ("修飾語", "修飾者"),
            PhraseKind::By => ("手段語", "手段者"),
            PhraseKind::Verb => ("述語", "述者"),
            PhraseKind::Posses => return None,
        };
        Some(if person { pair.1 } else { pair.0 })
    }
}

/// Accumulates surface text until a terminating state converts it.
#[derive(Debug, Default)]
struct Fruit {
    surfaces: Vec<String>,
    kind: Option<PhraseKind>,
    person: bool,
}

enum Converted {
    Phrase(String),
    /// No category was assigned; the raw morphemes stand.
    Keep,
    /// Possessive: drop the pending morphemes, keep the surface for the
    /// phrase that follows.
    Absorb,
}

impl Fruit {
    fn convert(&self) -> Converted {
        let Some(kind) = self.kind else {
            return Converted::Keep;
        };
        match kind.tag(self.person) {
            Some(tag) => Converted::Phrase(TaggedToken::tagged(&self.surfaces.concat(), tag)),
            None => Converted::Absorb,
        }
    }
}

/// Normalized form of an independent word, or `None` if the token is not
/// independent. Also absorbs spelling variants of a few interjections.
fn normalize_indep(token: &str) -> Option<&'static str> {
    Some(match token {
        "しかし" | "だけど" => "しかし",
        "なので" | "だから" | "それで" | "そんで" => "なので",
        "あはは" => "あはは",
        "わはは" => "わはは",
        "おそらく" | "多分" => "おそらく",
        "、" => "、",
        "。" => "。",
        "?" | "？" => "？",
        "!" | "！" => "！",
        SENTINEL => SENTINEL,
        _ => return None,
    })
}

fn is_person_suffix(token: &str) -> bool {
    matches!(token, "さん" | "君" | "ちゃん" | "先生" | "先輩")
}

fn is_by_particle(token: &str) -> bool {
    matches!(token, "で" | "により" | "による" | "によって")
}

/// Trigger predicates over a single morpheme token.
fn trigger_fires(trigger: &str, token: &str) -> bool {
    match trigger {
        "*" => false,
        "indep" => normalize_indep(token).is_some(),
        "subj" => matches!(token, "が" | "は" | "と"),
        "obj" => matches!(token, "を" | "の"),
        "dest" => matches!(token, "に" | "まで"),
        "mod" => matches!(token, "な" | "だ" | "ね"),
        "verb" => matches!(token, "する" | "し"),
        "suf" => is_person_suffix(token),
        "by" | "で" => is_by_particle(token),
        "こと" => matches!(token, "こと" | "事"),
        literal => token == literal,
    }
}

fn phrase_tables() -> Result<TableSet, AutomatonError> {
    TableSet::parse(
        "main",
        &[
            (
                "main",
                &[
                    //       0  1  2  3  4  5  6  7  8  9 10 11
                    "*     : 3  0  3  3  0 11 11 11 11 11 11  0",
                    "indep : 2  0  2  2  0  0  0  0  0  0  0  0",
                    "suf   : 0  0  0  4  0  0  0  0  0  0  0  0",
                    "subj  : 0  0  0  5  5  0  0  0  0  0  0  0",
                    "obj   : 0  0  0  6  6  0  0  0  0  0  0  0",
                    "dest  : 0  0  0  7  7  0  0  0  0  0  0  0",
                    "mod   : 0  0  0  8  8  0  0  0  0  0  0  0",
                    "verb  : 0  0  0  9  9  0  0  0  0  0  0  0",
                    "by    : 0  0  0 10 10  0  0  0  0  0  0  0",
                ][..],
            ),
            (
                "subj",
                &[
                    //       0  1  2  3  4  5
                    "*     : 0  0  5  5  5  1",
                    "が    : 2  0  0  0  0  0",
                    "は    : 3  0  0  0  0  0",
                    "と    : 4  0  0  0  0  0",
                ][..],
            ),
            (
                "obj",
                &[
                    //       0  1  2  3  4  5  6  7  8  9 10 11
                    "*     : 0  0  3  1  5  1  7  8  1  1  1  1",
                    "を    : 2  0  0  0  0  0  0  0  0  0  0  0",
                    "の    : 4  0  0  0  0  0  0  0  0  0  0  0",
                    "こと  : 0  0  0  0  0  6  0  0  0  0  0  0",
                    "subj  : 0  0  0  0  0  0  9  0  0  0  0  0",
                    "dest  : 0  0  0  0  0  0 10  0  0  0  0  0",
                    "by    : 0  0  0  0  0  0 11  0  0  0  0  0",
                ][..],
            ),
            (
                "dest",
                &[
                    //       0  1  2  3  4  5
                    "*     : 0  0  5  5  5  1",
                    "に    : 2  0  0  0  0  0",
                    "は    : 0  0  3  0  0  0",
                    "まで  : 4  0  0  0  0  0",
                ][..],
            ),
            (
                "mod",
                &[
                    //       0  1  2  3  4  5
                    "*     : 0  0  5  5  5  1",
                    "な    : 2  0  0  0  0  0",
                    "だ    : 3  0  0  0  0  0",
                    "ね    : 4  0  0  0  0  0",
                ][..],
            ),
            (
                "by",
                &[
                    //       0  1  2  3
                    "*     : 0  0  3  1",
                    "で    : 2  0  0  0",
                ][..],
            ),
            (
                "verb",
                &[
                    //       0  1  2  3  4  5
                    "*     : 0  0  5  0  5  1",
                    "する  : 2  0  0  0  0  0",
                    "し    : 3  0  0  0  0  0",
                    "た    : 0  0  0  4  0  0",
                ][..],
            ),
        ],
    )
}

/// The segmenter dialect: fruit accumulation plus the line/buffer shuffle
/// shared with the runner's reset path.
#[derive(Default)]
struct SegmentRun {
    fruit: Fruit,
    line: Vec<String>,
    buff: Vec<String>,
}

impl Lexicon<String> for SegmentRun {
    fn matches(&mut self, trigger: &str, token: &String) -> bool {
        trigger_fires(trigger, token)
    }

    fn on_state(&mut self, table: &str, state: usize, _trigger: &str, _token: &mut String) -> Flow {
        match (table, state) {
            ("main", 11) => {
                match self.fruit.convert() {
                    Converted::Phrase(tagged) => {
                        self.buff.clear();
                        self.buff.push(tagged);
                    }
                    Converted::Keep => {}
                    Converted::Absorb => self.buff.clear(),
                }
                Flow::Continue
            }
            ("subj", 5) => self.assign(PhraseKind::Subj),
            ("obj", 3) | ("obj", 8) => self.assign(PhraseKind::Obj),
            ("obj", 5) => self.assign(PhraseKind::Mod),
            ("dest", 5) => self.assign(PhraseKind::Dest),
            ("mod", 5) => self.assign(PhraseKind::Mod),
            ("by", 3) => self.assign(PhraseKind::By),
            ("verb", 5) => self.assign(PhraseKind::Verb),
            _ => Flow::Accept,
        }
    }

    fn on_reset(&mut self) {
        self.fruit = Fruit::default();
        self.line.append(&mut self.buff);
    }

    fn describe(&self, token: &String) -> String {
        token.clone()
    }
}

impl SegmentRun {
    fn assign(&mut self, kind: PhraseKind) -> Flow {
        self.fruit.kind = Some(kind);
        Flow::Continue
    }
}

/// Token-stream-to-phrases segmenter of the engine front end.
pub struct PhraseSegmenter {
    tokenizer: Arc<dyn Tokenizer>,
    tables: Arc<TableSet>,
}

impl PhraseSegmenter {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Result<Self, AutomatonError> {
        Ok(Self {
            tokenizer,
            tables: Arc::new(phrase_tables()?),
        })
    }

    /// Tokenize and segment one utterance.
    pub fn segment(&self, text: &str) -> Result<Vec<String>, AutomatonError> {
        self.segment_tokens(self.tokenizer.segment(text))
    }

    /// Segment an externally supplied morpheme stream.
    pub fn segment_tokens(&self, mut tokens: Vec<String>) -> Result<Vec<String>, AutomatonError> {
        tokens.push(SENTINEL.to_string());

        let mut pushdown = Pushdown::new(self.tables.clone());
        let mut run = SegmentRun::default();

        for mut token in tokens {
            let drive = pushdown.drive(&mut token, &mut run)?;

            if drive.trigger == "indep" {
                // pass through, normalized
                run.line.append(&mut run.buff);
                run.fruit.surfaces.clear();
                let normalized = normalize_indep(&token).unwrap_or(&token);
                run.line.push(normalized.to_string());
                continue;
            }

            if drive.trigger == "*" || drive.trigger == "suf" {
                // particles are dropped from the phrase surface
                run.fruit.surfaces.push(token.clone());
            }
            run.buff.push(token);

            if drive.table == "main" && drive.state == 4 {
                run.fruit.person = true;
            }
        }

        let mut line = run.line;
        line.append(&mut run.buff);
        line.pop(); // sentinel
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hands back a pre-split morpheme stream; segmentation itself is the
    /// external analyzer's job.
    struct Morphemes;

    impl Tokenizer for Morphemes {
        fn segment(&self, text: &str) -> Vec<String> {
            text.split(' ').map(str::to_string).collect()
        }
    }

    fn segmenter() -> PhraseSegmenter {
        PhraseSegmenter::new(Arc::new(Morphemes)).unwrap()
    }

    fn segment(text: &str) -> Vec<String> {
        segmenter().segment(text).unwrap()
    }

    #[test]
    fn tags_subject_phrase_and_drops_particle() {
        assert_eq!(segment("猫 が いる"), vec!["猫\t主語", "いる"]);
    }

    #[test]
    fn person_suffix_selects_person_variant() {
        assert_eq!(
            segment("藤野 先生 が いる"),
            vec!["藤野先生\t主者", "いる"]
        );
    }

    #[test]
    fn subject_notation_variants_collapse() {
        // 「猫が」 and 「猫は」 produce the same tagged phrase
        assert_eq!(segment("猫 は いる"), segment("猫 が いる"));
    }

    #[test]
    fn object_and_destination_phrases() {
        assert_eq!(
            segment("新宿 の 本屋 に いる"),
            vec!["新宿\t修飾語", "本屋\t目的語", "いる"]
        );
    }

    #[test]
    fn wo_marks_target_phrase() {
        assert_eq!(segment("本 を 読む"), vec!["本\t対象語", "読む"]);
    }

    #[test]
    fn independent_words_pass_through_normalized() {
        assert_eq!(
            segment("だけど 猫 が いる"),
            vec!["しかし", "猫\t主語", "いる"]
        );
    }

    #[test]
    fn punctuation_passes_through() {
        assert_eq!(segment("猫 が いる 。"), vec!["猫\t主語", "いる", "。"]);
    }

    #[test]
    fn untyped_run_stays_raw_morphemes() {
        assert_eq!(segment("おはよう ござい ます"), vec!["おはよう", "ござい", "ます"]);
    }

    #[test]
    fn suru_verb_is_phrased() {
        assert_eq!(segment("勉強 する"), vec!["勉強\t述語"]);
    }

    #[test]
    fn tagged_token_parse_roundtrip() {
        let t = TaggedToken::parse("藤野先生\t主者");
        assert_eq!(t.surface, "藤野先生");
        assert_eq!(t.phrase_type, Some("主者"));
        let plain = TaggedToken::parse("いる");
        assert_eq!(plain.surface, "いる");
        assert_eq!(plain.phrase_type, None);
    }
}
