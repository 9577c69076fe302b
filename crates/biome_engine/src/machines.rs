//! State-machine dialects over the shared pushdown runner.
//!
//! Each dialect is a table set plus a trigger lexicon; the control flow
//! lives in [`Pushdown::drive`], never here. The resolved trigger becomes
//! the outgoing intent (the wildcard stays `None`) and selects the avatar.
//!
//! Dialects:
//! - [`BasicMachine`]: gate on `enter`, answer while the score clears the
//!   precision threshold, `pass` otherwise.
//! - [`EnterlessMachine`]: the same without the `enter` gate, for biome
//!   cells that never open a session.
//! - [`CentralMachine`]: the main cell's presence lifecycle
//!   `enter (initial loop* exit)+` with the naming sub-dialogue, a
//!   refractory cool-down after `exit`, and the `to_biome` hand-off.

use std::sync::Arc;

use biome_automaton::{Flow, Lexicon, Pushdown, TableSet};
use biome_core::{AutomatonError, Code, Command, ScriptDocument, NOT_FOUND};
use biome_memory::MemoryStore;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

const ENTER_KEY: &str = "{ENTER}";
const LAST_KEY: &str = "{LAST}";
const BOT_NAME_SPOKEN_KEY: &str = "{BOT_NAME_SPOKEN}";

fn basic_avatar(trigger: &str) -> &'static str {
    match trigger {
        "enter" => "waving.svg",
        "pass" => "peace.svg",
        _ => "cheer.svg",
    }
}

fn central_avatar(trigger: &str) -> &'static str {
    match trigger {
        "appear" | "summon" | "exit" => "waving.svg",
        "absent" | "std_by" => "absent.svg",
        "bot_break" => "down.svg",
        "bot_confirm" => "cheer.svg",
        _ => "peace.svg",
    }
}

/// Map the settled trigger onto the outgoing code.
fn settle(mut code: Code, trigger: &str, avatar: &'static str) -> Code {
    code.intent = (trigger != "*").then(|| trigger.to_string());
    code.avatar = Some(avatar.to_string());
    code.command = None;
    code
}

/// Score-threshold lexicon shared by the basic and enterless dialects.
struct GateLex {
    precision: f32,
}

impl Lexicon<Code> for GateLex {
    fn matches(&mut self, trigger: &str, code: &Code) -> bool {
        match trigger {
            "enter" => code.intent.as_deref() == Some("enter"),
            "pass" => code.score <= self.precision,
            _ => false,
        }
    }

    fn describe(&self, code: &Code) -> String {
        code.text.clone()
    }
}

pub struct BasicMachine {
    pushdown: Pushdown,
    precision: f32,
}

impl BasicMachine {
    pub fn new(precision: f32) -> Result<Self, AutomatonError> {
        let tables = TableSet::parse(
            "main",
            &[(
                "main",
                &[
                    //       0  1  2  3  4  5  6
                    "*     : 4  0  4  5  5  5  5",
                    "enter : 3  0  3  0  0  0  0",
                    "pass  : 2  0  2  6  6  6  6",
                ][..],
            )],
        )?;
        Ok(Self {
            pushdown: Pushdown::new(Arc::new(tables)),
            precision,
        })
    }

    pub fn run(&mut self, code: &Code) -> Result<Code, AutomatonError> {
        let mut code = code.clone();
        let mut lex = GateLex {
            precision: self.precision,
        };
        let drive = self.pushdown.drive(&mut code, &mut lex)?;
        Ok(settle(code, &drive.trigger, basic_avatar(&drive.trigger)))
    }
}

pub struct EnterlessMachine {
    pushdown: Pushdown,
    precision: f32,
}

impl EnterlessMachine {
    pub fn new(precision: f32) -> Result<Self, AutomatonError> {
        let tables = TableSet::parse(
            "main",
            &[(
                "main",
                &[
                    //       0  1  2  3  4  5  6
                    "*     : 4  0  4  5  5  5  5",
                    "pass  : 2  0  2  6  6  6  6",
                ][..],
            )],
        )?;
        Ok(Self {
            pushdown: Pushdown::new(Arc::new(tables)),
            precision,
        })
    }

    pub fn run(&mut self, code: &Code) -> Result<Code, AutomatonError> {
        let mut code = code.clone();
        let mut lex = GateLex {
            precision: self.precision,
        };
        let drive = self.pushdown.drive(&mut code, &mut lex)?;
        Ok(settle(code, &drive.trigger, basic_avatar(&drive.trigger)))
    }
}

/// `enter ( initial loop* exit )+` over four tables.
///
/// ```text
/// initial   ::= ( absent std_by* summon ) | appear
/// loop      ::= to_biome? ( not_found | bot_namer )
/// bot_namer ::= bot_naming bot_renaming* ( bot_confirm | bot_break )
/// ```
fn central_tables() -> Result<TableSet, AutomatonError> {
    TableSet::parse(
        "main",
        &[
            (
                "main",
                &[
                    //            0  1  2  3  4  5
                    "*         : 2  0  0  0  0  0",
                    "enter     : 2  0  0  0  0  0",
                    "initial   : 0  0  3  0  0  3",
                    "loop      : 0  0  0  4  4  0",
                    "exit      : 0  0  0  5  5  0",
                ][..],
            ),
            (
                "initial",
                &[
                    //            0  1  2  3  4  5
                    "*         : 0  0  0  0  1  1",
                    "absent    : 2  0  0  0  0  0",
                    "std_by    : 0  0  3  3  0  0",
                    "summon    : 0  0  4  4  0  0",
                    "appear    : 5  0  0  0  0  0",
                ][..],
            ),
            (
                "loop",
                &[
                    //            0  1  2  3  4
                    "*         : 0  0  0  1  1",
                    "to_biome  : 2  0  0  0  0",
                    "bot_namer : 4  0  4  0  0",
                    "not_found : 3  0  3  0  0",
                ][..],
            ),
            (
                "bot_namer",
                &[
                    //               0  1  2  3  4  5
                    "*            : 0  0  0  0  1  1",
                    "bot_naming   : 2  0  0  0  0  0",
                    "bot_renaming : 0  0  3  3  0  0",
                    "bot_confirm  : 0  0  4  4  0  0",
                    "bot_break    : 0  0  5  5  0  0",
                ][..],
            ),
        ],
    )
}

struct CentralLex<'a> {
    precision: f32,
    refract_count: u32,
    memory: &'a MemoryStore,
    rng: &'a mut StdRng,
}

impl Lexicon<Code> for CentralLex<'_> {
    fn matches(&mut self, trigger: &str, code: &Code) -> bool {
        let intent = code.intent.as_deref();
        match trigger {
            "enter" => intent == Some("enter"),
            "initial" => {
                matches!(intent, Some("absent") | Some("appear")) || self.refract_count > 0
            }
            "loop" => intent != Some("exit"),
            "exit" => intent == Some("exit"),
            "absent" => intent == Some("absent") || self.refract_count > 0,
            "std_by" => intent != Some("summon"),
            "summon" => self.refract_count < 1 && intent == Some("summon"),
            "appear" => intent == Some("appear") && self.refract_count == 0,
            "to_biome" => intent != Some("bot_naming") || code.score <= self.precision,
            "not_found" => intent == Some(NOT_FOUND) || code.score <= self.precision,
            "bot_namer" | "bot_naming" => intent == Some("bot_naming"),
            "bot_renaming" => intent == Some("bot_renaming"),
            "bot_confirm" => intent == Some("bot_confirm"),
            "bot_break" => !matches!(intent, Some("bot_renaming") | Some("bot_confirm")),
            _ => false,
        }
    }

    fn on_state(&mut self, table: &str, state: usize, trigger: &str, code: &mut Code) -> Flow {
        // An opening turn draws which presence the bot wakes up in from
        // memory. The wildcard lands here too after any mid-session reset.
        if table == "main" && state == 2 {
            let candidates = self.memory.values(ENTER_KEY);
            code.intent = Some(
                candidates
                    .choose(self.rng)
                    .cloned()
                    .unwrap_or_else(|| "absent".to_string()),
            );
            return Flow::Continue;
        }
        if trigger == "to_biome" {
            return Flow::Yield;
        }
        Flow::Accept
    }

    fn describe(&self, code: &Code) -> String {
        format!("{} (intent {:?})", code.text, code.intent)
    }
}

pub struct CentralMachine {
    pushdown: Pushdown,
    precision: f32,
    refractory: u32,
    refract_count: u32,
    memory: Arc<MemoryStore>,
    rng: StdRng,
}

impl CentralMachine {
    pub fn new(doc: &ScriptDocument, memory: Arc<MemoryStore>) -> Result<Self, AutomatonError> {
        Ok(Self {
            pushdown: Pushdown::new(Arc::new(central_tables()?)),
            precision: doc.precision.unwrap_or(0.0),
            refractory: doc.refractory.unwrap_or(4),
            refract_count: 0,
            memory,
            rng: StdRng::from_entropy(),
        })
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn run(&mut self, code: &Code) -> Result<Code, AutomatonError> {
        let mut code = code.clone();
        let mut lex = CentralLex {
            precision: self.precision,
            refract_count: self.refract_count,
            memory: &self.memory,
            rng: &mut self.rng,
        };
        let drive = self.pushdown.drive(&mut code, &mut lex)?;

        if drive.yielded {
            // Hand-off keeps the encoder's intent for the biome cells.
            code.command = Some(Command::ToBiome);
            return Ok(code);
        }

        match drive.trigger.as_str() {
            "std_by" if self.refract_count > 0 => self.refract_count -= 1,
            "exit" => self.refract_count = self.refractory,
            _ => {}
        }
        if drive.trigger.ends_with("naming") {
            if let Some(harvest) = code.harvests.first() {
                self.memory.set(LAST_KEY, harvest.surface.clone());
            }
        }
        if drive.trigger == "bot_confirm" {
            if let Some(last) = self.memory.values(LAST_KEY).first() {
                self.memory.add(BOT_NAME_SPOKEN_KEY, last.clone());
            }
        }

        Ok(settle(code, &drive.trigger, central_avatar(&drive.trigger)))
    }
}
