//! The generic pushdown interpreter.
//!
//! One `drive` call re-evaluates the top stack frame until the automaton
//! settles: cell value 0 collapses the stack back to the entry frame, 1 pops
//! a frame, a trigger that names another table in the set pushes it as a
//! sub-automaton, and anything else is handed to the dialect hook, which
//! either keeps looping (side effect applied) or terminates the call with
//! the winning trigger. A hard iteration cap guards against misconfigured
//! tables; exceeding it is a configuration bug, not a recoverable state.

use std::sync::Arc;

use biome_core::AutomatonError;

use crate::table::TableSet;

/// Re-evaluations allowed per `drive` call before the automaton is declared
/// misconfigured.
pub const LOOP_CAP: usize = 100;

/// What a dialect hook tells the runner to do after a non-structural
/// transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Side effect applied; re-evaluate the same input.
    Continue,
    /// Terminate normally with this trigger.
    Accept,
    /// Terminate early; the dialect recorded a command for the caller.
    Yield,
}

/// Trigger predicates plus dialect side effects for one automaton.
pub trait Lexicon<I> {
    /// Does `trigger` fire for this input? `"*"` must answer `false`; it is
    /// the fallback, not a predicate.
    fn matches(&mut self, trigger: &str, input: &I) -> bool;

    /// Called when a transition neither resets, pops, nor pushes. The
    /// default dialect has no mid-loop side effects and terminates.
    fn on_state(&mut self, _table: &str, _state: usize, _trigger: &str, _input: &mut I) -> Flow {
        Flow::Accept
    }

    /// Called on every reset (cell value 0), before re-evaluation.
    fn on_reset(&mut self) {}

    /// Short description of the input for loop-cap diagnostics.
    fn describe(&self, _input: &I) -> String {
        String::new()
    }
}

/// Where a `drive` call settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drive {
    pub table: String,
    pub state: usize,
    pub trigger: String,
    /// True when the dialect ended the call with [`Flow::Yield`].
    pub yielded: bool,
}

/// Stack of `(table, state)` frames over a shared table set.
#[derive(Debug, Clone)]
pub struct Pushdown {
    tables: Arc<TableSet>,
    stack: Vec<(String, usize)>,
}

impl Pushdown {
    pub fn new(tables: Arc<TableSet>) -> Self {
        let entry = tables.entry().to_string();
        Self {
            tables,
            stack: vec![(entry, 0)],
        }
    }

    pub fn tables(&self) -> &TableSet {
        &self.tables
    }

    /// Collapse back to the entry frame.
    pub fn reset(&mut self) {
        let entry = self.tables.entry().to_string();
        self.stack = vec![(entry, 0)];
    }

    /// The current `(table, state)` frame.
    pub fn top(&self) -> (&str, usize) {
        let (table, state) = self.stack.last().expect("stack never empties");
        (table.as_str(), *state)
    }

    /// Depth of the automaton stack (1 = only the entry frame).
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Run the automaton over one input until it settles.
    pub fn drive<I, L>(&mut self, input: &mut I, lex: &mut L) -> Result<Drive, AutomatonError>
    where
        L: Lexicon<I> + ?Sized,
    {
        let mut loops = 0;
        loop {
            loops += 1;
            if loops > LOOP_CAP {
                let (table, _) = self.top();
                return Err(AutomatonError::LoopCap {
                    table: table.to_string(),
                    at: lex.describe(input),
                });
            }

            let (table_name, state) = {
                let (t, s) = self.top();
                (t.to_string(), s)
            };
            let table = self.tables.get(&table_name)?;
            let trigger = table
                .dispatch(state)
                .iter()
                .find(|(label, _)| lex.matches(label, input))
                .map(|(label, _)| label.clone())
                .unwrap_or_else(|| "*".to_string());
            let next = table.next(&trigger, state)?;
            tracing::trace!(table = %table_name, state, %trigger, next, "transition");

            self.stack.last_mut().expect("stack never empties").1 = next;

            if next == 0 {
                self.reset();
                lex.on_reset();
                continue;
            }
            if next == 1 {
                self.stack.pop();
                if self.stack.is_empty() {
                    self.reset();
                    lex.on_reset();
                }
                continue;
            }
            if self.tables.contains(&trigger) {
                self.stack.push((trigger, 0));
                continue;
            }

            match lex.on_state(&table_name, next, &trigger, input) {
                Flow::Continue => continue,
                Flow::Accept => {
                    return Ok(Drive {
                        table: table_name,
                        state: next,
                        trigger,
                        yielded: false,
                    })
                }
                Flow::Yield => {
                    return Ok(Drive {
                        table: table_name,
                        state: next,
                        trigger,
                        yielded: true,
                    })
                }
            }
        }
    }
}
