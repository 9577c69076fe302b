//! Transition tables in the hand-authored text format.
//!
//! A table is a matrix: rows are trigger labels, columns are automaton
//! states. Cell values: 0 = reset, 1 = pop, >= 2 = go to that local state.
//! A dispatch table is derived per state, listing only the triggers with a
//! nonzero transition, in declaration order; the first satisfied trigger
//! predicate wins, falling back to `*`.
//!
//! Row text looks like:
//!
//! ```text
//! *     : 3  0  3  3  0 11
//! indep : 2  0  2  2  0  0
//! ```

use std::collections::HashMap;

use biome_core::AutomatonError;

/// One named table: ordered rows plus the per-state dispatch lists.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    name: String,
    rows: Vec<(String, Vec<usize>)>,
    /// dispatch[state] = [(trigger, next_state)] for every nonzero cell,
    /// preserving row declaration order.
    dispatch: Vec<Vec<(String, usize)>>,
    width: usize,
}

impl TransitionTable {
    pub fn parse(name: &str, lines: &[&str]) -> Result<Self, AutomatonError> {
        let bad = |message: String| AutomatonError::BadTable {
            table: name.to_string(),
            message,
        };

        let mut rows: Vec<(String, Vec<usize>)> = Vec::new();
        for line in lines {
            let (label, cells) = line
                .split_once(':')
                .ok_or_else(|| bad(format!("row \"{line}\" has no ':'")))?;
            let label = label.trim().to_string();
            let cells = cells
                .split_whitespace()
                .map(|c| {
                    c.parse::<usize>()
                        .map_err(|_| bad(format!("row \"{label}\": bad cell \"{c}\"")))
                })
                .collect::<Result<Vec<_>, _>>()?;
            if cells.is_empty() {
                return Err(bad(format!("row \"{label}\" is empty")));
            }
            rows.push((label, cells));
        }

        let width = rows
            .first()
            .map(|(_, cells)| cells.len())
            .ok_or_else(|| bad("table has no rows".to_string()))?;
        if !rows.iter().any(|(label, _)| label == "*") {
            return Err(bad("table has no \"*\" row".to_string()));
        }
        for (label, cells) in &rows {
            if cells.len() != width {
                return Err(bad(format!(
                    "row \"{label}\" has {} cells, expected {width}",
                    cells.len()
                )));
            }
        }

        let mut dispatch = vec![Vec::new(); width];
        for (label, cells) in &rows {
            for (state, &next) in cells.iter().enumerate() {
                if next != 0 {
                    dispatch[state].push((label.clone(), next));
                }
            }
        }

        Ok(Self {
            name: name.to_string(),
            rows,
            dispatch,
            width,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn states(&self) -> usize {
        self.width
    }

    /// The transition cell `[trigger][state]`.
    pub fn next(&self, trigger: &str, state: usize) -> Result<usize, AutomatonError> {
        self.rows
            .iter()
            .find(|(label, _)| label == trigger)
            .and_then(|(_, cells)| cells.get(state))
            .copied()
            .ok_or_else(|| AutomatonError::BadTable {
                table: self.name.clone(),
                message: format!("no cell for trigger \"{trigger}\" at state {state}"),
            })
    }

    /// Triggers with a nonzero transition out of `state`, declaration order.
    pub fn dispatch(&self, state: usize) -> &[(String, usize)] {
        self.dispatch.get(state).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// A family of named tables forming one automaton; `entry` is the outermost
/// table (conventionally `"main"`). A trigger that names another table in
/// the set is pushable as a sub-automaton.
#[derive(Debug, Clone)]
pub struct TableSet {
    entry: String,
    tables: HashMap<String, TransitionTable>,
}

impl TableSet {
    pub fn parse(entry: &str, sources: &[(&str, &[&str])]) -> Result<Self, AutomatonError> {
        let mut tables = HashMap::new();
        for (name, lines) in sources {
            tables.insert((*name).to_string(), TransitionTable::parse(name, lines)?);
        }
        if !tables.contains_key(entry) {
            return Err(AutomatonError::BadTable {
                table: entry.to_string(),
                message: "entry table missing from set".to_string(),
            });
        }
        Ok(Self {
            entry: entry.to_string(),
            tables,
        })
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<&TransitionTable, AutomatonError> {
        self.tables.get(name).ok_or_else(|| AutomatonError::BadTable {
            table: name.to_string(),
            message: "unknown table".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAIN: &[&str] = &[
        "*     : 4  0  4  5  5  5  5",
        "enter : 3  0  3  0  0  0  0",
        "pass  : 2  0  2  6  6  6  6",
    ];

    #[test]
    fn parses_rows_and_cells() {
        let t = TransitionTable::parse("main", MAIN).unwrap();
        assert_eq!(t.states(), 7);
        assert_eq!(t.next("enter", 0).unwrap(), 3);
        assert_eq!(t.next("*", 3).unwrap(), 5);
    }

    #[test]
    fn dispatch_preserves_declaration_order_and_drops_zeros() {
        let t = TransitionTable::parse("main", MAIN).unwrap();
        let d0: Vec<&str> = t.dispatch(0).iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(d0, vec!["*", "enter", "pass"]);
        // state 3: only "*" and "pass" are nonzero
        let d3: Vec<&str> = t.dispatch(3).iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(d3, vec!["*", "pass"]);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = TransitionTable::parse("bad", &["* : 0 1", "x : 0"]).unwrap_err();
        assert!(matches!(err, AutomatonError::BadTable { .. }));
    }

    #[test]
    fn missing_wildcard_row_is_rejected() {
        let err = TransitionTable::parse("bad", &["x : 0 1"]).unwrap_err();
        assert!(matches!(err, AutomatonError::BadTable { .. }));
    }

    #[test]
    fn table_set_requires_entry() {
        let err = TableSet::parse("main", &[("sub", &["* : 0 1"][..])]).unwrap_err();
        assert!(matches!(err, AutomatonError::BadTable { .. }));
    }
}
