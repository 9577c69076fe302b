//! Property-based tests for biome_automaton.
//!
//! Uses proptest to verify invariants that must hold for ALL possible inputs,
//! not just hand-picked examples.

use std::sync::Arc;

use proptest::prelude::*;

use biome_automaton::{Lexicon, Pushdown, TableSet, TransitionTable};
use biome_core::AutomatonError;

/// Render a random matrix into the text table format.
fn table_text(rows: &[(String, Vec<usize>)]) -> Vec<String> {
    rows.iter()
        .map(|(label, cells)| {
            let cells: Vec<String> = cells.iter().map(usize::to_string).collect();
            format!("{label} : {}", cells.join(" "))
        })
        .collect()
}

fn arb_matrix() -> impl Strategy<Value = Vec<(String, Vec<usize>)>> {
    // A "*" row plus up to three labeled rows, all the same width, with
    // cell values inside the state range.
    (2usize..8).prop_flat_map(|width| {
        let row = proptest::collection::vec(0..width, width);
        (row.clone(), proptest::collection::vec(row, 0..3)).prop_map(|(star, labeled)| {
            let mut rows = vec![("*".to_string(), star)];
            for (i, cells) in labeled.into_iter().enumerate() {
                rows.push((format!("t{i}"), cells));
            }
            rows
        })
    })
}

/// Predicate = token equality with the trigger label.
struct Literal;

impl Lexicon<String> for Literal {
    fn matches(&mut self, trigger: &str, input: &String) -> bool {
        trigger != "*" && trigger == input
    }
}

proptest! {
    /// The parsed table reproduces every cell, and each dispatch list holds
    /// exactly the nonzero cells of its column in declaration order.
    #[test]
    fn parse_round_trips_cells_into_dispatch(rows in arb_matrix()) {
        let lines = table_text(&rows);
        let line_refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let table = TransitionTable::parse("t", &line_refs).unwrap();
        let width = rows[0].1.len();
        prop_assert_eq!(table.states(), width);

        for (label, cells) in &rows {
            for (state, &cell) in cells.iter().enumerate() {
                prop_assert_eq!(table.next(label, state).unwrap(), cell);
            }
        }
        for state in 0..width {
            let expected: Vec<(&str, usize)> = rows
                .iter()
                .filter(|(_, cells)| cells[state] != 0)
                .map(|(label, cells)| (label.as_str(), cells[state]))
                .collect();
            let got: Vec<(&str, usize)> = table
                .dispatch(state)
                .iter()
                .map(|(label, next)| (label.as_str(), *next))
                .collect();
            prop_assert_eq!(got, expected);
        }
    }

    /// Driving any single-table automaton over any input either settles or
    /// reports the loop cap; it never panics and never underflows the stack.
    #[test]
    fn drive_always_terminates(rows in arb_matrix(), inputs in proptest::collection::vec("t[0-2]|x", 1..6)) {
        let lines = table_text(&rows);
        let line_refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let tables = match TableSet::parse("main", &[("main", &line_refs[..])]) {
            Ok(t) => t,
            Err(_) => return Ok(()),
        };
        let width = rows[0].1.len();
        let mut pd = Pushdown::new(Arc::new(tables));
        for input in inputs {
            let mut input = input;
            let _ = pd.drive(&mut input, &mut Literal);
            prop_assert!(pd.depth() >= 1);
            let (_, state) = pd.top();
            prop_assert!(state < width);
        }
    }

    /// The loop cap is the only way a structurally cyclic table ends.
    #[test]
    fn all_zero_wildcard_row_hits_the_cap(width in 2usize..6) {
        let line = format!("* : {}", vec!["0"; width].join(" "));
        let tables = TableSet::parse("main", &[("main", &[line.as_str()][..])]).unwrap();
        let mut pd = Pushdown::new(Arc::new(tables));
        let err = pd.drive(&mut "x".to_string(), &mut Literal).unwrap_err();
        prop_assert!(
            matches!(err, AutomatonError::LoopCap { .. }),
            "expected AutomatonError::LoopCap, got {:?}",
            err
        );
    }
}
