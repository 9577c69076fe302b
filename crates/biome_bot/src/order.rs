//! Execution order of the main cell and its biome.
//!
//! The orchestrator iterates cells by index through `&mut` access, so
//! reordering while an iteration borrow is live cannot compile. Hoist and
//! drop implement the stochastic most-recently-successful-first scheduler.

use crate::cell::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Main,
    Biome,
}

pub struct CellOrder {
    main: Cell,
    biome: Vec<Cell>,
    mode: Mode,
}

impl CellOrder {
    pub fn new(main: Cell, biome: Vec<Cell>) -> Self {
        Self {
            main,
            biome,
            mode: Mode::Main,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn main_mut(&mut self) -> &mut Cell {
        &mut self.main
    }

    pub fn biome_len(&self) -> usize {
        self.biome.len()
    }

    pub fn biome_cell(&self, index: usize) -> &Cell {
        &self.biome[index]
    }

    pub fn biome_cell_mut(&mut self, index: usize) -> &mut Cell {
        &mut self.biome[index]
    }

    /// Current biome order, front first.
    pub fn biome_names(&self) -> Vec<&str> {
        self.biome.iter().map(Cell::name).collect()
    }

    /// Move the cell at `index` to the front of the biome.
    pub fn hoist(&mut self, index: usize) {
        if index > 0 && index < self.biome.len() {
            let cell = self.biome.remove(index);
            self.biome.insert(0, cell);
        }
    }

    /// Move the cell at `index` to the back of the biome.
    pub fn drop(&mut self, index: usize) {
        if index + 1 < self.biome.len() {
            let cell = self.biome.remove(index);
            self.biome.push(cell);
        }
    }

    pub fn reseed(&mut self, seed: u64) {
        self.main.reseed(seed);
        for (i, cell) in self.biome.iter_mut().enumerate() {
            cell.reseed(seed.wrapping_add(10 + i as u64));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use biome_core::{RunTokenizer, ScriptDocument};
    use biome_engine::TAG_DEPTH;
    use biome_memory::{InMemoryBackend, MemoryStore};

    fn cell(name: &str, memory: Arc<MemoryStore>) -> Cell {
        let doc = ScriptDocument::parse(
            r#"{
                "encoder": "BowEncoder",
                "stateMachine": "EnterlessStateMachine",
                "decoder": "EchoDecoder",
                "precision": 0.3,
                "script": [{"in": ["a"], "out": ["b"]}]
            }"#,
        )
        .unwrap();
        Cell::build(name, &doc, Arc::new(RunTokenizer), memory, TAG_DEPTH).unwrap()
    }

    async fn order() -> CellOrder {
        let memory = Arc::new(
            MemoryStore::open(Arc::new(InMemoryBackend::new()), "t", HashMap::new())
                .await
                .unwrap(),
        );
        let main = cell("main", memory.clone());
        let biome = vec![
            cell("a", memory.clone()),
            cell("b", memory.clone()),
            cell("c", memory),
        ];
        CellOrder::new(main, biome)
    }

    #[tokio::test]
    async fn hoist_moves_to_front_and_drop_to_back() {
        let mut order = order().await;
        assert_eq!(order.biome_names(), vec!["a", "b", "c"]);

        order.hoist(2);
        assert_eq!(order.biome_names(), vec!["c", "a", "b"]);

        order.drop(0);
        assert_eq!(order.biome_names(), vec!["a", "b", "c"]);

        // already in place, no movement
        order.hoist(0);
        order.drop(2);
        assert_eq!(order.biome_names(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn mode_starts_at_main() {
        let mut order = order().await;
        assert_eq!(order.mode(), Mode::Main);
        order.set_mode(Mode::Biome);
        assert_eq!(order.mode(), Mode::Biome);
    }
}
