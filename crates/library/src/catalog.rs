//! Insertion-ordered game map keyed by `GameId`.

use std::collections::HashMap;

use crate::types::{GameId, GameRecord};

/// Ordered mapping of `GameId` to `GameRecord`.
///
/// Iteration follows insertion order. Built fresh for every run and never
/// shared between runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameMap {
    records: Vec<GameRecord>,
    index: HashMap<GameId, usize>,
}

impl GameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `record` unless its id is already present.
    ///
    /// First-seen wins: returns `false` and drops `record` on a duplicate id.
    pub fn insert_first(&mut self, record: GameRecord) -> bool {
        if self.index.contains_key(&record.game_id) {
            return false;
        }
        self.index.insert(record.game_id.clone(), self.records.len());
        self.records.push(record);
        true
    }

    pub fn contains(&self, id: &GameId) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &GameId) -> Option<&GameRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    pub fn get_mut(&mut self, id: &GameId) -> Option<&mut GameRecord> {
        match self.index.get(id) {
            Some(&i) => self.records.get_mut(i),
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &GameRecord> {
        self.records.iter()
    }

    /// Consumes the map, returning records in insertion order.
    pub fn into_vec(self) -> Vec<GameRecord> {
        self.records
    }
}

impl FromIterator<GameRecord> for GameMap {
    fn from_iter<I: IntoIterator<Item = GameRecord>>(iter: I) -> Self {
        let mut map = GameMap::new();
        for record in iter {
            map.insert_first(record);
        }
        map
    }
}

impl Extend<GameRecord> for GameMap {
    fn extend<I: IntoIterator<Item = GameRecord>>(&mut self, iter: I) {
        for record in iter {
            self.insert_first(record);
        }
    }
}
