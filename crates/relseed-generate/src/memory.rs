use std::collections::{BTreeMap, HashSet};

use rand::Rng;
use rand::seq::IndexedRandom;
use relseed_core::TableKey;

use crate::value::SeedValue;

/// Values already emitted for key columns, consulted by foreign keys of later tables.
pub trait ForeignContext {
    fn remember(&mut self, table: &TableKey, column: &str, value: &SeedValue);

    /// Distinct values remembered for `table.column`, in first-seen order.
    fn recall(&self, table: &TableKey, column: &str) -> &[SeedValue];

    /// Uniform pick among the remembered values; `None` when nothing was emitted.
    fn pick<R: Rng>(&self, table: &TableKey, column: &str, rng: &mut R) -> Option<SeedValue>
    where
        Self: Sized,
    {
        self.recall(table, column).choose(rng).cloned()
    }
}

#[derive(Debug, Default)]
struct Remembered {
    values: Vec<SeedValue>,
    seen: HashSet<String>,
}

#[derive(Debug, Default)]
pub struct ValueMemory {
    columns: BTreeMap<(TableKey, String), Remembered>,
}

impl ValueMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `(table, column)` slots with at least one value.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl ForeignContext for ValueMemory {
    fn remember(&mut self, table: &TableKey, column: &str, value: &SeedValue) {
        if value.is_null() {
            return;
        }
        let slot = self
            .columns
            .entry((table.clone(), column.to_string()))
            .or_default();
        if slot.seen.insert(value.value_key()) {
            slot.values.push(value.clone());
        }
    }

    fn recall(&self, table: &TableKey, column: &str) -> &[SeedValue] {
        self.columns
            .get(&(table.clone(), column.to_string()))
            .map(|slot| slot.values.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn remembers_distinct_non_null_values() {
        let users = TableKey::new("public", "users");
        let mut memory = ValueMemory::new();
        memory.remember(&users, "id", &SeedValue::Int(1));
        memory.remember(&users, "id", &SeedValue::Int(1));
        memory.remember(&users, "id", &SeedValue::Null);
        memory.remember(&users, "id", &SeedValue::Int(2));

        assert_eq!(
            memory.recall(&users, "id"),
            &[SeedValue::Int(1), SeedValue::Int(2)]
        );
        assert!(memory.recall(&users, "email").is_empty());
    }

    #[test]
    fn pick_only_returns_remembered_values() {
        let users = TableKey::new("public", "users");
        let mut memory = ValueMemory::new();
        for id in 1..=5 {
            memory.remember(&users, "id", &SeedValue::Int(id));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            let picked = memory.pick(&users, "id", &mut rng).expect("value");
            assert!(memory.recall(&users, "id").contains(&picked));
        }
        let orders = TableKey::new("public", "orders");
        assert_eq!(memory.pick(&orders, "id", &mut rng), None);
    }
}
