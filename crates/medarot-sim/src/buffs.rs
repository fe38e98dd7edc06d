//! Team-wide buff ledger.
//!
//! Each buff entry remembers the (entity, slot) that produced it so the entry
//! can be dropped when that part breaks. No entry may outlive its source part.

use std::collections::HashMap;

use hecs::Entity;

use medarot_core::enums::{BuffType, PartSlot, Team};

/// One contribution to a team buff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuffSource {
    pub source: Entity,
    pub slot: PartSlot,
    /// Multiplicative value (1.5 = +50%).
    pub value: f64,
}

#[derive(Debug, Clone, Default)]
pub struct TeamBuffs {
    ledger: HashMap<Team, HashMap<BuffType, Vec<BuffSource>>>,
}

impl TeamBuffs {
    /// Add a buff, replacing any earlier entry from the same (source, slot).
    pub fn add(&mut self, team: Team, buff: BuffType, entry: BuffSource) {
        let sources = self.ledger.entry(team).or_default().entry(buff).or_default();
        sources.retain(|s| !(s.source == entry.source && s.slot == entry.slot));
        sources.push(entry);
    }

    pub fn sources(&self, team: Team, buff: BuffType) -> &[BuffSource] {
        self.ledger
            .get(&team)
            .and_then(|m| m.get(&buff))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Product of every value for (team, buff); 1.0 when empty.
    pub fn multiplier(&self, team: Team, buff: BuffType) -> f64 {
        self.sources(team, buff).iter().map(|s| s.value).product()
    }

    /// Remove every entry produced by (entity, slot). Idempotent.
    pub fn remove_from_source(&mut self, entity: Entity, slot: PartSlot) -> usize {
        self.remove_where(|s| s.source == entity && s.slot == slot)
    }

    /// Remove every entry produced by any part of `entity`.
    pub fn remove_entity(&mut self, entity: Entity) -> usize {
        self.remove_where(|s| s.source == entity)
    }

    fn remove_where(&mut self, matches: impl Fn(&BuffSource) -> bool) -> usize {
        let mut removed = 0;
        for by_type in self.ledger.values_mut() {
            for sources in by_type.values_mut() {
                let before = sources.len();
                sources.retain(|s| !matches(s));
                removed += before - sources.len();
            }
        }
        removed
    }

    /// Every (team, buff, sources) triple in a fixed order.
    pub fn entries(&self) -> Vec<(Team, BuffType, &[BuffSource])> {
        let mut out = Vec::new();
        for team in [Team::One, Team::Two] {
            let buff = BuffType::Accuracy;
            let sources = self.sources(team, buff);
            if !sources.is_empty() {
                out.push((team, buff, sources));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_replaces_same_source_and_multiplies() {
        let mut world = hecs::World::new();
        let a = world.spawn(());
        let b = world.spawn(());
        let mut buffs = TeamBuffs::default();
        assert_eq!(buffs.multiplier(Team::One, BuffType::Accuracy), 1.0);

        let entry = |source, value| BuffSource {
            source,
            slot: PartSlot::LeftArm,
            value,
        };
        buffs.add(Team::One, BuffType::Accuracy, entry(a, 1.5));
        buffs.add(Team::One, BuffType::Accuracy, entry(a, 1.2));
        buffs.add(Team::One, BuffType::Accuracy, entry(b, 2.0));
        assert_eq!(buffs.sources(Team::One, BuffType::Accuracy).len(), 2);
        assert!((buffs.multiplier(Team::One, BuffType::Accuracy) - 2.4).abs() < 1e-9);
        assert_eq!(buffs.multiplier(Team::Two, BuffType::Accuracy), 1.0);

        assert_eq!(buffs.remove_from_source(a, PartSlot::LeftArm), 1);
        assert_eq!(buffs.remove_from_source(a, PartSlot::LeftArm), 0);
        assert_eq!(buffs.multiplier(Team::One, BuffType::Accuracy), 2.0);
        assert_eq!(buffs.remove_entity(b), 1);
        assert!(buffs.entries().is_empty());
    }
}
