//! Personality registry keyed by the medal's personality id.

use std::collections::HashMap;

use medarot_core::constants::FALLBACK_PERSONALITY;
use medarot_core::rng::RollSource;

use crate::part_selection::{PartChoice, PartStrategy};
use crate::targeting::{TargetPick, TargetStrategy};
use crate::view::TargetingContext;

/// A part-selection strategy paired with a target-selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Personality {
    pub name: &'static str,
    pub part_strategy: PartStrategy,
    pub target_strategy: TargetStrategy,
}

impl Personality {
    pub fn select_part<'a>(&self, available: &[PartChoice<'a>]) -> Option<PartChoice<'a>> {
        self.part_strategy.select(available)
    }

    pub fn select_target(
        &self,
        ctx: &TargetingContext<'_>,
        rng: &mut dyn RollSource,
    ) -> Option<TargetPick> {
        self.target_strategy.select(ctx, rng)
    }
}

const BUILTIN: [Personality; 11] = [
    Personality {
        name: "Leader",
        part_strategy: PartStrategy::FirstAvailable,
        target_strategy: TargetStrategy::Leader,
    },
    Personality {
        name: "Crusher",
        part_strategy: PartStrategy::HighestPower,
        target_strategy: TargetStrategy::Crusher,
    },
    Personality {
        name: "Hunter",
        part_strategy: PartStrategy::FastestCharge,
        target_strategy: TargetStrategy::Hunter,
    },
    Personality {
        name: "Joker",
        part_strategy: PartStrategy::FirstAvailable,
        target_strategy: TargetStrategy::Joker,
    },
    Personality {
        name: "Chase",
        part_strategy: PartStrategy::FastestCharge,
        target_strategy: TargetStrategy::Chase,
    },
    Personality {
        name: "Duel",
        part_strategy: PartStrategy::HighestPower,
        target_strategy: TargetStrategy::Duel,
    },
    Personality {
        name: "Intercept",
        part_strategy: PartStrategy::FastestCharge,
        target_strategy: TargetStrategy::Intercept,
    },
    Personality {
        name: "Counter",
        part_strategy: PartStrategy::HighestPower,
        target_strategy: TargetStrategy::Counter,
    },
    Personality {
        name: "Guard",
        part_strategy: PartStrategy::FirstAvailable,
        target_strategy: TargetStrategy::Guard,
    },
    Personality {
        name: "Focus",
        part_strategy: PartStrategy::HighestPower,
        target_strategy: TargetStrategy::Focus,
    },
    Personality {
        name: "Assist",
        part_strategy: PartStrategy::FastestCharge,
        target_strategy: TargetStrategy::Assist,
    },
];

/// Lookup table from personality id (case-insensitive) to personality.
#[derive(Debug, Clone)]
pub struct PersonalityRegistry {
    personalities: HashMap<String, Personality>,
    fallback: Personality,
}

impl Default for PersonalityRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PersonalityRegistry {
    /// Registry holding every built-in personality.
    pub fn builtin() -> Self {
        let personalities = BUILTIN
            .iter()
            .map(|p| (p.name.to_ascii_lowercase(), *p))
            .collect();
        Self {
            personalities,
            fallback: BUILTIN[0],
        }
    }

    pub fn get(&self, id: &str) -> Option<&Personality> {
        self.personalities.get(&id.to_ascii_lowercase())
    }

    /// Personality for `id`, or the fallback. The flag is true when the
    /// fallback was used.
    pub fn resolve(&self, id: &str) -> (Personality, bool) {
        match self.get(id) {
            Some(p) => (*p, false),
            None => (self.fallback, true),
        }
    }

    pub fn fallback(&self) -> &Personality {
        debug_assert_eq!(self.fallback.name, FALLBACK_PERSONALITY);
        &self.fallback
    }
}
