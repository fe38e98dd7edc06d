//! Part-selection strategies: which of the actor's intact action parts to use.

use medarot_core::catalog::PartDefinition;
use medarot_core::enums::PartSlot;

/// An intact action part the actor may use.
#[derive(Debug, Clone, Copy)]
pub struct PartChoice<'a> {
    pub slot: PartSlot,
    pub definition: &'a PartDefinition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartStrategy {
    /// Positional first.
    FirstAvailable,
    /// Maximum power; ties keep the earliest slot.
    HighestPower,
    /// Minimum charge base; ties keep the earliest slot.
    FastestCharge,
}

impl PartStrategy {
    pub fn select<'a>(self, available: &[PartChoice<'a>]) -> Option<PartChoice<'a>> {
        match self {
            PartStrategy::FirstAvailable => available.first().copied(),
            PartStrategy::HighestPower => {
                available.iter().copied().fold(None, |best, choice| match best {
                    Some(b) if b.definition.power >= choice.definition.power => Some(b),
                    _ => Some(choice),
                })
            }
            PartStrategy::FastestCharge => {
                available.iter().copied().fold(None, |best, choice| match best {
                    Some(b) if b.definition.charge <= choice.definition.charge => Some(b),
                    _ => Some(choice),
                })
            }
        }
    }
}
