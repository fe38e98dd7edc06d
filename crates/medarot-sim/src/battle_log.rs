//! Structured battle log.
//!
//! Every notable outcome is recorded as a `LogEntry` and mirrored to
//! `tracing`. The message phase renders the lines for the latest action.

use serde::Serialize;
use tracing::info;

use medarot_core::enums::{BattleOutcome, BuffType, PartSlot, PartTrait, Team};
use medarot_core::result::{ActionFailure, ActionResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    ActionExecuted {
        attacker: String,
        action: String,
        slot: PartSlot,
        target: Option<String>,
    },
    NoValidTarget {
        attacker: String,
    },
    Missed {
        attacker: String,
        defender: String,
    },
    Critical {
        attacker: String,
    },
    Defended {
        defender: String,
        slot: PartSlot,
    },
    Damage {
        defender: String,
        slot: PartSlot,
        amount: i32,
        remaining_armor: i32,
    },
    PartBroken {
        combatant: String,
        slot: PartSlot,
        part_id: String,
    },
    CombatantBroken {
        combatant: String,
    },
    BuffApplied {
        team: Team,
        buff: BuffType,
        multiplier: f64,
    },
    BuffsRemoved {
        combatant: String,
        count: usize,
    },
    GameOver {
        outcome: BattleOutcome,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub tick: u64,
    #[serde(flatten)]
    pub event: LogEvent,
}

#[derive(Debug, Clone, Default)]
pub struct BattleLog {
    entries: Vec<LogEntry>,
    results: Vec<ActionResult>,
}

impl BattleLog {
    pub fn record(&mut self, tick: u64, event: LogEvent) {
        info!(tick, ?event, "battle log");
        self.entries.push(LogEntry { tick, event });
    }

    /// Record the execution of an action and its roll outcomes.
    pub fn record_result(&mut self, tick: u64, result: &ActionResult) {
        self.results.push(result.clone());
        let target = (!result.defender_name.is_empty()).then(|| result.defender_name.clone());
        self.record(
            tick,
            LogEvent::ActionExecuted {
                attacker: result.attacker_name.clone(),
                action: result.action_name.clone(),
                slot: result.acting_slot,
                target,
            },
        );
        if result.failure == Some(ActionFailure::NoValidTarget) {
            self.record(
                tick,
                LogEvent::NoValidTarget {
                    attacker: result.attacker_name.clone(),
                },
            );
            return;
        }
        if result.target.is_some() && !result.action_did_hit {
            self.record(
                tick,
                LogEvent::Missed {
                    attacker: result.attacker_name.clone(),
                    defender: result.defender_name.clone(),
                },
            );
            return;
        }
        if result.is_critical {
            self.record(
                tick,
                LogEvent::Critical {
                    attacker: result.attacker_name.clone(),
                },
            );
        }
        if result.is_defended {
            if let Some(slot) = result.actual_hit_slot {
                self.record(
                    tick,
                    LogEvent::Defended {
                        defender: result.defender_name.clone(),
                        slot,
                    },
                );
            }
        }
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Every executed action in order.
    pub fn results(&self) -> &[ActionResult] {
        &self.results
    }
}

/// Plain message lines describing an applied action.
pub fn message_lines(result: &ActionResult) -> Vec<String> {
    let mut lines = vec![format!(
        "{}'s {} ({})!",
        result.attacker_name,
        result.action_name,
        result.action_trait.label()
    )];
    if result.failure == Some(ActionFailure::NoValidTarget) {
        lines.push("But there was no target.".to_string());
        return lines;
    }
    if result.action_trait == PartTrait::Support {
        lines.push(format!("{}'s team accuracy rose.", result.attacker_name));
        return lines;
    }
    if result.target.is_none() {
        return lines;
    }
    if !result.action_did_hit {
        lines.push(format!("{} evaded the attack.", result.defender_name));
        return lines;
    }
    if result.is_critical {
        lines.push("A critical hit!".to_string());
    }
    if let Some(slot) = result.actual_hit_slot {
        if result.is_defended {
            lines.push(format!("{} guarded with its {}.", result.defender_name, slot.label()));
        }
        if result.damage_dealt > 0 {
            lines.push(format!(
                "{}'s {} took {} damage.",
                result.defender_name,
                slot.label(),
                result.damage_dealt
            ));
        }
        if result.is_target_part_broken {
            lines.push(format!("{}'s {} was destroyed!", result.defender_name, slot.label()));
        }
    }
    lines
}
