//! Visible battle state handed to presentation after every tick.

use serde::{Deserialize, Serialize};

use crate::enums::*;

/// Complete battle state after a tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    pub tick: u64,
    pub phase: BattlePhase,
    pub combatants: Vec<CombatantView>,
    pub team_buffs: Vec<TeamBuffView>,
    pub ready_queue: Vec<String>,
    pub outcome: Option<BattleOutcome>,
}

/// One combatant as presentation sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantView {
    pub id: String,
    pub name: String,
    pub team: Team,
    pub is_leader: bool,
    pub draw_index: u8,
    pub state: StateKind,
    /// Gauge fill in [0, 100].
    pub gauge: f64,
    pub selected_slot: Option<PartSlot>,
    pub parts: Vec<PartView>,
}

/// One part's armor bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartView {
    pub slot: PartSlot,
    pub part_id: String,
    pub current_armor: i32,
    pub max_armor: i32,
    pub is_broken: bool,
}

/// Product of a team's buff values for one buff type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamBuffView {
    pub team: Team,
    pub buff: BuffType,
    pub multiplier: f64,
    pub sources: usize,
}
