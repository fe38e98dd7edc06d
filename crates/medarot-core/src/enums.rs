//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// One of the four part slots on a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartSlot {
    Head,
    RightArm,
    LeftArm,
    Legs,
}

impl PartSlot {
    /// All slots in canonical iteration order.
    pub const ALL: [PartSlot; 4] = [
        PartSlot::Head,
        PartSlot::RightArm,
        PartSlot::LeftArm,
        PartSlot::Legs,
    ];

    /// Slots that can carry an action (head and arms).
    pub const ACTION_SLOTS: [PartSlot; 3] =
        [PartSlot::Head, PartSlot::RightArm, PartSlot::LeftArm];

    pub fn is_arm(self) -> bool {
        matches!(self, PartSlot::RightArm | PartSlot::LeftArm)
    }

    pub fn label(self) -> &'static str {
        match self {
            PartSlot::Head => "head",
            PartSlot::RightArm => "right arm",
            PartSlot::LeftArm => "left arm",
            PartSlot::Legs => "legs",
        }
    }
}

/// Gross kind of action a part performs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartCategory {
    /// Contact attack; target resolved at execution time.
    Melee,
    /// Projectile attack against a preselected target.
    Ranged,
    /// Utility action against a preselected target, no damage.
    Intervention,
    /// Team buff.
    Support,
    /// Parts with no action (legs).
    #[default]
    None,
}

impl PartCategory {
    /// Whether a part of this category can be selected as an action.
    pub fn is_action(self) -> bool {
        !matches!(self, PartCategory::None)
    }
}

/// Trait of a part: selects the formula and the execution handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartTrait {
    Shoot,
    Aim,
    Strike,
    Berserk,
    Support,
    Obstruct,
    #[default]
    None,
}

impl PartTrait {
    pub fn label(self) -> &'static str {
        match self {
            PartTrait::Shoot => "shoot",
            PartTrait::Aim => "aim",
            PartTrait::Strike => "strike",
            PartTrait::Berserk => "berserk",
            PartTrait::Support => "support",
            PartTrait::Obstruct => "obstruct",
            PartTrait::None => "none",
        }
    }
}

/// Weapon type; carried through to presentation only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponType {
    Rifle,
    Gatling,
    Laser,
    Missile,
    Sword,
    Hammer,
    Drill,
    Device,
    #[default]
    None,
}

/// Base numeric parameter of a part definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartParameter {
    MaxArmor,
    Power,
    Defense,
    Accuracy,
    Mobility,
    Propulsion,
    Stability,
}

impl PartParameter {
    /// Formula bonuses read these parameters from the attacker's legs;
    /// the rest come from the acting part.
    pub fn is_legs_parameter(self) -> bool {
        matches!(
            self,
            PartParameter::Defense
                | PartParameter::Mobility
                | PartParameter::Propulsion
                | PartParameter::Stability
        )
    }
}

/// Team identifier. Serialised as the integers 1 and 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Team {
    One,
    Two,
}

impl Team {
    pub fn opponent(self) -> Team {
        match self {
            Team::One => Team::Two,
            Team::Two => Team::One,
        }
    }

    /// Direction of the attack axis: team one advances toward +x.
    pub fn orientation(self) -> f64 {
        match self {
            Team::One => 1.0,
            Team::Two => -1.0,
        }
    }
}

impl TryFrom<u8> for Team {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Team::One),
            2 => Ok(Team::Two),
            other => Err(format!("team must be 1 or 2, got {other}")),
        }
    }
}

impl From<Team> for u8 {
    fn from(team: Team) -> u8 {
        match team {
            Team::One => 1,
            Team::Two => 2,
        }
    }
}

/// Simulation state of a combatant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    #[default]
    Idle,
    Charging,
    Ready,
    Cooldown,
    /// Terminal. Never left once entered.
    Broken,
}

/// How the target of an action is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetPolicy {
    /// Target chosen when the charge starts.
    #[default]
    Preselected,
    /// Nearest enemy on the attack axis when the action executes.
    ClosestAtExecution,
}

impl TargetPolicy {
    /// Policy implied by a part category.
    pub fn for_category(category: PartCategory) -> TargetPolicy {
        match category {
            PartCategory::Melee => TargetPolicy::ClosestAtExecution,
            _ => TargetPolicy::Preselected,
        }
    }
}

/// Team-wide buff kinds held in the buff ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuffType {
    Accuracy,
}

/// Kind of debuff a formula can apply to its user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebuffKind {
    Evasion,
    Defense,
}

/// Battle phase (top-level state machine).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattlePhase {
    #[default]
    GaugeProgress,
    PlayerActionSelect,
    ActionExecution,
    AnimatingAction,
    PostAction,
    Message,
    GameOver,
}

/// Final result of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleOutcome {
    Winner(Team),
    Draw,
}
