//! Error types for battle setup and action initiation.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`BattleError`].
pub type Result<T> = std::result::Result<T, BattleError>;

/// Why a charge could not be started. No state is changed when rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChargeRejection {
    #[error("actor does not exist")]
    UnknownActor,
    #[error("actor is not idle")]
    NotIdle,
    #[error("slot has no part")]
    SlotMissing,
    #[error("selected part is broken")]
    SlotBroken,
    #[error("selected part has no action category")]
    NoActionCategory,
}

/// Top-level error type for the battle simulation.
#[derive(Debug, Error)]
pub enum BattleError {
    /// A loadout or lookup referenced an id absent from the catalog.
    #[error("Missing {kind} definition: {id}")]
    CatalogMissingDefinition { kind: &'static str, id: String },

    /// The same id appeared twice in a catalog table.
    #[error("Duplicate {kind} definition: {id}")]
    DuplicateDefinition { kind: &'static str, id: String },

    /// Loadouts violate team composition rules.
    #[error("Invalid loadout: {0}")]
    InvalidLoadout(String),

    /// Charge initiation failed validation.
    #[error("Invalid charge: {0}")]
    InvalidCharge(#[from] ChargeRejection),

    /// An entity handle did not resolve to a combatant.
    #[error("Unknown entity")]
    UnknownEntity,

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    Parse { path: String, message: String },

    /// Data file could not be read.
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
