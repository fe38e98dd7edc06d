//! Core types and definitions for the Medarot battle simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! catalog definitions, components, config, events, action results,
//! snapshots and constants. It contains no simulation logic.

pub mod catalog;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod result;
pub mod rng;
pub mod state;

pub use error::{BattleError, ChargeRejection, Result};
