//! JSON catalog, loadout and settings loading.
//!
//! Table files are arrays of rows. A row that does not deserialize is skipped
//! with a warning; a repeated id is an error.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use medarot_core::catalog::{ActionFormula, Catalog, Loadout, MedalDefinition, PartDefinition};
use medarot_core::config::GameConfig;
use medarot_core::enums::PartTrait;
use medarot_core::error::{BattleError, Result};

pub const PARTS_FILE: &str = "parts.json";
pub const MEDALS_FILE: &str = "medals.json";
pub const FORMULAS_FILE: &str = "formulas.json";
pub const LOADOUTS_FILE: &str = "loadouts.json";
pub const SETTINGS_FILE: &str = "game_settings.json";

fn parse_error(source: &str, err: serde_json::Error) -> BattleError {
    BattleError::Parse {
        path: source.to_string(),
        message: err.to_string(),
    }
}

/// Deserialize every well-formed row of a JSON array, rejecting repeated ids.
fn parse_rows<T: DeserializeOwned>(
    source: &str,
    json: &str,
    kind: &'static str,
    id_of: impl Fn(&T) -> &str,
) -> Result<Vec<T>> {
    let rows: Vec<Value> = serde_json::from_str(json).map_err(|e| parse_error(source, e))?;
    let mut seen = HashSet::new();
    let mut parsed = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        let item: T = match serde_json::from_value(row) {
            Ok(item) => item,
            Err(err) => {
                warn!(source, index, error = %err, "skipping malformed {kind} row");
                continue;
            }
        };
        let id = id_of(&item).to_string();
        if !seen.insert(id.clone()) {
            return Err(BattleError::DuplicateDefinition { kind, id });
        }
        parsed.push(item);
    }
    Ok(parsed)
}

pub fn parse_parts(json: &str) -> Result<Vec<PartDefinition>> {
    parse_rows::<PartDefinition>(PARTS_FILE, json, "part", |p| p.id.as_str())
}

pub fn parse_medals(json: &str) -> Result<Vec<MedalDefinition>> {
    parse_rows::<MedalDefinition>(MEDALS_FILE, json, "medal", |m| m.id.as_str())
}

pub fn parse_loadouts(json: &str) -> Result<Vec<Loadout>> {
    parse_rows::<Loadout>(LOADOUTS_FILE, json, "loadout", |l| l.id.as_str())
}

/// Formulas keyed by trait name.
pub fn parse_formulas(json: &str) -> Result<HashMap<PartTrait, ActionFormula>> {
    serde_json::from_str(json).map_err(|e| parse_error(FORMULAS_FILE, e))
}

/// Game settings. Missing sections take their defaults.
pub fn parse_config(json: &str) -> Result<GameConfig> {
    serde_json::from_str(json).map_err(|e| parse_error(SETTINGS_FILE, e))
}

/// Build a catalog from in-memory JSON documents.
pub fn parse_catalog(parts: &str, medals: &str, formulas: &str) -> Result<Catalog> {
    Catalog::new(parse_parts(parts)?, parse_medals(medals)?, parse_formulas(formulas)?)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| BattleError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load parts, medals and formulas from a data directory.
pub fn load_catalog(dir: &Path) -> Result<Catalog> {
    let catalog = parse_catalog(
        &read(&dir.join(PARTS_FILE))?,
        &read(&dir.join(MEDALS_FILE))?,
        &read(&dir.join(FORMULAS_FILE))?,
    )?;
    info!(
        dir = %dir.display(),
        parts = catalog.part_count(),
        medals = catalog.medal_count(),
        "catalog loaded"
    );
    Ok(catalog)
}

pub fn load_loadouts(path: &Path) -> Result<Vec<Loadout>> {
    parse_loadouts(&read(path)?)
}

pub fn load_config(path: &Path) -> Result<GameConfig> {
    parse_config(&read(path)?)
}
