use std::collections::HashSet;

use crate::error::CoreError;
use crate::model::{Mysfit, MysfitId, MysfitProfile};

const DEFAULT_CATALOG: &str = include_str!("../data/mysfits.json");

/// The catalog bundled with the crate.
pub fn default_catalog() -> Result<Vec<Mysfit>, CoreError> {
    parse_catalog(DEFAULT_CATALOG)
}

/// Parse a JSON array of camelCase mysfit profiles.
///
/// Ids are validated and normalized; duplicates are rejected.
pub fn parse_catalog(json: &str) -> Result<Vec<Mysfit>, CoreError> {
    let profiles: Vec<MysfitProfile> =
        serde_json::from_str(json).map_err(|e| CoreError::Catalog(e.to_string()))?;

    let mut seen = HashSet::new();
    let mut mysfits = Vec::with_capacity(profiles.len());

    for profile in profiles {
        let id = MysfitId::new(&profile.mysfit_id)?;
        if !seen.insert(id) {
            return Err(CoreError::Catalog(format!("duplicate mysfit id {id}")));
        }

        let mut mysfit = Mysfit::from(profile);
        mysfit.mysfit_id = id.to_string();
        mysfits.push(mysfit);
    }

    Ok(mysfits)
}
