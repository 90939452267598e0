//! Material database (finite mapping from material name to identity).
//!
//! The core only ever needs a material's integer id; composition, modulus,
//! and other property data are out of this crate's scope (Non-goal: material
//! property computation).

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DrapeResult;

/// A single material record. Only `id` is consumed by the evaluator; any
/// other fields present in a loaded document are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialRecord {
    pub id: i64,
}

/// `{ <material-name>: { id: <int> } }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialDb(HashMap<String, MaterialRecord>);

impl MaterialDb {
    pub fn new(entries: HashMap<String, MaterialRecord>) -> Self {
        Self(entries)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn id_of(&self, name: &str) -> Option<i64> {
        self.0.get(name).map(|r| r.id)
    }

    /// Loads a material database document, dispatching on file extension
    /// (`.yaml`/`.yml` vs anything else, treated as JSON).
    pub fn load(path: &Path) -> DrapeResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let entries: HashMap<String, MaterialRecord> = if yaml {
            serde_yaml::from_str(&text)?
        } else {
            serde_json::from_str(&text)?
        };
        Ok(Self::new(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_json_matdb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matdb.json");
        std::fs::write(&path, r#"{"carbon": {"id": 7}}"#).unwrap();
        let db = MaterialDb::load(&path).unwrap();
        assert_eq!(db.id_of("carbon"), Some(7));
        assert!(!db.contains("fiberglass"));
    }
}
