//! The laminate plan: plies, their governing conditions, and named datums.
//!
//! Documents are accepted as YAML or JSON (dispatched on file extension);
//! the raw, document-level shapes ([`PlyInput`], [`LaminatePlanInput`]) are
//! resolved into their typed counterparts ([`Ply`], [`LaminatePlan`]) in one
//! pass, which is also where polymorphic thickness specs are disambiguated
//! (see [`crate::thickness::ThicknessSpecInput::disambiguate`]).

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::condition::{Condition, ConditionInput};
use crate::datum::Datum;
use crate::error::DrapeResult;
use crate::thickness::{ThicknessSpec, ThicknessSpecInput};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatumInput {
    pub base: String,
    pub values: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlyInput {
    pub mat: String,
    pub angle: f64,
    pub thickness: ThicknessSpecInput,
    pub parent: String,
    #[serde(default)]
    pub conditions: Vec<ConditionInput>,
    pub key: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaminatePlanInput {
    #[serde(default)]
    pub datums: HashMap<String, DatumInput>,
    pub plies: Vec<PlyInput>,
}

/// A ply with its thickness spec resolved and its definition index recorded
/// (used as the ordering tie-breaker, see [`crate::ordering`]).
#[derive(Debug, Clone)]
pub struct Ply {
    pub mat: String,
    pub angle: f64,
    pub thickness: ThicknessSpec,
    pub parent: String,
    pub conditions: Vec<Condition>,
    pub key: i64,
    pub definition_index: usize,
}

#[derive(Debug, Clone, Default)]
pub struct LaminatePlan {
    pub datums: HashMap<String, Datum>,
    pub plies: Vec<Ply>,
}

impl LaminatePlanInput {
    /// Resolves datums and disambiguates every ply's thickness spec.
    pub fn resolve(self) -> DrapeResult<LaminatePlan> {
        let mut datums = HashMap::with_capacity(self.datums.len());
        for (name, input) in self.datums {
            let datum = Datum::new(&name, input.base, input.values)?;
            datums.insert(name, datum);
        }

        let datum_names: std::collections::HashSet<String> = datums.keys().cloned().collect();

        let mut plies = Vec::with_capacity(self.plies.len());
        for (definition_index, input) in self.plies.into_iter().enumerate() {
            let thickness = input.thickness.disambiguate(&datum_names)?;
            let conditions = input
                .conditions
                .into_iter()
                .map(ConditionInput::resolve)
                .collect::<DrapeResult<Vec<Condition>>>()?;
            plies.push(Ply {
                mat: input.mat,
                angle: input.angle,
                thickness,
                parent: input.parent,
                conditions,
                key: input.key,
                definition_index,
            });
        }

        Ok(LaminatePlan { datums, plies })
    }
}

impl LaminatePlan {
    /// Loads a laminate plan document, dispatching on file extension
    /// (`.yaml`/`.yml` vs anything else, treated as JSON).
    pub fn load(path: &Path) -> DrapeResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_str(&text, is_yaml_path(path))
    }

    pub fn from_str(text: &str, yaml: bool) -> DrapeResult<Self> {
        let input: LaminatePlanInput = if yaml {
            serde_yaml::from_str(text)?
        } else {
            serde_json::from_str(text)?
        };
        input.resolve()
    }
}

fn is_yaml_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}
