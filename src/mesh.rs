//! The mesh collaborator (external to the core evaluator).
//!
//! The evaluator (C1-C7) only ever talks to meshes through the [`Mesh`]
//! trait: read an existing cell field, make sure a cell field exists
//! (translating from a point field if necessary), or write a new cell
//! field. Reading/writing an actual mesh file format is out of scope for
//! this crate; [`JsonMesh`] is a minimal, explicitly non-authoritative
//! stand-in so the CLI has something concrete to drive end to end.

use std::collections::HashMap;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{DrapeError, DrapeResult};

/// The interface the ply evaluator consumes from a mesh.
///
/// `Send + Sync` so a shared, read-only mesh reference can be fanned out
/// across the `rayon` worker pool during ply evaluation (C4).
pub trait Mesh: Send + Sync {
    /// Number of elements (cells) in the mesh.
    fn num_cells(&self) -> usize;

    /// Reads an existing cell field. Fails if the field has not been
    /// materialized as a cell field yet.
    fn cell_field(&self, name: &str) -> DrapeResult<Array1<f64>>;

    /// Idempotently ensures `name` is available as a cell field, translating
    /// from a point field if one exists under the same name. Fails if
    /// neither a cell field nor a point field named `name` exists.
    fn ensure_cell_field(&mut self, name: &str) -> DrapeResult<()>;

    /// Adds or overwrites a cell field.
    fn set_cell_field(&mut self, name: &str, values: Array1<f64>);

    /// Reports whether `name` is already a cell field, or could become one
    /// via [`Mesh::ensure_cell_field`] (a point field of the same name
    /// exists). Used by validation (C6) to check field references without
    /// requiring a mutable mesh. The default implementation only recognizes
    /// existing cell fields; mesh types that carry point fields override it.
    fn has_field(&self, name: &str) -> bool {
        self.cell_field(name).is_ok()
    }
}

/// A minimal mesh container backed by a flat JSON/YAML document.
///
/// `cell_points` gives, for each cell, the indices into the point fields
/// that belong to that cell; `ensure_cell_field` translates a point field to
/// a cell field by averaging over those indices. This is a deliberately
/// simple stand-in for a real point-to-cell translation pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonMesh {
    pub num_cells: usize,
    #[serde(default)]
    pub cell_fields: HashMap<String, Vec<f64>>,
    #[serde(default)]
    pub point_fields: HashMap<String, Vec<f64>>,
    #[serde(default)]
    pub cell_points: Vec<Vec<usize>>,
}

impl JsonMesh {
    pub fn new(num_cells: usize) -> Self {
        Self {
            num_cells,
            ..Default::default()
        }
    }

    /// Loads a grid document, dispatching on file extension (`.yaml`/`.yml`
    /// vs anything else, treated as JSON).
    pub fn load(path: &std::path::Path) -> DrapeResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        if yaml {
            Ok(serde_yaml::from_str(&text)?)
        } else {
            Ok(serde_json::from_str(&text)?)
        }
    }

    /// Serializes this mesh back to a grid document at `path`, in the same
    /// JSON schema it was loaded from (the CLI always writes JSON).
    pub fn save(&self, path: &std::path::Path) -> DrapeResult<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

impl Mesh for JsonMesh {
    fn num_cells(&self) -> usize {
        self.num_cells
    }

    fn cell_field(&self, name: &str) -> DrapeResult<Array1<f64>> {
        self.cell_fields
            .get(name)
            .map(|v| Array1::from(v.clone()))
            .ok_or_else(|| DrapeError::UnknownField(name.to_string()))
    }

    fn ensure_cell_field(&mut self, name: &str) -> DrapeResult<()> {
        if self.cell_fields.contains_key(name) {
            return Ok(());
        }
        let point_values = self
            .point_fields
            .get(name)
            .ok_or_else(|| DrapeError::UnknownField(name.to_string()))?;

        if self.cell_points.len() != self.num_cells {
            return Err(DrapeError::UnknownField(format!(
                "{name} (missing cell->point connectivity)"
            )));
        }

        let mut translated = Vec::with_capacity(self.num_cells);
        for points in &self.cell_points {
            if points.is_empty() {
                translated.push(f64::NAN);
                continue;
            }
            let sum: f64 = points.iter().map(|&p| point_values[p]).sum();
            translated.push(sum / points.len() as f64);
        }

        self.cell_fields.insert(name.to_string(), translated);
        Ok(())
    }

    fn set_cell_field(&mut self, name: &str, values: Array1<f64>) {
        self.cell_fields
            .insert(name.to_string(), values.to_vec());
    }

    fn has_field(&self, name: &str) -> bool {
        self.cell_fields.contains_key(name) || self.point_fields.contains_key(name)
    }
}
