//! The ply engine (component C4): per-ply mask, thickness, and output
//! array computation. Plies are independent of one another and may be
//! evaluated in parallel; determinism of the result does not depend on
//! evaluation order (see the concurrency notes in the design document).

use std::collections::HashMap;

use ndarray::Array1;
use rayon::prelude::*;

use crate::datum::Datum;
use crate::error::DrapeResult;
use crate::material::MaterialDb;
use crate::mesh::Mesh;
use crate::plan::Ply;

/// The three output arrays a single ply contributes, plus its combined
/// mask (retained for aggregation and for verbose-mode mask cardinality
/// reporting).
#[derive(Debug, Clone)]
pub struct PlyOutput {
    pub material: Array1<i64>,
    pub angle: Array1<f64>,
    pub thickness: Array1<f64>,
    pub mask: Array1<bool>,
}

/// Evaluates a single ply's combined condition mask, thickness, and output
/// arrays against a mesh.
pub fn evaluate_ply(
    ply: &Ply,
    mesh: &dyn Mesh,
    datums: &HashMap<String, Datum>,
    matdb: &MaterialDb,
) -> DrapeResult<PlyOutput> {
    let n = mesh.num_cells();

    let mut mask = Array1::from_elem(n, true);
    for condition in &ply.conditions {
        let cond_mask = condition.evaluate(mesh, datums)?;
        mask = ndarray::Zip::from(&mask)
            .and(&cond_mask)
            .map_collect(|&a, &b| a && b);
    }

    let thickness_full = ply.thickness.resolve(mesh, datums)?;
    let material_id = matdb.id_of(&ply.mat).unwrap_or(0);

    let material = mask.mapv(|covered| if covered { material_id } else { 0 });
    let angle = ndarray::Zip::from(&mask)
        .map_collect(|&covered| if covered { ply.angle } else { 0.0 });
    let thickness = ndarray::Zip::from(&mask)
        .and(&thickness_full)
        .map_collect(|&covered, &t| if covered { t } else { 0.0 });

    Ok(PlyOutput {
        material,
        angle,
        thickness,
        mask,
    })
}

/// Evaluates every ply, either in parallel (default) or sequentially
/// (`deterministic = true`, for reproducible single-threaded runs). The
/// *result* is identical either way — only the scheduling differs.
pub fn evaluate_plies(
    plies: &[Ply],
    mesh: &dyn Mesh,
    datums: &HashMap<String, Datum>,
    matdb: &MaterialDb,
    deterministic: bool,
) -> DrapeResult<Vec<PlyOutput>> {
    if deterministic {
        plies
            .iter()
            .map(|ply| evaluate_ply(ply, mesh, datums, matdb))
            .collect()
    } else {
        plies
            .par_iter()
            .map(|ply| evaluate_ply(ply, mesh, datums, matdb))
            .collect()
    }
}
