//! Pipeline orchestration (component C7).
//!
//! `drape` is the single synchronous entry point: validate the plan,
//! materialize every required cell field exactly once, order and evaluate
//! plies, write their outputs back to the mesh in sorted order, and
//! aggregate `total_thickness`.

use ndarray::Array1;

use crate::error::{DrapeError, DrapeResult};
use crate::material::MaterialDb;
use crate::mesh::Mesh;
use crate::ordering::{field_name, order_and_name};
use crate::plan::LaminatePlan;
use crate::ply_engine::evaluate_ply;
use crate::validation::validate_plan;

/// Runs the full ply-draping pipeline against `mesh`, mutating it in place
/// with the per-ply output arrays and `total_thickness`.
///
/// `deterministic` forces sequential ply evaluation; otherwise plies are
/// fanned out across the `rayon` worker pool (see [`crate::ply_engine`]).
/// The emitted cell arrays are identical either way.
pub fn drape(
    plan: &LaminatePlan,
    mesh: &mut dyn Mesh,
    matdb: &MaterialDb,
    deterministic: bool,
) -> DrapeResult<()> {
    let n = mesh.num_cells();
    if n == 0 {
        return Err(DrapeError::EmptyMesh);
    }

    let required_fields = validate_plan(plan, mesh, matdb)?;
    log::debug!("validated plan: {} required field(s)", required_fields.len());
    for field in &required_fields {
        mesh.ensure_cell_field(field)?;
    }

    let ranked = order_and_name(&plan.plies)?;

    // Reborrow once as shared: every worker only reads cell fields during
    // evaluation, the mesh is mutated again only after the join below.
    let mesh_ref: &dyn Mesh = mesh;
    let outputs = if deterministic {
        ranked
            .iter()
            .map(|r| evaluate_ply(r.ply, mesh_ref, &plan.datums, matdb))
            .collect::<DrapeResult<Vec<_>>>()?
    } else {
        use rayon::prelude::*;
        ranked
            .par_iter()
            .map(|r| evaluate_ply(r.ply, mesh_ref, &plan.datums, matdb))
            .collect::<DrapeResult<Vec<_>>>()?
    };

    let mut total_thickness = Array1::from_elem(n, 0.0);
    for (ranked_ply, output) in ranked.iter().zip(outputs.iter()) {
        log::debug!(
            "ply #{} ({}, key {}): {} of {} cells covered",
            ranked_ply.index,
            ranked_ply.ply.parent,
            ranked_ply.ply.key,
            output.mask.iter().filter(|&&m| m).count(),
            n
        );

        mesh.set_cell_field(
            &field_name(ranked_ply.index, &ranked_ply.ply.parent, ranked_ply.ply.key, "material"),
            output.material.mapv(|v| v as f64),
        );
        mesh.set_cell_field(
            &field_name(ranked_ply.index, &ranked_ply.ply.parent, ranked_ply.ply.key, "angle"),
            output.angle.clone(),
        );
        mesh.set_cell_field(
            &field_name(ranked_ply.index, &ranked_ply.ply.parent, ranked_ply.ply.key, "thickness"),
            output.thickness.clone(),
        );

        total_thickness = total_thickness + &output.thickness;
    }

    mesh.set_cell_field("total_thickness", total_thickness);
    Ok(())
}
