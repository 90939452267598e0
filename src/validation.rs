//! Plan validation (component C6).
//!
//! Runs once, before any ply is evaluated: every material must be known,
//! every field a condition, datum, or thickness expression touches must be
//! resolvable against the mesh, and every datum name referenced by a
//! condition or thickness spec must exist on the plan. A single pass also
//! collects the full set of cell fields the orchestrator needs to
//! materialize up front.

use std::collections::BTreeSet;

use crate::condition::Operand;
use crate::error::{DrapeError, DrapeResult};
use crate::material::MaterialDb;
use crate::mesh::Mesh;
use crate::plan::LaminatePlan;
use crate::thickness::ThicknessSpec;

/// Validates a resolved laminate plan against a mesh and material database.
///
/// On success, returns the sorted, deduplicated set of cell field names the
/// plan requires (every condition's own field, every datum's base field,
/// and every field referenced by an arithmetic thickness expression).
pub fn validate_plan(
    plan: &LaminatePlan,
    mesh: &dyn Mesh,
    matdb: &MaterialDb,
) -> DrapeResult<BTreeSet<String>> {
    let mut required = BTreeSet::new();

    for datum in plan.datums.values() {
        if !mesh.has_field(&datum.base) {
            return Err(DrapeError::UnknownField(datum.base.clone()));
        }
        required.insert(datum.base.clone());
    }

    for (ply_index, ply) in plan.plies.iter().enumerate() {
        if !matdb.contains(&ply.mat) {
            return Err(DrapeError::UnknownMaterial {
                ply_index,
                material: ply.mat.clone(),
            });
        }

        for condition in &ply.conditions {
            condition.validate_shape()?;
            for field in condition.own_fields() {
                if !mesh.has_field(&field) {
                    return Err(DrapeError::UnknownField(field));
                }
                required.insert(field);
            }
            if let Operand::DatumRef(name) = &condition.operand {
                if !plan.datums.contains_key(name) {
                    return Err(DrapeError::UnknownDatum(
                        condition.field.clone(),
                        name.clone(),
                    ));
                }
            }
        }

        match &ply.thickness {
            ThicknessSpec::Constant(_) => {}
            ThicknessSpec::DatumRef(name) => {
                if !plan.datums.contains_key(name) {
                    return Err(DrapeError::UnknownDatum(
                        "thickness".to_string(),
                        name.clone(),
                    ));
                }
            }
            ThicknessSpec::Expression(_) => {
                for field in ply.thickness.own_fields() {
                    if !mesh.has_field(&field) {
                        return Err(DrapeError::UnknownField(field));
                    }
                    required.insert(field);
                }
            }
        }
    }

    Ok(required)
}
