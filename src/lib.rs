//! A deterministic, vectorized ply-draping engine for composite laminate
//! meshes.
//!
//! A laminate plan places an ordered stack of plies onto a finite-element
//! mesh: each ply carries a material, a fiber angle, a thickness (constant,
//! datum-driven, or an arithmetic expression over cell fields), and a set of
//! conditions that select which cells it actually covers. [`orchestrator::drape`]
//! validates the plan, evaluates every ply (optionally in parallel), and
//! writes the resulting per-ply and aggregate cell fields back onto the
//! mesh.

pub mod cli;
pub mod condition;
pub mod config;
pub mod datum;
pub mod error;
pub mod expr;
pub mod material;
pub mod mesh;
pub mod orchestrator;
pub mod ordering;
pub mod plan;
pub mod ply_engine;
pub mod thickness;
pub mod validation;

pub use error::{DrapeError, DrapeResult};
pub use material::{MaterialDb, MaterialRecord};
pub use mesh::{JsonMesh, Mesh};
pub use orchestrator::drape;
pub use plan::{LaminatePlan, Ply};
