//! Thickness resolution (component C3).
//!
//! A ply's thickness is one of a constant, a reference to a named datum, or
//! an arithmetic expression over cell fields. The plan loader disambiguates
//! the polymorphic `number | string` document representation into a
//! [`ThicknessSpec`] once, at load time (see [`ThicknessSpec::disambiguate`]);
//! the engine then only ever resolves an already-typed spec.

use std::collections::{HashMap, HashSet};

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::datum::Datum;
use crate::error::DrapeResult;
use crate::expr::Expr;
use crate::mesh::Mesh;

/// The raw, document-level representation: either a bare number or a
/// string (a datum name or an arithmetic expression).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThicknessSpecInput {
    Number(f64),
    Text(String),
}

/// A thickness spec resolved to one of its three concrete forms.
#[derive(Debug, Clone, PartialEq)]
pub enum ThicknessSpec {
    Constant(f64),
    DatumRef(String),
    Expression(Expr),
}

impl ThicknessSpecInput {
    /// Resolves a raw document value into a [`ThicknessSpec`], given the
    /// set of datum names declared on the plan. A numeric literal always
    /// becomes `Constant`. A string that names a known datum becomes
    /// `DatumRef`; a datum name takes precedence over an expression that
    /// happens to be spelled identically (a warning is logged when this
    /// precedence actually applies — i.e. the string would also parse as a
    /// non-trivial expression).
    pub fn disambiguate(&self, datum_names: &HashSet<String>) -> DrapeResult<ThicknessSpec> {
        match self {
            ThicknessSpecInput::Number(v) => Ok(ThicknessSpec::Constant(*v)),
            ThicknessSpecInput::Text(text) => {
                if datum_names.contains(text) {
                    if Expr::parse(text).map(|e| e != Expr::Field(text.clone())).unwrap_or(false) {
                        log::warn!(
                            "thickness '{text}' matches both a datum name and a non-trivial \
                             expression; the datum takes precedence"
                        );
                    }
                    return Ok(ThicknessSpec::DatumRef(text.clone()));
                }
                let expr = Expr::parse(text)?;
                Ok(ThicknessSpec::Expression(expr))
            }
        }
    }
}

impl ThicknessSpec {
    /// Every cell field this spec needs resolved, not counting a datum's
    /// own base field (the caller cross-references the datum table for
    /// that).
    pub fn own_fields(&self) -> Vec<String> {
        match self {
            ThicknessSpec::Constant(_) => Vec::new(),
            ThicknessSpec::DatumRef(_) => Vec::new(),
            ThicknessSpec::Expression(expr) => expr.referenced_fields(),
        }
    }

    /// Resolves the thickness spec to a per-cell array.
    pub fn resolve(
        &self,
        mesh: &dyn Mesh,
        datums: &HashMap<String, Datum>,
    ) -> DrapeResult<Array1<f64>> {
        match self {
            ThicknessSpec::Constant(v) => Ok(Array1::from_elem(mesh.num_cells(), *v)),
            ThicknessSpec::DatumRef(name) => {
                let datum = datums.get(name).ok_or_else(|| {
                    crate::error::DrapeError::UnknownDatum("thickness".to_string(), name.clone())
                })?;
                let base_values = mesh.cell_field(&datum.base)?;
                Ok(datum.evaluate_array(&base_values))
            }
            ThicknessSpec::Expression(expr) => expr.evaluate(mesh),
        }
    }
}
