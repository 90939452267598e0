//! Condition evaluation (component C2).
//!
//! A [`Condition`] resolves a left-hand cell field, resolves its operand
//! (a literal scalar, a literal range, or a datum name evaluated against
//! its own base field), and applies the comparison elementwise, producing a
//! boolean mask over all cells.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::datum::Datum;
use crate::error::{DrapeError, DrapeResult};
use crate::mesh::Mesh;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Op {
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "in_range")]
    InRange,
    #[serde(rename = "not_in_range")]
    NotInRange,
}

impl Op {
    pub fn is_range_op(self) -> bool {
        matches!(self, Op::InRange | Op::NotInRange)
    }

    /// Maps a plan document's operator token to its typed form, once, at
    /// plan-load time (see design note §9). An unrecognized token is its own
    /// fatal error kind rather than a generic document-parsing failure.
    pub fn from_token(token: &str) -> DrapeResult<Op> {
        match token {
            "<" => Ok(Op::Lt),
            "<=" => Ok(Op::Le),
            ">" => Ok(Op::Gt),
            ">=" => Ok(Op::Ge),
            "==" => Ok(Op::Eq),
            "!=" => Ok(Op::Ne),
            "in_range" => Ok(Op::InRange),
            "not_in_range" => Ok(Op::NotInRange),
            other => Err(DrapeError::UnknownOperator(other.to_string())),
        }
    }
}

/// Either a literal scalar, a literal `[lo, hi]` range, or a reference to a
/// datum (resolved per-element against that datum's own base field).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Scalar(f64),
    Range((f64, f64)),
    DatumRef(String),
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Scalar(v) => write!(f, "{v}"),
            Operand::Range((lo, hi)) => write!(f, "[{lo}, {hi}]"),
            Operand::DatumRef(name) => write!(f, "datum({name})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub field: String,
    pub operator: Op,
    pub operand: Operand,
}

/// The raw, document-level representation of a [`Condition`]: `operator` is
/// still the bare string token from the plan document. [`ConditionInput::resolve`]
/// maps it to a typed [`Op`] once, at plan-load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionInput {
    pub field: String,
    pub operator: String,
    pub operand: Operand,
}

impl ConditionInput {
    pub fn resolve(self) -> DrapeResult<Condition> {
        Ok(Condition {
            field: self.field,
            operator: Op::from_token(&self.operator)?,
            operand: self.operand,
        })
    }
}

impl Condition {
    /// Every field this condition needs resolved as a cell field: its own
    /// left-hand field, plus (if the operand is a datum) that datum's base
    /// field — the latter is looked up by the caller, since a `Condition`
    /// does not itself hold the datum table.
    pub fn own_fields(&self) -> Vec<String> {
        vec![self.field.clone()]
    }

    /// Validates that the operator and operand shapes are compatible:
    /// range operators require a `Range` operand and vice versa.
    pub fn validate_shape(&self) -> DrapeResult<()> {
        let is_range_operand = matches!(self.operand, Operand::Range(_));
        if self.operator.is_range_op() != is_range_operand {
            return Err(DrapeError::OperandArityMismatch {
                operator: format!("{:?}", self.operator),
                operand: self.operand.to_string(),
            });
        }
        Ok(())
    }

    /// Evaluates the condition against a mesh, returning a boolean mask of
    /// length `mesh.num_cells()`. `datums` supplies the named datum table
    /// used when the operand is a datum reference.
    pub fn evaluate(
        &self,
        mesh: &dyn Mesh,
        datums: &HashMap<String, Datum>,
    ) -> DrapeResult<Array1<bool>> {
        self.validate_shape()?;
        let lhs = mesh.cell_field(&self.field)?;

        match &self.operand {
            Operand::Scalar(v) => Ok(apply_scalar_op(self.operator, &lhs, *v)?),
            Operand::Range((lo, hi)) => Ok(apply_range_op(self.operator, &lhs, *lo, *hi)),
            Operand::DatumRef(name) => {
                let datum = datums
                    .get(name)
                    .ok_or_else(|| DrapeError::UnknownDatum(self.field.clone(), name.clone()))?;
                let base_values = mesh.cell_field(&datum.base)?;
                let rhs = datum.evaluate_array(&base_values);
                Ok(apply_elementwise_op(self.operator, &lhs, &rhs)?)
            }
        }
    }
}

fn apply_scalar_op(op: Op, lhs: &Array1<f64>, rhs: f64) -> DrapeResult<Array1<bool>> {
    // `eq`/`ne` against float operands are permitted but discouraged (spec
    // §9): exact IEEE-754 comparison is intentional here, not an oversight.
    #[allow(clippy::float_cmp)]
    let mask = match op {
        Op::Lt => lhs.mapv(|v| v < rhs),
        Op::Le => lhs.mapv(|v| v <= rhs),
        Op::Gt => lhs.mapv(|v| v > rhs),
        Op::Ge => lhs.mapv(|v| v >= rhs),
        Op::Eq => lhs.mapv(|v| v == rhs),
        Op::Ne => lhs.mapv(|v| v != rhs),
        Op::InRange | Op::NotInRange => {
            return Err(DrapeError::OperandArityMismatch {
                operator: format!("{op:?}"),
                operand: rhs.to_string(),
            })
        }
    };
    Ok(mask)
}

fn apply_range_op(op: Op, lhs: &Array1<f64>, lo: f64, hi: f64) -> Array1<bool> {
    match op {
        Op::InRange => lhs.mapv(|v| v >= lo && v <= hi),
        Op::NotInRange => lhs.mapv(|v| !(v >= lo && v <= hi)),
        // validate_shape already rejects non-range operators paired with a
        // range operand before this is reached.
        _ => unreachable!("non-range operator with a range operand"),
    }
}

fn apply_elementwise_op(op: Op, lhs: &Array1<f64>, rhs: &Array1<f64>) -> DrapeResult<Array1<bool>> {
    if op.is_range_op() {
        return Err(DrapeError::OperandArityMismatch {
            operator: format!("{op:?}"),
            operand: "datum".to_string(),
        });
    }
    // See the matching allowance in `apply_scalar_op`: exact float equality
    // is intentional, per spec §9.
    #[allow(clippy::float_cmp)]
    let mask = ndarray::Zip::from(lhs)
        .and(rhs)
        .map_collect(|&l, &r| match op {
            Op::Lt => l < r,
            Op::Le => l <= r,
            Op::Gt => l > r,
            Op::Ge => l >= r,
            Op::Eq => l == r,
            Op::Ne => l != r,
            Op::InRange | Op::NotInRange => unreachable!(),
        });
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::JsonMesh;

    fn mesh() -> JsonMesh {
        let mut m = JsonMesh::new(3);
        m.cell_fields.insert("r".to_string(), vec![0.0, 1.0, 2.0]);
        m
    }

    #[test]
    fn in_range_selects_bracketed_cells() {
        let cond = Condition {
            field: "r".to_string(),
            operator: Op::InRange,
            operand: Operand::Range((0.5, 1.5)),
        };
        let mask = cond.evaluate(&mesh(), &HashMap::new()).unwrap();
        assert_eq!(mask.to_vec(), vec![false, true, false]);
    }

    #[test]
    fn degenerate_range_selects_exact_equality() {
        let cond = Condition {
            field: "r".to_string(),
            operator: Op::InRange,
            operand: Operand::Range((1.0, 1.0)),
        };
        let mask = cond.evaluate(&mesh(), &HashMap::new()).unwrap();
        assert_eq!(mask.to_vec(), vec![false, true, false]);
    }

    #[test]
    fn datum_operand_resolves_per_cell_threshold() {
        let mut m = mesh();
        m.cell_fields
            .insert("distance_from_te".to_string(), vec![0.05, 0.25, 0.15]);
        let mut datums = HashMap::new();
        datums.insert(
            "te".to_string(),
            Datum::new("te", "r".to_string(), vec![(0.0, 0.1), (2.0, 0.2)]).unwrap(),
        );

        let cond = Condition {
            field: "distance_from_te".to_string(),
            operator: Op::Gt,
            operand: Operand::DatumRef("te".to_string()),
        };
        let mask = cond.evaluate(&m, &datums).unwrap();
        assert_eq!(mask.to_vec(), vec![false, true, false]);
    }

    #[test]
    fn range_operator_with_scalar_operand_is_rejected() {
        let cond = Condition {
            field: "r".to_string(),
            operator: Op::InRange,
            operand: Operand::Scalar(1.0),
        };
        assert!(matches!(
            cond.evaluate(&mesh(), &HashMap::new()),
            Err(DrapeError::OperandArityMismatch { .. })
        ));
    }

    #[test]
    fn unknown_datum_name_fails() {
        let cond = Condition {
            field: "r".to_string(),
            operator: Op::Gt,
            operand: Operand::DatumRef("missing".to_string()),
        };
        assert!(matches!(
            cond.evaluate(&mesh(), &HashMap::new()),
            Err(DrapeError::UnknownDatum(_, _))
        ));
    }

    #[test]
    fn known_operator_tokens_map_to_their_variant() {
        assert_eq!(Op::from_token("<").unwrap(), Op::Lt);
        assert_eq!(Op::from_token(">=").unwrap(), Op::Ge);
        assert_eq!(Op::from_token("in_range").unwrap(), Op::InRange);
    }

    #[test]
    fn unrecognized_operator_token_fails() {
        let err = Op::from_token("approximately").unwrap_err();
        assert!(matches!(err, DrapeError::UnknownOperator(ref t) if t == "approximately"));
    }

    #[test]
    fn condition_input_surfaces_unknown_operator_on_resolve() {
        let input = ConditionInput {
            field: "r".to_string(),
            operator: "~=".to_string(),
            operand: Operand::Scalar(1.0),
        };
        assert!(matches!(
            input.resolve(),
            Err(DrapeError::UnknownOperator(ref t)) if t == "~="
        ));
    }
}
