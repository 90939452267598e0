//! End-to-end scenarios driving the public `drape` entry point directly
//! against the `JsonMesh` stand-in.

use std::collections::HashMap;

use drape::condition::{Condition, Op, Operand};
use drape::datum::Datum;
use drape::material::{MaterialDb, MaterialRecord};
use drape::mesh::{JsonMesh, Mesh};
use drape::plan::{LaminatePlan, Ply};
use drape::thickness::ThicknessSpec;
use drape::{drape, DrapeError};

fn mesh_with_r() -> JsonMesh {
    let mut mesh = JsonMesh::new(3);
    mesh.cell_fields.insert("r".to_string(), vec![0.0, 1.0, 2.0]);
    mesh
}

fn carbon_matdb() -> MaterialDb {
    let mut map = HashMap::new();
    map.insert("carbon".to_string(), MaterialRecord { id: 7 });
    MaterialDb::new(map)
}

fn ply(
    parent: &str,
    key: i64,
    definition_index: usize,
    conditions: Vec<Condition>,
    thickness: ThicknessSpec,
) -> Ply {
    Ply {
        mat: "carbon".to_string(),
        angle: 0.0,
        thickness,
        parent: parent.to_string(),
        conditions,
        key,
        definition_index,
    }
}

#[test]
fn single_constant_ply_over_all_cells() {
    let plan = LaminatePlan {
        datums: HashMap::new(),
        plies: vec![ply("plate", 1, 0, vec![], ThicknessSpec::Constant(0.001))],
    };
    let mut mesh = mesh_with_r();
    drape(&plan, &mut mesh, &carbon_matdb(), true).unwrap();

    assert_eq!(
        mesh.cell_field("ply_000001_plate_1_material").unwrap().to_vec(),
        vec![7.0, 7.0, 7.0]
    );
    assert_eq!(
        mesh.cell_field("ply_000001_plate_1_thickness").unwrap().to_vec(),
        vec![0.001, 0.001, 0.001]
    );
    assert_eq!(
        mesh.cell_field("total_thickness").unwrap().to_vec(),
        vec![0.001, 0.001, 0.001]
    );
}

#[test]
fn range_condition_masks_uncovered_cells() {
    let plan = LaminatePlan {
        datums: HashMap::new(),
        plies: vec![ply(
            "plate",
            2,
            0,
            vec![Condition {
                field: "r".to_string(),
                operator: Op::InRange,
                operand: Operand::Range((0.5, 1.5)),
            }],
            ThicknessSpec::Constant(0.002),
        )],
    };
    let mut mesh = mesh_with_r();
    drape(&plan, &mut mesh, &carbon_matdb(), true).unwrap();

    assert_eq!(
        mesh.cell_field("ply_000001_plate_2_thickness").unwrap().to_vec(),
        vec![0.0, 0.002, 0.0]
    );
}

#[test]
fn datum_driven_thickness_interpolates_over_base_field() {
    let mut datums = HashMap::new();
    datums.insert(
        "d".to_string(),
        Datum::new("d", "r".to_string(), vec![(0.0, 0.001), (2.0, 0.003)]).unwrap(),
    );
    let plan = LaminatePlan {
        datums,
        plies: vec![ply(
            "plate",
            1,
            0,
            vec![],
            ThicknessSpec::DatumRef("d".to_string()),
        )],
    };
    let mut mesh = mesh_with_r();
    drape(&plan, &mut mesh, &carbon_matdb(), true).unwrap();

    assert_eq!(
        mesh.cell_field("ply_000001_plate_1_thickness").unwrap().to_vec(),
        vec![0.001, 0.002, 0.003]
    );
}

#[test]
fn stable_ordering_with_equal_keys_follows_definition_order() {
    let forward = LaminatePlan {
        datums: HashMap::new(),
        plies: vec![
            ply("a", 5, 0, vec![], ThicknessSpec::Constant(0.001)),
            ply("b", 5, 1, vec![], ThicknessSpec::Constant(0.001)),
        ],
    };
    let mut mesh = mesh_with_r();
    drape(&forward, &mut mesh, &carbon_matdb(), true).unwrap();
    assert!(mesh.cell_field("ply_000001_a_5_thickness").is_ok());
    assert!(mesh.cell_field("ply_000002_b_5_thickness").is_ok());

    let swapped = LaminatePlan {
        datums: HashMap::new(),
        plies: vec![
            ply("b", 5, 0, vec![], ThicknessSpec::Constant(0.001)),
            ply("a", 5, 1, vec![], ThicknessSpec::Constant(0.001)),
        ],
    };
    let mut mesh2 = mesh_with_r();
    drape(&swapped, &mut mesh2, &carbon_matdb(), true).unwrap();
    assert!(mesh2.cell_field("ply_000001_b_5_thickness").is_ok());
    assert!(mesh2.cell_field("ply_000002_a_5_thickness").is_ok());
}

#[test]
fn datum_operand_condition_selects_per_cell_threshold() {
    let mut mesh = mesh_with_r();
    mesh.cell_fields
        .insert("distance_from_te".to_string(), vec![0.05, 0.25, 0.15]);

    let mut datums = HashMap::new();
    datums.insert(
        "te".to_string(),
        Datum::new("te", "r".to_string(), vec![(0.0, 0.1), (2.0, 0.2)]).unwrap(),
    );
    let plan = LaminatePlan {
        datums,
        plies: vec![ply(
            "plate",
            1,
            0,
            vec![Condition {
                field: "distance_from_te".to_string(),
                operator: Op::Gt,
                operand: Operand::DatumRef("te".to_string()),
            }],
            ThicknessSpec::Constant(0.001),
        )],
    };
    drape(&plan, &mut mesh, &carbon_matdb(), true).unwrap();
    assert_eq!(
        mesh.cell_field("ply_000001_plate_1_thickness").unwrap().to_vec(),
        vec![0.0, 0.001, 0.0]
    );
}

#[test]
fn unknown_material_rejects_without_mutating_the_mesh() {
    let plan = LaminatePlan {
        datums: HashMap::new(),
        plies: vec![ply("plate", 1, 0, vec![], ThicknessSpec::Constant(0.001))],
    };
    let mut plan = plan;
    plan.plies[0].mat = "kevlar".to_string();

    let mut mesh = mesh_with_r();
    let before = mesh.cell_fields.clone();
    let err = drape(&plan, &mut mesh, &carbon_matdb(), true).unwrap_err();
    assert!(matches!(err, DrapeError::UnknownMaterial { .. }));
    assert_eq!(mesh.cell_fields, before);
}

#[test]
fn empty_mesh_is_rejected_before_any_validation() {
    let plan = LaminatePlan {
        datums: HashMap::new(),
        plies: vec![],
    };
    let mut mesh = JsonMesh::new(0);
    assert!(matches!(
        drape(&plan, &mut mesh, &carbon_matdb(), true),
        Err(DrapeError::EmptyMesh)
    ));
}

#[test]
fn parallel_and_sequential_runs_are_bit_exact() {
    let plies: Vec<Ply> = (0..12)
        .map(|i| {
            ply(
                "plate",
                i as i64,
                i as usize,
                vec![],
                ThicknessSpec::Constant(0.0001 * (i + 1) as f64),
            )
        })
        .collect();
    let plan = LaminatePlan {
        datums: HashMap::new(),
        plies,
    };

    let mut sequential = mesh_with_r();
    drape(&plan, &mut sequential, &carbon_matdb(), true).unwrap();
    let mut parallel = mesh_with_r();
    drape(&plan, &mut parallel, &carbon_matdb(), false).unwrap();

    assert_eq!(
        sequential.cell_field("total_thickness").unwrap(),
        parallel.cell_field("total_thickness").unwrap()
    );
    for i in 1..=12 {
        let name = format!("ply_{i:06}_plate_{}_thickness", i - 1);
        assert_eq!(
            sequential.cell_field(&name).unwrap(),
            parallel.cell_field(&name).unwrap()
        );
    }
}

#[test]
fn point_field_translation_is_idempotent_across_runs() {
    let mut mesh = JsonMesh::new(2);
    mesh.point_fields
        .insert("temp".to_string(), vec![10.0, 20.0, 30.0]);
    mesh.cell_points = vec![vec![0, 1], vec![1, 2]];

    mesh.ensure_cell_field("temp").unwrap();
    let first = mesh.cell_field("temp").unwrap();
    mesh.ensure_cell_field("temp").unwrap();
    let second = mesh.cell_field("temp").unwrap();
    assert_eq!(first, second);
}

#[test]
fn duplicate_ply_names_are_rejected() {
    let plan = LaminatePlan {
        datums: HashMap::new(),
        plies: vec![
            ply("plate", 1, 0, vec![], ThicknessSpec::Constant(0.001)),
            ply("plate", 1, 1, vec![], ThicknessSpec::Constant(0.002)),
        ],
    };
    let mut mesh = mesh_with_r();
    let err = drape(&plan, &mut mesh, &carbon_matdb(), true).unwrap_err();
    assert!(matches!(err, DrapeError::DuplicatePlyName { .. }));
}
