mod common;

use approx::assert_relative_eq;
use float_next_after::NextAfter;
use planar_cdt::{
    compute, compute_with_options, CdtBuilder, CdtError, CdtInput, CdtOptions, CdtResult,
    OutputType,
};

use common::{
    check_constraint_coverage, check_faces_reported, check_full_result, check_no_crossings,
    check_vertex_containment, check_vertex_separation, random_input, random_input_with_epsilon,
    SEED,
};

const ALL_OUTPUT_TYPES: [OutputType; 4] = [
    OutputType::Full,
    OutputType::Inside,
    OutputType::Constraints,
    OutputType::ConstraintsValidBmesh,
];

fn edges_with_id(result: &CdtResult, id: usize) -> Vec<[usize; 2]> {
    result
        .edges
        .iter()
        .zip(result.edges_orig.iter())
        .filter(|(_, orig)| orig.contains(&id))
        .map(|(edge, _)| *edge)
        .collect()
}

fn output_vertex_of(result: &CdtResult, input_vertex: usize) -> usize {
    result
        .verts_orig
        .iter()
        .position(|orig| orig.contains(&input_vertex))
        .expect("input vertex is missing from the output")
}

#[test]
fn test_unit_square_constraints() -> anyhow::Result<()> {
    let mut input = CdtInput::new(1e-5);
    input.add_vertex([0.0, 0.0]);
    input.add_vertex([1.0, 0.0]);
    input.add_vertex([1.0, 1.0]);
    input.add_vertex([0.0, 1.0]);
    input.add_face([0, 1, 2, 3]);

    let result = compute(&input, OutputType::Constraints)?;
    assert_eq!(result.vert_coords.len(), 4);
    assert_eq!(result.edges.len(), 4);
    assert_eq!(result.faces.len(), 1);
    assert_eq!(result.face_edge_offset, 0);
    for vertex in 0..4 {
        assert_eq!(result.vert_orig(vertex), Some(&[vertex][..]));
        assert_eq!(result.vert_coords[vertex], input.vert_coords[vertex]);
    }

    let mut face = result.face(0).unwrap().to_vec();
    face.sort_unstable();
    assert_eq!(face, vec![0, 1, 2, 3]);
    assert_eq!(result.face_orig(0), Some(&[0][..]));

    // Every edge is a face boundary edge
    for edge in 0..result.edges.len() {
        let orig = result.edge_orig(edge).unwrap();
        assert_eq!(orig.len(), 1);
        assert!(result.is_face_edge_orig(orig[0]));
        assert_eq!(result.face_edge_start(orig[0]), Some(orig[0]));
    }

    let full = compute(&input, OutputType::Full)?;
    assert_eq!(full.faces.len(), 2);
    assert_eq!(full.edges.len(), 5);
    check_full_result(&input, &full);
    Ok(())
}

#[test]
fn test_crossing_edges_create_steiner_vertex() -> anyhow::Result<()> {
    let mut input = CdtInput::new(1e-5);
    input.add_vertex([0.0, 0.0]);
    input.add_vertex([2.0, 2.0]);
    input.add_vertex([2.0, 0.0]);
    input.add_vertex([0.0, 2.0]);
    input.add_edge(0, 1);
    input.add_edge(2, 3);

    let result = compute(&input, OutputType::Full)?;
    assert_eq!(result.vert_coords.len(), 5);
    assert_eq!(result.faces.len(), 4);
    assert_eq!(result.edges.len(), 8);

    let steiner = (0..5)
        .find(|v| result.vert_orig(*v) == Some(&[][..]))
        .expect("missing intersection vertex");
    assert_relative_eq!(result.vert_coords[steiner][0], 1.0, epsilon = 1e-12);
    assert_relative_eq!(result.vert_coords[steiner][1], 1.0, epsilon = 1e-12);

    for id in 0..2 {
        let edges = edges_with_id(&result, id);
        assert_eq!(edges.len(), 2);
        assert!(edges.iter().all(|edge| edge.contains(&steiner)));
    }
    check_full_result(&input, &result);

    let constraints = compute(&input, OutputType::Constraints)?;
    assert_eq!(constraints.edges.len(), 4);
    assert!(constraints.faces.is_empty());
    check_constraint_coverage(&input, &constraints);
    Ok(())
}

#[test]
fn test_close_vertices_are_merged() -> anyhow::Result<()> {
    let mut input = CdtInput::new(1e-5);
    input.add_vertex([0.0, 0.0]);
    input.add_vertex([1.0, 0.0]);
    input.add_vertex([0.0, 1.0]);
    input.add_vertex([1.0 + 1e-7, 0.0]);
    input.add_vertex([2.0, 0.0]);
    input.add_vertex([1.0, 1.0]);
    input.add_face([0, 1, 2]);
    input.add_face([3, 4, 5]);

    for output_type in ALL_OUTPUT_TYPES {
        let result = compute(&input, output_type)?;
        assert_eq!(result.vert_coords.len(), 5);

        let merged = output_vertex_of(&result, 1);
        assert_eq!(output_vertex_of(&result, 3), merged);
        assert_eq!(result.vert_orig(merged), Some(&[1, 3][..]));
        assert_eq!(result.vert_coords[merged], [1.0, 0.0]);
        check_vertex_containment(&input, &result);
    }

    let full = compute(&input, OutputType::Full)?;
    check_full_result(&input, &full);
    Ok(())
}

#[test]
fn test_free_edge_inside_face() -> anyhow::Result<()> {
    let mut input = CdtInput::new(1e-5);
    input.add_vertex([0.0, 0.0]);
    input.add_vertex([4.0, 0.0]);
    input.add_vertex([2.0, 4.0]);
    input.add_vertex([1.5, 1.0]);
    input.add_vertex([2.5, 1.5]);
    input.add_edge(3, 4);
    input.add_face([0, 1, 2]);

    let result = compute(&input, OutputType::Inside)?;
    assert_eq!(result.face_edge_offset, 1);
    assert!(!result.faces.is_empty());
    for face in 0..result.faces.len() {
        assert_eq!(result.face_orig(face), Some(&[0][..]));
    }
    assert_eq!(edges_with_id(&result, 0).len(), 1);
    for id in 1..4 {
        assert!(result.is_face_edge_orig(id));
        assert_eq!(result.face_edge_start(id), Some(id - 1));
    }
    check_constraint_coverage(&input, &result);

    let full = compute(&input, OutputType::Full)?;
    assert_eq!(full.faces.len(), result.faces.len());
    check_full_result(&input, &full);
    Ok(())
}

#[test]
fn test_concave_quad() -> anyhow::Result<()> {
    let mut input = CdtInput::new(1e-5);
    input.add_vertex([0.0, 0.0]);
    input.add_vertex([4.0, 0.0]);
    input.add_vertex([4.0, 4.0]);
    input.add_vertex([3.0, 1.0]);
    input.add_face([0, 1, 2, 3]);

    let constraints = compute(&input, OutputType::Constraints)?;
    assert_eq!(constraints.faces.len(), 1);
    assert_eq!(constraints.face(0).map(<[usize]>::len), Some(4));

    let full = compute(&input, OutputType::Full)?;
    assert_eq!(full.faces.len(), 3);
    let tagged = full
        .faces_orig
        .iter()
        .filter(|orig| *orig == [0])
        .count();
    assert_eq!(tagged, 2);
    check_full_result(&input, &full);

    let inside = compute(&input, OutputType::Inside)?;
    assert_eq!(inside.faces.len(), 2);

    let bmesh = compute(&input, OutputType::ConstraintsValidBmesh)?;
    assert_eq!(bmesh, constraints);
    Ok(())
}

#[test]
fn test_clockwise_face_is_filled() -> anyhow::Result<()> {
    let mut input = CdtInput::new(1e-5);
    input.add_vertex([0.0, 0.0]);
    input.add_vertex([0.0, 1.0]);
    input.add_vertex([1.0, 1.0]);
    input.add_vertex([1.0, 0.0]);
    input.add_face([0, 1, 2, 3]);

    let full = compute(&input, OutputType::Full)?;
    assert!(full.faces_orig.iter().all(|orig| orig == [0]));
    Ok(())
}

#[test]
fn test_vertex_next_to_diagonal() -> anyhow::Result<()> {
    let mut input = CdtInput::new(1e-9);
    input.add_vertex([0.0, 0.0]);
    input.add_vertex([1.0, 1.0]);
    input.add_vertex([0.5, 0.5f64.next_after(1.0)]);
    input.add_vertex([1.0, 0.0]);
    input.add_vertex([0.0, 1.0]);
    input.add_edge(0, 1);

    let result = compute(&input, OutputType::Full)?;
    let middle = output_vertex_of(&result, 2);
    let edges = edges_with_id(&result, 0);
    assert_eq!(edges.len(), 2);
    assert!(edges.iter().all(|edge| edge.contains(&middle)));
    check_full_result(&input, &result);
    Ok(())
}

#[test]
fn test_disjoint_edges_are_kept_whole() -> anyhow::Result<()> {
    let mut input = CdtInput::new(1e-6);
    for position in [
        [0.0, 0.0],
        [3.0, 0.0],
        [0.0, 3.0],
        [3.0, 3.0],
        [1.0, 1.0],
        [2.0, 1.2],
    ] {
        input.add_vertex(position);
    }
    input.add_edge(0, 4);
    input.add_edge(4, 5);
    input.add_edge(5, 3);
    input.add_edge(1, 5);

    let result = compute(&input, OutputType::Full)?;
    assert_eq!(result.vert_coords.len(), input.vert_coords.len());
    for (id, [from, to]) in input.edges.iter().copied().enumerate() {
        let edges = edges_with_id(&result, id);
        assert_eq!(edges.len(), 1);
        let [a, b] = edges[0];
        let expected = [output_vertex_of(&result, from), output_vertex_of(&result, to)];
        assert!(expected == [a, b] || expected == [b, a]);
    }
    check_full_result(&input, &result);
    Ok(())
}

#[test]
fn test_grid_with_collinear_constraints() -> anyhow::Result<()> {
    const SIZE: usize = 6;
    let mut input = CdtInput::new(1e-6);
    for x in 0..SIZE {
        for y in 0..SIZE {
            input.add_vertex([x as f64, y as f64]);
        }
    }
    let index = |x: usize, y: usize| x * SIZE + y;
    // Horizontal and vertical lines through every grid vertex they touch
    input.add_edge(index(0, 2), index(SIZE - 1, 2));
    input.add_edge(index(3, 0), index(3, SIZE - 1));
    // A diagonal through all vertices with x == y
    input.add_edge(index(0, 0), index(SIZE - 1, SIZE - 1));
    // A line crossing grid edges between vertices
    input.add_edge(index(0, 1), index(SIZE - 1, 4));

    let result = compute(&input, OutputType::Full)?;
    // Each of the first three lines is split at every grid vertex and once by the last line
    for id in 0..3 {
        assert_eq!(edges_with_id(&result, id).len(), SIZE);
    }
    assert_eq!(edges_with_id(&result, 3).len(), 4);
    assert_eq!(result.vert_coords.len(), SIZE * SIZE + 3);
    check_full_result(&input, &result);
    Ok(())
}

#[test]
fn test_random_inputs() -> Result<(), CdtError> {
    for i in 0..4u8 {
        let mut seed = *SEED;
        seed[0] = i;
        let input = random_input(&seed, 60, 12, 4);
        let full = compute(&input, OutputType::Full)?;
        check_full_result(&input, &full);

        for output_type in ALL_OUTPUT_TYPES {
            let result = compute(&input, output_type)?;
            assert_eq!(result.vert_coords, full.vert_coords);
            assert!(result.faces.len() <= full.faces.len());
            check_vertex_containment(&input, &result);
            check_no_crossings(&result);
        }
    }
    Ok(())
}

#[test]
fn test_random_inputs_across_tolerances() -> Result<(), CdtError> {
    for epsilon in [1e-9, 1e-3, 0.5] {
        for i in 0..40u8 {
            let mut seed = *SEED;
            seed[0] = i;
            let input = random_input_with_epsilon(&seed, 60, 12, 4, epsilon);
            let full = compute(&input, OutputType::Full)?;
            check_full_result(&input, &full);
            check_vertex_separation(&input, &full);

            let constraints = compute(&input, OutputType::Constraints)?;
            check_constraint_coverage(&input, &constraints);
            check_faces_reported(&input, &full, &constraints);
        }
    }
    Ok(())
}

#[test]
fn test_sliver_face_next_to_crossing_edge() -> anyhow::Result<()> {
    // The edge crosses the sliver's bottom edge and its left edge less than epsilon apart
    let mut input = CdtInput::new(1e-3);
    for position in [[0.0, 0.0], [100.0, 0.0], [50.0, 0.02], [1.0, -1.0], [1.0, 1.0]] {
        input.add_vertex(position);
    }
    input.add_edge(3, 4);
    input.add_face([0, 1, 2]);

    let finished = CdtBuilder::new(&input, CdtOptions::default())?.run()?;
    assert_eq!(finished.diagnostics().leaking_faces, 0);

    let full = finished.extract(OutputType::Full);
    check_full_result(&input, &full);
    check_vertex_separation(&input, &full);
    let tagged = full.faces_orig.iter().filter(|orig| orig.contains(&0)).count();
    assert!(tagged > 0);

    let constraints = finished.extract(OutputType::Constraints);
    check_faces_reported(&input, &full, &constraints);
    assert_eq!(constraints.faces.len(), 1);

    let bmesh = finished.extract(OutputType::ConstraintsValidBmesh);
    assert!(!bmesh.faces.is_empty());
    assert!(bmesh.faces_orig.iter().all(|orig| orig == [0]));
    Ok(())
}

#[test]
fn test_extraction_is_repeatable() -> Result<(), CdtError> {
    let input = random_input(SEED, 40, 8, 3);
    let finished = CdtBuilder::new(&input, CdtOptions::default())?.run()?;
    finished.sanity_check();
    for output_type in ALL_OUTPUT_TYPES {
        let first = finished.extract(output_type);
        assert_eq!(first, finished.extract(output_type));
        assert_eq!(first, compute(&input, output_type)?);
    }
    Ok(())
}

#[test]
fn test_tight_step_limits_terminate() -> Result<(), CdtError> {
    let input = random_input(SEED, 80, 20, 4);
    let options = CdtOptions::new()
        .with_locate_step_factor(1)
        .with_walk_step_factor(1)
        .with_flip_step_factor(1);
    let result = compute_with_options(&input, OutputType::Full, &options)?;
    check_vertex_containment(&input, &result);
    check_no_crossings(&result);
    Ok(())
}

#[test]
fn test_invalid_inputs() {
    assert_eq!(
        compute(&CdtInput::new(1e-5), OutputType::Full),
        Err(CdtError::NoVertices)
    );

    let mut input = CdtInput::new(0.0);
    input.add_vertex([0.0, 0.0]);
    assert_eq!(
        compute(&input, OutputType::Full),
        Err(CdtError::InvalidEpsilon(0.0))
    );

    let mut input = CdtInput::new(1e-5);
    input.add_vertex([0.0, f64::NAN]);
    assert!(matches!(
        compute(&input, OutputType::Full),
        Err(CdtError::InvalidCoordinate { vertex: 0, .. })
    ));

    let mut input = CdtInput::new(1e-5);
    input.add_vertex([0.0, 0.0]);
    input.add_vertex([1.0, 0.0]);
    input.add_face([0, 1, 2]);
    assert_eq!(
        compute(&input, OutputType::Full),
        Err(CdtError::FaceVertexOutOfRange { face: 0, vertex: 2 })
    );
}
