#![allow(dead_code)]

use hashbrown::HashMap;
use planar_cdt::{CdtInput, CdtResult};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use robust::Coord;

pub const SEED: &[u8; 32] = b"wPYxAkIiHcEmSBAxQFoXFrpYToCe1B71";

fn coord(position: [f64; 2]) -> Coord<f64> {
    Coord {
        x: position[0],
        y: position[1],
    }
}

fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}

fn segment_distance(a: [f64; 2], b: [f64; 2], p: [f64; 2]) -> f64 {
    let dir = [b[0] - a[0], b[1] - a[1]];
    let length_2 = dir[0] * dir[0] + dir[1] * dir[1];
    if length_2 == 0.0 {
        return distance(a, p);
    }
    let t = (((p[0] - a[0]) * dir[0] + (p[1] - a[1]) * dir[1]) / length_2).clamp(0.0, 1.0);
    distance([a[0] + t * dir[0], a[1] + t * dir[1]], p)
}

/// Creates an input with random vertices, random edges and random triangular faces.
pub fn random_input(seed: &[u8; 32], num_vertices: usize, num_edges: usize, num_faces: usize) -> CdtInput {
    random_input_with_epsilon(seed, num_vertices, num_edges, num_faces, 1e-9)
}

pub fn random_input_with_epsilon(
    seed: &[u8; 32],
    num_vertices: usize,
    num_edges: usize,
    num_faces: usize,
    epsilon: f64,
) -> CdtInput {
    let mut rng = StdRng::from_seed(*seed);
    let range = Uniform::new(-100.0, 100.0);
    let mut input = CdtInput::new(epsilon);
    for _ in 0..num_vertices {
        input.add_vertex([range.sample(&mut rng), range.sample(&mut rng)]);
    }
    let index = Uniform::new(0, num_vertices);
    for _ in 0..num_edges {
        input.add_edge(index.sample(&mut rng), index.sample(&mut rng));
    }
    for _ in 0..num_faces {
        let face = [
            index.sample(&mut rng),
            index.sample(&mut rng),
            index.sample(&mut rng),
        ];
        if face[0] != face[1] && face[1] != face[2] && face[0] != face[2] {
            input.add_face(face);
        }
    }
    input
}

/// Every input vertex is represented by an output vertex no further than epsilon away.
pub fn check_vertex_containment(input: &CdtInput, result: &CdtResult) {
    let mut found = vec![false; input.vert_coords.len()];
    for (output, orig) in result.verts_orig.iter().enumerate() {
        for &vertex in orig {
            assert!(!found[vertex], "input vertex {} is used twice", vertex);
            found[vertex] = true;
            let offset = distance(result.vert_coords[output], input.vert_coords[vertex]);
            assert!(offset <= input.epsilon, "input vertex {} moved by {}", vertex, offset);
        }
    }
    assert!(found.iter().all(|f| *f), "missing input vertex");
}

fn relative_position(a: [f64; 2], b: [f64; 2], p: [f64; 2]) -> f64 {
    let dir = [b[0] - a[0], b[1] - a[1]];
    ((p[0] - a[0]) * dir[0] + (p[1] - a[1]) * dir[1]) / (dir[0] * dir[0] + dir[1] * dir[1])
}

/// The edges carrying `id` stay close to the input segment and their projections onto it
/// leave no gap. Chains may bend through vertices lying within epsilon of the segment.
fn check_segment_coverage(input: &CdtInput, result: &CdtResult, id: usize, [from, to]: [usize; 2]) {
    let (a, b) = (input.vert_coords[from], input.vert_coords[to]);
    let length = distance(a, b);
    let tolerance = 4.0 * input.epsilon + 1e-9 * (1.0 + length);

    let mut intervals = Vec::new();
    for (edge, orig) in result.edges_orig.iter().enumerate() {
        if !orig.contains(&id) {
            continue;
        }
        let [v0, v1] = result.edges[edge].map(|v| result.vert_coords[v]);
        assert!(segment_distance(a, b, v0) <= tolerance, "edge {} leaves constraint {}", edge, id);
        assert!(segment_distance(a, b, v1) <= tolerance, "edge {} leaves constraint {}", edge, id);
        if length > 0.0 {
            let (t0, t1) = (relative_position(a, b, v0), relative_position(a, b, v1));
            intervals.push((t0.min(t1), t0.max(t1)));
        }
    }

    if length <= 2.0 * input.epsilon {
        return;
    }
    let gap = tolerance / length;
    intervals.sort_by(|(s0, _), (s1, _)| s0.total_cmp(s1));
    let mut reached = 0.0;
    for (start, end) in intervals {
        assert!(
            start <= reached + gap,
            "constraint {} is not covered between {} and {}",
            id,
            reached,
            start
        );
        reached = f64::max(reached, end);
    }
    assert!(
        reached >= 1.0 - gap,
        "constraint {} is only covered up to {}",
        id,
        reached
    );
}

/// Every input edge and face boundary edge is covered by output edges carrying its id.
pub fn check_constraint_coverage(input: &CdtInput, result: &CdtResult) {
    for (id, edge) in input.edges.iter().enumerate() {
        check_segment_coverage(input, result, id, *edge);
    }
    for face in 0..input.faces.len() {
        let vertices = input.faces.get(face).unwrap();
        let start = input.faces.start_table[face];
        for i in 0..vertices.len() {
            let edge = [vertices[i], vertices[(i + 1) % vertices.len()]];
            check_segment_coverage(input, result, input.edges.len() + start + i, edge);
        }
    }
}

/// Distinct output vertices are further than epsilon apart.
pub fn check_vertex_separation(input: &CdtInput, result: &CdtResult) {
    for (i, a) in result.vert_coords.iter().enumerate() {
        for (j, b) in result.vert_coords.iter().enumerate().skip(i + 1) {
            assert!(
                distance(*a, *b) > input.epsilon,
                "output vertices {} and {} are only {} apart",
                i,
                j,
                distance(*a, *b)
            );
        }
    }
}

/// Returns `true` if every vertex of an input face keeps a distance of more than `margin`
/// to every boundary edge it does not belong to.
fn is_well_separated(input: &CdtInput, face: usize, margin: f64) -> bool {
    let vertices = input.faces.get(face).unwrap();
    let len = vertices.len();
    (0..len).all(|i| {
        let p = input.vert_coords[vertices[i]];
        (0..len)
            .filter(|j| *j != i && (j + 1) % len != i)
            .all(|j| {
                let a = input.vert_coords[vertices[j]];
                let b = input.vert_coords[vertices[(j + 1) % len]];
                segment_distance(a, b, p) > margin
            })
    })
}

/// Every input face that is not thinner than a few epsilon is reported by at least one
/// triangle of the full output and one face of the constraints output.
pub fn check_faces_reported(input: &CdtInput, full: &CdtResult, constraints: &CdtResult) {
    for face in 0..input.faces.len() {
        if !is_well_separated(input, face, 4.0 * input.epsilon) {
            continue;
        }
        for (name, result) in [("full", full), ("constraints", constraints)] {
            assert!(
                result.faces_orig.iter().any(|orig| orig.contains(&face)),
                "input face {} is missing from the {} output",
                face,
                name
            );
        }
    }
}

/// No two output edges cross each other properly.
pub fn check_no_crossings(result: &CdtResult) {
    let positions: Vec<_> = result.vert_coords.iter().copied().map(coord).collect();
    for (i, [a, b]) in result.edges.iter().copied().enumerate() {
        for [c, d] in result.edges[i + 1..].iter().copied() {
            if a == c || a == d || b == c || b == d {
                continue;
            }
            let o1 = robust::orient2d(positions[a], positions[b], positions[c]);
            let o2 = robust::orient2d(positions[a], positions[b], positions[d]);
            let o3 = robust::orient2d(positions[c], positions[d], positions[a]);
            let o4 = robust::orient2d(positions[c], positions[d], positions[b]);
            assert!(
                !(o1 * o2 < 0.0 && o3 * o4 < 0.0),
                "edges {:?} and {:?} cross",
                [a, b],
                [c, d]
            );
        }
    }
}

/// Every non constraint edge of a full triangulation is locally Delaunay.
pub fn check_legality(result: &CdtResult) {
    let positions: Vec<_> = result.vert_coords.iter().copied().map(coord).collect();
    let mut opposite: HashMap<[usize; 2], Vec<(usize, usize, usize)>> = HashMap::new();
    for face in result.faces.iter() {
        assert_eq!(face.len(), 3);
        for i in 0..3 {
            let (a, b, c) = (face[i], face[(i + 1) % 3], face[(i + 2) % 3]);
            assert!(robust::orient2d(positions[a], positions[b], positions[c]) > 0.0);
            opposite.entry([a.min(b), a.max(b)]).or_default().push((a, b, c));
        }
    }

    for (edge, orig) in result.edges.iter().zip(result.edges_orig.iter()) {
        if !orig.is_empty() {
            continue;
        }
        let Some(triangles) = opposite.get(&[edge[0].min(edge[1]), edge[0].max(edge[1])]) else {
            continue;
        };
        if let [(a, b, c), (_, _, d)] = triangles[..] {
            let value = robust::incircle(positions[a], positions[b], positions[c], positions[d]);
            assert!(value <= 0.0, "edge {:?} is not Delaunay", edge);
        }
    }
}

/// Runs every check applicable to a full triangulation.
pub fn check_full_result(input: &CdtInput, result: &CdtResult) {
    check_vertex_containment(input, result);
    check_constraint_coverage(input, result);
    check_no_crossings(result);
    check_legality(result);
}
