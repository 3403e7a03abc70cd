use std::collections::VecDeque;

use hashbrown::HashSet;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::constraint_walk::insert_constraint;
use crate::delaunay_core::{math, FixedFaceHandle, FixedVertexHandle};
use crate::output::{self, CdtResult, OutputType};
use crate::triangulation::{ConstraintTag, Triangulation};
use crate::{CdtError, CdtInput, CdtOptions, Diagnostics, Point2};

/// The phases of a [CdtBuilder].
///
/// Phases must run in order. A builder that finished all phases becomes a [FinishedCdt].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BuilderState {
    /// The triangulation consists of the seed triangle only.
    Empty,
    /// All input vertices have been inserted.
    VerticesInserted,
    /// All input edges and face boundaries have been inserted.
    ConstraintsInserted,
    /// Faces have been assigned and the result can be extracted.
    Extracted,
}

/// Runs a single constrained Delaunay triangulation step by step.
///
/// Most callers will use [crate::compute] instead. The builder allows to inspect the run
/// between phases.
///
/// # Example
///
/// ```
/// use planar_cdt::{BuilderState, CdtBuilder, CdtInput, CdtOptions, OutputType};
///
/// # fn main() -> Result<(), planar_cdt::CdtError> {
/// let mut input = CdtInput::new(1e-6);
/// input.add_vertex([0.0, 0.0]);
/// input.add_vertex([2.0, 0.0]);
/// input.add_vertex([1.0, 2.0]);
/// input.add_face([0, 1, 2]);
///
/// let mut builder = CdtBuilder::new(&input, CdtOptions::default())?;
/// builder.insert_vertices()?;
/// assert_eq!(builder.state(), BuilderState::VerticesInserted);
/// builder.insert_constraints()?;
///
/// let finished = builder.finish()?;
/// assert!(finished.diagnostics().is_clean());
/// let result = finished.extract(OutputType::Constraints);
/// assert_eq!(result.faces.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CdtBuilder<'a> {
    input: &'a CdtInput,
    triangulation: Triangulation,
    state: BuilderState,
    input_vertex_map: Vec<FixedVertexHandle>,
}

impl<'a> CdtBuilder<'a> {
    /// Validates the input and creates the seed triangulation.
    ///
    /// Fails without allocating the arena if the input violates any precondition, see
    /// [CdtInput::validate].
    pub fn new(input: &'a CdtInput, options: CdtOptions) -> Result<Self, CdtError> {
        input.validate()?;

        let triangulation = Triangulation::new(&input.positions(), input.epsilon, options)?;
        let mut input_vertex_map = Vec::new();
        input_vertex_map.try_reserve_exact(input.vert_coords.len())?;

        Ok(Self {
            input,
            triangulation,
            state: BuilderState::Empty,
            input_vertex_map,
        })
    }

    /// Returns the current phase.
    pub fn state(&self) -> BuilderState {
        self.state
    }

    /// Returns the degeneracies encountered so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        self.triangulation.diagnostics()
    }

    fn expect_state(&self, expected: BuilderState) -> Result<(), CdtError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(CdtError::OutOfOrder {
                expected,
                found: self.state,
            })
        }
    }

    /// Inserts all input vertices in input order.
    ///
    /// Vertices closer than epsilon to an earlier vertex are merged into it.
    pub fn insert_vertices(&mut self) -> Result<(), CdtError> {
        self.expect_state(BuilderState::Empty)?;

        for (index, position) in self.input.positions().into_iter().enumerate() {
            let vertex = self.triangulation.insert_vertex(position, index);
            self.input_vertex_map.push(vertex);
        }

        debug!(
            input_vertices = self.input.vert_coords.len(),
            vertices = self.triangulation.num_real_vertices(),
            "inserted vertices"
        );
        self.state = BuilderState::VerticesInserted;
        Ok(())
    }

    /// Inserts all input edges, followed by the boundary edges of all input faces.
    ///
    /// Edge `i` is inserted with id `i`. The boundary edge starting at position `p` of the
    /// flattened face array is inserted with id `input.edges.len() + p`.
    pub fn insert_constraints(&mut self) -> Result<(), CdtError> {
        self.expect_state(BuilderState::VerticesInserted)?;

        let input = self.input;
        let num_edges = input.edges.len();
        for (id, [from, to]) in input.edges.iter().copied().enumerate() {
            self.insert_constraint(from, to, id);
        }

        let faces = &input.faces;
        for face in 0..faces.len() {
            let start = faces.start_table[face];
            let vertices = faces.get(face).unwrap_or(&[]);
            for (i, from) in vertices.iter().copied().enumerate() {
                let to = vertices[(i + 1) % vertices.len()];
                self.insert_constraint(from, to, num_edges + start + i);
            }
        }

        debug!(
            edges = num_edges,
            face_edges = input.num_face_edges(),
            vertices = self.triangulation.num_real_vertices(),
            "inserted constraints"
        );
        self.state = BuilderState::ConstraintsInserted;
        Ok(())
    }

    fn insert_constraint(&mut self, from: usize, to: usize, id: usize) {
        let from = self.input_vertex_map[from];
        let to = self.input_vertex_map[to];
        if from == to {
            trace!(id, "constraint collapsed to a single vertex");
            return;
        }
        insert_constraint(&mut self.triangulation, from, to, ConstraintTag::Input(id));
    }

    /// Closes the convex hull, restores the Delaunay property and determines which triangles
    /// belong to which input face.
    pub fn finish(mut self) -> Result<FinishedCdt, CdtError> {
        self.expect_state(BuilderState::ConstraintsInserted)?;

        self.triangulation.close_convex_hull();
        self.triangulation.restore_delaunay_everywhere();

        for face in 0..self.input.faces.len() {
            self.fill_face(face);
        }

        self.state = BuilderState::Extracted;
        debug!(diagnostics = ?self.triangulation.diagnostics(), "finished triangulation");
        Ok(FinishedCdt {
            triangulation: self.triangulation,
            face_edge_offset: self.input.edges.len(),
        })
    }

    /// Runs all phases.
    pub fn run(mut self) -> Result<FinishedCdt, CdtError> {
        self.insert_vertices()?;
        self.insert_constraints()?;
        self.finish()
    }

    /// Marks the triangles enclosed by an input face's boundary.
    ///
    /// The fill starts at the interior side of every boundary edge and stops at edges
    /// belonging to the same face's boundary. The interior side is derived from the sign of
    /// the face's area, so clockwise faces are filled correctly as well. Edges that the
    /// boundary passes equally often in both directions seed neither side.
    ///
    /// A fill that escapes the convex hull falls back to marking every triangle whose
    /// centroid lies inside the face polygon.
    fn fill_face(&mut self, face: usize) {
        let input = self.input;
        let faces = &input.faces;
        let vertices = faces.get(face).unwrap_or(&[]);
        let first_id = input.edges.len() + faces.start_table[face];
        let ids = first_id..first_id + vertices.len();

        let positions: Vec<Point2<f64>> = vertices
            .iter()
            .map(|v| Point2::from(input.vert_coords[*v]))
            .collect();
        let area = math::double_signed_area(&positions);
        if area == 0.0 {
            trace!(face, "skipping face without area");
            return;
        }

        let dcel = self.triangulation.dcel();
        let mut seeds = Vec::new();
        for edge in dcel.fixed_undirected_edges() {
            let edge = dcel.directed_edge(edge.as_directed());
            let [from, to] = edge.positions();
            // Boundary passes with the interior on the left minus those with the interior
            // on the right
            let mut winding = 0i32;
            for id in edge.data().orig.iter().filter(|id| ids.contains(*id)) {
                let i = id - first_id;
                let direction = positions[(i + 1) % positions.len()].sub(positions[i]);
                let along = to.sub(from).dot(direction) >= 0.0;
                winding += if along == (area > 0.0) { 1 } else { -1 };
            }
            match winding.signum() {
                1 => seeds.push(edge.face().fix()),
                -1 => seeds.push(edge.rev().face().fix()),
                _ => {}
            }
        }

        let mut visited: HashSet<FixedFaceHandle> = HashSet::new();
        let mut queue: VecDeque<FixedFaceHandle> = VecDeque::new();
        for seed in seeds {
            if visited.insert(seed) {
                queue.push_back(seed);
            }
        }

        let mut leaks = false;
        while let Some(current) = queue.pop_front() {
            if !self.triangulation.is_real_face(current) {
                leaks = true;
                continue;
            }
            for edge in dcel.face(current).adjacent_edges() {
                if edge.data().orig.iter().any(|id| ids.contains(id)) {
                    continue;
                }
                let neighbor = edge.rev().face().fix();
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        let mut triangles: Vec<_> = if leaks {
            dcel.fixed_inner_faces()
                .filter(|triangle| self.triangulation.is_real_face(*triangle))
                .filter(|triangle| {
                    let [p0, p1, p2] = dcel.face(*triangle).positions();
                    let centroid = p0.add(p1).add(p2).mul(1.0 / 3.0);
                    math::point_in_polygon(&positions, centroid)
                })
                .collect()
        } else {
            visited.into_iter().collect()
        };
        if leaks {
            warn!(
                face,
                "face interior leaks to the outside, marking triangles inside the face polygon"
            );
            self.triangulation.diagnostics_mut().leaking_faces += 1;
        }

        trace!(face, triangles = triangles.len(), "filled face");
        triangles.sort_unstable();
        for triangle in triangles {
            self.triangulation.face_data_mut(triangle).orig.push(face);
        }
    }
}

/// A completed triangulation from which any number of views can be extracted.
#[derive(Debug, Clone)]
pub struct FinishedCdt {
    triangulation: Triangulation,
    face_edge_offset: usize,
}

impl FinishedCdt {
    /// Returns the number of output vertices.
    pub fn num_vertices(&self) -> usize {
        self.triangulation.num_real_vertices()
    }

    /// Returns the number of edges belonging to an input edge or face boundary.
    pub fn num_constraint_edges(&self) -> usize {
        let dcel = self.triangulation.dcel();
        dcel.fixed_undirected_edges()
            .filter(|edge| dcel.undirected_edge_data(*edge).constraint)
            .count()
    }

    /// Returns the degeneracies encountered during the run.
    pub fn diagnostics(&self) -> &Diagnostics {
        self.triangulation.diagnostics()
    }

    /// Returns the tolerance used for this run.
    pub fn epsilon(&self) -> f64 {
        self.triangulation.epsilon()
    }

    /// Checks the internal consistency of the triangulation and its constrained Delaunay
    /// property.
    ///
    /// Panics if the triangulation is corrupt. Intended for tests and debugging.
    pub fn sanity_check(&self) {
        self.triangulation.sanity_check();
    }

    /// Extracts a view of the triangulation.
    ///
    /// Extraction does not modify the triangulation. Extracting the same view twice yields
    /// identical results.
    pub fn extract(&self, output_type: OutputType) -> CdtResult {
        output::extract(&self.triangulation, output_type, self.face_edge_offset)
    }
}

/// Computes the constrained Delaunay triangulation of an input with default options.
///
/// # Example
///
/// ```
/// use planar_cdt::{compute, CdtInput, OutputType};
///
/// # fn main() -> Result<(), planar_cdt::CdtError> {
/// // Two crossing segments
/// let mut input = CdtInput::new(1e-6);
/// input.add_vertex([0.0, 0.0]);
/// input.add_vertex([2.0, 2.0]);
/// input.add_vertex([0.0, 2.0]);
/// input.add_vertex([2.0, 0.0]);
/// input.add_edge(0, 1);
/// input.add_edge(2, 3);
///
/// let result = compute(&input, OutputType::Full)?;
/// // The intersection point becomes a new vertex without input vertices
/// assert_eq!(result.vert_coords.len(), 5);
/// assert_eq!(result.vert_orig(4), Some(&[][..]));
/// # Ok(())
/// # }
/// ```
pub fn compute(input: &CdtInput, output_type: OutputType) -> Result<CdtResult, CdtError> {
    compute_with_options(input, output_type, &CdtOptions::default())
}

/// Computes the constrained Delaunay triangulation of an input.
///
/// Refer to [CdtOptions] for the available options.
pub fn compute_with_options(
    input: &CdtInput,
    output_type: OutputType,
    options: &CdtOptions,
) -> Result<CdtResult, CdtError> {
    let finished = CdtBuilder::new(input, *options)?.run()?;
    Ok(finished.extract(output_type))
}
