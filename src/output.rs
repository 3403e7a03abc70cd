use std::collections::VecDeque;

use hashbrown::{HashMap, HashSet};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::delaunay_core::{
    math, DirectedEdgeHandle, FixedDirectedEdgeHandle, FixedFaceHandle, FixedUndirectedEdgeHandle,
    FixedVertexHandle,
};
use crate::triangulation::{CdtDcel, CdtEdge, CdtFace, CdtVertex, Triangulation, NUM_ENVELOPE_VERTICES};
use crate::FlattenedLists;

/// Selects which view of a finished triangulation is extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OutputType {
    /// Every triangle of the convex hull of all vertices.
    Full,
    /// Triangles that cannot be reached from the convex hull boundary without crossing a
    /// constraint edge, together with all constraint edges.
    Inside,
    /// One polygon per connected region of face interiors, bounded by constraint edges.
    /// Holes are joined to the outer boundary by a chain of edges that the polygon passes
    /// twice. Only constraint edges and these joining edges are output.
    Constraints,
    /// Like [OutputType::Constraints], but regions are split by extra edges wherever a single
    /// polygon would repeat a vertex or enclose a hole.
    ConstraintsValidBmesh,
}

/// The output of a triangulation run.
///
/// All tables use the same flattened layout as [crate::CdtInput]. Every output vertex, edge
/// and face carries the list of input elements it derives from. Output edges refer to input
/// edges by index and to face boundary edges by `face_edge_offset + position`, where
/// `position` is the index of the boundary edge's start vertex in the flattened input face
/// array.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CdtResult {
    /// Output vertex coordinates.
    pub vert_coords: Vec<[f64; 2]>,
    /// Output edges as pairs of output vertex indices.
    pub edges: Vec<[usize; 2]>,
    /// Output faces as counter clockwise loops of output vertex indices.
    pub faces: FlattenedLists,
    /// The number of input edges.
    pub face_edge_offset: usize,
    /// Input vertices merged into each output vertex.
    pub verts_orig: FlattenedLists,
    /// Input edges and face boundary edges covering each output edge.
    pub edges_orig: FlattenedLists,
    /// Input faces containing each output face.
    pub faces_orig: FlattenedLists,
}

impl CdtResult {
    /// Returns the vertex loop of an output face.
    pub fn face(&self, index: usize) -> Option<&[usize]> {
        self.faces.get(index)
    }

    /// Returns the input vertices of an output vertex.
    pub fn vert_orig(&self, index: usize) -> Option<&[usize]> {
        self.verts_orig.get(index)
    }

    /// Returns the input edge ids of an output edge.
    pub fn edge_orig(&self, index: usize) -> Option<&[usize]> {
        self.edges_orig.get(index)
    }

    /// Returns the input faces of an output face.
    pub fn face_orig(&self, index: usize) -> Option<&[usize]> {
        self.faces_orig.get(index)
    }

    /// Returns `true` if an edge id of [Self::edges_orig] refers to a face boundary edge.
    pub fn is_face_edge_orig(&self, id: usize) -> bool {
        id >= self.face_edge_offset
    }

    /// Decodes a face boundary edge id into the position of the boundary edge's start vertex
    /// within the flattened input face array.
    ///
    /// Returns `None` for ids referring to input edges.
    pub fn face_edge_start(&self, id: usize) -> Option<usize> {
        id.checked_sub(self.face_edge_offset)
    }
}

fn output_index(vertex: FixedVertexHandle) -> usize {
    vertex.index() - NUM_ENVELOPE_VERTICES
}

/// Extracts one view of a finished triangulation. Does not modify the triangulation.
pub(crate) fn extract(
    triangulation: &Triangulation,
    output_type: OutputType,
    face_edge_offset: usize,
) -> CdtResult {
    let dcel = triangulation.dcel();
    let mut result = CdtResult {
        face_edge_offset,
        ..Default::default()
    };

    for vertex in dcel.fixed_vertices().skip(NUM_ENVELOPE_VERTICES) {
        let handle = dcel.vertex(vertex);
        let position = handle.position();
        result.vert_coords.push([position.x, position.y]);
        result.verts_orig.push_list(handle.data().orig.iter().copied());
    }

    let retained_edges = match output_type {
        OutputType::Full => extract_triangles(triangulation, &mut result, |_| true),
        OutputType::Inside => {
            let outside = outside_faces(triangulation);
            extract_triangles(triangulation, &mut result, |face| !outside[face.index()])
        }
        OutputType::Constraints => {
            let groups = FaceGroups::constraint_regions(triangulation).with_bridged_holes(dcel);
            extract_groups(dcel, &groups, &mut result);
            groups.bridges
        }
        OutputType::ConstraintsValidBmesh => {
            let groups = FaceGroups::valid_bmesh_faces(triangulation);
            extract_groups(dcel, &groups, &mut result);
            groups.separating_edges(dcel)
        }
    };

    for edge in dcel.fixed_undirected_edges() {
        let handle = dcel.undirected_edge(edge);
        let [from, to] = handle.vertices();
        if from.data().is_envelope() || to.data().is_envelope() {
            continue;
        }
        let data = handle.data();
        let include = match output_type {
            OutputType::Full => true,
            _ => data.constraint || retained_edges.contains(&edge),
        };
        if include {
            result.edges.push([output_index(from.fix()), output_index(to.fix())]);
            result.edges_orig.push_list(data.orig.iter().copied());
        }
    }

    debug!(
        ?output_type,
        vertices = result.vert_coords.len(),
        edges = result.edges.len(),
        faces = result.faces.len(),
        "extracted triangulation"
    );
    result
}

/// Emits every real triangle accepted by `filter` and returns the edges adjacent to them.
fn extract_triangles(
    triangulation: &Triangulation,
    result: &mut CdtResult,
    filter: impl Fn(FixedFaceHandle) -> bool,
) -> HashSet<FixedUndirectedEdgeHandle> {
    let dcel = triangulation.dcel();
    let mut adjacent_edges = HashSet::new();
    for face in dcel.fixed_inner_faces() {
        if !triangulation.is_real_face(face) || !filter(face) {
            continue;
        }
        let handle = dcel.face(face);
        result
            .faces
            .push_list(handle.vertices().map(|v| output_index(v.fix())));
        result.faces_orig.push_list(handle.data().orig.iter().copied());
        adjacent_edges.extend(handle.adjacent_edges().map(|e| e.fix().as_undirected()));
    }
    adjacent_edges
}

/// Marks the real triangles reachable from the convex hull boundary without crossing a
/// constraint edge.
fn outside_faces(triangulation: &Triangulation) -> Vec<bool> {
    let dcel = triangulation.dcel();
    let mut outside = vec![false; dcel.num_faces()];
    let mut queue = VecDeque::new();

    for edge in dcel.fixed_undirected_edges() {
        let edge = dcel.directed_edge(edge.as_directed());
        if !edge.data().hull || edge.data().constraint {
            continue;
        }
        for side in [edge, edge.rev()] {
            let face = side.face().fix();
            if triangulation.is_real_face(face) && !outside[face.index()] {
                outside[face.index()] = true;
                queue.push_back(face);
            }
        }
    }

    while let Some(face) = queue.pop_front() {
        for edge in dcel.face(face).adjacent_edges() {
            if edge.data().constraint {
                continue;
            }
            let neighbor = edge.rev().face().fix();
            if triangulation.is_real_face(neighbor) && !outside[neighbor.index()] {
                outside[neighbor.index()] = true;
                queue.push_back(neighbor);
            }
        }
    }
    outside
}

/// A partition of the face interior triangles into output faces.
///
/// Groups are numbered in the order of their first triangle.
struct FaceGroups {
    group_of: Vec<Option<usize>>,
    num_groups: usize,
    /// Interior edges joining a hole to the outer boundary of its group.
    bridges: HashSet<FixedUndirectedEdgeHandle>,
}

impl FaceGroups {
    /// Groups face interior triangles connected through non constraint edges.
    fn constraint_regions(triangulation: &Triangulation) -> Self {
        let dcel = triangulation.dcel();
        let mut group_of = vec![None; dcel.num_faces()];
        let mut num_groups = 0;
        let is_interior =
            |face: FixedFaceHandle| triangulation.is_real_face(face) && !dcel.face_data(face).orig.is_empty();

        for seed in dcel.fixed_inner_faces() {
            if group_of[seed.index()].is_some() || !is_interior(seed) {
                continue;
            }
            let group = num_groups;
            num_groups += 1;
            group_of[seed.index()] = Some(group);
            let mut queue = VecDeque::from([seed]);

            while let Some(face) = queue.pop_front() {
                for edge in dcel.face(face).adjacent_edges() {
                    if edge.data().constraint {
                        continue;
                    }
                    let neighbor = edge.rev().face().fix();
                    if group_of[neighbor.index()].is_none() && is_interior(neighbor) {
                        group_of[neighbor.index()] = Some(group);
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        Self {
            group_of,
            num_groups,
            bridges: HashSet::new(),
        }
    }

    /// Splits each constraint region into polygons without repeated vertices or holes.
    ///
    /// Starting from single triangles, a non constraint edge is dissolved if the two polygons
    /// on its sides share no vertex besides the edge's endpoints. The union of two such
    /// polygons is again a simple polygon.
    fn valid_bmesh_faces(triangulation: &Triangulation) -> Self {
        let dcel = triangulation.dcel();
        let regions = Self::constraint_regions(triangulation);

        let mut parent: Vec<usize> = (0..dcel.num_faces()).collect();
        let mut vertex_sets: Vec<HashSet<FixedVertexHandle>> = (0..dcel.num_faces())
            .map(FixedFaceHandle::new)
            .map(|face| {
                if regions.group(face).is_some() {
                    dcel.face(face).vertices().iter().map(|v| v.fix()).collect()
                } else {
                    HashSet::new()
                }
            })
            .collect();

        // Shared vertex sets only grow, so a single pass leaves no dissolvable edge behind
        for edge in dcel.fixed_undirected_edges() {
            let edge = dcel.directed_edge(edge.as_directed());
            if edge.data().constraint {
                continue;
            }
            let (left, right) = (edge.face().fix(), edge.rev().face().fix());
            if regions.group(left).is_none() || regions.group(left) != regions.group(right) {
                continue;
            }

            let root_left = find_root(&mut parent, left.index());
            let root_right = find_root(&mut parent, right.index());
            if root_left == root_right {
                continue;
            }
            let shared = vertex_sets[root_left]
                .intersection(&vertex_sets[root_right])
                .count();
            if shared != 2 {
                continue;
            }

            let (root, child) = if root_left < root_right {
                (root_left, root_right)
            } else {
                (root_right, root_left)
            };
            parent[child] = root;
            let moved = std::mem::take(&mut vertex_sets[child]);
            vertex_sets[root].extend(moved);
        }

        let mut group_ids = vec![None; dcel.num_faces()];
        let mut group_of = vec![None; dcel.num_faces()];
        let mut num_groups = 0;
        for face in dcel.fixed_inner_faces() {
            if regions.group(face).is_none() {
                continue;
            }
            let root = find_root(&mut parent, face.index());
            let group = *group_ids[root].get_or_insert_with(|| {
                num_groups += 1;
                num_groups - 1
            });
            group_of[face.index()] = Some(group);
        }

        Self {
            group_of,
            num_groups,
            bridges: HashSet::new(),
        }
    }

    /// Joins the holes of every group to the group's outer boundary.
    ///
    /// Each hole is reached by the shortest chain of interior edges starting at a boundary
    /// loop that is already joined. Chain edges count as boundary on both sides, so a single
    /// boundary walk visits the outer loop and every hole.
    fn with_bridged_holes(mut self, dcel: &CdtDcel) -> Self {
        let mut loops: Vec<Vec<(f64, Vec<FixedVertexHandle>)>> = vec![Vec::new(); self.num_groups];
        let mut visited = HashSet::new();
        for face in dcel.fixed_inner_faces() {
            let Some(group) = self.group(face) else {
                continue;
            };
            for edge in dcel.face(face).adjacent_edges() {
                if !self.is_boundary(edge) || visited.contains(&edge.fix()) {
                    continue;
                }
                let vertices: Vec<_> = trace_boundary(dcel, &self, edge.fix(), &mut visited)
                    .into_iter()
                    .map(|e| dcel.directed_edge(e).from().fix())
                    .collect();
                let positions: Vec<_> = vertices
                    .iter()
                    .map(|v| dcel.vertex(*v).position())
                    .collect();
                loops[group].push((math::double_signed_area(&positions), vertices));
            }
        }

        for (group, group_loops) in loops.into_iter().enumerate() {
            if group_loops.len() > 1 {
                self.bridge_group(dcel, group, group_loops);
            }
        }
        self
    }

    fn bridge_group(
        &mut self,
        dcel: &CdtDcel,
        group: usize,
        mut loops: Vec<(f64, Vec<FixedVertexHandle>)>,
    ) {
        // The outer loop is the only one with a positive area
        loops.sort_by(|(a0, _), (a1, _)| a1.total_cmp(a0));

        // Loops touching at a vertex are already joined
        let mut parent: Vec<usize> = (0..loops.len()).collect();
        let mut loop_of: HashMap<FixedVertexHandle, usize> = HashMap::new();
        for (index, (_, vertices)) in loops.iter().enumerate() {
            for vertex in vertices {
                match loop_of.get(vertex) {
                    Some(&other) => join(&mut parent, other, index),
                    None => {
                        loop_of.insert(*vertex, index);
                    }
                }
            }
        }

        loop {
            let root = find_root(&mut parent, 0);
            let mut predecessor: HashMap<FixedVertexHandle, Option<FixedDirectedEdgeHandle>> =
                HashMap::new();
            let mut queue = VecDeque::new();
            for (index, (_, vertices)) in loops.iter().enumerate() {
                if find_root(&mut parent, index) != root {
                    continue;
                }
                for vertex in vertices {
                    if predecessor.insert(*vertex, None).is_none() {
                        queue.push_back(*vertex);
                    }
                }
            }

            let mut reached = None;
            while let Some(vertex) = queue.pop_front() {
                if let Some(&index) = loop_of.get(&vertex) {
                    if find_root(&mut parent, index) != root {
                        reached = Some((vertex, index));
                        break;
                    }
                }
                for out_edge in dcel.vertex(vertex).out_edges() {
                    if self.group(out_edge.face().fix()) != Some(group) || self.is_boundary(out_edge)
                    {
                        continue;
                    }
                    let neighbor = out_edge.to().fix();
                    if !predecessor.contains_key(&neighbor) {
                        predecessor.insert(neighbor, Some(out_edge.fix()));
                        queue.push_back(neighbor);
                    }
                }
            }

            let Some((mut vertex, index)) = reached else {
                return;
            };
            while let Some(Some(edge)) = predecessor.get(&vertex) {
                self.bridges.insert(edge.as_undirected());
                vertex = dcel.directed_edge(*edge).from().fix();
            }
            join(&mut parent, root, index);
        }
    }

    fn group(&self, face: FixedFaceHandle) -> Option<usize> {
        self.group_of[face.index()]
    }

    fn is_boundary(&self, edge: DirectedEdgeHandle<CdtVertex, CdtEdge, CdtFace>) -> bool {
        let group = self.group(edge.face().fix());
        group.is_some()
            && (group != self.group(edge.rev().face().fix())
                || self.bridges.contains(&edge.fix().as_undirected()))
    }

    /// Non constraint edges separating two groups.
    fn separating_edges(&self, dcel: &CdtDcel) -> HashSet<FixedUndirectedEdgeHandle> {
        dcel.fixed_undirected_edges()
            .filter(|edge| {
                let edge = dcel.directed_edge(edge.as_directed());
                let left = self.group(edge.face().fix());
                let right = self.group(edge.rev().face().fix());
                left.is_some() && right.is_some() && left != right
            })
            .collect()
    }
}

fn find_root(parent: &mut [usize], mut index: usize) -> usize {
    while parent[index] != index {
        parent[index] = parent[parent[index]];
        index = parent[index];
    }
    index
}

fn join(parent: &mut [usize], a: usize, b: usize) {
    let (a, b) = (find_root(parent, a), find_root(parent, b));
    parent[a.max(b)] = a.min(b);
}

/// Follows the boundary of a group starting at a boundary edge.
///
/// At each vertex, the boundary continues with the first boundary edge in clockwise
/// direction after the incoming edge, keeping the group on the left.
fn trace_boundary(
    dcel: &CdtDcel,
    groups: &FaceGroups,
    start: FixedDirectedEdgeHandle,
    visited: &mut HashSet<FixedDirectedEdgeHandle>,
) -> Vec<FixedDirectedEdgeHandle> {
    let mut boundary = Vec::new();
    let mut current = start;

    for _ in 0..dcel.num_directed_edges() {
        visited.insert(current);
        boundary.push(current);

        let mut candidate = dcel.directed_edge(current).next();
        while !groups.is_boundary(candidate) {
            candidate = candidate.cw();
        }
        if candidate.fix() == start {
            return boundary;
        }
        current = candidate.fix();
    }

    panic!("Unterminated face boundary. This is a bug.");
}

/// Emits the outer boundary loop of each group. Holes appear in it only if they were
/// bridged.
fn extract_groups(dcel: &CdtDcel, groups: &FaceGroups, result: &mut CdtResult) {
    let mut outer_loops: Vec<Option<(f64, Vec<FixedDirectedEdgeHandle>)>> =
        vec![None; groups.num_groups];
    let mut face_origs: Vec<Vec<usize>> = vec![Vec::new(); groups.num_groups];
    let mut visited = HashSet::new();

    for face in dcel.fixed_inner_faces() {
        let Some(group) = groups.group(face) else {
            continue;
        };
        face_origs[group].extend(dcel.face_data(face).orig.iter().copied());

        for edge in dcel.face(face).adjacent_edges() {
            if !groups.is_boundary(edge) || visited.contains(&edge.fix()) {
                continue;
            }
            let boundary = trace_boundary(dcel, groups, edge.fix(), &mut visited);
            let positions: Vec<_> = boundary
                .iter()
                .map(|e| dcel.directed_edge(*e).from().position())
                .collect();
            let area = math::double_signed_area(&positions);

            let is_larger = match &outer_loops[group] {
                Some((best, _)) => area > *best,
                None => true,
            };
            if is_larger {
                outer_loops[group] = Some((area, boundary));
            }
        }
    }

    for (outer_loop, mut orig) in outer_loops.into_iter().zip(face_origs) {
        let boundary = outer_loop.map(|(_, boundary)| boundary).unwrap_or_default();
        result.faces.push_list(
            boundary
                .iter()
                .map(|e| output_index(dcel.directed_edge(*e).from().fix())),
        );
        orig.sort_unstable();
        orig.dedup();
        result.faces_orig.push_list(orig);
    }
}
