use std::collections::TryReserveError;

use super::handles::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(super) struct FaceEntry<F> {
    pub(super) adjacent_edge: Option<FixedDirectedEdgeHandle>,
    pub(super) data: F,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(super) struct VertexEntry<V> {
    pub(super) data: V,
    pub(super) out_edge: Option<FixedDirectedEdgeHandle>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(super) struct EdgeEntry<UE> {
    pub entries: [HalfEdgeEntry; 2],
    pub undirected_data: UE,
}

impl<UE> EdgeEntry<UE>
where
    UE: Default,
{
    pub(super) fn new(normalized: HalfEdgeEntry, not_normalized: HalfEdgeEntry) -> Self {
        EdgeEntry {
            entries: [normalized, not_normalized],
            undirected_data: Default::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(super) struct HalfEdgeEntry {
    pub next: FixedDirectedEdgeHandle,
    pub prev: FixedDirectedEdgeHandle,
    pub face: FixedFaceHandle,
    pub origin: FixedVertexHandle,
}

/// Doubly connected edge list storing vertices, edges and faces in three growable tables.
///
/// All topology links are indices into these tables. Elements are never removed, the
/// arena is dropped as a whole once the run is finished. Face 0 is the unbounded outer face.
#[derive(Clone, Debug)]
pub struct Dcel<V, UE = (), F = ()> {
    pub(super) vertices: Vec<VertexEntry<V>>,
    pub(super) faces: Vec<FaceEntry<F>>,
    pub(super) edges: Vec<EdgeEntry<UE>>,
}

impl<V, UE, F> Default for Dcel<V, UE, F>
where
    F: Default,
{
    fn default() -> Self {
        super::dcel_operations::new()
    }
}

impl<V, UE, F> Dcel<V, UE, F> {
    /// Reserves space for additional elements, failing instead of aborting if the
    /// allocation cannot be satisfied.
    pub fn try_reserve(
        &mut self,
        num_vertices: usize,
        num_undirected_edges: usize,
        num_faces: usize,
    ) -> Result<(), TryReserveError> {
        self.vertices.try_reserve(num_vertices)?;
        self.edges.try_reserve(num_undirected_edges)?;
        self.faces.try_reserve(num_faces)?;
        Ok(())
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_directed_edges(&self) -> usize {
        self.edges.len() * 2
    }

    pub fn num_undirected_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn vertex(&self, handle: FixedVertexHandle) -> VertexHandle<V, UE, F> {
        DynamicHandleImpl::new(self, handle)
    }

    pub fn vertex_out_edge(&self, handle: FixedVertexHandle) -> Option<FixedDirectedEdgeHandle> {
        self.vertices[handle.index()].out_edge
    }

    pub fn directed_edge(&self, handle: FixedDirectedEdgeHandle) -> DirectedEdgeHandle<V, UE, F> {
        DirectedEdgeHandle::new(self, handle)
    }

    pub fn undirected_edge(
        &self,
        handle: FixedUndirectedEdgeHandle,
    ) -> UndirectedEdgeHandle<V, UE, F> {
        UndirectedEdgeHandle::new(self, handle)
    }

    pub(super) fn edge_entry(&self, handle: FixedUndirectedEdgeHandle) -> &EdgeEntry<UE> {
        &self.edges[handle.index()]
    }

    pub(super) fn edge_entry_mut(
        &mut self,
        handle: FixedUndirectedEdgeHandle,
    ) -> &mut EdgeEntry<UE> {
        &mut self.edges[handle.index()]
    }

    pub(super) fn half_edge(&self, handle: FixedDirectedEdgeHandle) -> &HalfEdgeEntry {
        let entry = self.edge_entry(handle.as_undirected());
        &entry.entries[handle.normalize_index()]
    }

    pub(super) fn half_edge_mut(&mut self, handle: FixedDirectedEdgeHandle) -> &mut HalfEdgeEntry {
        let entry = self.edge_entry_mut(handle.as_undirected());
        &mut entry.entries[handle.normalize_index()]
    }

    pub fn undirected_edge_data(&self, handle: FixedUndirectedEdgeHandle) -> &UE {
        &self.edge_entry(handle).undirected_data
    }

    pub fn undirected_edge_data_mut(&mut self, handle: FixedUndirectedEdgeHandle) -> &mut UE {
        &mut self.edge_entry_mut(handle).undirected_data
    }

    pub fn face(&self, handle: FixedFaceHandle) -> FaceHandle<V, UE, F> {
        DynamicHandleImpl::new(self, handle)
    }

    pub fn face_data(&self, handle: FixedFaceHandle) -> &F {
        &self.faces[handle.index()].data
    }

    pub fn face_data_mut(&mut self, handle: FixedFaceHandle) -> &mut F {
        &mut self.faces[handle.index()].data
    }

    pub fn face_adjacent_edge(&self, handle: FixedFaceHandle) -> Option<FixedDirectedEdgeHandle> {
        self.faces[handle.index()].adjacent_edge
    }

    pub fn vertex_data(&self, handle: FixedVertexHandle) -> &V {
        &self.vertices[handle.index()].data
    }

    pub fn vertex_data_mut(&mut self, handle: FixedVertexHandle) -> &mut V {
        &mut self.vertices[handle.index()].data
    }

    pub fn get_edge_from_neighbors(
        &self,
        from: FixedVertexHandle,
        to: FixedVertexHandle,
    ) -> Option<DirectedEdgeHandle<V, UE, F>> {
        let vertex = self.vertex(from);
        vertex.out_edges().find(|edge| edge.to().fix() == to)
    }

    pub fn fixed_vertices(&self) -> impl Iterator<Item = FixedVertexHandle> {
        (0..self.num_vertices()).map(FixedVertexHandle::new)
    }

    pub fn fixed_undirected_edges(&self) -> impl Iterator<Item = FixedUndirectedEdgeHandle> {
        (0..self.num_undirected_edges()).map(FixedUndirectedEdgeHandle::new)
    }

    /// Iterates over all faces except the outer face.
    pub fn fixed_inner_faces(&self) -> impl Iterator<Item = FixedFaceHandle> {
        (1..self.num_faces()).map(FixedFaceHandle::new)
    }

    /// Checks that all topology links are mutually consistent.
    ///
    /// Panics on the first violation. Every inner face must be a triangle.
    pub fn sanity_check(&self) {
        if self.edges.is_empty() {
            assert_eq!(self.num_faces(), 1);
            assert!(self.faces[0].adjacent_edge.is_none());
            return;
        }

        for (index, face) in self.faces.iter().enumerate() {
            let adjacent_edge = face
                .adjacent_edge
                .expect("Face without adjacent edge. This is a bug.");
            assert_eq!(
                self.directed_edge(adjacent_edge).face().fix(),
                FixedFaceHandle::new(index)
            );
        }
        for (index, vertex) in self.vertices.iter().enumerate() {
            let out_edge = vertex
                .out_edge
                .expect("Vertex without out edge. This is a bug.");
            assert_eq!(
                self.directed_edge(out_edge).from().fix(),
                FixedVertexHandle::new(index)
            );
        }

        for handle in 0..self.edges.len() {
            let edge = self.directed_edge(FixedDirectedEdgeHandle::new_normalized(handle));
            for edge in [edge, edge.rev()] {
                assert_eq!(edge, edge.next().prev());
                assert_eq!(edge, edge.prev().next());
                assert_eq!(edge.face(), edge.next().face());
                assert_ne!(edge.face(), edge.rev().face());
                if !edge.face().is_outer() {
                    assert_eq!(edge, edge.next().next().next());
                    assert_eq!(edge, edge.prev().prev().prev());
                }
                assert_ne!(edge, edge.next());
                assert_ne!(edge, edge.prev());

                assert_eq!(edge, edge.cw().ccw());
                assert_eq!(edge, edge.ccw().cw());
                assert_eq!(edge.from(), edge.cw().from());
                assert_eq!(edge.from(), edge.ccw().from());
            }
        }
    }
}
