use super::super::dcel::EdgeEntry;
use super::super::dcel_operations::OUTER_FACE_HANDLE;
use super::super::math;
use super::circular_iterator::{CircularIterator, NextBackFn};
use super::handle_defs::*;
use crate::{HasPosition, LineSideInfo, Point2};
use std::cmp::Ordering;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};

impl<'a, V, UE, F> Debug for VertexHandle<'a, V, UE, F> {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        write!(f, "VertexHandle({:?})", self.handle.index())
    }
}

impl<'a, V, UE, F> Debug for DirectedEdgeHandle<'a, V, UE, F> {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        write!(
            f,
            "DirectedEdgeHandle - id: {:?} ({:?} -> {:?})",
            self.handle.index(),
            self.from().fix(),
            self.to().fix()
        )
    }
}

impl<'a, V, UE, F> Debug for UndirectedEdgeHandle<'a, V, UE, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> ::std::fmt::Result {
        let [v0, v1] = self.vertices();
        write!(
            f,
            "UndirectedEdgeHandle - id: {:?} ({:?} <-> {:?})",
            self.handle.index(),
            v0.fix(),
            v1.fix(),
        )
    }
}

impl<'a, V, UE, F> Debug for FaceHandle<'a, V, UE, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> ::std::fmt::Result {
        if self.is_outer() {
            return write!(f, "OuterFace");
        }
        let [v0, v1, v2] = self.vertices();
        write!(
            f,
            "FaceHandle - id: {:?} ({:?}, {:?}, {:?})",
            self.handle.index(),
            v0.fix().index(),
            v1.fix().index(),
            v2.fix().index(),
        )
    }
}

impl FixedDirectedEdgeHandle {
    #[inline]
    pub(in super::super) fn new_normalized(index: usize) -> Self {
        Self::new(index << 1)
    }

    #[inline]
    pub(in super::super) fn normalize_index(self) -> usize {
        self.index() & 0x1
    }

    /// Returns this edge with its direction reversed.
    #[inline]
    pub fn rev(self) -> Self {
        // Flip the last bit
        Self::new(self.index() ^ 0x1)
    }

    /// Converts this directed edge handle into an undirected edge handle.
    #[inline]
    pub fn as_undirected(self) -> FixedUndirectedEdgeHandle {
        FixedHandleImpl::new(self.index() >> 1)
    }
}

impl FixedUndirectedEdgeHandle {
    /// Returns the normalized directed edge of this undirected edge.
    #[inline]
    pub fn as_directed(&self) -> FixedDirectedEdgeHandle {
        FixedDirectedEdgeHandle::new_normalized(self.index())
    }
}

impl FixedFaceHandle {
    /// Returns `true` if this handle refers to the single unbounded face.
    pub fn is_outer(&self) -> bool {
        *self == OUTER_FACE_HANDLE
    }
}

impl<'a, V, UE, F, Type: Copy> Clone for DynamicHandleImpl<'a, V, UE, F, Type> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, V, UE, F, Type: Copy> Copy for DynamicHandleImpl<'a, V, UE, F, Type> {}

impl<'a, V, UE, F, Type: PartialEq> PartialEq for DynamicHandleImpl<'a, V, UE, F, Type> {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl<'a, V, UE, F, Type: Eq> Eq for DynamicHandleImpl<'a, V, UE, F, Type> {}

impl<'a, V, UE, F, Type: Hash> Hash for DynamicHandleImpl<'a, V, UE, F, Type> {
    fn hash<HA: Hasher>(&self, state: &mut HA) {
        self.handle.hash(state);
    }
}

impl<'a, V, UE, F, Type: Ord> Ord for DynamicHandleImpl<'a, V, UE, F, Type> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.handle.cmp(&other.handle)
    }
}

impl<'a, V, UE, F, Type: PartialOrd> PartialOrd for DynamicHandleImpl<'a, V, UE, F, Type> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.handle.partial_cmp(&other.handle)
    }
}

impl<'a, V, UE, F, Type: Copy + Default> DynamicHandleImpl<'a, V, UE, F, Type> {
    /// Converts this dynamic handle to its fixed variant.
    pub fn fix(&self) -> FixedHandleImpl<Type> {
        self.handle
    }
}

impl<'a, V, UE, F> DirectedEdgeHandle<'a, V, UE, F> {
    /// Returns the edge's two vertices.
    ///
    /// The first vertex is `self.from()`, the second vertex is `self.to()`.
    pub fn vertices(&self) -> [VertexHandle<'a, V, UE, F>; 2] {
        [self.from(), self.to()]
    }

    /// Returns the edge's origin vertex.
    pub fn from(&self) -> VertexHandle<'a, V, UE, F> {
        let entry = self.dcel.half_edge(self.handle);
        DynamicHandleImpl::new(self.dcel, entry.origin)
    }

    /// Returns the edge's destination vertex.
    pub fn to(&self) -> VertexHandle<'a, V, UE, F> {
        self.rev().from()
    }

    /// Returns this edge in reversed direction.
    #[inline]
    pub fn rev(&self) -> Self {
        DirectedEdgeHandle::new(self.dcel, self.handle.rev())
    }

    /// Returns the vertex which lies opposite of this edge.
    ///
    /// Returns `None` if this edge borders the outer face.
    pub fn opposite_vertex(&self) -> Option<VertexHandle<'a, V, UE, F>> {
        if self.is_outer_edge() {
            None
        } else {
            Some(self.prev().from())
        }
    }

    /// Returns the oriented next edge.
    ///
    /// The oriented next edge shares the same face as this edge. "Oriented" means
    /// counterclockwise.
    pub fn next(&self) -> DirectedEdgeHandle<'a, V, UE, F> {
        let entry = self.dcel.half_edge(self.handle);
        DirectedEdgeHandle::new(self.dcel, entry.next)
    }

    /// Returns the oriented previous edge.
    pub fn prev(&self) -> DirectedEdgeHandle<'a, V, UE, F> {
        let entry = self.dcel.half_edge(self.handle);
        DirectedEdgeHandle::new(self.dcel, entry.prev)
    }

    /// Returns the face located to the left of this edge.
    pub fn face(&self) -> FaceHandle<'a, V, UE, F> {
        let entry = self.dcel.half_edge(self.handle);
        self.dcel.face(entry.face)
    }

    /// Returns the next outgoing edge of `self.from()` in clockwise direction.
    pub fn cw(&self) -> DirectedEdgeHandle<'a, V, UE, F> {
        self.rev().next()
    }

    /// Returns the next outgoing edge of `self.from()` in counter clockwise direction.
    pub fn ccw(&self) -> DirectedEdgeHandle<'a, V, UE, F> {
        self.prev().rev()
    }

    /// Returns a reference to the data shared by both directions of this edge.
    pub fn data(&self) -> &'a UE {
        &self.entry().undirected_data
    }

    fn entry(&self) -> &'a EdgeEntry<UE> {
        self.dcel.edge_entry(self.handle.as_undirected())
    }

    /// Returns `true` if this edge is adjacent to the outer face.
    pub fn is_outer_edge(&self) -> bool {
        self.face().is_outer()
    }
}

impl<'a, V, UE, F> DirectedEdgeHandle<'a, V, UE, F>
where
    V: HasPosition,
{
    /// Returns the start and end position of this edge.
    pub fn positions(&self) -> [Point2<f64>; 2] {
        [self.from().position(), self.to().position()]
    }

    /// Returns the position of the vertex opposite of this edge.
    pub fn opposite_position(&self) -> Option<Point2<f64>> {
        self.opposite_vertex().map(|v| v.position())
    }

    /// Determines on which side of this edge a point lies. Uses exact arithmetic.
    pub fn side_query(&self, query_point: Point2<f64>) -> LineSideInfo {
        let (p1, p2) = (self.from().position(), self.to().position());
        math::side_query(p1, p2, query_point)
    }
}

impl<'a, V, UE, F> UndirectedEdgeHandle<'a, V, UE, F> {
    /// Returns the edge's two vertices, in the order of its normalized directed edge.
    pub fn vertices(&self) -> [VertexHandle<'a, V, UE, F>; 2] {
        self.as_directed().vertices()
    }

    /// Converts this undirected handle into its normalized directed edge.
    pub fn as_directed(&self) -> DirectedEdgeHandle<'a, V, UE, F> {
        DirectedEdgeHandle::new(self.dcel, self.handle.as_directed())
    }

    /// Returns a reference to the data associated with this edge.
    pub fn data(&self) -> &'a UE {
        &self.dcel.edge_entry(self.handle).undirected_data
    }
}

impl<'a, V, UE, F> UndirectedEdgeHandle<'a, V, UE, F>
where
    V: HasPosition,
{
    /// Returns the end positions of this edge.
    pub fn positions(&self) -> [Point2<f64>; 2] {
        self.as_directed().positions()
    }
}

impl<'a, V, UE, F> FaceHandle<'a, V, UE, F> {
    /// Returns `true` if this is the outer face.
    pub fn is_outer(&self) -> bool {
        self.handle.is_outer()
    }

    /// Returns an edge adjacent to this face.
    ///
    /// Returns `None` only for the outer face of an arena without any edges.
    pub fn adjacent_edge(&self) -> Option<DirectedEdgeHandle<'a, V, UE, F>> {
        self.dcel
            .face_adjacent_edge(self.handle)
            .map(|e| DirectedEdgeHandle::new(self.dcel, e))
    }

    /// Returns the three directed edges of this triangle in counter clockwise order.
    ///
    /// Must not be called on the outer face.
    pub fn adjacent_edges(&self) -> [DirectedEdgeHandle<'a, V, UE, F>; 3] {
        let e0 = self
            .adjacent_edge()
            .expect("Inner face without adjacent edge. This is a bug.");
        let e1 = e0.next();
        let e2 = e1.next();
        [e0, e1, e2]
    }

    /// Returns the three vertices of this triangle in counter clockwise order.
    pub fn vertices(&self) -> [VertexHandle<'a, V, UE, F>; 3] {
        let [e0, e1, e2] = self.adjacent_edges();
        [e0.from(), e1.from(), e2.from()]
    }

    /// Returns a reference to the data associated with this face.
    pub fn data(&self) -> &'a F {
        self.dcel.face_data(self.handle)
    }
}

impl<'a, V, UE, F> FaceHandle<'a, V, UE, F>
where
    V: HasPosition,
{
    /// Returns the positions of this triangle's vertices in counter clockwise order.
    pub fn positions(&self) -> [Point2<f64>; 3] {
        let [v0, v1, v2] = self.vertices();
        [v0.position(), v1.position(), v2.position()]
    }
}

pub struct CcwEdgesNextBackFn;

impl NextBackFn for CcwEdgesNextBackFn {
    fn next<V, UE, F>(edge_handle: DirectedEdgeHandle<V, UE, F>) -> DirectedEdgeHandle<V, UE, F> {
        edge_handle.ccw()
    }

    fn next_back<V, UE, F>(
        edge_handle: DirectedEdgeHandle<V, UE, F>,
    ) -> DirectedEdgeHandle<V, UE, F> {
        edge_handle.cw()
    }
}

impl<'a, V, UE, F> VertexHandle<'a, V, UE, F> {
    /// Returns all directed edges going out of this vertex.
    ///
    /// The edges are returned in counter clockwise order, beginning at an arbitrary
    /// edge. The iterator is double ended, `rev()` yields clockwise order.
    pub fn out_edges(&self) -> CircularIterator<'a, V, UE, F, CcwEdgesNextBackFn> {
        if let Some(edge) = self.out_edge() {
            CircularIterator::new(edge)
        } else {
            CircularIterator::new_empty(DirectedEdgeHandle::new(
                self.dcel,
                FixedDirectedEdgeHandle::new(0),
            ))
        }
    }

    /// Returns an outgoing edge of this vertex.
    pub fn out_edge(&self) -> Option<DirectedEdgeHandle<'a, V, UE, F>> {
        self.dcel
            .vertex_out_edge(self.handle)
            .map(|e| DirectedEdgeHandle::new(self.dcel, e))
    }

    /// Returns a reference to the data associated with this vertex.
    pub fn data(&self) -> &'a V {
        self.dcel.vertex_data(self.handle)
    }
}

impl<'a, V, UE, F> VertexHandle<'a, V, UE, F>
where
    V: HasPosition,
{
    /// Returns the vertex position.
    pub fn position(&self) -> Point2<f64> {
        self.data().position().to_f64()
    }
}
