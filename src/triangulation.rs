use std::collections::VecDeque;

use hashbrown::HashSet;
use smallvec::{smallvec, SmallVec};
use tracing::{trace, warn};

use crate::constraint_walk::{ConstraintWalk, WalkStep};
use crate::delaunay_core::{
    dcel_operations, locate, math, Dcel, FixedDirectedEdgeHandle, FixedFaceHandle,
    FixedUndirectedEdgeHandle, FixedVertexHandle, LastUsedVertexHintGenerator,
    PositionInTriangulation,
};
use crate::{CdtError, CdtOptions, Diagnostics, HasPosition, Point2};

/// The seed triangle's vertices always occupy the first arena slots.
pub(crate) const NUM_ENVELOPE_VERTICES: usize = 3;

/// Vertex payload of the triangulation arena.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct CdtVertex {
    position: Point2<f64>,
    /// Input vertices merged into this vertex, in input order.
    pub(crate) orig: SmallVec<[usize; 1]>,
    is_envelope: bool,
}

impl CdtVertex {
    fn envelope(position: Point2<f64>) -> Self {
        Self {
            position,
            orig: SmallVec::new(),
            is_envelope: true,
        }
    }

    fn input(position: Point2<f64>, input_index: usize) -> Self {
        Self {
            position,
            orig: smallvec![input_index],
            is_envelope: false,
        }
    }

    fn steiner(position: Point2<f64>) -> Self {
        Self {
            position,
            orig: SmallVec::new(),
            is_envelope: false,
        }
    }

    pub(crate) fn is_envelope(&self) -> bool {
        self.is_envelope
    }
}

impl HasPosition for CdtVertex {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        self.position
    }
}

/// Edge payload of the triangulation arena.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct CdtEdge {
    /// Set if any input edge or face boundary runs along this edge.
    pub(crate) constraint: bool,
    /// Set if this edge is part of the convex hull of all input vertices.
    pub(crate) hull: bool,
    /// Constraint ids covering this edge, in insertion order.
    pub(crate) orig: SmallVec<[usize; 2]>,
}

impl CdtEdge {
    /// Fixed edges are never flipped.
    pub(crate) fn is_fixed(&self) -> bool {
        self.constraint || self.hull
    }
}

/// Face payload of the triangulation arena.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct CdtFace {
    /// Input faces whose interior contains this triangle.
    pub(crate) orig: SmallVec<[usize; 1]>,
}

/// Determines how a newly inserted segment is marked.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ConstraintTag {
    /// The segment belongs to the constraint with the given id.
    Input(usize),
    /// The segment belongs to the convex hull.
    Hull,
    /// The segment replaces an edge that was bent through a nearby vertex and takes over
    /// its flags and ids.
    Inherit(CdtEdge),
}

/// Bends nested inside the reconnection of another bend are limited to this depth.
const MAX_REROUTE_DEPTH: usize = 2;

pub(crate) type CdtDcel = Dcel<CdtVertex, CdtEdge, CdtFace>;

/// The mutable triangulation state of a single run.
///
/// Wraps the arena together with the tolerance, the locate hint and the counters of
/// every degeneracy that was worked around.
#[derive(Clone, Debug)]
pub(crate) struct Triangulation {
    dcel: CdtDcel,
    hint_generator: LastUsedVertexHintGenerator,
    epsilon: f64,
    options: CdtOptions,
    diagnostics: Diagnostics,
    reroute_depth: usize,
}

impl Triangulation {
    /// Creates a triangulation consisting of a single seed triangle that encloses all given
    /// positions with a wide margin.
    pub(crate) fn new(
        positions: &[Point2<f64>],
        epsilon: f64,
        options: CdtOptions,
    ) -> Result<Self, CdtError> {
        let mut dcel = Dcel::default();
        let num_vertices = positions.len() + NUM_ENVELOPE_VERTICES;
        dcel.try_reserve(num_vertices, 3 * num_vertices, 2 * num_vertices + 1)?;

        dcel_operations::create_envelope(
            &mut dcel,
            envelope_positions(positions, options.envelope_scale).map(CdtVertex::envelope),
        );

        Ok(Self {
            dcel,
            hint_generator: LastUsedVertexHintGenerator::default(),
            epsilon,
            options,
            diagnostics: Diagnostics::default(),
            reroute_depth: 0,
        })
    }

    pub(crate) fn dcel(&self) -> &CdtDcel {
        &self.dcel
    }

    pub(crate) fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub(crate) fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub(crate) fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub(crate) fn face_data_mut(&mut self, face: FixedFaceHandle) -> &mut CdtFace {
        self.dcel.face_data_mut(face)
    }

    pub(crate) fn num_real_vertices(&self) -> usize {
        self.dcel.num_vertices() - NUM_ENVELOPE_VERTICES
    }

    pub(crate) fn is_envelope_vertex(&self, vertex: FixedVertexHandle) -> bool {
        self.dcel.vertex_data(vertex).is_envelope()
    }

    /// Returns `true` for inner triangles without an envelope vertex.
    pub(crate) fn is_real_face(&self, face: FixedFaceHandle) -> bool {
        !face.is_outer()
            && self
                .dcel
                .face(face)
                .vertices()
                .iter()
                .all(|v| !v.data().is_envelope())
    }

    /// Upper bound for the number of steps of a single walk.
    pub(crate) fn max_walk_steps(&self) -> usize {
        self.options.walk_step_factor * self.dcel.num_vertices() + 16
    }

    /// Locates a position, replacing a runaway walk by a linear scan.
    pub(crate) fn locate(&mut self, position: Point2<f64>) -> PositionInTriangulation {
        let max_steps = self.options.locate_step_factor * self.dcel.num_vertices() + 16;
        let hint = self.hint_generator.get_hint();
        match locate::locate_with_hint(&self.dcel, position, hint, max_steps) {
            Some(result) => result,
            None => {
                warn!(
                    x = position.x,
                    y = position.y,
                    max_steps,
                    "point location walk exceeded its bound, scanning all triangles"
                );
                self.diagnostics.locate_fallbacks += 1;
                locate::locate_by_scan(&self.dcel, position)
            }
        }
    }

    /// Inserts an input vertex or merges it into an existing vertex closer than epsilon.
    ///
    /// Returns the vertex that now represents the input vertex.
    pub(crate) fn insert_vertex(
        &mut self,
        position: Point2<f64>,
        input_index: usize,
    ) -> FixedVertexHandle {
        let location = self.locate(position);

        if let Some(existing) = self.merge_candidate(position, location) {
            trace!(input_index, vertex = existing.index(), "merging input vertex");
            self.dcel.vertex_data_mut(existing).orig.push(input_index);
            self.hint_generator.notify_vertex_lookup(existing);
            return existing;
        }

        let vertex = CdtVertex::input(position, input_index);
        let new_handle = match location {
            PositionInTriangulation::OnFace(face) => {
                dcel_operations::insert_into_triangle(&mut self.dcel, vertex, face)
            }
            PositionInTriangulation::OnEdge(edge) => {
                dcel_operations::split_edge(&mut self.dcel, edge, vertex)
            }
            PositionInTriangulation::OnVertex(_) | PositionInTriangulation::OutsideOfEnvelope(_) => {
                panic!("Input vertex outside of the seed triangle. This is a bug.")
            }
        };

        self.legalize_vertex(new_handle);
        self.hint_generator.notify_vertex_inserted(new_handle);
        new_handle
    }

    /// Finds the real vertex closest to `position` if it lies within epsilon.
    ///
    /// Ties are resolved in favor of the earlier vertex.
    fn merge_candidate(
        &self,
        position: Point2<f64>,
        location: PositionInTriangulation,
    ) -> Option<FixedVertexHandle> {
        let mut candidates: SmallVec<[FixedVertexHandle; 4]> = SmallVec::new();
        match location {
            PositionInTriangulation::OnVertex(vertex) => candidates.push(vertex),
            PositionInTriangulation::OnEdge(edge) => {
                let edge = self.dcel.directed_edge(edge);
                candidates.extend(edge.vertices().map(|v| v.fix()));
            }
            PositionInTriangulation::OnFace(face) => {
                candidates.extend(self.dcel.face(face).vertices().map(|v| v.fix()));
            }
            PositionInTriangulation::OutsideOfEnvelope(_) => {}
        }
        candidates.push(locate::walk_to_nearest_neighbor(
            &self.dcel,
            self.hint_generator.get_hint(),
            position,
        ));

        let epsilon_2 = self.epsilon * self.epsilon;
        candidates
            .into_iter()
            .filter(|v| !self.is_envelope_vertex(*v))
            .map(|v| (self.dcel.vertex(v).position().distance_2(position), v))
            .filter(|(distance_2, _)| *distance_2 <= epsilon_2)
            .min_by(|(d0, v0), (d1, v1)| d0.total_cmp(d1).then(v0.cmp(v1)))
            .map(|(_, v)| v)
    }

    fn legalize_vertex(&mut self, new_handle: FixedVertexHandle) {
        let edges: SmallVec<[_; 4]> = self
            .dcel
            .vertex(new_handle)
            .out_edges()
            .filter(|e| !e.is_outer_edge())
            .map(|edge| edge.next().fix())
            .collect();

        for edge_to_legalize in edges {
            self.legalize_edge(edge_to_legalize);
        }
    }

    /// The Delaunay property refers to the property that no point lies inside
    /// the circumcircle of any of the triangulation's triangles. Adding a
    /// new point into the triangulations may violate this property, this method
    /// "repairs" it by strategically flipping edges until the property
    /// holds again. Fixed edges are never flipped.
    ///
    /// The point that may have invalidated the Delaunay property must lie on the
    /// left side of the given edge.
    ///
    /// Returns `true` if at least one edge was flipped.
    fn legalize_edge(&mut self, edge: FixedDirectedEdgeHandle) -> bool {
        let mut edges: SmallVec<[FixedDirectedEdgeHandle; 8]> = smallvec![edge];
        let mut result = false;

        while let Some(e) = edges.pop() {
            let edge = self.dcel.directed_edge(e);
            if edge.data().is_fixed() {
                continue;
            }

            //         v2------ v0
            //          |     / |
            //          |    /  |
            //          |   /<-edge that might be flipped ("edge")
            //          |  /    |
            //          | V     |
            //         v1-------v3
            let v2 = edge.rev().opposite_position();
            let v3 = edge.opposite_position();

            if let (Some(v2), Some(v3)) = (v2, v3) {
                let v0 = edge.from().position();
                let v1 = edge.to().position();
                debug_assert!(math::is_ordered_ccw(v2, v1, v0));
                let should_flip = math::incircle(v2, v1, v0, v3);
                result |= should_flip;

                if should_flip {
                    let e1 = edge.rev().next().fix();
                    let e2 = edge.rev().prev().fix();

                    dcel_operations::flip_cw(&mut self.dcel, e.as_undirected());
                    edges.push(e1);
                    edges.push(e2);
                }
            }
        }
        result
    }

    /// Flips edges until none of the given edges, and none of the edges affected by a flip,
    /// violates the constrained Delaunay property.
    pub(crate) fn restore_delaunay(&mut self, edges: impl IntoIterator<Item = FixedUndirectedEdgeHandle>) {
        let mut edges_to_validate: Vec<_> = edges.into_iter().collect();
        let mut pending: HashSet<_> = edges_to_validate.iter().copied().collect();

        while let Some(next_edge) = edges_to_validate.pop() {
            pending.remove(&next_edge);

            // left----to
            //  |     ^ |
            //  |    /  |
            //  |   /<-edge that might be flipped ("next_edge")
            //  |  /    |
            //  | /     |
            // from----right
            let edge = self.dcel.directed_edge(next_edge.as_directed());
            if edge.data().is_fixed() {
                continue;
            }

            let (Some(left), Some(right)) = (edge.opposite_position(), edge.rev().opposite_position())
            else {
                continue;
            };

            let from = edge.from().position();
            let to = edge.to().position();
            if !math::incircle(from, to, left, right) {
                continue;
            }

            let neighbors = [
                edge.next().fix().as_undirected(),
                edge.prev().fix().as_undirected(),
                edge.rev().next().fix().as_undirected(),
                edge.rev().prev().fix().as_undirected(),
            ];
            dcel_operations::flip_cw(&mut self.dcel, next_edge);

            for neighbor in neighbors {
                if pending.insert(neighbor) {
                    edges_to_validate.push(neighbor);
                }
            }
        }
    }

    /// Runs a Lawson flip pass over every edge of the arena.
    pub(crate) fn restore_delaunay_everywhere(&mut self) {
        let edges: Vec<_> = self.dcel.fixed_undirected_edges().collect();
        self.restore_delaunay(edges);
    }

    /// Marks an edge as part of a constraint.
    pub(crate) fn tag_edge(&mut self, edge: FixedUndirectedEdgeHandle, tag: &ConstraintTag) {
        let data = self.dcel.undirected_edge_data_mut(edge);
        match tag {
            ConstraintTag::Input(id) => {
                data.constraint = true;
                if !data.orig.contains(id) {
                    data.orig.push(*id);
                }
            }
            ConstraintTag::Hull => data.hull = true,
            ConstraintTag::Inherit(source) => {
                data.constraint |= source.constraint;
                data.hull |= source.hull;
                for id in &source.orig {
                    if !data.orig.contains(id) {
                        data.orig.push(*id);
                    }
                }
            }
        }
    }

    /// Splits an edge at the given position and returns the vertex now lying there.
    ///
    /// Positions closer than epsilon to an endpoint resolve to that endpoint. Positions closer
    /// than epsilon to any other vertex resolve to that vertex, bending a fixed edge through
    /// it. Both halves of a split edge keep its constraint data.
    ///
    /// Returns `None` if the split would create an inverted triangle or if a bent edge could
    /// not be reconnected.
    pub(crate) fn split_edge_at(
        &mut self,
        edge: FixedUndirectedEdgeHandle,
        position: Point2<f64>,
    ) -> Option<FixedVertexHandle> {
        let directed = edge.as_directed();
        let handle = self.dcel.directed_edge(directed);
        let [a, b] = handle.positions();
        let [from, to] = handle.vertices().map(|v| v.fix());

        let epsilon_2 = self.epsilon * self.epsilon;
        let distance_a = a.distance_2(position);
        let distance_b = b.distance_2(position);
        if distance_a.min(distance_b) <= epsilon_2 {
            trace!(edge = edge.index(), "split position snapped to an edge endpoint");
            return Some(if distance_a <= distance_b { from } else { to });
        }

        if let Some(vertex) = self.nearby_vertex(edge, position) {
            if !self.dcel.undirected_edge_data(edge).is_fixed() {
                return Some(vertex);
            }
            return self.reroute_edge(edge, vertex);
        }

        // The four triangles created by the split must be oriented counter clockwise
        let handle = self.dcel.directed_edge(directed);
        let is_valid = match (handle.opposite_position(), handle.rev().opposite_position()) {
            (Some(left), Some(right)) => {
                math::side_query(a, position, left).is_on_left_side()
                    && math::side_query(position, b, left).is_on_left_side()
                    && math::side_query(b, position, right).is_on_left_side()
                    && math::side_query(position, a, right).is_on_left_side()
            }
            _ => false,
        };

        if !is_valid {
            warn!(
                edge = edge.index(),
                x = position.x,
                y = position.y,
                "split position does not lie within the edge's quad, rejecting the split"
            );
            self.diagnostics.rejected_splits += 1;
            return None;
        }

        let data = handle.data().clone();
        let new_vertex =
            dcel_operations::split_edge(&mut self.dcel, directed, CdtVertex::steiner(position));
        let second_half = self
            .dcel
            .get_edge_from_neighbors(new_vertex, to)
            .expect("Split edge half not found. This is a bug.")
            .fix()
            .as_undirected();
        *self.dcel.undirected_edge_data_mut(second_half) = data;

        trace!(
            edge = edge.index(),
            vertex = new_vertex.index(),
            "split edge"
        );
        self.legalize_vertex(new_vertex);
        Some(new_vertex)
    }

    /// Finds the real vertex closest to `position` if it lies within epsilon.
    ///
    /// `position` must lie on or next to `edge`. Every triangle reaching into the epsilon
    /// disk around `position` is searched, starting at the triangles next to `edge`. Ties are
    /// resolved in favor of the earlier vertex.
    fn nearby_vertex(
        &self,
        edge: FixedUndirectedEdgeHandle,
        position: Point2<f64>,
    ) -> Option<FixedVertexHandle> {
        let epsilon_2 = self.epsilon * self.epsilon;
        let directed = edge.as_directed();

        let mut stack: Vec<FixedFaceHandle> = [directed, directed.rev()]
            .into_iter()
            .map(|e| self.dcel.directed_edge(e).face().fix())
            .filter(|face| !face.is_outer())
            .collect();
        let mut visited: HashSet<FixedFaceHandle> = stack.iter().copied().collect();
        let mut candidates: SmallVec<[(f64, FixedVertexHandle); 4]> = SmallVec::new();

        while let Some(face) = stack.pop() {
            for face_edge in self.dcel.face(face).adjacent_edges() {
                let vertex = face_edge.from();
                let distance_2 = vertex.position().distance_2(position);
                if distance_2 <= epsilon_2 && !vertex.data().is_envelope() {
                    candidates.push((distance_2, vertex.fix()));
                }

                let neighbor = face_edge.rev().face().fix();
                let [a, b] = face_edge.positions();
                if !neighbor.is_outer()
                    && math::distance_2(a, b, position) <= epsilon_2
                    && visited.insert(neighbor)
                {
                    stack.push(neighbor);
                }
            }
        }

        candidates
            .into_iter()
            .min_by(|(d0, v0), (d1, v1)| d0.total_cmp(d1).then(v0.cmp(v1)))
            .map(|(_, vertex)| vertex)
    }

    /// Bends a fixed edge through a vertex lying within epsilon of it.
    ///
    /// The edge loses its flags. Both segments of the bend take them over together with the
    /// edge's ids.
    fn reroute_edge(
        &mut self,
        edge: FixedUndirectedEdgeHandle,
        vertex: FixedVertexHandle,
    ) -> Option<FixedVertexHandle> {
        if self.reroute_depth >= MAX_REROUTE_DEPTH {
            warn!(
                edge = edge.index(),
                vertex = vertex.index(),
                "nested bend exceeded its depth, rejecting the split"
            );
            self.diagnostics.rejected_splits += 1;
            return None;
        }

        let [from, to] = self
            .dcel
            .undirected_edge(edge)
            .vertices()
            .map(|v| v.fix());
        let tag = ConstraintTag::Inherit(std::mem::take(
            self.dcel.undirected_edge_data_mut(edge),
        ));
        trace!(
            edge = edge.index(),
            vertex = vertex.index(),
            "bending fixed edge through a nearby vertex"
        );

        self.reroute_depth += 1;
        let connected = self.connect(from, vertex, &tag) && self.connect(vertex, to, &tag);
        self.reroute_depth -= 1;

        if !connected {
            warn!(
                edge = edge.index(),
                vertex = vertex.index(),
                "bent edge could not be reconnected"
            );
            self.diagnostics.rejected_splits += 1;
            return None;
        }
        Some(vertex)
    }

    /// Inserts the straight segment `from -> to` as an edge chain marked with `tag`.
    ///
    /// Vertices lying exactly on the segment become intermediate vertices of the chain.
    /// Fixed edges crossing the segment are split at the crossing. All other crossing edges
    /// are flipped out of the way. Returns `false` if the chain could not be completed.
    pub(crate) fn connect(
        &mut self,
        from: FixedVertexHandle,
        to: FixedVertexHandle,
        tag: &ConstraintTag,
    ) -> bool {
        let mut targets: SmallVec<[FixedVertexHandle; 4]> = smallvec![to];
        let mut current = from;
        let mut split_crossings = false;
        let max_steps = self.max_walk_steps();

        for _ in 0..max_steps {
            let Some(&target) = targets.last() else {
                return true;
            };

            if current == target {
                targets.pop();
                continue;
            }

            if let Some(edge) = self.dcel.get_edge_from_neighbors(current, target) {
                let edge = edge.fix().as_undirected();
                self.tag_edge(edge, tag);
                current = target;
                targets.pop();
                continue;
            }

            let mut walk = ConstraintWalk::new(current, target, None, max_steps);
            match walk.step(self) {
                WalkStep::Arrived => {
                    targets.pop();
                }
                WalkStep::Waypoint(vertex) if vertex == target => {
                    let crossed = walk.take_crossed();
                    if split_crossings {
                        let Some(&first) = crossed.first() else {
                            return false;
                        };
                        let point = self.crossing_point(current, target, first);
                        match self.split_edge_at(first, point) {
                            Some(vertex) if vertex != current => targets.push(vertex),
                            _ => return false,
                        }
                    } else if self.resolve_crossings(current, target, crossed, tag) {
                        current = target;
                        targets.pop();
                    } else {
                        warn!(
                            from = current.index(),
                            to = target.index(),
                            "flipping crossed edges exceeded its bound, splitting them instead"
                        );
                        self.diagnostics.flip_fallbacks += 1;
                        split_crossings = true;
                    }
                }
                WalkStep::Waypoint(vertex) => targets.push(vertex),
                WalkStep::Crossing { edge, point } => {
                    let Some(vertex) = self.split_edge_at(edge, point) else {
                        return false;
                    };
                    targets.push(vertex);
                }
                WalkStep::Stuck => {
                    warn!(
                        from = current.index(),
                        to = target.index(),
                        "segment insertion got stuck"
                    );
                    self.diagnostics.walk_fallbacks += 1;
                    return false;
                }
            }
        }

        warn!(
            from = from.index(),
            to = to.index(),
            max_steps,
            "segment insertion exceeded its bound"
        );
        self.diagnostics.walk_fallbacks += 1;
        false
    }

    /// Intersection of the segment between two vertices with an edge.
    pub(crate) fn crossing_point(
        &self,
        from: FixedVertexHandle,
        to: FixedVertexHandle,
        edge: FixedUndirectedEdgeHandle,
    ) -> Point2<f64> {
        let p0 = self.dcel.vertex(from).position();
        let p1 = self.dcel.vertex(to).position();
        let [a, b] = self.dcel.undirected_edge(edge).positions();
        math::crossing_point(p0, p1, a, b)
    }

    /// Creates the edge `from -> to` by flipping the edges crossing it.
    ///
    /// `crossed` must contain all non fixed edges crossing the segment and no vertex may lie on
    /// the segment's interior. Only strictly convex quads are flipped, so every intermediate
    /// state is a valid triangulation. The new edge is tagged before the flipped edges are made
    /// Delaunay again.
    fn resolve_crossings(
        &mut self,
        from: FixedVertexHandle,
        to: FixedVertexHandle,
        crossed: Vec<FixedUndirectedEdgeHandle>,
        tag: &ConstraintTag,
    ) -> bool {
        let p_from = self.dcel.vertex(from).position();
        let p_to = self.dcel.vertex(to).position();

        let max_flips = self.options.flip_step_factor * (crossed.len() + 1).pow(2);
        let mut queue: VecDeque<_> = crossed.into_iter().collect();
        let mut new_edges = Vec::new();
        let mut num_steps = 0;

        while let Some(edge) = queue.pop_front() {
            num_steps += 1;
            if num_steps > max_flips {
                new_edges.extend(queue);
                self.restore_delaunay(new_edges);
                return false;
            }

            if !dcel_operations::is_flippable(&self.dcel, edge) {
                queue.push_back(edge);
                continue;
            }

            dcel_operations::flip_cw(&mut self.dcel, edge);
            let [p0, p1] = self.dcel.undirected_edge(edge).positions();
            let side_0 = math::side_query(p_from, p_to, p0);
            let side_1 = math::side_query(p_from, p_to, p1);
            let still_crossing = (side_0.is_on_left_side() && side_1.is_on_right_side())
                || (side_0.is_on_right_side() && side_1.is_on_left_side());

            if still_crossing {
                queue.push_back(edge);
            } else {
                new_edges.push(edge);
            }
        }

        let Some(constraint_edge) = self.dcel.get_edge_from_neighbors(from, to) else {
            self.restore_delaunay(new_edges);
            return false;
        };
        let constraint_edge = constraint_edge.fix().as_undirected();
        self.tag_edge(constraint_edge, tag);
        self.restore_delaunay(new_edges);
        true
    }

    /// Inserts the convex hull of all real vertices as hull edges.
    pub(crate) fn close_convex_hull(&mut self) {
        let real_vertices: Vec<_> = self
            .dcel
            .fixed_vertices()
            .skip(NUM_ENVELOPE_VERTICES)
            .collect();
        let positions: Vec<_> = real_vertices
            .iter()
            .map(|v| self.dcel.vertex(*v).position())
            .collect();

        let hull: Vec<_> = math::convex_hull(&positions)
            .into_iter()
            .map(|index| real_vertices[index])
            .collect();

        match hull.len() {
            0 | 1 => {}
            2 => {
                self.connect(hull[0], hull[1], &ConstraintTag::Hull);
            }
            len => {
                for i in 0..len {
                    self.connect(hull[i], hull[(i + 1) % len], &ConstraintTag::Hull);
                }
            }
        }
    }

    /// Checks the arena links, the orientation of every triangle and the constrained
    /// Delaunay property. Panics on the first violation.
    pub(crate) fn sanity_check(&self) {
        self.dcel.sanity_check();

        for face in self.dcel.fixed_inner_faces() {
            let [p0, p1, p2] = self.dcel.face(face).positions();
            assert!(math::side_query(p0, p1, p2).is_on_left_side());
        }

        for edge in self.dcel.fixed_undirected_edges() {
            let edge = self.dcel.directed_edge(edge.as_directed());
            assert_ne!(edge.from(), edge.to());
            if edge.data().is_fixed() {
                continue;
            }
            if let (Some(left), Some(right)) = (edge.opposite_position(), edge.rev().opposite_position()) {
                let [from, to] = edge.positions();
                assert!(!math::incircle(from, to, left, right));
            }
        }
    }
}

/// Computes a counter clockwise triangle enclosing all positions.
fn envelope_positions(positions: &[Point2<f64>], scale: f64) -> [Point2<f64>; 3] {
    let mut min = Point2::new(0.0, 0.0);
    let mut max = Point2::new(0.0, 0.0);
    if let Some(first) = positions.first() {
        min = *first;
        max = *first;
    }
    for position in positions {
        min = Point2::new(min.x.min(position.x), min.y.min(position.y));
        max = Point2::new(max.x.max(position.x), max.y.max(position.y));
    }

    let center = Point2::new(0.5 * (min.x + max.x), 0.5 * (min.y + max.y));
    let mut size = (max.x - min.x).max(max.y - min.y);
    if size <= 0.0 {
        size = 1.0;
    }
    let r = size * scale;

    [
        Point2::new(center.x - 2.0 * r, center.y - r),
        Point2::new(center.x + 2.0 * r, center.y - r),
        Point2::new(center.x, center.y + 2.0 * r),
    ]
}
