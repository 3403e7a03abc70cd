use smallvec::SmallVec;
use tracing::{trace, warn};

use crate::delaunay_core::math::{self, SegmentIntersection};
use crate::delaunay_core::{FixedUndirectedEdgeHandle, FixedVertexHandle};
use crate::triangulation::{ConstraintTag, Triangulation};
use crate::Point2;

/// The result of walking along a segment until something noteworthy happens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum WalkStep {
    /// The walk already stands on its target.
    Arrived,
    /// The segment reaches a vertex, either the target or a vertex lying on the segment.
    ///
    /// All non fixed edges crossed on the way are available through
    /// [ConstraintWalk::take_crossed].
    Waypoint(FixedVertexHandle),
    /// The segment crosses a fixed edge at the given point.
    Crossing {
        edge: FixedUndirectedEdgeHandle,
        point: Point2<f64>,
    },
    /// The walk could not make progress.
    Stuck,
}

/// Walks through the triangles cut by the segment between two vertices.
///
/// Without a tolerance, only vertices lying exactly on the segment stop the walk. With a
/// tolerance, vertices closer than the tolerance to the segment stop it as well.
#[derive(Debug, Clone)]
pub(crate) struct ConstraintWalk {
    current: FixedVertexHandle,
    target: FixedVertexHandle,
    tolerance: Option<f64>,
    crossed: Vec<FixedUndirectedEdgeHandle>,
    max_steps: usize,
}

impl ConstraintWalk {
    pub(crate) fn new(
        current: FixedVertexHandle,
        target: FixedVertexHandle,
        tolerance: Option<f64>,
        max_steps: usize,
    ) -> Self {
        Self {
            current,
            target,
            tolerance,
            crossed: Vec::new(),
            max_steps,
        }
    }

    /// Returns the edges crossed by the last call to [Self::step].
    pub(crate) fn take_crossed(&mut self) -> Vec<FixedUndirectedEdgeHandle> {
        std::mem::take(&mut self.crossed)
    }

    /// Returns `t` if `vertex` lies on the segment at relative position `0 < t <= 1`.
    fn waypoint_position(&self, triangulation: &Triangulation, vertex: FixedVertexHandle) -> Option<f64> {
        if vertex == self.current || triangulation.is_envelope_vertex(vertex) {
            return None;
        }
        let dcel = triangulation.dcel();
        let from = dcel.vertex(self.current).position();
        let to = dcel.vertex(self.target).position();
        let position = dcel.vertex(vertex).position();

        let on_line = math::side_query(from, to, position).is_on_line()
            || self
                .tolerance
                .map(|epsilon| math::orient(from, to, position, epsilon).is_on_line())
                .unwrap_or(false);
        if !on_line {
            return None;
        }

        let t = math::project_point(from, to, position).relative_position();
        (t > 0.0 && t <= 1.0).then_some(t)
    }

    /// Walks from the current vertex toward the target.
    pub(crate) fn step(&mut self, triangulation: &Triangulation) -> WalkStep {
        self.crossed.clear();
        if self.current == self.target {
            return WalkStep::Arrived;
        }

        let dcel = triangulation.dcel();
        let from = dcel.vertex(self.current).position();
        let to = dcel.vertex(self.target).position();

        // A neighbor on the segment is reached without crossing anything
        let mut on_segment: SmallVec<[(f64, FixedVertexHandle); 2]> = SmallVec::new();
        for out_edge in dcel.vertex(self.current).out_edges() {
            let neighbor = out_edge.to().fix();
            if neighbor == self.target {
                return WalkStep::Waypoint(neighbor);
            }
            if let Some(t) = self.waypoint_position(triangulation, neighbor) {
                on_segment.push((t, neighbor));
            }
        }
        if let Some((_, nearest)) = on_segment
            .into_iter()
            .min_by(|(t0, v0), (t1, v1)| t0.total_cmp(t1).then(v0.cmp(v1)))
        {
            return WalkStep::Waypoint(nearest);
        }

        // Find the triangle around the current vertex that contains the segment's start
        let wedge = dcel.vertex(self.current).out_edges().find(|out_edge| {
            !out_edge.is_outer_edge()
                && math::side_query(from, to, out_edge.to().position()).is_on_right_side()
                && math::side_query(from, to, out_edge.next().to().position()).is_on_left_side()
        });
        let Some(wedge) = wedge else {
            trace!(vertex = self.current.index(), "no triangle contains the segment start");
            return WalkStep::Stuck;
        };

        // Invariant: `edge` is crossed by the segment, its origin lies to the right and its
        // destination lies to the left of the segment.
        let mut edge = wedge.next();
        for _ in 0..self.max_steps {
            if edge.data().is_fixed() {
                let [a, b] = edge.positions();
                let epsilon = self.tolerance.unwrap_or(0.0);
                let point = match math::segments_intersect(from, to, a, b, epsilon) {
                    SegmentIntersection::Touching(point) => point,
                    SegmentIntersection::Overlap([start, _]) => start,
                    SegmentIntersection::Crossing(_) | SegmentIntersection::None => {
                        math::crossing_point(from, to, a, b)
                    }
                };
                return WalkStep::Crossing {
                    edge: edge.fix().as_undirected(),
                    point,
                };
            }

            self.crossed.push(edge.fix().as_undirected());
            let rev = edge.rev();
            if rev.is_outer_edge() {
                return WalkStep::Stuck;
            }

            let opposite = rev.next().to();
            let opposite_handle = opposite.fix();
            if opposite_handle == self.target
                || self.waypoint_position(triangulation, opposite_handle).is_some()
            {
                return WalkStep::Waypoint(opposite_handle);
            }

            let side = math::side_query(from, to, opposite.position());
            edge = if side.is_on_left_side() {
                rev.next()
            } else if side.is_on_right_side() {
                rev.prev()
            } else {
                return WalkStep::Stuck;
            };
        }

        WalkStep::Stuck
    }
}

/// Inserts the constraint segment between two input vertices.
///
/// Vertices closer than epsilon to the segment are threaded onto the constraint. Fixed edges
/// crossing the segment are split at the crossing, so intersecting constraints share the new
/// vertex. Returns `false` if the constraint could only be inserted partially.
pub(crate) fn insert_constraint(
    triangulation: &mut Triangulation,
    from: FixedVertexHandle,
    to: FixedVertexHandle,
    tag: ConstraintTag,
) -> bool {
    let epsilon = triangulation.epsilon();
    let max_steps = triangulation.max_walk_steps();
    let mut current = from;

    for _ in 0..max_steps {
        let mut walk = ConstraintWalk::new(current, to, Some(epsilon), max_steps);
        let next = match walk.step(triangulation) {
            WalkStep::Arrived => return true,
            WalkStep::Waypoint(vertex) => vertex,
            WalkStep::Crossing { edge, point } => match triangulation.split_edge_at(edge, point) {
                Some(vertex) => vertex,
                None => break,
            },
            WalkStep::Stuck => break,
        };

        // A crossing edge bent through the current vertex no longer blocks the walk
        if next == current {
            continue;
        }
        if !triangulation.connect(current, next, &tag) {
            break;
        }
        current = next;
    }

    warn!(
        from = from.index(),
        to = to.index(),
        reached = current.index(),
        "constraint could only be inserted partially"
    );
    let diagnostics = triangulation.diagnostics_mut();
    diagnostics.walk_fallbacks += 1;
    diagnostics.skipped_constraints += 1;
    false
}
