use super::handles::*;
use super::math::{self, PositionInTriangle};
use super::Dcel;
use crate::{HasPosition, Point2};

/// Describes the position of a point relative to the triangulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionInTriangulation {
    /// The point coincides exactly with a vertex.
    OnVertex(FixedVertexHandle),
    /// The point lies on the interior of an edge.
    OnEdge(FixedDirectedEdgeHandle),
    /// The point lies strictly inside a triangle.
    OnFace(FixedFaceHandle),
    /// The point lies outside of the seed envelope. The edge is an envelope edge whose
    /// right side contains the point.
    OutsideOfEnvelope(FixedDirectedEdgeHandle),
}

/// Greedily walks toward the vertex closest to `position`.
///
/// The result is a local minimum of the distance function. In a Delaunay triangulation
/// this is the global nearest neighbor, in a constrained triangulation it usually is.
pub fn walk_to_nearest_neighbor<V, UE, F>(
    dcel: &Dcel<V, UE, F>,
    start: FixedVertexHandle,
    position: Point2<f64>,
) -> FixedVertexHandle
where
    V: HasPosition,
{
    let start_position = dcel.vertex(start).position();

    if start_position == position {
        return start;
    }

    let mut current_minimal_distance = position.distance_2(start_position);
    let mut current_minimum_vertex = dcel.vertex(start);

    while let Some((next_minimum_index, next_minimal_distance)) = current_minimum_vertex
        .out_edges()
        .filter_map(|out_edge| {
            let next_candidate = out_edge.to();
            let new_distance = next_candidate.position().distance_2(position);
            if new_distance < current_minimal_distance {
                Some((next_candidate, new_distance))
            } else {
                None
            }
        })
        .next()
    {
        current_minimal_distance = next_minimal_distance;
        current_minimum_vertex = next_minimum_index;
    }

    current_minimum_vertex.fix()
}

/// "Walks" through the triangulation until it finds the target point.
///
/// Returns `None` if the walk did not terminate within `max_steps` steps. This only
/// happens if the walk cycles, see [locate_by_scan] for a fallback.
pub fn locate_with_hint<V, UE, F>(
    dcel: &Dcel<V, UE, F>,
    target_position: Point2<f64>,
    start: FixedVertexHandle,
    max_steps: usize,
) -> Option<PositionInTriangulation>
where
    V: HasPosition,
{
    let start = if start.index() < dcel.num_vertices() {
        start
    } else {
        FixedVertexHandle::new(0)
    };

    let closest_vertex = dcel.vertex(walk_to_nearest_neighbor(dcel, start, target_position));
    if closest_vertex.position() == target_position {
        return Some(PositionInTriangulation::OnVertex(closest_vertex.fix()));
    }

    let out_edge = closest_vertex
        .out_edge()
        .expect("No out edge found. This is a bug.");

    let mut query = out_edge.side_query(target_position);
    let mut edge = if query.is_on_right_side() {
        out_edge.rev()
    } else {
        out_edge
    };

    // Invariant: position is on the left side or on the line of edge.
    for _ in 0..max_steps {
        if edge.is_outer_edge() {
            if query.is_on_line() {
                edge = edge.rev();
                continue;
            }
            return Some(PositionInTriangulation::OutsideOfEnvelope(edge.fix()));
        }

        let prev = edge.prev();
        let prev_query = prev.side_query(target_position);
        if prev_query.is_on_right_side() {
            edge = prev.rev();
            query = edge.side_query(target_position);
            continue;
        }

        let next = edge.next();
        let next_query = next.side_query(target_position);

        if next_query.is_on_right_side() {
            edge = next.rev();
            query = edge.side_query(target_position);
            continue;
        }

        // Point must be in triangle or on its lines
        return Some(
            match (
                query.is_on_line(),
                next_query.is_on_line(),
                prev_query.is_on_line(),
            ) {
                // Point lies on no line and must be inside the face
                (false, false, false) => PositionInTriangulation::OnFace(edge.face().fix()),
                // Point lies on exactly one line
                (false, false, true) => PositionInTriangulation::OnEdge(prev.fix()),
                (false, true, false) => PositionInTriangulation::OnEdge(next.fix()),
                (true, false, false) => PositionInTriangulation::OnEdge(edge.fix()),
                // Point lies on exactly two lines. Since the edges cannot be collinear,
                // the point lies on the intersection
                (false, true, true) => PositionInTriangulation::OnVertex(prev.from().fix()),
                (true, false, true) => PositionInTriangulation::OnVertex(edge.from().fix()),
                (true, true, false) => PositionInTriangulation::OnVertex(next.from().fix()),
                (true, true, true) => panic!("Invalid triangle. This is a bug"),
            },
        );
    }

    None
}

/// Locates a point by testing every triangle. Runs in linear time.
pub fn locate_by_scan<V, UE, F>(
    dcel: &Dcel<V, UE, F>,
    target_position: Point2<f64>,
) -> PositionInTriangulation
where
    V: HasPosition,
{
    for face in dcel.fixed_inner_faces() {
        let face = dcel.face(face);
        let edges = face.adjacent_edges();
        match math::point_in_triangle(face.positions(), target_position) {
            PositionInTriangle::Inside => return PositionInTriangulation::OnFace(face.fix()),
            PositionInTriangle::OnEdge(index) => {
                return PositionInTriangulation::OnEdge(edges[index].fix())
            }
            PositionInTriangle::OnVertex(index) => {
                return PositionInTriangulation::OnVertex(edges[index].from().fix())
            }
            PositionInTriangle::Outside => {}
        }
    }

    let outer_edge = dcel
        .face(super::dcel_operations::OUTER_FACE_HANDLE)
        .adjacent_edge()
        .expect("Envelope without boundary. This is a bug.");
    PositionInTriangulation::OutsideOfEnvelope(outer_edge.fix())
}
