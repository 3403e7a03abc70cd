use super::dcel::EdgeEntry;
use super::dcel::FaceEntry;
use super::dcel::HalfEdgeEntry;
use super::dcel::VertexEntry;
use super::handles::*;
use super::math;
use super::Dcel;
use crate::HasPosition;

pub const OUTER_FACE_HANDLE: FixedFaceHandle = new_fixed_face_handle(0);

pub fn new<V, UE, F>() -> Dcel<V, UE, F>
where
    F: Default,
{
    let outer_face = FaceEntry {
        adjacent_edge: None,
        data: F::default(),
    };

    Dcel {
        vertices: Vec::new(),
        edges: Vec::new(),
        faces: vec![outer_face],
    }
}

/// Creates the single seed triangle of an empty arena.
///
/// The given vertices must be ordered counter clockwise. They become vertices 0, 1 and 2,
/// the triangle becomes face 1.
pub fn create_envelope<V, UE, F>(dcel: &mut Dcel<V, UE, F>, vertices: [V; 3])
where
    UE: Default,
    F: Default,
{
    assert!(dcel.vertices.is_empty());
    assert!(dcel.edges.is_empty());

    //          v2
    //         /  ^
    //     e4 /    \ e2
    //       v      \
    //      v0 ----> v1
    //          e0
    //
    // e1, e3 and e5 are the twins of e0, e2 and e4 and border the outer face f0.

    let e0 = FixedDirectedEdgeHandle::new_normalized(0);
    let e1 = e0.rev();
    let e2 = FixedDirectedEdgeHandle::new_normalized(1);
    let e3 = e2.rev();
    let e4 = FixedDirectedEdgeHandle::new_normalized(2);
    let e5 = e4.rev();

    let f0 = OUTER_FACE_HANDLE;
    let f1 = FixedFaceHandle::new(1);

    let v0 = FixedVertexHandle::new(0);
    let v1 = FixedVertexHandle::new(1);
    let v2 = FixedVertexHandle::new(2);

    dcel.edges.push(EdgeEntry::new(
        HalfEdgeEntry {
            next: e2,
            prev: e4,
            face: f1,
            origin: v0,
        },
        HalfEdgeEntry {
            next: e5,
            prev: e3,
            face: f0,
            origin: v1,
        },
    ));
    dcel.edges.push(EdgeEntry::new(
        HalfEdgeEntry {
            next: e4,
            prev: e0,
            face: f1,
            origin: v1,
        },
        HalfEdgeEntry {
            next: e1,
            prev: e5,
            face: f0,
            origin: v2,
        },
    ));
    dcel.edges.push(EdgeEntry::new(
        HalfEdgeEntry {
            next: e0,
            prev: e2,
            face: f1,
            origin: v2,
        },
        HalfEdgeEntry {
            next: e3,
            prev: e1,
            face: f0,
            origin: v0,
        },
    ));

    for (data, out_edge) in vertices.into_iter().zip([e0, e2, e4]) {
        dcel.vertices.push(VertexEntry {
            data,
            out_edge: Some(out_edge),
        });
    }

    dcel.faces[f0.index()].adjacent_edge = Some(e1);
    dcel.faces.push(FaceEntry {
        adjacent_edge: Some(e0),
        data: F::default(),
    });
}

/// Splits `edge_handle`, introducing 6 new half edges, two new faces and one
/// new vertex.
///
/// Both faces adjacent to the edge must be triangles.
pub fn split_edge<V, UE, F>(
    dcel: &mut Dcel<V, UE, F>,
    edge_handle: FixedDirectedEdgeHandle,
    new_vertex: V,
) -> FixedVertexHandle
where
    UE: Default,
    F: Default,
{
    // Original quad:
    //
    //     v1          v4
    //      +----------+
    //      |\   ep    |
    //      | \        |
    //      |  \    f0 |
    //      |   \e0    |
    //      |    \     |
    //      |tn   \  en|
    //      |      \   |
    //      |       \  |
    //      |  f1    \ |
    //      |    tp   \|
    //      +----------+
    //     v2          v3
    //
    // After splitting e0:
    //
    //      +----------+
    //      |\   ep   /|
    //      | \e0    / |
    //      |  \    /  |
    //      |   \  /e3 |
    //      |tn  \/    |
    //      |    /v0   |
    //      | e1/  \ en|
    //      |  /    \  |
    //      | /    e2\ |
    //      |/   tp   \|
    //      +----------+
    //
    // All edges are oriented counter clock wise
    // f0 .. f3 will denote the faces adjacent to e0 .. e3
    // t0 .. t3 will denote the twins of e0 .. e3

    let edge = *dcel.half_edge(edge_handle);
    let twin = *dcel.half_edge(edge_handle.rev());

    assert!(
        !edge.face.is_outer() && !twin.face.is_outer(),
        "Cannot split an edge of the outer face. This is a bug."
    );

    let f0 = edge.face;
    let f1 = twin.face;
    let f2 = FixedFaceHandle::new(dcel.faces.len());
    let f3 = FixedFaceHandle::new(dcel.faces.len() + 1);

    let e0 = edge_handle;
    let t0 = e0.rev();
    let e1 = FixedDirectedEdgeHandle::new_normalized(dcel.edges.len());
    let t1 = e1.rev();
    let e2 = FixedDirectedEdgeHandle::new_normalized(dcel.edges.len() + 1);
    let t2 = e2.rev();
    let e3 = FixedDirectedEdgeHandle::new_normalized(dcel.edges.len() + 2);
    let t3 = e3.rev();
    let ep = edge.prev;
    let en = edge.next;
    let tn = twin.next;
    let tp = twin.prev;

    let v0 = FixedVertexHandle::new(dcel.vertices.len());
    let v1 = edge.origin;
    let v2 = dcel.half_edge(tp).origin;
    let v3 = twin.origin;
    let v4 = dcel.half_edge(ep).origin;

    let edge0 = HalfEdgeEntry {
        next: t3,
        prev: ep,
        origin: v1,
        face: f0,
    };

    let twin0 = HalfEdgeEntry {
        next: tn,
        prev: e1,
        origin: v0,
        face: f1,
    };

    let edge1 = HalfEdgeEntry {
        next: t0,
        prev: tn,
        origin: v2,
        face: f1,
    };

    let twin1 = HalfEdgeEntry {
        next: tp,
        prev: e2,
        origin: v0,
        face: f2,
    };

    let edge2 = HalfEdgeEntry {
        next: t1,
        prev: tp,
        origin: v3,
        face: f2,
    };

    let twin2 = HalfEdgeEntry {
        next: en,
        prev: e3,
        origin: v0,
        face: f3,
    };

    let edge3 = HalfEdgeEntry {
        next: t2,
        prev: en,
        origin: v4,
        face: f3,
    };

    let twin3 = HalfEdgeEntry {
        next: ep,
        prev: e0,
        origin: v0,
        face: f0,
    };

    let new_vertex_entry = VertexEntry {
        out_edge: Some(t0),
        data: new_vertex,
    };

    let face2 = FaceEntry {
        adjacent_edge: Some(e2),
        data: F::default(),
    };

    let face3 = FaceEntry {
        adjacent_edge: Some(e3),
        data: F::default(),
    };

    *dcel.half_edge_mut(e0) = edge0;
    *dcel.half_edge_mut(t0) = twin0;
    dcel.edges.push(EdgeEntry::new(edge1, twin1));
    dcel.edges.push(EdgeEntry::new(edge2, twin2));
    dcel.edges.push(EdgeEntry::new(edge3, twin3));

    dcel.half_edge_mut(en).next = e3;
    dcel.half_edge_mut(en).prev = t2;
    dcel.half_edge_mut(en).face = f3;

    dcel.half_edge_mut(tp).next = e2;
    dcel.half_edge_mut(tp).prev = t1;
    dcel.half_edge_mut(tp).face = f2;

    dcel.half_edge_mut(tn).next = e1;
    dcel.half_edge_mut(ep).prev = t3;

    dcel.vertices.push(new_vertex_entry);
    dcel.vertices[v3.index()].out_edge = Some(e2);

    dcel.faces[f0.index()].adjacent_edge = Some(e0);
    dcel.faces[f1.index()].adjacent_edge = Some(e1);
    dcel.faces.push(face2);
    dcel.faces.push(face3);

    v0
}

/// Inserts a new vertex into an inner triangle, splitting it into three triangles.
pub fn insert_into_triangle<V, UE, F>(
    dcel: &mut Dcel<V, UE, F>,
    vertex: V,
    f0: FixedFaceHandle,
) -> FixedVertexHandle
where
    UE: Default,
    F: Default,
{
    // All edges are oriented counter clockwise
    //
    // Original triangle:
    //       v1
    //      / \
    //     /   \
    //    /e1   \
    //   /   f0  \
    //  /       e0\
    // v2__e2_____v0
    //
    // With v inserted (e0, e1 and e2 as above):
    //                 .
    //               / # \
    //             /   #   \
    //       f1  /  e4 # e3  \f0
    //         /     __v__     \
    //       /   e5_#     #__e8  \
    //     / ___#             #___ \
    //   /__#   e6          e7    #__\
    // /#_____________________________#\
    //                f2

    assert!(!f0.is_outer(), "Cannot insert into the outer face. This is a bug.");

    let e0 = dcel.faces[f0.index()]
        .adjacent_edge
        .expect("Inner face without adjacent edge. This is a bug.");

    let e1 = dcel.half_edge(e0).next;
    let e2 = dcel.half_edge(e1).next;
    let e3 = FixedDirectedEdgeHandle::new_normalized(dcel.edges.len());
    let e4 = e3.rev();
    let e5 = FixedDirectedEdgeHandle::new_normalized(dcel.edges.len() + 1);
    let e6 = e5.rev();
    let e7 = FixedDirectedEdgeHandle::new_normalized(dcel.edges.len() + 2);
    let e8 = e7.rev();

    let v = FixedVertexHandle::new(dcel.vertices.len());
    let v0 = dcel.half_edge(e0).origin;
    let v1 = dcel.half_edge(e1).origin;
    let v2 = dcel.half_edge(e2).origin;

    let f1 = FixedFaceHandle::new(dcel.faces.len());
    let f2 = FixedFaceHandle::new(dcel.faces.len() + 1);

    let face1 = FaceEntry {
        adjacent_edge: Some(e1),
        data: F::default(),
    };

    let face2 = FaceEntry {
        adjacent_edge: Some(e2),
        data: F::default(),
    };

    dcel.faces.push(face1);
    dcel.faces.push(face2);

    let vertex = VertexEntry {
        out_edge: Some(e4),
        data: vertex,
    };
    dcel.vertices.push(vertex);

    dcel.half_edge_mut(e0).prev = e8;
    dcel.half_edge_mut(e0).next = e3;
    dcel.half_edge_mut(e1).prev = e4;
    dcel.half_edge_mut(e1).next = e5;
    dcel.half_edge_mut(e1).face = f1;
    dcel.half_edge_mut(e2).prev = e6;
    dcel.half_edge_mut(e2).next = e7;
    dcel.half_edge_mut(e2).face = f2;

    let edge3 = HalfEdgeEntry {
        next: e8,
        prev: e0,
        origin: v1,
        face: f0,
    };

    let edge4 = HalfEdgeEntry {
        next: e1,
        prev: e5,
        origin: v,
        face: f1,
    };

    let edge5 = HalfEdgeEntry {
        next: e4,
        prev: e1,
        origin: v2,
        face: f1,
    };

    let edge6 = HalfEdgeEntry {
        next: e2,
        prev: e7,
        origin: v,
        face: f2,
    };

    let edge7 = HalfEdgeEntry {
        next: e6,
        prev: e2,
        origin: v0,
        face: f2,
    };

    let edge8 = HalfEdgeEntry {
        next: e0,
        prev: e3,
        origin: v,
        face: f0,
    };

    dcel.edges.push(EdgeEntry::new(edge3, edge4));
    dcel.edges.push(EdgeEntry::new(edge5, edge6));
    dcel.edges.push(EdgeEntry::new(edge7, edge8));

    v
}

/// Flip an edge in cw direction
///
/// The edge `v0 -> v1` with opposite vertices `x` (left) and `y` (right) becomes `x -> y`.
/// Both adjacent faces must be triangles forming a strictly convex quad.
pub fn flip_cw<V, UE, F>(dcel: &mut Dcel<V, UE, F>, e: FixedUndirectedEdgeHandle) {
    let e = e.as_directed();
    let e_entry = *dcel.half_edge(e);
    let en = e_entry.next;
    let ep = e_entry.prev;
    let e_face = e_entry.face;
    let e_origin = e_entry.origin;

    let t = e.rev();
    let t_entry = *dcel.half_edge(t);
    let tn = t_entry.next;
    let tp = t_entry.prev;
    let t_face = t_entry.face;
    let t_origin = t_entry.origin;

    debug_assert!(!e_face.is_outer() && !t_face.is_outer());

    dcel.half_edge_mut(en).next = e;
    dcel.half_edge_mut(en).prev = tp;
    dcel.half_edge_mut(e).next = tp;
    dcel.half_edge_mut(e).prev = en;
    dcel.half_edge_mut(e).origin = dcel.half_edge(ep).origin;
    dcel.half_edge_mut(tp).next = en;
    dcel.half_edge_mut(tp).prev = e;
    dcel.half_edge_mut(tp).face = e_face;

    dcel.half_edge_mut(tn).next = t;
    dcel.half_edge_mut(tn).prev = ep;
    dcel.half_edge_mut(t).next = ep;
    dcel.half_edge_mut(t).prev = tn;
    dcel.half_edge_mut(t).origin = dcel.half_edge(tp).origin;
    dcel.half_edge_mut(ep).next = tn;
    dcel.half_edge_mut(ep).prev = t;
    dcel.half_edge_mut(ep).face = t_face;

    dcel.vertices[e_origin.index()].out_edge = Some(tn);
    dcel.vertices[t_origin.index()].out_edge = Some(en);

    dcel.faces[e_face.index()].adjacent_edge = Some(e);
    dcel.faces[t_face.index()].adjacent_edge = Some(t);
}

/// Returns `true` if both faces adjacent to an edge are inner faces and form a strictly
/// convex quad. Only such edges can be flipped without inverting a triangle.
pub fn is_flippable<V, UE, F>(dcel: &Dcel<V, UE, F>, e: FixedUndirectedEdgeHandle) -> bool
where
    V: HasPosition,
{
    let edge = dcel.directed_edge(e.as_directed());
    let (Some(x), Some(y)) = (edge.opposite_position(), edge.rev().opposite_position()) else {
        return false;
    };
    let [from, to] = edge.positions();
    math::side_query(x, y, from).is_on_right_side() && math::side_query(x, y, to).is_on_left_side()
}

#[cfg(test)]
mod test {
    use super::{Dcel, FixedFaceHandle, FixedVertexHandle};

    fn default_triangle() -> Dcel<usize, (), ()> {
        let mut dcel = Dcel::default();
        super::create_envelope(&mut dcel, [0, 1, 2]);
        dcel
    }

    #[test]
    fn test_create_triangle() {
        let dcel = default_triangle();
        dcel.sanity_check();
        assert_eq!(dcel.faces.len(), 2);
        assert_eq!(dcel.vertices.len(), 3);
        assert_eq!(dcel.edges.len(), 3);

        let inner = dcel.face(FixedFaceHandle::new(1));
        let vertices = inner.vertices().map(|v| *v.data());
        assert!([[0, 1, 2], [1, 2, 0], [2, 0, 1]].contains(&vertices));
        assert!(dcel.face(FixedFaceHandle::new(0)).is_outer());
    }

    #[test]
    fn test_insert_into_triangle() {
        let mut dcel = default_triangle();
        super::insert_into_triangle(&mut dcel, 3, FixedFaceHandle::new(1));
        assert_eq!(dcel.faces.len(), 4);
        assert_eq!(dcel.num_directed_edges(), 12);
        assert_eq!(dcel.vertices.len(), 4);
        dcel.sanity_check();
    }

    #[test]
    fn test_cw_iterator() {
        let mut dcel = default_triangle();
        super::insert_into_triangle(&mut dcel, 3, FixedFaceHandle::new(1));
        let vertex = dcel.vertex(FixedVertexHandle::new(0));
        assert_eq!(vertex.out_edges().count(), 3);
        assert_eq!(vertex.out_edges().rev().count(), 3);
        let mut out_edges: Vec<_> = vertex.out_edges().collect();
        for out_edge in &out_edges {
            assert_eq!(out_edge.from(), vertex);
        }
        out_edges.reverse();
        let reversed: Vec<_> = vertex.out_edges().rev().collect();
        assert_eq!(out_edges, reversed);
    }

    #[test]
    fn test_flip() {
        let mut dcel = default_triangle();
        super::insert_into_triangle(&mut dcel, 3, FixedFaceHandle::new(1));
        let e_split = dcel
            .get_edge_from_neighbors(FixedVertexHandle::new(0), FixedVertexHandle::new(3))
            .unwrap()
            .fix();
        let v4 = super::split_edge(&mut dcel, e_split, 4);

        let e_flip = dcel
            .get_edge_from_neighbors(v4, FixedVertexHandle::new(1))
            .unwrap()
            .fix();
        super::flip_cw(&mut dcel, e_flip.as_undirected());
        dcel.sanity_check();

        assert!(dcel
            .get_edge_from_neighbors(v4, FixedVertexHandle::new(1))
            .is_none());
        let flipped = dcel.directed_edge(e_flip);
        let mut flipped_vertices = [flipped.from().fix().index(), flipped.to().fix().index()];
        flipped_vertices.sort();
        assert_eq!(flipped_vertices, [0, 3]);
        assert_eq!(dcel.num_faces(), 6);
    }

    #[test]
    fn test_split() {
        let mut dcel = default_triangle();
        super::insert_into_triangle(&mut dcel, 3, FixedFaceHandle::new(1));

        let e_split = dcel
            .get_edge_from_neighbors(FixedVertexHandle::new(0), FixedVertexHandle::new(3))
            .unwrap()
            .fix();
        dcel.sanity_check();
        let new_vertex = super::split_edge(&mut dcel, e_split, 4);
        dcel.sanity_check();

        assert_eq!(new_vertex, FixedVertexHandle::new(4));
        assert!(dcel
            .get_edge_from_neighbors(FixedVertexHandle::new(0), FixedVertexHandle::new(3))
            .is_none());
        assert!(dcel
            .get_edge_from_neighbors(FixedVertexHandle::new(0), new_vertex)
            .is_some());
        assert!(dcel
            .get_edge_from_neighbors(new_vertex, FixedVertexHandle::new(3))
            .is_some());
        assert_eq!(dcel.vertex(new_vertex).out_edges().count(), 4);
        assert_eq!(dcel.num_directed_edges(), 18);
        assert_eq!(dcel.faces.len(), 6);
        assert_eq!(dcel.vertices.len(), 5);
    }

    #[test]
    #[should_panic]
    fn test_split_outer_edge_fails() {
        let mut dcel = default_triangle();
        let edge = dcel
            .get_edge_from_neighbors(FixedVertexHandle::new(0), FixedVertexHandle::new(1))
            .unwrap()
            .fix();
        super::split_edge(&mut dcel, edge, 3);
    }

    #[test]
    fn test_is_flippable() {
        use crate::Point2;

        let mut dcel: Dcel<Point2<f64>> = Dcel::default();
        super::create_envelope(
            &mut dcel,
            [
                Point2::new(-10.0, -10.0),
                Point2::new(10.0, -10.0),
                Point2::new(0.0, 10.0),
            ],
        );
        let center =
            super::insert_into_triangle(&mut dcel, Point2::new(0.0, 0.0), FixedFaceHandle::new(1));

        let [v0, v1, _] = [0, 1, 2].map(FixedVertexHandle::new);
        let outer = dcel.get_edge_from_neighbors(v0, v1).unwrap().fix();
        assert!(!super::is_flippable(&dcel, outer.as_undirected()));
        let inner = dcel.get_edge_from_neighbors(center, v1).unwrap().fix();
        assert!(!super::is_flippable(&dcel, inner.as_undirected()));

        let face = dcel.directed_edge(inner).rev().face().fix();
        super::insert_into_triangle(&mut dcel, Point2::new(1.0, -5.0), face);
        dcel.sanity_check();
        assert!(super::is_flippable(&dcel, inner.as_undirected()));

        super::flip_cw(&mut dcel, inner.as_undirected());
        dcel.sanity_check();
        assert!(dcel.get_edge_from_neighbors(center, v1).is_none());
    }
}
