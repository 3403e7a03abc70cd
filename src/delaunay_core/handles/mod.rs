mod circular_iterator;
mod handle_defs;
mod handle_impls;

pub(super) use handle_defs::new_fixed_face_handle;
pub use handle_defs::{
    DirectedEdgeHandle, DynamicHandleImpl, FaceHandle, FixedDirectedEdgeHandle, FixedFaceHandle,
    FixedHandleImpl, FixedUndirectedEdgeHandle, FixedVertexHandle, UndirectedEdgeHandle,
    VertexHandle,
};
