use std::convert::TryInto;

use super::super::Dcel;

/// Index based handle into one of the arena's element tables.
///
/// The `Type` parameter is one of the tag structs below and only serves to keep
/// vertex, edge and face indices apart at compile time.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FixedHandleImpl<Type> {
    index: u32,
    ty: Type,
}

impl<Type> std::fmt::Debug for FixedHandleImpl<Type> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedHandle")
            .field("index", &self.index)
            .finish()
    }
}

pub const fn new_fixed_face_handle(index: usize) -> FixedHandleImpl<FaceTag> {
    FixedHandleImpl {
        index: index as u32,
        ty: FaceTag,
    }
}

impl<Type: Default> FixedHandleImpl<Type> {
    pub(crate) fn new(index: usize) -> Self {
        Self::new_internal(
            index
                .try_into()
                .expect("Index too big - at most 2^32 elements supported"),
        )
    }

    pub(crate) fn index(&self) -> usize {
        self.index as usize
    }

    fn new_internal(index: u32) -> Self {
        Self {
            index,
            ty: Type::default(),
        }
    }
}

/// Handle bundled with a reference to its arena.
///
/// Dynamic handles are used to navigate the topology; they are converted back into fixed
/// handles with `fix()` before the arena is mutated.
pub struct DynamicHandleImpl<'a, V, UE, F, Type> {
    pub(super) dcel: &'a Dcel<V, UE, F>,
    pub(super) handle: FixedHandleImpl<Type>,
}

impl<'a, V, UE, F, Type: Default> DynamicHandleImpl<'a, V, UE, F, Type> {
    #[inline]
    pub(crate) fn new(dcel: &'a Dcel<V, UE, F>, handle: FixedHandleImpl<Type>) -> Self {
        Self { dcel, handle }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct VertexTag;
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct DirectedEdgeTag;
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct UndirectedEdgeTag;
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct FaceTag;

pub type FixedVertexHandle = FixedHandleImpl<VertexTag>;
pub type FixedDirectedEdgeHandle = FixedHandleImpl<DirectedEdgeTag>;
pub type FixedUndirectedEdgeHandle = FixedHandleImpl<UndirectedEdgeTag>;
pub type FixedFaceHandle = FixedHandleImpl<FaceTag>;

pub type VertexHandle<'a, V, UE, F> = DynamicHandleImpl<'a, V, UE, F, VertexTag>;
pub type DirectedEdgeHandle<'a, V, UE, F> = DynamicHandleImpl<'a, V, UE, F, DirectedEdgeTag>;
pub type UndirectedEdgeHandle<'a, V, UE, F> = DynamicHandleImpl<'a, V, UE, F, UndirectedEdgeTag>;
pub type FaceHandle<'a, V, UE, F> = DynamicHandleImpl<'a, V, UE, F, FaceTag>;
