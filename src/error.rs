use std::collections::TryReserveError;

use thiserror::Error;

/// Describes why a single coordinate value was rejected.
///
/// Exact predicates are evaluated on `f64` values. Their expansion arithmetic only
/// stays free of overflow and underflow if all exponents lie within a fixed range,
/// see [crate::MIN_ALLOWED_VALUE] and [crate::MAX_ALLOWED_VALUE].
#[derive(Copy, Clone, PartialOrd, Ord, PartialEq, Eq, Debug, Hash, Error)]
pub enum CoordinateError {
    /// A coordinate value was too small.
    ///
    /// The absolute value of any coordinate must either be zero or greater
    /// than or equal to [crate::MIN_ALLOWED_VALUE].
    #[error("coordinate is too close to zero")]
    TooSmall,

    /// A coordinate value was too large.
    ///
    /// The absolute value of any coordinate must be less than or equal to
    /// [crate::MAX_ALLOWED_VALUE]. Infinite values are reported as too large.
    #[error("coordinate is too large")]
    TooLarge,

    /// A coordinate value was NaN.
    #[error("coordinate is NaN")]
    NaN,
}

/// The error type returned by every fallible entry point of this crate.
///
/// All variants except [CdtError::Allocation] are precondition violations. They are
/// detected before any triangulation work begins and no partial result is produced.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum CdtError {
    /// The input does not contain a single vertex.
    #[error("input contains no vertices")]
    NoVertices,

    /// The tolerance is negative, zero, NaN or infinite.
    #[error("epsilon must be a finite positive number, got {0}")]
    InvalidEpsilon(f64),

    /// An input vertex has a coordinate that cannot be processed.
    #[error("vertex {vertex} has an invalid coordinate: {source}")]
    InvalidCoordinate {
        /// Index of the offending input vertex.
        vertex: usize,
        /// The reason why the coordinate was rejected.
        source: CoordinateError,
    },

    /// An input edge references a vertex index that does not exist.
    #[error("edge {edge} references vertex {vertex} which is out of range")]
    EdgeVertexOutOfRange {
        /// Index of the offending input edge.
        edge: usize,
        /// The referenced vertex index.
        vertex: usize,
    },

    /// An input face references a vertex index that does not exist.
    #[error("face {face} references vertex {vertex} which is out of range")]
    FaceVertexOutOfRange {
        /// Index of the offending input face.
        face: usize,
        /// The referenced vertex index.
        vertex: usize,
    },

    /// The face start table and the face length table differ in length.
    #[error("face start table has {starts} entries but face length table has {lens}")]
    FaceTableMismatch {
        /// Length of the start table.
        starts: usize,
        /// Length of the length table.
        lens: usize,
    },

    /// A face's start and length point outside of the flattened face vertex array.
    #[error("face {face} exceeds the flattened face vertex array")]
    FaceOutOfBounds {
        /// Index of the offending input face.
        face: usize,
    },

    /// A face has fewer than three vertices.
    #[error("face {face} has {len} vertices, at least 3 are required")]
    DegenerateFace {
        /// Index of the offending input face.
        face: usize,
        /// The face's vertex count.
        len: usize,
    },

    /// A builder phase was invoked in the wrong state.
    #[error("builder is in state {found:?}, expected {expected:?}")]
    OutOfOrder {
        /// The state required by the invoked phase.
        expected: crate::BuilderState,
        /// The builder's actual state.
        found: crate::BuilderState,
    },

    /// The triangulation arena could not be allocated.
    #[error("failed to allocate the triangulation arena")]
    Allocation(#[from] TryReserveError),
}
