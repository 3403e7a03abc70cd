//! # Planar CDT
//!
//! Constrained Delaunay triangulation of planar points, edges and faces.
//!
//! Planar CDT consumes a set of 2D points, constraint edges and polygonal faces, resolves all
//! intersections and near coincidences among them and returns a triangulation containing
//! every constraint. Each output vertex, edge and face records which input elements it was
//! derived from.
//!
//! # Features
//!  * Intersections between constraints become shared vertices
//!  * Points closer than a caller supplied epsilon are merged
//!  * Four output views: full triangulation, interior triangles, constraint polygons and
//!    constraint polygons without repeated vertices or holes, see [OutputType]
//!  * Uses exact predicates for all topological decisions
//!  * Numerical degeneracies degrade to a best effort result and are reported in
//!    [Diagnostics] instead of looping or panicking
//!  * Independent inputs can be triangulated in parallel, see [compute_batch]
//!  * Supports `serde` with the `serde` feature
//!
//! # Example
//!
//! ```
//! use planar_cdt::{compute, CdtInput, OutputType};
//!
//! # fn main() -> Result<(), planar_cdt::CdtError> {
//! let mut input = CdtInput::new(1e-5);
//! let v0 = input.add_vertex([0.0, 0.0]);
//! let v1 = input.add_vertex([1.0, 0.0]);
//! let v2 = input.add_vertex([1.0, 1.0]);
//! let v3 = input.add_vertex([0.0, 1.0]);
//! input.add_face([v0, v1, v2, v3]);
//!
//! let result = compute(&input, OutputType::Constraints)?;
//! assert_eq!(result.faces.len(), 1);
//! assert_eq!(result.edges.len(), 4);
//! assert_eq!(result.vert_orig(2), Some(&[v2][..]));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(missing_docs)]

mod batch;
mod cdt;
mod constraint_walk;
mod delaunay_core;
mod error;
mod input;
mod options;
mod output;
mod point;
mod triangulation;

#[cfg(test)]
mod test_utilities;

pub use crate::batch::{
    calc_chunk_size, compute_batch, compute_batch_with_options, ParallelSettings, SchedulingMode,
};
pub use crate::cdt::{compute, compute_with_options, BuilderState, CdtBuilder, FinishedCdt};
pub use crate::delaunay_core::math::{
    validate_coordinate, validate_position, MAX_ALLOWED_VALUE, MIN_ALLOWED_VALUE,
};
pub use crate::delaunay_core::LineSideInfo;
pub use crate::error::{CdtError, CoordinateError};
pub use crate::input::{CdtInput, FlattenedLists};
pub use crate::options::{CdtOptions, Diagnostics};
pub use crate::output::{CdtResult, OutputType};
pub use crate::point::{CdtNum, HasPosition, Point2};
