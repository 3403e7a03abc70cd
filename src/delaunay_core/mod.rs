mod dcel;
pub mod dcel_operations;
mod handles;
mod hint_generator;
mod line_side_info;
pub mod locate;

pub(crate) mod math;

pub use dcel::Dcel;
pub use hint_generator::LastUsedVertexHintGenerator;
pub use line_side_info::LineSideInfo;

pub use handles::*;

pub use locate::PositionInTriangulation;
