#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::delaunay_core::math;
use crate::{CdtError, Point2};

/// A list of lists stored as one flat array plus per list start and length tables.
///
/// This is the layout used for input faces and for every table of a [crate::CdtResult].
/// List `i` consists of `items[start_table[i]..start_table[i] + len_table[i]]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlattenedLists {
    /// The concatenated items of all lists.
    pub items: Vec<usize>,
    /// The offset of each list within `items`.
    pub start_table: Vec<usize>,
    /// The length of each list.
    pub len_table: Vec<usize>,
}

impl FlattenedLists {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a list and returns its index.
    pub fn push_list(&mut self, list: impl IntoIterator<Item = usize>) -> usize {
        let start = self.items.len();
        self.items.extend(list);
        self.start_table.push(start);
        self.len_table.push(self.items.len() - start);
        self.start_table.len() - 1
    }

    /// Returns the list with the given index.
    ///
    /// Returns `None` if the index is out of range or if its table entries point outside of
    /// `items`.
    pub fn get(&self, index: usize) -> Option<&[usize]> {
        let start = *self.start_table.get(index)?;
        let len = *self.len_table.get(index)?;
        self.items.get(start..start.checked_add(len)?)
    }

    /// Returns the number of lists.
    pub fn len(&self) -> usize {
        self.start_table.len()
    }

    /// Returns `true` if the table contains no list.
    pub fn is_empty(&self) -> bool {
        self.start_table.is_empty()
    }

    /// Iterates over all lists in order.
    ///
    /// Lists with invalid table entries are returned as empty slices.
    pub fn iter(&self) -> impl Iterator<Item = &[usize]> + '_ {
        (0..self.len()).map(|index| self.get(index).unwrap_or(&[]))
    }
}

/// The input of a single triangulation run.
///
/// Faces are given as counter clockwise vertex index loops. Their boundary edges are
/// constraints and need not be repeated in `edges`.
///
/// # Example
///
/// ```
/// use planar_cdt::CdtInput;
///
/// let mut input = CdtInput::new(1e-5);
/// let v0 = input.add_vertex([0.0, 0.0]);
/// let v1 = input.add_vertex([1.0, 0.0]);
/// let v2 = input.add_vertex([0.0, 1.0]);
/// input.add_face([v0, v1, v2]);
/// input.add_edge(v1, v2);
///
/// assert!(input.validate().is_ok());
/// assert_eq!(input.num_face_edges(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CdtInput {
    /// Vertex coordinates.
    pub vert_coords: Vec<[f64; 2]>,
    /// Constraint edges as pairs of vertex indices.
    pub edges: Vec<[usize; 2]>,
    /// Faces as flattened vertex index loops.
    pub faces: FlattenedLists,
    /// Distance below which two points are considered coincident.
    pub epsilon: f64,
}

impl CdtInput {
    /// Creates an empty input with the given tolerance.
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon,
            ..Default::default()
        }
    }

    /// Adds a vertex and returns its index.
    pub fn add_vertex(&mut self, position: impl Into<Point2<f64>>) -> usize {
        let position = position.into();
        self.vert_coords.push([position.x, position.y]);
        self.vert_coords.len() - 1
    }

    /// Adds a constraint edge and returns its index.
    pub fn add_edge(&mut self, from: usize, to: usize) -> usize {
        self.edges.push([from, to]);
        self.edges.len() - 1
    }

    /// Adds a face and returns its index.
    pub fn add_face(&mut self, vertices: impl IntoIterator<Item = usize>) -> usize {
        self.faces.push_list(vertices)
    }

    /// Returns the number of implicit face boundary edges.
    pub fn num_face_edges(&self) -> usize {
        self.faces.items.len()
    }

    pub(crate) fn positions(&self) -> Vec<Point2<f64>> {
        self.vert_coords.iter().copied().map(Point2::from).collect()
    }

    /// Checks every precondition of a triangulation run.
    ///
    /// Returns the first violation found. Vertices are checked before edges, edges before
    /// faces.
    pub fn validate(&self) -> Result<(), CdtError> {
        if self.vert_coords.is_empty() {
            return Err(CdtError::NoVertices);
        }

        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(CdtError::InvalidEpsilon(self.epsilon));
        }

        for (vertex, position) in self.vert_coords.iter().enumerate() {
            math::validate_position(Point2::from(*position))
                .map_err(|source| CdtError::InvalidCoordinate { vertex, source })?;
        }

        let num_vertices = self.vert_coords.len();
        for (edge, endpoints) in self.edges.iter().enumerate() {
            if let Some(&vertex) = endpoints.iter().find(|v| **v >= num_vertices) {
                return Err(CdtError::EdgeVertexOutOfRange { edge, vertex });
            }
        }

        let faces = &self.faces;
        if faces.start_table.len() != faces.len_table.len() {
            return Err(CdtError::FaceTableMismatch {
                starts: faces.start_table.len(),
                lens: faces.len_table.len(),
            });
        }

        for face in 0..faces.len() {
            let len = faces.len_table[face];
            let Some(vertices) = faces.get(face) else {
                return Err(CdtError::FaceOutOfBounds { face });
            };
            if len < 3 {
                return Err(CdtError::DegenerateFace { face, len });
            }
            if let Some(&vertex) = vertices.iter().find(|v| **v >= num_vertices) {
                return Err(CdtError::FaceVertexOutOfRange { face, vertex });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{CdtInput, FlattenedLists};
    use crate::{CdtError, CoordinateError};

    fn triangle_input() -> CdtInput {
        let mut input = CdtInput::new(1e-6);
        input.add_vertex([0.0, 0.0]);
        input.add_vertex([1.0, 0.0]);
        input.add_vertex([0.0, 1.0]);
        input.add_face([0, 1, 2]);
        input
    }

    #[test]
    fn test_flattened_lists() {
        let mut lists = FlattenedLists::new();
        assert!(lists.is_empty());
        assert_eq!(lists.push_list([3, 4]), 0);
        assert_eq!(lists.push_list([]), 1);
        assert_eq!(lists.push_list([5]), 2);

        assert_eq!(lists.len(), 3);
        assert_eq!(lists.get(0), Some(&[3, 4][..]));
        assert_eq!(lists.get(1), Some(&[][..]));
        assert_eq!(lists.get(2), Some(&[5][..]));
        assert_eq!(lists.get(3), None);
        assert_eq!(lists.start_table, vec![0, 2, 2]);
        assert_eq!(lists.len_table, vec![2, 0, 1]);
        assert_eq!(lists.iter().map(|l| l.len()).collect::<Vec<_>>(), vec![2, 0, 1]);
    }

    #[test]
    fn test_valid_input() {
        assert_eq!(triangle_input().validate(), Ok(()));
    }

    #[test]
    fn test_no_vertices() {
        assert_eq!(CdtInput::new(1e-6).validate(), Err(CdtError::NoVertices));
    }

    #[test]
    fn test_invalid_epsilon() {
        for epsilon in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let mut input = triangle_input();
            input.epsilon = epsilon;
            assert!(matches!(
                input.validate(),
                Err(CdtError::InvalidEpsilon(_))
            ));
        }
    }

    #[test]
    fn test_invalid_coordinate() {
        let mut input = triangle_input();
        input.add_vertex([f64::NAN, 0.0]);
        assert_eq!(
            input.validate(),
            Err(CdtError::InvalidCoordinate {
                vertex: 3,
                source: CoordinateError::NaN
            })
        );

        let mut input = triangle_input();
        input.vert_coords[1] = [0.0, f64::INFINITY];
        assert_eq!(
            input.validate(),
            Err(CdtError::InvalidCoordinate {
                vertex: 1,
                source: CoordinateError::TooLarge
            })
        );
    }

    #[test]
    fn test_index_out_of_range() {
        let mut input = triangle_input();
        input.add_edge(0, 3);
        assert_eq!(
            input.validate(),
            Err(CdtError::EdgeVertexOutOfRange { edge: 0, vertex: 3 })
        );

        let mut input = triangle_input();
        input.add_face([0, 1, 7]);
        assert_eq!(
            input.validate(),
            Err(CdtError::FaceVertexOutOfRange { face: 1, vertex: 7 })
        );
    }

    #[test]
    fn test_malformed_face_tables() {
        let mut input = triangle_input();
        input.faces.len_table.push(3);
        assert_eq!(
            input.validate(),
            Err(CdtError::FaceTableMismatch { starts: 1, lens: 2 })
        );

        let mut input = triangle_input();
        input.faces.start_table[0] = 1;
        assert_eq!(
            input.validate(),
            Err(CdtError::FaceOutOfBounds { face: 0 })
        );

        let mut input = triangle_input();
        input.add_face([0, 1]);
        assert_eq!(
            input.validate(),
            Err(CdtError::DegenerateFace { face: 1, len: 2 })
        );
    }
}
