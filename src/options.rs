#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Controls the safety bounds and the seed geometry of a triangulation run.
///
/// None of these parameters change the result for well conditioned input. They only
/// determine when a walk or flip sequence is considered runaway and replaced by a slower or
/// more conservative fallback, see [Diagnostics].
///
/// The following parameters will be used by `Self::default` and [Self::new]:
/// * `locate_step_factor`: 4
/// * `walk_step_factor`: 8
/// * `flip_step_factor`: 4
/// * `envelope_scale`: 64.0
///
/// # Example
///
/// ```
/// use planar_cdt::{compute_with_options, CdtInput, CdtOptions, OutputType};
///
/// # fn main() -> Result<(), planar_cdt::CdtError> {
/// let options = CdtOptions::new()
///     .with_walk_step_factor(16)
///     .with_envelope_scale(128.0);
///
/// let mut input = CdtInput::new(1e-6);
/// input.add_vertex([0.0, 0.0]);
/// input.add_vertex([1.0, 0.0]);
/// input.add_vertex([0.0, 1.0]);
///
/// let result = compute_with_options(&input, OutputType::Full, &options)?;
/// assert_eq!(result.faces.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, PartialEq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CdtOptions {
    pub(crate) locate_step_factor: usize,
    pub(crate) walk_step_factor: usize,
    pub(crate) flip_step_factor: usize,
    pub(crate) envelope_scale: f64,
}

impl Default for CdtOptions {
    fn default() -> Self {
        Self {
            locate_step_factor: 4,
            walk_step_factor: 8,
            flip_step_factor: 4,
            envelope_scale: 64.0,
        }
    }
}

impl CdtOptions {
    /// Creates a new set of `CdtOptions`.
    ///
    /// Refer to the [struct definition](Self) for more information.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the number of triangles a point location walk may visit, as a multiple of the
    /// current vertex count.
    ///
    /// A walk exceeding this bound is replaced by a linear scan over all triangles.
    pub fn with_locate_step_factor(mut self, factor: usize) -> Self {
        self.locate_step_factor = factor.max(1);
        self
    }

    /// Bounds the number of steps of a single constraint walk, as a multiple of the current
    /// vertex count.
    ///
    /// A constraint whose walk exceeds this bound is inserted only up to the point that was
    /// reached.
    pub fn with_walk_step_factor(mut self, factor: usize) -> Self {
        self.walk_step_factor = factor.max(1);
        self
    }

    /// Bounds the number of flips used to clear the edges crossing a new constraint segment.
    ///
    /// The bound is this factor times the squared number of crossed edges. Segments exceeding
    /// it are inserted by splitting the crossed edges instead.
    pub fn with_flip_step_factor(mut self, factor: usize) -> Self {
        self.flip_step_factor = factor.max(1);
        self
    }

    /// Specifies how far the seed triangle reaches beyond the input's bounding box, relative
    /// to the bounding box size.
    ///
    /// Values below 2.0 are raised to 2.0.
    pub fn with_envelope_scale(mut self, scale: f64) -> Self {
        self.envelope_scale = if scale.is_finite() { scale.max(2.0) } else { 2.0 };
        self
    }

    /// Returns the configured locate step factor.
    pub fn locate_step_factor(&self) -> usize {
        self.locate_step_factor
    }

    /// Returns the configured walk step factor.
    pub fn walk_step_factor(&self) -> usize {
        self.walk_step_factor
    }

    /// Returns the configured flip step factor.
    pub fn flip_step_factor(&self) -> usize {
        self.flip_step_factor
    }

    /// Returns the configured envelope scale.
    pub fn envelope_scale(&self) -> f64 {
        self.envelope_scale
    }
}

/// Counts the numerical degeneracies encountered during a run.
///
/// Each counted event was also logged as a `tracing` warning. A non zero count usually
/// indicates that the tolerance does not fit the coordinate scale of the input.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diagnostics {
    /// Point location walks that exceeded their bound and fell back to a linear scan.
    pub locate_fallbacks: usize,
    /// Constraint walks that got stuck or exceeded their bound.
    pub walk_fallbacks: usize,
    /// Constraint segments whose crossing edges were split instead of flipped.
    pub flip_fallbacks: usize,
    /// Constraints that could only be inserted partially.
    pub skipped_constraints: usize,
    /// Edge splits that were rejected because they would have inverted a triangle, or
    /// because an edge bent through a nearby vertex could not be reconnected.
    pub rejected_splits: usize,
    /// Faces whose interior could not be separated from the outside.
    pub leaking_faces: usize,
}

impl Diagnostics {
    /// Returns `true` if no degeneracy was encountered.
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod test {
    use super::{CdtOptions, Diagnostics};

    #[test]
    fn test_option_builder() {
        let options = CdtOptions::new()
            .with_locate_step_factor(0)
            .with_walk_step_factor(3)
            .with_flip_step_factor(7)
            .with_envelope_scale(1.0);

        assert_eq!(options.locate_step_factor(), 1);
        assert_eq!(options.walk_step_factor(), 3);
        assert_eq!(options.flip_step_factor(), 7);
        assert_eq!(options.envelope_scale(), 2.0);

        let options = CdtOptions::new().with_envelope_scale(f64::NAN);
        assert_eq!(options.envelope_scale(), 2.0);
    }

    #[test]
    fn test_diagnostics_clean() {
        let mut diagnostics = Diagnostics::default();
        assert!(diagnostics.is_clean());
        diagnostics.flip_fallbacks += 1;
        assert!(!diagnostics.is_clean());
    }
}
