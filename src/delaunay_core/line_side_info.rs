/// Describes on which side of a line a point lies.
///
/// Created by [side_query](super::math::side_query) for exact queries and by
/// [orient](super::math::orient) for queries that treat points closer than a
/// tolerance to the line as lying on it.
#[derive(Debug, Clone, Copy)]
pub struct LineSideInfo {
    signed_side: f64,
}

impl PartialEq for LineSideInfo {
    fn eq(&self, other: &LineSideInfo) -> bool {
        if self.is_on_line() || other.is_on_line() {
            self.is_on_line() && other.is_on_line()
        } else {
            self.is_on_right_side() == other.is_on_right_side()
        }
    }
}

impl LineSideInfo {
    #[inline]
    pub(crate) fn from_determinant(s: f64) -> LineSideInfo {
        LineSideInfo { signed_side: s }
    }

    /// Snaps determinants with an absolute value of at most `tolerance` to zero.
    #[inline]
    pub(crate) fn from_determinant_with_tolerance(s: f64, tolerance: f64) -> LineSideInfo {
        if s.abs() <= tolerance {
            LineSideInfo { signed_side: 0.0 }
        } else {
            LineSideInfo { signed_side: s }
        }
    }

    /// Returns `true` if a point lies on the left side of a line.
    ///
    /// This method returns `false` if the point lies on the line.
    pub fn is_on_left_side(&self) -> bool {
        self.signed_side > 0.0
    }

    /// Returns `true` if a point lies on the right side of a line.
    ///
    /// This method returns `false` if the point lies on the line.
    pub fn is_on_right_side(&self) -> bool {
        self.signed_side < 0.0
    }

    /// Returns `true` if a point lies on the left side of a line or is on the line itself.
    pub fn is_on_left_side_or_on_line(&self) -> bool {
        self.signed_side >= 0.0
    }

    /// Returns `true` if a point lies on the right side of a line or is on the line itself.
    pub fn is_on_right_side_or_on_line(self) -> bool {
        self.signed_side <= 0.0
    }

    /// Returns `true` if a point lies on this line.
    #[inline]
    pub fn is_on_line(self) -> bool {
        self.signed_side.abs() == 0.0
    }

    /// Returns the opposite of this `LineSideInfo`.
    pub fn reversed(self) -> LineSideInfo {
        LineSideInfo {
            signed_side: -self.signed_side,
        }
    }
}
