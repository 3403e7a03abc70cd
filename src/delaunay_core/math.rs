use crate::{CoordinateError, LineSideInfo, Point2};

/// Indicates a point's projected position relative to a segment.
#[derive(Debug, Clone, Copy)]
pub struct PointProjection {
    factor: f64,
    length_2: f64,
}

/// The smallest allowed coordinate value greater than zero. This value is equal to 2<sup>-142</sup>.
///
/// The *absolute value* of any input coordinate must be either zero or greater
/// than or equal to this value.
/// This is a requirement for preventing floating point underflow when calculating exact
/// geometric predicates.
// These numbers come from Shewchuk, "Adaptive Precision Floating-Point Arithmetic and
// Fast Robust Geometric Predicates": the predicates will not overflow nor underflow if
// their inputs have exponents in the range -[142, 201].
pub const MIN_ALLOWED_VALUE: f64 = 1.793662034335766e-43; // 1.0 * 2^-142

/// The largest allowed coordinate value. This value is equal to 2<sup>201</sup>.
///
/// The *absolute value* of any input coordinate must be smaller than or equal to this value.
pub const MAX_ALLOWED_VALUE: f64 = 3.2138760885179806e60; // 1.0 * 2^201

/// Checks if a coordinate value can be processed by the exact predicates.
///
/// Will return an error if and only if
///  - The absolute value of the coordinate is too small (See [MIN_ALLOWED_VALUE])
///  - The absolute value of the coordinate is too large (See [MAX_ALLOWED_VALUE])
///  - The coordinate is NaN (not a number)
///
/// Passing in any infinite value will result in `Err(CoordinateError::TooLarge)`.
pub fn validate_coordinate(value: f64) -> Result<(), CoordinateError> {
    if value.is_nan() {
        Err(CoordinateError::NaN)
    } else if value.abs() < MIN_ALLOWED_VALUE && value != 0.0 {
        Err(CoordinateError::TooSmall)
    } else if value.abs() > MAX_ALLOWED_VALUE {
        Err(CoordinateError::TooLarge)
    } else {
        Ok(())
    }
}

/// Checks both coordinates of a position, see [validate_coordinate].
pub fn validate_position(position: Point2<f64>) -> Result<(), CoordinateError> {
    validate_coordinate(position.x)?;
    validate_coordinate(position.y)?;
    Ok(())
}

impl PointProjection {
    fn new(factor: f64, length_2: f64) -> Self {
        Self { factor, length_2 }
    }

    /// Returns `true` if a point's projection is located before the segment start.
    pub fn is_before_edge(&self) -> bool {
        self.factor < 0.0
    }

    /// Returns `true` if a point's projection is located behind the segment end.
    pub fn is_behind_edge(&self) -> bool {
        self.factor > self.length_2
    }

    /// Returns `true` if a point's projection is located on the segment.
    pub fn is_on_edge(&self) -> bool {
        !self.is_before_edge() && !self.is_behind_edge()
    }

    /// Returns the projected position relative to the segment, `0.0` at its start and `1.0` at
    /// its end.
    pub fn relative_position(&self) -> f64 {
        self.factor / self.length_2
    }
}

pub fn nearest_point(p1: Point2<f64>, p2: Point2<f64>, query_point: Point2<f64>) -> Point2<f64> {
    let dir = p2.sub(p1);
    let s = project_point(p1, p2, query_point);
    if s.is_on_edge() {
        let relative_position = s.relative_position();
        p1.add(dir.mul(relative_position))
    } else if s.is_before_edge() {
        p1
    } else {
        p2
    }
}

pub fn project_point(p1: Point2<f64>, p2: Point2<f64>, query_point: Point2<f64>) -> PointProjection {
    let dir = p2.sub(p1);
    PointProjection::new(query_point.sub(p1).dot(dir), dir.length2())
}

/// Squared distance of `query_point` to the segment `p1 p2`.
pub fn distance_2(p1: Point2<f64>, p2: Point2<f64>, query_point: Point2<f64>) -> f64 {
    if p1 == p2 {
        return query_point.distance_2(p1);
    }
    let nn = nearest_point(p1, p2, query_point);
    query_point.sub(nn).length2()
}

fn to_robust_coord(point: Point2<f64>) -> robust::Coord<f64> {
    robust::Coord {
        x: point.x,
        y: point.y,
    }
}

/// Returns `true` if `p` lies strictly inside the circumcircle of the triangle `v1 v2 v3`.
///
/// The triangle must be ordered counter clockwise. Uses exact arithmetic.
pub fn incircle(v1: Point2<f64>, v2: Point2<f64>, v3: Point2<f64>, p: Point2<f64>) -> bool {
    let v1 = to_robust_coord(v1);
    let v2 = to_robust_coord(v2);
    let v3 = to_robust_coord(v3);
    let p = to_robust_coord(p);

    // incircle expects all vertices to be ordered CW for right handed systems.
    // For consistency, the public interface of this method will expect the points to be
    // ordered ccw.
    robust::incircle(v3, v2, v1, p) < 0.0
}

pub fn is_ordered_ccw(p1: Point2<f64>, p2: Point2<f64>, query_point: Point2<f64>) -> bool {
    let query = side_query(p1, p2, query_point);
    query.is_on_left_side_or_on_line()
}

/// Exact orientation of `query_point` relative to the directed line `p1 -> p2`.
pub fn side_query(p1: Point2<f64>, p2: Point2<f64>, query_point: Point2<f64>) -> LineSideInfo {
    let p1 = to_robust_coord(p1);
    let p2 = to_robust_coord(p2);
    let query_point = to_robust_coord(query_point);

    let result = robust::orient2d(p1, p2, query_point);
    LineSideInfo::from_determinant(result)
}

/// Orientation of `c` relative to the directed line `a -> b`, treating any point whose
/// distance to that line is at most `epsilon` as collinear.
///
/// The determinant equals the line's length times the signed distance of `c`, so the
/// tolerance is scaled by `|b - a|`. Nearly collinear triples therefore resolve to
/// "on line" consistently instead of depending on rounding.
pub fn orient(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>, epsilon: f64) -> LineSideInfo {
    let determinant = robust::orient2d(to_robust_coord(a), to_robust_coord(b), to_robust_coord(c));
    let length = b.sub(a).length2().sqrt();
    LineSideInfo::from_determinant_with_tolerance(determinant, epsilon * length)
}

/// Intersection point of the infinite lines through `p1 p2` and `p3 p4`.
///
/// Returns `None` for parallel lines.
pub fn line_intersection(
    p1: Point2<f64>,
    p2: Point2<f64>,
    p3: Point2<f64>,
    p4: Point2<f64>,
) -> Option<Point2<f64>> {
    let d1 = p2.sub(p1);
    let d2 = p4.sub(p3);
    let denominator = d1.cross(d2);
    if denominator == 0.0 {
        return None;
    }
    let t = p3.sub(p1).cross(d2) / denominator;
    Some(p1.add(d1.mul(t)))
}

/// Point where the line through `p1 p2` crosses the segment `a b`.
///
/// The point is interpolated along `a b` from the exact orientations of its endpoints and
/// never leaves the segment, even for nearly parallel lines.
pub fn crossing_point(
    p1: Point2<f64>,
    p2: Point2<f64>,
    a: Point2<f64>,
    b: Point2<f64>,
) -> Point2<f64> {
    let (p1, p2) = (to_robust_coord(p1), to_robust_coord(p2));
    let side_a = robust::orient2d(p1, p2, to_robust_coord(a));
    let side_b = robust::orient2d(p1, p2, to_robust_coord(b));
    let denominator = side_a - side_b;
    if denominator == 0.0 {
        return a.add(b).mul(0.5);
    }
    let t = (side_a / denominator).clamp(0.0, 1.0);
    a.add(b.sub(a).mul(t))
}

/// Relationship between two segments under a coincidence tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentIntersection {
    /// The segments are further than epsilon apart.
    None,
    /// The segment interiors cross at a single point.
    Crossing(Point2<f64>),
    /// An endpoint of one segment lies on the other segment.
    Touching(Point2<f64>),
    /// The segments are collinear and share the given sub range.
    Overlap([Point2<f64>; 2]),
}

/// Classifies the relationship of the segments `p1 p2` and `p3 p4`.
///
/// Points closer than `epsilon` are considered coincident. Zero length segments
/// (shorter than `epsilon`) are treated as points.
pub fn segments_intersect(
    p1: Point2<f64>,
    p2: Point2<f64>,
    p3: Point2<f64>,
    p4: Point2<f64>,
    epsilon: f64,
) -> SegmentIntersection {
    let epsilon_2 = epsilon * epsilon;
    if p1.distance_2(p2) <= epsilon_2 {
        return if distance_2(p3, p4, p1) <= epsilon_2 {
            SegmentIntersection::Touching(p1)
        } else {
            SegmentIntersection::None
        };
    }
    if p3.distance_2(p4) <= epsilon_2 {
        return if distance_2(p1, p2, p3) <= epsilon_2 {
            SegmentIntersection::Touching(p3)
        } else {
            SegmentIntersection::None
        };
    }

    let side_3 = orient(p1, p2, p3, epsilon);
    let side_4 = orient(p1, p2, p4, epsilon);

    if side_3.is_on_line() && side_4.is_on_line() {
        let dir = p2.sub(p1);
        let length_2 = dir.length2();
        let t3 = p3.sub(p1).dot(dir) / length_2;
        let t4 = p4.sub(p1).dot(dir) / length_2;
        let lo = t3.min(t4).max(0.0);
        let hi = t3.max(t4).min(1.0);
        let relative_epsilon = epsilon / length_2.sqrt();
        if hi < lo - relative_epsilon {
            return SegmentIntersection::None;
        }
        if hi - lo <= relative_epsilon {
            let t = (lo + hi) * 0.5;
            return SegmentIntersection::Touching(p1.add(dir.mul(t)));
        }
        return SegmentIntersection::Overlap([p1.add(dir.mul(lo)), p1.add(dir.mul(hi))]);
    }

    for (point, from, to) in [(p3, p1, p2), (p4, p1, p2), (p1, p3, p4), (p2, p3, p4)] {
        if distance_2(from, to, point) <= epsilon_2 {
            return SegmentIntersection::Touching(point);
        }
    }

    let side_1 = orient(p3, p4, p1, epsilon);
    let side_2 = orient(p3, p4, p2, epsilon);
    let separates_34 = (side_3.is_on_left_side() && side_4.is_on_right_side())
        || (side_3.is_on_right_side() && side_4.is_on_left_side());
    let separates_12 = (side_1.is_on_left_side() && side_2.is_on_right_side())
        || (side_1.is_on_right_side() && side_2.is_on_left_side());

    if separates_34 && separates_12 {
        match line_intersection(p1, p2, p3, p4) {
            Some(point) => SegmentIntersection::Crossing(point),
            None => SegmentIntersection::None,
        }
    } else {
        SegmentIntersection::None
    }
}

/// Position of a point relative to a counter clockwise triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionInTriangle {
    Inside,
    /// On the edge from vertex `i` to vertex `i + 1`.
    OnEdge(usize),
    OnVertex(usize),
    Outside,
}

/// Exact point in triangle test.
pub fn point_in_triangle(triangle: [Point2<f64>; 3], p: Point2<f64>) -> PositionInTriangle {
    let mut on_line = [false; 3];
    for i in 0..3 {
        let query = side_query(triangle[i], triangle[(i + 1) % 3], p);
        if query.is_on_right_side() {
            return PositionInTriangle::Outside;
        }
        on_line[i] = query.is_on_line();
    }

    match on_line {
        [false, false, false] => PositionInTriangle::Inside,
        [true, false, false] => PositionInTriangle::OnEdge(0),
        [false, true, false] => PositionInTriangle::OnEdge(1),
        [false, false, true] => PositionInTriangle::OnEdge(2),
        [true, true, false] => PositionInTriangle::OnVertex(1),
        [false, true, true] => PositionInTriangle::OnVertex(2),
        [true, false, true] => PositionInTriangle::OnVertex(0),
        [true, true, true] => panic!("Degenerate triangle. This is a bug."),
    }
}

/// Twice the signed area of a closed polygon. Positive for counter clockwise polygons.
pub fn double_signed_area(polygon: &[Point2<f64>]) -> f64 {
    let mut result = 0.0;
    for (i, p) in polygon.iter().enumerate() {
        let next = polygon[(i + 1) % polygon.len()];
        result += p.cross(next);
    }
    result
}

/// Even odd test of a point against a closed polygon.
pub fn point_in_polygon(polygon: &[Point2<f64>], p: Point2<f64>) -> bool {
    let mut inside = false;
    let mut j = polygon.len().wrapping_sub(1);
    for (i, pi) in polygon.iter().enumerate() {
        let pj = polygon[j];
        if (pi.y > p.y) != (pj.y > p.y) && p.x < (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Returns the indices of the convex hull of `points` in counter clockwise order.
///
/// Points lying exactly on a hull edge are not part of the result. If all points are
/// collinear, only the two extreme points are returned.
pub fn convex_hull(points: &[Point2<f64>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        let (pa, pb) = (points[a], points[b]);
        pa.x.total_cmp(&pb.x).then(pa.y.total_cmp(&pb.y))
    });
    order.dedup_by(|a, b| points[*a] == points[*b]);

    if order.len() < 3 {
        return order;
    }

    let is_left_turn = |chain: &[usize], index: usize| {
        let a = points[chain[chain.len() - 2]];
        let b = points[chain[chain.len() - 1]];
        side_query(a, b, points[index]).is_on_left_side()
    };

    let mut lower: Vec<usize> = Vec::with_capacity(order.len());
    for &index in &order {
        while lower.len() >= 2 && !is_left_turn(&lower, index) {
            lower.pop();
        }
        lower.push(index);
    }

    let mut upper: Vec<usize> = Vec::with_capacity(order.len());
    for &index in order.iter().rev() {
        while upper.len() >= 2 && !is_left_turn(&upper, index) {
            upper.pop();
        }
        upper.push(index);
    }

    // The last point of each chain is the first point of the other one
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}
