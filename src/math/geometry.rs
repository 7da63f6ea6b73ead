/// Squared Euclidean distance between two points.
#[inline]
pub fn distance_squared(a: [f64; 3], b: [f64; 3]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    distance_squared(a, b).sqrt()
}

/// Unweighted midpoint of `a` and `b`.
#[inline]
pub fn midpoint(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        0.5 * (a[0] + b[0]),
        0.5 * (a[1] + b[1]),
        0.5 * (a[2] + b[2]),
    ]
}

/// Weighted mean `(wa·a + wb·b) / (wa + wb)`; falls back to the midpoint when both
/// weights vanish.
#[inline]
pub fn weighted_midpoint(a: [f64; 3], wa: f64, b: [f64; 3], wb: f64) -> [f64; 3] {
    let total = wa + wb;
    if total.abs() < f64::EPSILON {
        return midpoint(a, b);
    }
    [
        (wa * a[0] + wb * b[0]) / total,
        (wa * a[1] + wb * b[1]) / total,
        (wa * a[2] + wb * b[2]) / total,
    ]
}
