use nalgebra::Point2;

// Saturation bound for `cot100`; angles close to 0 or 180 degrees land here.
const COT100_LIMIT: i32 = 10_000;

/// Computes the distance between two points and the direction of the second
/// point as seen from the first, in degrees counter-clockwise from east.
///
/// Angles in the fourth quadrant are reported as negative values rather than
/// being wrapped into `[0, 360)`; callers that need wrapped angles apply
/// [`normalize_degrees`].
pub fn distance_and_angle(from: &Point2<f64>, to: &Point2<f64>) -> (f64, f64) {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let length = dx.hypot(dy);

    let angle = if dx == 0.0 {
        if dy >= 0.0 { 90.0 } else { 270.0 }
    } else {
        let raw = (dy / dx).abs().atan().to_degrees();
        match (dy >= 0.0, dx > 0.0) {
            (true, true) => raw,
            (true, false) => 180.0 - raw,
            (false, true) => -raw,
            (false, false) => 180.0 + raw,
        }
    };

    (length, angle)
}

#[inline]
pub fn normalize_degrees(angle: f64) -> f64 {
    angle.rem_euclid(360.0)
}

/// One hundred times the cotangent of `angle` (degrees), rounded to the
/// nearest integer. Used for stroke trims and gaps, which chemfig takes in
/// hundredths of the bond length.
pub fn cot100(angle: f64) -> i32 {
    let tangent = angle.to_radians().tan();
    if tangent.abs() < 1e-8 {
        return if tangent.is_sign_negative() {
            -COT100_LIMIT
        } else {
            COT100_LIMIT
        };
    }
    let scaled = (100.0 / tangent).round();
    (scaled as i32).clamp(-COT100_LIMIT, COT100_LIMIT)
}
