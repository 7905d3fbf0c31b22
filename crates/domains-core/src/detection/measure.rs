use std::f64::consts::PI;

use serde::Serialize;

use crate::frame::Calibration;

use super::outline::{shoelace, Outline};

/// Shape and size measurements of one region, in calibrated units unless
/// noted otherwise.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShapeMeasurements {
    /// Pixel count of the region.
    pub pixel_area: usize,
    pub area: f64,
    /// Centroid of the region's pixel centres.
    pub centroid_x: f64,
    pub centroid_y: f64,
    pub perimeter: f64,
    /// `4π·area/perimeter²`, capped at 1.
    pub circularity: f64,
    /// Longest caliper distance across the outline.
    pub feret: f64,
    /// Angle of the Feret diameter in degrees, in [0, 180).
    pub feret_angle: f64,
    /// Start point of the Feret diameter, in uncalibrated pixel-corner
    /// coordinates.
    pub feret_x: i32,
    pub feret_y: i32,
    /// Shortest caliper distance across the convex hull.
    pub min_feret: f64,
    /// Major / minor axis of the moment-fitted ellipse.
    pub aspect_ratio: f64,
    /// `4·area/(π·major²)` of the fitted ellipse.
    pub roundness: f64,
    /// Area over convex hull area.
    pub solidity: f64,
}

/// Measure a region given its pixels `(row, col)` and traced outline.
pub fn measure_shape(
    pixels: &[(usize, usize)],
    outline: &Outline,
    calibration: &Calibration,
) -> ShapeMeasurements {
    let pw = calibration.pixel_width;
    let ph = calibration.pixel_height;
    let pixel_area = pixels.len();
    let area = pixel_area as f64 * calibration.pixel_area();

    let perimeter = outline.traced_perimeter(pw, ph);
    let circularity = if perimeter > 0.0 {
        (4.0 * PI * area / (perimeter * perimeter)).min(1.0)
    } else {
        0.0
    };

    let hull = convex_hull(&outline.vertices);
    let feret = feret_diameter(&hull, pw, ph);
    let min_feret = min_caliper_width(&hull, pw, ph);
    let hull_area = shoelace(&hull);
    let solidity = if hull_area > 0.0 {
        pixel_area as f64 / hull_area
    } else {
        0.0
    };

    let ellipse = fit_ellipse(pixels, pw, ph, area);

    ShapeMeasurements {
        pixel_area,
        area,
        centroid_x: ellipse.centroid_x,
        centroid_y: ellipse.centroid_y,
        perimeter,
        circularity,
        feret: feret.length,
        feret_angle: feret.angle,
        feret_x: feret.start.0,
        feret_y: feret.start.1,
        min_feret,
        aspect_ratio: if ellipse.minor > 0.0 {
            ellipse.major / ellipse.minor
        } else {
            0.0
        },
        roundness: if ellipse.major > 0.0 {
            4.0 * area / (PI * ellipse.major * ellipse.major)
        } else {
            0.0
        },
        solidity,
    }
}

/// Convex hull (Andrew's monotone chain), counter-clockwise on screen,
/// without collinear points.
pub fn convex_hull(points: &[(i32, i32)]) -> Vec<(i32, i32)> {
    let mut pts = points.to_vec();
    pts.sort_unstable();
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    fn cross(o: (i32, i32), a: (i32, i32), b: (i32, i32)) -> i64 {
        (a.0 - o.0) as i64 * (b.1 - o.1) as i64 - (a.1 - o.1) as i64 * (b.0 - o.0) as i64
    }

    let mut hull: Vec<(i32, i32)> = Vec::with_capacity(pts.len() * 2);
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

struct Feret {
    length: f64,
    angle: f64,
    start: (i32, i32),
}

fn feret_diameter(hull: &[(i32, i32)], pw: f64, ph: f64) -> Feret {
    let mut best = Feret {
        length: 0.0,
        angle: 0.0,
        start: hull.first().copied().unwrap_or((0, 0)),
    };
    let mut best_pair = (best.start, best.start);

    for (i, &a) in hull.iter().enumerate() {
        for &b in &hull[i + 1..] {
            let dx = (b.0 - a.0) as f64 * pw;
            let dy = (b.1 - a.1) as f64 * ph;
            let length = (dx * dx + dy * dy).sqrt();
            if length > best.length {
                best.length = length;
                best_pair = (a, b);
            }
        }
    }

    // Image rows grow downward; angles are reported with y pointing up.
    let (mut a, mut b) = best_pair;
    let mut angle = (-((b.1 - a.1) as f64) * ph)
        .atan2((b.0 - a.0) as f64 * pw)
        .to_degrees();
    if angle < 0.0 || angle >= 180.0 {
        std::mem::swap(&mut a, &mut b);
        angle = (angle + 180.0) % 180.0;
    }
    best.angle = angle;
    best.start = a;
    best
}

fn min_caliper_width(hull: &[(i32, i32)], pw: f64, ph: f64) -> f64 {
    let n = hull.len();
    if n < 3 {
        return 0.0;
    }
    let scaled: Vec<(f64, f64)> = hull
        .iter()
        .map(|&(x, y)| (x as f64 * pw, y as f64 * ph))
        .collect();

    let mut min_width = f64::INFINITY;
    for i in 0..n {
        let (x1, y1) = scaled[i];
        let (x2, y2) = scaled[(i + 1) % n];
        let (ex, ey) = (x2 - x1, y2 - y1);
        let len = (ex * ex + ey * ey).sqrt();
        if len == 0.0 {
            continue;
        }
        let width = scaled
            .iter()
            .map(|&(px, py)| ((px - x1) * ey - (py - y1) * ex).abs() / len)
            .fold(0.0, f64::max);
        min_width = min_width.min(width);
    }
    if min_width.is_finite() {
        min_width
    } else {
        0.0
    }
}

struct Ellipse {
    centroid_x: f64,
    centroid_y: f64,
    major: f64,
    minor: f64,
}

/// Ellipse with the same second moments as the region, scaled so its
/// area equals the region area.
fn fit_ellipse(pixels: &[(usize, usize)], pw: f64, ph: f64, area: f64) -> Ellipse {
    let n = pixels.len() as f64;
    if pixels.is_empty() {
        return Ellipse {
            centroid_x: 0.0,
            centroid_y: 0.0,
            major: 0.0,
            minor: 0.0,
        };
    }

    let (mut sx, mut sy) = (0.0, 0.0);
    for &(row, col) in pixels {
        sx += (col as f64 + 0.5) * pw;
        sy += (row as f64 + 0.5) * ph;
    }
    let (cx, cy) = (sx / n, sy / n);

    // A pixel is a uniform square, not a point: add its own variance.
    let (mut u20, mut u02, mut u11) = (pw * pw / 12.0, ph * ph / 12.0, 0.0);
    for &(row, col) in pixels {
        let dx = (col as f64 + 0.5) * pw - cx;
        let dy = (row as f64 + 0.5) * ph - cy;
        u20 += dx * dx / n;
        u02 += dy * dy / n;
        u11 += dx * dy / n;
    }

    let mid = (u20 + u02) / 2.0;
    let spread = (((u20 - u02) / 2.0).powi(2) + u11 * u11).sqrt();
    let mut major = 4.0 * (mid + spread).sqrt();
    let mut minor = 4.0 * (mid - spread).max(0.0).sqrt();

    let fitted = PI * major * minor / 4.0;
    if fitted > 0.0 {
        let scale = (area / fitted).sqrt();
        major *= scale;
        minor *= scale;
    }

    Ellipse {
        centroid_x: cx,
        centroid_y: cy,
        major,
        minor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hull_of_square_corners() {
        let hull = convex_hull(&[(0, 0), (2, 0), (2, 2), (0, 2), (1, 1)]);
        assert_eq!(hull.len(), 4);
        assert_eq!(shoelace(&hull), 4.0);
    }

    #[test]
    fn test_feret_of_rectangle_is_diagonal() {
        let hull = convex_hull(&[(0, 0), (4, 0), (4, 3), (0, 3)]);
        let f = feret_diameter(&hull, 1.0, 1.0);
        assert!((f.length - 5.0).abs() < 1e-12);
        assert!(f.angle >= 0.0 && f.angle < 180.0);
    }

    #[test]
    fn test_min_caliper_of_rectangle() {
        let hull = convex_hull(&[(0, 0), (4, 0), (4, 1), (0, 1)]);
        assert!((min_caliper_width(&hull, 1.0, 1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_horizontal_feret_angle_is_zero() {
        let hull = convex_hull(&[(0, 0), (10, 0), (10, 1), (0, 1)]);
        let f = feret_diameter(&hull, 1.0, 1.0);
        // Diagonal of a 10x1 box: slightly off horizontal.
        assert!(f.angle < 10.0 || f.angle > 170.0);
    }
}
