use ndarray::Array2;

/// Closed outer boundary of a connected region, traced along pixel edges.
///
/// Vertices are pixel-corner coordinates `(x, y)` (pixel `(row, col)`
/// spans `[col, col+1] x [row, row+1]`), listed clockwise on screen and
/// only where the boundary changes direction, so consecutive vertices
/// always differ along exactly one axis.
#[derive(Clone, Debug, PartialEq)]
pub struct Outline {
    pub vertices: Vec<(i32, i32)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Heading {
    East,
    South,
    West,
    North,
}

impl Heading {
    fn left(self) -> Self {
        match self {
            Self::East => Self::North,
            Self::South => Self::East,
            Self::West => Self::South,
            Self::North => Self::West,
        }
    }

    fn right(self) -> Self {
        match self {
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
            Self::North => Self::East,
        }
    }

    fn step(self, x: i32, y: i32) -> (i32, i32) {
        match self {
            Self::East => (x + 1, y),
            Self::South => (x, y + 1),
            Self::West => (x - 1, y),
            Self::North => (x, y - 1),
        }
    }

    /// Pixels (col, row) directly ahead-left and ahead-right of vertex (x, y).
    fn ahead(self, x: i32, y: i32) -> ((i32, i32), (i32, i32)) {
        match self {
            Self::East => ((x, y - 1), (x, y)),
            Self::South => ((x, y), (x - 1, y)),
            Self::West => ((x - 1, y), (x - 1, y - 1)),
            Self::North => ((x - 1, y - 1), (x, y - 1)),
        }
    }
}

impl Outline {
    /// Trace the outer boundary of the region carrying `label`, starting
    /// from its first pixel in scan order `(row, col)`.
    ///
    /// The region stays on the right of the walk. Diagonal neighbours are
    /// followed, matching 8-connected labeling.
    pub fn trace(labels: &Array2<u32>, label: u32, start: (usize, usize)) -> Self {
        let (h, w) = labels.dim();
        let inside = |(col, row): (i32, i32)| {
            row >= 0
                && col >= 0
                && (row as usize) < h
                && (col as usize) < w
                && labels[[row as usize, col as usize]] == label
        };

        let origin = (start.1 as i32, start.0 as i32);
        let (mut x, mut y) = origin;
        // Arrive at the top-left corner of the start pixel moving up its left edge.
        let mut heading = Heading::North;
        let mut vertices = Vec::new();

        loop {
            let (ahead_left, ahead_right) = heading.ahead(x, y);
            let next = if inside(ahead_left) {
                heading.left()
            } else if inside(ahead_right) {
                heading
            } else {
                heading.right()
            };

            if !vertices.is_empty() && (x, y) == origin && next == Heading::East {
                break;
            }
            if next != heading {
                vertices.push((x, y));
            }
            heading = next;
            (x, y) = heading.step(x, y);
        }

        Self { vertices }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Enclosed area in pixels (shoelace formula). Includes holes.
    pub fn polygon_area(&self) -> f64 {
        shoelace(&self.vertices)
    }

    /// Bounding rectangle of the polygon: (min_x, min_y, max_x, max_y).
    pub fn bounds(&self) -> (i32, i32, i32, i32) {
        let mut b = (i32::MAX, i32::MAX, i32::MIN, i32::MIN);
        for &(x, y) in &self.vertices {
            b.0 = b.0.min(x);
            b.1 = b.1.min(y);
            b.2 = b.2.max(x);
            b.3 = b.3.max(y);
        }
        b
    }

    /// Pixels `(row, col)` whose centres lie inside the polygon, in scan
    /// order. Pixels in holes of the region are included.
    pub fn interior_pixels(&self) -> Vec<(usize, usize)> {
        if self.vertices.len() < 4 {
            return Vec::new();
        }
        let (_, min_y, _, max_y) = self.bounds();
        let n = self.vertices.len();
        let mut pixels = Vec::new();
        let mut crossings = Vec::new();

        for row in min_y.max(0)..max_y {
            crossings.clear();
            for i in 0..n {
                let (x1, y1) = self.vertices[i];
                let (x2, y2) = self.vertices[(i + 1) % n];
                if x1 == x2 && y1.min(y2) <= row && row < y1.max(y2) {
                    crossings.push(x1);
                }
            }
            crossings.sort_unstable();
            for pair in crossings.chunks_exact(2) {
                for col in pair[0].max(0)..pair[1] {
                    pixels.push((row as usize, col as usize));
                }
            }
        }
        pixels
    }

    /// Perimeter of the traced polygon with every corner cut by half a
    /// pixel along both edges, so that staircase edges approximate the
    /// diagonal they follow.
    pub fn traced_perimeter(&self, pixel_width: f64, pixel_height: f64) -> f64 {
        let v = &self.vertices;
        let n = v.len();
        if n == 0 {
            return 0.0;
        }

        let mut sum_dx = 0i64;
        let mut sum_dy = 0i64;
        for i in 0..n {
            let (x1, y1) = v[i];
            let (x2, y2) = v[(i + 1) % n];
            sum_dx += (x2 - x1).abs() as i64;
            sum_dy += (y2 - y1).abs() as i64;
        }

        let chamfer = 0.5 * (pixel_width + pixel_height)
            - 0.5 * (pixel_width * pixel_width + pixel_height * pixel_height).sqrt();
        sum_dx as f64 * pixel_width + sum_dy as f64 * pixel_height - n as f64 * chamfer
    }
}

pub(crate) fn shoelace(points: &[(i32, i32)]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice = 0i64;
    for i in 0..n {
        let (x1, y1) = points[i];
        let (x2, y2) = points[(i + 1) % n];
        twice += x1 as i64 * y2 as i64 - x2 as i64 * y1 as i64;
    }
    (twice as f64 / 2.0).abs()
}
