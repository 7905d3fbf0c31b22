use ndarray::Array2;

/// Statistics for a single connected component.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentStats {
    /// Label of this component in [`Labeling::labels`], starting at 1.
    pub label: u32,
    /// Number of pixels in the component.
    pub area: usize,
    /// Bounding box: (min_row, max_row, min_col, max_col).
    pub bbox: (usize, usize, usize, usize),
    /// First pixel of the component in row-major scan order: (row, col).
    pub start: (usize, usize),
}

/// Result of connected component labeling.
#[derive(Clone, Debug)]
pub struct Labeling {
    /// Per-pixel label; 0 is background.
    pub labels: Array2<u32>,
    /// Components ordered by their first pixel in scan order, so that
    /// `components[i].label == i + 1`.
    pub components: Vec<ComponentStats>,
}

/// Perform connected component analysis on a binary mask using two-pass
/// labeling with union-find. Uses 8-connectivity (upper-left, upper,
/// upper-right and left neighbors in the first pass).
///
/// Labels are reassigned in the second pass so that the output order
/// depends only on the mask contents.
pub fn connected_components(mask: &Array2<bool>) -> Labeling {
    let (h, w) = mask.dim();
    let mut labels = Array2::<u32>::zeros((h, w));
    if h == 0 || w == 0 {
        return Labeling {
            labels,
            components: Vec::new(),
        };
    }

    // Union-find parent array. Index 0 unused; labels start at 1.
    let mut parent: Vec<u32> = vec![0];

    // Pass 1: assign provisional labels.
    for row in 0..h {
        for col in 0..w {
            if !mask[[row, col]] {
                continue;
            }

            let mut neighbors = [0u32; 4];
            if row > 0 {
                if col > 0 {
                    neighbors[0] = labels[[row - 1, col - 1]];
                }
                neighbors[1] = labels[[row - 1, col]];
                if col + 1 < w {
                    neighbors[2] = labels[[row - 1, col + 1]];
                }
            }
            if col > 0 {
                neighbors[3] = labels[[row, col - 1]];
            }

            let smallest = neighbors.iter().copied().filter(|&l| l > 0).min();
            match smallest {
                None => {
                    let next_label = parent.len() as u32;
                    parent.push(next_label);
                    labels[[row, col]] = next_label;
                }
                Some(smallest) => {
                    labels[[row, col]] = smallest;
                    for &other in neighbors.iter().filter(|&&l| l > 0 && l != smallest) {
                        union(&mut parent, smallest, other);
                    }
                }
            }
        }
    }

    // Flatten parent references.
    for i in 1..parent.len() {
        parent[i] = find(&parent, i as u32);
    }

    // Pass 2: resolve labels in scan order and collect stats.
    let mut final_label = vec![0u32; parent.len()];
    let mut components: Vec<ComponentStats> = Vec::new();

    for row in 0..h {
        for col in 0..w {
            let provisional = labels[[row, col]];
            if provisional == 0 {
                continue;
            }
            let root = parent[provisional as usize] as usize;
            if final_label[root] == 0 {
                components.push(ComponentStats {
                    label: components.len() as u32 + 1,
                    area: 0,
                    bbox: (row, row, col, col),
                    start: (row, col),
                });
                final_label[root] = components.len() as u32;
            }
            let label = final_label[root];
            labels[[row, col]] = label;

            let entry = &mut components[label as usize - 1];
            entry.area += 1;
            entry.bbox.0 = entry.bbox.0.min(row);
            entry.bbox.1 = entry.bbox.1.max(row);
            entry.bbox.2 = entry.bbox.2.min(col);
            entry.bbox.3 = entry.bbox.3.max(col);
        }
    }

    Labeling { labels, components }
}

fn find(parent: &[u32], mut x: u32) -> u32 {
    while parent[x as usize] != x {
        x = parent[x as usize];
    }
    x
}

fn union(parent: &mut [u32], a: u32, b: u32) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        // Merge larger root into smaller root to keep labels consistent.
        let (small, big) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[big as usize] = small;
    }
}
