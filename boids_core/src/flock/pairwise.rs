use glam::DVec2;

/// Dense all-pairs displacement and distance matrices of one step.
///
/// Both matrices are stored row-major in flat vectors, entry (i, j) lives at
/// `i * n + j`. Displacements are `position(i) - position(j)`, so the
/// displacement matrix is anti-symmetric and the distance matrix symmetric
/// with a zero diagonal.
#[derive(Debug, Clone)]
pub struct PairwiseState {
    n: usize,
    displacements: Vec<DVec2>,
    magnitudes: Vec<f64>,
}

impl PairwiseState {
    /// Brute force O(N^2) computation over the upper triangle, mirrored into
    /// the lower one
    pub fn compute(positions: &[DVec2]) -> Self {
        let n = positions.len();
        let mut displacements = vec![DVec2::ZERO; n * n];
        let mut magnitudes = vec![0.; n * n];

        for i in 0..n {
            for j in (i + 1)..n {
                let d = positions[i] - positions[j];
                let m = d.length();

                displacements[i * n + j] = d;
                displacements[j * n + i] = -d;
                magnitudes[i * n + j] = m;
                magnitudes[j * n + i] = m;
            }
        }

        PairwiseState {
            n,
            displacements,
            magnitudes,
        }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Vector from boid `i` to boid `j`, kept for inspection, the step only reads distances
    pub fn displacement(&self, i: usize, j: usize) -> DVec2 {
        self.displacements[i * self.n + j]
    }

    pub fn magnitude(&self, i: usize, j: usize) -> f64 {
        self.magnitudes[i * self.n + j]
    }

    /// Distances from boid `i` to every boid, itself included
    pub fn row(&self, i: usize) -> &[f64] {
        &self.magnitudes[i * self.n..(i + 1) * self.n]
    }

    /// Indices of the boids closer than `radius` to boid `i`.
    ///
    /// Boid `i` is always part of its own neighbourhood, even for a zero radius.
    pub fn neighbours(&self, i: usize, radius: f64) -> impl Iterator<Item = usize> + '_ {
        self.row(i)
            .iter()
            .enumerate()
            .filter(move |(j, m)| *j == i || **m < radius)
            .map(|(j, _)| j)
    }
}
