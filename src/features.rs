//! Geometric node features for 3D graphs.
//!
//! Two encodings of an atom's surroundings: distances to the nearest atoms
//! of a fixed set of reference elements, and the fraction of the molecule
//! within a ladder of radii.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Stand-in distance for neighbours that do not exist or lie beyond the
/// threshold.
pub const FAR_DISTANCE: f64 = 1e10;

/// Spacing between adjacent `f64` values at [`FAR_DISTANCE`] (2^-19).
/// Similarities at or below it are reported as exactly zero.
pub const SIMILARITY_FLOOR: f64 = 1.0 / 524_288.0;

/// Number of radii in a density profile.
pub const DENSITY_STEPS: usize = 20;

/// Largest radius in a density profile, in ångströms.
pub const DENSITY_MAX_RADIUS: f64 = 10.0;

/// Maps a distance to a similarity.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Similarity {
    /// `1 / (d + 1)`
    #[default]
    Inverse,
    /// `exp(-d² / 2σ²)`
    Gaussian { sigma: f64 },
    /// The distance itself.
    Identity,
    #[serde(skip)]
    Custom(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
}

impl Similarity {
    pub fn custom(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Similarity::Custom(Arc::new(f))
    }

    pub fn apply(&self, distance: f64) -> f64 {
        match self {
            Similarity::Inverse => 1.0 / (distance + 1.0),
            Similarity::Gaussian { sigma } => (-distance * distance / (2.0 * sigma * sigma)).exp(),
            Similarity::Identity => distance,
            Similarity::Custom(f) => f(distance),
        }
    }
}

impl fmt::Debug for Similarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Similarity::Inverse => f.write_str("Inverse"),
            Similarity::Gaussian { sigma } => f.debug_struct("Gaussian").field("sigma", sigma).finish(),
            Similarity::Identity => f.write_str("Identity"),
            Similarity::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Full symmetric matrix of Euclidean distances, row-major.
pub fn distance_matrix(coords: &[[f64; 3]]) -> Vec<Vec<f64>> {
    let n = coords.len();
    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = coords[i]
                .iter()
                .zip(&coords[j])
                .map(|(a, b)| (a - b) * (a - b))
                .sum::<f64>()
                .sqrt();
            matrix[i][j] = d;
            matrix[j][i] = d;
        }
    }
    matrix
}

/// Indices of `row` ordered by distance. Ties keep index order.
fn argsort(row: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..row.len()).collect();
    order.sort_by(|&a, &b| row[a].total_cmp(&row[b]));
    order
}

/// Nearest-neighbour feature vector for the atom whose distance row is
/// `row`.
///
/// For each atomic number in `reference_elements` (in order) the `k`
/// closest atoms of that element are taken, the atom itself included when
/// it matches, and missing slots are padded with [`FAR_DISTANCE`]. With a
/// positive `threshold`, distances beyond it also become [`FAR_DISTANCE`].
/// Every distance then goes through `similarity`; results not above
/// [`SIMILARITY_FLOOR`] are zeroed. The output always has
/// `reference_elements.len() * k` entries.
pub fn nearest_neighbor_features(
    row: &[f64],
    atomic_nums: &[u8],
    reference_elements: &[u8],
    k: usize,
    threshold: f64,
    similarity: &Similarity,
) -> Vec<f64> {
    let order = argsort(row);
    let mut features = Vec::with_capacity(reference_elements.len() * k);

    for &element in reference_elements {
        let mut nearest: Vec<f64> = order
            .iter()
            .filter(|&&j| atomic_nums.get(j) == Some(&element))
            .take(k)
            .map(|&j| row[j])
            .collect();
        nearest.resize(k, FAR_DISTANCE);
        features.extend(nearest);
    }

    features
        .into_iter()
        .map(|d| {
            if threshold > 0.0 && d > threshold {
                FAR_DISTANCE
            } else {
                d
            }
        })
        .map(|d| {
            let s = similarity.apply(d);
            if s > SIMILARITY_FLOOR {
                s
            } else {
                0.0
            }
        })
        .collect()
}

/// Radii `0, 10/19, ..., 10`.
pub fn density_thresholds() -> [f64; DENSITY_STEPS] {
    let step = DENSITY_MAX_RADIUS / (DENSITY_STEPS - 1) as f64;
    std::array::from_fn(|i| i as f64 * step)
}

/// Fraction of all `row.len()` atoms, the atom itself included, within each
/// of the [`density_thresholds`].
pub fn local_density(row: &[f64]) -> Vec<f64> {
    let n = row.len();
    if n == 0 {
        return vec![0.0; DENSITY_STEPS];
    }
    density_thresholds()
        .iter()
        .map(|&t| row.iter().filter(|&&d| d <= t).count() as f64 / n as f64)
        .collect()
}
