//! Module for parsing and representing TSP instances.
//!
//! An instance is a validated, immutable distance matrix. It can be built
//! directly from nested rows or read from a TSP-LIB style file, either with
//! 2D coordinates (`NODE_COORD_SECTION`, Euclidean distances) or with an
//! explicit `FULL_MATRIX` in `EDGE_WEIGHT_SECTION`.

use crate::error::{ColonyError, Result};
use crate::matrix::Matrix;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Distance matrix of the small 5-city example whose optimal tour has length 85
pub const SAMPLE_DISTANCES: [[f64; 5]; 5] = [
    [0.0, 10.0, 20.0, 30.0, 40.0],
    [10.0, 0.0, 15.0, 25.0, 35.0],
    [20.0, 15.0, 0.0, 14.0, 29.0],
    [30.0, 25.0, 14.0, 0.0, 11.0],
    [40.0, 35.0, 29.0, 11.0, 0.0],
];

/// Represents a complete symmetric TSP instance.
///
/// The distance matrix is private and only built through validating
/// constructors; deserialization goes through the same checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawInstance", into = "RawInstance")]
pub struct TspInstance {
    /// Name of the instance
    pub name: String,
    /// Comment/description
    pub comment: String,
    /// Precomputed distance matrix
    distances: Matrix,
}

/// Serialized form of an instance: nested distance rows
#[derive(Serialize, Deserialize)]
struct RawInstance {
    #[serde(default)]
    name: String,
    #[serde(default)]
    comment: String,
    distances: Vec<Vec<f64>>,
}

impl TryFrom<RawInstance> for TspInstance {
    type Error = ColonyError;

    fn try_from(raw: RawInstance) -> Result<Self> {
        let n = raw.distances.len();
        Self::from_named_rows(raw.name, raw.comment, n, raw.distances)
    }
}

impl From<TspInstance> for RawInstance {
    fn from(instance: TspInstance) -> Self {
        RawInstance {
            distances: instance.distances.rows().map(|row| row.to_vec()).collect(),
            name: instance.name,
            comment: instance.comment,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Section {
    Header,
    Coords,
    EdgeWeights,
}

impl TspInstance {
    /// Build an instance from a `num_cities x num_cities` distance matrix.
    ///
    /// Rejects matrices that are not square, do not match `num_cities`,
    /// contain negative or non-finite entries, or have a zero distance
    /// between two distinct cities.
    pub fn from_matrix(num_cities: usize, rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::from_named_rows(String::new(), String::new(), num_cities, rows)
    }

    fn from_named_rows(name: String, comment: String, num_cities: usize, rows: Vec<Vec<f64>>) -> Result<Self> {
        if num_cities == 0 {
            return Err(ColonyError::EmptyInstance);
        }
        if rows.len() != num_cities {
            return Err(ColonyError::DimensionMismatch {
                what: "rows",
                expected: num_cities,
                got: rows.len(),
            });
        }
        if let Some(row) = rows.iter().find(|row| row.len() != num_cities) {
            return Err(ColonyError::DimensionMismatch {
                what: "columns",
                expected: num_cities,
                got: row.len(),
            });
        }

        // Square is checked above
        let distances = Matrix::from_rows(&rows).ok_or(ColonyError::DimensionMismatch {
            what: "columns",
            expected: num_cities,
            got: 0,
        })?;

        Self::from_distances(name, comment, distances)
    }

    /// The 5-city example instance
    pub fn sample() -> Self {
        let n = SAMPLE_DISTANCES.len();
        let mut distances = Matrix::new(n);
        for (i, row) in SAMPLE_DISTANCES.iter().enumerate() {
            distances[i].copy_from_slice(row);
        }

        TspInstance {
            name: "sample5".to_string(),
            comment: "5-city example, optimal tour length 85".to_string(),
            distances,
        }
    }

    fn from_distances(name: String, comment: String, distances: Matrix) -> Result<Self> {
        Self::validate(&distances)?;

        if !distances.is_symmetric() {
            log::warn!("Distance matrix of instance '{}' is not symmetric", name);
        }

        Ok(TspInstance {
            name,
            comment,
            distances,
        })
    }

    fn validate(distances: &Matrix) -> Result<()> {
        let n = distances.size();
        if n == 0 {
            return Err(ColonyError::EmptyInstance);
        }

        for i in 0..n {
            for j in 0..n {
                let value = distances[i][j];
                if !value.is_finite() {
                    return Err(ColonyError::NonFiniteDistance { from: i, to: j, value });
                }
                if value < 0.0 {
                    return Err(ColonyError::NegativeDistance { from: i, to: j, value });
                }
                if i != j && value == 0.0 {
                    return Err(ColonyError::ZeroDistance { from: i, to: j });
                }
            }
        }

        Ok(())
    }

    /// Parse a TSP instance from a TSP-LIB format file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse TSP-LIB formatted text
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut name = String::new();
        let mut comment = String::new();
        let mut dimension = 0usize;
        let mut weight_format = String::from("FULL_MATRIX");
        let mut coords: Vec<(f64, f64)> = Vec::new();
        let mut weights: Vec<f64> = Vec::new();

        let mut section = Section::Header;

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line == "EOF" {
                continue;
            }

            if let Some((key, value)) = line.split_once(':') {
                let value = value.trim();
                match key.trim() {
                    "NAME" => {
                        name = value.to_string();
                        continue;
                    }
                    "COMMENT" => {
                        comment = value.to_string();
                        continue;
                    }
                    "DIMENSION" => {
                        dimension = value
                            .parse()
                            .map_err(|_| ColonyError::Parse(format!("Invalid dimension '{}'", value)))?;
                        continue;
                    }
                    "EDGE_WEIGHT_FORMAT" => {
                        weight_format = value.to_string();
                        continue;
                    }
                    "TYPE" | "EDGE_WEIGHT_TYPE" | "DISPLAY_DATA_TYPE" => continue,
                    _ => {}
                }
            }

            if line.starts_with("NODE_COORD_SECTION") {
                section = Section::Coords;
                continue;
            }
            if line.starts_with("EDGE_WEIGHT_SECTION") {
                section = Section::EdgeWeights;
                continue;
            }
            if line.ends_with("_SECTION") {
                section = Section::Header;
                continue;
            }

            match section {
                Section::Coords => {
                    let parts: Vec<&str> = line.split_whitespace().collect();
                    if parts.len() >= 3 {
                        let x: f64 = parts[1]
                            .parse()
                            .map_err(|_| ColonyError::Parse(format!("Invalid x coordinate '{}'", parts[1])))?;
                        let y: f64 = parts[2]
                            .parse()
                            .map_err(|_| ColonyError::Parse(format!("Invalid y coordinate '{}'", parts[2])))?;
                        coords.push((x, y));
                    }
                }
                Section::EdgeWeights => {
                    for token in line.split_whitespace() {
                        let w: f64 = token
                            .parse()
                            .map_err(|_| ColonyError::Parse(format!("Invalid edge weight '{}'", token)))?;
                        weights.push(w);
                    }
                }
                Section::Header => {}
            }
        }

        let distances = if !weights.is_empty() {
            if weight_format != "FULL_MATRIX" {
                return Err(ColonyError::Parse(format!(
                    "Unsupported EDGE_WEIGHT_FORMAT '{}'",
                    weight_format
                )));
            }
            if dimension == 0 {
                dimension = (weights.len() as f64).sqrt() as usize;
            }
            let expected = dimension
                .checked_mul(dimension)
                .ok_or_else(|| ColonyError::Parse(format!("Dimension {} is too large", dimension)))?;
            if weights.len() != expected {
                return Err(ColonyError::DimensionMismatch {
                    what: "edge weights",
                    expected,
                    got: weights.len(),
                });
            }
            let rows: Vec<Vec<f64>> = weights.chunks(dimension).map(|c| c.to_vec()).collect();
            Matrix::from_rows(&rows).ok_or_else(|| ColonyError::Parse("Edge weights are not square".into()))?
        } else {
            if dimension != 0 && coords.len() != dimension {
                return Err(ColonyError::DimensionMismatch {
                    what: "coordinates",
                    expected: dimension,
                    got: coords.len(),
                });
            }
            Self::compute_distance_matrix(&coords)
        };

        Self::from_distances(name, comment, distances)
    }

    /// Compute Euclidean distance matrix
    fn compute_distance_matrix(coords: &[(f64, f64)]) -> Matrix {
        let n = coords.len();
        let mut matrix = Matrix::new(n);

        for i in 0..n {
            for j in 0..n {
                if i != j {
                    let dx = coords[i].0 - coords[j].0;
                    let dy = coords[i].1 - coords[j].1;
                    matrix[i][j] = (dx * dx + dy * dy).sqrt();
                }
            }
        }

        matrix
    }

    /// Number of cities
    #[inline]
    pub fn dimension(&self) -> usize {
        self.distances.size()
    }

    /// Get the distance between two cities
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distances[i][j]
    }

    pub fn distances(&self) -> &Matrix {
        &self.distances
    }

    /// Length of the closed tour: consecutive edges plus the edge back to the start.
    /// A single-city tour is its self-loop.
    pub fn tour_length(&self, tour: &[usize]) -> f64 {
        let Some((&first, &last)) = tour.first().zip(tour.last()) else {
            return 0.0;
        };

        let open: f64 = tour.windows(2).map(|w| self.distance(w[0], w[1])).sum();
        open + self.distance(last, first)
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let distances: Vec<f64> = self.distances.upper_triangle().collect();
        let (avg_distance, min_distance, max_distance) = if distances.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            (
                distances.iter().sum::<f64>() / distances.len() as f64,
                distances.iter().cloned().fold(f64::INFINITY, f64::min),
                distances.iter().cloned().fold(0.0, f64::max),
            )
        };

        InstanceStatistics {
            name: self.name.clone(),
            dimension: self.dimension(),
            num_edges: distances.len(),
            symmetric: self.distances.is_symmetric(),
            avg_distance,
            min_distance,
            max_distance,
        }
    }
}

/// Statistics about a TSP instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub dimension: usize,
    pub num_edges: usize,
    pub symmetric: bool,
    pub avg_distance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Cities: {}", self.dimension)?;
        writeln!(f, "  Edges: {}", self.num_edges)?;
        writeln!(f, "  Symmetric: {}", self.symmetric)?;
        writeln!(f, "  Avg distance: {:.2}", self.avg_distance)?;
        writeln!(f, "  Min distance: {:.2}", self.min_distance)?;
        writeln!(f, "  Max distance: {:.2}", self.max_distance)
    }
}
