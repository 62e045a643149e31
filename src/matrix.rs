//! Dense square matrix stored as one contiguous row-major buffer.
//!
//! Used for both the distance matrix and the pheromone matrix. Rows are
//! exposed as slices so element access reads `m[i][j]`.

use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    dimension: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Create a `dimension x dimension` matrix filled with zeros
    pub fn new(dimension: usize) -> Self {
        Self::filled_with(dimension, 0.0)
    }

    /// Create a `dimension x dimension` matrix with every entry set to `value`
    pub fn filled_with(dimension: usize, value: f64) -> Self {
        Matrix {
            dimension,
            data: vec![value; dimension * dimension],
        }
    }

    /// Build from nested rows. Returns `None` if the rows are not square.
    pub fn from_rows(rows: &[Vec<f64>]) -> Option<Self> {
        let n = rows.len();
        if rows.iter().any(|row| row.len() != n) {
            return None;
        }

        Some(Matrix {
            dimension: n,
            data: rows.iter().flatten().copied().collect(),
        })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.dimension
    }

    /// Apply `op` to every entry in place
    pub fn map_inplace<F: Fn(f64) -> f64>(&mut self, op: F) {
        for value in self.data.iter_mut() {
            *value = op(*value);
        }
    }

    /// Add `delta` to both `[i][j]` and `[j][i]`
    #[inline]
    pub fn add_symmetric(&mut self, i: usize, j: usize, delta: f64) {
        self[i][j] += delta;
        if i != j {
            self[j][i] += delta;
        }
    }

    /// True if `[i][j] == [j][i]` for every pair
    pub fn is_symmetric(&self) -> bool {
        let n = self.dimension;
        (0..n).all(|i| (i + 1..n).all(|j| self[i][j] == self[j][i]))
    }

    /// Iterate over the entries strictly above the diagonal
    pub fn upper_triangle(&self) -> impl Iterator<Item = f64> + '_ {
        let n = self.dimension;
        (0..n).flat_map(move |i| (i + 1..n).map(move |j| self[i][j]))
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks(0) panics, an empty matrix simply has no rows
        self.data.chunks(self.dimension.max(1))
    }
}

impl Index<usize> for Matrix {
    type Output = [f64];

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index * self.dimension..(index + 1) * self.dimension]
    }
}

impl IndexMut<usize> for Matrix {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index * self.dimension..(index + 1) * self.dimension]
    }
}
