use std::ops::{Index, IndexMut};

/// An owned, row-major `n × n` matrix with bounds-checked `(row, col)` indexing.
///
/// Used for per-molecule tables indexed by atom pairs, such as bond distances.
#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrix<T> {
    size: usize,
    data: Vec<T>,
}

impl<T: Clone> SquareMatrix<T> {
    /// Creates a `size × size` matrix with every entry set to `value`.
    pub fn filled(size: usize, value: T) -> Self {
        Self {
            size,
            data: vec![value; size * size],
        }
    }
}

impl<T> SquareMatrix<T> {
    /// Number of rows (and columns).
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Borrows one row as a slice.
    pub fn row(&self, row: usize) -> &[T] {
        assert!(row < self.size, "row {row} out of range for size {}", self.size);
        &self.data[row * self.size..(row + 1) * self.size]
    }

    /// Borrows one row mutably.
    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        assert!(row < self.size, "row {row} out of range for size {}", self.size);
        &mut self.data[row * self.size..(row + 1) * self.size]
    }

    #[inline]
    fn offset(&self, (row, col): (usize, usize)) -> usize {
        assert!(
            row < self.size && col < self.size,
            "index ({row}, {col}) out of range for size {}",
            self.size
        );
        row * self.size + col
    }
}

impl<T> Index<(usize, usize)> for SquareMatrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: (usize, usize)) -> &T {
        &self.data[self.offset(index)]
    }
}

impl<T> IndexMut<(usize, usize)> for SquareMatrix<T> {
    #[inline]
    fn index_mut(&mut self, index: (usize, usize)) -> &mut T {
        let offset = self.offset(index);
        &mut self.data[offset]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexing_is_row_major() {
        let mut m = SquareMatrix::filled(3, 0i32);
        m[(1, 2)] = 7;
        assert_eq!(m.row(1), &[0, 0, 7]);
        assert_eq!(m[(2, 1)], 0);
        m.row_mut(2).fill(-1);
        assert_eq!(m[(2, 0)], -1);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_index_panics() {
        let m = SquareMatrix::filled(2, 0.0f64);
        let _ = m[(0, 2)];
    }
}
