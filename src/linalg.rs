#![allow(non_snake_case)]
//// #### Linear algebra over a finite field
////
//// The algorithms are generic over `FieldArithmetic`, so the same elimination code runs over
//// GF(p) with either calculation strategy and over GF(p^m). Unlike floating point, there are no
//// numerical concerns here: pivoting is only needed because a non-singular matrix can still
//// have zeros on the diagonal.
use crate::error::{Error, Result};
use crate::field::FieldArithmetic;
use std::ops::{Index, IndexMut, Range};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    dat: Vec<u64>, // row-major-order
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { rows, cols, dat: vec![0; rows * cols] }
    }

    pub fn new(rows: usize, cols: usize, dat: Vec<u64>) -> Result<Self> {
        if rows.checked_mul(cols) != Some(dat.len()) {
            return Err(Error::ShapeMismatch(format!(
                "{} values can't fill a {}x{} matrix",
                dat.len(),
                rows,
                cols
            )));
        }
        Ok(Self { rows, cols, dat })
    }

    /// Build a matrix from a list of equal-length rows.
    pub fn from_rows(rows: &[Vec<u64>]) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.len());
        if let Some(bad) = rows.iter().find(|r| r.len() != cols) {
            return Err(Error::ShapeMismatch(format!(
                "ragged rows: expected {} columns, found a row with {}",
                cols,
                bad.len()
            )));
        }
        Ok(Self { rows: rows.len(), cols, dat: rows.concat() })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn data(&self) -> &[u64] {
        &self.dat
    }

    pub fn into_data(self) -> Vec<u64> {
        self.dat
    }

    pub fn row(&self, i: usize) -> &[u64] {
        &self.dat[i * self.cols..(i + 1) * self.cols]
    }

    pub fn to_rows(&self) -> Vec<Vec<u64>> {
        (0..self.rows).map(|i| self.row(i).to_vec()).collect()
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = u64;
    fn index(&self, idx: (usize, usize)) -> &u64 {
        assert!(idx.0 < self.rows);
        assert!(idx.1 < self.cols);
        &self.dat[idx.0 * self.cols + idx.1]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, idx: (usize, usize)) -> &mut u64 {
        assert!(idx.0 < self.rows);
        assert!(idx.1 < self.cols);
        &mut self.dat[idx.0 * self.cols + idx.1]
    }
}

//// Slicing follows the rules of slice indexing: an out-of-bounds range panics.
impl Matrix {
    pub fn slice_rows(&self, r: Range<usize>) -> Matrix {
        assert!(r.start <= r.end && r.end <= self.rows);
        Matrix {
            rows: r.end - r.start,
            cols: self.cols,
            dat: self.dat[r.start * self.cols..r.end * self.cols].to_vec(),
        }
    }

    pub fn slice_cols(&self, r: Range<usize>) -> Matrix {
        assert!(r.start <= r.end && r.end <= self.cols);
        let dat = (0..self.rows).flat_map(|i| self.row(i)[r.clone()].iter().copied()).collect();
        Matrix { rows: self.rows, cols: r.end - r.start, dat }
    }

    /// Gather rows by index, e.g. to apply a permutation.
    pub fn select_rows(&self, idx: &[usize]) -> Matrix {
        let dat = idx.iter().flat_map(|&i| self.row(i).iter().copied()).collect();
        Matrix { rows: idx.len(), cols: self.cols, dat }
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for j in 0..self.cols {
            self.dat.swap(a * self.cols + j, b * self.cols + j);
        }
    }

    pub fn transpose(&self) -> Matrix {
        let mut out = Matrix::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                out[(j, i)] = self[(i, j)];
            }
        }
        out
    }

    /// Place `other` to the right of `self`: `[A | B]`.
    pub fn hstack(&self, other: &Matrix) -> Result<Matrix> {
        if self.rows != other.rows {
            return Err(Error::ShapeMismatch(format!(
                "can't stack a {}x{} matrix next to a {}x{} matrix",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        let dat = (0..self.rows).flat_map(|i| self.row(i).iter().chain(other.row(i)).copied()).collect();
        Ok(Matrix { rows: self.rows, cols: self.cols + other.cols, dat })
    }
}

impl Matrix {
    pub fn identity(n: usize) -> Self {
        let mut m = Matrix::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = 1;
        }
        m
    }
}

fn require_square(m: &Matrix) -> Result<usize> {
    if !m.is_square() {
        return Err(Error::NotSquare { rows: m.rows, cols: m.cols });
    }
    Ok(m.rows)
}

//// #### Products

pub fn matmul<F: FieldArithmetic + ?Sized>(f: &F, a: &Matrix, b: &Matrix) -> Result<Matrix> {
    // Multiply two matrices: (m x n) * (n x p) => (m x p)
    if a.cols != b.rows {
        return Err(Error::ShapeMismatch(format!(
            "can't multiply a {}x{} matrix by a {}x{} matrix",
            a.rows, a.cols, b.rows, b.cols
        )));
    }
    let (m, n, p) = (a.rows, a.cols, b.cols);

    let mut out = Matrix::zeros(m, p);
    for i in 0..m {
        for j in 0..p {
            let mut elem = 0;
            for k in 0..n {
                elem = f.add(elem, f.multiply(a[(i, k)], b[(k, j)]));
            }
            out[(i, j)] = elem;
        }
    }

    Ok(out)
}

/// Dot product of two equal-length vectors.
pub fn inner<F: FieldArithmetic + ?Sized>(f: &F, a: &[u64], b: &[u64]) -> Result<u64> {
    if a.len() != b.len() {
        return Err(Error::ShapeMismatch(format!(
            "inner product of vectors of length {} and {}",
            a.len(),
            b.len()
        )));
    }
    Ok(a.iter().zip(b).fold(0, |acc, (&x, &y)| f.add(acc, f.multiply(x, y))))
}

/// `out[(i, j)] = a[i] * b[j]`
pub fn outer<F: FieldArithmetic + ?Sized>(f: &F, a: &[u64], b: &[u64]) -> Matrix {
    let dat = a.iter().flat_map(|&x| b.iter().map(move |&y| f.multiply(x, y))).collect();
    Matrix { rows: a.len(), cols: b.len(), dat }
}

//// #### Gauss-Jordan elimination
////
//// Reduced row echelon form: every pivot is 1 and is the only non-zero entry in its column.
//// Only the first `ncols` columns are used for pivoting, which is how an augmented matrix
//// `[A | I]` is reduced to `[I | A^-1]`.
pub fn row_reduce<F: FieldArithmetic + ?Sized>(f: &F, m: &Matrix, ncols: Option<usize>) -> Result<Matrix> {
    let ncols = ncols.unwrap_or(m.cols);
    if ncols > m.cols {
        return Err(Error::ShapeMismatch(format!(
            "can't pivot on {} columns of a matrix with {}",
            ncols, m.cols
        )));
    }

    let mut A = m.clone();
    let mut p = 0;
    for j in 0..ncols {
        if p == A.rows {
            break;
        }

        // Find the first non-zero entry at or below the pivot row
        let Some(i) = (p..A.rows).find(|&i| A[(i, j)] != 0) else {
            continue;
        };
        A.swap_rows(p, i);
        log::trace!("row_reduce: pivot {} at ({}, {})", A[(p, j)], p, j);

        // Scale the pivot row so the pivot is 1
        let scale = f.reciprocal(A[(p, j)])?;
        for c in 0..A.cols {
            A[(p, c)] = f.multiply(A[(p, c)], scale);
        }

        // Clear the rest of the column, above and below
        for r in 0..A.rows {
            let factor = A[(r, j)];
            if r == p || factor == 0 {
                continue;
            }
            for c in 0..A.cols {
                A[(r, c)] = f.subtract(A[(r, c)], f.multiply(factor, A[(p, c)]));
            }
        }

        p += 1;
    }

    Ok(A)
}

/// Number of non-zero rows in the reduced row echelon form.
pub fn rank<F: FieldArithmetic + ?Sized>(f: &F, m: &Matrix) -> Result<usize> {
    let R = row_reduce(f, m, None)?;
    Ok((0..R.rows).filter(|&i| R.row(i).iter().any(|&x| x != 0)).count())
}

//// #### LU factorization without pivoting
////
//// `A = L U` with `L` unit lower triangular. This fails as soon as a zero shows up on the
//// diagonal of `U` before the last row, even if the matrix is non-singular. `lup_decompose`
//// handles those matrices.
pub fn lu_decompose<F: FieldArithmetic + ?Sized>(f: &F, m: &Matrix) -> Result<(Matrix, Matrix)> {
    let n = require_square(m)?;
    let mut L = Matrix::identity(n);
    let mut U = m.clone();

    for k in 0..n.saturating_sub(1) {
        let pivot = U[(k, k)];
        if pivot == 0 {
            return Err(Error::NoLuDecomposition);
        }
        log::trace!("lu_decompose: pivot {} at ({}, {})", pivot, k, k);

        for i in (k + 1)..n {
            let factor = f.divide(U[(i, k)], pivot)?;
            L[(i, k)] = factor;
            for j in k..n {
                U[(i, j)] = f.subtract(U[(i, j)], f.multiply(factor, U[(k, j)]));
            }
        }
    }

    Ok((L, U))
}

//// #### LU factorization with partial pivoting
////
//// `P A = L U`. The row swaps are tracked in a permutation map instead of moving data around
//// in `A`. The swap count is kept as well, since each swap flips the sign of the determinant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lup {
    lower: Matrix,
    upper: Matrix,
    permute: Vec<usize>, // row permutation map (new_row => old_row)
    swaps: usize,
}

impl Lup {
    pub fn lower(&self) -> &Matrix {
        &self.lower
    }

    pub fn upper(&self) -> &Matrix {
        &self.upper
    }

    /// `P[i]` is the row of the original matrix that ended up in row `i`.
    pub fn permutation(&self) -> &[usize] {
        &self.permute
    }

    pub fn permutation_matrix(&self) -> Matrix {
        let n = self.permute.len();
        let mut P = Matrix::zeros(n, n);
        for (i, &j) in self.permute.iter().enumerate() {
            P[(i, j)] = 1;
        }
        P
    }

    pub fn swaps(&self) -> usize {
        self.swaps
    }

    pub fn is_singular(&self) -> bool {
        (0..self.upper.rows).any(|i| self.upper[(i, i)] == 0)
    }
}

pub fn lup_decompose<F: FieldArithmetic + ?Sized>(f: &F, m: &Matrix) -> Result<Lup> {
    let n = require_square(m)?;
    let mut A = m.clone();
    let mut L = Matrix::identity(n);
    let mut U = Matrix::zeros(n, n);
    let mut P: Vec<usize> = (0..n).collect();
    let mut swaps = 0;

    // Loop over columns
    for k in 0..n {
        // Take the first non-zero entry at or below the diagonal. A singular matrix may have
        // none, in which case the column is left as is.
        if let Some(i) = (k..n).find(|&i| A[(P[i], k)] != 0) {
            if i != k {
                P.swap(k, i);
                // The multipliers computed so far belong to the rows, so they move with them
                for j in 0..k {
                    let save = L[(k, j)];
                    L[(k, j)] = L[(i, j)];
                    L[(i, j)] = save;
                }
                swaps += 1;
            }
        }

        // Retrieve the pivot element
        let pivot = A[(P[k], k)];

        // Copy the pivot row to the U matrix
        for j in k..n {
            U[(k, j)] = A[(P[k], j)];
        }

        if pivot == 0 {
            continue;
        }
        log::trace!("lup_decompose: pivot {} at ({}, {})", pivot, P[k], k);

        // Compute the multipliers and store in column of L
        for i in (k + 1)..n {
            L[(i, k)] = f.divide(A[(P[i], k)], pivot)?;
        }

        // Apply the transform (row subtraction) to the submatrix
        for i in (k + 1)..n {
            let factor = L[(i, k)];
            if factor == 0 {
                continue;
            }
            for j in (k + 1)..n {
                A[(P[i], j)] = f.subtract(A[(P[i], j)], f.multiply(factor, A[(P[k], j)]));
            }
        }
    }

    Ok(Lup { lower: L, upper: U, permute: P, swaps })
}

//// #### Triangular solves

// Ly = b: Forward solve with lower triangular matrix (using the permutation)
fn solve_lower_triangular<F: FieldArithmetic + ?Sized>(
    f: &F,
    L: &Matrix,
    b: &[u64],
    permute: &[usize],
) -> Result<Vec<u64>> {
    let n = L.rows;
    let mut b = b.to_vec();
    let mut y = vec![0; n];
    for j in 0..n {
        // columns in L
        let elt = f.divide(b[permute[j]], L[(j, j)])?;
        y[j] = elt;

        for i in (j + 1)..n {
            // walk down the column, subtracting off
            b[permute[i]] = f.subtract(b[permute[i]], f.multiply(L[(i, j)], elt));
        }
    }
    Ok(y)
}

// Ux = y: Backwards solve with upper triangular matrix
fn solve_upper_triangular<F: FieldArithmetic + ?Sized>(f: &F, U: &Matrix, y: &[u64]) -> Result<Vec<u64>> {
    let n = U.rows;
    let mut y = y.to_vec();
    let mut x = vec![0; n];
    for j in (0..n).rev() {
        // columns in U
        let elt = f.divide(y[j], U[(j, j)]).map_err(|_| Error::SingularMatrix)?;
        x[j] = elt;

        for i in (0..j).rev() {
            // walk up the columns, subtracting off
            y[i] = f.subtract(y[i], f.multiply(U[(i, j)], elt));
        }
    }
    Ok(x)
}

impl Lup {
    /// Solve `A X = B` for every column of `B`.
    pub fn solve<F: FieldArithmetic + ?Sized>(&self, f: &F, B: &Matrix) -> Result<Matrix> {
        let n = self.upper.rows;
        if B.rows != n {
            return Err(Error::ShapeMismatch(format!(
                "right-hand side has {} rows, the system has {}",
                B.rows, n
            )));
        }
        if self.is_singular() {
            return Err(Error::SingularMatrix);
        }

        let mut X = Matrix::zeros(n, B.cols);
        let Bt = B.transpose();
        for c in 0..B.cols {
            let y = solve_lower_triangular(f, &self.lower, Bt.row(c), &self.permute)?;
            let x = solve_upper_triangular(f, &self.upper, &y)?;
            for (i, v) in x.into_iter().enumerate() {
                X[(i, c)] = v;
            }
        }
        Ok(X)
    }
}

//// #### Built on top of LUP

/// The determinant is the product of the diagonal of `U`, negated for an odd number of swaps.
/// The empty matrix has determinant 1.
pub fn determinant<F: FieldArithmetic + ?Sized>(f: &F, m: &Matrix) -> Result<u64> {
    let n = require_square(m)?;
    let lup = lup_decompose(f, m)?;
    let det = (0..n).fold(1, |acc, i| f.multiply(acc, lup.upper[(i, i)]));
    Ok(if lup.swaps % 2 == 1 { f.negate(det) } else { det })
}

pub fn inverse<F: FieldArithmetic + ?Sized>(f: &F, m: &Matrix) -> Result<Matrix> {
    let n = require_square(m)?;
    lup_decompose(f, m)?.solve(f, &Matrix::identity(n))
}

/// Solve `A X = B`. `B` may have any number of columns.
pub fn solve<F: FieldArithmetic + ?Sized>(f: &F, A: &Matrix, B: &Matrix) -> Result<Matrix> {
    require_square(A)?;
    lup_decompose(f, A)?.solve(f, B)
}
