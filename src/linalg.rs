use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

#[cfg(test)]
mod tests;

/// Lower-triangular Cholesky factor of a symmetric positive definite matrix,
/// or `None` if a pivot is not strictly positive.
pub fn cholesky(a: &ArrayView2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    debug_assert_eq!(n, a.ncols());
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[(i, j)];
            for k in 0..j {
                sum -= l[(i, k)] * l[(j, k)];
            }
            if i == j {
                if !(sum > 0.0) || !sum.is_finite() {
                    return None;
                }
                l[(i, j)] = sum.sqrt();
            } else {
                l[(i, j)] = sum / l[(j, j)];
            }
        }
    }
    Some(l)
}

/// Log-determinant of the matrix whose Cholesky factor is `l`.
pub fn log_det(l: &ArrayView2<f64>) -> f64 {
    2.0 * l.diag().iter().map(|v| v.ln()).sum::<f64>()
}

/// Solve `A x = b` given the Cholesky factor `l` of `A`, by forward and
/// backward substitution.
pub fn cholesky_solve(l: &ArrayView2<f64>, b: &ArrayView1<f64>) -> Array1<f64> {
    let n = l.nrows();
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[(i, k)] * y[k];
        }
        y[i] = sum / l[(i, i)];
    }
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = y[i];
        for k in i + 1..n {
            sum -= l[(k, i)] * x[k];
        }
        x[i] = sum / l[(i, i)];
    }
    x
}

/// Inverse of the matrix whose Cholesky factor is `l`, column by column.
pub fn cholesky_inverse(l: &ArrayView2<f64>) -> Array2<f64> {
    let n = l.nrows();
    let mut inv = Array2::<f64>::zeros((n, n));
    let mut unit = Array1::<f64>::zeros(n);
    for col in 0..n {
        unit.fill(0.0);
        unit[col] = 1.0;
        let x = cholesky_solve(l, &unit.view());
        inv.column_mut(col).assign(&x);
    }
    inv
}

/// Ordinary least squares `argmin_b ||X b - y||` via the normal equations.
///
/// Returns `None` when the normal matrix is singular (collinear columns).
/// The parameter dimension is tiny throughout this crate, so the normal
/// equations are accurate enough and cheap.
pub fn least_squares(x: &ArrayView2<f64>, y: &ArrayView1<f64>) -> Option<Array1<f64>> {
    let xtx = x.t().dot(x);
    let xty = x.t().dot(y);
    let l = cholesky(&xtx.view())?;
    let beta = cholesky_solve(&l.view(), &xty.view());
    beta.iter().all(|v| v.is_finite()).then(|| beta)
}

/// Column means of a matrix; `None` for an empty matrix.
pub fn column_means(a: &ArrayView2<f64>) -> Option<Array1<f64>> {
    a.mean_axis(Axis(0))
}
