//! Tensor algebra for Hilbert and Liouville space operators.
//!
//! This module contains helper functions for:
//! - Kronecker products and chains of them.
//! - Embedding local operators into an n-qubit system.
//! - Liouville (vectorized superoperator) conversion.
//! - Exponentiation of Hermitian generators.
//!
//! Tensor positions are numbered from the left: position 0 is the leftmost
//! (most significant) factor of a Kronecker chain.

use crate::core::errors::GateError;
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// Computes the Kronecker (Tensor) product of two matrices.
///
/// If `A` is an $m \times n$ matrix and `B` is a $p \times q$ matrix,
/// the result is an $mp \times nq$ matrix.
pub fn kronecker_product(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Array2<Complex64> {
    let (m, n) = a.dim();
    let (p, q) = b.dim();

    Array2::from_shape_fn((m * p, n * q), |(row, col)| {
        a[[row / p, col / q]] * b[[row % p, col % q]]
    })
}

/// Kronecker product of a sequence of operators, folded right-to-left.
///
/// Computes `kron(m0, kron(m1, ... kron(m_{k-2}, m_{k-1})))`. An empty
/// sequence yields the 1x1 identity.
pub fn kron_chain(ops: &[Array2<Complex64>]) -> Array2<Complex64> {
    ops.iter()
        .rev()
        .fold(None, |acc: Option<Array2<Complex64>>, op| match acc {
            None => Some(op.clone()),
            Some(tail) => Some(kronecker_product(op, &tail)),
        })
        .unwrap_or_else(|| Array2::eye(1))
}

/// Returns the n-qubit operator applying `op` at `target` and identity elsewhere.
pub fn embed_single_qubit(
    op: &Array2<Complex64>,
    target: usize,
    num_qubits: usize,
) -> Result<Array2<Complex64>, GateError> {
    validate_qubit(target, num_qubits)?;

    let factors: Vec<_> = (0..num_qubits)
        .map(|q| if q == target { op.clone() } else { Array2::eye(2) })
        .collect();

    Ok(kron_chain(&factors))
}

/// Places `first` on factor 0 when `position == 0`, and `rest` on factor `i`
/// when `position == i` for `i >= 1`. Every other factor is the identity.
///
/// Used to embed Kraus operators, where both arguments are the same matrix.
pub fn embed_two_site(
    first: &Array2<Complex64>,
    rest: &Array2<Complex64>,
    position: usize,
    num_qubits: usize,
) -> Result<Array2<Complex64>, GateError> {
    validate_qubit(position, num_qubits)?;

    let factors: Vec<_> = (0..num_qubits)
        .map(|q| match (q, q == position) {
            (0, true) => first.clone(),
            (_, true) => rest.clone(),
            _ => Array2::eye(2),
        })
        .collect();

    Ok(kron_chain(&factors))
}

/// Liouville representation `kron(op, conj(op))`.
///
/// Acting on the row-major vectorization of a density matrix this is
/// $\rho \mapsto O \rho O^\dagger$.
pub fn to_liouville(op: &Array2<Complex64>) -> Array2<Complex64> {
    kronecker_product(op, &op.mapv(|c| c.conj()))
}

/// Conjugate transpose.
pub fn dagger(op: &Array2<Complex64>) -> Array2<Complex64> {
    op.t().mapv(|c| c.conj())
}

/// Computes $e^{iH}$ for a Hermitian matrix `h`.
///
/// Uses spectral decomposition $H = V D V^\dagger$, so that
/// $e^{iH} = V e^{iD} V^\dagger$.
pub fn hermitian_exp_i(h: &Array2<Complex64>) -> Array2<Complex64> {
    let (rows, cols) = h.dim();

    // Convert ndarray -> nalgebra
    let na_mat = DMatrix::from_fn(rows, cols, |r, c| h[(r, c)]);

    let eigen = na_mat.symmetric_eigen();

    let mut phases = DMatrix::<Complex64>::zeros(rows, rows);
    for i in 0..rows {
        phases[(i, i)] = Complex64::from_polar(1.0, eigen.eigenvalues[i]);
    }

    let v = &eigen.eigenvectors;
    let result_na = v * phases * v.adjoint();

    // Reconvert nalgebra -> ndarray
    Array2::from_shape_fn((rows, cols), |(r, c)| result_na[(r, c)])
}

/// Generates the full operator matrix ($2^N \times 2^N$) for the whole system.
///
/// Expands a local operator acting on `targets` (and controlled by `controls`)
/// to an operator on `num_total_qubits`. Indices here are bit positions of
/// the basis index (qubit `i` is bit `i`), not tensor positions.
pub fn expand_operator(
    num_total_qubits: usize,
    matrix: &Array2<Complex64>,
    targets: &[usize],
    controls: &[usize],
) -> Array2<Complex64> {
    let dim = 1 << num_total_qubits;
    let mut full_matrix = Array2::<Complex64>::zeros((dim, dim));

    let control_mask = controls.iter().fold(0usize, |mask, &c| mask | (1 << c));
    let target_mask = targets.iter().fold(0usize, |mask, &t| mask | (1 << t));
    let passive_mask = !target_mask;

    for col_idx in 0..dim {
        // Column untouched unless every control bit is set
        if (col_idx & control_mask) != control_mask {
            full_matrix[[col_idx, col_idx]] = Complex64::new(1.0, 0.0);
            continue;
        }

        let small_col = extract_bits(col_idx, targets);
        for small_row in 0..matrix.nrows() {
            let val = matrix[[small_row, small_col]];
            if val.norm_sqr() < f64::EPSILON {
                continue;
            }
            let row_idx = (col_idx & passive_mask) | deposit_bits(small_row, targets);
            full_matrix[[row_idx, col_idx]] = val;
        }
    }
    full_matrix
}

/// Extracts the bits in positions `indices` of `value`
fn extract_bits(value: usize, indices: &[usize]) -> usize {
    let mut result = 0;
    for (i, &pos) in indices.iter().enumerate() {
        if (value >> pos) & 1 == 1 {
            result |= 1 << i;
        }
    }
    result
}

/// Scatters the i-th bit of `compact_value` to bit position `indices[i]`.
fn deposit_bits(compact_value: usize, indices: &[usize]) -> usize {
    let mut result = 0;
    for (i, &pos) in indices.iter().enumerate() {
        if (compact_value >> i) & 1 == 1 {
            result |= 1 << pos;
        }
    }
    result
}

/// Inner product without conjugation, $\sum_i a_i b_i$.
pub fn bilinear_dot(a: &Array1<Complex64>, b: &Array1<Complex64>) -> Complex64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Checks a qubit index against the system size
pub fn validate_qubit(index: usize, num_qubits: usize) -> Result<(), GateError> {
    if index >= num_qubits {
        return Err(GateError::QubitOutOfRange { index, num_qubits });
    }
    Ok(())
}

/// Checks if two matrices agree elementwise within `tol`
pub fn approx_eq(a: &Array2<Complex64>, b: &Array2<Complex64>, tol: f64) -> bool {
    a.dim() == b.dim() && a.iter().zip(b.iter()).all(|(x, y)| (x - y).norm() < tol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn pauli_x() -> Array2<Complex64> {
        array![[c(0.0, 0.0), c(1.0, 0.0)], [c(1.0, 0.0), c(0.0, 0.0)]]
    }

    fn pauli_z() -> Array2<Complex64> {
        array![[c(1.0, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), c(-1.0, 0.0)]]
    }

    #[test]
    fn kronecker_product_places_blocks() {
        let k = kronecker_product(&pauli_z(), &pauli_x());
        assert_eq!(k.dim(), (4, 4));
        assert_eq!(k[[0, 1]], c(1.0, 0.0));
        assert_eq!(k[[2, 3]], c(-1.0, 0.0));
        assert_eq!(k[[0, 2]], c(0.0, 0.0));
    }

    #[test]
    fn kron_chain_is_leftmost_significant() {
        let chained = kron_chain(&[pauli_z(), pauli_x(), Array2::eye(2)]);
        let manual = kronecker_product(
            &pauli_z(),
            &kronecker_product(&pauli_x(), &Array2::eye(2)),
        );
        assert!(approx_eq(&chained, &manual, 1e-15));
        assert_eq!(kron_chain(&[]), Array2::<Complex64>::eye(1));
    }

    #[test]
    fn embedded_identity_is_liouville_identity() {
        for n in 1..=3 {
            for t in 0..n {
                let op = embed_single_qubit(&Array2::eye(2), t, n).unwrap();
                let sup = to_liouville(&op);
                assert!(approx_eq(&sup, &Array2::eye(1 << (2 * n)), 1e-15));
            }
        }
    }

    #[test]
    fn embed_single_qubit_rejects_out_of_range() {
        let err = embed_single_qubit(&pauli_x(), 2, 2).unwrap_err();
        assert_eq!(
            err,
            GateError::QubitOutOfRange {
                index: 2,
                num_qubits: 2
            }
        );
    }

    #[test]
    fn embed_two_site_matches_single_embedding_for_equal_factors() {
        for pos in 0..3 {
            let a = embed_two_site(&pauli_x(), &pauli_x(), pos, 3).unwrap();
            let b = embed_single_qubit(&pauli_x(), pos, 3).unwrap();
            assert!(approx_eq(&a, &b, 1e-15));
        }
    }

    #[test]
    fn hermitian_exp_of_pauli_is_rotation() {
        let theta = 0.3;
        let h = pauli_x().mapv(|v| v * theta);
        let u = hermitian_exp_i(&h);
        let expected = array![
            [c(theta.cos(), 0.0), c(0.0, theta.sin())],
            [c(0.0, theta.sin()), c(theta.cos(), 0.0)]
        ];
        assert!(approx_eq(&u, &expected, 1e-12));
    }

    #[test]
    fn hermitian_exp_of_complex_pauli_product() {
        // (X⊗Y)^2 = I, so exp(iθ X⊗Y) = cos θ I + i sin θ X⊗Y
        let theta: f64 = 0.41;
        let pauli_y = array![[c(0.0, 0.0), c(0.0, -1.0)], [c(0.0, 1.0), c(0.0, 0.0)]];
        let xy = kronecker_product(&pauli_x(), &pauli_y);
        let u = hermitian_exp_i(&xy.mapv(|v| v * theta));

        let expected = Array2::<Complex64>::eye(4).mapv(|v| v * theta.cos())
            + xy.mapv(|v| v * c(0.0, theta.sin()));
        assert!(approx_eq(&u, &expected, 1e-12));
        assert!(approx_eq(&u.dot(&dagger(&u)), &Array2::eye(4), 1e-12));
    }

    #[test]
    fn hermitian_exp_of_zero_is_identity() {
        let u = hermitian_exp_i(&Array2::zeros((4, 4)));
        assert!(approx_eq(&u, &Array2::eye(4), 1e-12));
    }

    #[test]
    fn expand_operator_builds_cnot() {
        // control on bit 1, target on bit 0: |10> <-> |11>
        let cx = expand_operator(2, &pauli_x(), &[0], &[1]);
        assert_eq!(cx[[3, 2]], c(1.0, 0.0));
        assert_eq!(cx[[2, 3]], c(1.0, 0.0));
        assert_eq!(cx[[0, 0]], c(1.0, 0.0));
        assert_eq!(cx[[1, 1]], c(1.0, 0.0));
        assert!(approx_eq(&cx, &dagger(&cx), 1e-15));
    }
}
