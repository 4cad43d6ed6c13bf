//! Randomized compiling.
//!
//! Two averages are provided:
//! - [`pauli_twirl_project`], the full $4^n$-term Pauli twirl, which keeps
//!   only the Pauli-channel part of a superoperator.
//! - [`two_qubit_rc_dress`], the 16-term dressing of a CNOT, in which each
//!   left Pauli pair is matched to the right pair that the CNOT maps it to.

use crate::core::errors::TwirlError;
use crate::core::gates::{CxGate, Pauli, QuantumGate};
use crate::core::utils;
use ndarray::Array2;
use num_complex::Complex64;
use tracing::trace;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Number of dressings in the CNOT randomized-compiling set.
pub const NUM_RC_CX: usize = 16;

/// Pre-gate dressings as (control, target) Pauli pairs.
pub const RC_LEFT: [(Pauli, Pauli); NUM_RC_CX] = [
    (Pauli::I, Pauli::I),
    (Pauli::I, Pauli::X),
    (Pauli::I, Pauli::Y),
    (Pauli::I, Pauli::Z),
    (Pauli::Y, Pauli::I),
    (Pauli::Y, Pauli::X),
    (Pauli::Y, Pauli::Y),
    (Pauli::Y, Pauli::Z),
    (Pauli::X, Pauli::I),
    (Pauli::X, Pauli::X),
    (Pauli::X, Pauli::Y),
    (Pauli::X, Pauli::Z),
    (Pauli::Z, Pauli::I),
    (Pauli::Z, Pauli::X),
    (Pauli::Z, Pauli::Y),
    (Pauli::Z, Pauli::Z),
];

/// Post-gate dressings, `RC_RIGHT[k]` pairs with `RC_LEFT[k]` so that
/// `left · CX · right = ±CX`.
pub const RC_RIGHT: [(Pauli, Pauli); NUM_RC_CX] = [
    (Pauli::I, Pauli::I),
    (Pauli::I, Pauli::X),
    (Pauli::Z, Pauli::Y),
    (Pauli::Z, Pauli::Z),
    (Pauli::Y, Pauli::X),
    (Pauli::Y, Pauli::I),
    (Pauli::X, Pauli::Z),
    (Pauli::X, Pauli::Y),
    (Pauli::X, Pauli::X),
    (Pauli::X, Pauli::I),
    (Pauli::Y, Pauli::Z),
    (Pauli::Y, Pauli::Y),
    (Pauli::Z, Pauli::I),
    (Pauli::Z, Pauli::X),
    (Pauli::I, Pauli::Y),
    (Pauli::I, Pauli::Z),
];

/// Pauli string for the base-4 digits of `index`, one digit per qubit.
pub fn pauli_string(index: usize, num_qubits: usize) -> Array2<Complex64> {
    let factors: Vec<_> = (0..num_qubits)
        .map(|q| Pauli::from_digit(index / 4usize.pow(q as u32)).matrix().clone())
        .collect();
    utils::kron_chain(&factors)
}

/// Projects `oper` onto its Pauli-channel component.
///
/// Averages $\Sigma_P \, O \, \Sigma_P$ over all $4^n$ Pauli strings $P$,
/// where $\Sigma_P$ is the Liouville form of $P$. The result is a
/// projection: applying it twice changes nothing. Cost grows as $4^n$.
///
/// # Errors
///
/// Returns `TwirlError::DimensionMismatch` if `oper` is not $4^n \times 4^n$.
pub fn pauli_twirl_project(
    oper: &Array2<Complex64>,
    num_qubits: usize,
) -> Result<Array2<Complex64>, TwirlError> {
    let dim = 1usize << (2 * num_qubits);
    check_superoperator(oper, dim)?;

    // one Pauli string per base-4 number below 4^n
    let total = dim;
    let term = |index: usize| {
        let sigma = utils::to_liouville(&pauli_string(index, num_qubits));
        trace!(index, "twirl term");
        sigma.dot(oper).dot(&sigma)
    };

    #[cfg(feature = "parallel")]
    let sum = (0..total)
        .into_par_iter()
        .map(term)
        .reduce(|| Array2::<Complex64>::zeros((dim, dim)), |acc, t| acc + t);

    #[cfg(not(feature = "parallel"))]
    let sum = (0..total)
        .map(term)
        .fold(Array2::<Complex64>::zeros((dim, dim)), |acc, t| acc + t);

    let scale = Complex64::new(1.0 / total as f64, 0.0);
    Ok(sum.mapv(|v| v * scale))
}

/// Clamps a qubit index into the register before table lookup.
pub fn clamp_qubit(index: usize, num_qubits: usize) -> usize {
    index.min(num_qubits.saturating_sub(1))
}

/// Left and right n-qubit dressings for table entry `item`.
///
/// Control and target are clamped with [`clamp_qubit`]. The control factor
/// is written first, so the target's Pauli wins if both clamp to the same
/// position.
pub fn rc_dressing(
    item: usize,
    control: usize,
    target: usize,
    num_qubits: usize,
) -> Result<(Array2<Complex64>, Array2<Complex64>), TwirlError> {
    if item >= NUM_RC_CX {
        return Err(TwirlError::DressingOutOfRange(item));
    }

    let control = clamp_qubit(control, num_qubits);
    let target = clamp_qubit(target, num_qubits);

    let mut left = vec![Pauli::I; num_qubits];
    let mut right = vec![Pauli::I; num_qubits];

    left[control] = RC_LEFT[item].0;
    right[control] = RC_RIGHT[item].0;

    left[target] = RC_LEFT[item].1;
    right[target] = RC_RIGHT[item].1;

    let to_matrix = |paulis: Vec<Pauli>| {
        let factors: Vec<_> = paulis.into_iter().map(|p| p.matrix().clone()).collect();
        utils::kron_chain(&factors)
    };

    Ok((to_matrix(left), to_matrix(right)))
}

/// Averages `oper` over the 16 CNOT dressings, $\frac{1}{16}\sum_k
/// L(\text{left}_k)\, O\, L(\text{right}_k)$.
pub fn two_qubit_rc_dress(
    oper: &Array2<Complex64>,
    control: usize,
    target: usize,
    num_qubits: usize,
) -> Result<Array2<Complex64>, TwirlError> {
    let dim = 1 << (2 * num_qubits);
    check_superoperator(oper, dim)?;

    let mut dressed = Array2::<Complex64>::zeros((dim, dim));
    for item in 0..NUM_RC_CX {
        let (left, right) = rc_dressing(item, control, target, num_qubits)?;
        dressed = dressed
            + utils::to_liouville(&left)
                .dot(oper)
                .dot(&utils::to_liouville(&right));
    }

    let scale = Complex64::new(1.0 / NUM_RC_CX as f64, 0.0);
    Ok(dressed.mapv(|v| v * scale))
}

impl CxGate {
    /// Dresses a superoperator of this CNOT with randomized-compiling gates.
    pub fn dress_by_rc_gate(
        &self,
        oper: &Array2<Complex64>,
    ) -> Result<Array2<Complex64>, TwirlError> {
        two_qubit_rc_dress(oper, self.control(), self.target(), self.num_qubits())
    }
}

fn check_superoperator(oper: &Array2<Complex64>, dim: usize) -> Result<(), TwirlError> {
    let (rows, cols) = oper.dim();
    if rows != dim || cols != dim {
        return Err(TwirlError::DimensionMismatch {
            expected: dim,
            got_rows: rows,
            got_cols: cols,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::channels::Direction;
    use crate::core::utils::approx_eq;

    fn noisy_cx() -> (CxGate, Array2<Complex64>) {
        let cx = CxGate::new(2, 1, 0).unwrap();
        let noisy = cx.apply_channel_in_ls(0.05).unwrap();
        let oper = cx.add_coherent_error(Direction::Forward, 0.1, 0.07, &noisy);
        (cx, oper)
    }

    #[test]
    fn twirl_is_idempotent() {
        let (_, oper) = noisy_cx();
        let once = pauli_twirl_project(&oper, 2).unwrap();
        let twice = pauli_twirl_project(&once, 2).unwrap();
        assert!(approx_eq(&once, &twice, 1e-12));
    }

    #[test]
    fn twirl_fixes_identity() {
        let eye = Array2::<Complex64>::eye(16);
        let out = pauli_twirl_project(&eye, 2).unwrap();
        assert!(approx_eq(&out, &eye, 1e-12));
    }

    #[test]
    fn twirl_of_unitary_is_diagonal_in_pauli_basis() {
        // a single-qubit X rotation twirls to a channel that leaves
        // |0><0| with survival cos^2(theta)
        let theta: f64 = 0.3;
        let h = Pauli::X.matrix().mapv(|v| v * theta);
        let rot = utils::to_liouville(&utils::hermitian_exp_i(&h));
        let out = pauli_twirl_project(&rot, 1).unwrap();
        assert!((out[[0, 0]].re - theta.cos().powi(2)).abs() < 1e-12);
        assert!(out[[0, 1]].norm() < 1e-12);
        assert!(out[[0, 2]].norm() < 1e-12);
    }

    #[test]
    fn twirl_rejects_wrong_dimension() {
        let err = pauli_twirl_project(&Array2::eye(4), 2).unwrap_err();
        assert_eq!(
            err,
            TwirlError::DimensionMismatch {
                expected: 16,
                got_rows: 4,
                got_cols: 4
            }
        );
    }

    #[test]
    fn rc_tables_preserve_cnot() {
        for (control, target) in [(0, 1), (1, 0)] {
            let cx = CxGate::new(2, control, target).unwrap().matrix();
            for item in 0..NUM_RC_CX {
                let (left, right) = rc_dressing(item, control, target, 2).unwrap();
                let dressed = left.dot(&cx).dot(&right);
                let plus = approx_eq(&dressed, &cx, 1e-12);
                let minus = approx_eq(&dressed, &cx.mapv(|v| -v), 1e-12);
                assert!(plus || minus, "entry {item} breaks the CNOT");
            }
        }
    }

    #[test]
    fn rc_dress_leaves_ideal_cnot_unchanged() {
        let cx = CxGate::new(3, 2, 0).unwrap();
        let ideal = cx.liouville_matrix();
        let dressed = cx.dress_by_rc_gate(&ideal).unwrap();
        assert!(approx_eq(&dressed, &ideal, 1e-12));
    }

    #[test]
    fn rc_dress_is_idempotent() {
        let (cx, oper) = noisy_cx();
        let once = cx.dress_by_rc_gate(&oper).unwrap();
        let twice = cx.dress_by_rc_gate(&once).unwrap();
        assert!(approx_eq(&once, &twice, 1e-12));
    }

    #[test]
    fn clamping_keeps_valid_indices() {
        // n = 2: index 1 is already the last qubit and stays 1
        assert_eq!(clamp_qubit(0, 2), 0);
        assert_eq!(clamp_qubit(1, 2), 1);
        assert_eq!(clamp_qubit(3, 2), 1);
        assert_eq!(clamp_qubit(7, 4), 3);
    }

    #[test]
    fn clamped_dressing_collapses_onto_last_qubit() {
        // control 5 clamps to qubit 1, the same slot as the target, so the
        // target's Pauli overwrites it
        let (left, right) = rc_dressing(5, 5, 1, 2).unwrap();
        let expected_left = utils::kron_chain(&[
            Pauli::I.matrix().clone(),
            RC_LEFT[5].1.matrix().clone(),
        ]);
        let expected_right = utils::kron_chain(&[
            Pauli::I.matrix().clone(),
            RC_RIGHT[5].1.matrix().clone(),
        ]);
        assert!(approx_eq(&left, &expected_left, 1e-15));
        assert!(approx_eq(&right, &expected_right, 1e-15));
    }

    #[test]
    fn dressing_index_out_of_range() {
        assert_eq!(
            rc_dressing(16, 0, 1, 2).unwrap_err(),
            TwirlError::DressingOutOfRange(16)
        );
    }
}
