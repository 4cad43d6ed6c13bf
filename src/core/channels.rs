//! Noise channels in Liouville space.
//!
//! Amplitude damping is built from its Kraus operators; coherent errors are
//! unitary rotations generated by Pauli strings and composed with a gate's
//! noisy superoperator.

use crate::core::errors::ChannelError;
use crate::core::gates::{CoherentErrorAxes, CxGate, Pauli, QuantumGate};
use crate::core::utils;
use ndarray::{Array2, array};
use num_complex::Complex64;

/// Role a qubit plays in a two-qubit gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QubitRole {
    Control,
    Target,
    Spectator,
}

/// Which pass of a round trip a gate belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Builds the per-qubit role table of a two-qubit gate.
pub fn role_table(num_qubits: usize, control: usize, target: usize) -> Vec<QubitRole> {
    (0..num_qubits)
        .map(|q| {
            if q == control {
                QubitRole::Control
            } else if q == target {
                QubitRole::Target
            } else {
                QubitRole::Spectator
            }
        })
        .collect()
}

/// Pauli string selecting `axes.control` on the control, `axes.target` on
/// the target and identity on spectators.
pub fn role_generator(roles: &[QubitRole], axes: CoherentErrorAxes) -> Array2<Complex64> {
    let factors: Vec<_> = roles
        .iter()
        .map(|role| match role {
            QubitRole::Control => axes.control,
            QubitRole::Target => axes.target,
            QubitRole::Spectator => Pauli::I,
        })
        .map(|p| p.matrix().clone())
        .collect();
    utils::kron_chain(&factors)
}

/// Amplitude damping -> T1 relaxation on `site`, as a superoperator.
///
/// The channel is $\sum_k K_k \otimes \bar K_k$ over the embedded Kraus
/// operators. `p = 0` gives the identity and `p = 1` full decay.
pub fn amplitude_damping_channel(
    p: f64,
    site: usize,
    num_qubits: usize,
) -> Result<Array2<Complex64>, ChannelError> {
    validate_prob(p)?;

    let k0 = array![
        [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
        [Complex64::new(0.0, 0.0), Complex64::new((1.0 - p).sqrt(), 0.0)]
    ];

    let k1 = array![
        [Complex64::new(0.0, 0.0), Complex64::new(p.sqrt(), 0.0)],
        [Complex64::new(0.0, 0.0), Complex64::new(0.0, 0.0)]
    ];

    let decay = utils::to_liouville(&utils::embed_two_site(&k0, &k0, site, num_qubits)?);
    let jump = utils::to_liouville(&utils::embed_two_site(&k1, &k1, site, num_qubits)?);

    Ok(decay + jump)
}

/// Independent amplitude damping on both qubits of a two-qubit gate.
///
/// Returns `channel(target) · channel(control)`.
pub fn two_qubit_amplitude_damping(
    p: f64,
    control: usize,
    target: usize,
    num_qubits: usize,
) -> Result<Array2<Complex64>, ChannelError> {
    let on_target = amplitude_damping_channel(p, target, num_qubits)?;
    let on_control = amplitude_damping_channel(p, control, num_qubits)?;
    Ok(on_target.dot(&on_control))
}

impl CxGate {
    /// Applies amplitude damping with strength `p` after the ideal CNOT.
    pub fn apply_channel_in_ls(&self, p: f64) -> Result<Array2<Complex64>, ChannelError> {
        let adc = two_qubit_amplitude_damping(p, self.control(), self.target(), self.num_qubits())?;
        Ok(adc.dot(&self.liouville_matrix()))
    }

    /// Composes controllable and uncontrollable coherent errors with `channel`.
    ///
    /// The error unitary is $e^{i(s A G_c - B G_u)}$ where $s = +1$ on the
    /// forward pass and $s = -1$ on the backward pass: only the
    /// controllable part reverses with the circuit. The backward error acts
    /// after `channel`, the forward error before it.
    pub fn add_coherent_error(
        &self,
        direction: Direction,
        controllable: f64,
        uncontrollable: f64,
        channel: &Array2<Complex64>,
    ) -> Array2<Complex64> {
        let roles = role_table(self.num_qubits(), self.control(), self.target());
        let cont = role_generator(&roles, self.controllable_axes);
        let uncont = role_generator(&roles, self.uncontrollable_axes);

        let sign = match direction {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        };
        let generator =
            cont.mapv(|v| v * (sign * controllable)) - uncont.mapv(|v| v * uncontrollable);
        let error = utils::to_liouville(&utils::hermitian_exp_i(&generator));

        match direction {
            Direction::Backward => error.dot(channel),
            Direction::Forward => channel.dot(&error),
        }
    }
}

/// Validate probability parameter
fn validate_prob(p: f64) -> Result<(), ChannelError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ChannelError::InvalidProbability(p));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::utils::approx_eq;
    use ndarray::Array1;

    fn basis_vector(dim: usize, index: usize) -> Array1<Complex64> {
        let mut v = Array1::zeros(dim);
        v[index] = Complex64::new(1.0, 0.0);
        v
    }

    #[test]
    fn zero_damping_is_identity() {
        let channel = amplitude_damping_channel(0.0, 1, 2).unwrap();
        assert!(approx_eq(&channel, &Array2::eye(16), 1e-15));
    }

    #[test]
    fn full_damping_relaxes_excited_qubit() {
        // single qubit: |1><1| is index 3, |0><0| is index 0
        let channel = amplitude_damping_channel(1.0, 0, 1).unwrap();
        let out = channel.dot(&basis_vector(4, 3));
        assert!((out[0] - Complex64::new(1.0, 0.0)).norm() < 1e-15);
        assert!(out.iter().skip(1).all(|v| v.norm() < 1e-15));
    }

    #[test]
    fn two_qubit_damping_relaxes_both_sites() {
        let channel = two_qubit_amplitude_damping(1.0, 0, 1, 2).unwrap();
        let out = channel.dot(&basis_vector(16, 15));
        assert!((out[0] - Complex64::new(1.0, 0.0)).norm() < 1e-15);
        assert!(out.iter().skip(1).all(|v| v.norm() < 1e-15));
    }

    #[test]
    fn damping_preserves_trace() {
        let p = 0.3;
        let channel = amplitude_damping_channel(p, 0, 1).unwrap();
        let out = channel.dot(&basis_vector(4, 3));
        let trace = out[0] + out[3];
        assert!((trace - Complex64::new(1.0, 0.0)).norm() < 1e-12);
        assert!((out[0].re - p).abs() < 1e-12);
    }

    #[test]
    fn damping_rejects_invalid_probability() {
        assert_eq!(
            amplitude_damping_channel(1.5, 0, 1).unwrap_err(),
            ChannelError::InvalidProbability(1.5)
        );
        assert!(amplitude_damping_channel(-0.1, 0, 1).is_err());
    }

    #[test]
    fn role_table_marks_control_and_target() {
        assert_eq!(
            role_table(3, 2, 0),
            vec![QubitRole::Target, QubitRole::Spectator, QubitRole::Control]
        );
    }

    #[test]
    fn controllable_error_cancels_over_round_trip() {
        let cx = CxGate::new(2, 1, 0).unwrap();
        let ideal = cx.liouville_matrix();
        let forward = cx.add_coherent_error(Direction::Forward, 0.2, 0.0, &ideal);
        let backward = cx.add_coherent_error(Direction::Backward, 0.2, 0.0, &ideal);
        // backward·forward = L(e^{-iAG}) L(CX) L(CX) L(e^{iAG}) = identity
        assert!(approx_eq(&backward.dot(&forward), &Array2::eye(16), 1e-12));
    }

    #[test]
    fn uncontrollable_error_accumulates_over_round_trip() {
        let cx = CxGate::new(2, 1, 0).unwrap();
        let ideal = cx.liouville_matrix();
        let forward = cx.add_coherent_error(Direction::Forward, 0.0, 0.2, &ideal);
        let backward = cx.add_coherent_error(Direction::Backward, 0.0, 0.2, &ideal);
        assert!(!approx_eq(&backward.dot(&forward), &Array2::eye(16), 1e-6));
    }

    fn coherent_unitary(
        roles: &[QubitRole],
        cont_axes: CoherentErrorAxes,
        uncont_axes: CoherentErrorAxes,
        a: f64,
        b: f64,
    ) -> Array2<Complex64> {
        let generator = role_generator(roles, cont_axes).mapv(|v| v * a)
            - role_generator(roles, uncont_axes).mapv(|v| v * b);
        utils::to_liouville(&utils::hermitian_exp_i(&generator))
    }

    #[test]
    fn coherent_error_composes_on_the_pass_specific_side() {
        let cont_axes = CoherentErrorAxes {
            control: Pauli::X,
            target: Pauli::Y,
        };
        let uncont_axes = CoherentErrorAxes {
            control: Pauli::Z,
            target: Pauli::X,
        };
        let mut cx = CxGate::new(2, 0, 1).unwrap();
        cx.set_rotation_as_coherent_error(cont_axes, uncont_axes);
        let (a, b) = (0.13, 0.07);

        let noisy = cx.apply_channel_in_ls(0.1).unwrap();
        let roles = role_table(2, 0, 1);

        // forward: channel · L(exp(i(aGc - bGu)))
        let forward_err = coherent_unitary(&roles, cont_axes, uncont_axes, a, b);
        let forward = cx.add_coherent_error(Direction::Forward, a, b, &noisy);
        assert!(approx_eq(&forward, &noisy.dot(&forward_err), 1e-12));
        assert!(!approx_eq(&forward, &forward_err.dot(&noisy), 1e-6));

        // backward: L(exp(i(-aGc - bGu))) · channel
        let backward_err = coherent_unitary(&roles, cont_axes, uncont_axes, -a, b);
        let backward = cx.add_coherent_error(Direction::Backward, a, b, &noisy);
        assert!(approx_eq(&backward, &backward_err.dot(&noisy), 1e-12));
        assert!(!approx_eq(&backward, &noisy.dot(&backward_err), 1e-6));
    }

    #[test]
    fn zero_coherent_error_leaves_channel_unchanged() {
        let cx = CxGate::new(2, 0, 1).unwrap();
        let noisy = cx.apply_channel_in_ls(0.1).unwrap();
        for direction in [Direction::Forward, Direction::Backward] {
            let out = cx.add_coherent_error(direction, 0.0, 0.0, &noisy);
            assert!(approx_eq(&out, &noisy, 1e-12));
        }
    }
}
