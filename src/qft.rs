//! Quantum Fourier transform as a circuit-under-test.
//!
//! Each controlled phase is decomposed as
//! `Rz(c, +) · CX · Rz(c, -) · CX · Rz(t, +)`, and every CX carries
//! amplitude damping and coherent error. The backward circuit is the exact
//! inverse of the forward one, so a noiseless round trip is the identity.

use crate::circuit::{CircuitUnderTest, ErrorParameters};
use crate::core::channels::Direction;
use crate::core::errors::CircuitError;
use crate::core::gates::{
    CoherentErrorAxes, CxGate, EntanglerMatrix, ExpandedCnot, IdentityGate, QuantumGate,
    RotationSign, ZRotation, hadamard,
};
use crate::core::utils;
use ndarray::Array2;
use num_complex::Complex64;
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub struct QuantumFourierTransform {
    num_qubits: usize,
    params: ErrorParameters,
    controllable_axes: CoherentErrorAxes,
    uncontrollable_axes: CoherentErrorAxes,
    entangler: Arc<dyn EntanglerMatrix>,
}

impl QuantumFourierTransform {
    /// QFT on `num_qubits` qubits with the default error budget.
    pub fn new(num_qubits: usize) -> Result<Self, CircuitError> {
        Self::with_parameters(num_qubits, ErrorParameters::default())
    }

    pub fn with_parameters(
        num_qubits: usize,
        params: ErrorParameters,
    ) -> Result<Self, CircuitError> {
        if num_qubits == 0 {
            return Err(CircuitError::TooFewQubits { min: 1, got: 0 });
        }

        Ok(Self {
            num_qubits,
            params,
            controllable_axes: CoherentErrorAxes::default(),
            uncontrollable_axes: CoherentErrorAxes::default(),
            entangler: Arc::new(ExpandedCnot),
        })
    }

    /// Replaces the CNOT matrix provider.
    pub fn with_entangler(mut self, entangler: Arc<dyn EntanglerMatrix>) -> Self {
        self.entangler = entangler;
        self
    }

    /// Replaces the rotation axes of the coherent errors on every CNOT.
    pub fn with_coherent_axes(
        mut self,
        controllable: CoherentErrorAxes,
        uncontrollable: CoherentErrorAxes,
    ) -> Self {
        self.controllable_axes = controllable;
        self.uncontrollable_axes = uncontrollable;
        self
    }

    fn z_rotation(
        &self,
        theta: f64,
        sign: RotationSign,
        target: usize,
    ) -> Result<Array2<Complex64>, CircuitError> {
        Ok(ZRotation::new(self.num_qubits, theta, sign, target)?.liouville_matrix())
    }

    /// Noisy controlled phase between `control` and `target` in Liouville space.
    fn apply_gates(
        &self,
        target: usize,
        control: usize,
        rn: f64,
        direction: Direction,
        with_rc: bool,
    ) -> Result<Array2<Complex64>, CircuitError> {
        let z_rot_bef = self.z_rotation(rn, RotationSign::Positive, target)?;
        let z_inv_rot_bef = self.z_rotation(rn, RotationSign::Negative, target)?;

        let mut cx =
            CxGate::with_provider(self.num_qubits, control, target, self.entangler.clone())?;
        cx.set_rotation_as_coherent_error(self.controllable_axes, self.uncontrollable_axes);

        let cx_adc = cx.apply_channel_in_ls(self.params.two_qubit_error)?;
        let mut cx_err = cx.add_coherent_error(
            direction,
            self.params.controllable_coherent_error,
            self.params.uncontrollable_coherent_error,
            &cx_adc,
        );
        if with_rc {
            cx_err = cx.dress_by_rc_gate(&cx_err)?;
        }

        let z_inv_rot_aft = self.z_rotation(rn, RotationSign::Negative, control)?;
        let z_rot_aft = self.z_rotation(rn, RotationSign::Positive, control)?;

        Ok(match direction {
            Direction::Backward => z_inv_rot_bef
                .dot(&cx_err)
                .dot(&z_rot_aft)
                .dot(&cx_err)
                .dot(&z_inv_rot_aft),
            Direction::Forward => z_rot_aft
                .dot(&cx_err)
                .dot(&z_inv_rot_aft)
                .dot(&cx_err)
                .dot(&z_rot_bef),
        })
    }

    fn hadamard_on(&self, qubit: usize) -> Result<Array2<Complex64>, CircuitError> {
        let h = utils::embed_single_qubit(hadamard(), qubit, self.num_qubits)?;
        Ok(utils::to_liouville(&h))
    }

    fn build_qft_block(
        &self,
        last_q: usize,
        target_q: usize,
        with_rc: bool,
    ) -> Result<Array2<Complex64>, CircuitError> {
        let mut qft = IdentityGate::new(self.num_qubits).liouville_matrix();
        for i in 0..(last_q - target_q) {
            let control = target_q + 1 + i;
            let rn = PI / 2f64.powi(2 + i as i32);
            qft = self
                .apply_gates(target_q, control, rn, Direction::Forward, with_rc)?
                .dot(&qft);
        }
        Ok(qft)
    }

    fn build_inverse_qft_block(
        &self,
        last_q: usize,
        target_q: usize,
        with_rc: bool,
    ) -> Result<Array2<Complex64>, CircuitError> {
        let mut qft_i = IdentityGate::new(self.num_qubits).liouville_matrix();
        for i in 0..(last_q - target_q) {
            let control = last_q - i;
            let rn = PI / 2f64.powi((self.num_qubits - target_q - i) as i32);
            qft_i = self
                .apply_gates(target_q, control, rn, Direction::Backward, with_rc)?
                .dot(&qft_i);
        }
        Ok(qft_i)
    }

    fn compute_qft(&self, with_rc: bool) -> Result<Array2<Complex64>, CircuitError> {
        let last = self.num_qubits - 1;
        let mut qft = IdentityGate::new(self.num_qubits).liouville_matrix();
        for i in 0..self.num_qubits {
            qft = self.build_qft_block(last, i, with_rc)?.dot(&qft);
            qft = self.hadamard_on(i)?.dot(&qft);
        }
        debug!(num_qubits = self.num_qubits, with_rc, "assembled forward QFT");
        Ok(qft)
    }

    fn compute_inverse_qft(&self, with_rc: bool) -> Result<Array2<Complex64>, CircuitError> {
        let last = self.num_qubits - 1;
        let mut qft_i = IdentityGate::new(self.num_qubits).liouville_matrix();
        for i in (0..self.num_qubits).rev() {
            qft_i = self.hadamard_on(i)?.dot(&qft_i);
            qft_i = self.build_inverse_qft_block(last, i, with_rc)?.dot(&qft_i);
        }
        debug!(num_qubits = self.num_qubits, with_rc, "assembled inverse QFT");
        Ok(qft_i)
    }
}

impl CircuitUnderTest for QuantumFourierTransform {
    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn forward_circuit(&self) -> Result<Array2<Complex64>, CircuitError> {
        self.compute_qft(false)
    }

    fn backward_circuit(&self) -> Result<Array2<Complex64>, CircuitError> {
        self.compute_inverse_qft(false)
    }

    fn forward_circuit_with_rc(&self) -> Result<Array2<Complex64>, CircuitError> {
        self.compute_qft(true)
    }

    fn backward_circuit_with_rc(&self) -> Result<Array2<Complex64>, CircuitError> {
        self.compute_inverse_qft(true)
    }

    fn parameters(&self) -> &ErrorParameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut ErrorParameters {
        &mut self.params
    }
}

impl fmt::Debug for QuantumFourierTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuantumFourierTransform")
            .field("num_qubits", &self.num_qubits)
            .field("params", &self.params)
            .field("controllable_axes", &self.controllable_axes)
            .field("uncontrollable_axes", &self.uncontrollable_axes)
            .finish_non_exhaustive()
    }
}
