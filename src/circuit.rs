//! The circuit-under-test interface.
//!
//! The decomposition engine only needs the four round-trip halves of a
//! circuit and a mutable set of error parameters.

use crate::core::errors::CircuitError;
use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Error strengths attached to a circuit-under-test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorParameters {
    /// Coherent rotation angle that reverses with the circuit direction.
    pub controllable_coherent_error: f64,
    /// Coherent rotation angle that does not reverse.
    pub uncontrollable_coherent_error: f64,
    /// Average single-qubit error. Carried for completeness; no
    /// single-qubit channel consumes it yet.
    pub one_qubit_error: f64,
    /// Amplitude-damping strength on each qubit of every CNOT, in [0, 1].
    pub two_qubit_error: f64,
}

impl Default for ErrorParameters {
    fn default() -> Self {
        Self {
            controllable_coherent_error: 0.015,
            uncontrollable_coherent_error: 0.012,
            one_qubit_error: 0.0,
            two_qubit_error: 0.001,
        }
    }
}

impl ErrorParameters {
    /// All error sources switched off.
    pub fn noiseless() -> Self {
        Self {
            controllable_coherent_error: 0.0,
            uncontrollable_coherent_error: 0.0,
            one_qubit_error: 0.0,
            two_qubit_error: 0.0,
        }
    }
}

/// A circuit whose forward and backward halves form a round trip.
///
/// Every method returns a $4^n \times 4^n$ Liouville superoperator built
/// from the current [`ErrorParameters`].
pub trait CircuitUnderTest {
    fn num_qubits(&self) -> usize;

    fn forward_circuit(&self) -> Result<Array2<Complex64>, CircuitError>;

    fn backward_circuit(&self) -> Result<Array2<Complex64>, CircuitError>;

    fn forward_circuit_with_rc(&self) -> Result<Array2<Complex64>, CircuitError>;

    fn backward_circuit_with_rc(&self) -> Result<Array2<Complex64>, CircuitError>;

    fn parameters(&self) -> &ErrorParameters;

    fn parameters_mut(&mut self) -> &mut ErrorParameters;

    fn controllable_coherent_error(&self) -> f64 {
        self.parameters().controllable_coherent_error
    }

    fn set_controllable_coherent_error(&mut self, value: f64) {
        self.parameters_mut().controllable_coherent_error = value;
    }

    fn uncontrollable_coherent_error(&self) -> f64 {
        self.parameters().uncontrollable_coherent_error
    }

    fn set_uncontrollable_coherent_error(&mut self, value: f64) {
        self.parameters_mut().uncontrollable_coherent_error = value;
    }

    fn one_qubit_error(&self) -> f64 {
        self.parameters().one_qubit_error
    }

    fn set_one_qubit_error(&mut self, value: f64) {
        self.parameters_mut().one_qubit_error = value;
    }

    fn two_qubit_error(&self) -> f64 {
        self.parameters().two_qubit_error
    }

    fn set_two_qubit_error(&mut self, value: f64) {
        self.parameters_mut().two_qubit_error = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_budget() {
        let params = ErrorParameters::default();
        assert_eq!(params.controllable_coherent_error, 0.015);
        assert_eq!(params.uncontrollable_coherent_error, 0.012);
        assert_eq!(params.one_qubit_error, 0.0);
        assert_eq!(params.two_qubit_error, 0.001);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let params: ErrorParameters = serde_json::from_str(r#"{"two_qubit_error": 0.02}"#).unwrap();
        assert_eq!(params.two_qubit_error, 0.02);
        assert_eq!(params.controllable_coherent_error, 0.015);
    }
}
