//! Error-budget decomposition from survival probabilities.
//!
//! A round trip (backward · forward) of the circuit-under-test is applied
//! once and twice to the initial state. The overlaps with the initial state
//! feed a series expansion whose value is the incoherent infidelity. Four
//! variants of the round trip (with and without CNOT randomized compiling,
//! with and without a full Pauli twirl) separate the error into
//! controllable coherent, uncontrollable coherent, Pauli and native parts.

use crate::circuit::CircuitUnderTest;
use crate::core::errors::DecompositionError;
use crate::core::state::LiouvilleState;
use crate::core::twirling::pauli_twirl_project;
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::{debug, info, instrument};

/// Expansion order used by the four estimators.
pub const ESTIMATOR_ORDER: usize = 2;

/// Coefficient of the k-th survival probability in an order-`order` expansion.
///
/// For `k = 0` this is `2 - 1/order`; otherwise
/// `(-1)^k · (2(2·order - 1)/order) · (order!)^2 / ((order-k)! (order+k)!)`.
///
/// # Errors
///
/// Fails with `InvalidOrder` for `order == 0` and with
/// `CoefficientOutOfRange` for `k > order`.
pub fn series_coefficient(order: usize, k: usize) -> Result<f64, DecompositionError> {
    if order == 0 {
        return Err(DecompositionError::InvalidOrder);
    }
    if k > order {
        return Err(DecompositionError::CoefficientOutOfRange { order, k });
    }

    let n = order as f64;
    if k == 0 {
        return Ok(2.0 - 1.0 / n);
    }

    let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
    let prefactor = 2.0 * (2.0 * n - 1.0) / n;
    let ratio = factorial(order).powi(2) / (factorial(order - k) * factorial(order + k));
    Ok(sign * prefactor * ratio)
}

fn factorial(n: usize) -> f64 {
    (1..=n).map(|i| i as f64).product()
}

/// Incoherent infidelity $\sum_{k=0}^{order} c_k \, s_k$.
///
/// # Errors
///
/// Fails if `order` is zero or if fewer than `order + 1` survival
/// probabilities are given.
pub fn incoherent_infidelity(
    order: usize,
    survival_probs: &[f64],
) -> Result<f64, DecompositionError> {
    if order == 0 {
        return Err(DecompositionError::InvalidOrder);
    }
    if survival_probs.len() < order + 1 {
        return Err(DecompositionError::InsufficientSurvivalProbabilities {
            order,
            required: order + 1,
            got: survival_probs.len(),
        });
    }

    survival_probs
        .iter()
        .take(order + 1)
        .enumerate()
        .map(|(k, s)| series_coefficient(order, k).map(|c| c * s))
        .sum()
}

/// The four resolved contributions to the error budget.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ErrorComponents {
    pub controllable: f64,
    pub uncontrollable: f64,
    pub pauli: f64,
    pub native: f64,
}

/// Resolves the estimator outputs into error components.
///
/// `a1`: Pauli + total coherent, `a2`: Pauli + uncontrollable coherent,
/// `a3`: Pauli only, `a4`: native. Assumes the contributions are small
/// and add independently.
pub fn resolve_components(a1: f64, a2: f64, a3: f64, a4: f64) -> ErrorComponents {
    ErrorComponents {
        controllable: a1 - a3 / 2.0 - a2 / 2.0,
        uncontrollable: (a2 - a3) / 2.0,
        pauli: a3,
        native: a4,
    }
}

/// One point of a parameter sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Value of the swept parameter.
    pub parameter: f64,
    pub components: ErrorComponents,
    /// Raw Pauli + total coherent estimate.
    pub pauli_and_total_coh: f64,
    /// Raw Pauli + uncontrollable coherent estimate.
    pub pauli_and_unc_coh: f64,
}

/// Drives the error decomposition of a circuit-under-test.
#[derive(Debug)]
pub struct ErrorDecomposition<C: CircuitUnderTest> {
    initial_state: LiouvilleState,
    circuit: C,
}

impl<C: CircuitUnderTest> ErrorDecomposition<C> {
    /// # Errors
    ///
    /// Fails if the state and the circuit disagree on the qubit count.
    pub fn new(initial_state: LiouvilleState, circuit: C) -> Result<Self, DecompositionError> {
        if initial_state.num_qubits != circuit.num_qubits() {
            return Err(DecompositionError::QubitCountMismatch {
                state_qubits: initial_state.num_qubits,
                circuit_qubits: circuit.num_qubits(),
            });
        }
        Ok(Self {
            initial_state,
            circuit,
        })
    }

    pub fn circuit(&self) -> &C {
        &self.circuit
    }

    /// Mutable access for adjusting error parameters between runs.
    pub fn circuit_mut(&mut self) -> &mut C {
        &mut self.circuit
    }

    pub fn initial_state(&self) -> &LiouvilleState {
        &self.initial_state
    }

    pub fn into_circuit(self) -> C {
        self.circuit
    }

    /// Survival probabilities $\langle\rho_0,\rho_0\rangle$,
    /// $\langle\rho_0, C_1\rho_0\rangle$, $\langle\rho_0, C_2\rho_0\rangle$.
    fn survival_probabilities(
        &self,
        first: &Array2<Complex64>,
        second: &Array2<Complex64>,
    ) -> Result<Vec<f64>, DecompositionError> {
        let rho_0 = &self.initial_state;
        let rho_1 = rho_0.evolve(first)?;
        let rho_2 = rho_0.evolve(second)?;

        Ok(vec![
            rho_0.overlap(rho_0)?.re,
            rho_0.overlap(&rho_1)?.re,
            rho_0.overlap(&rho_2)?.re,
        ])
    }

    fn estimate(
        &self,
        first: &Array2<Complex64>,
        second: &Array2<Complex64>,
    ) -> Result<f64, DecompositionError> {
        let probs = self.survival_probabilities(first, second)?;
        debug!(?probs, "survival probabilities");
        incoherent_infidelity(ESTIMATOR_ORDER, &probs)
    }

    fn round_trip(&self) -> Result<Array2<Complex64>, DecompositionError> {
        let forward = self.circuit.forward_circuit()?;
        let backward = self.circuit.backward_circuit()?;
        Ok(backward.dot(&forward))
    }

    /// Incoherent infidelity with CNOT randomized compiling: total coherent
    /// error plus Pauli error.
    #[instrument(skip_all)]
    pub fn pauli_and_total_coh_error(&self) -> Result<f64, DecompositionError> {
        let forward = self.circuit.forward_circuit_with_rc()?;
        let backward = self.circuit.backward_circuit_with_rc()?;
        let combined_rc = backward.dot(&forward);
        let squared = combined_rc.dot(&combined_rc);

        let value = self.estimate(&combined_rc, &squared)?;
        debug!(value, "pauli and total coherent error");
        Ok(value)
    }

    /// Incoherent infidelity of the twirled round trip: uncontrollable
    /// coherent error plus Pauli error.
    #[instrument(skip_all)]
    pub fn pauli_and_unc_coh_error(&self) -> Result<f64, DecompositionError> {
        let combined = self.round_trip()?;
        let twirled = pauli_twirl_project(&combined, self.circuit.num_qubits())?;
        let squared = twirled.dot(&twirled);

        let value = self.estimate(&twirled, &squared)?;
        debug!(value, "pauli and uncontrollable coherent error");
        Ok(value)
    }

    /// Incoherent infidelity with each power of the round trip twirled on
    /// its own: Pauli error only.
    #[instrument(skip_all)]
    pub fn pauli_error(&self) -> Result<f64, DecompositionError> {
        let n = self.circuit.num_qubits();
        let combined = self.round_trip()?;
        let squared = combined.dot(&combined);

        let twirled = pauli_twirl_project(&combined, n)?;
        let twirled_squared = pauli_twirl_project(&squared, n)?;

        let value = self.estimate(&twirled, &twirled_squared)?;
        debug!(value, "pauli error");
        Ok(value)
    }

    /// Incoherent infidelity of the bare round trip.
    #[instrument(skip_all)]
    pub fn native_error(&self) -> Result<f64, DecompositionError> {
        let combined = self.round_trip()?;
        let squared = combined.dot(&combined);

        let value = self.estimate(&combined, &squared)?;
        debug!(value, "native error");
        Ok(value)
    }

    /// Runs all four estimators and resolves them into components.
    pub fn decompose(&self) -> Result<ErrorComponents, DecompositionError> {
        Ok(self.decompose_with_raw()?.0)
    }

    fn decompose_with_raw(&self) -> Result<(ErrorComponents, f64, f64), DecompositionError> {
        let a1 = self.pauli_and_total_coh_error()?;
        let a2 = self.pauli_and_unc_coh_error()?;
        let a3 = self.pauli_error()?;
        let a4 = self.native_error()?;
        Ok((resolve_components(a1, a2, a3, a4), a1, a2))
    }

    /// Trades controllable for uncontrollable coherent error at a fixed total.
    ///
    /// With `θmax = π · uncontrollable` taken from the current parameters,
    /// each step sets `uncontrollable = θ` and `controllable = θmax - θ` for
    /// `θ` evenly spaced over `[0, θmax]`. The circuit's parameters are
    /// restored afterwards.
    #[instrument(skip(self))]
    pub fn sweep_coherent_split(
        &mut self,
        steps: usize,
    ) -> Result<Vec<SweepPoint>, DecompositionError> {
        let saved = *self.circuit.parameters();
        let max_angle = saved.uncontrollable_coherent_error * PI;

        let mut points = Vec::with_capacity(steps);
        let mut outcome = Ok(());
        for &theta in Array1::linspace(0.0, max_angle, steps).iter() {
            self.circuit.set_controllable_coherent_error(max_angle - theta);
            self.circuit.set_uncontrollable_coherent_error(theta);
            match self.sweep_point(theta) {
                Ok(point) => points.push(point),
                Err(err) => {
                    outcome = Err(err);
                    break;
                }
            }
        }

        *self.circuit.parameters_mut() = saved;
        outcome.map(|()| points)
    }

    /// Sweeps the two-qubit damping strength over `[0, p_max]`, where
    /// `p_max` is the current `two_qubit_error`. The circuit's parameters
    /// are restored afterwards.
    #[instrument(skip(self))]
    pub fn sweep_two_qubit_error(
        &mut self,
        steps: usize,
    ) -> Result<Vec<SweepPoint>, DecompositionError> {
        let saved = *self.circuit.parameters();

        let mut points = Vec::with_capacity(steps);
        let mut outcome = Ok(());
        for &p in Array1::linspace(0.0, saved.two_qubit_error, steps).iter() {
            self.circuit.set_two_qubit_error(p);
            match self.sweep_point(p) {
                Ok(point) => points.push(point),
                Err(err) => {
                    outcome = Err(err);
                    break;
                }
            }
        }

        *self.circuit.parameters_mut() = saved;
        outcome.map(|()| points)
    }

    fn sweep_point(&self, parameter: f64) -> Result<SweepPoint, DecompositionError> {
        let (components, a1, a2) = self.decompose_with_raw()?;
        info!(
            parameter,
            controllable = components.controllable,
            uncontrollable = components.uncontrollable,
            pauli = components.pauli,
            native = components.native,
            "sweep point"
        );
        Ok(SweepPoint {
            parameter,
            components,
            pauli_and_total_coh: a1,
            pauli_and_unc_coh: a2,
        })
    }
}
