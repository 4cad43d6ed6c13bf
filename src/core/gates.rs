use crate::core::errors::GateError;
use crate::core::utils;
use ndarray::{Array2, arr2};
use num_complex::Complex64;
use std::fmt;
use std::sync::{Arc, LazyLock};

static PAULI_MATRICES: LazyLock<[Array2<Complex64>; 4]> = LazyLock::new(|| {
    let zero = Complex64::new(0.0, 0.0);
    let one = Complex64::new(1.0, 0.0);
    let i = Complex64::new(0.0, 1.0);
    [
        arr2(&[[one, zero], [zero, one]]),
        arr2(&[[zero, one], [one, zero]]),
        arr2(&[[zero, -i], [i, zero]]),
        arr2(&[[one, zero], [zero, -one]]),
    ]
});

static HADAMARD: LazyLock<Array2<Complex64>> = LazyLock::new(|| {
    let factor = Complex64::new(1.0 / 2.0_f64.sqrt(), 0.0);
    arr2(&[[factor, factor], [factor, -factor]])
});

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pauli {
    I,
    X,
    Y,
    Z,
}

impl Pauli {
    pub const ALL: [Pauli; 4] = [Pauli::I, Pauli::X, Pauli::Y, Pauli::Z];

    /// The 2x2 matrix of this Pauli.
    pub fn matrix(self) -> &'static Array2<Complex64> {
        &PAULI_MATRICES[self as usize]
    }

    /// Pauli selected by a base-4 digit.
    pub fn from_digit(digit: usize) -> Pauli {
        Self::ALL[digit % 4]
    }
}

/// The Hadamard matrix.
pub fn hadamard() -> &'static Array2<Complex64> {
    &HADAMARD
}

/// A gate acting on an n-qubit register.
///
/// Implementors supply the Hilbert-space matrix; the Liouville matrix is
/// always derived from it.
pub trait QuantumGate {
    /// Size of the register the matrix acts on.
    fn num_qubits(&self) -> usize;

    /// The $2^n \times 2^n$ unitary of the gate.
    fn matrix(&self) -> Array2<Complex64>;

    /// The $4^n \times 4^n$ superoperator `kron(M, conj(M))`.
    fn liouville_matrix(&self) -> Array2<Complex64> {
        utils::to_liouville(&self.matrix())
    }
}

/// Identity on n qubits.
#[derive(Debug, Clone, Copy)]
pub struct IdentityGate {
    pub num_qubits: usize,
}

impl IdentityGate {
    pub fn new(num_qubits: usize) -> Self {
        Self { num_qubits }
    }
}

impl QuantumGate for IdentityGate {
    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn matrix(&self) -> Array2<Complex64> {
        let factors = vec![Array2::eye(2); self.num_qubits];
        utils::kron_chain(&factors)
    }
}

/// Direction of a Z rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationSign {
    Positive,
    Negative,
}

impl RotationSign {
    pub fn value(self) -> f64 {
        match self {
            RotationSign::Positive => 1.0,
            RotationSign::Negative => -1.0,
        }
    }
}

/// Z rotation `diag(e^{-i s θ/2}, e^{i s θ/2})` on a single qubit.
#[derive(Debug, Clone, Copy)]
pub struct ZRotation {
    num_qubits: usize,
    theta: f64,
    sign: RotationSign,
    target: usize,
}

impl ZRotation {
    pub fn new(
        num_qubits: usize,
        theta: f64,
        sign: RotationSign,
        target: usize,
    ) -> Result<Self, GateError> {
        utils::validate_qubit(target, num_qubits)?;
        Ok(Self {
            num_qubits,
            theta,
            sign,
            target,
        })
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    pub fn sign(&self) -> RotationSign {
        self.sign
    }

    pub fn target(&self) -> usize {
        self.target
    }
}

impl QuantumGate for ZRotation {
    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn matrix(&self) -> Array2<Complex64> {
        let half = self.sign.value() * self.theta / 2.0;
        let zero = Complex64::new(0.0, 0.0);
        let rz = arr2(&[
            [Complex64::from_polar(1.0, -half), zero],
            [zero, Complex64::from_polar(1.0, half)],
        ]);
        let factors: Vec<_> = (0..self.num_qubits)
            .map(|q| if q == self.target { rz.clone() } else { Array2::eye(2) })
            .collect();
        utils::kron_chain(&factors)
    }
}

/// Supplies the CNOT unitary on an n-qubit register.
///
/// The engine uses the returned matrix as given; qubit-ordering
/// conventions belong to the provider.
pub trait EntanglerMatrix: Send + Sync {
    fn cnot(&self, num_qubits: usize, control: usize, target: usize) -> Array2<Complex64>;
}

/// CNOT with control and target given as tensor positions (position 0 is
/// the most significant factor).
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpandedCnot;

impl EntanglerMatrix for ExpandedCnot {
    fn cnot(&self, num_qubits: usize, control: usize, target: usize) -> Array2<Complex64> {
        // tensor position p is bit (n - 1 - p) of the basis index
        let bit = |p: usize| num_qubits - 1 - p;
        utils::expand_operator(
            num_qubits,
            Pauli::X.matrix(),
            &[bit(target)],
            &[bit(control)],
        )
    }
}

/// Rotation axes of a coherent error on the two qubits of a CNOT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoherentErrorAxes {
    pub control: Pauli,
    pub target: Pauli,
}

impl Default for CoherentErrorAxes {
    fn default() -> Self {
        Self {
            control: Pauli::X,
            target: Pauli::Y,
        }
    }
}

/// A CNOT gate between two qubits of an n-qubit register.
#[derive(Clone)]
pub struct CxGate {
    num_qubits: usize,
    control: usize,
    target: usize,
    /// Axes of the controllable coherent error.
    pub controllable_axes: CoherentErrorAxes,
    /// Axes of the uncontrollable coherent error.
    pub uncontrollable_axes: CoherentErrorAxes,
    provider: Arc<dyn EntanglerMatrix>,
}

impl CxGate {
    /// Creates a CNOT backed by the default [`ExpandedCnot`] provider.
    pub fn new(num_qubits: usize, control: usize, target: usize) -> Result<Self, GateError> {
        Self::with_provider(num_qubits, control, target, Arc::new(ExpandedCnot))
    }

    /// Creates a CNOT whose matrix comes from `provider`.
    ///
    /// # Errors
    ///
    /// Returns `GateError` if either index is outside the register or if
    /// control and target coincide.
    pub fn with_provider(
        num_qubits: usize,
        control: usize,
        target: usize,
        provider: Arc<dyn EntanglerMatrix>,
    ) -> Result<Self, GateError> {
        utils::validate_qubit(control, num_qubits)?;
        utils::validate_qubit(target, num_qubits)?;
        if control == target {
            return Err(GateError::ControlTargetOverlap(control));
        }

        Ok(Self {
            num_qubits,
            control,
            target,
            controllable_axes: CoherentErrorAxes::default(),
            uncontrollable_axes: CoherentErrorAxes::default(),
            provider,
        })
    }

    pub fn control(&self) -> usize {
        self.control
    }

    pub fn target(&self) -> usize {
        self.target
    }

    /// Sets the rotation axes used for the controllable and uncontrollable
    /// coherent error.
    pub fn set_rotation_as_coherent_error(
        &mut self,
        controllable: CoherentErrorAxes,
        uncontrollable: CoherentErrorAxes,
    ) {
        self.controllable_axes = controllable;
        self.uncontrollable_axes = uncontrollable;
    }
}

impl QuantumGate for CxGate {
    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn matrix(&self) -> Array2<Complex64> {
        self.provider.cnot(self.num_qubits, self.control, self.target)
    }
}

impl fmt::Debug for CxGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CxGate")
            .field("num_qubits", &self.num_qubits)
            .field("control", &self.control)
            .field("target", &self.target)
            .field("controllable_axes", &self.controllable_axes)
            .field("uncontrollable_axes", &self.uncontrollable_axes)
            .finish_non_exhaustive()
    }
}
