use crate::core::errors::StateError;
use crate::core::utils;
use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// A density matrix vectorized row-major into Liouville space.
///
/// The vector has length $4^n$; entry `i * 2^n + j` holds $\rho_{ij}$.
#[derive(Clone, Debug, PartialEq)]
pub struct LiouvilleState {
    pub vector: Array1<Complex64>,
    pub num_qubits: usize,
}

impl LiouvilleState {
    /// The ground state |0...0><0...0|.
    pub fn ground(num_qubits: usize) -> Self {
        Self::basis(num_qubits, 0)
    }

    /// The fully excited state |1...1><1...1|.
    pub fn excited(num_qubits: usize) -> Self {
        Self::basis(num_qubits, (1 << (2 * num_qubits)) - 1)
    }

    fn basis(num_qubits: usize, index: usize) -> Self {
        let mut vector = Array1::<Complex64>::zeros(1 << (2 * num_qubits));
        vector[index] = Complex64::new(1.0, 0.0);

        Self { vector, num_qubits }
    }

    /// Wraps an arbitrary vectorized density matrix.
    ///
    /// Only the length is checked; trace and positivity are the caller's
    /// responsibility.
    pub fn from_vector(vector: Array1<Complex64>) -> Result<Self, StateError> {
        let len = vector.len();

        // length must be 4^n: a power of two with an even exponent
        if !len.is_power_of_two() || len.trailing_zeros() % 2 != 0 {
            return Err(StateError::InvalidDimensions(len));
        }
        let num_qubits = (len.trailing_zeros() / 2) as usize;

        Ok(Self { vector, num_qubits })
    }

    /// Applies a Liouville-space superoperator, returning the evolved state.
    pub fn evolve(&self, superop: &Array2<Complex64>) -> Result<Self, StateError> {
        let (rows, cols) = superop.dim();
        let dim = self.vector.len();

        if rows != dim || cols != dim {
            return Err(StateError::DimensionMismatch {
                expected: dim,
                got_rows: rows,
                got_cols: cols,
            });
        }

        Ok(Self {
            vector: superop.dot(&self.vector),
            num_qubits: self.num_qubits,
        })
    }

    /// Overlap $\sum_i a_i b_i$ of two vectorized states.
    ///
    /// For a basis-state `self` this is the population of that basis state
    /// in `other`.
    pub fn overlap(&self, other: &LiouvilleState) -> Result<Complex64, StateError> {
        if self.vector.len() != other.vector.len() {
            return Err(StateError::DimensionMismatch {
                expected: self.vector.len(),
                got_rows: other.vector.len(),
                got_cols: 1,
            });
        }
        Ok(utils::bilinear_dot(&self.vector, &other.vector))
    }

    /// Trace of the underlying density matrix.
    pub fn trace(&self) -> Complex64 {
        let side = 1 << self.num_qubits;
        (0..side).map(|i| self.vector[i * side + i]).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::channels::amplitude_damping_channel;

    #[test]
    fn ground_and_excited_are_unit_vectors() {
        let ground = LiouvilleState::ground(2);
        let excited = LiouvilleState::excited(2);
        assert_eq!(ground.vector.len(), 16);
        assert_eq!(ground.vector[0], Complex64::new(1.0, 0.0));
        assert_eq!(excited.vector[15], Complex64::new(1.0, 0.0));
        assert_eq!(ground.trace(), Complex64::new(1.0, 0.0));
        assert_eq!(excited.trace(), Complex64::new(1.0, 0.0));
        assert_eq!(
            ground.overlap(&excited).unwrap(),
            Complex64::new(0.0, 0.0)
        );
        assert_eq!(
            ground.overlap(&ground).unwrap(),
            Complex64::new(1.0, 0.0)
        );
    }

    #[test]
    fn from_vector_requires_power_of_four() {
        assert!(LiouvilleState::from_vector(Array1::zeros(16)).is_ok());
        assert_eq!(
            LiouvilleState::from_vector(Array1::zeros(8)).unwrap_err(),
            StateError::InvalidDimensions(8)
        );
        assert_eq!(
            LiouvilleState::from_vector(Array1::zeros(16))
                .unwrap()
                .num_qubits,
            2
        );
    }

    #[test]
    fn evolve_checks_dimensions() {
        let state = LiouvilleState::ground(1);
        assert!(state.evolve(&Array2::eye(16)).is_err());
    }

    #[test]
    fn damping_moves_excited_population_to_ground() {
        let state = LiouvilleState::excited(1);
        let channel = amplitude_damping_channel(0.25, 0, 1).unwrap();
        let evolved = state.evolve(&channel).unwrap();

        let ground = LiouvilleState::ground(1);
        assert!((ground.overlap(&evolved).unwrap().re - 0.25).abs() < 1e-12);
        assert!((state.overlap(&evolved).unwrap().re - 0.75).abs() < 1e-12);
        assert!((evolved.trace().re - 1.0).abs() < 1e-12);
    }
}
