//! Coherent and incoherent error budgets for small quantum circuits.
//!
//! Gates and noise are Liouville-space superoperators. Randomized compiling
//! and Pauli twirling isolate the incoherent part of a round trip, and a
//! series expansion over survival probabilities turns each variant into an
//! incoherent infidelity. See [`ErrorDecomposition`].

pub mod circuit;
mod core;
pub mod decomposition;
pub mod qft;

pub use crate::circuit::{CircuitUnderTest, ErrorParameters};
pub use crate::core::{
    CoherentErrorAxes, CxGate, Direction, EntanglerMatrix, ExpandedCnot, IdentityGate,
    LiouvilleState, Pauli, QuantumGate, QubitRole, RotationSign, ZRotation, channels, errors,
    twirling, utils,
};
pub use crate::decomposition::{
    ErrorComponents, ErrorDecomposition, SweepPoint, incoherent_infidelity, resolve_components,
    series_coefficient,
};
pub use crate::qft::QuantumFourierTransform;
