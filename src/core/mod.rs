pub mod channels;
pub mod errors;
pub mod gates;
pub mod state;
pub mod twirling;
pub mod utils;

pub use channels::{Direction, QubitRole};
pub use gates::{
    CoherentErrorAxes, CxGate, EntanglerMatrix, ExpandedCnot, IdentityGate, Pauli, QuantumGate,
    RotationSign, ZRotation,
};
pub use state::LiouvilleState;
