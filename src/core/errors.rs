use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GateError {
    #[error("Qubit index {index} out of range for a {num_qubits}-qubit system")]
    QubitOutOfRange { index: usize, num_qubits: usize },

    #[error("Qubit {0} cannot be both control and target")]
    ControlTargetOverlap(usize),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChannelError {
    #[error("Invalid probability: {0}. Must be between 0.0 and 1.0")]
    InvalidProbability(f64),

    #[error("Gate error: {0}")]
    GateError(#[from] GateError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TwirlError {
    #[error("Superoperator dimension mismatch: expected {expected}, got {got_rows}x{got_cols}")]
    DimensionMismatch {
        expected: usize,
        got_rows: usize,
        got_cols: usize,
    },

    #[error("Randomized compiling index {0} out of range (16 dressings)")]
    DressingOutOfRange(usize),

    #[error("Gate error: {0}")]
    GateError(#[from] GateError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    #[error("Vector length {0} is not a power of four")]
    InvalidDimensions(usize),

    #[error("Dimension mismatch: state has length {expected}, operator is {got_rows}x{got_cols}")]
    DimensionMismatch {
        expected: usize,
        got_rows: usize,
        got_cols: usize,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CircuitError {
    #[error("Gate error: {0}")]
    GateError(#[from] GateError),

    #[error("Channel error: {0}")]
    ChannelError(#[from] ChannelError),

    #[error("Twirl error: {0}")]
    TwirlError(#[from] TwirlError),

    #[error("Circuit needs at least {min} qubits, got {got}")]
    TooFewQubits { min: usize, got: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecompositionError {
    #[error(
        "Order {order} expansion needs {required} survival probabilities, only {got} supplied"
    )]
    InsufficientSurvivalProbabilities {
        order: usize,
        required: usize,
        got: usize,
    },

    #[error("Expansion order must be at least 1")]
    InvalidOrder,

    #[error("Coefficient index {k} exceeds expansion order {order}")]
    CoefficientOutOfRange { order: usize, k: usize },

    #[error("Initial state has {state_qubits} qubits but circuit has {circuit_qubits}")]
    QubitCountMismatch {
        state_qubits: usize,
        circuit_qubits: usize,
    },

    #[error("Circuit error: {0}")]
    CircuitError(#[from] CircuitError),

    #[error("Twirl error: {0}")]
    TwirlError(#[from] TwirlError),

    #[error("State error: {0}")]
    StateError(#[from] StateError),
}
