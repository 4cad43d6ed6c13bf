//! Error budget of a two-qubit QFT round trip.
//!
//! Usage: `cargo run --example sweep [params.json]`
//!
//! The optional JSON file overrides any subset of the error parameters.
//! Set `RUST_LOG=debug` to see survival probabilities.

use qerrbudget::{
    CircuitUnderTest, ErrorDecomposition, ErrorParameters, LiouvilleState, QuantumFourierTransform,
};
use std::error::Error;
use std::fs;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const NUM_QUBITS: usize = 2;
const SWEEP_STEPS: usize = 11;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let params = match std::env::args().nth(1) {
        Some(path) => serde_json::from_str::<ErrorParameters>(&fs::read_to_string(path)?)?,
        None => ErrorParameters::default(),
    };
    info!(?params, "error parameters");

    let qft = QuantumFourierTransform::with_parameters(NUM_QUBITS, params)?;
    let mut decomposition = ErrorDecomposition::new(LiouvilleState::excited(NUM_QUBITS), qft)?;

    let components = decomposition.decompose()?;
    info!("{}", serde_json::to_string_pretty(&components)?);

    let damping = decomposition.sweep_two_qubit_error(SWEEP_STEPS)?;
    for point in &damping {
        info!(
            p = point.parameter,
            native = point.components.native,
            pauli = point.components.pauli,
            "damping sweep"
        );
    }

    let split = decomposition.sweep_coherent_split(SWEEP_STEPS)?;
    for point in &split {
        info!(
            theta = point.parameter,
            controllable = point.components.controllable,
            uncontrollable = point.components.uncontrollable,
            "coherent split sweep"
        );
    }

    info!(
        two_qubit_error = decomposition.circuit().two_qubit_error(),
        "parameters restored after sweeps"
    );
    Ok(())
}
