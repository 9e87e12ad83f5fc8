//! Committed state of the master and slave machines.

/// Master and slave handshake state enums.
pub mod fsm;
/// Slave register storage and access model.
pub mod registers;

pub use fsm::{MasterState, SlaveState};
pub use registers::{Register, RegisterFile, WriteOutcome};
