//! Cycle-accurate AMBA APB master and register-file slave.

/// Public host-facing API contract and integration types.
pub mod api;
pub use api::{
    ApbCompletion, ApbRequest, BusCommand, BusConfig, BusResponse, DataWidth, Direction,
    NoopTrace, StrobePolicy, TraceEvent, TraceSink, DEFAULT_ADDRESS_WIDTH,
    DEFAULT_READ_ONLY_CONSTANT, DEFAULT_TRANSFER_TICK_LIMIT,
};

/// Access-violation taxonomy and configuration errors.
pub mod fault;
pub use fault::{AccessViolation, BusError, ConfigError, ViolationKind};

/// Fixed register map and access-policy checks.
pub mod regmap;
pub use regmap::{
    lookup, validate_read, validate_write, RegisterDescriptor, RegisterKind, CONSTANT_INDEX,
    CONTROL_INDEX, MAPPED_REGISTER_COUNT, REGISTER_MAP, SCRATCH_INDEX, STATUS_INDEX,
    WRITE_ONLY_INDEX,
};

/// Handshake state enums and register storage.
pub mod state;
pub use state::{MasterState, Register, RegisterFile, SlaveState, WriteOutcome};

/// Deterministic transfer tick-cost table and lookup helpers.
pub mod timing;
pub use timing::{transfer_timing, TransferKind, TransferTiming, TRANSFER_TIMING_TABLE};

/// APB master state machine.
pub mod master;
pub use master::{ApbMaster, MasterInputs, MasterOutputs};

/// APB slave state machine.
pub mod slave;
pub use slave::{ApbSlave, SlaveInputs};

/// Master and slave wired on one clock.
pub mod system;
pub use system::{
    BusSnapshot, BusStats, BusSystem, SnapshotVersion, SystemInputs, TickReport, TransferOutcome,
};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
