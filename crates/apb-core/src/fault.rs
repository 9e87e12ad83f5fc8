use thiserror::Error;

use crate::{MasterState, SlaveState};

/// Stable taxonomy of register access-policy violations reported on `PSLVERR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum ViolationKind {
    /// Write targeted a register holding a fixed constant.
    #[error("write to read-only constant register")]
    WriteToReadOnly = 0x01,
    /// Write targeted a register sourced from the external status input.
    #[error("write to read-only external status register")]
    WriteToExternal = 0x02,
    /// Read targeted a register that cannot be read back.
    #[error("read from write-only register")]
    ReadFromWriteOnly = 0x03,
}

impl ViolationKind {
    /// Converts a violation kind to its stable one-byte code.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts a stable one-byte code back into a violation kind.
    #[must_use]
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::WriteToReadOnly),
            0x02 => Some(Self::WriteToExternal),
            0x03 => Some(Self::ReadFromWriteOnly),
            _ => None,
        }
    }
}

/// Access-policy violation against a decoded register index.
///
/// This is the only protocol error the slave can raise. It is informational:
/// the offending access is suppressed and the issuer decides how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[error("{kind} (register index {index})")]
pub struct AccessViolation {
    /// Which policy was violated.
    pub kind: ViolationKind,
    /// Decoded register index the access targeted.
    pub index: u32,
}

impl AccessViolation {
    /// Creates a violation record for `index`.
    #[must_use]
    pub const fn new(kind: ViolationKind, index: u32) -> Self {
        Self { kind, index }
    }
}

/// Rejected bus configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ConfigError {
    /// Address width outside `1..=32` bits.
    #[error("address width {0} is outside 1..=32 bits")]
    InvalidAddressWidth(u8),
    /// Data width is not one of the supported lane counts.
    #[error("data width {0} is not 8, 16 or 32 bits")]
    InvalidDataWidth(u8),
    /// Address width leaves too few register slots for the fixed map.
    #[error("address space has {slots} register slots, fixed map needs {required}")]
    AddressSpaceTooSmall {
        /// Register slots addressable with the configured widths.
        slots: u64,
        /// Slots needed by the fixed register map.
        required: u64,
    },
}

/// Errors raised by the system-level convenience drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum BusError {
    /// Configuration was rejected.
    #[error("invalid bus configuration: {0}")]
    Config(#[from] ConfigError),
    /// The convenience driver gave up waiting for `ready`.
    #[error("transfer did not complete within {ticks} ticks")]
    TransferStalled {
        /// Ticks spent driving the command before giving up.
        ticks: u32,
    },
    /// A new transfer was requested while another is still in flight.
    #[error("transfer already in flight (master {master:?}, slave {slave:?})")]
    TransferInFlight {
        /// Committed master state.
        master: MasterState,
        /// Committed slave state.
        slave: SlaveState,
    },
    /// Snapshot fields disagree on the bus configuration.
    #[error("snapshot {component} configuration differs from the system configuration")]
    SnapshotMismatch {
        /// Machine whose embedded configuration differs.
        component: &'static str,
    },
}
