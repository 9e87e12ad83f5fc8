//! Public host-facing contracts: configuration, bus signal bundles and trace hooks.

use crate::{AccessViolation, ConfigError, MasterState, SlaveState, MAPPED_REGISTER_COUNT};

/// Default address bus width in bits.
pub const DEFAULT_ADDRESS_WIDTH: u8 = 5;

/// Default value held by the read-only constant register.
pub const DEFAULT_READ_ONLY_CONSTANT: u32 = 0xDEAD_BEEF;

/// Default tick limit for the convenience transfer driver.
pub const DEFAULT_TRANSFER_TICK_LIMIT: u32 = 16;

/// Supported data bus widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum DataWidth {
    /// One byte lane.
    W8,
    /// Two byte lanes.
    W16,
    /// Four byte lanes.
    #[default]
    W32,
}

impl DataWidth {
    /// Decodes a width given in bits.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDataWidth`] for anything but 8, 16 or 32.
    pub const fn from_bits(bits: u8) -> Result<Self, ConfigError> {
        match bits {
            8 => Ok(Self::W8),
            16 => Ok(Self::W16),
            32 => Ok(Self::W32),
            other => Err(ConfigError::InvalidDataWidth(other)),
        }
    }

    /// Width in bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::W8 => 8,
            Self::W16 => 16,
            Self::W32 => 32,
        }
    }

    /// Number of byte lanes (and strobe bits).
    #[must_use]
    pub const fn lanes(self) -> u8 {
        self.bits() / 8
    }

    /// Low address bits selecting a byte lane; dropped by register decode.
    #[must_use]
    pub const fn lane_bits(self) -> u8 {
        match self {
            Self::W8 => 0,
            Self::W16 => 1,
            Self::W32 => 2,
        }
    }

    /// Mask covering every data bit.
    #[must_use]
    pub const fn data_mask(self) -> u32 {
        match self {
            Self::W8 => 0xFF,
            Self::W16 => 0xFFFF,
            Self::W32 => u32::MAX,
        }
    }

    /// Mask covering every strobe bit.
    #[must_use]
    pub const fn strobe_mask(self) -> u8 {
        (1 << self.lanes()) - 1
    }
}

/// How the slave applies `PSTRB` on writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum StrobePolicy {
    /// Strobes are carried but the whole word is written.
    #[default]
    WordWide,
    /// Only byte lanes with their strobe bit set are written.
    ByteLanes,
}

/// Top-level immutable configuration shared by master, slave and system.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BusConfig {
    /// Address bus width in bits (`1..=32`).
    pub address_width: u8,
    /// Data bus width.
    pub data_width: DataWidth,
    /// Value held by the read-only constant register.
    pub read_only_constant: u32,
    /// Write strobe handling in the slave.
    pub strobe_policy: StrobePolicy,
    /// Enables trace callback dispatch from [`crate::BusSystem`].
    pub tracing_enabled: bool,
    /// Tick limit for [`crate::BusSystem::transfer`].
    pub transfer_tick_limit: u32,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            address_width: DEFAULT_ADDRESS_WIDTH,
            data_width: DataWidth::W32,
            read_only_constant: DEFAULT_READ_ONLY_CONSTANT,
            strobe_policy: StrobePolicy::WordWide,
            tracing_enabled: false,
            transfer_tick_limit: DEFAULT_TRANSFER_TICK_LIMIT,
        }
    }
}

impl BusConfig {
    /// Checks widths against the fixed register map.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAddressWidth`] for widths outside
    /// `1..=32`, and [`ConfigError::AddressSpaceTooSmall`] when the decoded
    /// index range cannot hold every mapped register.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.address_width == 0 || self.address_width > 32 {
            return Err(ConfigError::InvalidAddressWidth(self.address_width));
        }

        let slots = self.slot_count();
        let required = MAPPED_REGISTER_COUNT as u64;
        if slots < required {
            return Err(ConfigError::AddressSpaceTooSmall { slots, required });
        }

        Ok(())
    }

    /// Mask covering every address bit.
    #[must_use]
    pub const fn address_mask(&self) -> u32 {
        if self.address_width >= 32 {
            u32::MAX
        } else {
            (1 << self.address_width) - 1
        }
    }

    /// Mask covering every data bit.
    #[must_use]
    pub const fn data_mask(&self) -> u32 {
        self.data_width.data_mask()
    }

    /// Mask covering every strobe bit.
    #[must_use]
    pub const fn strobe_mask(&self) -> u8 {
        self.data_width.strobe_mask()
    }

    /// Number of register indices the address bus can select.
    #[must_use]
    pub const fn slot_count(&self) -> u64 {
        let index_bits = self.address_width.saturating_sub(self.data_width.lane_bits());
        1 << index_bits
    }

    /// Decodes a byte address into a register index.
    #[must_use]
    pub const fn register_index(&self, address: u32) -> u32 {
        (address & self.address_mask()) >> self.data_width.lane_bits()
    }
}

/// Transfer direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Direction {
    /// Slave to master.
    #[default]
    Read,
    /// Master to slave.
    Write,
}

impl Direction {
    /// Level driven on `PWRITE`.
    #[must_use]
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Write)
    }
}

/// Single-beat command presented at the master's issuer boundary.
///
/// Must stay stable from the tick `valid` is asserted until `ready` is seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BusCommand {
    /// Byte address.
    pub address: u32,
    /// Read or write.
    pub direction: Direction,
    /// Data to write; ignored for reads.
    pub write_data: u32,
    /// Per-byte write enables; ignored for reads.
    pub write_strobe: u8,
}

impl BusCommand {
    /// Read of `address`.
    #[must_use]
    pub const fn read(address: u32) -> Self {
        Self {
            address,
            direction: Direction::Read,
            write_data: 0,
            write_strobe: 0,
        }
    }

    /// Full-word write of `value` to `address`.
    #[must_use]
    pub const fn write(address: u32, value: u32) -> Self {
        Self {
            address,
            direction: Direction::Write,
            write_data: value,
            write_strobe: u8::MAX,
        }
    }

    /// Write of `value` to `address` with explicit byte strobes.
    #[must_use]
    pub const fn write_strobed(address: u32, value: u32, strobe: u8) -> Self {
        Self {
            address,
            direction: Direction::Write,
            write_data: value,
            write_strobe: strobe,
        }
    }

    /// Truncates every field to the widths in `config`.
    #[must_use]
    pub const fn masked(self, config: &BusConfig) -> Self {
        Self {
            address: self.address & config.address_mask(),
            direction: self.direction,
            write_data: self.write_data & config.data_mask(),
            write_strobe: self.write_strobe & config.strobe_mask(),
        }
    }
}

/// Response returned to the issuer in the tick `ready` is asserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BusResponse {
    /// Data read; zero for suppressed reads, stale for writes.
    pub read_data: u32,
    /// Access-policy violation flag.
    pub error: bool,
}

/// Master-driven APB signals (`PSEL`, `PENABLE`, `PWRITE`, `PADDR`, `PWDATA`, `PSTRB`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ApbRequest {
    /// Slave select; high in SETUP and ACCESS.
    pub psel: bool,
    /// Enable; high only in ACCESS.
    pub penable: bool,
    /// Direction; high for writes.
    pub pwrite: bool,
    /// Byte address.
    pub paddr: u32,
    /// Write data.
    pub pwdata: u32,
    /// Write strobes.
    pub pstrb: u8,
}

impl ApbRequest {
    /// Select with write direction, regardless of phase.
    #[must_use]
    pub const fn is_write_request(&self) -> bool {
        self.psel && self.pwrite
    }

    /// Select with read direction, regardless of phase.
    #[must_use]
    pub const fn is_read_request(&self) -> bool {
        self.psel && !self.pwrite
    }

    /// ACCESS-phase condition for a write.
    #[must_use]
    pub const fn is_write_access(&self) -> bool {
        self.is_write_request() && self.penable
    }

    /// ACCESS-phase condition for a read.
    #[must_use]
    pub const fn is_read_access(&self) -> bool {
        self.is_read_request() && self.penable
    }
}

/// Slave-driven APB signals (`PREADY`, `PRDATA`, `PSLVERR`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ApbCompletion {
    /// Transfer may complete this tick.
    pub pready: bool,
    /// Read data.
    pub prdata: u32,
    /// Access-policy violation.
    pub pslverr: bool,
}

/// Deterministic trace events emitted while stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// Master committed a state change.
    MasterTransition {
        /// State before the tick.
        from: MasterState,
        /// State after the tick.
        to: MasterState,
    },
    /// Slave committed a state change.
    SlaveTransition {
        /// State before the tick.
        from: SlaveState,
        /// State after the tick.
        to: SlaveState,
    },
    /// Slave committed a write to register storage.
    RegisterWrite {
        /// Decoded register index.
        index: u32,
        /// Value stored after strobe merging.
        value: u32,
    },
    /// Slave loaded its read-data register.
    RegisterRead {
        /// Decoded register index.
        index: u32,
        /// Value latched onto `PRDATA`.
        value: u32,
    },
    /// Slave registered an access-policy violation for the next response.
    ViolationRaised {
        /// Violation detail.
        violation: AccessViolation,
    },
    /// Issuer observed `ready`.
    TransferComplete {
        /// Direction of the completed transfer.
        direction: Direction,
        /// Byte address of the completed transfer.
        address: u32,
        /// Response delivered to the issuer.
        response: BusResponse,
        /// Ticks from acceptance to completion, inclusive.
        ticks: u32,
    },
    /// Reset was asserted for one tick.
    Reset,
}

/// Sink trait for deterministic trace hooks.
pub trait TraceSink {
    /// Records an event in evaluation order.
    fn on_event(&mut self, event: TraceEvent);
}

/// Trace sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTrace;

impl TraceSink for NoopTrace {
    fn on_event(&mut self, _event: TraceEvent) {}
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}
