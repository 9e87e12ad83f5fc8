use crate::{
    lookup, validate_read, validate_write, AccessViolation, BusConfig, DataWidth, RegisterKind,
    StrobePolicy, CONTROL_INDEX, MAPPED_REGISTER_COUNT, REGISTER_MAP,
};

/// One mapped register: access kind plus its storage or backing source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Register {
    /// Software-writable, software-readable storage.
    ReadWrite(u32),
    /// Software-writable storage that never reads back.
    WriteOnly(u32),
    /// Fixed value.
    ReadOnlyConstant(u32),
    /// No storage; mirrors the external status input.
    ReadOnlyExternal,
}

impl Register {
    /// Creates the reset-state register for `kind`.
    #[must_use]
    pub const fn with_kind(kind: RegisterKind, constant: u32) -> Self {
        match kind {
            RegisterKind::ReadWrite => Self::ReadWrite(0),
            RegisterKind::WriteOnly => Self::WriteOnly(0),
            RegisterKind::ReadOnlyConstant => Self::ReadOnlyConstant(constant),
            RegisterKind::ReadOnlyExternal => Self::ReadOnlyExternal,
        }
    }

    /// Access policy class.
    #[must_use]
    pub const fn kind(&self) -> RegisterKind {
        match self {
            Self::ReadWrite(_) => RegisterKind::ReadWrite,
            Self::WriteOnly(_) => RegisterKind::WriteOnly,
            Self::ReadOnlyConstant(_) => RegisterKind::ReadOnlyConstant,
            Self::ReadOnlyExternal => RegisterKind::ReadOnlyExternal,
        }
    }

    /// Current content, ignoring read policy.
    ///
    /// `status` is only consulted for the external register.
    #[must_use]
    pub fn value(&self, status: bool) -> u32 {
        match self {
            Self::ReadWrite(value) | Self::WriteOnly(value) | Self::ReadOnlyConstant(value) => {
                *value
            }
            Self::ReadOnlyExternal => u32::from(status),
        }
    }
}

/// Result of a policy-clean write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteOutcome {
    /// Storage now holds `value`.
    Stored {
        /// Register content after strobe merging.
        value: u32,
    },
    /// Index is unmapped; nothing changed.
    Dropped,
}

/// Slave register file indexed by decoded register index.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterFile {
    registers: [Register; MAPPED_REGISTER_COUNT],
    data_width: DataWidth,
    strobe_policy: StrobePolicy,
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new(&BusConfig::default())
    }
}

impl RegisterFile {
    /// Creates a reset-state register file for `config`.
    #[must_use]
    pub fn new(config: &BusConfig) -> Self {
        let constant = config.read_only_constant & config.data_mask();
        Self {
            registers: REGISTER_MAP
                .map(|descriptor| Register::with_kind(descriptor.kind, constant)),
            data_width: config.data_width,
            strobe_policy: config.strobe_policy,
        }
    }

    /// Returns the register at `index`, or `None` when unmapped.
    #[must_use]
    pub fn get(&self, index: u32) -> Option<&Register> {
        usize::try_from(index)
            .ok()
            .and_then(|slot| self.registers.get(slot))
    }

    /// Reads `index` under its access policy.
    ///
    /// Unmapped indices read as zero.
    ///
    /// # Errors
    ///
    /// Returns an [`AccessViolation`] when `index` is write-only.
    pub fn read(&self, index: u32, status: bool) -> Result<u32, AccessViolation> {
        validate_read(lookup(index), index)?;
        Ok(self.get(index).map_or(0, |register| register.value(status)))
    }

    /// Writes `value` to `index` under its access policy.
    ///
    /// Unmapped indices drop the write without error.
    ///
    /// # Errors
    ///
    /// Returns an [`AccessViolation`] when `index` is read-only; storage is
    /// left untouched.
    pub fn write(
        &mut self,
        index: u32,
        value: u32,
        strobe: u8,
    ) -> Result<WriteOutcome, AccessViolation> {
        validate_write(lookup(index), index)?;

        let (width, policy) = (self.data_width, self.strobe_policy);
        let slot = usize::try_from(index).ok();
        match slot.and_then(|slot| self.registers.get_mut(slot)) {
            Some(Register::ReadWrite(current) | Register::WriteOnly(current)) => {
                *current = merge_lanes(width, policy, *current, value, strobe);
                Ok(WriteOutcome::Stored { value: *current })
            }
            Some(Register::ReadOnlyConstant(_) | Register::ReadOnlyExternal) | None => {
                Ok(WriteOutcome::Dropped)
            }
        }
    }

    /// Full stored word of the control register.
    #[must_use]
    pub fn control_word(&self) -> u32 {
        self.get(CONTROL_INDEX)
            .map_or(0, |register| register.value(false))
    }

    /// Scalar control output: bit 0 of the control register.
    #[must_use]
    pub fn control(&self) -> bool {
        self.control_word() & 1 != 0
    }

    /// Clears every writable register; constants are kept.
    pub fn reset(&mut self) {
        for register in &mut self.registers {
            match register {
                Register::ReadWrite(value) | Register::WriteOnly(value) => *value = 0,
                Register::ReadOnlyConstant(_) | Register::ReadOnlyExternal => {}
            }
        }
    }
}

fn merge_lanes(
    width: DataWidth,
    policy: StrobePolicy,
    current: u32,
    value: u32,
    strobe: u8,
) -> u32 {
    let data_mask = width.data_mask();
    let lane_mask = match policy {
        StrobePolicy::WordWide => data_mask,
        StrobePolicy::ByteLanes => (0..width.lanes())
            .filter(|&lane| strobe & (1 << lane) != 0)
            .fold(0_u32, |mask, lane| mask | (0xFF << (8 * u32::from(lane)))),
    };
    ((current & !lane_mask) | (value & lane_mask)) & data_mask
}

#[cfg(test)]
mod tests {
    use super::{Register, RegisterFile, WriteOutcome};
    use crate::{
        AccessViolation, BusConfig, DataWidth, RegisterKind, StrobePolicy, ViolationKind,
        CONSTANT_INDEX, CONTROL_INDEX, DEFAULT_READ_ONLY_CONSTANT, SCRATCH_INDEX, STATUS_INDEX,
        WRITE_ONLY_INDEX,
    };

    #[test]
    fn register_file_starts_cleared_with_constant_loaded() {
        let registers = RegisterFile::default();

        assert_eq!(registers.read(CONTROL_INDEX, false), Ok(0));
        assert_eq!(registers.read(SCRATCH_INDEX, false), Ok(0));
        assert_eq!(
            registers.read(CONSTANT_INDEX, false),
            Ok(DEFAULT_READ_ONLY_CONSTANT)
        );
        assert_eq!(
            registers.get(WRITE_ONLY_INDEX).map(|r| r.value(false)),
            Some(0)
        );
    }

    #[test]
    fn registers_carry_their_map_kind() {
        let registers = RegisterFile::default();
        assert_eq!(
            registers.get(CONTROL_INDEX).map(Register::kind),
            Some(RegisterKind::ReadWrite)
        );
        assert_eq!(
            registers.get(STATUS_INDEX).map(Register::kind),
            Some(RegisterKind::ReadOnlyExternal)
        );
        assert!(registers.get(5).is_none());
    }

    #[test]
    fn read_write_register_stores_and_reads_back() {
        let mut registers = RegisterFile::default();

        assert_eq!(
            registers.write(SCRATCH_INDEX, 0x1234_5678, 0xF),
            Ok(WriteOutcome::Stored { value: 0x1234_5678 })
        );
        assert_eq!(registers.read(SCRATCH_INDEX, false), Ok(0x1234_5678));
    }

    #[test]
    fn write_only_register_stores_but_refuses_reads() {
        let mut registers = RegisterFile::default();

        assert_eq!(
            registers.write(WRITE_ONLY_INDEX, 0x8765_4321, 0xF),
            Ok(WriteOutcome::Stored { value: 0x8765_4321 })
        );
        assert_eq!(
            registers.read(WRITE_ONLY_INDEX, false),
            Err(AccessViolation::new(
                ViolationKind::ReadFromWriteOnly,
                WRITE_ONLY_INDEX
            ))
        );
        assert_eq!(
            registers.get(WRITE_ONLY_INDEX).map(|r| r.value(false)),
            Some(0x8765_4321)
        );
    }

    #[test]
    fn read_only_registers_reject_writes_and_keep_value() {
        let mut registers = RegisterFile::default();

        assert_eq!(
            registers.write(CONSTANT_INDEX, 0xCAFE_BABE, 0xF),
            Err(AccessViolation::new(
                ViolationKind::WriteToReadOnly,
                CONSTANT_INDEX
            ))
        );
        assert_eq!(
            registers.write(STATUS_INDEX, 1, 0xF),
            Err(AccessViolation::new(
                ViolationKind::WriteToExternal,
                STATUS_INDEX
            ))
        );
        assert_eq!(
            registers.read(CONSTANT_INDEX, false),
            Ok(DEFAULT_READ_ONLY_CONSTANT)
        );
    }

    #[test]
    fn external_register_mirrors_status_input() {
        let registers = RegisterFile::default();
        assert_eq!(registers.read(STATUS_INDEX, true), Ok(1));
        assert_eq!(registers.read(STATUS_INDEX, false), Ok(0));
    }

    #[test]
    fn unmapped_indices_read_zero_and_drop_writes() {
        let mut registers = RegisterFile::default();
        for index in 5..8 {
            assert_eq!(registers.write(index, u32::MAX, 0xF), Ok(WriteOutcome::Dropped));
            assert_eq!(registers.read(index, true), Ok(0));
        }
    }

    #[test]
    fn control_output_follows_bit_zero_of_register_zero() {
        let mut registers = RegisterFile::default();
        assert!(!registers.control());

        registers
            .write(CONTROL_INDEX, 0x0000_0003, 0xF)
            .expect("control register is writable");
        assert!(registers.control());
        assert_eq!(registers.control_word(), 3);

        registers
            .write(CONTROL_INDEX, 0x0000_0002, 0xF)
            .expect("control register is writable");
        assert!(!registers.control());
    }

    #[test]
    fn reset_clears_writable_registers_only() {
        let mut registers = RegisterFile::default();
        registers
            .write(CONTROL_INDEX, 7, 0xF)
            .expect("control register is writable");
        registers
            .write(WRITE_ONLY_INDEX, 9, 0xF)
            .expect("write-only register is writable");

        registers.reset();

        assert_eq!(registers, RegisterFile::default());
    }

    #[test]
    fn word_wide_policy_ignores_strobes() {
        let mut registers = RegisterFile::default();
        assert_eq!(
            registers.write(SCRATCH_INDEX, 0xAABB_CCDD, 0b0001),
            Ok(WriteOutcome::Stored { value: 0xAABB_CCDD })
        );
    }

    #[test]
    fn byte_lane_policy_merges_strobed_lanes() {
        let config = BusConfig {
            strobe_policy: StrobePolicy::ByteLanes,
            ..BusConfig::default()
        };
        let mut registers = RegisterFile::new(&config);
        registers
            .write(SCRATCH_INDEX, 0x1122_3344, 0xF)
            .expect("scratch is writable");

        assert_eq!(
            registers.write(SCRATCH_INDEX, 0xAABB_CCDD, 0b0101),
            Ok(WriteOutcome::Stored { value: 0x11BB_33DD })
        );
        assert_eq!(
            registers.write(SCRATCH_INDEX, 0xFFFF_FFFF, 0),
            Ok(WriteOutcome::Stored { value: 0x11BB_33DD })
        );
    }

    #[test]
    fn narrow_bus_truncates_constant_and_writes() {
        let config = BusConfig {
            data_width: DataWidth::W16,
            ..BusConfig::default()
        };
        let mut registers = RegisterFile::new(&config);

        assert_eq!(registers.read(CONSTANT_INDEX, false), Ok(0xBEEF));
        assert_eq!(
            registers.write(SCRATCH_INDEX, 0x1234_5678, 0b11),
            Ok(WriteOutcome::Stored { value: 0x5678 })
        );
    }
}
