//! Fixed slave register map and index lookup.

/// Index of the read-write register that also drives the control output.
pub const CONTROL_INDEX: u32 = 0;
/// Index of the write-only register.
pub const WRITE_ONLY_INDEX: u32 = 1;
/// Index of the plain read-write scratch register.
pub const SCRATCH_INDEX: u32 = 2;
/// Index of the read-only constant register.
pub const CONSTANT_INDEX: u32 = 3;
/// Index of the read-only register mirroring the external status input.
pub const STATUS_INDEX: u32 = 4;

/// Number of mapped register indices.
pub const MAPPED_REGISTER_COUNT: usize = 5;

/// Access policy class of a mapped register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RegisterKind {
    /// Software-writable and software-readable.
    ReadWrite,
    /// Software-writable; reads return zero and raise an error.
    WriteOnly,
    /// Fixed value; writes raise an error.
    ReadOnlyConstant,
    /// Value sourced from the external status input; writes raise an error.
    ReadOnlyExternal,
}

impl RegisterKind {
    /// Returns `true` when a read returns the register's value.
    #[must_use]
    pub const fn is_readable(self) -> bool {
        !matches!(self, Self::WriteOnly)
    }

    /// Returns `true` when a write updates storage.
    #[must_use]
    pub const fn is_writable(self) -> bool {
        matches!(self, Self::ReadWrite | Self::WriteOnly)
    }

    /// Returns `true` for both read-only flavors.
    #[must_use]
    pub const fn is_read_only(self) -> bool {
        matches!(self, Self::ReadOnlyConstant | Self::ReadOnlyExternal)
    }
}

/// Canonical descriptor for one mapped register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterDescriptor {
    /// Register index (address with byte-lane bits dropped).
    pub index: u32,
    /// Access policy class.
    pub kind: RegisterKind,
}

/// Fixed register layout in ascending index order.
pub const REGISTER_MAP: [RegisterDescriptor; MAPPED_REGISTER_COUNT] = [
    RegisterDescriptor {
        index: CONTROL_INDEX,
        kind: RegisterKind::ReadWrite,
    },
    RegisterDescriptor {
        index: WRITE_ONLY_INDEX,
        kind: RegisterKind::WriteOnly,
    },
    RegisterDescriptor {
        index: SCRATCH_INDEX,
        kind: RegisterKind::ReadWrite,
    },
    RegisterDescriptor {
        index: CONSTANT_INDEX,
        kind: RegisterKind::ReadOnlyConstant,
    },
    RegisterDescriptor {
        index: STATUS_INDEX,
        kind: RegisterKind::ReadOnlyExternal,
    },
];

const _: () = assert_register_map_layout();

const fn assert_register_map_layout() {
    let mut index = 0;
    while index < REGISTER_MAP.len() {
        assert!(
            REGISTER_MAP[index].index as usize == index,
            "register map must be dense and ascending from zero"
        );
        index += 1;
    }

    assert!(
        matches!(
            REGISTER_MAP[CONTROL_INDEX as usize].kind,
            RegisterKind::ReadWrite
        ),
        "control register must be read-write"
    );
    assert!(
        matches!(
            REGISTER_MAP[STATUS_INDEX as usize].kind,
            RegisterKind::ReadOnlyExternal
        ),
        "status register must be externally sourced"
    );
}

/// Looks up the access policy for a decoded register index.
///
/// Returns `None` for unmapped (reserved) indices.
#[must_use]
pub const fn lookup(index: u32) -> Option<RegisterKind> {
    if index < MAPPED_REGISTER_COUNT as u32 {
        Some(REGISTER_MAP[index as usize].kind)
    } else {
        None
    }
}
