/// Transfer forms with fixed handshake costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferKind {
    /// Single-beat write.
    Write,
    /// Single-beat read.
    Read,
}

impl TransferKind {
    /// Kind matching a command direction.
    #[must_use]
    pub const fn from_direction(direction: crate::Direction) -> Self {
        match direction {
            crate::Direction::Read => Self::Read,
            crate::Direction::Write => Self::Write,
        }
    }
}

/// Fixed tick costs for one transfer kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransferTiming {
    /// SETUP ticks (`PSEL` high, `PENABLE` low).
    pub setup_ticks: u32,
    /// ACCESS ticks with `PREADY` low.
    pub wait_ticks: u32,
}

impl TransferTiming {
    /// Ticks from `valid` accepted to `ready` observed, inclusive of both.
    ///
    /// One acceptance tick in `Idle`, the SETUP ticks, the wait ticks and the
    /// completing ACCESS tick.
    #[must_use]
    pub const fn total_ticks(self) -> u32 {
        1 + self.setup_ticks + self.wait_ticks + 1
    }
}

/// Single source-of-truth handshake cost table.
pub const TRANSFER_TIMING_TABLE: &[(TransferKind, TransferTiming)] = &[
    (
        TransferKind::Write,
        TransferTiming {
            setup_ticks: 1,
            wait_ticks: 0,
        },
    ),
    (
        TransferKind::Read,
        TransferTiming {
            setup_ticks: 1,
            wait_ticks: 1,
        },
    ),
];

/// Looks up the handshake cost for a transfer kind.
#[must_use]
pub fn transfer_timing(kind: TransferKind) -> Option<TransferTiming> {
    TRANSFER_TIMING_TABLE
        .iter()
        .find_map(|(entry_kind, timing)| (*entry_kind == kind).then_some(*timing))
}
