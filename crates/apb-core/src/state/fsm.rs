/// Master handshake state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum MasterState {
    /// No transfer in flight; waiting for `valid`.
    #[default]
    Idle,
    /// SETUP phase: `PSEL` high, `PENABLE` low, one tick.
    Setup,
    /// ACCESS phase: `PSEL` and `PENABLE` high until `PREADY`.
    Access,
}

impl MasterState {
    /// Level driven on `PSEL` in this state.
    #[must_use]
    pub const fn select(self) -> bool {
        matches!(self, Self::Setup | Self::Access)
    }

    /// Level driven on `PENABLE` in this state.
    #[must_use]
    pub const fn enable(self) -> bool {
        matches!(self, Self::Access)
    }
}

/// Slave handshake state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum SlaveState {
    /// Decoding the next request.
    #[default]
    Idle,
    /// Committing a write; `PREADY` already high.
    WriteAccess,
    /// Wait state; loading read data.
    ReadAccess,
    /// Read data presented; `PREADY` high.
    ReadFinish,
}

impl SlaveState {
    /// Returns `true` while a transfer occupies the slave.
    #[must_use]
    pub const fn is_busy(self) -> bool {
        !matches!(self, Self::Idle)
    }
}
