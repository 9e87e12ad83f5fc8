//! Single-clock bus system wiring one master to one slave.
//!
//! Per tick: read the slave's registered completion, derive the master's
//! driven signals from it, then step both machines on those signals. Neither
//! machine sees the other's next state until the following tick.

use crate::{
    ApbCompletion, ApbMaster, ApbRequest, ApbSlave, BusCommand, BusConfig, BusError, BusResponse,
    ConfigError, Direction, MasterInputs, MasterState, NoopTrace, SlaveInputs, TraceEvent,
    TraceSink,
};

/// Issuer- and environment-driven inputs for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SystemInputs {
    /// Synchronous reset for both machines.
    pub reset: bool,
    /// Issuer presents `command`.
    pub valid: bool,
    /// Command held stable while `valid` is high.
    pub command: BusCommand,
    /// External status input of the slave.
    pub status: bool,
}

/// Observable signals for one evaluated tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Zero-based tick number.
    pub tick: u64,
    /// Master-driven APB signals.
    pub request: ApbRequest,
    /// Slave-driven APB signals.
    pub completion: ApbCompletion,
    /// Issuer-facing ready; held low while reset is asserted.
    pub ready: bool,
    /// Response, present only in the completing tick and never in a reset tick.
    pub response: Option<BusResponse>,
    /// Slave control output.
    pub control: bool,
}

/// Result of a convenience transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOutcome {
    /// Response observed with `ready`.
    pub response: BusResponse,
    /// Ticks from acceptance to completion, inclusive.
    pub ticks: u32,
}

/// Saturating transfer counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BusStats {
    /// Completed transfers.
    pub transfers: u32,
    /// Completed reads.
    pub reads: u32,
    /// Completed writes.
    pub writes: u32,
    /// Completed transfers that reported an error.
    pub errors: u32,
    /// ACCESS ticks spent waiting for `PREADY`.
    pub wait_ticks: u32,
}

impl BusStats {
    /// Records one completed transfer.
    pub const fn record_completion(&mut self, direction: Direction, error: bool) {
        self.transfers = self.transfers.saturating_add(1);
        match direction {
            Direction::Read => self.reads = self.reads.saturating_add(1),
            Direction::Write => self.writes = self.writes.saturating_add(1),
        }
        if error {
            self.errors = self.errors.saturating_add(1);
        }
    }

    /// Records one ACCESS tick without `PREADY`.
    pub const fn record_wait(&mut self) {
        self.wait_ticks = self.wait_ticks.saturating_add(1);
    }
}

/// Stable snapshot schema identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u16)]
pub enum SnapshotVersion {
    /// Initial schema revision.
    V1 = 1,
}

impl SnapshotVersion {
    /// Converts a wire value to a known snapshot version.
    #[must_use]
    pub const fn from_u16(version: u16) -> Option<Self> {
        match version {
            1 => Some(Self::V1),
            _ => None,
        }
    }
}

/// Full system state for export, import and replay fixtures.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BusSnapshot {
    /// Snapshot schema version.
    pub version: SnapshotVersion,
    /// Configuration the machines were built with.
    pub config: BusConfig,
    /// Ticks evaluated so far.
    pub tick: u64,
    /// Ticks spent on the transfer in flight.
    pub in_flight_ticks: u32,
    /// Master state.
    pub master: ApbMaster,
    /// Slave state, including register contents.
    pub slave: ApbSlave,
    /// Transfer counters.
    pub stats: BusStats,
}

/// One master and one slave on a shared clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusSystem {
    config: BusConfig,
    tick: u64,
    in_flight_ticks: u32,
    master: ApbMaster,
    slave: ApbSlave,
    stats: BusStats,
}

impl BusSystem {
    /// Creates a system in reset state.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] reported by [`BusConfig::validate`].
    pub fn new(config: &BusConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            config: config.clone(),
            tick: 0,
            in_flight_ticks: 0,
            master: ApbMaster::new(config)?,
            slave: ApbSlave::new(config)?,
            stats: BusStats::default(),
        })
    }

    /// Restores a system from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Config`] when the snapshot carries an invalid
    /// configuration, and [`BusError::SnapshotMismatch`] when the master or
    /// slave was built with a different one.
    pub fn from_snapshot(snapshot: BusSnapshot) -> Result<Self, BusError> {
        snapshot.config.validate()?;
        if snapshot.master.config() != &snapshot.config {
            return Err(BusError::SnapshotMismatch { component: "master" });
        }
        if snapshot.slave.config() != &snapshot.config {
            return Err(BusError::SnapshotMismatch { component: "slave" });
        }
        Ok(Self {
            config: snapshot.config,
            tick: snapshot.tick,
            in_flight_ticks: snapshot.in_flight_ticks,
            master: snapshot.master,
            slave: snapshot.slave,
            stats: snapshot.stats,
        })
    }

    /// Captures the full system state.
    #[must_use]
    pub fn snapshot(&self) -> BusSnapshot {
        BusSnapshot {
            version: SnapshotVersion::V1,
            config: self.config.clone(),
            tick: self.tick,
            in_flight_ticks: self.in_flight_ticks,
            master: self.master.clone(),
            slave: self.slave.clone(),
            stats: self.stats,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Master state machine.
    #[must_use]
    pub const fn master(&self) -> &ApbMaster {
        &self.master
    }

    /// Slave state machine.
    #[must_use]
    pub const fn slave(&self) -> &ApbSlave {
        &self.slave
    }

    /// Transfer counters.
    #[must_use]
    pub const fn stats(&self) -> BusStats {
        self.stats
    }

    /// Ticks evaluated so far.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Slave control output.
    #[must_use]
    pub fn control(&self) -> bool {
        self.slave.control()
    }

    /// Evaluates one tick without tracing.
    pub fn tick(&mut self, inputs: &SystemInputs) -> TickReport {
        self.tick_traced(inputs, &mut NoopTrace)
    }

    /// Evaluates one tick, forwarding events to `trace` when tracing is enabled.
    pub fn tick_traced(&mut self, inputs: &SystemInputs, trace: &mut dyn TraceSink) -> TickReport {
        if self.config.tracing_enabled {
            self.evaluate(inputs, trace)
        } else {
            self.evaluate(inputs, &mut NoopTrace)
        }
    }

    fn evaluate(&mut self, inputs: &SystemInputs, trace: &mut dyn TraceSink) -> TickReport {
        let completion = self.slave.outputs();
        let outputs = self.master.outputs(&completion);
        // Reset wins over a coinciding completion: the transfer is abandoned.
        let report = TickReport {
            tick: self.tick,
            request: outputs.request,
            completion,
            ready: outputs.ready && !inputs.reset,
            response: outputs.completed().filter(|_| !inputs.reset),
            control: self.slave.control(),
        };

        if inputs.reset {
            self.in_flight_ticks = 0;
            trace.on_event(TraceEvent::Reset);
        } else {
            self.account(inputs, &report, trace);
        }

        self.master.step(
            &MasterInputs {
                reset: inputs.reset,
                valid: inputs.valid,
                command: inputs.command,
                completion,
            },
            trace,
        );
        self.slave.step(
            &SlaveInputs {
                reset: inputs.reset,
                request: outputs.request,
                status: inputs.status,
            },
            trace,
        );

        self.tick = self.tick.wrapping_add(1);
        report
    }

    fn account(&mut self, inputs: &SystemInputs, report: &TickReport, trace: &mut dyn TraceSink) {
        match self.master.state() {
            MasterState::Idle if inputs.valid => self.in_flight_ticks = 1,
            MasterState::Idle => {}
            MasterState::Setup | MasterState::Access => {
                self.in_flight_ticks = self.in_flight_ticks.saturating_add(1);
            }
        }

        if self.master.state() == MasterState::Access && !report.ready {
            self.stats.record_wait();
        }

        if let Some(response) = report.response {
            let latched = self.master.latched();
            self.stats.record_completion(latched.direction, response.error);
            trace.on_event(TraceEvent::TransferComplete {
                direction: latched.direction,
                address: latched.address,
                response,
                ticks: self.in_flight_ticks,
            });
        }
    }

    /// Holds reset for one tick.
    pub fn reset(&mut self) -> TickReport {
        self.tick(&SystemInputs {
            reset: true,
            ..SystemInputs::default()
        })
    }

    /// Drives `command` until the issuer sees `ready`.
    ///
    /// Both machines must be idle. After a stall, finish the transfer with
    /// [`Self::tick`] or clear it with [`Self::reset`].
    ///
    /// # Errors
    ///
    /// Returns [`BusError::TransferInFlight`] when a transfer is already under
    /// way, and [`BusError::TransferStalled`] when `ready` is not observed
    /// within [`BusConfig::transfer_tick_limit`] ticks.
    pub fn transfer(
        &mut self,
        command: BusCommand,
        status: bool,
    ) -> Result<TransferOutcome, BusError> {
        self.transfer_traced(command, status, &mut NoopTrace)
    }

    /// Traced variant of [`Self::transfer`].
    ///
    /// # Errors
    ///
    /// Returns [`BusError::TransferInFlight`] without ticking when either
    /// machine is mid-transfer, and [`BusError::TransferStalled`] when `ready`
    /// is not observed within [`BusConfig::transfer_tick_limit`] ticks.
    pub fn transfer_traced(
        &mut self,
        command: BusCommand,
        status: bool,
        trace: &mut dyn TraceSink,
    ) -> Result<TransferOutcome, BusError> {
        let (master, slave) = (self.master.state(), self.slave.state());
        if self.master.is_busy() || slave.is_busy() {
            return Err(BusError::TransferInFlight { master, slave });
        }

        let inputs = SystemInputs {
            reset: false,
            valid: true,
            command,
            status,
        };

        let limit = self.config.transfer_tick_limit;
        for ticks in 1..=limit {
            if let Some(response) = self.tick_traced(&inputs, trace).response {
                return Ok(TransferOutcome { response, ticks });
            }
        }

        Err(BusError::TransferStalled { ticks: limit })
    }

    /// Full-word read of `address`.
    ///
    /// # Errors
    ///
    /// See [`Self::transfer`].
    pub fn read(&mut self, address: u32, status: bool) -> Result<BusResponse, BusError> {
        self.transfer(BusCommand::read(address), status)
            .map(|outcome| outcome.response)
    }

    /// Full-word write of `value` to `address`.
    ///
    /// # Errors
    ///
    /// See [`Self::transfer`].
    pub fn write(&mut self, address: u32, value: u32) -> Result<BusResponse, BusError> {
        self.transfer(BusCommand::write(address, value), false)
            .map(|outcome| outcome.response)
    }
}
