//! APB master: translates issuer commands into the SETUP/ACCESS handshake.
//!
//! Each tick is evaluated in two halves:
//! 1. [`ApbMaster::outputs`] derives every driven signal from committed state
//!    and the slave's registered completion signals.
//! 2. [`ApbMaster::step`] computes the next state from the same inputs and
//!    commits it, so the change is only visible from the following tick.
//!
//! There is no timeout: a slave that never raises `PREADY` parks the master in
//! [`MasterState::Access`].

use crate::{
    ApbCompletion, ApbRequest, BusCommand, BusConfig, BusResponse, ConfigError, MasterState,
    TraceEvent, TraceSink,
};

/// Inputs sampled by the master on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MasterInputs {
    /// Synchronous reset.
    pub reset: bool,
    /// Issuer presents `command`.
    pub valid: bool,
    /// Command held stable by the issuer while `valid` is high.
    pub command: BusCommand,
    /// Slave completion signals for this tick.
    pub completion: ApbCompletion,
}

/// Signals driven by the master on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MasterOutputs {
    /// APB request towards the slave.
    pub request: ApbRequest,
    /// Issuer-facing completion: `PENABLE && PREADY`.
    pub ready: bool,
    /// Response fields; only meaningful while `ready` is high.
    pub response: BusResponse,
}

impl MasterOutputs {
    /// Returns the response when the transfer completes this tick.
    #[must_use]
    pub const fn completed(&self) -> Option<BusResponse> {
        if self.ready {
            Some(self.response)
        } else {
            None
        }
    }
}

/// Next-state record computed before commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MasterUpdate {
    state: MasterState,
    latched: BusCommand,
}

/// Three-state APB master.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ApbMaster {
    config: BusConfig,
    state: MasterState,
    latched: BusCommand,
}

impl ApbMaster {
    /// Creates a master in reset state.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] reported by [`BusConfig::validate`].
    pub fn new(config: &BusConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            state: MasterState::Idle,
            latched: BusCommand::default(),
        })
    }

    /// Configuration the master was built with.
    #[must_use]
    pub const fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Committed handshake state.
    #[must_use]
    pub const fn state(&self) -> MasterState {
        self.state
    }

    /// Command latched when the current (or last) transfer was accepted.
    #[must_use]
    pub const fn latched(&self) -> BusCommand {
        self.latched
    }

    /// Returns `true` while a transfer is in flight.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.state.select()
    }

    /// Derives this tick's driven signals from committed state.
    #[must_use]
    pub const fn outputs(&self, completion: &ApbCompletion) -> MasterOutputs {
        let request = ApbRequest {
            psel: self.state.select(),
            penable: self.state.enable(),
            pwrite: self.latched.direction.is_write(),
            paddr: self.latched.address,
            pwdata: self.latched.write_data,
            pstrb: self.latched.write_strobe,
        };

        MasterOutputs {
            request,
            ready: request.penable && completion.pready,
            response: BusResponse {
                read_data: completion.prdata,
                error: completion.pslverr,
            },
        }
    }

    /// Advances one clock tick.
    pub fn step(&mut self, inputs: &MasterInputs, trace: &mut dyn TraceSink) {
        let update = self.next(inputs);
        self.commit(update, trace);
    }

    fn next(&self, inputs: &MasterInputs) -> MasterUpdate {
        if inputs.reset {
            return MasterUpdate {
                state: MasterState::Idle,
                latched: BusCommand::default(),
            };
        }

        let mut update = MasterUpdate {
            state: self.state,
            latched: self.latched,
        };

        match self.state {
            MasterState::Idle => {
                if inputs.valid {
                    update.latched = inputs.command.masked(&self.config);
                    update.state = MasterState::Setup;
                }
            }
            MasterState::Setup => update.state = MasterState::Access,
            MasterState::Access => {
                if inputs.completion.pready {
                    update.state = MasterState::Idle;
                }
            }
        }

        update
    }

    fn commit(&mut self, update: MasterUpdate, trace: &mut dyn TraceSink) {
        if update.state != self.state {
            trace.on_event(TraceEvent::MasterTransition {
                from: self.state,
                to: update.state,
            });
        }
        self.state = update.state;
        self.latched = update.latched;
    }
}
