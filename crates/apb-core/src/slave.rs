//! APB slave: terminates the handshake against the fixed register file.
//!
//! `PREADY`, `PRDATA` and `PSLVERR` are registered. Every tick the slave
//! computes an update record from committed state and sampled inputs, then
//! commits it in one go:
//! 1. Decode the register index from `PADDR`
//! 2. Evaluate the access-policy error condition
//! 3. Select the next state and `PREADY` level
//! 4. Stage the register write or the read-data load
//! 5. Commit storage, output registers and state together
//!
//! Writes complete with no wait state; reads insert one.

use crate::{
    lookup, validate_read, validate_write, AccessViolation, ApbCompletion, ApbRequest, BusConfig,
    ConfigError, RegisterFile, SlaveState, TraceEvent, TraceSink, WriteOutcome,
};

/// Inputs sampled by the slave on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlaveInputs {
    /// Synchronous reset.
    pub reset: bool,
    /// Master-driven APB signals.
    pub request: ApbRequest,
    /// External status input backing the read-only external register.
    pub status: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingWrite {
    index: u32,
    value: u32,
    strobe: u8,
}

/// Next-state record; nothing in here is visible until commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SlaveUpdate {
    reset: bool,
    state: SlaveState,
    pready: bool,
    prdata: u32,
    pslverr: bool,
    write: Option<PendingWrite>,
    read: Option<(u32, u32)>,
    violation: Option<AccessViolation>,
}

/// Four-state APB slave with its register file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ApbSlave {
    config: BusConfig,
    state: SlaveState,
    registers: RegisterFile,
    pready: bool,
    prdata: u32,
    pslverr: bool,
}

impl ApbSlave {
    /// Creates a slave in reset state.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] reported by [`BusConfig::validate`].
    pub fn new(config: &BusConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            state: SlaveState::Idle,
            registers: RegisterFile::new(config),
            pready: false,
            prdata: 0,
            pslverr: false,
        })
    }

    /// Configuration the slave was built with.
    #[must_use]
    pub const fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Committed handshake state.
    #[must_use]
    pub const fn state(&self) -> SlaveState {
        self.state
    }

    /// Register file contents.
    #[must_use]
    pub const fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Registered completion signals for this tick.
    #[must_use]
    pub const fn outputs(&self) -> ApbCompletion {
        ApbCompletion {
            pready: self.pready,
            prdata: self.prdata,
            pslverr: self.pslverr,
        }
    }

    /// External control output, continuously driven by register 0.
    #[must_use]
    pub fn control(&self) -> bool {
        self.registers.control()
    }

    /// Advances one clock tick.
    pub fn step(&mut self, inputs: &SlaveInputs, trace: &mut dyn TraceSink) {
        let update = self.next(inputs);
        self.commit(update, trace);
    }

    fn next(&self, inputs: &SlaveInputs) -> SlaveUpdate {
        let mut update = SlaveUpdate {
            reset: inputs.reset,
            state: SlaveState::Idle,
            pready: false,
            prdata: 0,
            pslverr: false,
            write: None,
            read: None,
            violation: None,
        };
        if inputs.reset {
            return update;
        }

        let request = inputs.request;
        let index = self.config.register_index(request.paddr);
        let kind = lookup(index);

        update.violation = match self.state {
            SlaveState::Idle if request.is_write_request() => validate_write(kind, index).err(),
            SlaveState::ReadAccess if request.is_read_request() => {
                validate_read(kind, index).err()
            }
            _ => None,
        };
        update.pslverr = update.violation.is_some();
        update.prdata = self.prdata;

        match self.state {
            SlaveState::Idle => {
                if request.is_write_request() {
                    update.pready = true;
                    update.state = SlaveState::WriteAccess;
                } else if request.is_read_request() {
                    update.state = SlaveState::ReadAccess;
                }
            }
            SlaveState::WriteAccess => {
                if request.is_write_access() {
                    update.write = Some(PendingWrite {
                        index,
                        value: request.pwdata & self.config.data_mask(),
                        strobe: request.pstrb & self.config.strobe_mask(),
                    });
                }
            }
            SlaveState::ReadAccess => {
                update.prdata = if request.is_read_access() {
                    let value = self.registers.read(index, inputs.status).unwrap_or(0);
                    update.read = Some((index, value));
                    value
                } else {
                    0
                };
                update.pready = true;
                update.state = SlaveState::ReadFinish;
            }
            SlaveState::ReadFinish => {}
        }

        update
    }

    fn commit(&mut self, update: SlaveUpdate, trace: &mut dyn TraceSink) {
        if update.reset {
            self.registers.reset();
        }

        if let Some(write) = update.write {
            // Read-only targets were flagged from Idle; here they are just suppressed.
            let outcome = self.registers.write(write.index, write.value, write.strobe);
            if let Ok(WriteOutcome::Stored { value }) = outcome {
                trace.on_event(TraceEvent::RegisterWrite {
                    index: write.index,
                    value,
                });
            }
        }
        if let Some((index, value)) = update.read {
            trace.on_event(TraceEvent::RegisterRead { index, value });
        }
        if let Some(violation) = update.violation {
            trace.on_event(TraceEvent::ViolationRaised { violation });
        }
        if update.state != self.state {
            trace.on_event(TraceEvent::SlaveTransition {
                from: self.state,
                to: update.state,
            });
        }

        self.state = update.state;
        self.pready = update.pready;
        self.prdata = update.prdata;
        self.pslverr = update.pslverr;
    }
}

#[cfg(test)]
mod tests {
    use super::{ApbSlave, SlaveInputs};
    use crate::{
        AccessViolation, ApbCompletion, ApbRequest, BusConfig, NoopTrace, SlaveState,
        StrobePolicy, TraceEvent, ViolationKind, CONSTANT_INDEX, DEFAULT_READ_ONLY_CONSTANT,
    };

    fn slave() -> ApbSlave {
        ApbSlave::new(&BusConfig::default()).expect("default config is valid")
    }

    fn setup(pwrite: bool, paddr: u32, pwdata: u32) -> SlaveInputs {
        SlaveInputs {
            request: ApbRequest {
                psel: true,
                penable: false,
                pwrite,
                paddr,
                pwdata,
                pstrb: 0xF,
            },
            ..SlaveInputs::default()
        }
    }

    fn access(pwrite: bool, paddr: u32, pwdata: u32) -> SlaveInputs {
        let mut inputs = setup(pwrite, paddr, pwdata);
        inputs.request.penable = true;
        inputs
    }

    #[test]
    fn write_asserts_ready_immediately_and_commits_in_access() {
        let mut slave = slave();

        slave.step(&setup(true, 0x08, 0xAA55), &mut NoopTrace);
        assert_eq!(slave.state(), SlaveState::WriteAccess);
        assert_eq!(
            slave.outputs(),
            ApbCompletion {
                pready: true,
                prdata: 0,
                pslverr: false
            }
        );
        assert_eq!(slave.registers().read(2, false), Ok(0));

        slave.step(&access(true, 0x08, 0xAA55), &mut NoopTrace);
        assert_eq!(slave.state(), SlaveState::Idle);
        assert!(!slave.outputs().pready);
        assert_eq!(slave.registers().read(2, false), Ok(0xAA55));
    }

    #[test]
    fn read_inserts_one_wait_state() {
        let mut slave = slave();

        slave.step(&setup(false, 0x0C, 0), &mut NoopTrace);
        assert_eq!(slave.state(), SlaveState::ReadAccess);
        assert!(!slave.outputs().pready);

        slave.step(&access(false, 0x0C, 0), &mut NoopTrace);
        assert_eq!(slave.state(), SlaveState::ReadFinish);
        assert_eq!(
            slave.outputs(),
            ApbCompletion {
                pready: true,
                prdata: DEFAULT_READ_ONLY_CONSTANT,
                pslverr: false
            }
        );

        slave.step(&SlaveInputs::default(), &mut NoopTrace);
        assert_eq!(slave.state(), SlaveState::Idle);
        assert!(!slave.outputs().pready);
        assert_eq!(slave.outputs().prdata, DEFAULT_READ_ONLY_CONSTANT);
    }

    #[test]
    fn read_without_enable_forces_zero_data() {
        let mut slave = slave();
        slave.step(&setup(false, 0x0C, 0), &mut NoopTrace);
        slave.step(&setup(false, 0x0C, 0), &mut NoopTrace);

        assert_eq!(slave.state(), SlaveState::ReadFinish);
        assert!(slave.outputs().pready);
        assert_eq!(slave.outputs().prdata, 0);
    }

    #[test]
    fn write_without_enable_is_not_committed() {
        let mut slave = slave();
        slave.step(&setup(true, 0x00, 1), &mut NoopTrace);
        slave.step(&setup(true, 0x00, 1), &mut NoopTrace);

        assert_eq!(slave.state(), SlaveState::Idle);
        assert!(!slave.control());
    }

    #[test]
    fn write_to_read_only_flags_error_one_tick_later() {
        let mut slave = slave();

        slave.step(&setup(true, 0x0C, 0xCAFE_BABE), &mut NoopTrace);
        assert!(slave.outputs().pslverr);
        assert!(slave.outputs().pready);

        slave.step(&access(true, 0x0C, 0xCAFE_BABE), &mut NoopTrace);
        assert!(!slave.outputs().pslverr);
        assert_eq!(
            slave.registers().read(CONSTANT_INDEX, false),
            Ok(DEFAULT_READ_ONLY_CONSTANT)
        );
    }

    #[test]
    fn read_of_write_only_flags_error_with_zero_data() {
        let mut slave = slave();
        slave.step(&setup(true, 0x04, 0x8765_4321), &mut NoopTrace);
        slave.step(&access(true, 0x04, 0x8765_4321), &mut NoopTrace);

        slave.step(&setup(false, 0x04, 0), &mut NoopTrace);
        assert!(!slave.outputs().pslverr);
        slave.step(&access(false, 0x04, 0), &mut NoopTrace);
        assert_eq!(
            slave.outputs(),
            ApbCompletion {
                pready: true,
                prdata: 0,
                pslverr: true
            }
        );

        slave.step(&SlaveInputs::default(), &mut NoopTrace);
        assert!(!slave.outputs().pslverr);
    }

    #[test]
    fn external_register_samples_status_during_read_access() {
        let mut slave = slave();
        slave.step(&setup(false, 0x10, 0), &mut NoopTrace);
        slave.step(
            &SlaveInputs {
                status: true,
                ..access(false, 0x10, 0)
            },
            &mut NoopTrace,
        );
        assert_eq!(slave.outputs().prdata, 1);
        assert!(!slave.outputs().pslverr);
    }

    #[test]
    fn unmapped_accesses_are_silent() {
        let mut slave = slave();
        slave.step(&setup(true, 0x1C, 0xFFFF), &mut NoopTrace);
        assert!(!slave.outputs().pslverr);
        slave.step(&access(true, 0x1C, 0xFFFF), &mut NoopTrace);

        slave.step(&setup(false, 0x1C, 0), &mut NoopTrace);
        slave.step(&access(false, 0x1C, 0), &mut NoopTrace);
        assert_eq!(
            slave.outputs(),
            ApbCompletion {
                pready: true,
                prdata: 0,
                pslverr: false
            }
        );
    }

    #[test]
    fn control_output_mirrors_register_zero() {
        let mut slave = slave();
        slave.step(&setup(true, 0x00, 1), &mut NoopTrace);
        assert!(!slave.control());
        slave.step(&access(true, 0x00, 1), &mut NoopTrace);
        assert!(slave.control());
    }

    #[test]
    fn byte_lane_policy_reaches_storage() {
        let config = BusConfig {
            strobe_policy: StrobePolicy::ByteLanes,
            ..BusConfig::default()
        };
        let mut slave = ApbSlave::new(&config).expect("valid config");
        let mut inputs = access(true, 0x08, 0x1122_3344);
        inputs.request.pstrb = 0b0010;

        slave.step(&setup(true, 0x08, 0x1122_3344), &mut NoopTrace);
        slave.step(&inputs, &mut NoopTrace);

        assert_eq!(slave.registers().read(2, false), Ok(0x0000_3300));
    }

    #[test]
    fn reset_clears_storage_and_output_registers() {
        let mut slave = slave();
        slave.step(&setup(true, 0x00, 1), &mut NoopTrace);
        slave.step(&access(true, 0x00, 1), &mut NoopTrace);
        slave.step(&setup(false, 0x0C, 0), &mut NoopTrace);
        slave.step(&access(false, 0x0C, 0), &mut NoopTrace);
        assert!(slave.control());
        assert!(slave.outputs().pready);

        slave.step(
            &SlaveInputs {
                reset: true,
                ..SlaveInputs::default()
            },
            &mut NoopTrace,
        );

        assert_eq!(slave, ApbSlave::new(&BusConfig::default()).expect("valid"));
    }

    #[test]
    fn violation_and_storage_events_are_traced() {
        let mut slave = slave();
        let mut events = Vec::new();

        slave.step(&setup(true, 0x0C, 5), &mut events);
        slave.step(&access(true, 0x0C, 5), &mut events);
        slave.step(&setup(true, 0x08, 5), &mut events);
        slave.step(&access(true, 0x08, 5), &mut events);

        assert_eq!(
            events,
            vec![
                TraceEvent::ViolationRaised {
                    violation: AccessViolation::new(ViolationKind::WriteToReadOnly, 3)
                },
                TraceEvent::SlaveTransition {
                    from: SlaveState::Idle,
                    to: SlaveState::WriteAccess
                },
                TraceEvent::SlaveTransition {
                    from: SlaveState::WriteAccess,
                    to: SlaveState::Idle
                },
                TraceEvent::SlaveTransition {
                    from: SlaveState::Idle,
                    to: SlaveState::WriteAccess
                },
                TraceEvent::RegisterWrite { index: 2, value: 5 },
                TraceEvent::SlaveTransition {
                    from: SlaveState::WriteAccess,
                    to: SlaveState::Idle
                },
            ]
        );
    }
}
