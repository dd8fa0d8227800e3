//! Regulator service — the hexagonal core.
//!
//! [`RegulatorService`] owns the filter, PID controller and duty regulator
//! and the handle issued by the transport.  All I/O flows through port
//! traits passed in at call sites, so the whole loop is testable with
//! mock adapters.
//!
//! ```text
//!  SamplingSource ──▶ LatestValue ──▶ ┌───────────────────────┐ ──▶ CommandSink
//!                                     │   RegulatorService    │
//!  TaskScheduler ──(Filter/Diag)────▶ │ Filter · PID · Duty   │ ──▶ HeaterPort
//!                                     └───────────────────────┘
//! ```

use core::fmt;

use log::{debug, info, trace, warn};

use crate::config::RegulatorConfig;
use crate::control::actuator::{DutyAction, DutyRegulator};
use crate::control::filter::MovingAverage;
use crate::control::pid::{PidController, PidTerms};
use crate::error::Result;
use crate::sensors::{ChannelConfig, LatestValue, SampleHandler};

use super::events::{Telemetry, TemperatureReply, render};
use super::ports::{
    CommandSink, HeaterPort, SamplingSource, SchedulerDelegate, SubsystemId, TaskId,
    TaskScheduler, Version,
};

/// Name the regulator registers under with the command transport.
pub const SUBSYSTEM_NAME: &str = "Temp";
/// Version reported at registration (1.1.1).
pub const SUBSYSTEM_VERSION: Version = Version::from_word(0x0101_0001);

/// Start-up steps already completed.
#[derive(Debug, Clone, Copy, Default)]
struct Bringup {
    pwm: bool,
    channel: bool,
    filter_task: bool,
    diagnostics_task: bool,
}

impl Bringup {
    fn is_complete(&self) -> bool {
        self.pwm && self.channel && self.filter_task && self.diagnostics_task
    }
}

/// Result of one completed filter window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlCycle {
    pub temperature_c: i32,
    pub terms: PidTerms,
    pub duty: i32,
    pub action: DutyAction,
}

// ───────────────────────────────────────────────────────────────
// RegulatorService
// ───────────────────────────────────────────────────────────────

pub struct RegulatorService {
    config: RegulatorConfig,
    latest: &'static LatestValue,
    filter: MovingAverage,
    pid: PidController,
    duty: DutyRegulator,
    subsystem: Option<SubsystemId>,
    bringup: Bringup,
    filter_ticks: u64,
    control_cycles: u64,
}

impl RegulatorService {
    /// Validate the configuration and build every state record.
    ///
    /// Nothing is registered with any collaborator yet, so no sample or
    /// tick can reach the loop before its state exists.  Call [`start`]
    /// next.
    ///
    /// [`start`]: Self::start
    pub fn new(config: RegulatorConfig, latest: &'static LatestValue) -> Result<Self> {
        config.validate()?;
        let filter = MovingAverage::from_config(&config)?;
        let pid = PidController::from_config(&config)?;
        let duty = DutyRegulator::from_config(&config);

        Ok(Self {
            config,
            latest,
            filter,
            pid,
            duty,
            subsystem: None,
            bringup: Bringup::default(),
            filter_ticks: 0,
            control_cycles: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Bring the loop up in dependency order: PWM output, sampling
    /// channel, transport registration, then the periodic tasks.
    ///
    /// Each completed step is recorded.  If a collaborator refuses one, the
    /// error is returned and a later call resumes at that step without
    /// repeating the earlier ones.  Once every step has succeeded further
    /// calls do nothing.
    pub fn start(
        &mut self,
        adc: &mut impl SamplingSource,
        scheduler: &mut impl TaskScheduler,
        sink: &mut impl CommandSink,
        heater: &mut impl HeaterPort,
    ) -> Result<()> {
        if self.bringup.is_complete() {
            warn!("Regulator already started, ignoring");
            return Ok(());
        }

        let c = &self.config;
        if !self.bringup.pwm {
            heater.configure(c.pwm_period, self.duty.duty());
            self.bringup.pwm = true;
            info!("PWM: period={} initial duty={}", c.pwm_period, self.duty.duty());
        }

        if !self.bringup.channel {
            adc.register_channel(
                ChannelConfig {
                    channel: c.adc_channel,
                    resolution_bits: c.adc_resolution_bits,
                },
                SampleHandler::new(self.latest),
            )?;
            self.bringup.channel = true;
            info!("ADC: channel {} at {} bits", c.adc_channel, c.adc_resolution_bits);
        }

        if self.subsystem.is_none() {
            let id = sink.register(SUBSYSTEM_NAME, SUBSYSTEM_VERSION)?;
            self.subsystem = Some(id);
            info!("Registered subsystem '{}' v{}", SUBSYSTEM_NAME, SUBSYSTEM_VERSION);
            self.send(sink, &"Initialized");
        }

        let c = &self.config;
        if !self.bringup.filter_task {
            scheduler.register(TaskId::Filter, c.filter_initial_delay_ms, c.filter_period_ms)?;
            self.bringup.filter_task = true;
        }
        if !self.bringup.diagnostics_task {
            scheduler.register(
                TaskId::Diagnostics,
                c.diagnostics_initial_delay_ms,
                c.diagnostics_period_ms,
            )?;
            self.bringup.diagnostics_task = true;
        }

        info!(
            "Regulator started: setpoint={}°C filter every {}ms, diagnostics every {}ms",
            c.setpoint_c, c.filter_period_ms, c.diagnostics_period_ms
        );
        Ok(())
    }

    /// Whether every start-up step has completed.
    pub fn is_started(&self) -> bool {
        self.bringup.is_complete() && self.subsystem.is_some()
    }

    // ── Periodic tasks ────────────────────────────────────────

    /// Filter task: one sample into the window; on a full window run the
    /// controller once and write the new duty.
    pub fn filter_tick(&mut self, heater: &mut impl HeaterPort) -> Option<ControlCycle> {
        self.filter_ticks += 1;
        let raw = self.latest.load();
        let temperature_c = self.filter.push(raw)?;

        let terms = self.pid.compute(temperature_c);
        let (duty, action) = self.duty.apply(terms.output);
        heater.write_duty(duty);
        self.control_cycles += 1;

        if action != DutyAction::Adjusted {
            debug!("Duty pinned {:?} -> {}", action, duty);
        }

        Some(ControlCycle {
            temperature_c,
            terms,
            duty,
            action,
        })
    }

    /// Diagnostics task: temperature, duty and the three PID terms.
    pub fn report_diagnostics(&self, sink: &mut impl CommandSink) {
        self.send(sink, &self.telemetry());
    }

    /// Dispatch a task fired by the scheduler.
    pub fn run_task(
        &mut self,
        task: TaskId,
        heater: &mut impl HeaterPort,
        sink: &mut impl CommandSink,
    ) {
        match task {
            TaskId::Filter => {
                self.filter_tick(heater);
            }
            TaskId::Diagnostics => self.report_diagnostics(sink),
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Handler for commands addressed to this subsystem.  Arguments are
    /// accepted and ignored; the reply is always the current temperature.
    pub fn handle_command(&self, _args: &[&str], sink: &mut impl CommandSink) {
        self.send(
            sink,
            &TemperatureReply {
                temperature_c: self.filter.temperature(),
            },
        );
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn telemetry(&self) -> Telemetry {
        let terms = self.pid.last_terms();
        Telemetry {
            temperature_c: self.filter.temperature(),
            duty: self.duty.duty(),
            proportional: terms.proportional,
            derivative: terms.derivative,
            integral: terms.integral,
        }
    }

    /// Last published filtered temperature.
    pub fn temperature(&self) -> i32 {
        self.filter.temperature()
    }

    /// Current compare value.
    pub fn duty(&self) -> i32 {
        self.duty.duty()
    }

    pub fn controller(&self) -> &PidController {
        &self.pid
    }

    /// Handle issued by the transport, once started.
    pub fn subsystem(&self) -> Option<SubsystemId> {
        self.subsystem
    }

    pub fn filter_ticks(&self) -> u64 {
        self.filter_ticks
    }

    pub fn control_cycles(&self) -> u64 {
        self.control_cycles
    }

    // ── Internal ──────────────────────────────────────────────

    /// Fire-and-forget report.  A busy or failing transport drops the
    /// message; the control loop never waits or retries.
    fn send(&self, sink: &mut impl CommandSink, report: &impl fmt::Display) {
        let Some(id) = self.subsystem else {
            trace!("Report before start dropped");
            return;
        };
        if let Err(e) = render(report).and_then(|msg| sink.report(id, &msg)) {
            trace!("Report dropped: {}", e);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate
// ───────────────────────────────────────────────────────────────

/// Bridges the scheduler to the service: every due task is run against
/// the borrowed heater and transport.
pub struct TaskDispatcher<'a, H, C> {
    pub service: &'a mut RegulatorService,
    pub heater: &'a mut H,
    pub sink: &'a mut C,
}

impl<H: HeaterPort, C: CommandSink> SchedulerDelegate for TaskDispatcher<'_, H, C> {
    fn on_task_due(&mut self, task: TaskId) {
        self.service.run_task(task, self.heater, self.sink);
    }
}
