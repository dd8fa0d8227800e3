//! Regulator service driven by the real scheduler against mock adapters.

use std::sync::atomic::{AtomicBool, Ordering};

use thermoreg::adapters::log_sink::LogTransport;
use thermoreg::app::ports::TaskId;
use thermoreg::app::service::{RegulatorService, SUBSYSTEM_NAME, SUBSYSTEM_VERSION, TaskDispatcher};
use thermoreg::config::RegulatorConfig;
use thermoreg::error::{Error, SamplingError};
use thermoreg::scheduler::Scheduler;
use thermoreg::sensors::ChannelConfig;

use crate::mock_hw::{MockAdc, MockPwm, MockTransport, leak_cell};

struct Rig {
    service: RegulatorService,
    adc: MockAdc,
    sched: Scheduler,
    transport: MockTransport,
    pwm: MockPwm,
}

impl Rig {
    fn start(config: RegulatorConfig, busy: bool) -> Self {
        let mut rig = Self {
            service: RegulatorService::new(config, leak_cell()).unwrap(),
            adc: MockAdc::default(),
            sched: Scheduler::new(),
            transport: MockTransport {
                busy,
                ..Default::default()
            },
            pwm: MockPwm::default(),
        };
        rig.service
            .start(&mut rig.adc, &mut rig.sched, &mut rig.transport, &mut rig.pwm)
            .unwrap();
        rig
    }

    /// Advance to `until_ms`, one conversion of `raw` per millisecond.
    fn run(&mut self, from_ms: u64, until_ms: u64, raw: u16) {
        for ms in from_ms..=until_ms {
            self.adc.complete(raw);
            self.sched.tick(
                ms,
                &mut TaskDispatcher {
                    service: &mut self.service,
                    heater: &mut self.pwm,
                    sink: &mut self.transport,
                },
            );
        }
    }
}

#[test]
fn start_up_registers_everything_in_order() {
    let rig = Rig::start(RegulatorConfig::default(), false);

    assert_eq!(rig.pwm.period, Some(1000));
    assert_eq!(rig.pwm.initial, Some(100));
    assert_eq!(
        rig.adc.channel,
        Some(ChannelConfig {
            channel: 0,
            resolution_bits: 10
        })
    );
    assert_eq!(rig.transport.registered, vec![(SUBSYSTEM_NAME, SUBSYSTEM_VERSION)]);
    assert_eq!(rig.transport.messages, vec!["Initialized"]);
    assert_eq!(rig.sched.task_count(), 2);
}

#[test]
fn first_hundred_milliseconds() {
    let mut rig = Rig::start(RegulatorConfig::default(), false);
    rig.run(0, 100, 400); // 30 °C

    // Filter at 50..=100 (6 ticks), one full window at 90 ms.
    assert_eq!(rig.sched.runs(TaskId::Filter), 6);
    assert_eq!(rig.service.filter_ticks(), 6);
    assert_eq!(rig.service.control_cycles(), 1);
    assert_eq!(rig.pwm.writes, vec![101]);

    // Diagnostics at 60 ms, before any control cycle.
    assert_eq!(
        rig.transport.messages,
        vec!["Initialized", "Temperature, PWM, Error: 0, 100, 0.00, 0.00, 0.00"]
    );
}

#[test]
fn diagnostics_once_per_second() {
    let mut rig = Rig::start(RegulatorConfig::default(), false);
    rig.run(0, 2100, 400);
    assert_eq!(rig.sched.runs(TaskId::Diagnostics), 3);
    let diag = rig
        .transport
        .messages
        .iter()
        .filter(|m| m.starts_with("Temperature, PWM, Error:"))
        .count();
    assert_eq!(diag, 3);
}

#[test]
fn busy_transport_does_not_disturb_control() {
    let mut quiet = Rig::start(RegulatorConfig::default(), true);
    let mut normal = Rig::start(RegulatorConfig::default(), false);
    quiet.run(0, 2100, 520);
    normal.run(0, 2100, 520);

    assert!(quiet.transport.messages.is_empty());
    assert_eq!(quiet.transport.dropped, 4); // Initialized + 3 diagnostics
    assert_eq!(quiet.pwm.writes, normal.pwm.writes);
    assert_eq!(quiet.service.duty(), normal.service.duty());
    assert_eq!(
        quiet.service.controller().running_integral(),
        normal.service.controller().running_integral()
    );
}

#[test]
fn refused_channel_aborts_start_before_transport() {
    let mut service = RegulatorService::new(RegulatorConfig::default(), leak_cell()).unwrap();
    let mut adc = MockAdc {
        refuse: Some(SamplingError::InvalidChannel(0)),
        ..Default::default()
    };
    let mut sched = Scheduler::new();
    let mut transport = MockTransport::default();
    let mut pwm = MockPwm::default();

    let err = service
        .start(&mut adc, &mut sched, &mut transport, &mut pwm)
        .unwrap_err();
    assert_eq!(err, Error::Sampling(SamplingError::InvalidChannel(0)));
    assert!(transport.registered.is_empty());
    assert_eq!(sched.task_count(), 0);
    assert_eq!(service.subsystem(), None);
}

#[test]
fn configured_setpoint_drives_error() {
    let config: RegulatorConfig = serde_json::from_str(r#"{ "setpoint_c": 60 }"#).unwrap();
    let mut rig = Rig::start(config, false);
    rig.run(0, 90, 400);
    assert_eq!(rig.service.controller().last_terms().error, 30);
    assert_eq!(rig.service.controller().running_integral(), 30);
}

#[test]
fn console_line_reaches_regulator() {
    let mut service = RegulatorService::new(RegulatorConfig::default(), leak_cell()).unwrap();
    let mut transport = LogTransport::new();
    service
        .start(
            &mut MockAdc::default(),
            &mut Scheduler::new(),
            &mut transport,
            &mut MockPwm::default(),
        )
        .unwrap();

    let cmd = transport.dispatch("Temp").unwrap();
    assert_eq!(Some(cmd.subsystem), service.subsystem());
    assert!(cmd.args.is_empty());
    assert!(transport.dispatch("Heater on").is_none());
}

#[test]
fn sampling_faster_than_filtering_never_blocks() {
    let latest = leak_cell();
    let mut service = RegulatorService::new(RegulatorConfig::default(), latest).unwrap();
    let mut adc = MockAdc::default();
    let mut pwm = MockPwm::default();
    service
        .start(
            &mut adc,
            &mut Scheduler::new(),
            &mut MockTransport::default(),
            &mut pwm,
        )
        .unwrap();
    let handler = adc.handler().unwrap();
    handler.on_conversion(400);

    let stop = AtomicBool::new(false);
    std::thread::scope(|s| {
        s.spawn(|| {
            let mut flip = false;
            while !stop.load(Ordering::Relaxed) {
                handler.on_conversion(if flip { 600 } else { 400 });
                flip = !flip;
            }
        });

        for _ in 0..500 {
            if let Some(cycle) = service.filter_tick(&mut pwm) {
                assert!(
                    (30..=50).contains(&cycle.temperature_c),
                    "torn or invalid sample produced {} °C",
                    cycle.temperature_c
                );
            }
        }
        stop.store(true, Ordering::Relaxed);
    });

    assert_eq!(service.control_cycles(), 100);
    assert_eq!(pwm.writes.len(), 100);
}
