//! Closed loop against the simulated plant, without real-time sleeps.

use thermoreg::adapters::sim::{SimAdc, SimPwm, ThermalPlant};
use thermoreg::app::ports::HeaterPort;
use thermoreg::app::service::{RegulatorService, TaskDispatcher};
use thermoreg::config::RegulatorConfig;
use thermoreg::scheduler::Scheduler;

use crate::mock_hw::{MockTransport, leak_cell};

/// Records the regulator's duty values before the simulated PWM clips them.
#[derive(Default)]
struct Probe {
    pwm: SimPwm,
    duties: Vec<i32>,
}

impl HeaterPort for Probe {
    fn configure(&mut self, period: u16, initial_duty: i32) {
        self.pwm.configure(period, initial_duty);
    }

    fn write_duty(&mut self, duty: i32) {
        self.duties.push(duty);
        self.pwm.write_duty(duty);
    }
}

fn simulate(config: RegulatorConfig, run_ms: u64) -> (RegulatorService, ThermalPlant, Probe) {
    let mut plant = ThermalPlant::default().with_calibration(&config);
    let mut adc = SimAdc::new();
    let mut heater = Probe::default();
    let mut transport = MockTransport::default();
    let mut sched = Scheduler::new();
    let mut service = RegulatorService::new(config, leak_cell()).unwrap();
    service
        .start(&mut adc, &mut sched, &mut transport, &mut heater)
        .unwrap();

    for ms in 1..=run_ms {
        plant.step(heater.pwm.power(), 0.001);
        adc.convert(plant.raw_reading());
        sched.tick(
            ms,
            &mut TaskDispatcher {
                service: &mut service,
                heater: &mut heater,
                sink: &mut transport,
            },
        );
    }
    (service, plant, heater)
}

#[test]
fn one_control_cycle_per_window() {
    let (service, _, heater) = simulate(RegulatorConfig::default(), 20_000);
    // Filter at 50, 60, …, 20_000.
    assert_eq!(service.filter_ticks(), 1996);
    assert_eq!(service.control_cycles(), 1996 / 5);
    assert_eq!(heater.duties.len() as u64, service.control_cycles());
}

#[test]
fn out_of_band_duty_is_pinned_on_the_next_cycle() {
    let (_, _, heater) = simulate(RegulatorConfig::default(), 20_000);
    for pair in heater.duties.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if prev >= 1000 {
            assert_eq!(next, 999, "after {prev}");
        } else if prev <= 100 {
            assert_eq!(next, 101, "after {prev}");
        }
    }
}

#[test]
fn plant_warms_from_ambient() {
    let (service, plant, _) = simulate(RegulatorConfig::default(), 10_000);
    assert!(plant.temperature() > 25.0);
    assert!(service.temperature() > 0);
}
