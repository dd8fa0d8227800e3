//! Thermoreg host simulator — Main Entry Point
//!
//! Runs the real regulator core against simulated hardware at 1 ms
//! resolution.  Command lines typed on stdin (`Temp`) are routed to the
//! regulator through the console transport.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │   ThermalPlant ──raw──▶ SimAdc ──▶ LatestValue               │
//! │        ▲                              │                      │
//! │        │ power                        ▼                      │
//! │      SimPwm ◀── RegulatorService ◀── Scheduler (1 ms tick)   │
//! │                      │                                       │
//! │                      ▼                                       │
//! │                 LogTransport ◀── stdin command lines         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `thermoreg-sim [config.json] [run_ms]`

use std::io::BufRead;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};

use thermoreg::adapters::log_sink::LogTransport;
use thermoreg::adapters::sim::{SimAdc, SimPwm, ThermalPlant};
use thermoreg::app::service::{RegulatorService, TaskDispatcher};
use thermoreg::config::RegulatorConfig;
use thermoreg::scheduler::Scheduler;
use thermoreg::sensors::LatestValue;

/// Written by the converter callback, read by the filter task.
static LATEST: LatestValue = LatestValue::new(0);

/// Converter and plant step.
const TICK_MS: u64 = 1;

fn load_config(path: Option<&str>) -> Result<RegulatorConfig> {
    let Some(path) = path else {
        info!("No config file given, using defaults");
        return Ok(RegulatorConfig::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let config: RegulatorConfig =
        serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?;
    info!("Config loaded from {}", path);
    Ok(config)
}

/// Forward stdin lines to the main loop.
fn spawn_console() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_millis()
        .init();

    info!("Thermoreg simulator v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Arguments and config ───────────────────────────────
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(args.first().map(String::as_str))?;
    let run_ms = match args.get(1) {
        Some(s) => Some(s.parse::<u64>().with_context(|| format!("bad run time '{s}'"))?),
        None => None,
    };

    // ── 3. Adapters ───────────────────────────────────────────
    let mut plant = ThermalPlant::default().with_calibration(&config);
    let mut adc = SimAdc::new();
    let mut pwm = SimPwm::new();
    let mut transport = LogTransport::new();
    let mut sched = Scheduler::new();

    // ── 4. Regulator ──────────────────────────────────────────
    let mut service = RegulatorService::new(config, &LATEST).context("invalid configuration")?;
    service
        .start(&mut adc, &mut sched, &mut transport, &mut pwm)
        .context("regulator start-up failed")?;

    let console = spawn_console();
    info!("System ready. Entering main loop.");

    // ── 5. Main loop ──────────────────────────────────────────
    let dt_s = TICK_MS as f32 / 1000.0;
    let mut now_ms: u64 = 0;

    loop {
        std::thread::sleep(Duration::from_millis(TICK_MS));
        now_ms += TICK_MS;

        plant.step(pwm.power(), dt_s);
        adc.convert(plant.raw_reading());

        while let Ok(line) = console.try_recv() {
            match transport.dispatch(&line) {
                Some(cmd) if Some(cmd.subsystem) == service.subsystem() => {
                    service.handle_command(&cmd.args, &mut transport);
                }
                Some(_) => {}
                None if line.trim().is_empty() => {}
                None => warn!("Unknown command: {}", line.trim()),
            }
        }

        sched.tick(
            now_ms,
            &mut TaskDispatcher {
                service: &mut service,
                heater: &mut pwm,
                sink: &mut transport,
            },
        );

        if run_ms.is_some_and(|limit| now_ms >= limit) {
            break;
        }
    }

    info!(
        "Stopped after {} ms: plant {:.1} °C, filtered {} °C, duty {}, {} control cycles",
        now_ms,
        plant.temperature(),
        service.temperature(),
        service.duty(),
        service.control_cycles()
    );
    Ok(())
}
