//! Lightshow - audio-reactive RGB fixtures
//!
//! Entry point. It:
//! 1. Loads and validates the YAML configuration
//! 2. Opens the requested capture device, or probes all of them
//! 3. Opens both fixtures on GPIO (or simulated outputs with `--dry-run`)
//! 4. Runs the control loop until Ctrl-C, then turns every LED off

mod cli;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use lightshow_core::audio::{input_device_names, open_input, AudioError, CaptureStream};
use lightshow_core::config::{default_config_path, load_config, ShowConfig};
use lightshow_core::control::{ControlLoop, ShutdownToken, SystemClock};
use lightshow_core::hardware::{OutputBackend, SimulatedBackend};

use cli::Cli;

fn main() -> ExitCode {
    // Set RUST_LOG=debug for verbose output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    if cli.list_devices {
        print_sound_cards(&input_device_names());
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    log::info!("lightshow {} starting up", env!("CARGO_PKG_VERSION"));

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config: ShowConfig = load_config(&config_path);
    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;

    let (device_name, capture) = match open_input(cli.device.as_deref(), &config.capture) {
        Ok(opened) => opened,
        Err(e) => {
            println!("{}\n", e);
            let available = match e {
                AudioError::DeviceUnavailable { available, .. } => available,
                _ => input_device_names(),
            };
            print_sound_cards(&available);
            return Ok(ExitCode::FAILURE);
        }
    };
    println!("Using device: {}", device_name);

    let token = ShutdownToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .context("Failed to install Ctrl-C handler")?;

    #[cfg(all(target_os = "linux", feature = "gpio"))]
    if !cli.dry_run {
        let backend = lightshow_core::hardware::GpioBackend::new(config.pin_numbering)
            .context("GPIO unavailable (use --dry-run to test without hardware)")?;
        return drive(&config, capture, backend, &token);
    }

    if !cli.dry_run {
        log::warn!("Built without GPIO support, driving simulated outputs");
    }
    drive(&config, capture, SimulatedBackend::new(), &token)
}

fn drive<B: OutputBackend>(
    config: &ShowConfig,
    capture: CaptureStream,
    backend: B,
    token: &ShutdownToken,
) -> anyhow::Result<ExitCode> {
    let control =
        ControlLoop::new(config, capture, backend).context("Failed to initialize fixtures")?;
    let stats = control
        .run(&mut SystemClock, token)
        .context("Light show stopped")?;

    log::debug!("{:?}", stats);
    println!("\nLights out. Goodbye!");
    Ok(ExitCode::SUCCESS)
}

fn print_sound_cards(devices: &[String]) {
    println!("Valid devices found:");
    for device in devices {
        println!("\"{}\"", device);
    }
    println!();
}
