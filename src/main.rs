/*
 *  main.rs
 *
 *  PlusOne - a dot for every second
 *	(c) 2020-26 Stuart Hunter
 *
 *	Desktop host for the watchface: ticks, shakes and bluetooth changes
 *	are simulated and frames rendered into memory (optionally to a PPM).
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use embedded_graphics::prelude::*;
use env_logger::Env;
use log::{debug, error, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use plusone::APP_NAME;
use plusone::config::{self, Cli};
use plusone::display::drivers::MemoryDriver;
use plusone::display::{ColorDepth, DisplayDriver, Palette, PaletteKind, WatchHost, Watchface};
use plusone::sim::SimHost;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Longest we ever sleep waiting for a timer
const IDLE_WAIT: Duration = Duration::from_secs(3600);

/// Commands read from stdin, one per line
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Shake,
    ToggleBluetooth,
    Bluetooth(bool),
    Battery(u8),
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let cmd = match words.next()? {
        "s" | "shake" | "tap" => Command::Shake,
        "b" | "bt" => Command::ToggleBluetooth,
        "c" | "connect" => Command::Bluetooth(true),
        "d" | "disconnect" => Command::Bluetooth(false),
        "p" | "battery" => Command::Battery(words.next()?.parse().ok()?),
        "q" | "quit" | "exit" => Command::Quit,
        _ => return None,
    };
    Some(cmd)
}

/// What woke the loop
enum Wake {
    Tick,
    Timer,
    Line(String),
    Eof,
    Shutdown,
}

/// Waits for a SIGINT, SIGTERM, or SIGHUP signal.
#[cfg(unix)]
async fn signal_handler() -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

#[cfg(not(unix))]
async fn signal_handler() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received. Initiating graceful shutdown.");
    Ok(())
}

fn render_frame(face: &mut Watchface, host: &SimHost, driver: &mut MemoryDriver, snapshot: Option<&Path>) {
    let Ok(()) = face.render(host, driver);

    driver.flush().unwrap_or_else(|e| error!("Failed to flush frame: {}", e));

    if let Some(path) = snapshot {
        driver
            .save_to_ppm(path)
            .unwrap_or_else(|e| warn!("Failed to write snapshot {}: {}", path.display(), e));
    }
}

/// Apply one stdin command; false means stop
fn handle_command(face: &mut Watchface, host: &mut SimHost, cmd: Command) -> bool {
    match cmd {
        Command::Shake => {
            face.on_tap(host);
            debug!("Shake -> phase {:?}, armed {}", face.phase(), face.is_armed());
        }
        Command::ToggleBluetooth => {
            let connected = !host.is_connected();
            host.set_connected(connected);
            face.on_bluetooth(host, connected);
        }
        Command::Bluetooth(connected) => {
            host.set_connected(connected);
            face.on_bluetooth(host, connected);
        }
        Command::Battery(percent) => {
            host.set_battery_percent(percent);
            info!("Battery now {}%", host.battery_percent());
        }
        Command::Quit => return false,
    }

    for pulse in host.take_pulses() {
        info!("Vibe: {:?}", pulse);
    }
    true
}

/// Event loop standing in for the host toolkit
async fn run(
    face: &mut Watchface,
    host: &mut SimHost,
    driver: &mut MemoryDriver,
    snapshot: Option<&Path>,
) {
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = signal_handler();
    tokio::pin!(shutdown);

    let mut last = Instant::now();

    info!("Commands: s(hake), b(t toggle), c(onnect), d(isconnect), p <percent>, q(uit)");

    loop {
        let wait = host.until_next_timer().unwrap_or(IDLE_WAIT);

        let wake = tokio::select! {
            _ = ticker.tick() => Wake::Tick,
            _ = tokio::time::sleep(wait) => Wake::Timer,
            line = lines.next_line() => match line {
                Ok(Some(line)) => Wake::Line(line),
                Ok(None) => Wake::Eof,
                Err(e) => {
                    error!("Failed to read stdin: {}", e);
                    Wake::Eof
                }
            },
            res = &mut shutdown => {
                if let Err(e) = res {
                    error!("Signal handler failed: {}", e);
                }
                Wake::Shutdown
            }
        };

        // bring the virtual clock up to date before handling anything
        let now = Instant::now();
        host.advance(now.duration_since(last));
        last = now;

        match wake {
            Wake::Tick => face.on_tick(),
            Wake::Timer => {}
            Wake::Line(line) => match parse_command(&line) {
                Some(cmd) => {
                    if !handle_command(face, host, cmd) {
                        break;
                    }
                }
                None if line.trim().is_empty() => {}
                None => warn!("Unknown command: {}", line.trim()),
            },
            Wake::Eof => {
                info!("stdin closed, stopping");
                break;
            }
            Wake::Shutdown => break,
        }

        while let Some(handle) = host.pop_due() {
            face.on_timer(host, handle);
        }

        if face.is_dirty() {
            render_frame(face, host, driver, snapshot);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli).context("loading configuration")?;

    if cli.dump_config {
        println!("{}", config::dump(&cfg)?);
        return Ok(());
    }

    env_logger::Builder::from_env(Env::default().default_filter_or(cfg.log_level()))
        .format_timestamp_secs()
        .init();

    info!("This is {} - a dot for every second", APP_NAME);
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let (width, height) = cfg.display_size();
    let depth = match cfg.palette_kind() {
        Some(PaletteKind::Mono) => ColorDepth::Monochrome,
        _ => ColorDepth::Color,
    };
    let mut driver = MemoryDriver::new(width, height, depth)?;
    driver.init()?;

    let mut host = SimHost::new(Local::now().naive_local());
    host.set_battery_percent(cfg.battery_percent());
    host.set_connected(cfg.bluetooth());
    host.set_hour_24(cfg.hour_24());

    let mut face = Watchface::new(cfg.face_config(Palette::for_depth(driver.capabilities().color_depth)));
    face.on_load(&mut host, driver.size());
    render_frame(&mut face, &host, &mut driver, cfg.snapshot());

    run(&mut face, &mut host, &mut driver, cfg.snapshot()).await;

    face.on_unload();
    info!("Frames flushed: {}", driver.state().lock().map(|s| s.flush_count).unwrap_or(0));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("s"), Some(Command::Shake));
        assert_eq!(parse_command("  shake  "), Some(Command::Shake));
        assert_eq!(parse_command("bt"), Some(Command::ToggleBluetooth));
        assert_eq!(parse_command("d"), Some(Command::Bluetooth(false)));
        assert_eq!(parse_command("p 42"), Some(Command::Battery(42)));
        assert_eq!(parse_command("p lots"), None);
        assert_eq!(parse_command("q"), Some(Command::Quit));
        assert_eq!(parse_command("dance"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn test_toggle_bluetooth_pulses() {
        let mut host = SimHost::default();
        let mut face = Watchface::new(Default::default());
        face.on_load(&mut host, plusone::display::SCREEN_SIZE);

        assert!(handle_command(&mut face, &mut host, Command::ToggleBluetooth));
        assert!(!host.is_connected());
        assert!(!face.is_connected());

        // the pulse was reported and the record drained
        assert!(host.pulses().is_empty());
        assert!(handle_command(&mut face, &mut host, Command::ToggleBluetooth));
        assert!(face.is_connected());
        assert!(host.pulses().is_empty());
        assert!(!handle_command(&mut face, &mut host, Command::Quit));
    }
}
