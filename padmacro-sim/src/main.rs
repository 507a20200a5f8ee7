//! Replays a scripted button timeline against the macro engine on a
//! simulated clock.
mod console;
mod script;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::Instant;
use log::info;
use padmacro::EVENT_CHANNEL_SIZE;
use padmacro::event::InputEvent;
use padmacro::hid::{Report, ReportOutput};
use padmacro::processor::{MacroProcessor, ProfileSource};
use padmacro::scheduler::Scheduler;
use padmacro::snapshot::StatusSnapshot;
use padmacro::types::color::Palette;
use padmacro::types::definition::ProfileSlots;
use padmacro_config::{ProfileManager, load_palette};

use crate::console::{ConsoleOutput, REPORTS, print_reports};
use crate::script::parse_script;

#[derive(Debug, Parser)]
#[command(name = "padmacro-sim")]
#[command(about = "Runs macro pad profiles against a scripted button timeline", long_about = None)]
struct Cli {
    /// Directory of profile files (.json or .toml)
    #[arg(short, long, value_name = "DIR")]
    profiles: PathBuf,
    /// Event script, one `<ms> down|up <button>`, `<ms> rotate <n>` or `<ms> estop` per line
    #[arg(short, long, value_name = "FILE")]
    script: PathBuf,
    /// File remembering the current profile
    #[arg(long, value_name = "FILE")]
    state: Option<PathBuf>,
    /// Palette file overriding the default light colors
    #[arg(long, value_name = "FILE")]
    palette: Option<PathBuf>,
    /// Simulated time between two ticks
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,
    /// How long to keep running after the last event
    #[arg(long, default_value_t = 2000)]
    tail_ms: u64,
    /// Seed of the random waits
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Also print the USB HID reports
    #[arg(long)]
    hid: bool,
}

/// Encoder rotation walks through the profile directory
struct DirectoryProfiles(ProfileManager);

impl ProfileSource for DirectoryProfiles {
    fn rotate(&mut self, step: i8) -> Option<ProfileSlots> {
        let profile = self.0.switch(step as i32);
        info!("Profile '{}' loaded", profile.name);
        Some(profile.slots.clone())
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut manager = ProfileManager::load(&cli.profiles)
        .with_context(|| format!("loading profiles from {}", cli.profiles.display()))?;
    if let Some(state) = &cli.state {
        manager = manager.with_state_file(state);
    }
    let palette = match &cli.palette {
        Some(path) => load_palette(path).with_context(|| format!("loading palette {}", path.display()))?,
        None => Palette::default(),
    };
    let text = fs::read_to_string(&cli.script).with_context(|| format!("reading {}", cli.script.display()))?;
    let events = parse_script(&text).with_context(|| format!("parsing {}", cli.script.display()))?;

    for error in manager.current().errors.iter() {
        println!("warning: {}", error);
    }
    println!(
        "profile '{}' ({} of {}), {} events",
        manager.current().name,
        manager.current_index() + 1,
        manager.len(),
        events.len()
    );

    let reports: Channel<NoopRawMutex, Report, REPORTS> = Channel::new();
    let inputs: Channel<NoopRawMutex, InputEvent, EVENT_CHANNEL_SIZE> = Channel::new();
    let hid = cli.hid.then(|| ReportOutput::new(reports.sender()));

    let mut scheduler: Scheduler<_> = Scheduler::with_seed(ConsoleOutput::new(hid), cli.seed);
    scheduler.load_profile(manager.current().slots.clone());
    let mut processor = MacroProcessor::new(scheduler, DirectoryProfiles(manager), inputs.receiver());

    let end_ms = events.last().map_or(0, |e| e.at_ms) + cli.tail_ms;
    let mut pending = events.iter().peekable();
    let mut previous = processor.scheduler().snapshot(Instant::from_millis(0));
    let mut now_ms = 0;
    loop {
        while let Some(e) = pending.next_if(|e| e.at_ms <= now_ms) {
            println!("{:>8} ms  in     {:?}", now_ms, e.event);
            inputs
                .try_send(e.event)
                .map_err(|_| anyhow!("more than {} events at {} ms", EVENT_CHANNEL_SIZE, now_ms))?;
        }

        let now = Instant::from_millis(now_ms);
        processor.scheduler_mut().output_mut().now_ms = now_ms;
        processor.poll(now);
        print_reports(now_ms, &reports.receiver());

        let snapshot = processor.scheduler().snapshot(now);
        print_changes(now_ms, &previous, &snapshot);
        previous = snapshot;

        if now_ms >= end_ms {
            break;
        }
        now_ms += cli.tick_ms;
    }

    let now = Instant::from_millis(now_ms);
    let colors = processor.scheduler().indicator_colors(now, &palette);
    println!("final state at {} ms, profile '{}'", now_ms, processor.profiles().0.current().name);
    for (index, button) in previous.buttons.iter().enumerate() {
        let Some(name) = &button.name else {
            continue;
        };
        let color = colors[index];
        println!(
            "  button {:>2} {:<20} {:?} rgb({}, {}, {})",
            index, name, button.status, color.r, color.g, color.b
        );
    }
    Ok(())
}

fn print_changes(now_ms: u64, previous: &StatusSnapshot, snapshot: &StatusSnapshot) {
    for index in snapshot.changed_since(previous) {
        let button = &snapshot.buttons[index];
        let name = button.name.as_deref().unwrap_or("-");
        println!(
            "{:>8} ms  state  button {:>2} '{}' {:?} -> {:?}",
            now_ms, index, name, previous.buttons[index].status, button.status
        );
    }
    if snapshot.queue != previous.queue && !snapshot.queue.is_empty() {
        let queue: Vec<u8> = snapshot.queue.iter().map(|entry| entry.button).collect();
        println!("{:>8} ms  queue  {:?}", now_ms, queue);
    }
    if let Some(alert) = snapshot.alert {
        if previous.alert != Some(alert) {
            println!(
                "{:>8} ms  alert  {:?} until {} ms",
                now_ms,
                alert.reason,
                alert.until.as_millis()
            );
        }
    }
}
