use pktgen::config::{self, LaunchConfig};
use pktgen::control::Controller;
use pktgen::error::ConfigError;
use pktgen::runtime::Config;
use pktgen::shell;
use pktgen::stats::Stats;
use pktgen::ui;
use pktgen::worker::{self, Worker};
mod cmd;

use std::io::{self, Write};
use std::path::Path;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use clap::Parser;
use crossbeam_channel::bounded;

/// The entry point of the application.
///
/// Startup misconfigurations are fatal: nothing is started if the launch parameters are invalid.
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = cmd::Args::parse();

    match setup(&args) {
        Ok((launch, config)) => run(launch, config),
        Err(e) => {
            log::error!("{e}");
            process::exit(1);
        }
    }
}

/// Load the configuration file, if any, and apply the command line on top of it
fn setup(args: &cmd::Args) -> Result<(LaunchConfig, Config), ConfigError> {
    let mut launch = match &args.config {
        Some(path) => config::load_config(Path::new(path))?,
        None => LaunchConfig::default(),
    };
    if let Some(num_flows) = args.num_flows {
        launch.num_flows = num_flows;
    }
    if let Some(num_cores) = args.num_cores {
        launch.num_cores = num_cores;
    }
    if let Some(rate) = args.rate {
        launch.rate = rate as f64 / 1000.;
    }
    if let Some(churn) = args.churn {
        launch.churn = churn as f64;
    }
    if let Some(packet_size) = args.packet_size {
        launch.packet_size = packet_size;
    }
    if let Some(stats_interval) = args.stats_interval {
        launch.stats_interval = stats_interval;
    }
    if let Some(first_core) = args.first_core {
        launch.first_core = first_core;
    }
    launch.pin_cores |= args.pin_cores;
    log::debug!("Launch configuration: {launch:?}");

    let config = launch.runtime_config()?;
    Ok((launch, config))
}

fn run(launch: LaunchConfig, config: Config) {
    let stats = Arc::new(Stats::default());
    let mut controller = Controller::new(config, launch.rate, launch.churn, Arc::clone(&stats));
    let shutdown = Arc::new(AtomicBool::new(false));

    // Handle ctrl+C
    let r = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        if !r.load(Ordering::Relaxed) {
            log::warn!("Ending the generation, press enter to leave the shell");
            r.store(true, Ordering::Relaxed);
        } else {
            log::warn!("Ending immediately");
            process::abort();
        }
    })
    .expect("Error setting Ctrl-C handler");

    // WORKERS

    let cores = if launch.pin_cores {
        worker::pick_cores(launch.num_cores, launch.first_core)
    } else {
        vec![None; launch.num_cores]
    };
    let mut workers = vec![];
    for (id, core) in cores.into_iter().enumerate() {
        let worker = Worker {
            id,
            config: controller.config(),
            stats: Arc::clone(&stats),
            packet_size: launch.packet_size,
            core,
        };
        let shutdown = Arc::clone(&shutdown);
        let builder = thread::Builder::new().name(format!("Worker-{id}"));
        workers.push(
            builder
                .spawn(move || worker::run(worker, shutdown))
                .unwrap(),
        );
    }
    log::info!(
        "{} workers ready for {} flows",
        launch.num_cores,
        launch.num_flows
    );

    // MONITORING

    let (stop_monitor, monitor_rx) = bounded::<()>(0);
    let monitor = launch.stats_interval().map(|interval| {
        let stats = Arc::clone(&stats);
        let config = controller.config();
        let builder = thread::Builder::new().name("Monitoring".into());
        builder
            .spawn(move || ui::run(stats, config, interval, monitor_rx))
            .unwrap()
    });

    // SHELL

    let mut stdout = io::stdout();
    if let Err(e) = shell::interact(&mut controller, io::stdin().lock(), &mut stdout, &shutdown) {
        log::error!("Interactive session failed: {e}");
    }

    // Tell the other threads to stop
    shutdown.store(true, Ordering::Relaxed);
    drop(stop_monitor);
    for w in workers {
        w.join().unwrap();
    }
    if let Some(m) = monitor {
        m.join().unwrap();
    }

    let _ = writeln!(stdout, "Final statistics:");
    if let Err(e) = controller.display_stats(&mut stdout) {
        log::error!("Cannot display the statistics: {e}");
    }
}
