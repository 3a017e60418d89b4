use anyhow::{Context, Result};
use log::{error, info, warn};
use std::io::{self, BufRead, Write};
use std::process;

use scanwrap::display::{Console, TerminalConsole};
use scanwrap::{app, cli, logging};

fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("Application panicked: {:?}", panic_info);
        eprintln!("Panic: {:?}", panic_info);
        process::exit(101);
    }));

    if let Err(e) = run() {
        error!("Application error: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = cli::parse_args();

    if args.help {
        print!("{}", cli::args::help_text());
        return Ok(());
    }
    if args.version {
        print!("{}", cli::args::version_text());
        return Ok(());
    }

    cli::validate_args(&args)?;

    let config_manager = app::load_configuration(&args)?;

    let log_config = app::configure_logging(&args, &config_manager)?;
    logging::init_logger(log_config)?;

    for warning in &args.warnings {
        warn!("{}", warning);
    }
    if let Some(path) = config_manager.config_file_path() {
        info!("Using configuration file: {}", path.display());
    }

    let request = app::build_scan_request(&args, &config_manager)?;
    let engine = app::build_engine_config(&args, &config_manager)?;
    let colours = app::create_colour_manager(&args, &config_manager)?;
    let console = TerminalConsole::new(colours);

    app::print_settings(&request, &console);

    // Single-threaded: the scan is one subprocess and two pipe readers
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create async runtime")?;

    let succeeded = runtime.block_on(async {
        tokio::select! {
            succeeded = app::run_scan(&request, &engine, &console) => Some(succeeded),
            _ = app::wait_for_interrupt(tokio::signal::ctrl_c()) => None,
        }
    });
    drop(runtime);

    let Some(succeeded) = succeeded else {
        warn!("Scan interrupted");
        console.blank();
        console.warning("Scan interrupted by user.");
        process::exit(1);
    };

    console.blank();
    if succeeded {
        console.success("✓ Scan completed successfully!");
    } else {
        console.error("✗ Scan failed.");
    }

    if app::pause_requested(&args, &config_manager) {
        wait_for_enter();
    }

    Ok(())
}

fn wait_for_enter() {
    print!("\nPress Enter to exit...");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}
