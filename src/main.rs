//! RentScope: rent and gross-yield estimator
//!
//! Usage:
//!   rentscope                      - Open the window on the search form
//!   rentscope gui --route PATH     - Open the window on `/` or `/results`
//!   rentscope estimate [criteria]  - Print the quick rent estimate
//!   rentscope evaluate [criteria]  - Print the full evaluation
//!   rentscope parse "<text>"       - Turn a description into criteria
//!   rentscope help                 - Show help

mod app;
mod backend;
mod commands;
mod config;
mod headless;
mod native;
mod routes;
mod screens;
mod ui;

use std::process::ExitCode;

use app::RentScope;
use backend::BackendClient;
use clap::Parser;
use commands::{Cli, Command};
use config::AppConfig;
use iced::{window, Size};
use routes::Route;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.api_base_url.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config);

    match cli.command() {
        Command::Gui { route } => match start_gui(config, Route::from_path(&route)) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!("GUI error: {}", e);
                ExitCode::FAILURE
            }
        },
        command => run_headless(&config, command),
    }
}

/// `RUST_LOG` wins over the configured filter; logs go to stderr so headless
/// output stays clean
fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    // try_init: a second initialisation is not an error worth stopping for
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn run_headless(config: &AppConfig, command: Command) -> ExitCode {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let backend = BackendClient::new(&config.api_base_url);
    match rt.block_on(headless::run(&backend, command)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn start_gui(config: AppConfig, route: Route) -> iced::Result {
    tracing::info!("Opening RentScope window");

    iced::application(RentScope::title, RentScope::update, RentScope::view)
        .subscription(RentScope::subscription)
        .theme(RentScope::theme)
        .window(window::Settings {
            size: Size::new(1040.0, 720.0),
            min_size: Some(Size::new(720.0, 520.0)),
            position: window::Position::Centered,
            ..Default::default()
        })
        .antialiasing(true)
        .run_with(move || RentScope::new(&config, route))
}
