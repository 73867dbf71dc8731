//! `gatehouse` - CLI for visitor registration and parking status
//!
//! This binary provides the command-line interface for registering visitors,
//! tracking their parking status and checking the store's health.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use gatehouse::cli::render;
use gatehouse::cli::shell;
use gatehouse::cli::{Cli, Command, ConfigCommand, DeleteCommand, ListCommand, OutputFormat};
use gatehouse::{init_logging, Config, Error, VisitorService};

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Configuration commands work even when the configuration is broken
    if let Command::Config(config_cmd) = cli.command {
        return Ok(handle_config(cli.config, config_cmd)?);
    }

    let config = match Config::load_from(cli.config.clone()) {
        Ok(config) => config,
        Err(err) => return Ok(failure(&err)?),
    };
    debug!(database = %config.database_path().display(), "configuration loaded");

    let service = VisitorService::connect(&config);

    let result = match cli.command {
        Command::Register(cmd) => {
            let visitor = service.create(cmd.to_request()).await;
            visitor.and_then(|visitor| {
                let mut out = io::stdout().lock();
                if cmd.json {
                    render::write_json(&mut out, &visitor)?;
                } else {
                    writeln!(out, "Registered visitor {}.", visitor.id)?;
                    render::write_visitor_line(&mut out, &visitor)?;
                }
                Ok(ExitCode::SUCCESS)
            })
        }
        Command::List(ListCommand { format }) => handle_list(&service, format).await,
        Command::Show(cmd) => service.get(cmd.visitor_id()).await.and_then(|visitor| {
            let mut out = io::stdout().lock();
            if cmd.json {
                render::write_json(&mut out, &visitor)?;
            } else {
                render::write_visitor_detail(&mut out, &visitor)?;
            }
            Ok(ExitCode::SUCCESS)
        }),
        Command::Status(cmd) => service
            .update_status(cmd.visitor_id(), &cmd.status)
            .await
            .and_then(|visitor| {
                let mut out = io::stdout().lock();
                if cmd.json {
                    render::write_json(&mut out, &visitor)?;
                } else {
                    writeln!(
                        out,
                        "Status updated to {} for visitor {}.",
                        visitor.status, visitor.id
                    )?;
                }
                Ok(ExitCode::SUCCESS)
            }),
        Command::Delete(cmd) => handle_delete(&service, &cmd).await,
        Command::Dashboard(flag) => service.occupancy().await.and_then(|occupancy| {
            let mut out = io::stdout().lock();
            if flag.json {
                render::write_json(&mut out, &occupancy)?;
            } else {
                render::write_occupancy(&mut out, &occupancy)?;
            }
            Ok(ExitCode::SUCCESS)
        }),
        Command::Health(flag) => {
            let report = service.health().await;
            let mut out = io::stdout().lock();
            if flag.json {
                render::write_json(&mut out, &report)?;
            } else {
                render::write_health(&mut out, &report)?;
            }
            Ok(if report.ok {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(render::exit_status(gatehouse::ErrorKind::StorageUnavailable))
            })
        }
        Command::Shell => shell::run(&service, io::stdin().lock(), io::stdout())
            .await
            .map(|()| ExitCode::SUCCESS)
            .map_err(Error::from),
        Command::Config(_) => Ok(ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => Ok(code),
        Err(err) => Ok(failure(&err)?),
    }
}

/// Report an error on stderr and pick the exit code for its kind.
fn failure(err: &Error) -> io::Result<ExitCode> {
    render::write_error(&mut io::stderr().lock(), err)?;
    Ok(ExitCode::from(render::exit_status(err.kind())))
}

async fn handle_list(service: &VisitorService, format: OutputFormat) -> gatehouse::Result<ExitCode> {
    let visitors = service.list().await?;
    render::write_visitors(&mut io::stdout().lock(), &visitors, format)?;
    Ok(ExitCode::SUCCESS)
}

async fn handle_delete(service: &VisitorService, cmd: &DeleteCommand) -> gatehouse::Result<ExitCode> {
    let id = cmd.visitor_id();

    if !cmd.yes {
        let visitor = service.get(id).await?;
        let mut out = io::stdout().lock();
        render::write_visitor_line(&mut out, &visitor)?;

        let confirmed = shell::confirm(
            &mut io::stdin().lock(),
            &mut out,
            &format!("Are you sure you want to permanently delete visitor {id}?"),
        )?;
        if !confirmed {
            writeln!(out, "Deletion cancelled.")?;
            return Ok(ExitCode::SUCCESS);
        }
    }

    service.delete(id).await?;
    println!("Visitor {id} deleted.");
    Ok(ExitCode::SUCCESS)
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> io::Result<ExitCode> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = match Config::load_from(config_path) {
                Ok(config) => config,
                Err(err) => return failure(&err),
            };

            if json {
                render::write_json(&mut io::stdout().lock(), &config)?;
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!(
                    "  Operation timeout:  {} ms",
                    config.storage.operation_timeout_ms
                );
                println!("  Busy timeout:       {} ms", config.storage.busy_timeout_ms);
                println!();
                println!("[Facility]");
                println!(
                    "  Parking spots:      {}",
                    config.facility.total_parking_spots
                );
                println!(
                    "  Low threshold:      {}",
                    config.facility.low_availability_threshold
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.or(config_path).unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(err) => return failure(&err),
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
