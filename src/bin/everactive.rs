//! Everactive Data Services CLI binary.
//!
//! A command-line interface for the Everactive Data Services API.

use std::process::ExitCode;

use clap::Parser;
use everactive::cli::{Cli, Command};
use everactive::{
    logging, ApiConnection, ClientConfig, Color, Credentials, EveractiveApi, EveractiveError,
    Output, OutputFormat, SensorListQuery,
};

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            if matches!(e, EveractiveError::Configuration(_)) {
                eprintln!("Hint: Set EVERACTIVE_CLIENT_ID and EVERACTIVE_CLIENT_SECRET");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> everactive::Result<()> {
    let format: OutputFormat = cli.format.parse()?;

    let output = match &cli.command {
        Command::Color { name, intensity } => {
            let color: Color = name.parse()?;
            println!("{}", color.hex(*intensity)?);
            return Ok(());
        }
        Command::Sensors { all } => {
            let query = if *all {
                SensorListQuery::all()
            } else {
                SensorListQuery::default()
            };
            connect(cli)?.list_sensors_with_query(&query, format)?
        }
        Command::Readings {
            mac_address,
            start,
            end,
        } => connect(cli)?.get_readings(mac_address, *start, *end, format)?,
        Command::LastReading { mac_address } => {
            connect(cli)?.get_last_reading(mac_address, format)?
        }
        Command::Gateways => connect(cli)?.list_gateways(format)?,
        Command::Gateway { gateway_identifier } => {
            connect(cli)?.get_gateway(gateway_identifier, format)?
        }
    };

    print_output(&output)
}

fn connect(cli: &Cli) -> everactive::Result<EveractiveApi> {
    let credentials = Credentials::resolve(cli.client_id.as_deref(), cli.client_secret.as_deref())?;

    let mut config = ClientConfig::default().with_timeout(cli.timeout());
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url);
    }

    Ok(EveractiveApi::new(ApiConnection::with_config(
        credentials,
        config,
    )?))
}

fn print_output(output: &Output) -> everactive::Result<()> {
    match output {
        Output::Rows(rows) => println!("{}", serde_json::to_string_pretty(rows)?),
        Output::Table(table) => {
            println!("{table}");
            println!("\n{} rows", table.rows.len());
        }
    }
    Ok(())
}
