//! CLI argument parsing tests.

use clap::Parser;
use everactive::cli::{Cli, Command};

#[test]
fn test_cli_parses_sensors_subcommand() {
    let cli = Cli::parse_from(["everactive", "sensors"]);

    assert_eq!(cli.format, "json");
    match cli.command {
        Command::Sensors { all } => assert!(!all),
        _ => panic!("Expected Sensors command"),
    }
}

#[test]
fn test_cli_sensors_alias_and_all_flag() {
    let cli = Cli::parse_from(["everactive", "eversensors", "--all"]);

    assert!(matches!(cli.command, Command::Sensors { all: true }));
}

#[test]
fn test_cli_parses_readings_window() {
    let cli = Cli::parse_from([
        "everactive",
        "readings",
        "bc:5e:a1:00:00:01",
        "--start",
        "1700000000",
        "--end",
        "2023-11-14T23:13:20Z",
    ]);

    match cli.command {
        Command::Readings {
            mac_address,
            start,
            end,
        } => {
            assert_eq!(mac_address, "bc:5e:a1:00:00:01");
            assert_eq!(start, 1_700_000_000);
            assert_eq!(end, 1_700_003_600);
        }
        _ => panic!("Expected Readings command"),
    }
}

#[test]
fn test_cli_readings_requires_window() {
    let result = Cli::try_parse_from(["everactive", "readings", "bc:5e:a1:00:00:01"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_readings_rejects_bad_timestamp() {
    let result = Cli::try_parse_from([
        "everactive",
        "readings",
        "bc:5e:a1:00:00:01",
        "--start",
        "yesterday",
        "--end",
        "0",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_cli_parses_last_reading() {
    let cli = Cli::parse_from(["everactive", "last-reading", "bc:5e:a1:00:00:01"]);

    match cli.command {
        Command::LastReading { mac_address } => assert_eq!(mac_address, "bc:5e:a1:00:00:01"),
        _ => panic!("Expected LastReading command"),
    }
}

#[test]
fn test_cli_parses_gateway_commands() {
    let cli = Cli::parse_from(["everactive", "evergateways"]);
    assert!(matches!(cli.command, Command::Gateways));

    let cli = Cli::parse_from(["everactive", "gateway", "gw-7"]);
    match cli.command {
        Command::Gateway { gateway_identifier } => assert_eq!(gateway_identifier, "gw-7"),
        _ => panic!("Expected Gateway command"),
    }
}

#[test]
fn test_cli_global_options_after_subcommand() {
    let cli = Cli::parse_from([
        "everactive",
        "gateways",
        "--format",
        "table",
        "--client-id",
        "id",
        "--client-secret",
        "secret",
        "--timeout",
        "5",
    ]);

    assert_eq!(cli.format, "table");
    assert_eq!(cli.client_id.as_deref(), Some("id"));
    assert_eq!(cli.client_secret.as_deref(), Some("secret"));
    assert_eq!(cli.timeout(), std::time::Duration::from_secs(5));
}

#[test]
fn test_cli_format_is_validated_by_library() {
    // Unknown formats parse here and are rejected before any request
    let cli = Cli::parse_from(["everactive", "--format", "csv", "gateways"]);
    assert!(cli.format.parse::<everactive::OutputFormat>().is_err());
}

#[test]
fn test_cli_parses_color() {
    let cli = Cli::parse_from(["everactive", "color", "dark_teal", "--intensity", "60"]);

    match cli.command {
        Command::Color { name, intensity } => {
            assert_eq!(name, "dark_teal");
            assert_eq!(intensity, Some(60));
        }
        _ => panic!("Expected Color command"),
    }
}
