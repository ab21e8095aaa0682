//! Basic example demonstrating the Everactive API client.
//!
//! Run with:
//! ```
//! EVERACTIVE_CLIENT_ID=id EVERACTIVE_CLIENT_SECRET=secret cargo run --example basic
//! ```

use chrono::Utc;
use everactive::{logging, ApiConnection, ClientConfig, Color, EveractiveApi, Output};

fn main() -> everactive::Result<()> {
    // Log through an explicit dispatcher instead of a global one
    let config = ClientConfig::default().with_dispatch(logging::dispatch_from_env());

    println!("Connecting to the Everactive API...");
    let credentials = everactive::Credentials::resolve(None, None)?;
    let api = EveractiveApi::new(ApiConnection::with_config(credentials, config)?);
    println!("Connected to: {}", api.connection().base_url());

    println!("\n--- Listing Eversensors ---");
    let sensors = match api.list_sensors("json")? {
        Output::Rows(rows) => rows,
        Output::Table(_) => Vec::new(),
    };
    println!("Found {} sensors", sensors.len());
    for sensor in sensors.iter().take(5) {
        println!("  - {}", sensor["macAddress"]);
    }

    if let Some(mac) = sensors.first().and_then(|s| s["macAddress"].as_str()) {
        println!("\n--- Last hour of readings for {mac} ---");
        let end = Utc::now().timestamp();
        let readings = api.get_readings(mac, end - 3600, end, "table")?;
        if let Some(table) = readings.as_table() {
            println!("{} readings, {} columns", table.rows.len(), table.columns.len());
            if let Some(pv_in) = table.column("railCounts_PV_IN_count") {
                println!("PV_IN counts: {pv_in:?}");
            }
        }
    }

    println!("\n--- Listing Evergateways ---");
    let gateways = api.list_gateways("table")?;
    println!("Found {} gateways", gateways.len());

    println!(
        "\nPlot color for gateways: {}",
        Color::DarkTeal.hex(Some(60))?
    );

    api.into_connection().close();
    println!("\nDone!");
    Ok(())
}
