//! Server command implementation

use anyhow::Result;
use runway_core::RunwayConfig;

pub async fn cmd_serve(
    settings: RunwayConfig,
    host: &str,
    port: u16,
    allowed_origins: Vec<String>,
) -> Result<()> {
    println!("🚀 Starting runway web server...");
    println!("   Listening: http://{}:{}", host, port);
    println!(
        "   Default cash balance: {}",
        runway_core::stats::format_dollars(settings.default_cash_balance)
    );
    if !allowed_origins.is_empty() {
        println!("   CORS origins: {}", allowed_origins.join(", "));
    }
    println!();
    println!("   Upload a CSV with: curl -F file=@transactions.csv http://{}:{}/upload", host, port);
    println!("   Press Ctrl+C to stop");

    let config = runway_server::ServerConfig { allowed_origins };
    runway_server::serve(settings, host, port, config).await?;

    Ok(())
}
