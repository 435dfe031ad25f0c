//! Dashboard session example
//!
//! Usage:
//!   ENGDASH_USERNAME=alice ENGDASH_PASSWORD=secret cargo run --example dashboard_session

use engdash_client::navigation;
use engdash_client::resources::{self, AnalyticsPeriod};
use engdash_client::{ApiClient, ClientConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ClientConfig::from_env()?;
    let username = std::env::var("ENGDASH_USERNAME").unwrap_or_else(|_| "alice".to_string());
    let password = std::env::var("ENGDASH_PASSWORD").unwrap_or_else(|_| "secret".to_string());

    println!("=== Engineering Dashboard Client Example ===");
    println!("API: {}", config.api_base_url);
    println!();

    let client = ApiClient::new(config)?;

    // Reuse a persisted session when there is one
    if client.session().is_authenticated() {
        println!("✓ Restored session");
    } else {
        let outcome = client.login(&username, &password).await?;
        println!("✓ Logged in as {}", outcome.user.username);
        println!("  Landing route: {}", outcome.landing_route);
    }
    println!();

    if let Some(role) = client.current_user().and_then(|user| user.role) {
        println!("Menu for {role}:");
        for item in navigation::menu_for(&role) {
            println!("  - {} ({})", item.title, item.route);
        }
        println!();
    }

    let orders = resources::work_orders(&client).await;
    if orders.requires_login() {
        println!("! Session expired, go to {}", navigation::LOGIN_ROUTE);
        return Ok(());
    }
    println!("Work orders: {}", orders.data.len());
    for order in orders.data.iter().take(5) {
        println!("  {} {} [{}]", order.no, order.title, order.wo_status);
    }
    if let Some(issue) = &orders.issue {
        println!("  (degraded: {issue:?})");
    }
    println!();

    let report = resources::analytics_report(&client, AnalyticsPeriod::default()).await;
    println!("Analytics ({}):", report.period);
    println!("  MTTR: {:.1} h", report.summary.mttr_hours);
    println!("  MTBF: {:.1} h", report.summary.mtbf_hours);
    println!("  Failures: {}", report.summary.failure_count);
    for (path, issue) in &report.issues {
        println!("  ! {path}: {issue:?}");
    }

    Ok(())
}
