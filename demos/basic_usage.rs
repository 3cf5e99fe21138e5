//! Basic usage: authenticate, submit a task, and poll it to completion.
//!
//! Needs a running Codeep server and an account. Points at the local
//! development server; switch to `Config::production()` for the public
//! endpoint.
//!
//! Usage:
//!   CODEEP_USERNAME=demo CODEEP_PASSWORD=secret cargo run --example basic_usage

use codeep_rs::tasks::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};
use codeep_rs::{CodeepClient, Config, TaskStatus};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    if std::env::var("CODEEP_USERNAME").is_err() {
        eprintln!("Warning: CODEEP_USERNAME not set. Falling back to the demo account.");
    }
    let username = std::env::var("CODEEP_USERNAME").unwrap_or_else(|_| "demo".to_string());
    let password = std::env::var("CODEEP_PASSWORD").unwrap_or_else(|_| "demo".to_string());

    let client = CodeepClient::with_config(&Config::development())?;
    println!("Base URL: {}", client.base_url());

    let health = client.health_check().await?;
    println!("Health: {health}");

    let login = client.login(&username, &password).await?;
    println!(
        "Logged in as {} (daily limit {})",
        login.user.username, login.user.daily_limit
    );

    let quota = client.get_quota().await?;
    println!(
        "Quota: {} of {} used today, {} remaining",
        quota.used_today, quota.daily_limit, quota.remaining
    );

    let toolset = vec!["code_executor".to_string(), "file_reader".to_string()];
    let task = client
        .create_task(
            "Analyze this dataset and create visualizations",
            Some(&toolset),
        )
        .await?;
    println!("Created task {} ({})", task.task_id, task.status);

    let done = client
        .wait_for_completion(&task.task_id, DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL)
        .await?;
    match done.status {
        TaskStatus::Completed => {
            println!("Result:\n{}", done.result.unwrap_or_default());
            let details = client.get_task_results(&done.task_id).await?;
            println!("Detailed results: {details}");
        }
        _ => {
            println!(
                "Task {}: {}",
                done.status,
                done.error_message.unwrap_or_else(|| "no error message".to_string())
            );
        }
    }

    Ok(())
}
