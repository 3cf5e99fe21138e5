//! Drive the task API as a plain completion model.
//!
//! `CodeepLlm` implements the [`LanguageModel`] trait, so task execution
//! plugs into pipelines that expect a single-prompt call: strict calls
//! with stop sequences, sequential batches with per-prompt failure
//! isolation, and pseudo-streaming.
//!
//! Usage:
//!   CODEEP_USERNAME=demo CODEEP_PASSWORD=secret cargo run --example completion_model

use std::time::Duration;

use codeep_rs::{CodeepClient, CodeepLlm, Config, LanguageModel};
use futures::StreamExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let username = std::env::var("CODEEP_USERNAME").unwrap_or_else(|_| "demo".to_string());
    let password = std::env::var("CODEEP_PASSWORD").unwrap_or_else(|_| "demo".to_string());

    let client = CodeepClient::with_config(&Config::development())?;
    client.login(&username, &password).await?;

    // The facade's adapter: default parameters, memoized per client.
    let text = client.llm().call("Write a haiku about queues", None).await?;
    println!("call:\n{text}\n");

    // A custom adapter over the same task manager and session.
    let llm = CodeepLlm::new(client.tasks().clone())
        .with_model_name("codeep-demo")
        .with_toolset(vec!["web_search".to_string()])
        .with_timeout(Duration::from_secs(120))
        .with_poll_interval(Duration::from_secs(2));
    println!("params: {:?}\n", llm.identifying_params());

    // Stop sequences truncate client-side, scanned in list order.
    let stop = vec!["\n\n".to_string()];
    let first_paragraph = llm
        .call("Explain how the task queue schedules work", Some(&stop))
        .await?;
    println!("first paragraph only:\n{first_paragraph}\n");

    // Batches run sequentially; a failed prompt becomes an empty
    // generation instead of aborting the rest.
    let prompts = vec![
        "Name one ocean".to_string(),
        "Name one mountain".to_string(),
        "Name one desert".to_string(),
    ];
    let generations = llm.generate(&prompts, None).await;
    for (prompt, generation) in prompts.iter().zip(&generations) {
        println!("{prompt} -> {}", generation.text);
    }
    println!();

    // Streaming is simulated: the whole completion arrives as one chunk.
    let mut stream = llm.stream("Write one sentence about caches", None);
    while let Some(chunk) = stream.next().await {
        print!("{}", chunk.text);
    }
    println!();

    Ok(())
}
