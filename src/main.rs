// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::{json, Value};
use std::env;
use std::time::Instant;
use the_switchyard::config::{load_and_validate_config, RuntimeBuilder};
use the_switchyard::context::Context;
use the_switchyard::encoding::{Chain, Codec};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 4 {
        eprintln!("Usage: {} <fabric.yaml|fabric.toml> <destination> <text> [encoding]", args[0]);
        eprintln!("Example: {} configs/fabric.yaml /tools/text/upper \"hello world\"", args[0]);
        eprintln!("Example: {} configs/fabric.toml /1.0.0/try/echo \"hello\" json.base64", args[0]);
        std::process::exit(1);
    }

    let config_file = &args[1];
    let destination = &args[2];
    let input_text = &args[3];
    let encoding = args.get(4).map(String::as_str);

    if let Err(e) = run(config_file, destination, input_text, encoding).await {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

async fn run(
    config_file: &str,
    destination: &str,
    input_text: &str,
    encoding: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();

    let config = load_and_validate_config(config_file)?;
    let fabric = RuntimeBuilder::from_config(&config)?;

    let chain = match encoding {
        Some(path) => Chain::parse(path)?,
        None => Chain::single(Codec::Json),
    };

    println!("📋 Configuration: {}", config_file);
    println!("🚏 Destination:   {}", destination);
    println!("🔤 Encoding:      {}", chain);

    let client = fabric.client("cli", None);
    let request = json!({ "text": input_text });

    let call_start = Instant::now();
    let outcome: Result<Value, _> = client
        .call(&Context::new(), destination, chain, &request, fabric.reply_timeout())
        .await;
    let call_time = call_start.elapsed();

    fabric.close().await;
    let reply = outcome?;

    println!("\n📊 Reply ({:?}):", call_time);
    println!("{}", serde_json::to_string_pretty(&reply)?);
    println!("\n⏱️  Total Time (including config load): {:?}", start_time.elapsed());

    Ok(())
}
