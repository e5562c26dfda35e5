mod error;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use runtime::{BedrockGateway, Conversation, Gateway, McpSession, ToolSession};
use tracing_subscriber::EnvFilter;

use error::{Error, Result};

const DEFAULT_MODEL: &str = runtime::DEFAULT_MODEL;

#[derive(Parser)]
#[command(name = "skiff")]
#[command(about = "An MCP chat client for Amazon Bedrock", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the MCP tool server script (.py or .js)
    server_script: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    // Missing argument is a usage error with exit code 1.
    let cli = Cli::try_parse().unwrap_or_else(|e| {
        let _ = e.print();
        std::process::exit(1);
    });

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Bedrock API key from environment; no config file, no flags.
    let token = std::env::var("AWS_BEARER_TOKEN_BEDROCK").map_err(|_| Error::MissingToken)?;
    let model = std::env::var("SKIFF_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
    let region =
        std::env::var("AWS_REGION").unwrap_or_else(|_| runtime::DEFAULT_REGION.to_string());

    let gateway = BedrockGateway::builder(token, &model)
        .region(region)
        .build();

    // Startup failures here are fatal; nothing has been acquired yet on
    // the error paths inside connect.
    let session = McpSession::connect(&cli.server_script).await?;

    let startup = startup_banner(&session, &model).await;
    let outcome = match startup {
        Ok(()) => chat_loop(&gateway, &session).await,
        Err(e) => Err(e),
    };

    // The child process and its pipes are released exactly once, on
    // every exit path after a successful connect.
    let shutdown = session.shutdown().await;

    outcome?;
    shutdown?;
    Ok(())
}

async fn startup_banner(session: &McpSession, model: &str) -> Result<()> {
    let tools = session.list_tools().await?;
    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();

    println!("skiff v{}", env!("CARGO_PKG_VERSION"));
    println!("Model: {model}");
    println!("\nConnected to server with tools: {names:?}");
    println!("Type your queries or 'quit' to exit.");
    Ok(())
}

async fn chat_loop(gateway: &impl Gateway, session: &impl ToolSession) -> Result<()> {
    let conversation = Conversation::new(gateway, session);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("\nQuery: ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if is_quit(input) {
            break;
        }

        // Per-query errors never crash the shell.
        match conversation.process_query(input).await {
            Ok(answer) => println!("\n{answer}"),
            Err(e) => eprintln!("\nError: {e}"),
        }
    }

    Ok(())
}

fn is_quit(input: &str) -> bool {
    input.eq_ignore_ascii_case("quit")
}
