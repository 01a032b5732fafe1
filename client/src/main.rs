use std::time::Duration;

use clap::{CommandFactory, Parser};
use name_client::config::{gateway_endpoint, localstack_health_url, DEFAULT_LOCALSTACK_URL};
use name_client::scenarios::canned_scenarios;
use name_client::{wait_until_ready, ApiClient, ClientConfig, ReadinessPolicy};
use tracing_subscriber::EnvFilter;

/// Exercise the name endpoint deployed behind a LocalStack API gateway.
#[derive(Debug, Parser)]
#[command(name = "name-client")]
struct Cli {
    /// REST API id assigned by the gateway, e.g. jo6ttjff2g.
    api_id: Option<String>,

    /// Base URL of the LocalStack edge endpoint.
    #[arg(long, env = "LOCALSTACK_URL", default_value = DEFAULT_LOCALSTACK_URL)]
    localstack_url: String,

    /// Sent as X-Market-Id on every request.
    #[arg(long, env = "MARKET_ID")]
    market_id: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    println!("=== Name Endpoint Consumer ===");

    let Some(api_id) = cli.api_id.as_deref() else {
        println!("Please provide the API id as a command-line argument.");
        println!("{}", Cli::command().render_usage());
        println!("Example: name-client jo6ttjff2g");
        return Ok(());
    };

    let endpoint = gateway_endpoint(&cli.localstack_url, api_id);
    println!("Using API id: {api_id}");
    println!("Endpoint: {endpoint}");

    let mut config =
        ClientConfig::new(&endpoint).with_timeout(Some(Duration::from_secs(cli.timeout_secs)));
    if let Some(market_id) = &cli.market_id {
        config = config.with_market_id(market_id.as_str());
    }
    let client = ApiClient::new(&config);

    println!("Waiting for LocalStack to be ready...");
    let health_url = localstack_health_url(&cli.localstack_url);
    wait_until_ready(client.agent(), &health_url, &ReadinessPolicy::default(), |attempt, max| {
        println!("Waiting for LocalStack... (attempt {attempt}/{max})");
    })?;
    println!("LocalStack is ready!");

    for (i, scenario) in canned_scenarios().iter().enumerate() {
        println!();
        println!("Test {}: {}", i + 1, scenario.title);
        let result = scenario.run(&client);
        println!("Sent request: {}", result.response.request_body_sent);
        println!("Response status: {}", result.response.status_code);
        println!("Response body: {}", result.response.body);
        if result.passed() {
            println!("PASS - received expected {} status", scenario.expected_status);
        } else {
            println!(
                "FAIL - expected {}, got {}",
                scenario.expected_status, result.response.status_code
            );
        }
    }

    println!();
    println!("All tests completed!");
    Ok(())
}
