use portsweep::config::{
    ScanConfig, DEFAULT_CONCURRENCY, DEFAULT_END_PORT, DEFAULT_START_PORT, DEFAULT_TIMEOUT_SECS,
};
use portsweep::scanner;
use portsweep::types::ScanResult;

use anyhow::Result;
use clap::{ArgAction, Parser};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// portsweep — bounded-concurrency TCP connect port scanner.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "portsweep",
    version,
    about = "Bounded-concurrency TCP connect port scanner. Only scan hosts you are allowed to.",
    long_about = None
)]
struct Cli {
    /// Host to scan (name or IP address).
    host: String,

    /// First port of the range.
    #[arg(short, long, default_value_t = DEFAULT_START_PORT, allow_negative_numbers = true)]
    start: i64,

    /// Last port of the range.
    #[arg(short, long, default_value_t = DEFAULT_END_PORT, allow_negative_numbers = true)]
    end: i64,

    /// Number of concurrent workers.
    #[arg(short = 't', long = "threads", default_value_t = DEFAULT_CONCURRENCY)]
    threads: usize,

    /// Connect timeout in seconds per attempt.
    #[arg(short = 'T', long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: f64,

    /// Print the final result as pretty JSON instead of the text summary.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Increase log verbosity on stderr (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            host: self.host.clone(),
            start: self.start,
            end: self.end,
            timeout_secs: self.timeout,
            concurrency: self.threads,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let request = match cli.scan_config().validate() {
        Ok(r) => r,
        Err(e) => {
            println!("{e}");
            std::process::exit(1);
        }
    };

    println!(
        "Scanning {} ports {} with {} workers, timeout {}s",
        request.host, request.ports, request.concurrency, cli.timeout
    );

    let (open_tx, mut open_rx) = mpsc::unbounded_channel::<u16>();
    let host = request.host.clone();
    let printer = tokio::spawn(async move {
        while let Some(port) = open_rx.recv().await {
            println!("[OPEN] {host}:{port}");
        }
    });

    let result = scanner::run_scan_with_events(&request, open_tx).await;
    // The sender is gone once the scan returns, so the printer drains and exits.
    printer.await?;

    match result {
        Ok(res) if cli.json => println!("{}", serde_json::to_string_pretty(&res)?),
        Ok(res) => print_summary(&res),
        Err(e) => {
            println!("{e}");
            std::process::exit(1);
        }
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_summary(res: &ScanResult) {
    println!("\n--- Scan result ---");
    println!("Host: {} ({})", res.host, res.address);
    println!("Ports {} - {}", res.start_port, res.end_port);
    if res.open_ports.is_empty() {
        println!("Open ports: none");
    } else {
        let list: Vec<String> = res.open_ports.iter().map(u16::to_string).collect();
        println!("Open ports: {}", list.join(", "));
    }
    println!("Elapsed: {:.2} s", res.elapsed.as_secs_f64());
}
