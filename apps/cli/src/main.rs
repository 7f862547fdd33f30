//! Wirejam CLI
//!
//! Command-line interface for the wirejam link-noise injector.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{debug, info};

use wirejam_core::{parse_probability, Direction, Endpoint, RelayConfig, RelayMode};
use wirejam_logging::LogLevel;
use wirejam_noise::Corruptor;
use wirejam_relay::{
    connect_pair, MultiplexedRelay, RelayOutcome, StopChannel, StopFlag, ThreadedRelay,
};
use wirejam_trace::TrafficDump;

const LONG_ABOUT: &str = "\
Character stream processor: adds 'noise' to the byte streams between two
hosts. It connects to two hosts (which must have been set up in advance).
Data flows from host A to B and vice versa, but is processed in transit to
simulate a noisy line.

     ▲                                              ▲
     │                                              │
     ▼                   wirejam                    ▼
┌─────────┐     ┌────────────────────────┐     ┌─────────┐
│         │     │                        │     │         │
│ HOST A  │◄────┼─────  add noise  ◄─────┼─────┤ HOST B  │
│         │     │                        │     │         │
│         │     │────────────────────────│     │         │
│ ip:port │     │                        │     │ ip:port │
│         ├─────┼────►  add noise  ──────┼────►│         │
└─────────┘     │                        │     └─────────┘
                └────────────────────────┘

Noise is randomly generated and controlled by --error-rate and
--deletion-chance. The pseudorandom generators are independent for the two
streams.";

const AFTER_HELP: &str = "\
Usage example:

  socat TCP-LISTEN:9999,reuseaddr,fork pty,raw,echo=0,link=/tmp/ttyV1 &
  socat TCP-LISTEN:10000,reuseaddr,fork pty,raw,echo=0,link=/tmp/ttyV2 &
  wirejam -a 9999 -b 10000 --seed-ab 123456 --seed-ba 876543 \\
      --error-rate 0.002 --deletion-chance 0.15 &

The first two lines create ptys bridged to TCP servers on ports 9999 and
10000; wirejam connects to both. Bytes written into /tmp/ttyV1 flow out of
/tmp/ttyV2 corrupted, and vice versa.";

/// Wirejam - transparent TCP link-noise injector
#[derive(Parser)]
#[command(name = "wirejam")]
#[command(author, version, about, long_about = LONG_ABOUT, after_help = AFTER_HELP)]
struct Cli {
    /// HostA address; host is optional and can be an IP or hostname, and
    /// defaults to 'localhost'. Required unless provided via --config.
    #[arg(short = 'a', long, value_name = "[HOST:]PORT")]
    host_a: Option<Endpoint>,

    /// HostB address, same format as --host-a
    #[arg(short = 'b', long, value_name = "[HOST:]PORT")]
    host_b: Option<Endpoint>,

    /// Seed for the pseudorandom generator that adds noise to stream A->B
    #[arg(long, value_name = "SEED")]
    seed_ab: Option<u64>,

    /// Seed for the pseudorandom generator that adds noise to stream B->A
    #[arg(long, value_name = "SEED")]
    seed_ba: Option<u64>,

    /// Probability that a byte is injected with an error (range 0-1)
    #[arg(long, value_parser = parse_probability)]
    error_rate: Option<f64>,

    /// Probability that an injected error deletes the byte instead of
    /// flipping one of its bits (range 0-1)
    #[arg(long, value_parser = parse_probability)]
    deletion_chance: Option<f64>,

    /// Concurrency strategy: threaded or multiplexed
    #[arg(long)]
    mode: Option<RelayMode>,

    /// Increase debug level
    #[arg(short = 'd', long = "debug", action = ArgAction::Count)]
    debug: u8,

    /// Verbose text dump of data traffic
    #[arg(short = 'v')]
    text_dump: bool,

    /// Verbose hexadecimal dump of data traffic
    #[arg(short = 'x')]
    hex_dump: bool,

    /// Read defaults from a JSON config file; explicit flags win
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    wirejam_logging::init(LogLevel::from_verbosity(config.verbosity));
    info!("Starting");

    let params = config.noise_params()?;
    let (conn_a, conn_b) = connect_pair(&config.host_a, &config.host_b)
        .await
        .context("relay startup aborted")?;

    debug!("A->B generator seeded with {}", config.seed_ab);
    debug!("B->A generator seeded with {}", config.seed_ba);
    let noise_ab = Corruptor::new(params, config.seed_ab);
    let noise_ba = Corruptor::new(params, config.seed_ba);
    let dump_ab = TrafficDump::new(Direction::AtoB, config.text_dump, config.hex_dump);
    let dump_ba = TrafficDump::new(Direction::BtoA, config.text_dump, config.hex_dump);

    let outcome: RelayOutcome = match config.mode {
        RelayMode::Threaded => {
            let stop = StopFlag::new();
            let handle = stop.clone();
            trigger_on_ctrl_c(move || handle.trigger());
            ThreadedRelay::new(conn_a, conn_b, noise_ab, noise_ba, dump_ab, dump_ba, stop)
                .run()
                .await
        }
        RelayMode::Multiplexed => {
            let (stop, stop_rx) = StopChannel::new();
            trigger_on_ctrl_c(move || stop.trigger());
            MultiplexedRelay::new(conn_a, conn_b, noise_ab, noise_ba, dump_ab, dump_ba, stop_rx)
                .run()
                .await
        }
    };

    info!("A->B stopped: {}", outcome.a_to_b);
    info!("B->A stopped: {}", outcome.b_to_a);
    Ok(())
}

/// Translate Ctrl-C into a single stop-token trigger.
///
/// The handler does no blocking work: it fires the token and exits,
/// leaving the relay to wind down cooperatively.
fn trigger_on_ctrl_c<F>(trigger: F)
where
    F: Fn() + Send + 'static,
{
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Signal received, stopping relay...");
            trigger();
        }
    });
}

/// Merge the optional config file and the CLI flags into one resolved
/// configuration. Explicit flags win over file values, file values over
/// built-in defaults.
fn resolve_config(cli: &Cli) -> Result<RelayConfig> {
    let mut config = match &cli.config {
        Some(path) => RelayConfig::load_from(path)?,
        None => {
            let host_a = cli
                .host_a
                .clone()
                .context("host A is required (use -a or --config)")?;
            let host_b = cli
                .host_b
                .clone()
                .context("host B is required (use -b or --config)")?;
            RelayConfig::new(host_a, host_b)
        }
    };

    if let Some(host_a) = &cli.host_a {
        config.host_a = host_a.clone();
    }
    if let Some(host_b) = &cli.host_b {
        config.host_b = host_b.clone();
    }
    if let Some(seed_ab) = cli.seed_ab {
        config.seed_ab = seed_ab;
    }
    if let Some(seed_ba) = cli.seed_ba {
        config.seed_ba = seed_ba;
    }
    if let Some(error_rate) = cli.error_rate {
        config.error_rate = error_rate;
    }
    if let Some(deletion_chance) = cli.deletion_chance {
        config.deletion_chance = deletion_chance;
    }
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    // Base level is 1 (errors); each -d raises it one step.
    if cli.debug > 0 {
        config.verbosity = cli.debug.saturating_add(1);
    }
    if cli.text_dump {
        config.text_dump = true;
    }
    if cli.hex_dump {
        config.hex_dump = true;
    }

    config.validate()?;
    Ok(config)
}
