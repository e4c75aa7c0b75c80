use clap::Parser;
use std::process;

use kernel_smoke::config::{Backend, DEFAULT_ELEMENTS, DEFAULT_WORKGROUP_SIZE};
use kernel_smoke::{DeviceHarness, HarnessConfig, HarnessError};

#[derive(Parser)]
#[command(
    name = "kernel-smoke",
    version,
    about = "Check that the GPU compute backend can compile, dispatch and read back a kernel"
)]
struct Cli {
    /// Elements per buffer
    #[arg(long, default_value_t = DEFAULT_ELEMENTS)]
    elements: u32,
    /// Run the test this many times on the same device
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    repeat: u32,
    /// Graphics API to pick the adapter from
    #[arg(long, value_enum, default_value_t = Backend::All)]
    backend: Backend,
    /// Preferred threads per workgroup (capped by the device)
    #[arg(long, default_value_t = DEFAULT_WORKGROUP_SIZE)]
    workgroup_size: u32,
    /// Increase diagnostic output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    println!("Starting GPU compute test...");
    if let Err(e) = run(&cli) {
        eprintln!("GPU compute test failed: {}", e);
        process::exit(1);
    }
    println!("GPU compute test completed successfully!");
}

fn run(cli: &Cli) -> Result<(), HarnessError> {
    let config = HarnessConfig::default()
        .with_elements(cli.elements)
        .with_backend(cli.backend)
        .with_workgroup_size(cli.workgroup_size);
    let harness = DeviceHarness::initialize(config)?;
    for attempt in 1..=cli.repeat {
        let report = harness.run_test()?;
        tracing::info!(
            attempt,
            adapter = %report.adapter,
            backend = ?report.backend,
            "run passed"
        );
    }
    Ok(())
}

/// Diagnostics go to stderr; the level comes from `-v` only.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::level_filters::LevelFilter::WARN,
        1 => tracing::level_filters::LevelFilter::INFO,
        2 => tracing::level_filters::LevelFilter::DEBUG,
        _ => tracing::level_filters::LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_uses_defaults() {
        let cli = Cli::try_parse_from(["kernel-smoke"]).unwrap();
        assert_eq!(cli.elements, 1000);
        assert_eq!(cli.repeat, 1);
        assert_eq!(cli.backend, Backend::All);
        assert_eq!(cli.workgroup_size, 256);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "kernel-smoke",
            "--elements",
            "0",
            "--repeat",
            "2",
            "--backend",
            "vulkan",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.elements, 0);
        assert_eq!(cli.repeat, 2);
        assert_eq!(cli.backend, Backend::Vulkan);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_zero_repeat_rejected() {
        assert!(Cli::try_parse_from(["kernel-smoke", "--repeat", "0"]).is_err());
    }
}
