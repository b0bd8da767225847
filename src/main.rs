use anyhow::Result;
use clap::Parser;
use ingest::cli::{AppContext, Cli, Commands};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log to stderr so stdout stays reserved for the prompt. `RUST_LOG` wins
/// over `--verbose`.
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("ingest=debug")
        } else {
            EnvFilter::new("ingest=warn")
        }
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
        verbose: cli.verbose,
        dry_run: cli.dry_run,
    };

    match cli.command {
        Commands::Pack(args) => ingest::pack_run(args, &ctx),
        Commands::Compress(args) => ingest::compress_run(args, &ctx),
        Commands::Tree(args) => ingest::tree_run(args, &ctx),
        Commands::Excludes(args) => ingest::infra::excludes::run(args, &ctx),
        Commands::Template => ingest::core::template::run(&ctx),
        Commands::Init(args) => ingest::infra::config::init(args, &ctx),
        Commands::Completions(args) => ingest::completion::run(args),
    }
}
