use clap::Parser;
use tracing::{debug, error, trace};

use gitops_git::cli::{self, Cli};
use gitops_git::error::GitOpsError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(cli.log_filter())
        .with_target(cli.verbose >= 2)
        .with_writer(std::io::stderr)
        .init();

    debug!("gitops-push started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = cli::run(cli).await {
        error!("Fatal error: {:#}", e);
        match e.downcast_ref::<GitOpsError>() {
            Some(err) => {
                eprintln!("Error {}", err.report());
                std::process::exit(err.exit_code());
            }
            None => {
                eprintln!("Error: {e:#}");
                std::process::exit(1);
            }
        }
    }
}
