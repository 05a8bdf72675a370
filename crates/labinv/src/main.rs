mod cli;
mod commands;
mod config;
mod error;
mod output;
mod wedge;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use labinv_core::Lab;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let global = &cli.global;
    match cli.command {
        // No session needed
        Command::Config(args) => commands::config_cmd::handle(args, global),
        Command::Route(args) => commands::route::handle(args, global),
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "labinv", &mut std::io::stdout());
            Ok(())
        }

        // Manages its own sign-in
        Command::Auth(args) => commands::auth::handle(args, global).await,

        // Everything else runs inside one signed-in session
        cmd => {
            let (lab_config, credentials) = config::resolve(global)?;
            tracing::debug!(command = ?cmd, "dispatching command");
            Lab::oneshot(lab_config, credentials, |lab| async move {
                Ok(commands::dispatch(cmd, &lab, global).await)
            })
            .await?
        }
    }
}
