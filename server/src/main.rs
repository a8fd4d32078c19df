use clap::ArgAction;
use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use log::{error, warn};

fn main() {
    let args = CliArgs::parse();
    let dotenv_result = dotenv();

    let env = env_logger::Env::new().filter_or(
        "RUST_LOG",
        match args.global_opts.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        },
    );
    env_logger::Builder::from_env(env).init();
    if dotenv_result.is_err() {
        warn!("Could not read .env file: {}", dotenv_result.unwrap_err());
    }

    let result = match args.command {
        Command::Serve => eventflow_server::web::serve(),
        Command::MigrateDatabase => eventflow_server::cli::migrate_database(),
        Command::SeedAdmin => eventflow_server::cli::seed_admin_from_env(),
    };
    if let Err(error) = result {
        error!("{}", error);
        std::process::exit(error.exit_code());
    }
}

/// The EventFlow event management server
#[derive(Debug, Parser)]
#[clap(name = "eventflow-server", version)]
pub struct CliArgs {
    #[clap(flatten)]
    global_opts: GlobalOpts,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the EventFlow REST API
    Serve,
    /// Migrate the database schema to the latest version
    MigrateDatabase,
    /// Create the admin account from the ADMIN_EMAIL/ADMIN_PASSWORD environment variables
    SeedAdmin,
}

#[derive(Debug, Args)]
struct GlobalOpts {
    /// Verbosity level (can be specified multiple times)
    #[clap(long, short, global = true, action = ArgAction::Count)]
    verbose: u8,
}
