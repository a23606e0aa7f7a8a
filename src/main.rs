use clap::Parser;

use tinacms_cli::cli::{Cli, Commands};
use tinacms_cli::commands::run_audit_command;
use tinacms_cli::logging::init_logging;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match &cli.command {
        Commands::Audit(args) => run_audit_command(args, &cli),
    };

    std::process::exit(exit_code);
}
