use apigen::cli::{run_cli, Cli};
use apigen::logging::init_logging;
use clap::Parser;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = init_logging(&cli.log_config()) {
        eprintln!("{err}");
    }
    if let Err(err) = run_cli(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
