use colored::Colorize;
use structopt::StructOpt;

use crate::logger;

mod check;

pub use check::CheckOptions;

#[derive(Debug, StructOpt)]
#[structopt(name = "tysolve", about = "Solves type constraint problems")]
pub struct Cli {
    #[structopt(
        long, env = "LOG_LEVEL",
        help = "Sets the log level",
        default_value = "info",
        possible_values = &["off", "error", "warn", "info", "debug", "trace"],
        global = true
    )]
    log_level: log::LevelFilter,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Solves the constraints in a problem file and reports the result
    Check(CheckOptions),
}

pub fn run() {
    let cli: Cli = Cli::from_args();

    if let Err(err) = logger::init(cli.log_level) {
        eprintln!("{} {}", "warning:".yellow(), err);
    }

    let code = match cli.cmd {
        Command::Check(options) => match check::action(options) {
            Ok(true) => 0,
            Ok(false) => 1,
            Err(err) => {
                eprintln!("{} {}", format!("{}:", err.kind).bold().red(), err.msg);
                2
            }
        },
    };

    std::process::exit(code)
}
