use dupe_sort::cli::Cli;
use dupe_sort::{Driver, Error, StdoutSink};
use std::env;

/// Exit code contract: 501 when the given path is not a directory, 0 for
/// every other outcome (including a successful run that found no
/// duplicates, and a run where individual files were skipped and logged).
const EXIT_INVALID_INPUT: i32 = 501;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| env!("CARGO_PKG_NAME").to_owned());

    let cli = match dupe_sort::cli::parse(&program, args) {
        Ok(cli) => cli,
        Err(err) => {
            log::error!("argument parsing failed: {}", err);
            println!("invalid arguments: {}", err);
            std::process::exit(EXIT_INVALID_INPUT);
        },
    };

    let (root, quiet) = match cli {
        Cli::Run { root, quiet } => (root, quiet),
        Cli::Help(usage) => {
            println!("Finds duplicate files under a directory tree (v{}).\n\n{}", env!("CARGO_PKG_VERSION"), usage);
            return;
        },
    };

    if !quiet {
        log::info!("scanning {}", root.display());
    }

    let driver = Driver::new();
    let mut sink = StdoutSink;
    match driver.run(&root, &mut sink) {
        Ok(()) => {},
        Err(Error::InvalidInput(path)) => {
            log::error!("{} is not a directory", path.display());
            println!("{} is not a directory", path.display());
            std::process::exit(EXIT_INVALID_INPUT);
        },
        Err(err) => {
            log::error!("{}", err);
            println!("scan failed, see the log for details");
        },
    }
}
