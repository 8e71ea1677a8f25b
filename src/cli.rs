use getopts::Options;
use std::path::PathBuf;

/// Parsed command line: a single directory to scan (defaulted to the
/// current working directory when no positional argument is given), plus
/// the quiet flag.
#[derive(Debug)]
pub enum Cli {
    Run { root: PathBuf, quiet: bool },
    Help(String),
}

/// Builds the option table and parses `args` (program name excluded).
///
/// Zero or one positional argument is accepted: with none, the current
/// working directory is used as the scan root. Two or more is a usage
/// error, surfaced as `Help` rather than `Run`.
pub fn parse(program: &str, args: impl Iterator<Item = String>) -> Result<Cli, String> {
    let mut opts = Options::new();
    opts.optflag("q", "quiet", "Hide progress output, print only duplicate reports");
    opts.optflag("h", "help", "This help text");

    let matches = opts.parse(args).map_err(|e| e.to_string())?;

    let usage = opts.usage(&(opts.short_usage(program) + " [directory]"));

    if matches.opt_present("h") {
        return Ok(Cli::Help(usage));
    }

    let root = match matches.free.len() {
        0 => std::env::current_dir().map_err(|e| e.to_string())?,
        1 => PathBuf::from(&matches.free[0]),
        _ => return Ok(Cli::Help(usage)),
    };

    Ok(Cli::Run { root, quiet: matches.opt_present("q") })
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse_args(args: &[&str]) -> Result<Cli, String> {
        parse("dupe-sort", args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn directory_argument_is_parsed() {
        let cli = parse_args(&["/some/dir"]).unwrap();
        match cli {
            Cli::Run { root, quiet } => {
                assert_eq!(root, PathBuf::from("/some/dir"));
                assert!(!quiet);
            },
            Cli::Help(_) => panic!("expected Run"),
        }
    }

    #[test]
    fn quiet_flag_is_recognized() {
        let cli = parse_args(&["-q", "/some/dir"]).unwrap();
        match cli {
            Cli::Run { quiet, .. } => assert!(quiet),
            Cli::Help(_) => panic!("expected Run"),
        }
    }

    #[test]
    fn missing_directory_defaults_to_current_dir() {
        let cli = parse_args(&[]).unwrap();
        match cli {
            Cli::Run { root, .. } => assert_eq!(root, std::env::current_dir().unwrap()),
            Cli::Help(_) => panic!("expected Run"),
        }
    }

    #[test]
    fn too_many_directories_yields_help() {
        let cli = parse_args(&["/a", "/b"]).unwrap();
        assert!(matches!(cli, Cli::Help(_)));
    }

    #[test]
    fn help_flag_yields_help() {
        let cli = parse_args(&["-h"]).unwrap();
        assert!(matches!(cli, Cli::Help(_)));
    }

    #[test]
    fn unknown_flag_is_an_error() {
        assert!(parse_args(&["--nope", "/some/dir"]).is_err());
    }
}
