//! Print the samples of a sine wave that follows a melody read from stdin
//!
//! Usage: midiosc < melody.txt > samples.txt

use std::env;
use std::ffi::OsString;
use std::io::{self, BufWriter};
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{ArgAction, Parser};

use midiosc::pipeline::{read_sequence, NoteSequenceRunner};
use midiosc::{ErrorCategory, MidiOscError, SynthConfig};

const AFTER_HELP: &str = "\
Help is also shown for -help.

Enter one note per line as two integers:

    <timestamp ms> <midi note number>

Whitespace before, between or after the integers is ignored but counts
towards the 30 character line limit. Up to 100 lines are accepted.
Output begins once a line carries a midi note number less than 0; its
timestamp ends the previous note.

Samples are printed one per line at 48000 Hz, to six decimal places.

Exit codes: 0 success, 1 bad command line, 2 bad input, 3 value out of bounds.";

/// Print the samples of a phase-continuous sine wave following a melody
#[derive(Parser)]
#[command(name = "midiosc")]
#[command(author, version, about, long_about = None, after_help = AFTER_HELP)]
struct Cli {
    /// Maximum number of input lines; the last one always ends the melody
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u16).range(2..))]
    max_notes: u16,

    /// Log more detail to stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> Result<(), MidiOscError> {
    let config = SynthConfig {
        max_events: usize::from(cli.max_notes),
        ..Default::default()
    };

    let sequence = read_sequence(io::stdin().lock(), &config)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    NoteSequenceRunner::new(config).run(&sequence, &mut out)?;
    Ok(())
}

/// Accept the single-dash `-help` spelling as `--help`
fn normalize_args<I: IntoIterator<Item = OsString>>(args: I) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| {
            if arg == "-help" {
                OsString::from("--help")
            } else {
                arg
            }
        })
        .collect()
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse_from(normalize_args(env::args_os())) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(ErrorCategory::CommandLine.exit_code()),
            };
        }
    };

    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_dash_help_is_help() {
        let args = normalize_args(["midiosc", "-help"].map(OsString::from));
        let err = Cli::try_parse_from(args).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_other_args_untouched() {
        let args = normalize_args(["midiosc", "-v", "--max-notes", "5"].map(OsString::from));
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.verbose, 1);
        assert_eq!(cli.max_notes, 5);
    }
}
