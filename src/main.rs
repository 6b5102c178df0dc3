use std::env;
use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use micatype::driver::{CheckConfig, run_check};
use micatype::project::UnitOptions;

/// Parse and type-check one Mica package.
///
/// With no paths, a single complete source file is read from standard
/// input. With a directory, every source file in it is checked as one
/// package. With a single file, the file's whole package is checked
/// but diagnostics are reported for that file only.
#[derive(Parser, Debug)]
#[command(name = "micatype", version)]
struct Cli {
    /// A directory or source file naming the package to check
    paths: Vec<PathBuf>,

    /// Include in-package _test.mica files when checking a test file
    #[arg(short = 't', long = "tests")]
    tests: bool,

    /// Check only the named files instead of their whole package
    #[arg(long)]
    no_pkg_context: bool,

    /// Working directory that relative paths and imports resolve against
    #[arg(short = 'w', long = "workdir", value_name = "DIR")]
    workdir: Option<PathBuf>,

    /// Print the files being checked
    #[arg(short = 'v', long)]
    verbose: bool,
}

const EXIT_DIAGNOSTICS: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    let cli = Cli::parse();

    let cwd = match env::current_dir() {
        Ok(dir) => dir,
        Err(error) => {
            eprintln!("micatype: cannot determine working directory: {error}");
            process::exit(EXIT_USAGE);
        }
    };
    let working_dir = match cli.workdir {
        Some(dir) if dir.is_absolute() => dir,
        Some(dir) => cwd.join(dir),
        None => cwd,
    };

    let config = CheckConfig {
        paths: cli.paths,
        working_dir,
        options: UnitOptions {
            package_context: !cli.no_pkg_context,
            include_tests: cli.tests,
        },
        verbose: cli.verbose,
    };

    let mut stdin = io::stdin().lock();
    let mut stderr = io::stderr().lock();
    match run_check(&config, &mut stdin, &mut stderr) {
        Ok(outcome) if outcome.admitted > 0 => process::exit(EXIT_DIAGNOSTICS),
        Ok(_) => {}
        Err(error) => {
            eprintln!("micatype: {error}");
            process::exit(EXIT_USAGE);
        }
    }
}
