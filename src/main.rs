use clap::Parser;
use gh_apply::Cli;

pub fn main() {
    let _ = paris::Logger::new();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            let _ = err.print();
            std::process::exit(1);
        }
    };
    match gh_apply::run_cli(&cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            // causes are joined onto the same line
            eprintln!("ERROR: {:#}", err);
            std::process::exit(1);
        }
    }
}
