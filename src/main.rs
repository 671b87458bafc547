use std::process;

use clap::{CommandFactory, Parser};
use dorsetc::cli::{
    driver, init_logging,
    options::{Args, CompilerOptions},
};

fn main() {
    let args = Args::parse();

    if args.version {
        println!("dorsetc {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    init_logging(args.verbose);

    let options = match CompilerOptions::from_args(args) {
        Ok(options) => options,
        Err(error) => {
            eprintln!("error: {}\n", error);
            let _ = Args::command().print_help();
            process::exit(1);
        }
    };

    match driver::run(&options) {
        Ok(code) => process::exit(code),
        Err(error) => {
            eprintln!("error: {:#}", error);
            process::exit(1);
        }
    }
}
