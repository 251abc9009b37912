use clap::Parser;
use gdas_processor::cli::{args::Args, commands};
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    match commands::run(args) {
        Ok(_stats) => {
            // Success - stats have already been reported by the command
            process::exit(0);
        }
        Err(error) => {
            // Error occurred - print to stderr and exit with error code
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("GDAS Processor - Atmospheric Profile Averaging");
    println!("==============================================");
    println!();
    println!("Extract GDAS atmospheric profiles for registered sites and accumulate");
    println!("them into monthly averaged atmospheric models.");
    println!();
    println!("USAGE:");
    println!("    gdas-processor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    process     Extract raw profiles and write monthly averaged models");
    println!("    sites       Generate site registry reports");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Process every registered site for the default year:");
    println!("    gdas-processor process");
    println!();
    println!("    # Process one site over a year range without extraction:");
    println!("    gdas-processor process --site 3 --year 2019 --end-year 2021 --no-extract");
    println!();
    println!("    # Generate a site registry report:");
    println!("    gdas-processor sites --format json");
    println!();
    println!("For detailed help on any command, use:");
    println!("    gdas-processor <COMMAND> --help");
}
