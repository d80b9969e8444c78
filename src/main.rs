use clap::Parser;
use csv2json::cli::{args::Args, commands};
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
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("csv2json - CSV to JSON Converter");
    println!("================================");
    println!();
    println!("Convert CSV with a header row into a JSON array of objects, one object");
    println!("per data row, keyed by the header and with every value kept as a string.");
    println!();
    println!("USAGE:");
    println!("    csv2json <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    convert     Convert a CSV file or standard input to JSON");
    println!("    list        List batches held in the store");
    println!("    show        Print the records of one stored batch");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Convert a file to standard output:");
    println!("    csv2json convert people.csv");
    println!();
    println!("    # Convert standard input, keeping the batch in a store:");
    println!("    cat people.csv | csv2json convert - --store ./batches --name people");
    println!();
    println!("    # Pad short rows instead of rejecting them:");
    println!("    csv2json convert ragged.csv --column-policy pad -o ragged.json");
    println!();
    println!("    # Inspect stored batches:");
    println!("    csv2json list --store ./batches");
    println!("    csv2json show 1 --store ./batches --pretty");
    println!();
    println!("For detailed help on any command, use:");
    println!("    csv2json <COMMAND> --help");
}
