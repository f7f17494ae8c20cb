use std::fs;

use clap::Parser;
use corvid::run_source;

/// corvid is an interpreter for Corvid, an indentation-structured
/// scripting language with grimoires and spells.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Tells corvid to run a file instead of an inline script.
    #[arg(short, long)]
    file: bool,

    /// Pipe mode automatically prints the final value of the script.
    #[arg(short, long)]
    pipe_mode: bool,

    contents: String,
}

fn main() {
    let args = Args::parse();

    let (script, file_name) = if args.file {
        let script = fs::read_to_string(&args.contents).unwrap_or_else(|_| {
                         eprintln!("Failed to read the input file '{}'. Perhaps this file does \
                                    not exist?",
                                   &args.contents);
                         std::process::exit(1);
                     });
        (script, args.contents.clone())
    } else {
        (args.contents.clone(), String::new())
    };

    match run_source(&script, &file_name) {
        Ok(value) => {
            if args.pipe_mode && !value.is_none() {
                println!("{value}");
            }
        },
        Err(error) => eprintln!("{error}"),
    }
}
