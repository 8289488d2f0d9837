// mjc: single-pass compiler front end for the MicroJava teaching language

use std::fs;
use std::path::Path;

use mjc::parser::parse::Parser;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        let program_name = args.first().map(|s| s.as_str()).unwrap_or("mjc");
        eprintln!("Error: no input file provided");
        eprintln!();
        eprintln!("Usage: {} <file.mj>", program_name);
        std::process::exit(1);
    }

    let source_file = &args[1];

    if !Path::new(source_file).exists() {
        eprintln!("Error: file '{}' not found", source_file);
        std::process::exit(1);
    }

    let source = match fs::read_to_string(source_file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", source_file, e);
            std::process::exit(1);
        }
    };

    let mut parser = Parser::new(&source);
    let errors = parser.parse();

    if errors > 0 {
        eprintln!("{} error(s) detected", errors);
        std::process::exit(1);
    }
    println!(
        "compilation successful, {} bytes of code",
        parser.code().pc()
    );
}
