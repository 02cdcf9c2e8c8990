use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use treelox::ast_printer::AstPrinter;
use treelox::error::LoxError;
use treelox::interpreter::Interpreter;
use treelox::parser::Parser;
use treelox::scanner::Scanner;

#[derive(ClapParser, Debug)]
#[command(version, about = "Tree-walking interpreter for a small scripting language", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes a source file, printing each token
    Tokenize { filename: PathBuf },

    /// Parses a source file and prints its AST
    Parse {
        filename: PathBuf,

        /// Dump the AST as JSON instead of the parenthesized form
        #[arg(long)]
        json: bool,
    },

    /// Runs a source file as a program
    Run { filename: PathBuf },
}

/// Memory-maps a source file and returns its bytes, verified to be UTF-8
/// (the scanner slices lexemes out of the buffer without re-checking).
fn read_source(filename: &Path) -> Result<Vec<u8>> {
    info!("Reading file: {:?}", filename);

    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;

    let metadata = file
        .metadata()
        .context(format!("Failed to stat file {:?}", filename))?;

    // A zero-length file cannot be mapped.
    if metadata.len() == 0 {
        return Ok(Vec::new());
    }

    // SAFETY: the mapping is read-only and dropped before main returns.
    let mmap = unsafe { Mmap::map(&file) }
        .context(format!("Failed to memory-map file {:?}", filename))?;

    std::str::from_utf8(&mmap).context(format!("File {:?} is not valid UTF-8", filename))?;

    info!("Read {} bytes from {:?}", mmap.len(), filename);

    Ok(mmap.to_vec())
}

fn init_logger() -> Result<()> {
    // Create or open the log file
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    // Configure env_logger to write timestamped records to the file
    Builder::new()
        .format(|buf, record| {
            // Strip 'treelox::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("treelox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));

            writeln!(
                buf,
                "[{} {}:{}] - {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .init();

    info!("Logger initialized, writing to app.log");

    Ok(())
}

/// Print every scan/parse error, then exit with the conventional code 65
/// if there were any.
fn report_front_end_errors(errors: &[LoxError]) {
    for error in errors {
        debug!("Front-end error: {}", error);

        eprintln!("{}", error);
    }

    if !errors.is_empty() {
        std::process::exit(65);
    }
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize the file logger only if --log was given.
    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename } => {
            info!("Running Tokenize subcommand");

            let buf = read_source(&filename)?;
            let (tokens, errors) = Scanner::new(&buf).tokenize();

            for token in &tokens {
                println!("{}", token);
            }

            for error in &errors {
                eprintln!("{}", error);
            }

            if !errors.is_empty() {
                debug!("Tokenization failed, exiting with code 65");

                std::process::exit(65);
            }

            info!("Tokenization completed successfully");
        }

        Commands::Parse { filename, json } => {
            info!("Running Parse subcommand");

            let buf = read_source(&filename)?;

            let (tokens, errors) = Scanner::new(&buf).tokenize();
            report_front_end_errors(&errors);

            let (statements, errors) = Parser::new(tokens).parse();
            report_front_end_errors(&errors);

            if json {
                println!("{}", serde_json::to_string_pretty(&statements)?);
            } else {
                println!("{}", AstPrinter::print(&statements));
            }

            info!("Parse subcommand completed");
        }

        Commands::Run { filename } => {
            info!("Running Run subcommand");

            let buf = read_source(&filename)?;

            let (tokens, errors) = Scanner::new(&buf).tokenize();
            report_front_end_errors(&errors);

            let (statements, errors) = Parser::new(tokens).parse();
            report_front_end_errors(&errors);

            info!("Parsed {} statements", statements.len());

            let mut interpreter = Interpreter::new();

            if let Err(e) = interpreter.interpret(&statements) {
                debug!("Runtime debug: {}", e);

                eprintln!("{}", e);

                std::process::exit(70);
            }

            info!("Program executed successfully");
        }
    }

    Ok(())
}
