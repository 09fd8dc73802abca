//! Command-line interface for inp
//! Reads SWMM-style project files and writes them back out in another layout or format.
//!
//! Usage:
//!   inp convert `<path>` [--format `<format>`] [--config `<file>`]  - Re-write a project file
//!   inp sections `<path>`                                      - Summarize the sections of a file
//!   inp list-formats                                           - List all available output formats

use clap::{Arg, Command};
use swmm_inp::inp::config::LoggingConfig;
use swmm_inp::inp::formats::{FormatRegistry, InpFormatter};
use swmm_inp::{Document, InpConfig, Loader, Section};
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = Command::new("inp")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for reading and rewriting SWMM project files")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the built-in defaults")
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Parse a project file and write it in the given format")
                .arg(
                    Arg::new("path")
                        .help("Path to the .inp file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format (e.g., 'inp', 'inp-fast', 'json', 'yaml')")
                        .default_value("inp"),
                ),
        )
        .subcommand(
            Command::new("sections")
                .about("List the sections of a project file with their kind and size")
                .arg(
                    Arg::new("path")
                        .help("Path to the .inp file")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(Command::new("list-formats").about("List available output formats"))
        .get_matches();

    let config = load_config(matches.get_one::<String>("config"));
    init_logging(&config.logging);

    match matches.subcommand() {
        Some(("convert", convert_matches)) => {
            let path = convert_matches.get_one::<String>("path").unwrap();
            let format = convert_matches.get_one::<String>("format").unwrap();
            handle_convert_command(path, format, &config);
        }
        Some(("sections", sections_matches)) => {
            let path = sections_matches.get_one::<String>("path").unwrap();
            handle_sections_command(path);
        }
        Some(("list-formats", _)) => {
            handle_list_formats_command(&config);
        }
        _ => unreachable!(),
    }
}

fn load_config(path: Option<&String>) -> InpConfig {
    let loader = match path {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new(),
    };
    loader.build().unwrap_or_else(|e| {
        eprintln!("Error loading configuration: {}", e);
        std::process::exit(1);
    })
}

/// `RUST_LOG` wins over the configured filter.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn formats(config: &InpConfig) -> FormatRegistry {
    let mut registry = FormatRegistry::with_defaults();
    registry.register(InpFormatter::new("inp", config.write.clone()));
    registry.register(InpFormatter::fast().with_options(&config.write));
    registry
}

fn read_document(path: &str) -> Document {
    let source = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file: {}", e);
        std::process::exit(1);
    });
    Document::read(&source).unwrap_or_else(|e| {
        eprintln!("Parse error in {}: {}", path, e);
        std::process::exit(1);
    })
}

/// Handle the convert command
fn handle_convert_command(path: &str, format: &str, config: &InpConfig) {
    let document = read_document(path);
    let output = formats(config)
        .serialize(&document, format)
        .unwrap_or_else(|e| {
            eprintln!("Conversion error: {}", e);
            std::process::exit(1);
        });

    print!("{}", output);
}

/// Handle the sections command
fn handle_sections_command(path: &str) {
    let document = read_document(path);
    for (name, section) in document.iter() {
        let detail = match section {
            Section::Objects(container) => format!("{} ({})", section.kind_name(), container.schema().kind()),
            other => other.kind_name().to_string(),
        };
        println!("{:<16} {:<24} {}", name, detail, section.len());
    }
}

/// Handle the list-formats command
fn handle_list_formats_command(config: &InpConfig) {
    println!("Available output formats:\n");
    for (name, description) in formats(config).describe() {
        println!("  {}", name);
        if !description.is_empty() {
            println!("    {}", description);
        }
    }
}
