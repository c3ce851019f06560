use clap::{Parser, Subcommand};
use colored_json::{Color, ColorMode, Output, Styler, ToColoredJson};
use iab_consent::v1::{ConsentString, Purpose};
use num_traits::FromPrimitive;
use serde::Serialize;
use std::error::Error;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a consent string and display it in the console
    Parse {
        /// Consent string to parse
        consent_string: String,
    },
    /// Encode a JSON consent record into a consent string
    Format {
        /// JSON file to read, standard input if missing
        path: Option<PathBuf>,
    },
    /// Check whether vendors and purposes are allowed
    Check {
        /// Consent string to parse
        consent_string: String,
        /// Vendor ID to check
        #[arg(short, long = "vendor")]
        vendors: Vec<u16>,
        /// Purpose ID to check
        #[arg(short, long = "purpose")]
        purposes: Vec<u16>,
    },
    /// List allowed purposes
    Purposes {
        /// Consent string to parse
        consent_string: String,
    },
}

fn main() {
    let args = Cli::parse();

    let e = match args.cmd {
        Commands::Parse { consent_string } => parse_consent_string(&consent_string),
        Commands::Format { path } => format_consent_string(path),
        Commands::Check {
            consent_string,
            vendors,
            purposes,
        } => check_consent(&consent_string, &vendors, &purposes),
        Commands::Purposes { consent_string } => list_purposes(&consent_string),
    };

    if let Err(e) = e {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn parse_consent_string(s: &str) -> Result<(), Box<dyn Error>> {
    match ConsentString::from_str(s) {
        Ok(consent) => print_json(&consent),
        Err(e) => {
            if let Some(partial) = e.partial() {
                print_json(partial)?;
            }
            Err(e.into())
        }
    }
}

fn format_consent_string(path: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let json = match path {
        Some(path) => fs::read_to_string(path)?,
        None => io::read_to_string(io::stdin())?,
    };
    let consent: ConsentString = serde_json::from_str(&json)?;

    println!("{}", consent);

    Ok(())
}

fn check_consent(s: &str, vendors: &[u16], purposes: &[u16]) -> Result<(), Box<dyn Error>> {
    let consent = ConsentString::from_str(s)?;

    for &id in vendors {
        println!("vendor\t{}\t{}", id, verdict(consent.vendor_allowed(id)));
    }
    for &id in purposes {
        println!("purpose\t{}\t{}", id, verdict(consent.purpose_allowed(id)));
    }

    Ok(())
}

fn list_purposes(s: &str) -> Result<(), Box<dyn Error>> {
    let consent = ConsentString::from_str(s)?;

    for &id in &consent.purposes_allowed {
        match Purpose::from_u16(id) {
            Some(p) => println!("{}\t{}", id, p),
            None => println!("{}", id),
        }
    }

    Ok(())
}

fn verdict(allowed: bool) -> &'static str {
    if allowed { "allowed" } else { "denied" }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!(
        "{}",
        serde_json::to_string_pretty(value)?
            .to_colored_json_with_styler(ColorMode::Auto(Output::StdOut), json_color_styler())?
    );

    Ok(())
}

fn json_color_styler() -> Styler {
    Styler {
        key: Color::Green.foreground(),
        string_value: Color::Blue.bold(),
        integer_value: Color::Magenta.bold(),
        float_value: Color::Magenta.italic(),
        object_brackets: Color::Yellow.bold(),
        array_brackets: Color::Cyan.bold(),
        ..Default::default()
    }
}
