use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use epub2pdf::{converter, Converter, PaperSize, PdfOptions, Report};
use std::path::PathBuf;
use std::process;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "epub2pdf")]
#[command(about = "CLI utility to turn an EPUB e-book into a single PDF")]
#[command(version = "0.1.0")]
struct Args {
    /// Enable debug logging
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an EPUB file to PDF
    Convert {
        /// Path to the EPUB file
        epub: PathBuf,

        /// Output PDF path (default: output/<name>.pdf)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        /// Paper size
        #[arg(long = "paper", value_enum, default_value = "a4")]
        paper: PaperSize,

        /// Print in landscape orientation
        #[arg(long = "landscape")]
        landscape: bool,

        /// Let @page rules in the book's CSS override the paper size
        #[arg(long = "prefer-css-page-size")]
        prefer_css_page_size: bool,

        /// Rendering scale
        #[arg(short = 's', long = "scale", default_value = "1.0", value_parser = parse_scale)]
        scale: f64,

        /// Page margin in inches, applied on every side
        #[arg(short = 'm', long = "margin", default_value = "0.0", value_parser = parse_non_negative)]
        margin: f64,

        /// Rendering timeout in seconds
        #[arg(short = 't', long = "timeout", default_value = "120.0", value_parser = parse_non_negative)]
        timeout: f64,

        /// Also write the assembled HTML to this path
        #[arg(long = "html")]
        html: Option<PathBuf>,

        /// Print the summary as JSON
        #[arg(long = "json")]
        json: bool,
    },
    /// Show what would be converted without rendering
    Inspect {
        /// Path to the EPUB file
        epub: PathBuf,

        /// Print the summary as JSON
        #[arg(long = "json")]
        json: bool,
    },
}

fn parse_non_negative(s: &str) -> Result<f64, String> {
    let value = s.parse::<f64>().map_err(|_| "Not a number.")?;
    if !value.is_finite() || value < 0.0 {
        return Err("Must be zero or positive number.".to_string());
    }
    Ok(value)
}

fn parse_scale(s: &str) -> Result<f64, String> {
    let value = s.parse::<f64>().map_err(|_| "Not a number.")?;
    if !value.is_finite() || !(0.1..=2.0).contains(&value) {
        return Err("Must be between 0.1 and 2.0.".to_string());
    }
    Ok(value)
}

fn print_report(report: &Report, json: bool) -> Result<()> {
    if json {
        println!("{}", report.to_json()?);
    } else {
        report.print();
    }
    Ok(())
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Convert {
            epub,
            output,
            paper,
            landscape,
            prefer_css_page_size,
            scale,
            margin,
            timeout,
            html,
            json,
        } => {
            let pdf_options = PdfOptions {
                paper,
                landscape,
                scale,
                prefer_css_page_size,
                ..Default::default()
            }
            .with_margin(margin);

            let mut converter = Converter::new(pdf_options, timeout);
            if let Some(html) = html {
                converter = converter.with_html_dump(html);
            }

            let report = converter.run(&epub, output.as_deref()).await?;
            print_report(&report, json)
        }
        Commands::Inspect { epub, json } => {
            let report = converter::inspect(&epub).await?;
            print_report(&report, json)
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    // Set up logging with chromiumoxide errors suppressed
    let filter = EnvFilter::from_default_env()
        .add_directive("chromiumoxide::conn=off".parse().unwrap())
        .add_directive("chromiumoxide::handler=off".parse().unwrap())
        .add_directive(format!("epub2pdf={}", level).parse().unwrap());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(e) = run(args.command).await {
        error!("{}", format!("Error: {}", e).red());
        process::exit(1);
    }
}
