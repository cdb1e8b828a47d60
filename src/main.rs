use clap::{ArgAction, Parser, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use sei_telemetry::{export, extract_series_from_path, ExtractConfig, FrameRate, FrameSeries};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "sei-telemetry")]
#[command(about = "Extract Tesla dashcam SEI telemetry", long_about = None)]
struct Cli {
    /// Input MP4 file
    #[arg(value_name = "INPUT.mp4")]
    input: PathBuf,

    /// Output file path (use '-' for stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Csv, conflicts_with_all = ["csv", "json"])]
    format: OutputFormat,

    /// Alias for `--format csv`
    #[arg(long, conflicts_with_all = ["json", "format"], action = ArgAction::SetTrue)]
    csv: bool,

    /// Alias for `--format json`
    #[arg(long, conflicts_with_all = ["csv", "format"], action = ArgAction::SetTrue)]
    json: bool,

    /// Recorder frame rate used to timestamp frames
    #[arg(long = "fps", value_name = "FPS", default_value_t = FrameRate::TESLA_DASHCAM.fps())]
    fps: f64,

    /// Print the interpolated telemetry at this time (seconds) as JSON instead of the series
    #[arg(long = "at", value_name = "SECONDS")]
    at: Option<f64>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn resolve_format(cli: &Cli) -> OutputFormat {
    if cli.csv {
        OutputFormat::Csv
    } else if cli.json {
        OutputFormat::Json
    } else {
        cli.format
    }
}

fn should_write_to_stdout(output: &Option<PathBuf>) -> bool {
    match output {
        None => true,
        Some(p) => p.as_os_str() == "-",
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::builder()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Interpolated telemetry at `t` as pretty JSON (`null` for an empty series).
fn write_snapshot(series: &FrameSeries, t: f64, out: &mut dyn Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(&series.at(t))?;
    writeln!(out, "{json}")
}

fn write_series(
    series: &FrameSeries,
    at: Option<f64>,
    format: OutputFormat,
    out: &mut dyn Write,
) -> io::Result<()> {
    if let Some(t) = at {
        return write_snapshot(series, t, out);
    }

    match format {
        OutputFormat::Csv => export::write_csv(series, out),
        OutputFormat::Json => export::write_json(series, out),
    }
}

fn run_with_writer(cli: &Cli, config: &ExtractConfig, out: &mut dyn Write) -> io::Result<()> {
    let series = extract_series_from_path(&cli.input, config).map_err(io::Error::other)?;
    log::info!(
        "{}: {} frames over {:.2}s",
        cli.input.display(),
        series.len(),
        series.duration()
    );
    write_series(&series, cli.at, resolve_format(cli), out)
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let frame_rate = FrameRate::new(cli.fps).map_err(io::Error::other)?;
    let config = ExtractConfig::default().with_frame_rate(frame_rate);

    if should_write_to_stdout(&cli.output) {
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        run_with_writer(&cli, &config, &mut out)?;
        out.flush()?;
    } else if let Some(path) = &cli.output {
        let file = File::create(path)?;
        let mut out = BufWriter::new(file);
        run_with_writer(&cli, &config, &mut out)?;
        out.flush()?;
    }

    Ok(())
}
