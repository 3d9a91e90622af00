use anyhow::{Context, Result};
use areascope_core::csv_export::{export_history_csv, CsvExportConfig};
use areascope_core::export::{measurement_json, write_history_json};
use areascope_core::format::{AreaSummary, SizeComparison};
use areascope_core::{
    to_hectares, to_kilometers, unproject_path, unproject_vertex, CoordinateMode, Measurement,
    MeasurementKind, Vertex, WebMercator,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use storage::Storage;
use tracing_subscriber::EnvFilter;

pub mod config;

pub use config::CliConfig;

#[derive(Debug, Parser)]
#[command(name = "areascope")]
#[command(about = "Measure the area, perimeter and length of drawn shapes")]
pub struct Cli {
    /// Directory holding the saved measurement history
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Measure the area and perimeter of a polygon.
    Polygon {
        /// Ring vertex, repeat for each corner
        #[arg(
            long = "point",
            value_name = "X,Y",
            required = true,
            allow_hyphen_values = true,
            value_parser = parse_vertex
        )]
        points: Vec<Vertex>,
        #[command(flatten)]
        shape: ShapeArgs,
    },
    /// Measure the area and circumference of a circle.
    Circle {
        #[arg(long, value_name = "X,Y", allow_hyphen_values = true, value_parser = parse_vertex)]
        center: Vertex,
        /// Radius in metres (planar units with --planar)
        #[arg(long, allow_hyphen_values = true)]
        radius: f64,
        #[command(flatten)]
        shape: ShapeArgs,
    },
    /// Measure the length of a path.
    Line {
        /// Path vertex, repeat for each point
        #[arg(
            long = "point",
            value_name = "X,Y",
            required = true,
            allow_hyphen_values = true,
            value_parser = parse_vertex
        )]
        points: Vec<Vertex>,
        #[command(flatten)]
        shape: ShapeArgs,
    },
    /// Convert an area into display units and size comparisons.
    Compare {
        /// Area in square metres
        #[arg(long, allow_hyphen_values = true)]
        area: f64,
    },
    /// Inspect or edit the saved measurement history.
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Args)]
struct ShapeArgs {
    /// Coordinates are plain Cartesian units rather than longitude/latitude
    #[arg(long, conflicts_with = "projected")]
    planar: bool,
    /// Coordinates are web map (EPSG:3857) metres; converted to lon/lat first
    #[arg(long)]
    projected: bool,
    /// Place name to attach to the measurement
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    notes: Option<String>,
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,
    #[arg(long)]
    favorite: bool,
    /// Append the measurement to the saved history
    #[arg(long)]
    save: bool,
}

impl ShapeArgs {
    fn mode(&self) -> CoordinateMode {
        if self.planar {
            CoordinateMode::Planar
        } else {
            CoordinateMode::Geographic
        }
    }

    fn vertices(&self, points: Vec<Vertex>) -> Vec<Vertex> {
        if self.projected {
            unproject_path(&WebMercator, &points)
        } else {
            points
        }
    }

    fn apply_metadata(&self, measurement: &mut Measurement) {
        let metadata = measurement.metadata_mut();
        if let Some(name) = &self.name {
            metadata.set_name(name.clone());
        }
        if let Some(notes) = &self.notes {
            metadata.set_notes(notes.clone());
        }
        for tag in &self.tags {
            metadata.add_tag(tag);
        }
        if self.favorite {
            metadata.set_favorite(true);
        }
    }
}

#[derive(Debug, Subcommand)]
enum HistoryCommand {
    /// List saved measurements, newest first.
    List,
    /// Print one saved measurement as JSON.
    Show {
        #[arg(value_name = "INDEX")]
        index: usize,
    },
    /// Delete the measurement at a position.
    Delete {
        #[arg(value_name = "INDEX")]
        index: usize,
    },
    /// Remove every saved measurement.
    Clear,
    /// Export the whole history.
    Export {
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Only export favorites (CSV)
        #[arg(long)]
        favorites: bool,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Json,
    Csv,
}

#[derive(Debug, Serialize)]
struct CompareOutput {
    area: AreaSummary,
    comparisons: SizeComparison,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let config = CliConfig::from_env().with_data_dir_override(cli.data_dir);
    init_logging(&config.log_level);

    match cli.command {
        Commands::Polygon { points, shape } => {
            let ring = shape.vertices(points);
            let measurement = Measurement::polygon(&ring, shape.mode(), shape.location.clone())?;
            finish_measurement(measurement, &shape, &config)
        }
        Commands::Circle { center, radius, shape } => {
            let center = if shape.projected { unproject_vertex(center) } else { center };
            let measurement =
                Measurement::circle(center, radius, shape.mode(), shape.location.clone())?;
            finish_measurement(measurement, &shape, &config)
        }
        Commands::Line { points, shape } => {
            let path = shape.vertices(points);
            let measurement = Measurement::line(&path, shape.mode(), shape.location.clone())?;
            finish_measurement(measurement, &shape, &config)
        }
        Commands::Compare { area } => run_compare(area),
        Commands::History { command } => run_history(command, &config),
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(true)
        .try_init();
}

fn open_storage(config: &CliConfig) -> Result<Storage> {
    match &config.data_dir {
        Some(dir) => Ok(Storage::with_root(dir)),
        None => Storage::from_default_project().context("failed to locate history directory"),
    }
}

fn finish_measurement(
    mut measurement: Measurement,
    shape: &ShapeArgs,
    config: &CliConfig,
) -> Result<()> {
    shape.apply_metadata(&mut measurement);
    println!("{}", measurement_json(&measurement)?);

    if shape.save {
        let store = open_storage(config)?;
        let mut history = store.load_history().context("failed to load history")?;
        history.push(measurement);
        store.save_history(&history).context("failed to save history")?;
        tracing::info!(path = %store.history_path().display(), "measurement saved");
    }

    Ok(())
}

fn run_compare(area: f64) -> Result<()> {
    let payload = CompareOutput {
        area: AreaSummary::for_area(area)?,
        comparisons: SizeComparison::for_area(area)?,
    };
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn run_history(command: HistoryCommand, config: &CliConfig) -> Result<()> {
    let store = open_storage(config)?;
    let mut history = store.load_history().context("failed to load history")?;

    match command {
        HistoryCommand::List => {
            if history.is_empty() {
                println!("No measurements yet");
                return Ok(());
            }
            for (index, measurement) in history.iter().enumerate().rev() {
                println!("{}", history_line(index, measurement)?);
            }
        }
        HistoryCommand::Show { index } => {
            let measurement = history
                .get(index)
                .with_context(|| format!("no measurement at index {index}"))?;
            println!("{}", measurement_json(measurement)?);
        }
        HistoryCommand::Delete { index } => {
            let removed =
                history.remove(index).with_context(|| format!("no measurement at index {index}"))?;
            store.save_history(&history).context("failed to save history")?;
            println!("deleted {} ({})", index, removed.display_name());
        }
        HistoryCommand::Clear => {
            let count = history.len();
            history.clear();
            store.save_history(&history).context("failed to save history")?;
            println!("cleared {count} measurements");
        }
        HistoryCommand::Export { format, favorites, output } => {
            let mut buffer = Vec::new();
            match format {
                ExportFormat::Json => write_history_json(&mut buffer, &history)?,
                ExportFormat::Csv => {
                    let csv_config =
                        CsvExportConfig { favorites_only: favorites, ..Default::default() };
                    export_history_csv(&mut buffer, &history, &csv_config)?
                }
            }
            write_output(&buffer, output.as_deref())?;
        }
    }

    Ok(())
}

/// One history row as the history panel shows it
fn history_line(index: usize, measurement: &Measurement) -> Result<String> {
    let geographic = measurement.mode() == CoordinateMode::Geographic;
    let headline = match measurement.kind() {
        MeasurementKind::Polygon { area, .. } | MeasurementKind::Circle { area, .. } => {
            if geographic {
                format!("{:.2} ha", to_hectares(*area)?)
            } else {
                format!("{area:.2} sq units")
            }
        }
        MeasurementKind::Line { distance, .. } => {
            if geographic {
                format!("{:.2} km", to_kilometers(*distance)?)
            } else {
                format!("{distance:.2} units")
            }
        }
    };

    Ok(format!(
        "{index}\t{}\t{headline}\t{}\t{}",
        measurement.measurement_type(),
        measurement.location().unwrap_or("Unknown location"),
        measurement.display_name()
    ))
}

fn write_output(bytes: &[u8], output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, bytes)
                .with_context(|| format!("failed to write export to {}", path.display()))?;
            println!("{}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn parse_vertex(value: &str) -> Result<Vertex, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got `{value}`"))?;
    let x = x.trim().parse::<f64>().map_err(|e| format!("invalid X `{}`: {e}", x.trim()))?;
    let y = y.trim().parse::<f64>().map_err(|e| format!("invalid Y `{}`: {e}", y.trim()))?;
    Ok(Vertex::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_vertex_accepts_pairs() {
        assert_eq!(parse_vertex("1.5,-2").unwrap(), Vertex::new(1.5, -2.0));
        assert_eq!(parse_vertex(" -73.98 , 40.75 ").unwrap(), Vertex::new(-73.98, 40.75));
    }

    #[test]
    fn parse_vertex_rejects_garbage() {
        assert!(parse_vertex("12").is_err());
        assert!(parse_vertex("a,b").is_err());
    }

    #[test]
    fn history_line_formats_geographic_units() {
        let circle = Measurement::circle(
            Vertex::new(2.35, 48.85),
            100.0,
            CoordinateMode::Geographic,
            Some("Paris".to_owned()),
        )
        .unwrap();
        assert_eq!(
            history_line(0, &circle).unwrap(),
            "0\tcircle\t3.14 ha\tParis\tcircle measurement"
        );

        let line = Measurement::line(
            &[Vertex::new(0.0, 0.0), Vertex::new(0.0, 1.0)],
            CoordinateMode::Geographic,
            None,
        )
        .unwrap();
        assert_eq!(
            history_line(3, &line).unwrap(),
            "3\tline\t111.32 km\tUnknown location\tline measurement"
        );
    }

    #[test]
    fn history_line_keeps_planar_units() {
        let line = Measurement::line(
            &[Vertex::new(0.0, 0.0), Vertex::new(1_500.0, 0.0)],
            CoordinateMode::Planar,
            None,
        )
        .unwrap();
        assert_eq!(
            history_line(3, &line).unwrap(),
            "3\tline\t1500.00 units\tUnknown location\tline measurement"
        );
    }
}
