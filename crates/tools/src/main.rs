use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use foundation::math::{EulerAngles, RouteDensity};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tools::{
    CliResult, distance_report, euler_report, load_airports, load_pairs, parse_point,
    route_layer, route_report, versor_report,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Globe rotation and great-circle route calculations")]
struct Cli {
    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct Density {
    /// Route points per degree of arc
    #[arg(long, default_value_t = 0.2)]
    points_per_degree: f64,

    /// Minimum number of route points
    #[arg(long, default_value_t = 10)]
    min_points: usize,
}

impl From<Density> for RouteDensity {
    fn from(d: Density) -> Self {
        RouteDensity::new(d.points_per_degree, d.min_points)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Great-circle route between two points as a GeoJSON feature
    Route {
        /// Start point: lon,lat
        #[arg(long, allow_hyphen_values = true)]
        from: String,

        /// End point: lon,lat
        #[arg(long, allow_hyphen_values = true)]
        to: String,

        #[command(flatten)]
        density: Density,
    },

    /// Distance, bearing and midpoint between two points
    Distance {
        #[arg(long, allow_hyphen_values = true)]
        from: String,

        #[arg(long, allow_hyphen_values = true)]
        to: String,
    },

    /// Shortest-arc quaternion taking one point onto another
    Versor {
        #[arg(long, allow_hyphen_values = true)]
        from: String,

        #[arg(long, allow_hyphen_values = true)]
        to: String,
    },

    /// Quaternion and matrix for Euler angles (degrees)
    Euler {
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        phi: f64,

        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        theta: f64,

        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        psi: f64,
    },

    /// Airline route layer from airport and city-pair JSON files
    Layer {
        /// JSON array of airports
        #[arg(long)]
        airports: PathBuf,

        /// JSON array of {"al", "base", "ref"} city pairs
        #[arg(long)]
        pairs: PathBuf,

        /// Only keep pairs flown by this airline
        #[arg(long)]
        airline: Option<String>,

        #[command(flatten)]
        density: Density,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = run(cli.command)?;
    if cli.pretty {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{output}");
    }
    Ok(())
}

fn run(command: Command) -> CliResult<Value> {
    match command {
        Command::Route { from, to, density } => {
            let density = RouteDensity::from(density);
            route_report(parse_point(&from)?, parse_point(&to)?, &density)
        }
        Command::Distance { from, to } => distance_report(parse_point(&from)?, parse_point(&to)?),
        Command::Versor { from, to } => versor_report(parse_point(&from)?, parse_point(&to)?),
        Command::Euler { phi, theta, psi } => euler_report(EulerAngles::new(phi, theta, psi)),
        Command::Layer {
            airports,
            pairs,
            airline,
            density,
        } => {
            let index = load_airports(&airports)?;
            let pairs = load_pairs(&pairs)?;
            info!("loaded {} airports and {} city pairs", index.len(), pairs.len());
            let density = RouteDensity::from(density);
            let layer = route_layer(&index, &pairs, airline.as_deref(), density);
            Ok(serde_json::from_str(&layer.to_geojson()?)?)
        }
    }
}
