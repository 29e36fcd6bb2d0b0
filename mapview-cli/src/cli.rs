use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Query static maps, the geocoder and organization search from the terminal
#[derive(Parser, Debug)]
#[command(name = "mapview")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Static map rendering and place lookup", long_about = None)]
pub struct Args {
    /// Verbose logging
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// JSON config file with API keys and endpoints
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a static map image to a file
    Render {
        /// Center longitude
        #[arg(long, default_value_t = 37.6176, allow_hyphen_values = true)]
        lon: f64,

        /// Center latitude
        #[arg(long, default_value_t = 55.7558, allow_hyphen_values = true)]
        lat: f64,

        /// Zoom level (1-17)
        #[arg(
            short,
            long,
            default_value_t = 10,
            value_parser = clap::value_parser!(u8).range(1..=17)
        )]
        zoom: u8,

        /// Map layers: base, satellite, satellite-labels, traffic, transit, admin
        #[arg(short = 't', long = "map-type", default_value = "base")]
        map_type: String,

        /// Use the dark theme
        #[arg(long)]
        dark: bool,

        /// Put a marker at the center
        #[arg(long = "marker-here")]
        marker_here: bool,

        /// Output image path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Resolve an address or place name to coordinates
    Geocode {
        #[arg(value_name = "QUERY", required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Resolve coordinates to an address
    Reverse {
        #[arg(allow_hyphen_values = true)]
        lon: f64,
        #[arg(allow_hyphen_values = true)]
        lat: f64,

        /// Append the postal code when known
        #[arg(long)]
        postal: bool,
    },

    /// Find an organization standing at the given coordinates
    Org {
        #[arg(allow_hyphen_values = true)]
        lon: f64,
        #[arg(allow_hyphen_values = true)]
        lat: f64,

        /// Match radius in meters
        #[arg(short, long, default_value_t = 50.0)]
        radius: f64,
    },

    /// Write a config file with default endpoints and empty API keys
    InitConfig {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Great-circle distance between two points in meters
    Distance {
        #[arg(allow_hyphen_values = true)]
        lon1: f64,
        #[arg(allow_hyphen_values = true)]
        lat1: f64,
        #[arg(allow_hyphen_values = true)]
        lon2: f64,
        #[arg(allow_hyphen_values = true)]
        lat2: f64,
    },
}

/// Parses command-line arguments
pub fn parse_args() -> Args {
    Args::parse()
}
