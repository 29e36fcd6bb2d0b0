use anyhow::{Context, Result};
use mapview_core::geo::format_coords;
use mapview_core::providers::{Geocoder, MapRenderer, PlaceSearch, ORGANIZATION_SEARCH_SPAN};
use mapview_core::{
    find_nearest, haversine_distance, GeoPoint, MapConfig, MapRequest, MapType, Theme,
    ViewportState, YandexClient,
};
use std::path::PathBuf;

mod cli;

use cli::Command;

const DEFAULT_CONFIG_FILE: &str = "mapview.json";

fn main() -> Result<()> {
    let args = cli::parse_args();

    // Initialize logger with appropriate level based on verbose flag
    if std::env::var("RUST_LOG").is_err() {
        if args.verbose {
            std::env::set_var("RUST_LOG", "debug");
        } else {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    if let Command::InitConfig { force } = args.command {
        MapConfig::write_default(&config_path, force)?;
        println!("Wrote {}", config_path.display());
        return Ok(());
    }

    let config = MapConfig::load(&config_path)?.apply_env();

    match args.command {
        Command::InitConfig { .. } => unreachable!("handled before loading config"),
        Command::Distance {
            lon1,
            lat1,
            lon2,
            lat2,
        } => {
            let meters = haversine_distance(GeoPoint::new(lon1, lat1), GeoPoint::new(lon2, lat2));
            println!("{:.1} m", meters);
        }
        Command::Render {
            lon,
            lat,
            zoom,
            map_type,
            dark,
            marker_here,
            output,
        } => {
            let map_type = MapType::from_name(&map_type)
                .ok_or_else(|| anyhow::anyhow!("Unknown map type: {}", map_type))?;
            let center = GeoPoint::new(lon, lat);
            if !center.in_bounds() {
                anyhow::bail!("Center {} is outside the map bounds", center);
            }

            let mut state = ViewportState::default()
                .set_center_and_zoom(center, zoom)
                .with_map_type(map_type)
                .with_theme(if dark { Theme::Dark } else { Theme::Light });
            if marker_here {
                state = state.replace_marker(center);
            }

            let request = MapRequest::from_viewport(&state, config.map_width, config.map_height);
            let client = YandexClient::new(config)?;
            let map = client.render(&request)?;

            std::fs::write(&output, &map.bytes)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            log::info!(
                "Saved {}x{} map to {}",
                map.width(),
                map.height(),
                output.display()
            );
        }
        Command::Geocode { query } => {
            let query = query.join(" ");
            let client = YandexClient::new(config)?;
            match client.geocode(&query)? {
                Some(hit) => {
                    println!("{}", format_coords(&hit.point));
                    println!("{}", hit.address.display(true));
                }
                None => println!("Object not found"),
            }
        }
        Command::Reverse { lon, lat, postal } => {
            let point = GeoPoint::clamped(lon, lat);
            let client = YandexClient::new(config)?;
            match client.reverse(point)? {
                Some(address) => println!("{}", address.display(postal)),
                None => println!("{}", mapview_core::address::ADDRESS_NOT_FOUND),
            }
        }
        Command::Org { lon, lat, radius } => {
            let point = GeoPoint::clamped(lon, lat);
            let client = YandexClient::new(config)?;
            let candidates = client.search(point, ORGANIZATION_SEARCH_SPAN)?;
            log::debug!("{} organizations returned", candidates.len());

            if candidates.is_empty() {
                println!("No organizations found");
            } else {
                match find_nearest(point, &candidates, radius) {
                    Some(org) => {
                        println!("{}", org.summary());
                        println!(
                            "{} ({:.1} m away)",
                            format_coords(&org.location),
                            haversine_distance(point, org.location)
                        );
                    }
                    None => println!("Organization not found (within {} m)", radius),
                }
            }
        }
    }

    Ok(())
}
