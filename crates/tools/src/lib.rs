//! Report builders behind the `atlas` CLI. Each returns a JSON value so the
//! binary only parses arguments and prints.

use std::error::Error;
use std::fs;
use std::path::Path;

use foundation::math::{
    EulerAngles, GeoPoint, Quaternion, RouteDensity, TwoPointFrame, cartesian,
    euler_to_quaternion, matrix_to_euler, quaternion, quaternion_to_matrix,
};
use layers::{Airport, AirportIndex, CityPair, RouteLayer, RouteLayerBuilder};
use serde_json::{Value, json};
use tracing::info;

pub type CliResult<T> = Result<T, Box<dyn Error>>;

/// Parse `lon,lat` into a validated point.
pub fn parse_point(s: &str) -> CliResult<GeoPoint> {
    let parts: Vec<_> = s.split(',').collect();
    if parts.len() != 2 {
        return Err(format!("point must be lon,lat (got {s:?})").into());
    }
    let lon: f64 = parts[0].trim().parse()?;
    let lat: f64 = parts[1].trim().parse()?;
    Ok(GeoPoint::validated(lon, lat)?)
}

fn quaternion_json(q: Quaternion) -> Value {
    json!({ "w": q.w, "x": q.x, "y": q.y, "z": q.z })
}

/// Great-circle route between two points as a GeoJSON feature.
pub fn route_report(from: GeoPoint, to: GeoPoint, density: &RouteDensity) -> CliResult<Value> {
    let frame = TwoPointFrame::new(from, to)?;
    let route = frame.route(density)?;
    info!(
        "route with {} points over {:.1} km",
        route.points.len(),
        route.distance_km()
    );

    let coordinates: Vec<[f64; 2]> = route.points.iter().map(|p| p.as_array()).collect();
    Ok(json!({
        "type": "Feature",
        "properties": {
            "distance_km": route.distance_km(),
            "initial_bearing": frame.initial_bearing(),
        },
        "geometry": { "type": "LineString", "coordinates": coordinates },
    }))
}

pub fn distance_report(from: GeoPoint, to: GeoPoint) -> CliResult<Value> {
    let frame = TwoPointFrame::new(from, to)?;
    Ok(json!({
        "from": frame.point1(),
        "to": frame.point2(),
        "distance_km": frame.distance_km(),
        "initial_bearing": frame.initial_bearing(),
        "midpoint": frame.midpoint(),
    }))
}

/// Rotation carrying `from` onto `to` on the unit sphere, with its Euler
/// angles (`phi`, `theta`, `psi` about x, y, z).
pub fn versor_report(from: GeoPoint, to: GeoPoint) -> CliResult<Value> {
    let q = quaternion(cartesian(from), cartesian(to))?;
    let euler = matrix_to_euler(&quaternion_to_matrix(q)?);
    Ok(json!({
        "quaternion": quaternion_json(q),
        "angle_deg": q.angle().to_degrees(),
        "euler": euler,
    }))
}

/// Quaternion and rotation matrix for Euler angles, plus the angles recovered
/// from that matrix.
pub fn euler_report(angles: EulerAngles) -> CliResult<Value> {
    let q = euler_to_quaternion(angles);
    let m = quaternion_to_matrix(q)?;
    Ok(json!({
        "quaternion": quaternion_json(q),
        "matrix": m,
        "recovered": matrix_to_euler(&m),
    }))
}

pub fn load_airports(path: &Path) -> CliResult<AirportIndex> {
    let text = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    let airports: Vec<Airport> = serde_json::from_str(&text)?;
    Ok(airports.into_iter().collect())
}

pub fn load_pairs(path: &Path) -> CliResult<Vec<CityPair>> {
    let text = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    Ok(serde_json::from_str(&text)?)
}

pub fn route_layer(
    airports: &AirportIndex,
    pairs: &[CityPair],
    airline: Option<&str>,
    density: RouteDensity,
) -> RouteLayer {
    let mut builder = RouteLayerBuilder::new(density);
    if let Some(al) = airline {
        builder = builder.airline(al);
    }
    builder.build(1, airports, pairs)
}
