//! Spherical geodesy: geographic/Cartesian conversion and great circles.
//!
//! All angles at the API boundary are degrees; distances are radians of arc
//! unless a function says otherwise.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::{GeoError, Vec3};

/// Mean Earth radius (kilometers).
pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Arc length (radians) beyond which two points count as antipodal.
const ANTIPODAL_EPS: f64 = 1e-9;

/// Upper bound on the points of a single route polyline.
pub const MAX_ROUTE_POINTS: usize = 100_000;

/// Geographic position in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    /// Unchecked constructor.
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Range-checked constructor; both components are rounded to 3 decimals.
    pub fn validated(longitude: f64, latitude: f64) -> Result<Self, GeoError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::LongitudeOutOfRange(longitude));
        }
        Ok(Self::new(round3(longitude), round3(latitude)))
    }

    pub fn as_array(self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Unit vector for a geographic point.
pub fn cartesian(p: GeoPoint) -> Vec3 {
    let lambda = p.longitude.to_radians();
    let phi = p.latitude.to_radians();
    let cos_phi = phi.cos();
    Vec3::new(cos_phi * lambda.cos(), cos_phi * lambda.sin(), phi.sin())
}

/// Geographic point for a (near) unit vector.
pub fn spherical(v: Vec3) -> GeoPoint {
    GeoPoint::new(
        v.y.atan2(v.x).to_degrees(),
        v.z.clamp(-1.0, 1.0).asin().to_degrees(),
    )
}

/// Great-circle distance in radians (haversine).
pub fn angular_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = phi2 - phi1;
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin()
}

pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    angular_distance(a, b) * EARTH_RADIUS_KM
}

/// Initial bearing from `a` towards `b`, degrees clockwise from north in `[0, 360)`.
pub fn initial_bearing(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let y = d_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();
    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Interpolator along the great circle between two points.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GreatCircle {
    start: GeoPoint,
    end: GeoPoint,
    from: Vec3,
    to: Vec3,
    distance_rad: f64,
}

impl GreatCircle {
    pub fn new(start: GeoPoint, end: GeoPoint) -> Self {
        Self {
            start,
            end,
            from: cartesian(start),
            to: cartesian(end),
            distance_rad: angular_distance(start, end),
        }
    }

    pub fn distance_rad(&self) -> f64 {
        self.distance_rad
    }

    /// True when the endpoints are (numerically) antipodal, which leaves the
    /// path direction undefined.
    pub fn is_antipodal(&self) -> bool {
        self.distance_rad > PI - ANTIPODAL_EPS
    }

    /// Point at fraction `t` of the arc. `t <= 0` and `t >= 1` return the
    /// endpoints exactly.
    pub fn interpolate(&self, t: f64) -> GeoPoint {
        if t <= 0.0 || self.distance_rad == 0.0 {
            return self.start;
        }
        if t >= 1.0 {
            return self.end;
        }

        let d = self.distance_rad;
        let sin_d = d.sin();
        let ka = ((1.0 - t) * d).sin() / sin_d;
        let kb = (t * d).sin() / sin_d;
        spherical(self.from.scale(ka) + self.to.scale(kb))
    }

    pub fn midpoint(&self) -> GeoPoint {
        self.interpolate(0.5)
    }
}

/// Point density for great-circle routes.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteDensity {
    /// Points per degree of arc.
    pub points_per_degree: f64,
    /// Floor on the point count so short hops still draw smoothly.
    pub min_points: usize,
}

impl Default for RouteDensity {
    fn default() -> Self {
        Self {
            points_per_degree: 0.2,
            min_points: 10,
        }
    }
}

impl RouteDensity {
    pub fn new(points_per_degree: f64, min_points: usize) -> Self {
        Self {
            points_per_degree,
            min_points,
        }
    }

    /// Number of points for an arc of `distance_rad`. Never below 2.
    pub fn point_count(&self, distance_rad: f64) -> usize {
        let floor = self.min_points.max(2);
        let span = distance_rad.to_degrees() * self.points_per_degree;
        if !span.is_finite() || span <= 0.0 {
            return floor;
        }
        // Tolerance keeps exact multiples (90.000000000001) from rounding up.
        let n = (span - 1e-9).ceil() as usize;
        n.max(floor)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteGeometry {
    pub points: Vec<GeoPoint>,
    pub distance_rad: f64,
}

impl RouteGeometry {
    pub fn distance_km(&self) -> f64 {
        self.distance_rad * EARTH_RADIUS_KM
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum RouteError {
    AntipodalEndpoints { start: GeoPoint, end: GeoPoint },
    /// The density asks for more than [`MAX_ROUTE_POINTS`] points.
    TooManyPoints { requested: usize },
}

impl std::fmt::Display for RouteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteError::AntipodalEndpoints { start, end } => write!(
                f,
                "antipodal endpoints ({}, {}) and ({}, {}) have no unique great circle",
                start.longitude, start.latitude, end.longitude, end.latitude
            ),
            RouteError::TooManyPoints { requested } => write!(
                f,
                "route needs {requested} points, limit is {MAX_ROUTE_POINTS}"
            ),
        }
    }
}

impl std::error::Error for RouteError {}

/// Polyline approximating the geodesic from `start` to `end`.
pub fn great_circle_route(
    start: GeoPoint,
    end: GeoPoint,
    density: &RouteDensity,
) -> Result<RouteGeometry, RouteError> {
    let arc = GreatCircle::new(start, end);
    if arc.is_antipodal() {
        return Err(RouteError::AntipodalEndpoints { start, end });
    }

    let n = density.point_count(arc.distance_rad());
    if n > MAX_ROUTE_POINTS {
        return Err(RouteError::TooManyPoints { requested: n });
    }
    let last = (n - 1) as f64;
    let points = (0..n).map(|i| arc.interpolate(i as f64 / last)).collect();

    Ok(RouteGeometry {
        points,
        distance_rad: arc.distance_rad(),
    })
}
