use super::{
    GeoError, GeoPoint, GreatCircle, RouteDensity, RouteError, RouteGeometry, distance_km,
    great_circle_route, initial_bearing,
};

/// The pair of control points behind a two-point (azimuthal or equidistant)
/// map. Points are range-checked and rounded on every write.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TwoPointFrame {
    point1: GeoPoint,
    point2: GeoPoint,
}

impl TwoPointFrame {
    pub fn new(point1: GeoPoint, point2: GeoPoint) -> Result<Self, GeoError> {
        Ok(Self {
            point1: validate(point1)?,
            point2: validate(point2)?,
        })
    }

    pub fn point1(&self) -> GeoPoint {
        self.point1
    }

    pub fn point2(&self) -> GeoPoint {
        self.point2
    }

    /// On error the previous point is kept.
    pub fn set_point1(&mut self, point: GeoPoint) -> Result<(), GeoError> {
        self.point1 = validate(point)?;
        Ok(())
    }

    pub fn set_point2(&mut self, point: GeoPoint) -> Result<(), GeoError> {
        self.point2 = validate(point)?;
        Ok(())
    }

    pub fn distance_km(&self) -> f64 {
        distance_km(self.point1, self.point2)
    }

    pub fn initial_bearing(&self) -> f64 {
        initial_bearing(self.point1, self.point2)
    }

    pub fn midpoint(&self) -> GeoPoint {
        GreatCircle::new(self.point1, self.point2).midpoint()
    }

    pub fn route(&self, density: &RouteDensity) -> Result<RouteGeometry, RouteError> {
        great_circle_route(self.point1, self.point2, density)
    }
}

fn validate(p: GeoPoint) -> Result<GeoPoint, GeoError> {
    GeoPoint::validated(p.longitude, p.latitude)
}
