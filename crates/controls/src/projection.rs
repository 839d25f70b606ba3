use foundation::math::{GeoPoint, Quaternion, Rotation, Vec2, Vec3, cartesian, spherical};

/// Rotation state owned by a map projection.
///
/// Handlers read and write the rotation through this trait only; everything
/// else about the projection is the host's business.
pub trait Projection {
    fn rotation(&self) -> Rotation;

    fn set_rotation(&mut self, rotation: Rotation);

    /// Geographic point under a pixel, if the pixel is on the map.
    fn invert(&self, _pixel: Vec2) -> Option<GeoPoint> {
        None
    }
}

/// Orthographic globe view: rotation, zoom and the pixel frame.
///
/// Rotation follows map-projection conventions: `yaw` turns the globe about
/// the polar axis (shifting longitudes), `pitch` tilts it towards or away
/// from the viewer, `roll` spins it about the line of sight. This differs from
/// `Rotation::to_quaternion`, which turns `yaw` about x.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewState {
    rotation: Rotation,
    zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
    scale_px: f64,
    center_px: Vec2,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            rotation: Rotation::default(),
            zoom: 1.0,
            min_zoom: 0.5,
            max_zoom: 8.0,
            scale_px: 250.0,
            center_px: Vec2::new(480.0, 300.0),
        }
    }
}

impl ViewState {
    pub fn new(scale_px: f64, center_px: Vec2) -> Self {
        Self {
            scale_px,
            center_px,
            ..Self::default()
        }
    }

    pub fn with_zoom_range(mut self, min_zoom: f64, max_zoom: f64) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom.max(min_zoom);
        self.zoom = self.zoom.clamp(self.min_zoom, self.max_zoom);
        self
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Multiply the zoom by `factor`, clamped to the zoom range.
    pub fn zoom_by(&mut self, factor: f64) -> f64 {
        self.zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        self.zoom
    }

    /// Quaternion taking world vectors into the view frame, where `+x` points
    /// at the viewer, `+y` right and `+z` up.
    pub fn orientation(&self) -> Quaternion {
        let Rotation { yaw, pitch, roll } = self.rotation;
        Quaternion::from_axis_angle(Vec3::X, roll)
            * Quaternion::from_axis_angle(Vec3::Y, -pitch)
            * Quaternion::from_axis_angle(Vec3::Z, yaw)
    }

    /// Pixel for a geographic point, or `None` on the far hemisphere.
    pub fn project(&self, point: GeoPoint) -> Option<Vec2> {
        let v = self.orientation().rotate(cartesian(point));
        if v.x < 0.0 {
            return None;
        }
        let k = self.scale_px * self.zoom;
        Some(Vec2::new(
            self.center_px.x + k * v.y,
            self.center_px.y - k * v.z,
        ))
    }
}

impl Projection for ViewState {
    fn rotation(&self) -> Rotation {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    fn invert(&self, pixel: Vec2) -> Option<GeoPoint> {
        let k = self.scale_px * self.zoom;
        let y = (pixel.x - self.center_px.x) / k;
        let z = (self.center_px.y - pixel.y) / k;
        let r2 = y * y + z * z;
        if r2 > 1.0 {
            return None;
        }
        let view = Vec3::new((1.0 - r2).sqrt(), y, z);
        Some(spherical(self.orientation().conjugate().rotate(view)))
    }
}
