//! Versor (unit quaternion) math.
//!
//! Quaternions are stored as `w, x, y, z`. Every operation that uses a
//! quaternion as a rotation normalizes it first, so callers may pass values
//! that drifted slightly off the unit sphere.
//!
//! Three angle triples appear here:
//! - [`EulerAngles`] `phi, theta, psi`: rotations about x, y, z with
//!   `R = Rz(psi) * Ry(theta) * Rx(phi)`.
//! - [`Rotation`] `yaw, pitch, roll`: the triple a map projection consumes.
//!   It uses the same axis convention as [`EulerAngles`], in order.
//! - [`Mat3`]: row-major rotation matrix.

use serde::{Deserialize, Serialize};

use super::{MathError, Vec3};

/// `dot` at or beyond which two unit vectors count as parallel/antiparallel.
pub const PARALLEL_THRESHOLD: f64 = 0.999_999;

/// `|dot|` above which [`slerp`] falls back to normalized lerp.
pub const SLERP_LINEAR_THRESHOLD: f64 = 0.9995;

const GIMBAL_EPS: f64 = 1e-12;

/// Row-major 3x3 matrix.
pub type Mat3 = [[f64; 3]; 3];

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    pub const IDENTITY: Self = Self::new(1.0, 0.0, 0.0, 0.0);

    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// Rotation of `degrees` about `axis` (right-handed). `axis` must be unit.
    pub fn from_axis_angle(axis: Vec3, degrees: f64) -> Self {
        let (s, c) = (degrees.to_radians() / 2.0).sin_cos();
        Self::new(c, axis.x * s, axis.y * s, axis.z * s)
    }

    pub fn from_array(q: [f64; 4]) -> Self {
        Self::new(q[0], q[1], q[2], q[3])
    }

    pub fn as_array(self) -> [f64; 4] {
        [self.w, self.x, self.y, self.z]
    }

    pub fn dot(self, other: Self) -> f64 {
        self.w * other.w + self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn normalize(self) -> Result<Self, MathError> {
        let n = self.norm();
        if n == 0.0 || !n.is_finite() {
            return Err(MathError::ZeroLength);
        }
        Ok(Self::new(self.w / n, self.x / n, self.y / n, self.z / n))
    }

    pub fn conjugate(self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    /// Multiplicative inverse. Equals the conjugate for unit quaternions.
    pub fn inverse(self) -> Result<Self, MathError> {
        let n2 = self.dot(self);
        if n2 == 0.0 || !n2.is_finite() {
            return Err(MathError::ZeroLength);
        }
        let c = self.conjugate();
        Ok(Self::new(c.w / n2, c.x / n2, c.y / n2, c.z / n2))
    }

    /// Rotation angle in radians, in `[0, 2π]`.
    pub fn angle(self) -> f64 {
        2.0 * self.w.clamp(-1.0, 1.0).acos()
    }

    /// Rotate `v` by this quaternion, assumed unit.
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let qv = Vec3::new(self.x, self.y, self.z);
        let t = qv.cross(v).scale(2.0);
        v + t.scale(self.w) + qv.cross(t)
    }
}

impl std::ops::Mul for Quaternion {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        multiply(self, rhs)
    }
}

impl std::ops::Neg for Quaternion {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.w, -self.x, -self.y, -self.z)
    }
}

/// Angles about x, y and z in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EulerAngles {
    pub phi: f64,
    pub theta: f64,
    pub psi: f64,
}

impl EulerAngles {
    pub fn new(phi: f64, theta: f64, psi: f64) -> Self {
        Self { phi, theta, psi }
    }
}

/// Projection rotation `[yaw, pitch, roll]` in degrees.
///
/// The quaternion conversions here read the triple in [`EulerAngles`] order:
/// `yaw` about x, `pitch` about y, `roll` about z. Projections may attach
/// their own axes to the same triple (an orthographic globe turns `yaw` about
/// the polar axis), so a rotation recovered from a quaternion is not a
/// projection rotation in general.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl Rotation {
    pub fn new(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self { yaw, pitch, roll }
    }

    pub fn as_array(self) -> [f64; 3] {
        [self.yaw, self.pitch, self.roll]
    }

    pub fn to_quaternion(self) -> Quaternion {
        rotation_to_quaternion(self)
    }

    pub fn from_quaternion(q: Quaternion) -> Result<Self, MathError> {
        quaternion_to_rotation(q)
    }
}

/// Hamilton product. `multiply(a, b)` applies `b` first, then `a`.
pub fn multiply(a: Quaternion, b: Quaternion) -> Quaternion {
    Quaternion::new(
        a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
        a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
        a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
        a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
    )
}

/// Shortest-arc rotation taking the direction of `v0` onto that of `v1`.
///
/// Antiparallel inputs have no unique axis; a half turn about an axis
/// perpendicular to `v0` is returned.
pub fn quaternion(v0: Vec3, v1: Vec3) -> Result<Quaternion, MathError> {
    let a = v0.normalize()?;
    let b = v1.normalize()?;
    let dot = a.dot_clamped(b);

    if dot >= PARALLEL_THRESHOLD {
        return Ok(Quaternion::IDENTITY);
    }

    if dot <= -PARALLEL_THRESHOLD {
        // Cross with whichever basis axis is far from `a`.
        let reference = if a.x.abs() < 0.1 { Vec3::X } else { Vec3::Y };
        let axis = a.cross(reference).normalize()?;
        return Ok(Quaternion::new(0.0, axis.x, axis.y, axis.z));
    }

    let w = a.cross(b);
    let wlen = w.length();
    if wlen < 1e-10 {
        return Ok(Quaternion::IDENTITY);
    }

    let half = dot.acos() / 2.0;
    let s = half.sin() / wlen;
    Ok(Quaternion::new(half.cos(), w.x * s, w.y * s, w.z * s))
}

pub fn quaternion_to_matrix(q: Quaternion) -> Result<Mat3, MathError> {
    let Quaternion { w, x, y, z } = q.normalize()?;
    let (xx, yy, zz) = (x * x, y * y, z * z);
    let (xy, xz, yz) = (x * y, x * z, y * z);
    let (wx, wy, wz) = (w * x, w * y, w * z);

    Ok([
        [1.0 - 2.0 * (yy + zz), 2.0 * (xy - wz), 2.0 * (xz + wy)],
        [2.0 * (xy + wz), 1.0 - 2.0 * (xx + zz), 2.0 * (yz - wx)],
        [2.0 * (xz - wy), 2.0 * (yz + wx), 1.0 - 2.0 * (xx + yy)],
    ])
}

/// Decompose a rotation matrix into [`EulerAngles`].
///
/// At gimbal lock (`|m31| == 1`) only `psi - phi` (or `psi + phi`) is
/// determined; `phi` is pinned to zero and `psi` absorbs the rest.
pub fn matrix_to_euler(m: &Mat3) -> EulerAngles {
    let m31 = m[2][0];

    let (phi, theta, psi) = if (m31.abs() - 1.0).abs() > GIMBAL_EPS {
        let theta = -m31.clamp(-1.0, 1.0).asin();
        let c = theta.cos();
        let phi = (m[2][1] / c).atan2(m[2][2] / c);
        let psi = (m[1][0] / c).atan2(m[0][0] / c);
        (phi, theta, psi)
    } else if m31 < 0.0 {
        // theta = +90: row one is [0, -sin psi, cos psi].
        (0.0, std::f64::consts::FRAC_PI_2, (-m[0][1]).atan2(m[0][2]))
    } else {
        // theta = -90: row one is [0, -sin psi, -cos psi].
        (0.0, -std::f64::consts::FRAC_PI_2, (-m[0][1]).atan2(-m[0][2]))
    };

    EulerAngles::new(phi.to_degrees(), theta.to_degrees(), psi.to_degrees())
}

pub fn euler_to_quaternion(e: EulerAngles) -> Quaternion {
    let (s1, c1) = (e.phi.to_radians() / 2.0).sin_cos();
    let (s2, c2) = (e.theta.to_radians() / 2.0).sin_cos();
    let (s3, c3) = (e.psi.to_radians() / 2.0).sin_cos();

    Quaternion::new(
        c1 * c2 * c3 + s1 * s2 * s3,
        s1 * c2 * c3 - c1 * s2 * s3,
        c1 * s2 * c3 + s1 * c2 * s3,
        c1 * c2 * s3 - s1 * s2 * c3,
    )
}

pub fn rotation_to_quaternion(r: Rotation) -> Quaternion {
    euler_to_quaternion(EulerAngles::new(r.yaw, r.pitch, r.roll))
}

pub fn quaternion_to_rotation(q: Quaternion) -> Result<Rotation, MathError> {
    let Quaternion { w, x, y, z } = q.normalize()?;

    let yaw = (2.0 * (w * x + y * z)).atan2(1.0 - 2.0 * (x * x + y * y));
    let pitch = (2.0 * (w * y - z * x)).clamp(-1.0, 1.0).asin();
    let roll = (2.0 * (w * z + x * y)).atan2(1.0 - 2.0 * (y * y + z * z));

    Ok(Rotation::new(
        yaw.to_degrees(),
        pitch.to_degrees(),
        roll.to_degrees(),
    ))
}

/// Spherical linear interpolation from `q1` (`t = 0`) to `q2` (`t = 1`).
///
/// Takes the shorter arc, so the `t = 1` result may be `-q2`.
pub fn slerp(q1: Quaternion, q2: Quaternion, t: f64) -> Result<Quaternion, MathError> {
    let a = q1.normalize()?;
    let mut b = q2.normalize()?;
    let mut dot = a.dot(b).clamp(-1.0, 1.0);

    if dot < 0.0 {
        b = -b;
        dot = -dot;
    }

    if dot > SLERP_LINEAR_THRESHOLD {
        return Quaternion::new(
            a.w + t * (b.w - a.w),
            a.x + t * (b.x - a.x),
            a.y + t * (b.y - a.y),
            a.z + t * (b.z - a.z),
        )
        .normalize();
    }

    let theta_0 = dot.acos();
    let theta = theta_0 * t;
    let sin_theta = theta.sin();
    let sin_theta_0 = theta_0.sin();

    let s0 = theta.cos() - dot * sin_theta / sin_theta_0;
    let s1 = sin_theta / sin_theta_0;

    Ok(Quaternion::new(
        s0 * a.w + s1 * b.w,
        s0 * a.x + s1 * b.x,
        s0 * a.y + s1 * b.y,
        s0 * a.z + s1 * b.z,
    ))
}
