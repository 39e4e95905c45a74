//! Surface materials and the optics helpers the integrators share.
//!
//! Directions follow one convention throughout: `w_out` points from the
//! surface toward the viewer, `w_in` from the surface toward where light
//! arrives from. Both are unit length.

use std::f32::consts::PI;

use lux_math::Vec3;
use rand::RngCore;

use crate::sampling::uniform_hemisphere;

/// Color type alias (linear RGB radiance or reflectance)
pub type Color = Vec3;

/// Emission below this length does not make a surface a light.
pub const EMISSION_THRESHOLD: f32 = 1e-5;

/// Index of refraction used when a material does not specify one.
pub const DEFAULT_REFRACTIVE_INDEX: f32 = 1.3;

/// How the Whitted shader treats a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Perfect mirror weighted by Fresnel reflectance.
    Reflective,
    /// Glass-like: reflected and refracted rays blended by Fresnel.
    ReflectiveRefractive,
    /// Terminal surface lit by point lights with a Phong model.
    DiffuseGlossy,
}

/// Phong weights for the Whitted diffuse/specular terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhongCoefficients {
    pub diffuse: f32,
    pub specular: f32,
    pub exponent: f32,
}

impl Default for PhongCoefficients {
    fn default() -> Self {
        Self {
            diffuse: 0.8,
            specular: 0.2,
            exponent: 25.0,
        }
    }
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Dispatch tag for the Whitted shader.
    fn kind(&self) -> SurfaceKind;

    /// Reflectance for light arriving along `w_in` and leaving along `w_out`.
    fn brdf(&self, w_out: Vec3, w_in: Vec3, normal: Vec3) -> Color;

    /// Draw an incoming direction for the path tracer.
    fn sample(&self, w_out: Vec3, normal: Vec3, rng: &mut dyn RngCore) -> Vec3;

    /// Density of [`Material::sample`] producing `w_in`.
    fn pdf(&self, w_out: Vec3, w_in: Vec3, normal: Vec3) -> f32;

    /// Radiance emitted by the surface.
    fn emission(&self) -> Color {
        Color::ZERO
    }

    fn is_emitting(&self) -> bool {
        self.emission().length() > EMISSION_THRESHOLD
    }

    fn refractive_index(&self) -> f32 {
        DEFAULT_REFRACTIVE_INDEX
    }

    /// Base color for the diffuse term.
    fn diffuse_color(&self) -> Color {
        Color::ZERO
    }

    fn phong(&self) -> PhongCoefficients {
        PhongCoefficients::default()
    }
}

/// Lambertian (diffuse) material, optionally emissive.
#[derive(Debug, Clone)]
pub struct Lambertian {
    albedo: Color,
    emission: Color,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self {
            albedo,
            emission: Color::ZERO,
        }
    }

    /// A diffuse surface that also emits `emission`.
    pub fn emissive(albedo: Color, emission: Color) -> Self {
        Self { albedo, emission }
    }
}

impl Material for Lambertian {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::DiffuseGlossy
    }

    fn brdf(&self, _w_out: Vec3, w_in: Vec3, normal: Vec3) -> Color {
        lambert_brdf(self.albedo, w_in, normal)
    }

    fn sample(&self, _w_out: Vec3, normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        uniform_hemisphere(normal, rng)
    }

    fn pdf(&self, _w_out: Vec3, w_in: Vec3, normal: Vec3) -> f32 {
        hemisphere_pdf(w_in, normal)
    }

    fn emission(&self) -> Color {
        self.emission
    }

    fn diffuse_color(&self) -> Color {
        self.albedo
    }
}

/// Diffuse-glossy surface with explicit Phong weights.
///
/// The path tracer sees it as Lambertian; only the Whitted shader uses the
/// specular lobe.
#[derive(Debug, Clone)]
pub struct Phong {
    color: Color,
    coefficients: PhongCoefficients,
}

impl Phong {
    pub fn new(color: Color, coefficients: PhongCoefficients) -> Self {
        Self {
            color,
            coefficients,
        }
    }
}

impl Material for Phong {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::DiffuseGlossy
    }

    fn brdf(&self, _w_out: Vec3, w_in: Vec3, normal: Vec3) -> Color {
        lambert_brdf(self.color, w_in, normal)
    }

    fn sample(&self, _w_out: Vec3, normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        uniform_hemisphere(normal, rng)
    }

    fn pdf(&self, _w_out: Vec3, w_in: Vec3, normal: Vec3) -> f32 {
        hemisphere_pdf(w_in, normal)
    }

    fn diffuse_color(&self) -> Color {
        self.color
    }

    fn phong(&self) -> PhongCoefficients {
        self.coefficients
    }
}

/// Perfect mirror. Reflectance follows the dielectric Fresnel term for `ior`.
///
/// A delta lobe has no finite BRDF, so the path tracer receives no energy
/// through it.
#[derive(Debug, Clone)]
pub struct Mirror {
    ior: f32,
}

impl Mirror {
    pub fn new(ior: f32) -> Self {
        Self { ior }
    }
}

impl Material for Mirror {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Reflective
    }

    fn brdf(&self, _w_out: Vec3, _w_in: Vec3, _normal: Vec3) -> Color {
        Color::ZERO
    }

    fn sample(&self, w_out: Vec3, normal: Vec3, _rng: &mut dyn RngCore) -> Vec3 {
        reflect(-w_out, normal)
    }

    fn pdf(&self, _w_out: Vec3, _w_in: Vec3, _normal: Vec3) -> f32 {
        0.0
    }

    fn refractive_index(&self) -> f32 {
        self.ior
    }
}

/// Clear dielectric that both reflects and refracts.
#[derive(Debug, Clone)]
pub struct Glass {
    ior: f32,
}

impl Glass {
    pub fn new(ior: f32) -> Self {
        Self { ior }
    }
}

impl Material for Glass {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::ReflectiveRefractive
    }

    fn brdf(&self, _w_out: Vec3, _w_in: Vec3, _normal: Vec3) -> Color {
        Color::ZERO
    }

    fn sample(&self, w_out: Vec3, normal: Vec3, _rng: &mut dyn RngCore) -> Vec3 {
        reflect(-w_out, normal)
    }

    fn pdf(&self, _w_out: Vec3, _w_in: Vec3, _normal: Vec3) -> f32 {
        0.0
    }

    fn refractive_index(&self) -> f32 {
        self.ior
    }
}

#[inline]
fn lambert_brdf(albedo: Color, w_in: Vec3, normal: Vec3) -> Color {
    if w_in.dot(normal) >= 0.0 {
        albedo / PI
    } else {
        Color::ZERO
    }
}

#[inline]
fn hemisphere_pdf(w_in: Vec3, normal: Vec3) -> f32 {
    if w_in.dot(normal) >= 0.0 {
        1.0 / (2.0 * PI)
    } else {
        0.0
    }
}

// =============================================================================
// Optics helpers
// =============================================================================

/// Reflect `incident` about `normal`.
#[inline]
pub fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * incident.dot(normal) * normal
}

/// Snell refraction of a unit `incident` direction through a surface with
/// outward `normal`, entering from air when `incident` opposes the normal.
///
/// Returns [`Vec3::ZERO`] on total internal reflection.
pub fn refract(incident: Vec3, normal: Vec3, ior: f32) -> Vec3 {
    let mut cos_i = incident.dot(normal).clamp(-1.0, 1.0);
    let (mut eta_i, mut eta_t) = (1.0, ior);
    let mut n = normal;
    if cos_i < 0.0 {
        cos_i = -cos_i;
    } else {
        std::mem::swap(&mut eta_i, &mut eta_t);
        n = -normal;
    }

    let eta = eta_i / eta_t;
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        Vec3::ZERO
    } else {
        eta * incident + (eta * cos_i - k.sqrt()) * n
    }
}

/// Fraction of light reflected at a dielectric boundary, averaged over both
/// polarizations. Total internal reflection yields 1.
pub fn fresnel_reflectance(incident: Vec3, normal: Vec3, ior: f32) -> f32 {
    let cos_i = incident.dot(normal).clamp(-1.0, 1.0);
    let (mut eta_i, mut eta_t) = (1.0, ior);
    if cos_i > 0.0 {
        std::mem::swap(&mut eta_i, &mut eta_t);
    }

    let sin_t = eta_i / eta_t * (1.0 - cos_i * cos_i).max(0.0).sqrt();
    if sin_t >= 1.0 {
        return 1.0;
    }

    let cos_t = (1.0 - sin_t * sin_t).max(0.0).sqrt();
    let cos_i = cos_i.abs();
    let rs = (eta_t * cos_i - eta_i * cos_t) / (eta_t * cos_i + eta_i * cos_t);
    let rp = (eta_i * cos_i - eta_t * cos_t) / (eta_i * cos_i + eta_t * cos_t);
    (rs * rs + rp * rp) / 2.0
}
