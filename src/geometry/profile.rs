use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};
use crate::math::TOLERANCE;
use crate::tessellation::MeshParams;

use super::TankParameters;

/// Simpson sub-intervals per profile segment (must be even).
const SIMPSON_STEPS: usize = 8;

/// A point on a meridian, in the `(z, r)` half-plane of the tank axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfilePoint {
    /// Axial position.
    pub z: f64,
    /// Distance from the axis.
    pub r: f64,
    /// Local geodesic winding angle in radians, from `r · sin(alpha) = r0`.
    pub alpha: f64,
}

impl ProfilePoint {
    #[must_use]
    pub fn new(z: f64, r: f64, alpha: f64) -> Self {
        Self { z, r, alpha }
    }
}

/// Generates the isotensoid dome meridian of the upper dome, apex first.
///
/// The shape comes from netting theory for geodesically wound fibers: the
/// meridian slope satisfies `cos β = ρ · sqrt(ρ² − ρ0²) / sqrt(1 − ρ0²)` with
/// `ρ = r / R`, `ρ0 = r0 / R` and `β` the angle between meridian and axis. The
/// dome is flat at the polar opening and tangent to the cylinder at the equator.
/// Its natural height is then scaled axially to `dome_height`.
///
/// The returned points run from the apex (`z = L/2 + dome_height`, `r = r0`) to the
/// equator (`z = L/2`, `r = R`): `z` never increases and `r` never decreases.
pub struct GenerateProfile<'a> {
    params: &'a TankParameters,
    points: usize,
}

impl<'a> GenerateProfile<'a> {
    /// Creates a new `GenerateProfile` operation.
    #[must_use]
    pub fn new(params: &'a TankParameters, mesh_params: &MeshParams) -> Self {
        Self {
            params,
            points: mesh_params.dome_points(),
        }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] if the tank parameters are invalid.
    pub fn execute(&self) -> Result<Vec<ProfilePoint>> {
        self.params.validate()?;
        Ok(isotensoid_profile(self.params, self.points))
    }
}

/// Height of the unscaled isotensoid dome for a cylinder of `radius` and a
/// polar opening of `polar_opening`.
///
/// # Errors
///
/// Returns an error if `radius` is not positive or the opening is outside `[0, radius)`.
pub fn natural_dome_height(radius: f64, polar_opening: f64) -> Result<f64> {
    if !(radius.is_finite() && radius > TOLERANCE) {
        return Err(GeometryError::ParameterOutOfRange {
            parameter: "radius",
            value: radius,
            min: TOLERANCE,
            max: f64::MAX,
        }
        .into());
    }
    if !(polar_opening.is_finite() && (0.0..radius).contains(&polar_opening)) {
        return Err(GeometryError::ParameterOutOfRange {
            parameter: "polar_opening",
            value: polar_opening,
            min: 0.0,
            max: radius,
        }
        .into());
    }
    let rho0 = polar_opening / radius;
    Ok(radius * integrate(rho0, 0.0, 1.0))
}

/// Builds the profile for already validated parameters.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn isotensoid_profile(params: &TankParameters, points: usize) -> Vec<ProfilePoint> {
    let n = points.max(2);
    let radius = params.outer_radius;
    let r0 = params.polar_opening_radius();
    let rho0 = (r0 / radius).clamp(0.0, 1.0);
    let base_z = params.cylinder_length * 0.5;

    let ts: Vec<f64> = (0..n).map(|i| i as f64 / (n - 1) as f64).collect();

    // Normalized height above the equator at each t, accumulated from the base.
    let mut heights = vec![0.0; n];
    for i in (0..n - 1).rev() {
        heights[i] = heights[i + 1] + integrate(rho0, ts[i], ts[i + 1]);
    }
    let natural = heights[0];

    let profile: Vec<ProfilePoint> = ts
        .iter()
        .zip(&heights)
        .map(|(&t, &h)| {
            let r = radius * rho_at(rho0, t);
            let scaled = if natural > TOLERANCE {
                h / natural
            } else {
                // Polar opening at the equator: no natural height to scale.
                1.0 - t
            };
            let alpha = if r0 < TOLERANCE {
                0.0
            } else {
                (r0 / r).min(1.0).asin()
            };
            ProfilePoint::new(base_z + params.dome_height * scaled, r, alpha)
        })
        .collect();

    tracing::trace!(
        points = profile.len(),
        polar_opening = r0,
        natural_height = natural * radius,
        "isotensoid profile"
    );
    profile
}

/// Shifts every point `dr` away from the axis, clamping at `min_r`.
#[must_use]
pub fn offset_profile(profile: &[ProfilePoint], dr: f64, min_r: f64) -> Vec<ProfilePoint> {
    profile
        .iter()
        .map(|p| ProfilePoint::new(p.z, (p.r + dr).max(min_r), p.alpha))
        .collect()
}

/// Mirrors a meridian through `z = 0`, reversing the point order so the
/// traversal keeps the surface outside on the same side.
#[must_use]
pub fn mirror_profile(profile: &[ProfilePoint]) -> Vec<ProfilePoint> {
    profile
        .iter()
        .rev()
        .map(|p| ProfilePoint::new(-p.z, p.r, p.alpha))
        .collect()
}

/// `ρ(t) = 1 − (1 − ρ0)(1 − t)²`. The quadratic spacing clusters points near the
/// equator where the meridian turns axial.
fn rho_at(rho0: f64, t: f64) -> f64 {
    let s = 1.0 - t;
    1.0 - (1.0 - rho0) * s * s
}

/// `dz/dt` in units of `R`. Substituting `ρ(t)` cancels the square-root
/// singularity of `dz/dρ` at the equator, so the integrand is finite on `[0, 1]`.
fn dz_dt(rho0: f64, t: f64) -> f64 {
    let rho = rho_at(rho0, t);
    let rho_sq = rho * rho;
    let rho0_sq = rho0 * rho0;
    let num = 2.0 * rho * (rho_sq - rho0_sq).max(0.0).sqrt() * (1.0 - rho0).max(0.0).sqrt();
    let den = ((1.0 + rho) * (1.0 + rho_sq - rho0_sq)).sqrt();
    num / den
}

/// Simpson's rule for `∫ dz/dt` over `[a, b]`.
#[allow(clippy::cast_precision_loss)]
fn integrate(rho0: f64, a: f64, b: f64) -> f64 {
    let h = (b - a) / SIMPSON_STEPS as f64;
    let mut sum = dz_dt(rho0, a) + dz_dt(rho0, b);
    for k in 1..SIMPSON_STEPS {
        let weight = if k % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * dz_dt(rho0, a + h * k as f64);
    }
    sum * h / 3.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::params::tests::sample_params;

    fn profile_for(params: &TankParameters) -> Vec<ProfilePoint> {
        GenerateProfile::new(params, &MeshParams::default())
            .execute()
            .unwrap()
    }

    fn assert_monotonic(profile: &[ProfilePoint]) {
        for w in profile.windows(2) {
            assert!(w[1].z <= w[0].z, "z increased: {:?} -> {:?}", w[0], w[1]);
            assert!(w[1].r >= w[0].r, "r decreased: {:?} -> {:?}", w[0], w[1]);
        }
    }

    fn assert_finite(profile: &[ProfilePoint]) {
        for p in profile {
            assert!(p.z.is_finite() && p.r.is_finite() && p.alpha.is_finite(), "{p:?}");
        }
    }

    #[test]
    fn profile_runs_apex_to_equator() {
        let params = sample_params();
        let profile = profile_for(&params);
        assert_eq!(profile.len(), MeshParams::default().dome_points());

        let apex = profile[0];
        let base = profile[profile.len() - 1];
        assert!((apex.z - (300.0 + 90.0)).abs() < 1e-9);
        assert!((apex.r - params.polar_opening_radius()).abs() < 1e-9);
        assert!((base.z - 300.0).abs() < 1e-9);
        assert!((base.r - 150.0).abs() < 1e-9);
    }

    #[test]
    fn profile_is_strictly_monotonic_in_z() {
        let profile = profile_for(&sample_params());
        assert_monotonic(&profile);
        for w in profile.windows(2) {
            assert!(w[1].z < w[0].z);
        }
    }

    #[test]
    fn clairaut_relation_holds() {
        let params = sample_params();
        let r0 = params.polar_opening_radius();
        for p in profile_for(&params) {
            assert!((p.r * p.alpha.sin() - r0).abs() < 1e-9, "{p:?}");
        }
    }

    #[test]
    fn equator_is_tangent_to_cylinder() {
        // The last segment is much steeper than the first.
        let profile = profile_for(&sample_params());
        let n = profile.len();
        let first = (profile[0].z - profile[1].z) / (profile[1].r - profile[0].r);
        let last = (profile[n - 2].z - profile[n - 1].z) / (profile[n - 1].r - profile[n - 2].r);
        assert!(last > 10.0 * first, "first slope {first}, last slope {last}");
    }

    #[test]
    fn zero_dome_height_gives_flat_cap() {
        let mut params = sample_params();
        params.dome_height = 0.0;
        let profile = profile_for(&params);

        assert!(!profile.is_empty());
        assert_finite(&profile);
        assert_monotonic(&profile);
        for p in &profile {
            assert!((p.z - 300.0).abs() < TOLERANCE);
        }
    }

    #[test]
    fn extreme_winding_angle_stays_finite() {
        for angle in [0.0, 0.001, 60.0, 85.0, 89.9, 89.999] {
            let mut params = sample_params();
            params.winding_angle = angle;
            let profile = profile_for(&params);
            assert_finite(&profile);
            assert_monotonic(&profile);
        }
    }

    #[test]
    fn closed_apex_without_boss() {
        let mut params = sample_params();
        params.boss.inner_diameter = 0.0;
        params.boss.outer_diameter = 0.0;
        params.winding_angle = 0.0;
        let profile = profile_for(&params);
        assert!(profile[0].r.abs() < TOLERANCE);
        assert_finite(&profile);
        assert_monotonic(&profile);
    }

    #[test]
    fn single_point_resolution_is_clamped() {
        let params = sample_params();
        let mesh_params = MeshParams {
            dome_points: 1,
            ..MeshParams::default()
        };
        let profile = GenerateProfile::new(&params, &mesh_params).execute().unwrap();
        assert_eq!(profile.len(), 2);
        assert_finite(&profile);
    }

    #[test]
    fn invalid_params_fail_fast() {
        let mut params = sample_params();
        params.outer_radius = -1.0;
        assert!(GenerateProfile::new(&params, &MeshParams::default())
            .execute()
            .is_err());
    }

    #[test]
    fn profile_is_deterministic() {
        let params = sample_params();
        assert_eq!(profile_for(&params), profile_for(&params));
    }

    #[test]
    fn natural_height_without_opening() {
        // ∫₀¹ ρ² / sqrt(1 − ρ⁴) dρ ≈ 0.59907
        let h = natural_dome_height(1.0, 0.0).unwrap();
        assert!((h - 0.599_07).abs() < 1e-3, "h = {h}");
    }

    #[test]
    fn natural_height_shrinks_with_opening() {
        let closed = natural_dome_height(100.0, 0.0).unwrap();
        let open = natural_dome_height(100.0, 50.0).unwrap();
        let wide = natural_dome_height(100.0, 95.0).unwrap();
        assert!(closed > open && open > wide && wide > 0.0);
    }

    #[test]
    fn natural_height_rejects_bad_input() {
        assert!(natural_dome_height(0.0, 0.0).is_err());
        assert!(natural_dome_height(10.0, 10.0).is_err());
        assert!(natural_dome_height(10.0, -1.0).is_err());
    }

    #[test]
    fn offset_and_mirror() {
        let profile = profile_for(&sample_params());
        let shifted = offset_profile(&profile, 2.0, 0.0);
        for (a, b) in profile.iter().zip(&shifted) {
            assert!((b.r - a.r - 2.0).abs() < TOLERANCE);
            assert!((b.z - a.z).abs() < TOLERANCE);
        }

        let clamped = offset_profile(&profile, -1000.0, 10.0);
        assert!(clamped.iter().all(|p| (p.r - 10.0).abs() < TOLERANCE));

        let mirrored = mirror_profile(&profile);
        assert!((mirrored[0].z + profile[profile.len() - 1].z).abs() < TOLERANCE);
        assert!((mirrored[mirrored.len() - 1].r - profile[0].r).abs() < TOLERANCE);
    }
}
