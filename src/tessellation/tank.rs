use crate::error::Result;
use crate::geometry::profile::isotensoid_profile;
use crate::geometry::{mirror_profile, offset_profile, LayerKind, ProfilePoint, TankParameters};
use crate::math::TOLERANCE;

use super::{split_at_creases, MeshParams, Mesh, Revolve};

/// Identifies one surface of a [`LayeredMesh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceId {
    InnerShell,
    OuterShell,
    Bosses,
    /// Composite layer by deposition index, innermost first.
    Layer(usize),
}

/// The outer surface of one composite layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerMesh {
    /// Deposition index, innermost first.
    pub index: usize,
    pub kind: LayerKind,
    /// Fiber angle in degrees.
    pub winding_angle: f64,
    /// Radial offset of the layer's inner surface from the liner outer wall.
    pub inner_offset: f64,
    /// Radial offset of the layer's outer surface (the meshed one) from the liner outer wall.
    pub radial_offset: f64,
    pub mesh: Mesh,
}

/// Every surface of a tank, generated together from one parameter set.
///
/// All layer meshes share the vertex layout of the outer shell: vertex `i`
/// sits at the same `z` and angle in each, only farther from the axis.
#[derive(Debug, Clone, PartialEq)]
pub struct LayeredMesh {
    profile: Vec<ProfilePoint>,
    inner_shell: Mesh,
    outer_shell: Mesh,
    bosses: Mesh,
    layers: Vec<LayerMesh>,
}

impl LayeredMesh {
    /// Base isotensoid dome profile at the liner outer wall, apex first.
    #[must_use]
    pub fn profile(&self) -> &[ProfilePoint] {
        &self.profile
    }

    /// Liner inner wall.
    #[must_use]
    pub fn inner_shell(&self) -> &Mesh {
        &self.inner_shell
    }

    /// Liner outer wall.
    #[must_use]
    pub fn outer_shell(&self) -> &Mesh {
        &self.outer_shell
    }

    /// Both polar bosses, including the shoulder out to the polar opening.
    #[must_use]
    pub fn bosses(&self) -> &Mesh {
        &self.bosses
    }

    /// Composite layers in deposition order.
    #[must_use]
    pub fn layers(&self) -> &[LayerMesh] {
        &self.layers
    }

    #[must_use]
    pub fn surface(&self, id: SurfaceId) -> Option<&Mesh> {
        match id {
            SurfaceId::InnerShell => Some(&self.inner_shell),
            SurfaceId::OuterShell => Some(&self.outer_shell),
            SurfaceId::Bosses => Some(&self.bosses),
            SurfaceId::Layer(i) => self.layers.get(i).map(|l| &l.mesh),
        }
    }

    /// Every surface, liner first, then bosses, then layers innermost first.
    pub fn surfaces(&self) -> impl Iterator<Item = (SurfaceId, &Mesh)> {
        [
            (SurfaceId::InnerShell, &self.inner_shell),
            (SurfaceId::OuterShell, &self.outer_shell),
            (SurfaceId::Bosses, &self.bosses),
        ]
        .into_iter()
        .chain(
            self.layers
                .iter()
                .map(|l| (SurfaceId::Layer(l.index), &l.mesh)),
        )
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.surfaces().map(|(_, m)| m.vertex_count()).sum()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.surfaces().map(|(_, m)| m.triangle_count()).sum()
    }
}

/// Generates the liner, boss and composite layer meshes of a tank.
///
/// The liner outer wall is the isotensoid profile revolved together with the
/// cylinder and the mirrored lower dome. The liner inner wall is the same
/// meridian moved inward by the wall thickness, clamped at the boss bore.
/// Layer `k` is the meridian moved outward by the summed thickness of layers
/// `0..=k`, so layer radii strictly increase in deposition order.
pub struct GenerateTankMesh<'a> {
    params: &'a TankParameters,
    mesh_params: MeshParams,
}

impl<'a> GenerateTankMesh<'a> {
    /// Creates a new `GenerateTankMesh` operation.
    #[must_use]
    pub fn new(params: &'a TankParameters, mesh_params: MeshParams) -> Self {
        Self {
            params,
            mesh_params,
        }
    }

    /// Executes the generation. The result is a pure function of the inputs.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`](crate::error::GeometryError) if the tank
    /// parameters are invalid; no mesh work is done in that case.
    pub fn execute(&self) -> Result<LayeredMesh> {
        let params = self.params;
        params.validate()?;

        let segments = self.mesh_params.angular_segments();
        let profile = isotensoid_profile(params, self.mesh_params.dome_points());

        let shell = |dr: f64, min_r: f64| -> Result<Mesh> {
            let sections = split_at_creases(&self.shell_meridian(&profile, dr, min_r));
            Revolve::new(&sections, segments).execute()
        };

        let outer_shell = shell(0.0, 0.0)?;
        let inner_shell = shell(-params.wall_thickness(), params.boss.inner_radius())?;
        let bosses = Revolve::new(&self.boss_sections(), segments).execute()?;

        let mut layers = Vec::with_capacity(params.layers.len());
        let mut inner_offset = 0.0;
        for (index, layer) in params.layers.iter().enumerate() {
            let radial_offset = inner_offset + layer.thickness;
            let mesh = shell(radial_offset, 0.0)?;
            tracing::trace!(
                index,
                kind = ?layer.kind,
                radial_offset,
                vertices = mesh.vertex_count(),
                "generated layer"
            );
            layers.push(LayerMesh {
                index,
                kind: layer.kind,
                winding_angle: layer.winding_angle,
                inner_offset,
                radial_offset,
                mesh,
            });
            inner_offset = radial_offset;
        }

        let tank = LayeredMesh {
            profile,
            inner_shell,
            outer_shell,
            bosses,
            layers,
        };
        tracing::debug!(
            segments,
            layers = tank.layers.len(),
            vertices = tank.vertex_count(),
            triangles = tank.triangle_count(),
            "generated tank mesh"
        );
        Ok(tank)
    }

    /// Full meridian of one shell, upper apex to lower apex.
    #[allow(clippy::cast_precision_loss)]
    fn shell_meridian(&self, profile: &[ProfilePoint], dr: f64, min_r: f64) -> Vec<ProfilePoint> {
        let params = self.params;
        let top = offset_profile(profile, dr, min_r);
        let bottom = mirror_profile(&top);

        let mut meridian = top.clone();
        if let Some(equator) = top.last() {
            let half = params.cylinder_length * 0.5;
            let rings = self.mesh_params.cylinder_rings();
            if params.cylinder_length > TOLERANCE {
                for k in 1..rings {
                    let z = half - params.cylinder_length * k as f64 / rings as f64;
                    meridian.push(ProfilePoint::new(z, equator.r, equator.alpha));
                }
            }
        }
        meridian.extend(bottom);
        meridian
    }

    /// Meridian sections of both bosses: bore, top face, neck, shoulder.
    fn boss_sections(&self) -> Vec<Vec<ProfilePoint>> {
        let params = self.params;
        let z_apex = params.cylinder_length * 0.5 + params.dome_height;
        let z_top = z_apex + params.boss.length;
        let r_bore = params.boss.inner_radius();
        let r_neck = params.boss.outer_radius();
        let r_opening = params.polar_opening_radius();

        let top = [
            ProfilePoint::new(z_apex, r_bore, 0.0),
            ProfilePoint::new(z_top, r_bore, 0.0),
            ProfilePoint::new(z_top, r_neck, 0.0),
            ProfilePoint::new(z_apex, r_neck, 0.0),
            ProfilePoint::new(z_apex, r_opening, 0.0),
        ];
        let bottom = mirror_profile(&top);

        split_at_creases(&top)
            .into_iter()
            .chain(split_at_creases(&bottom))
            .filter(|s| s.len() >= 2 && s.iter().any(|p| p.r > TOLERANCE))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::params::tests::sample_params;
    use crate::math::Point3;

    fn generate(params: &TankParameters) -> LayeredMesh {
        GenerateTankMesh::new(params, MeshParams::default())
            .execute()
            .unwrap()
    }

    fn radius(p: &Point3) -> f64 {
        p.x.hypot(p.y)
    }

    #[test]
    fn every_surface_is_valid() {
        let tank = generate(&sample_params());
        for (id, mesh) in tank.surfaces() {
            assert!(!mesh.is_empty(), "{id:?} is empty");
            mesh.validate().unwrap();
            for n in mesh.normals() {
                assert!((n.norm() - 1.0).abs() < 1e-9, "{id:?} normal {n:?}");
            }
        }
    }

    #[test]
    fn surfaces_are_listed_in_order() {
        let tank = generate(&sample_params());
        let ids: Vec<SurfaceId> = tank.surfaces().map(|(id, _)| id).collect();
        assert_eq!(
            ids,
            vec![
                SurfaceId::InnerShell,
                SurfaceId::OuterShell,
                SurfaceId::Bosses,
                SurfaceId::Layer(0),
                SurfaceId::Layer(1),
                SurfaceId::Layer(2),
            ]
        );
        assert!(tank.surface(SurfaceId::Layer(3)).is_none());
    }

    #[test]
    fn outer_shell_spans_tank_length() {
        let params = sample_params();
        let tank = generate(&params);
        let aabb = tank.outer_shell().aabb().unwrap();
        let half = params.cylinder_length * 0.5 + params.dome_height;
        assert!((aabb.max.z - half).abs() < 1e-9);
        assert!((aabb.min.z + half).abs() < 1e-9);
        assert!((aabb.max.x - params.outer_radius).abs() < 1e-9);
    }

    #[test]
    fn bosses_protrude_beyond_domes() {
        let params = sample_params();
        let tank = generate(&params);
        let aabb = tank.bosses().aabb().unwrap();
        let top = params.cylinder_length * 0.5 + params.dome_height + params.boss.length;
        assert!((aabb.max.z - top).abs() < 1e-9);
        assert!((aabb.min.z + top).abs() < 1e-9);
        assert!((aabb.max.x - params.polar_opening_radius()).abs() < 1e-9);
    }

    #[test]
    fn inner_shell_stays_inside_outer_shell() {
        let params = sample_params();
        let tank = generate(&params);
        let inner = tank.inner_shell();
        let outer = tank.outer_shell();
        assert_eq!(inner.vertex_count(), outer.vertex_count());
        for (a, b) in inner.positions().iter().zip(outer.positions()) {
            assert!(radius(a) <= radius(b) + 1e-9);
            assert!(radius(a) >= params.boss.inner_radius() - 1e-9);
        }
    }

    #[test]
    fn layer_radii_strictly_increase() {
        let tank = generate(&sample_params());
        let mut previous = tank.outer_shell();
        for layer in tank.layers() {
            assert_eq!(layer.mesh.vertex_count(), previous.vertex_count());
            for (a, b) in previous.positions().iter().zip(layer.mesh.positions()) {
                assert!((a.z - b.z).abs() < 1e-9);
                assert!(radius(b) > radius(a));
            }
            previous = &layer.mesh;
        }
    }

    #[test]
    fn layer_offsets_accumulate() {
        let tank = generate(&sample_params());
        let offsets: Vec<(f64, f64)> = tank
            .layers()
            .iter()
            .map(|l| (l.inner_offset, l.radial_offset))
            .collect();
        assert_eq!(offsets, vec![(0.0, 2.0), (2.0, 5.0), (5.0, 6.5)]);
        assert_eq!(tank.layers()[1].kind, LayerKind::Helical);
    }

    #[test]
    fn generation_is_deterministic() {
        let params = sample_params();
        assert_eq!(generate(&params), generate(&params));
    }

    #[test]
    fn zero_dome_height_produces_flat_caps() {
        let mut params = sample_params();
        params.dome_height = 0.0;
        let tank = generate(&params);
        for (_, mesh) in tank.surfaces() {
            mesh.validate().unwrap();
        }
        let aabb = tank.outer_shell().aabb().unwrap();
        assert!((aabb.max.z - 300.0).abs() < 1e-9);
        // Cap normals point straight along the axis.
        let top_cap_normals = tank
            .outer_shell()
            .positions()
            .iter()
            .zip(tank.outer_shell().normals())
            .filter(|(p, _)| (p.z - 300.0).abs() < 1e-9 && radius(p) < 100.0);
        for (_, n) in top_cap_normals {
            assert!((n - crate::math::Vector3::z()).norm() < 1e-9, "{n:?}");
        }
    }

    #[test]
    fn zero_cylinder_length_joins_domes() {
        let mut params = sample_params();
        params.cylinder_length = 0.0;
        let tank = generate(&params);
        for (_, mesh) in tank.surfaces() {
            mesh.validate().unwrap();
        }
    }

    #[test]
    fn tank_without_boss_is_closed_at_apex() {
        let mut params = sample_params();
        params.boss = crate::geometry::BossParameters {
            inner_diameter: 0.0,
            outer_diameter: 0.0,
            length: 0.0,
        };
        params.winding_angle = 0.0;
        let tank = generate(&params);
        tank.outer_shell().validate().unwrap();
        assert!(tank.bosses().is_empty());
    }

    #[test]
    fn resolution_controls_vertex_count() {
        let params = sample_params();
        let coarse = GenerateTankMesh::new(
            &params,
            MeshParams {
                angular_segments: 8,
                dome_points: 4,
                cylinder_rings: 1,
            },
        )
        .execute()
        .unwrap();
        // 4 dome points on each dome plus no intermediate cylinder rings.
        assert_eq!(coarse.outer_shell().vertex_count(), 8 * 8);
    }

    #[test]
    fn invalid_params_fail_before_meshing() {
        let mut params = sample_params();
        params.boss.outer_diameter = 400.0;
        assert!(GenerateTankMesh::new(&params, MeshParams::default())
            .execute()
            .is_err());
    }
}
