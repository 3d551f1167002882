//! Tank report: generates a reference vessel, colours it from a synthetic FEA
//! field and picks it through a camera.
//!
//! Usage:
//! ```text
//! cargo run --example tank_report                       # default colormap (jet)
//! cargo run --example tank_report -- viridis            # any built-in colormap
//! RUST_LOG=tankmesh=debug cargo run --example tank_report
//! ```

use tankmesh::coloring::{ApplyStressColors, ColorOptions, FeaNode, StressField};
use tankmesh::geometry::{BossParameters, CompositeLayer, LayerKind, TankParameters};
use tankmesh::math::{Matrix4, Point3, Vector3};
use tankmesh::picking::{pick_layered, screen_to_ray, MeshPicker, Viewport};
use tankmesh::tessellation::{GenerateTankMesh, MeshParams};

fn reference_tank() -> TankParameters {
    TankParameters {
        inner_radius: 145.0,
        outer_radius: 150.0,
        cylinder_length: 600.0,
        dome_height: 90.0,
        boss: BossParameters {
            inner_diameter: 20.0,
            outer_diameter: 50.0,
            length: 30.0,
        },
        winding_angle: 15.0,
        layers: vec![
            CompositeLayer {
                kind: LayerKind::Hoop,
                thickness: 2.0,
                winding_angle: 89.0,
            },
            CompositeLayer {
                kind: LayerKind::Helical,
                thickness: 3.0,
                winding_angle: 15.0,
            },
            CompositeLayer {
                kind: LayerKind::Hoop,
                thickness: 1.5,
                winding_angle: 88.0,
            },
        ],
    }
}

/// Hoop stress peaks mid-cylinder and relaxes toward the domes.
fn synthetic_field(params: &TankParameters) -> StressField {
    let half = params.cylinder_length * 0.5 + params.dome_height;
    let nodes = (0..12)
        .flat_map(|i| (0..16).map(move |j| (i, j)))
        .map(|(i, j)| {
            let z = -half + 2.0 * half * f64::from(i) / 11.0;
            let theta = std::f64::consts::TAU * f64::from(j) / 16.0;
            let r = params.outer_radius;
            let axial = 1.0 - (z / half).powi(2);
            FeaNode {
                position: Point3::new(r * theta.cos(), r * theta.sin(), z),
                stress: 180.0 + 520.0 * axial,
            }
        })
        .collect();
    StressField::Nodal(nodes)
}

fn main() -> tankmesh::Result<()> {
    // Default: WARN for everything, INFO for tankmesh.
    // Override with RUST_LOG env var (e.g. RUST_LOG=tankmesh=trace).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("tankmesh=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let colormap = std::env::args().nth(1).unwrap_or_else(|| "jet".to_owned());

    let params = reference_tank();
    let tank = GenerateTankMesh::new(&params, MeshParams::default()).execute()?;
    println!(
        "tank: {} surfaces, {} vertices, {} triangles",
        tank.surfaces().count(),
        tank.vertex_count(),
        tank.triangle_count()
    );
    for layer in tank.layers() {
        println!(
            "  layer {} ({:?} @ {}°): offset {:.2}..{:.2} mm",
            layer.index, layer.kind, layer.winding_angle, layer.inner_offset, layer.radial_offset
        );
    }

    let outer = tank
        .layers()
        .last()
        .map_or(tank.outer_shell(), |layer| &layer.mesh);
    let colored = ApplyStressColors::new(&synthetic_field(&params), &colormap, ColorOptions::default())
        .execute(outer)?;
    let range = colored.range();
    println!(
        "colours: {} ({} channels), stress {:.1}..{:.1} MPa",
        colored.colormap(),
        colored.channels(),
        range.min,
        range.max
    );

    let viewport = Viewport::new(1280.0, 720.0);
    let view = Matrix4::look_at_rh(
        &Point3::new(1200.0, 0.0, 0.0),
        &Point3::origin(),
        &Vector3::z(),
    );
    let projection =
        Matrix4::new_perspective(viewport.aspect(), std::f64::consts::FRAC_PI_4, 1.0, 5000.0);

    let picker = MeshPicker::new(colored.mesh());
    for (x, y) in [(640.0, 360.0), (700.0, 200.0), (5.0, 5.0)] {
        let ray = screen_to_ray(x, y, &viewport, &view, &projection)?;
        match pick_layered(&ray, &tank) {
            Some(found) => println!(
                "pixel ({x}, {y}): {:?} at {:.1} mm, triangle {}",
                found.surface, found.hit.distance, found.hit.triangle
            ),
            None => println!("pixel ({x}, {y}): miss"),
        }
        if let Some(hit) = picker.pick(&ray) {
            if let Some(stress) = colored.stress_at(&hit) {
                println!("  outer surface stress {stress:.1} MPa");
            }
        }
    }
    Ok(())
}
