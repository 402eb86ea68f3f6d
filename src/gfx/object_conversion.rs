use std::sync::LazyLock;

use glam::DVec3;
use three_d::{
    Blend, ColorMaterial, CpuMaterial, CpuMesh, Cull, Gm, InstancedMesh, Instances, Mat4, Mesh,
    Object, PhysicalMaterial, RenderStates, Srgba, Vec4,
};

use super::{ATTRACTOR_DISPLAY_RADIUS, Body, Program, Simulation};

const SPHERE_SUBDIVS: u32 = 16;
const TRAIL_SUBDIVS: u32 = 6;

/// Thickness of a trail segment.
const TRAIL_RADIUS: f64 = 0.04;

const ATTRACTOR_COLOR: Srgba = Srgba::new_opaque(255, 165, 0);
const BODY_COLOR: Srgba = Srgba::new_opaque(0, 0, 255);
/// Red at 20% opacity.
const TRAIL_COLOR: Srgba = Srgba::new(255, 0, 0, 51);

static SPHERE_MESH: LazyLock<CpuMesh> = LazyLock::new(|| CpuMesh::sphere(SPHERE_SUBDIVS));
static SEGMENT_MESH: LazyLock<CpuMesh> = LazyLock::new(|| CpuMesh::cylinder(TRAIL_SUBDIVS));

pub(crate) struct Scene {
    attractor: Gm<Mesh, PhysicalMaterial>,
    bodies: Option<Gm<InstancedMesh, PhysicalMaterial>>,
    trails: Option<Gm<InstancedMesh, ColorMaterial>>,
}

impl Scene {
    pub(crate) fn objects(&self) -> impl Iterator<Item = &dyn Object> {
        (&self.attractor)
            .into_iter()
            .chain(self.bodies.iter().flatten())
            .chain(self.trails.iter().flatten())
    }
}

fn to_vec4(v: DVec3, w: f32) -> Vec4 {
    Vec4::new(v.x as f32, v.y as f32, v.z as f32, w)
}

fn get_sphere_matrix(position: DVec3, radius: f64) -> Mat4 {
    Mat4 {
        x: to_vec4(DVec3::X * radius, 0.0),
        y: to_vec4(DVec3::Y * radius, 0.0),
        z: to_vec4(DVec3::Z * radius, 0.0),
        w: to_vec4(position, 1.0),
    }
}

/// Maps the unit cylinder along +X onto the segment `from -> to`.
///
/// Returns `None` for degenerate segments.
fn get_segment_matrix(from: DVec3, to: DVec3) -> Option<Mat4> {
    let along = to - from;
    let dir = along.try_normalize()?;
    let (side, up) = dir.any_orthonormal_pair();
    Some(Mat4 {
        x: to_vec4(along, 0.0),
        y: to_vec4(side * TRAIL_RADIUS, 0.0),
        z: to_vec4(up * TRAIL_RADIUS, 0.0),
        w: to_vec4(from, 1.0),
    })
}

fn add_trail_instances(body: &Body, transformations: &mut Vec<Mat4>) {
    if !body.shows_trail() {
        return;
    }
    let trail = body.trail();
    transformations.extend(
        trail
            .iter()
            .zip(trail.iter().skip(1))
            .filter_map(|(&from, &to)| get_segment_matrix(from, to)),
    );
}

fn body_instances(simulation: &Simulation) -> Instances {
    Instances {
        transformations: simulation
            .bodies()
            .map(|body| get_sphere_matrix(body.position(), body.radius()))
            .collect(),
        colors: None,
        texture_transformations: None,
    }
}

fn trail_instances(simulation: &Simulation) -> Instances {
    let mut transformations = Vec::new();
    for body in simulation.bodies() {
        add_trail_instances(body, &mut transformations);
    }
    Instances {
        transformations,
        colors: None,
        texture_transformations: None,
    }
}

impl Program {
    pub(crate) fn to_objects(&self) -> Scene {
        let simulation = &self.sim_state.simulation;
        Scene {
            attractor: self.generate_attractor_gm(simulation.center()),
            bodies: self.generate_body_gm(simulation),
            trails: self.generate_trail_gm(simulation),
        }
    }

    fn generate_attractor_gm(&self, center: DVec3) -> Gm<Mesh, PhysicalMaterial> {
        let mut mesh = Mesh::new(&self.context, &SPHERE_MESH);
        mesh.set_transformation(get_sphere_matrix(center, ATTRACTOR_DISPLAY_RADIUS));

        let material = PhysicalMaterial::new_opaque(
            &self.context,
            &CpuMaterial {
                albedo: ATTRACTOR_COLOR,
                emissive: ATTRACTOR_COLOR,
                ..Default::default()
            },
        );

        Gm::new(mesh, material)
    }

    fn generate_body_gm(
        &self,
        simulation: &Simulation,
    ) -> Option<Gm<InstancedMesh, PhysicalMaterial>> {
        if simulation.is_empty() {
            return None;
        }

        let mut material = PhysicalMaterial::new_opaque(
            &self.context,
            &CpuMaterial {
                albedo: BODY_COLOR,
                ..Default::default()
            },
        );
        material.render_states = RenderStates {
            cull: Cull::Back,
            ..Default::default()
        };

        Some(Gm::new(
            InstancedMesh::new(&self.context, &body_instances(simulation), &SPHERE_MESH),
            material,
        ))
    }

    fn generate_trail_gm(&self, simulation: &Simulation) -> Option<Gm<InstancedMesh, ColorMaterial>> {
        let instances = trail_instances(simulation);
        if instances.transformations.is_empty() {
            return None;
        }

        let material = ColorMaterial {
            color: TRAIL_COLOR,
            texture: None,
            render_states: RenderStates {
                cull: Cull::Back,
                blend: Blend::TRANSPARENCY,
                ..Default::default()
            },
            is_transparent: true,
        };

        Some(Gm::new(
            InstancedMesh::new(&self.context, &instances, &SEGMENT_MESH),
            material,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(m: Mat4, x: f32, y: f32, z: f32) -> [f32; 3] {
        let v = m * Vec4::new(x, y, z, 1.0);
        [v.x, v.y, v.z]
    }

    #[test]
    fn test_segment_matrix_maps_unit_axis_onto_segment() {
        let from = DVec3::new(1.0, 2.0, 3.0);
        let to = DVec3::new(1.0, 2.0, 7.0);
        let m = get_segment_matrix(from, to).unwrap();

        assert_eq!(apply(m, 0.0, 0.0, 0.0), [1.0, 2.0, 3.0]);
        assert_eq!(apply(m, 1.0, 0.0, 0.0), [1.0, 2.0, 7.0]);
    }

    #[test]
    fn test_degenerate_segment_is_skipped() {
        let p = DVec3::splat(4.0);
        assert!(get_segment_matrix(p, p).is_none());
    }

    #[test]
    fn test_sphere_matrix_scales_by_radius() {
        let m = get_sphere_matrix(DVec3::new(0.0, 10.0, 0.0), 0.5);
        assert_eq!(apply(m, 1.0, 0.0, 0.0), [0.5, 10.0, 0.0]);
    }
}
