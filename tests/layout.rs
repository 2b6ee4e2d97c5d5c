use std::mem::{offset_of, size_of};

use sphere_tracer_lib::{
    camera::FOV_Y_DEGREES,
    cpu,
    shader_types::{Sphere, Uniforms},
    util::math::half_fov_tan,
};

const RAY_TRACING_WGSL: &str = include_str!("../src/asset/shader/ray_tracing.wgsl");
const BLIT_WGSL: &str = include_str!("../src/asset/shader/blit.wgsl");

/// Member names, offsets and span of a struct declared in `module`.
fn wgsl_struct(module: &naga::Module, name: &str) -> (Vec<(String, u32)>, u32) {
    let (_, ty) = module
        .types
        .iter()
        .find(|(_, ty)| ty.name.as_deref() == Some(name))
        .unwrap_or_else(|| panic!("struct {name} not declared"));

    match &ty.inner {
        naga::TypeInner::Struct { members, span } => (
            members
                .iter()
                .map(|member| (member.name.clone().unwrap_or_default(), member.offset))
                .collect(),
            *span,
        ),
        other => panic!("{name} is not a struct: {other:?}"),
    }
}

/// Value of a scalar module-scope `const`.
fn wgsl_constant(module: &naga::Module, name: &str) -> f64 {
    let (_, constant) = module
        .constants
        .iter()
        .find(|(_, constant)| constant.name.as_deref() == Some(name))
        .unwrap_or_else(|| panic!("const {name} not declared"));

    match &constant.inner {
        naga::ConstantInner::Scalar { value, .. } => match value {
            naga::ScalarValue::Float(v) => *v,
            naga::ScalarValue::Uint(v) => *v as f64,
            naga::ScalarValue::Sint(v) => *v as f64,
            naga::ScalarValue::Bool(_) => panic!("{name} is a bool"),
        },
        other => panic!("{name} is not a scalar: {other:?}"),
    }
}

fn member(name: &str, offset: usize) -> (String, u32) {
    (name.to_owned(), offset as u32)
}

fn parse(source: &str) -> naga::Module {
    naga::front::wgsl::parse_str(source)
        .unwrap_or_else(|e| panic!("{}", e.emit_to_string(source)))
}

#[test]
fn sphere_matches_wgsl_declaration() {
    let module = parse(RAY_TRACING_WGSL);
    let (members, span) = wgsl_struct(&module, "Sphere");

    assert_eq!(span as usize, size_of::<Sphere>());
    assert_eq!(
        members,
        vec![
            member("center", offset_of!(Sphere, center)),
            member("radius", offset_of!(Sphere, radius)),
            member("color", offset_of!(Sphere, color)),
            member("specular", offset_of!(Sphere, specular)),
        ]
    );
}

#[test]
fn uniforms_match_wgsl_declaration() {
    let module = parse(RAY_TRACING_WGSL);
    let (members, span) = wgsl_struct(&module, "Uniforms");

    assert_eq!(span as usize, size_of::<Uniforms>());
    assert_eq!(
        members,
        vec![
            member("camera_position", offset_of!(Uniforms, camera_position)),
            member("camera_target", offset_of!(Uniforms, camera_target)),
            member("resolution", offset_of!(Uniforms, resolution)),
            member("time", offset_of!(Uniforms, time)),
        ]
    );
}

#[test]
fn sphere_bytes_decode_on_the_shader_side() {
    let sphere = Sphere::new(
        glam::Vec3::new(0.0, 0.0, -5.0),
        1.0,
        glam::Vec3::new(1.0, 0.0, 0.0),
        0.0,
    );
    let bytes = bytemuck::bytes_of(&sphere);

    // read every member back at the offset the shader uses
    let module = parse(RAY_TRACING_WGSL);
    let (members, _) = wgsl_struct(&module, "Sphere");
    let read = |name: &str, lanes: usize| -> Vec<f32> {
        let offset = members
            .iter()
            .find(|(member, _)| member == name)
            .map(|(_, offset)| *offset as usize)
            .unwrap();
        bytes[offset..offset + lanes * 4]
            .chunks_exact(4)
            .map(bytemuck::pod_read_unaligned::<f32>)
            .collect()
    };

    assert_eq!(read("center", 3), vec![0.0, 0.0, -5.0]);
    assert_eq!(read("radius", 1), vec![1.0]);
    assert_eq!(read("color", 3), vec![1.0, 0.0, 0.0]);
    assert_eq!(read("specular", 1), vec![0.0]);
}

#[test]
fn kernel_entry_point_is_declared() {
    let module = parse(RAY_TRACING_WGSL);
    let entry = module
        .entry_points
        .iter()
        .find(|entry| entry.name == "trace_main")
        .unwrap();

    assert_eq!(entry.stage, naga::ShaderStage::Compute);
    assert_eq!(entry.workgroup_size, [8, 8, 1]);
}

#[test]
fn blit_shader_parses() {
    let module = parse(BLIT_WGSL);
    assert_eq!(module.entry_points.len(), 2);
}

#[test]
fn kernel_constants_match_cpu_tracer() {
    let module = parse(RAY_TRACING_WGSL);
    let constant = |name: &str| wgsl_constant(&module, name) as f32;

    let max_bounces = wgsl_constant(&module, "MAX_BOUNCES") as u32;
    assert_eq!(max_bounces, cpu::MAX_BOUNCES);
    assert_eq!(constant("AMBIENT"), cpu::AMBIENT);
    assert_eq!(constant("T_MIN"), cpu::T_MIN);
    assert_eq!(constant("MIN_THROUGHPUT"), cpu::MIN_THROUGHPUT);
    assert_eq!(constant("LIGHT_ORBIT_SPEED"), cpu::LIGHT_ORBIT_SPEED);
    assert!((constant("HALF_HEIGHT") - half_fov_tan(FOV_Y_DEGREES)).abs() < 1e-6);
}
