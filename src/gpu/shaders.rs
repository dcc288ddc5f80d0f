//! WGSL sources for the sprite and post-process passes.

/// Instanced camera-facing sprites.
///
/// One instance per [`SpriteInstance`](crate::attributes::SpriteInstance),
/// six vertices each. Sizes are world-space diameters; a zero size collapses
/// the quad so nothing is rasterized. Colors are written premultiplied for
/// additive blending.
pub const SPRITE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    camera_right: vec4<f32>,
    camera_up: vec4<f32>,
    time: f32,
    delta_time: f32,
    _pad0: f32,
    _pad1: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) @interpolate(flat) shape: u32,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) particle_pos: vec3<f32>,
    @location(1) size: f32,
    @location(2) color: vec3<f32>,
    @location(3) shape: u32,
) -> VertexOutput {
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );

    let quad_pos = quad_vertices[vertex_index];
    let half_size = max(size, 0.0) * 0.5;
    let world_pos = particle_pos
        + uniforms.camera_right.xyz * quad_pos.x * half_size
        + uniforms.camera_up.xyz * quad_pos.y * half_size;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(world_pos, 1.0);
    out.color = color;
    out.uv = quad_pos;
    out.shape = shape;
    return out;
}

fn glow(d: f32) -> f32 {
    let core = 1.0 - smoothstep(0.0, 0.35, d);
    let halo = exp(-d * d * 5.0);
    return clamp(core * 0.6 + halo, 0.0, 1.0) * (1.0 - smoothstep(0.85, 1.0, d));
}

fn frame_border(uv: vec2<f32>) -> f32 {
    let edge = max(abs(uv.x), abs(uv.y));
    let border = smoothstep(0.78, 0.84, edge) * (1.0 - smoothstep(0.94, 1.0, edge));
    return border + 0.12 * (1.0 - step(0.84, edge));
}

fn sparkle(uv: vec2<f32>, d: f32) -> f32 {
    let ax = abs(uv.x);
    let ay = abs(uv.y);
    let rays = exp(-ax * 14.0) * exp(-ay * 2.5) + exp(-ay * 14.0) * exp(-ax * 2.5);
    return clamp(glow(d) + rays, 0.0, 1.5) * (1.0 - smoothstep(0.9, 1.0, d));
}

fn flake(d: f32) -> f32 {
    return (1.0 - smoothstep(0.2, 1.0, d)) * 0.8;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let d = length(in.uv);
    var intensity = 0.0;
    switch in.shape {
        case 1u: {
            intensity = frame_border(in.uv);
        }
        case 2u: {
            intensity = sparkle(in.uv, d);
        }
        case 3u: {
            intensity = flake(d);
        }
        default: {
            intensity = glow(d);
        }
    }
    if intensity <= 0.001 {
        discard;
    }
    return vec4<f32>(in.color * intensity, intensity);
}
"#;

/// Fullscreen pass: bloom tap, film noise and vignette.
pub const POST_PROCESS_SHADER: &str = r#"
struct PostUniforms {
    resolution: vec2<f32>,
    time: f32,
    noise: f32,
    vignette_offset: f32,
    vignette_darkness: f32,
    bloom_intensity: f32,
    bloom_threshold: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@group(0) @binding(0)
var scene: texture_2d<f32>;
@group(0) @binding(1)
var scene_sampler: sampler;
@group(0) @binding(2)
var<uniform> post: PostUniforms;

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    var uvs = array<vec2<f32>, 3>(
        vec2<f32>(0.0, 1.0),
        vec2<f32>(2.0, 1.0),
        vec2<f32>(0.0, -1.0),
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(positions[vertex_index], 0.0, 1.0);
    out.uv = uvs[vertex_index];
    return out;
}

fn hash(p: vec2<f32>) -> f32 {
    return fract(sin(dot(p, vec2<f32>(12.9898, 78.233))) * 43758.5453);
}

fn bright(c: vec3<f32>) -> vec3<f32> {
    let luma = dot(c, vec3<f32>(0.2126, 0.7152, 0.0722));
    return c * smoothstep(post.bloom_threshold, post.bloom_threshold + 0.3, luma);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let texel = 1.0 / max(post.resolution, vec2<f32>(1.0, 1.0));
    var color = textureSample(scene, scene_sampler, in.uv).rgb;

    // Two rings of taps approximate a wide, soft bloom.
    var bloom = vec3<f32>(0.0);
    for (var i = 0; i < 8; i = i + 1) {
        let a = f32(i) * 0.7853982;
        let dir = vec2<f32>(cos(a), sin(a));
        bloom += bright(textureSample(scene, scene_sampler, in.uv + dir * texel * 4.0).rgb);
        bloom += bright(textureSample(scene, scene_sampler, in.uv + dir * texel * 12.0).rgb) * 0.6;
    }
    color += bloom / 12.8 * post.bloom_intensity;

    let grain = hash(in.uv * post.resolution + vec2<f32>(post.time * 61.0, post.time * 17.0)) - 0.5;
    color += vec3<f32>(grain * post.noise);

    // Falls from 1 in the centre toward 0 in the corners. The edges run
    // high to low, so the Hermite step is spelled out.
    let dist = distance(in.uv, vec2<f32>(0.5)) * (post.vignette_darkness + post.vignette_offset);
    let inner = post.vignette_offset * 0.799;
    let t = clamp((dist - 0.8) / (inner - 0.8), 0.0, 1.0);
    color *= t * t * (3.0 - 2.0 * t);

    return vec4<f32>(clamp(color, vec3<f32>(0.0), vec3<f32>(1.0)), 1.0);
}
"#;
