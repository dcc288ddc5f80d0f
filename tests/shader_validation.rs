//! Parse and validate the WGSL sources without a GPU.

use lumitree::gpu::shaders::{POST_PROCESS_SHADER, SPRITE_SHADER};
use naga::valid::{Capabilities, ValidationFlags, Validator};

fn validate(name: &str, source: &str) -> naga::Module {
    let module = match naga::front::wgsl::parse_str(source) {
        Ok(module) => module,
        Err(e) => panic!("{name} failed to parse:\n{}", e.emit_to_string(source)),
    };
    if let Err(e) = Validator::new(ValidationFlags::all(), Capabilities::all()).validate(&module) {
        panic!("{name} failed validation: {e:?}");
    }
    module
}

fn entry_points(module: &naga::Module) -> Vec<(&str, naga::ShaderStage)> {
    module
        .entry_points
        .iter()
        .map(|ep| (ep.name.as_str(), ep.stage))
        .collect()
}

#[test]
fn test_sprite_shader_is_valid() {
    let module = validate("sprite", SPRITE_SHADER);
    let eps = entry_points(&module);
    assert!(eps.contains(&("vs_main", naga::ShaderStage::Vertex)));
    assert!(eps.contains(&("fs_main", naga::ShaderStage::Fragment)));
}

#[test]
fn test_post_process_shader_is_valid() {
    let module = validate("post", POST_PROCESS_SHADER);
    let eps = entry_points(&module);
    assert!(eps.contains(&("vs_main", naga::ShaderStage::Vertex)));
    assert!(eps.contains(&("fs_main", naga::ShaderStage::Fragment)));
}

#[test]
fn test_sprite_uniforms_match_host_layout() {
    let module = validate("sprite", SPRITE_SHADER);
    let uniforms = module
        .types
        .iter()
        .find(|(_, ty)| ty.name.as_deref() == Some("Uniforms"))
        .map(|(_, ty)| ty.inner.size(module.to_ctx()));
    assert_eq!(uniforms, Some(112));
}
