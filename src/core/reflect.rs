//! WGSL parsing and interface reflection.

use super::graphics::{AttributeLocation, UniformLocation};
use super::ContextError;
use naga::{Binding, ShaderStage, TypeInner};
use std::collections::HashMap;

/// Vertex stage entry point every program must provide.
pub const VERTEX_ENTRY: &str = "vs_main";
/// Fragment stage entry point every program must provide.
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// The reflected interface of a parsed program.
#[derive(Debug)]
pub struct Reflection {
    /// Vertex inputs by name.
    pub attributes: HashMap<String, AttributeLocation>,
    /// Resource bindings by name.
    pub uniforms: HashMap<String, UniformLocation>,
    /// Whether any bound resource is a texture.
    pub samples_texture: bool,
}

/// Parse, validate and reflect a WGSL program.
pub fn reflect(label: &str, source: &str) -> Result<Reflection, ContextError> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| ContextError::ShaderCompile(format!("{label}: {}", e.emit_to_string(source))))?;

    naga::valid::Validator::new(naga::valid::ValidationFlags::all(), naga::valid::Capabilities::all())
        .validate(&module)
        .map_err(|e| ContextError::ShaderCompile(format!("{label}: {}", e.emit_to_string(source))))?;

    let find_entry = |name: &str, stage: ShaderStage| {
        module
            .entry_points
            .iter()
            .find(|ep| ep.name == name && ep.stage == stage)
            .ok_or_else(|| ContextError::ShaderLink(format!("{label}: missing {stage:?} entry point '{name}'")))
    };
    let vertex = find_entry(VERTEX_ENTRY, ShaderStage::Vertex)?;
    find_entry(FRAGMENT_ENTRY, ShaderStage::Fragment)?;

    let mut attributes = HashMap::new();
    for argument in &vertex.function.arguments {
        match (&argument.binding, &argument.name) {
            (Some(Binding::Location { location, .. }), Some(name)) => {
                attributes.insert(name.clone(), *location);
            }
            (None, _) => {
                if let TypeInner::Struct { members, .. } = &module.types[argument.ty].inner {
                    for member in members {
                        if let (Some(Binding::Location { location, .. }), Some(name)) = (&member.binding, &member.name) {
                            attributes.insert(name.clone(), *location);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    let mut uniforms = HashMap::new();
    let mut samples_texture = false;
    for (_, global) in module.global_variables.iter() {
        let (Some(binding), Some(name)) = (&global.binding, &global.name) else {
            continue;
        };
        if matches!(module.types[global.ty].inner, TypeInner::Image { .. }) {
            samples_texture = true;
        }
        uniforms.insert(
            name.clone(),
            UniformLocation {
                group: binding.group,
                binding: binding.binding,
            },
        );
    }

    Ok(Reflection {
        attributes,
        uniforms,
        samples_texture,
    })
}
