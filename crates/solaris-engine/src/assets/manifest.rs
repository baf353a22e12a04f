use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::renderer::traits::ProgramId;

/// Shader sources and texture paths for a scene.
/// Loaded from a JSON file at runtime; shader text is opaque to the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetManifest {
    /// Program name → GLSL sources.
    #[serde(default)]
    pub programs: HashMap<String, ShaderSource>,
    /// Texture key → relative image path.
    #[serde(default)]
    pub textures: HashMap<String, String>,
}

/// Vertex and fragment stage sources for one program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

impl AssetManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn program(&self, name: &str) -> Result<&ShaderSource, RenderError> {
        self.programs
            .get(name)
            .ok_or_else(|| RenderError::MissingProgram(name.to_string()))
    }

    /// Fails on the first scene program without a source.
    pub fn check_scene_programs(&self) -> Result<(), RenderError> {
        for id in ProgramId::SCENE {
            self.program(id.name())?;
        }
        Ok(())
    }

    pub fn texture_keys(&self) -> impl Iterator<Item = &str> {
        self.textures.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_manifest() {
        let json = r#"{
            "programs": {
                "body": { "vertex": "void main(){}", "fragment": "void main(){}" }
            },
            "textures": { "earth": "textures/earth.jpg" }
        }"#;
        let manifest = AssetManifest::from_json(json).unwrap();
        assert_eq!(manifest.programs.len(), 1);
        assert!(manifest.program("body").is_ok());
        assert_eq!(manifest.texture_keys().collect::<Vec<_>>(), vec!["earth"]);
    }

    #[test]
    fn missing_program_is_reported_by_name() {
        let manifest = AssetManifest::from_json(r#"{ "programs": {} }"#).unwrap();
        assert_eq!(
            manifest.check_scene_programs(),
            Err(RenderError::MissingProgram("body".into()))
        );
    }

    #[test]
    fn empty_manifest_parses() {
        let manifest = AssetManifest::from_json("{}").unwrap();
        assert!(manifest.programs.is_empty());
        assert!(manifest.textures.is_empty());
    }
}
