//! Built-in declarations for the Multor and Compressor projects.

use crate::config::RecipeDecl;
use crate::recipe::{Requirement, RequirementDecl};

const SETTINGS: [&str; 4] = ["os", "compiler", "build_type", "arch"];
const GENERATORS: [&str; 2] = ["CMakeToolchain", "CMakeDeps"];

fn declare(source_dir: &str, requires: &[Requirement]) -> RecipeDecl {
    RecipeDecl {
        source_dir: Some(source_dir.to_string()),
        settings: SETTINGS.map(String::from).to_vec(),
        generators: GENERATORS.map(String::from).to_vec(),
        requires: requires.iter().map(RequirementDecl::from).collect(),
        cmake_generator: None,
    }
}

/// Multor: the rendering engine, built with its full dependency set.
pub fn multor() -> RecipeDecl {
    declare(
        "Multor",
        &[
            Requirement::new("quill", "10.0.1"),
            Requirement::new("tomlplusplus", "3.4.0"),
            Requirement::new("assimp", "6.0.2"),
            Requirement::new("glm", "1.0.1"),
            Requirement::new("imgui", "1.91.4-docking"),
            Requirement::new("sdl", "3.4.0"),
        ],
    )
}

/// Compressor: logging and config only; the asset libraries are switched off.
pub fn compressor() -> RecipeDecl {
    declare(
        "Compressor",
        &[
            Requirement::new("quill", "10.0.1"),
            Requirement::new("tomlplusplus", "3.4.0"),
            Requirement::new("assimp", "6.0.2").disabled(),
            Requirement::new("glm", "1.0.1").disabled(),
        ],
    )
}
