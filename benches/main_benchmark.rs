use criterion::{Criterion, criterion_group, criterion_main};
use kiln::config::Manifest;
use kiln::lock::LockFile;
use kiln::recipe::{Recipe, SettingsProfile};
use std::hint::black_box;
use std::path::Path;

const MOCK_MANIFEST: &str = r#"
[recipe.multor]
source_dir = "Multor"
settings = ["os", "compiler", "build_type", "arch"]
generators = ["CMakeToolchain", "CMakeDeps"]
requires = [
    "quill/10.0.1",
    "tomlplusplus/3.4.0",
    "assimp/6.0.2",
    "glm/1.0.1",
    "imgui/1.91.4-docking",
    "sdl/3.4.0",
]
"#;

const MOCK_LOCK: &str = r#"
[recipe.multor.settings]
os = "Linux"
build_type = "Release"

[recipe.multor.package.quill]
version = "10.0.1"

[recipe.multor.package.glm]
version = "1.0.1"
revision = "1a2b3c"
"#;

fn bench_manifest_parse(c: &mut Criterion) {
    c.bench_function("parse_kiln_toml", |b| {
        b.iter(|| Manifest::parse(black_box(MOCK_MANIFEST)).unwrap())
    });
}

fn bench_recipe_validate(c: &mut Criterion) {
    let manifest = Manifest::parse(MOCK_MANIFEST).unwrap();
    let decl = &manifest.recipes["multor"];
    c.bench_function("validate_recipe", |b| {
        b.iter(|| Recipe::from_declaration(black_box("multor"), black_box(decl), Path::new(".")).unwrap())
    });
}

fn bench_bind_settings(c: &mut Criterion) {
    let mut profile = SettingsProfile::new();
    for kv in ["os=Linux", "compiler=gcc", "build_type=Release", "arch=x86_64", "compiler.version=13"] {
        profile.apply_override(kv).unwrap();
    }
    c.bench_function("bind_settings", |b| b.iter(|| black_box(&profile).bind().unwrap()));
}

fn bench_lock_parse(c: &mut Criterion) {
    c.bench_function("parse_kiln_lock", |b| {
        b.iter(|| {
            let _: LockFile = toml::from_str(black_box(MOCK_LOCK)).unwrap();
        })
    });
}

criterion_group!(
    benches,
    bench_manifest_parse,
    bench_recipe_validate,
    bench_bind_settings,
    bench_lock_parse
);
criterion_main!(benches);
