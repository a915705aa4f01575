//! Lifecycle tests against an in-process resolver and build driver.
//!
//! The fakes write generator output into the requested folder the same way
//! `conan install` would, so the toolchain checks run against real files.

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};

use kiln::build::{BuildState, Lifecycle, Phase};
use kiln::config::{Manifest, RecipeDecl};
use kiln::declarations;
use kiln::driver::{BuildDriver, BuildRequest, ConfigureRequest, DriverOutcome};
use kiln::error::{BuildError, ConfigError, RecipeError, ResolveError, UsageError};
use kiln::recipe::{Recipe, SettingsAxis, SettingsProfile};
use kiln::resolve::{Resolution, ResolveRequest, ResolvedPackage, Resolver};
use tempfile::TempDir;

#[derive(Default)]
struct FakeResolver {
    calls: Cell<usize>,
    requested: RefCell<Vec<String>>,
    skip_toolchain: bool,
    fail_with: Option<String>,
    /// Write generator output here instead of the requested folder
    elsewhere: Option<PathBuf>,
    /// Leave this package out of the returned graph
    omit: Option<&'static str>,
    /// Report this package at another version
    bump: Option<(&'static str, &'static str)>,
}

impl Resolver for FakeResolver {
    fn resolve(&self, request: &ResolveRequest<'_>) -> Result<Resolution, ResolveError> {
        self.calls.set(self.calls.get() + 1);
        *self.requested.borrow_mut() = request.references();

        if let Some(diagnostics) = &self.fail_with {
            return Err(ResolveError::ResolutionFailed {
                diagnostics: diagnostics.clone(),
            });
        }

        let output_dir = self.elsewhere.as_deref().unwrap_or(request.output_dir);
        fs::create_dir_all(output_dir)?;
        if !self.skip_toolchain {
            fs::write(
                output_dir.join("conan_toolchain.cmake"),
                format!("set(CMAKE_BUILD_TYPE {})\n", request.settings.build_type()),
            )?;
        }
        let mut packages = Vec::new();
        for req in &request.requirements {
            fs::write(
                output_dir.join(format!("{}-config.cmake", req.name)),
                format!("# {}\n", req.reference()),
            )?;
            if self.omit == Some(req.name.as_str()) {
                continue;
            }
            let version = match self.bump {
                Some((name, version)) if name == req.name => version.to_string(),
                _ => req.version.clone(),
            };
            packages.push(ResolvedPackage {
                name: req.name.clone(),
                version,
                revision: None,
            });
        }
        Ok(Resolution {
            packages,
            generators_dir: output_dir.to_path_buf(),
        })
    }
}

#[derive(Default)]
struct FakeDriver {
    configure_calls: Cell<usize>,
    build_calls: Cell<usize>,
    configure_output: Option<DriverOutcome>,
    build_output: Option<DriverOutcome>,
}

impl BuildDriver for FakeDriver {
    fn configure(&self, request: &ConfigureRequest<'_>) -> Result<DriverOutcome, BuildError> {
        self.configure_calls.set(self.configure_calls.get() + 1);
        assert!(request.toolchain_file.exists(), "toolchain file handed to the driver must exist");
        Ok(self
            .configure_output
            .clone()
            .unwrap_or_else(|| DriverOutcome::ok("-- Configuring done")))
    }

    fn build(&self, _request: &BuildRequest<'_>) -> Result<DriverOutcome, BuildError> {
        self.build_calls.set(self.build_calls.get() + 1);
        Ok(self
            .build_output
            .clone()
            .unwrap_or_else(|| DriverOutcome::ok("[100%] Built target app")))
    }
}

fn linux_release() -> SettingsProfile {
    SettingsProfile::new()
        .with(SettingsAxis::Os, "Linux")
        .with(SettingsAxis::Compiler, "gcc")
        .with(SettingsAxis::BuildType, "Release")
        .with(SettingsAxis::Arch, "x86_64")
}

fn recipe(name: &str, decl: &RecipeDecl, root: &Path) -> Recipe {
    Recipe::from_declaration(name, decl, root).expect("declaration should validate")
}

#[test]
fn test_multor_configure_then_build() {
    let dir = TempDir::new().unwrap();
    let multor = recipe("multor", &declarations::multor(), dir.path());
    let resolver = FakeResolver::default();
    let driver = FakeDriver::default();

    let mut lifecycle = Lifecycle::new(&multor, linux_release(), &resolver, &driver);
    assert_eq!(lifecycle.state(), BuildState::Unconfigured);

    lifecycle.configure().unwrap();
    assert_eq!(lifecycle.state(), BuildState::Configured);
    assert_eq!(
        *resolver.requested.borrow(),
        [
            "quill/10.0.1",
            "tomlplusplus/3.4.0",
            "assimp/6.0.2",
            "glm/1.0.1",
            "imgui/1.91.4-docking",
            "sdl/3.4.0",
        ]
    );
    let toolchain = lifecycle.toolchain_state().unwrap();
    assert!(toolchain.contains("conan_toolchain.cmake"));
    assert!(toolchain.contains("sdl-config.cmake"));

    lifecycle.build().unwrap();
    assert_eq!(lifecycle.state(), BuildState::Built);
    assert_eq!(
        lifecycle.history(),
        [BuildState::Unconfigured, BuildState::Configured, BuildState::Built]
    );
    assert_eq!(driver.configure_calls.get(), 1);
    assert_eq!(driver.build_calls.get(), 1);
    assert!(
        dir.path()
            .join("Multor/build/release/generators/conan_toolchain.cmake")
            .exists()
    );
}

#[test]
fn test_compressor_resolves_only_active_requirements() {
    let dir = TempDir::new().unwrap();
    let compressor = recipe("compressor", &declarations::compressor(), dir.path());
    let resolver = FakeResolver::default();
    let driver = FakeDriver::default();

    let mut lifecycle = Lifecycle::new(&compressor, linux_release(), &resolver, &driver);
    lifecycle.run().unwrap();

    assert_eq!(*resolver.requested.borrow(), ["quill/10.0.1", "tomlplusplus/3.4.0"]);
    let resolution = lifecycle.resolution().unwrap();
    assert!(resolution.find("assimp").is_none());
    assert!(resolution.find("glm").is_none());
}

#[test]
fn test_build_before_configure_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let compressor = recipe("compressor", &declarations::compressor(), dir.path());
    let resolver = FakeResolver::default();
    let driver = FakeDriver::default();

    let mut lifecycle = Lifecycle::new(&compressor, linux_release(), &resolver, &driver);
    let err = lifecycle.build().unwrap_err();
    assert!(matches!(err, RecipeError::Usage(UsageError::NotConfigured)));
    assert_eq!(lifecycle.state(), BuildState::Unconfigured);
    assert_eq!(driver.build_calls.get(), 0);
    assert_eq!(resolver.calls.get(), 0);
}

#[test]
fn test_configure_twice_gives_same_toolchain() {
    let dir = TempDir::new().unwrap();
    let compressor = recipe("compressor", &declarations::compressor(), dir.path());
    let resolver = FakeResolver::default();
    let driver = FakeDriver::default();

    let mut lifecycle = Lifecycle::new(&compressor, linux_release(), &resolver, &driver);
    lifecycle.configure().unwrap();
    let first = lifecycle.toolchain_state().unwrap().fingerprint();
    lifecycle.configure().unwrap();
    let second = lifecycle.toolchain_state().unwrap().fingerprint();

    assert_eq!(first, second);
    assert_eq!(lifecycle.state(), BuildState::Configured);
}

#[test]
fn test_conflicting_duplicate_rejected_before_resolution() {
    let manifest = Manifest::parse(
        r#"
[recipe.broken]
settings = ["os", "compiler", "build_type", "arch"]
generators = ["CMakeToolchain", "CMakeDeps"]
requires = ["quill/10.0.1", "quill/9.0.0"]
"#,
    )
    .unwrap();

    let err = Recipe::from_declaration("broken", &manifest.recipes["broken"], Path::new(".")).unwrap_err();
    assert_eq!(
        err,
        ConfigError::ConflictingRequirement {
            name: "quill".into(),
            first: "10.0.1".into(),
            second: "9.0.0".into(),
        }
    );
}

#[test]
fn test_disabled_duplicate_is_not_a_conflict() {
    let manifest = Manifest::parse(
        r#"
[recipe.ok]
settings = ["os", "compiler", "build_type", "arch"]
generators = ["CMakeToolchain", "CMakeDeps"]
requires = ["glm/1.0.1", { ref = "glm/0.9.9", active = false }]
"#,
    )
    .unwrap();

    let recipe = Recipe::from_declaration("ok", &manifest.recipes["ok"], Path::new(".")).unwrap();
    assert_eq!(recipe.active_requirements().count(), 1);
    assert_eq!(recipe.disabled_requirements().count(), 1);
}

#[test]
fn test_missing_setting_fails_without_resolving() {
    let dir = TempDir::new().unwrap();
    let compressor = recipe("compressor", &declarations::compressor(), dir.path());
    let resolver = FakeResolver::default();
    let driver = FakeDriver::default();
    let profile = SettingsProfile::new()
        .with(SettingsAxis::Os, "Linux")
        .with(SettingsAxis::Compiler, "gcc")
        .with(SettingsAxis::BuildType, "Release");

    let mut lifecycle = Lifecycle::new(&compressor, profile, &resolver, &driver);
    let err = lifecycle.configure().unwrap_err();
    assert!(matches!(
        err,
        RecipeError::Config(ConfigError::MissingSetting {
            axis: SettingsAxis::Arch
        })
    ));
    assert_eq!(resolver.calls.get(), 0);
    assert_eq!(driver.configure_calls.get(), 0);
}

#[test]
fn test_unsupported_generator_rejected() {
    let manifest = Manifest::parse(
        r#"
[recipe.msbuild]
settings = ["os", "compiler", "build_type", "arch"]
generators = ["CMakeToolchain", "CMakeDeps", "MSBuildDeps"]
"#,
    )
    .unwrap();

    let err = Recipe::from_declaration("msbuild", &manifest.recipes["msbuild"], Path::new(".")).unwrap_err();
    assert_eq!(
        err,
        ConfigError::UnsupportedGenerator {
            name: "MSBuildDeps".into()
        }
    );
}

#[test]
fn test_missing_toolchain_output_stops_before_driver() {
    let dir = TempDir::new().unwrap();
    let compressor = recipe("compressor", &declarations::compressor(), dir.path());
    let resolver = FakeResolver {
        skip_toolchain: true,
        ..Default::default()
    };
    let driver = FakeDriver::default();

    let mut lifecycle = Lifecycle::new(&compressor, linux_release(), &resolver, &driver);
    let err = lifecycle.configure().unwrap_err();
    assert!(matches!(
        err,
        RecipeError::Resolution(ResolveError::GeneratorOutputMissing { ref generator, .. })
            if generator == "CMakeToolchain"
    ));
    assert_eq!(lifecycle.state(), BuildState::Failed(Phase::Configure));
    assert_eq!(driver.configure_calls.get(), 0);
}

#[test]
fn test_resolution_failure_keeps_diagnostics() {
    let dir = TempDir::new().unwrap();
    let multor = recipe("multor", &declarations::multor(), dir.path());
    let resolver = FakeResolver {
        fail_with: Some("ERROR: Package 'sdl/3.4.0' not resolved".into()),
        ..Default::default()
    };
    let driver = FakeDriver::default();

    let mut lifecycle = Lifecycle::new(&multor, linux_release(), &resolver, &driver);
    let err = lifecycle.configure().unwrap_err();
    assert_eq!(err.diagnostics(), Some("ERROR: Package 'sdl/3.4.0' not resolved"));
    assert_eq!(lifecycle.state(), BuildState::Failed(Phase::Configure));
}

#[test]
fn test_build_failure_surfaces_driver_output_verbatim() {
    let dir = TempDir::new().unwrap();
    let compressor = recipe("compressor", &declarations::compressor(), dir.path());
    let resolver = FakeResolver::default();
    let output = "main.cpp:3:10: fatal error: quill/Logger.h: No such file or directory\n";
    let driver = FakeDriver {
        build_output: Some(DriverOutcome::failed(output)),
        ..Default::default()
    };

    let mut lifecycle = Lifecycle::new(&compressor, linux_release(), &resolver, &driver);
    lifecycle.configure().unwrap();
    let err = lifecycle.build().unwrap_err();

    assert!(matches!(err, RecipeError::Build(BuildError::BuildFailed { .. })));
    assert_eq!(err.diagnostics(), Some(output));
    assert_eq!(lifecycle.state(), BuildState::Failed(Phase::Build));
}

#[test]
fn test_configure_failure_moves_to_failed() {
    let dir = TempDir::new().unwrap();
    let compressor = recipe("compressor", &declarations::compressor(), dir.path());
    let resolver = FakeResolver::default();
    let driver = FakeDriver {
        configure_output: Some(DriverOutcome::failed("CMake Error: could not find CMAKE_ROOT")),
        ..Default::default()
    };

    let mut lifecycle = Lifecycle::new(&compressor, linux_release(), &resolver, &driver);
    let err = lifecycle.run().unwrap_err();
    assert!(matches!(err, RecipeError::Build(BuildError::ConfigureFailed { .. })));
    assert_eq!(lifecycle.state(), BuildState::Failed(Phase::Configure));
    assert_eq!(driver.build_calls.get(), 0);

    let again = lifecycle.configure().unwrap_err();
    assert!(matches!(again, RecipeError::Usage(UsageError::AlreadyFailed)));
}

#[test]
fn test_configure_after_built_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let compressor = recipe("compressor", &declarations::compressor(), dir.path());
    let resolver = FakeResolver::default();
    let driver = FakeDriver::default();

    let mut lifecycle = Lifecycle::new(&compressor, linux_release(), &resolver, &driver);
    lifecycle.run().unwrap();

    let err = lifecycle.configure().unwrap_err();
    assert!(matches!(err, RecipeError::Usage(UsageError::AlreadyBuilt)));
    let err = lifecycle.build().unwrap_err();
    assert!(matches!(err, RecipeError::Usage(UsageError::AlreadyBuilt)));
    assert_eq!(resolver.calls.get(), 1);
}

#[test]
fn test_debug_build_uses_own_build_dir() {
    let dir = TempDir::new().unwrap();
    let compressor = recipe("compressor", &declarations::compressor(), dir.path());
    let resolver = FakeResolver::default();
    let driver = FakeDriver::default();
    let profile = linux_release().with(SettingsAxis::BuildType, "Debug");

    let mut lifecycle = Lifecycle::new(&compressor, profile, &resolver, &driver);
    lifecycle.configure().unwrap();

    let toolchain = dir.path().join("Compressor/build/debug/generators/conan_toolchain.cmake");
    assert_eq!(
        fs::read_to_string(toolchain).unwrap(),
        "set(CMAKE_BUILD_TYPE Debug)\n"
    );
}

#[test]
fn test_generator_output_in_other_folder_is_resolution_error() {
    let dir = TempDir::new().unwrap();
    let compressor = recipe("compressor", &declarations::compressor(), dir.path());
    let resolver = FakeResolver {
        elsewhere: Some(dir.path().join("elsewhere")),
        ..Default::default()
    };
    let driver = FakeDriver::default();

    let mut lifecycle = Lifecycle::new(&compressor, linux_release(), &resolver, &driver);
    let err = lifecycle.configure().unwrap_err();
    assert!(matches!(
        err,
        RecipeError::Resolution(ResolveError::ToolchainLocationMismatch { ref actual, .. })
            if actual.ends_with("elsewhere")
    ));
    assert_eq!(lifecycle.state(), BuildState::Failed(Phase::Configure));
    assert_eq!(driver.configure_calls.get(), 0);
    assert!(lifecycle.toolchain_state().is_none());
}

#[test]
fn test_stale_generators_folder_is_not_used() {
    let dir = TempDir::new().unwrap();
    let compressor = recipe("compressor", &declarations::compressor(), dir.path());
    let stale = dir.path().join("Compressor/build/release/generators");
    fs::create_dir_all(&stale).unwrap();
    fs::write(stale.join("conan_toolchain.cmake"), "# stale\n").unwrap();
    fs::write(stale.join("quill-config.cmake"), "# stale\n").unwrap();

    let resolver = FakeResolver {
        elsewhere: Some(dir.path().join("fresh")),
        ..Default::default()
    };
    let driver = FakeDriver::default();

    let mut lifecycle = Lifecycle::new(&compressor, linux_release(), &resolver, &driver);
    assert!(lifecycle.configure().is_err());
    assert_eq!(driver.configure_calls.get(), 0);
}

#[test]
fn test_requirement_missing_from_graph_is_unresolved() {
    let dir = TempDir::new().unwrap();
    let multor = recipe("multor", &declarations::multor(), dir.path());
    let resolver = FakeResolver {
        omit: Some("imgui"),
        ..Default::default()
    };
    let driver = FakeDriver::default();

    let mut lifecycle = Lifecycle::new(&multor, linux_release(), &resolver, &driver);
    let err = lifecycle.configure().unwrap_err();
    assert!(matches!(
        err,
        RecipeError::Resolution(ResolveError::Unresolved { ref reference, .. })
            if reference == "imgui/1.91.4-docking"
    ));
    assert_eq!(lifecycle.state(), BuildState::Failed(Phase::Configure));
    assert_eq!(driver.configure_calls.get(), 0);
}

#[test]
fn test_requirement_resolved_at_other_version_fails() {
    let dir = TempDir::new().unwrap();
    let compressor = recipe("compressor", &declarations::compressor(), dir.path());
    let resolver = FakeResolver {
        bump: Some(("tomlplusplus", "3.5.0")),
        ..Default::default()
    };
    let driver = FakeDriver::default();

    let mut lifecycle = Lifecycle::new(&compressor, linux_release(), &resolver, &driver);
    let err = lifecycle.configure().unwrap_err();
    assert!(matches!(err, RecipeError::Resolution(ResolveError::ResolutionFailed { .. })));
    let diagnostics = err.diagnostics().unwrap();
    assert!(diagnostics.contains("3.5.0"));
    assert!(diagnostics.contains("3.4.0"));
    assert_eq!(lifecycle.state(), BuildState::Failed(Phase::Configure));
    assert_eq!(driver.configure_calls.get(), 0);
}
