use crate::error::ConfigError;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// What a generator's output is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    /// A toolchain file the build driver is pointed at
    Toolchain,
    /// Per-package descriptors the build scripts import
    Dependencies,
    /// Environment activation scripts
    Environment,
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorKind::Toolchain => write!(f, "toolchain"),
            GeneratorKind::Dependencies => write!(f, "dependency-descriptor"),
            GeneratorKind::Environment => write!(f, "environment"),
        }
    }
}

/// Toolchain-integration generators understood by the resolution service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generator {
    CMakeToolchain,
    CMakeDeps,
    VirtualBuildEnv,
    VirtualRunEnv,
}

/// File written by `CMakeToolchain`; the build driver's toolchain argument.
pub const TOOLCHAIN_FILE: &str = "conan_toolchain.cmake";

impl Generator {
    pub fn name(&self) -> &'static str {
        match self {
            Generator::CMakeToolchain => "CMakeToolchain",
            Generator::CMakeDeps => "CMakeDeps",
            Generator::VirtualBuildEnv => "VirtualBuildEnv",
            Generator::VirtualRunEnv => "VirtualRunEnv",
        }
    }

    pub fn kind(&self) -> GeneratorKind {
        match self {
            Generator::CMakeToolchain => GeneratorKind::Toolchain,
            Generator::CMakeDeps => GeneratorKind::Dependencies,
            Generator::VirtualBuildEnv | Generator::VirtualRunEnv => GeneratorKind::Environment,
        }
    }

    /// Checks `dir` for this generator's output. `has_requirements` matters
    /// for `CMakeDeps`, which writes nothing when there is nothing to describe.
    pub fn has_output(&self, dir: &Path, has_requirements: bool) -> bool {
        match self {
            Generator::CMakeToolchain => dir.join(TOOLCHAIN_FILE).is_file(),
            Generator::CMakeDeps => {
                !has_requirements
                    || any_file(dir, |name| {
                        name.ends_with("-config.cmake") || name.ends_with("Config.cmake")
                    })
            }
            Generator::VirtualBuildEnv => any_file(dir, |name| name.starts_with("conanbuild")),
            Generator::VirtualRunEnv => any_file(dir, |name| name.starts_with("conanrun")),
        }
    }
}

fn any_file(dir: &Path, matches: impl Fn(&str) -> bool) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    entries.filter_map(|e| e.ok()).any(|e| {
        e.file_type().is_ok_and(|t| t.is_file()) && matches(&e.file_name().to_string_lossy())
    })
}

impl fmt::Display for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Generator {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "CMakeToolchain" | "toolchain" => Ok(Generator::CMakeToolchain),
            "CMakeDeps" | "deps" => Ok(Generator::CMakeDeps),
            "VirtualBuildEnv" => Ok(Generator::VirtualBuildEnv),
            "VirtualRunEnv" => Ok(Generator::VirtualRunEnv),
            other => Err(ConfigError::UnsupportedGenerator {
                name: other.to_string(),
            }),
        }
    }
}

/// Parses a declared generator list: order kept, repeats dropped, and at
/// least one toolchain and one dependency generator required.
pub fn parse_generators<S: AsRef<str>>(names: &[S]) -> Result<Vec<Generator>, ConfigError> {
    let mut generators: Vec<Generator> = Vec::with_capacity(names.len());
    for name in names {
        let generator: Generator = name.as_ref().parse()?;
        if !generators.contains(&generator) {
            generators.push(generator);
        }
    }

    for kind in [GeneratorKind::Toolchain, GeneratorKind::Dependencies] {
        if !generators.iter().any(|g| g.kind() == kind) {
            return Err(ConfigError::MissingGenerator { kind });
        }
    }

    Ok(generators)
}
