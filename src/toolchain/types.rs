use std::path::PathBuf;

/// Compilers the host detector knows how to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum CompilerType {
    /// Microsoft Visual C++ (cl.exe)
    MSVC,
    /// Clang/LLVM
    Clang,
    /// Apple's Clang distribution shipped with Xcode
    AppleClang,
    /// GNU Compiler Collection
    GCC,
}

impl CompilerType {
    /// Value of the `compiler` settings axis for this compiler.
    pub fn setting(&self) -> &'static str {
        match self {
            CompilerType::MSVC => "msvc",
            CompilerType::Clang => "clang",
            CompilerType::AppleClang => "apple-clang",
            CompilerType::GCC => "gcc",
        }
    }
}

/// A compiler found on the host.
#[derive(Debug, Clone)]
pub struct HostCompiler {
    pub compiler_type: CompilerType,
    pub path: PathBuf,
    /// First line of `--version`
    pub version: String,
}

impl HostCompiler {
    /// Major version as used by the `compiler.version` sub-setting.
    pub fn major_version(&self) -> Option<String> {
        self.version
            .split(|c: char| !(c.is_ascii_digit() || c == '.'))
            .find(|tok| tok.contains('.'))
            .and_then(|tok| tok.split('.').next())
            .filter(|major| !major.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compiler(version: &str) -> HostCompiler {
        HostCompiler {
            compiler_type: CompilerType::GCC,
            path: PathBuf::from("/usr/bin/g++"),
            version: version.to_string(),
        }
    }

    #[test]
    fn test_major_version() {
        assert_eq!(
            compiler("g++ (Ubuntu 13.2.0-23ubuntu4) 13.2.0").major_version().as_deref(),
            Some("13")
        );
        assert_eq!(
            compiler("Ubuntu clang version 18.1.3 (1ubuntu1)").major_version().as_deref(),
            Some("18")
        );
        assert_eq!(compiler("unknown").major_version(), None);
    }

    #[test]
    fn test_setting_names() {
        assert_eq!(CompilerType::AppleClang.setting(), "apple-clang");
        assert_eq!(CompilerType::MSVC.setting(), "msvc");
    }
}
