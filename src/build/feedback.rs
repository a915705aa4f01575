use colored::*;

/// Suggests a likely fix for a failed configure or build. The hint is shown
/// under the diagnostics, never instead of them.
pub struct FeedbackAnalyzer;

impl FeedbackAnalyzer {
    pub fn analyze(output: &str) -> Option<String> {
        // 1. Package missing from every remote
        if output.contains("Unable to find") && output.contains("in remotes") {
            return Some(format!(
                "A requirement could not be found in any {}.\nCheck the pinned version in {} or add a remote with {}.",
                "Conan remote".bold().yellow(),
                "kiln.toml".bold().yellow(),
                "conan remote add".bold().green()
            ));
        }

        // 2. Toolchain file missing or unreadable at configure time
        if output.contains("conan_toolchain.cmake")
            && (output.contains("Could not find toolchain file") || output.contains("not found"))
        {
            return Some(format!(
                "The {} is missing.\nRe-run {} so the generators write it again.",
                "toolchain file".bold().red(),
                "kiln configure".bold().green()
            ));
        }

        // 3. find_package() with no matching CMakeDeps output
        if output.contains("Could not find a package configuration file") {
            return Some(format!(
                "CMake could not find a {} for a dependency.\nMake sure the library is an {} requirement and {} is listed in generators.",
                "package config".bold().red(),
                "active".bold().yellow(),
                "CMakeDeps".bold().yellow()
            ));
        }

        // 4. Linker errors
        if output.contains("LNK2019") || output.contains("undefined reference to") {
            return Some(format!(
                "It looks like a {} error.\nCheck that every library the project links is declared in {}.",
                "Linker".bold().red(),
                "kiln.toml".bold().yellow()
            ));
        }

        // 5. Invalid profile values
        if output.contains("Invalid setting") {
            return Some(format!(
                "The {} rejected a setting.\nRun {} to see values for this machine.",
                "resolution service".bold().red(),
                "kiln detect".bold().green()
            ));
        }

        None
    }
}
