use super::state::ToolchainState;
use crate::driver::{BuildDriver, BuildRequest, ConfigureRequest, DriverOutcome};
use crate::error::{BuildError, ResolveError, Result, UsageError};
use crate::recipe::{Recipe, Settings, SettingsProfile, TOOLCHAIN_FILE};
use crate::resolve::{Resolution, ResolveRequest, Resolver};
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Configure,
    Build,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Unconfigured,
    Configured,
    Built,
    /// Terminal; records which transition failed.
    Failed(Phase),
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildState::Unconfigured => write!(f, "unconfigured"),
            BuildState::Configured => write!(f, "configured"),
            BuildState::Built => write!(f, "built"),
            BuildState::Failed(Phase::Configure) => write!(f, "failed (configure)"),
            BuildState::Failed(Phase::Build) => write!(f, "failed (build)"),
        }
    }
}

/// One configure/build run of a recipe.
///
/// `Unconfigured -> Configured -> Built`, with `Failed` reachable from either
/// transition. Nothing is retried: after a failure a new `Lifecycle` has to be
/// created. Settings are bound on the first configure and kept for the rest
/// of the run.
pub struct Lifecycle<'r, R, D> {
    recipe: &'r Recipe,
    profile: SettingsProfile,
    settings: Option<Settings>,
    resolver: R,
    driver: D,
    jobs: Option<usize>,
    state: BuildState,
    history: Vec<BuildState>,
    resolution: Option<Resolution>,
    toolchain: Option<ToolchainState>,
    last_output: Option<DriverOutcome>,
}

impl<'r, R: Resolver, D: BuildDriver> Lifecycle<'r, R, D> {
    pub fn new(recipe: &'r Recipe, profile: SettingsProfile, resolver: R, driver: D) -> Self {
        Self {
            recipe,
            profile,
            settings: None,
            resolver,
            driver,
            jobs: None,
            state: BuildState::Unconfigured,
            history: vec![BuildState::Unconfigured],
            resolution: None,
            toolchain: None,
            last_output: None,
        }
    }

    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn recipe(&self) -> &Recipe {
        self.recipe
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Every state entered so far, starting with `Unconfigured`.
    pub fn history(&self) -> &[BuildState] {
        &self.history
    }

    pub fn settings(&self) -> Option<&Settings> {
        self.settings.as_ref()
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    pub fn toolchain_state(&self) -> Option<&ToolchainState> {
        self.toolchain.as_ref()
    }

    /// Output of the most recent successful driver call.
    pub fn last_output(&self) -> Option<&DriverOutcome> {
        self.last_output.as_ref()
    }

    fn enter(&mut self, state: BuildState) {
        debug!("{}: {} -> {}", self.recipe.name(), self.state, state);
        self.state = state;
        self.history.push(state);
    }

    pub fn configure(&mut self) -> Result<()> {
        match self.state {
            BuildState::Built => return Err(UsageError::AlreadyBuilt.into()),
            BuildState::Failed(_) => return Err(UsageError::AlreadyFailed.into()),
            BuildState::Unconfigured | BuildState::Configured => {}
        }

        match self.try_configure() {
            Ok(()) => {
                self.enter(BuildState::Configured);
                Ok(())
            }
            Err(e) => {
                warn!("{}: configure failed: {}", self.recipe.name(), e);
                self.enter(BuildState::Failed(Phase::Configure));
                Err(e)
            }
        }
    }

    fn try_configure(&mut self) -> Result<()> {
        let settings = match self.settings.clone() {
            Some(settings) => settings,
            None => self.profile.bind()?,
        };
        self.settings = Some(settings.clone());

        let generators_dir = self.recipe.generators_dir(&settings);
        let request = ResolveRequest {
            recipe: self.recipe.name(),
            requirements: self.recipe.active_requirements().collect(),
            settings: &settings,
            generators: self.recipe.generators(),
            output_dir: &generators_dir,
        };
        info!(
            "{}: resolving [{}]",
            self.recipe.name(),
            request.references().join(", ")
        );
        let resolution = self.resolver.resolve(&request)?;
        if resolution.generators_dir != generators_dir {
            return Err(ResolveError::ToolchainLocationMismatch {
                expected: generators_dir.display().to_string(),
                actual: resolution.generators_dir.display().to_string(),
            }
            .into());
        }
        self.verify_resolution(&request, &resolution)?;

        let build_dir = self.recipe.build_dir(&settings);
        let toolchain_file = resolution.generators_dir.join(TOOLCHAIN_FILE);
        let outcome = self.driver.configure(&ConfigureRequest {
            source_dir: self.recipe.source_dir(),
            build_dir: &build_dir,
            toolchain_file: &toolchain_file,
            settings: &settings,
            generator: self.recipe.cmake_generator(),
        })?;
        if !outcome.success {
            return Err(BuildError::ConfigureFailed {
                diagnostics: outcome.diagnostics,
            }
            .into());
        }

        let toolchain =
            ToolchainState::capture(&resolution.generators_dir).map_err(ResolveError::Io)?;
        debug!(
            "{}: toolchain fingerprint {}",
            self.recipe.name(),
            toolchain.fingerprint()
        );
        self.resolution = Some(resolution);
        self.toolchain = Some(toolchain);
        self.last_output = Some(outcome);
        Ok(())
    }

    /// Every active requirement must be in the graph at its pinned version,
    /// and every generator must have left its output behind.
    fn verify_resolution(
        &self,
        request: &ResolveRequest<'_>,
        resolution: &Resolution,
    ) -> Result<(), ResolveError> {
        for req in &request.requirements {
            match resolution.find(&req.name) {
                None => {
                    return Err(ResolveError::Unresolved {
                        reference: req.reference(),
                        diagnostics: format!(
                            "'{}' is missing from the resolved dependency graph",
                            req.reference()
                        ),
                    });
                }
                Some(pkg) if pkg.version != req.version => {
                    return Err(ResolveError::ResolutionFailed {
                        diagnostics: format!(
                            "'{}' resolved to version {} instead of {}",
                            req.name, pkg.version, req.version
                        ),
                    });
                }
                Some(_) => {}
            }
        }

        let has_requirements = !request.requirements.is_empty();
        for generator in request.generators {
            if !generator.has_output(&resolution.generators_dir, has_requirements) {
                return Err(ResolveError::GeneratorOutputMissing {
                    generator: generator.name().to_string(),
                    dir: resolution.generators_dir.display().to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn build(&mut self) -> Result<()> {
        match self.state {
            BuildState::Configured => {}
            BuildState::Unconfigured => return Err(UsageError::NotConfigured.into()),
            BuildState::Built => return Err(UsageError::AlreadyBuilt.into()),
            BuildState::Failed(_) => return Err(UsageError::AlreadyFailed.into()),
        }
        // Always bound once Configured has been entered.
        let Some(settings) = self.settings.clone() else {
            return Err(UsageError::NotConfigured.into());
        };

        let build_dir = self.recipe.build_dir(&settings);
        info!("{}: building in {}", self.recipe.name(), build_dir.display());
        let result = self.driver.build(&BuildRequest {
            build_dir: &build_dir,
            settings: &settings,
            jobs: self.jobs,
        });

        match result {
            Ok(outcome) if outcome.success => {
                self.last_output = Some(outcome);
                self.enter(BuildState::Built);
                Ok(())
            }
            Ok(outcome) => {
                self.enter(BuildState::Failed(Phase::Build));
                Err(BuildError::BuildFailed {
                    diagnostics: outcome.diagnostics,
                }
                .into())
            }
            Err(e) => {
                self.enter(BuildState::Failed(Phase::Build));
                Err(e.into())
            }
        }
    }

    /// Configure followed by build.
    pub fn run(&mut self) -> Result<()> {
        self.configure()?;
        self.build()
    }
}
