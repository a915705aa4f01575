use super::{Resolution, ResolveRequest, ResolvedPackage, Resolver};
use crate::error::ResolveError;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::process::Command;
use std::sync::LazyLock;
use tracing::{debug, info};

static NOT_FOUND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:Unable to find|Package) '([^'#@]+/[^'#@]+)[^']*'").expect("static regex")
});

/// Resolves requirements with `conan install`.
#[derive(Debug, Clone)]
pub struct ConanResolver {
    program: OsString,
    build_missing: bool,
}

impl Default for ConanResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConanResolver {
    /// Uses `$KILN_CONAN` when set, `conan` otherwise.
    pub fn new() -> Self {
        let program = std::env::var_os("KILN_CONAN").unwrap_or_else(|| OsString::from("conan"));
        Self {
            program,
            build_missing: true,
        }
    }

    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    /// Whether to pass `--build=missing` so absent binaries are built from source.
    pub fn build_missing(mut self, enabled: bool) -> Self {
        self.build_missing = enabled;
        self
    }

    pub fn install_args(&self, request: &ResolveRequest<'_>) -> Vec<String> {
        let mut args = vec!["install".to_string()];
        for reference in request.references() {
            args.push(format!("--requires={}", reference));
        }
        for generator in request.generators {
            args.push("-g".to_string());
            args.push(generator.name().to_string());
        }
        for (key, value) in request.settings.pairs() {
            args.push("-s".to_string());
            args.push(format!("{}={}", key, value));
        }
        args.push(format!("--output-folder={}", request.output_dir.display()));
        if self.build_missing {
            args.push("--build=missing".to_string());
        }
        args.push("--format=json".to_string());
        args
    }
}

impl Resolver for ConanResolver {
    fn resolve(&self, request: &ResolveRequest<'_>) -> Result<Resolution, ResolveError> {
        fs::create_dir_all(request.output_dir)?;

        let args = self.install_args(request);
        debug!("{} {}", self.program.to_string_lossy(), args.join(" "));
        info!(
            "resolving {} requirement(s) for {}",
            request.requirements.len(),
            request.recipe
        );

        let output = Command::new(&self.program).args(&args).output().map_err(|e| {
            ResolveError::ServiceUnavailable(format!(
                "failed to run '{}': {}",
                self.program.to_string_lossy(),
                e
            ))
        })?;

        if !output.status.success() {
            let diagnostics = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(classify_failure(request, diagnostics));
        }

        let packages = parse_graph(&String::from_utf8_lossy(&output.stdout))?;
        Ok(Resolution {
            packages,
            generators_dir: request.output_dir.to_path_buf(),
        })
    }
}

/// Names a requested reference as unresolved when the diagnostics point at one.
fn classify_failure(request: &ResolveRequest<'_>, diagnostics: String) -> ResolveError {
    let requested = request.references();
    let missing = NOT_FOUND
        .captures_iter(&diagnostics)
        .map(|c| c[1].to_string())
        .find(|r| requested.contains(r));

    match missing {
        Some(reference) => ResolveError::Unresolved {
            reference,
            diagnostics,
        },
        None => ResolveError::ResolutionFailed { diagnostics },
    }
}

#[derive(Deserialize)]
struct GraphOutput {
    graph: Graph,
}

#[derive(Deserialize)]
struct Graph {
    nodes: BTreeMap<String, Node>,
}

#[derive(Deserialize)]
struct Node {
    #[serde(rename = "ref", default)]
    reference: Option<String>,
}

/// Extracts packages from `conan install --format=json` output. Graph node
/// keys are numeric strings; they are visited in numeric order.
pub(crate) fn parse_graph(json: &str) -> Result<Vec<ResolvedPackage>, ResolveError> {
    let output: GraphOutput =
        serde_json::from_str(json).map_err(|e| ResolveError::MalformedGraph(e.to_string()))?;

    let mut nodes: Vec<(u64, Node)> = output
        .graph
        .nodes
        .into_iter()
        .map(|(id, node)| (id.parse().unwrap_or(u64::MAX), node))
        .collect();
    nodes.sort_by_key(|(id, _)| *id);

    let packages = nodes
        .into_iter()
        .filter_map(|(_, node)| node.reference)
        .filter_map(|reference| parse_node_ref(&reference))
        .collect();
    Ok(packages)
}

/// `name/version[@user/channel][#revision]`; the consumer node has no `/`.
fn parse_node_ref(reference: &str) -> Option<ResolvedPackage> {
    let (head, revision) = match reference.split_once('#') {
        Some((head, rev)) => (head, Some(rev.to_string())),
        None => (reference, None),
    };
    let head = head.split('@').next().unwrap_or(head);
    let (name, version) = head.split_once('/')?;
    if name.is_empty() || version.is_empty() {
        return None;
    }
    Some(ResolvedPackage {
        name: name.to_string(),
        version: version.to_string(),
        revision,
    })
}
