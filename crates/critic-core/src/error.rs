//! Error taxonomy for the critical path engine.
//!
//! Every fatal condition is a [`CriticError`] variant. Each variant maps to a
//! stable [`ErrorCode`] so the CLI can render a machine-readable code and a
//! remediation hint next to the human message.

use std::fmt;

use crate::module::Module;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    InvalidCoordinate,
    MalformedMapping,
    UnknownModuleName,
    InvalidDuration,
    InvalidDot,
    SelfLoop,
    CyclicDependencyGraph,
    MissingBuildDuration,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::InvalidCoordinate => "E2001",
            Self::MalformedMapping => "E2002",
            Self::UnknownModuleName => "E2003",
            Self::InvalidDuration => "E2004",
            Self::InvalidDot => "E3001",
            Self::SelfLoop => "E3002",
            Self::CyclicDependencyGraph => "E3003",
            Self::MissingBuildDuration => "E4001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidCoordinate => "Invalid module coordinates",
            Self::MalformedMapping => "Malformed artifact mapping",
            Self::UnknownModuleName => "Unknown module name in build log",
            Self::InvalidDuration => "Unsupported build duration",
            Self::InvalidDot => "Invalid dependency graph",
            Self::SelfLoop => "Module depends on itself",
            Self::CyclicDependencyGraph => "Dependency graph has a cycle",
            Self::MissingBuildDuration => "Missing build duration",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in critic.toml and retry."),
            Self::InvalidCoordinate => Some("Use coordinates of the form groupId:artifactId."),
            Self::MalformedMapping => {
                Some("Every line of the artifact mapping needs two columns: name,coordinate.")
            }
            Self::UnknownModuleName => {
                Some("Add the module's project name and coordinates to the artifact mapping.")
            }
            Self::InvalidDuration => {
                Some("Only 'MM:SS min' and 'S.sss s' reactor durations are supported.")
            }
            Self::InvalidDot => Some("Regenerate the graph with depgraph-maven-plugin."),
            Self::SelfLoop | Self::CyclicDependencyGraph => {
                Some("Maven reactors are acyclic; check the graph was not edited by hand.")
            }
            Self::MissingBuildDuration => Some(
                "Make sure the build log and artifact mapping cover every module in the graph.",
            ),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Fatal conditions raised while assembling or solving the build graph.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CriticError {
    #[error("failed to parse config: {0}")]
    ConfigParse(String),

    #[error("coordinates need at least 2 components '{0}' has less")]
    InvalidCoordinate(String),

    #[error("artifact mapping line {line} needs 2 columns: '{content}'")]
    MalformedMapping { line: usize, content: String },

    #[error("cannot find maven project coordinates for given name '{0}'")]
    UnknownModuleName(String),

    #[error("cannot parse build duration '{duration}' of module '{name}'")]
    InvalidDuration { name: String, duration: String },

    #[error("invalid DOT input at line {line}: {reason}")]
    InvalidDot { line: usize, reason: String },

    #[error("module '{0}' depends on itself")]
    SelfLoop(String),

    #[error("dependency graph contains a cycle through '{0}'")]
    CyclicDependencyGraph(String),

    #[error(
        "no build duration in reactor summary for modules found in dependency graph [{}]",
        format_modules(.0)
    )]
    MissingBuildDuration(Vec<Module>),
}

impl CriticError {
    /// The stable code for this error.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::ConfigParse(_) => ErrorCode::ConfigParseError,
            Self::InvalidCoordinate(_) => ErrorCode::InvalidCoordinate,
            Self::MalformedMapping { .. } => ErrorCode::MalformedMapping,
            Self::UnknownModuleName(_) => ErrorCode::UnknownModuleName,
            Self::InvalidDuration { .. } => ErrorCode::InvalidDuration,
            Self::InvalidDot { .. } => ErrorCode::InvalidDot,
            Self::SelfLoop(_) => ErrorCode::SelfLoop,
            Self::CyclicDependencyGraph(_) => ErrorCode::CyclicDependencyGraph,
            Self::MissingBuildDuration(_) => ErrorCode::MissingBuildDuration,
        }
    }

    /// Remediation hint, falling back to the code's summary.
    #[must_use]
    pub fn suggestion(&self) -> String {
        let code = self.error_code();
        code.hint().unwrap_or(code.message()).to_string()
    }
}

fn format_modules(modules: &[Module]) -> String {
    modules
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
