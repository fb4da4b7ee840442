//! Maven modules and the registry that resolves them by coordinates.
//!
//! A [`Module`] is identified by its `groupId:artifactId` coordinates only.
//! The build duration is an attribute carried along for the ride: two modules
//! with the same coordinates are equal (and hash identically) whether or not
//! either has a duration. That lets a bare "query" module built from the
//! dependency graph fetch the duration-bearing module recorded from the
//! build log out of a [`ModuleRegistry`].

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use crate::duration::format_build_duration;
use crate::error::CriticError;

/// Coordinates of the synthetic vertex every build leaf connects to.
pub const ROOT_COORDINATES: &str = "root:root";

/// A buildable unit of a Maven reactor.
#[derive(Debug, Clone)]
pub struct Module {
    group_id: String,
    artifact_id: String,
    build_duration: Option<Duration>,
}

impl Module {
    /// Parse a bare module from `groupId:artifactId[:...]` coordinates.
    ///
    /// Components after the artifact id (packaging, version, scope) are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::InvalidCoordinate`] when fewer than two
    /// non-empty components are present.
    pub fn parse(coordinates: &str) -> Result<Self, CriticError> {
        let mut components = coordinates.split(':').map(str::trim);
        match (components.next(), components.next()) {
            (Some(group_id), Some(artifact_id))
                if !group_id.is_empty() && !artifact_id.is_empty() =>
            {
                Ok(Self {
                    group_id: group_id.to_string(),
                    artifact_id: artifact_id.to_string(),
                    build_duration: None,
                })
            }
            _ => Err(CriticError::InvalidCoordinate(coordinates.to_string())),
        }
    }

    /// Parse a module and attach its measured build duration.
    ///
    /// # Errors
    ///
    /// Same as [`Module::parse`].
    pub fn with_duration(coordinates: &str, build_duration: Duration) -> Result<Self, CriticError> {
        let mut module = Self::parse(coordinates)?;
        module.build_duration = Some(build_duration);
        Ok(module)
    }

    /// The synthetic root module standing for overall build completion.
    #[must_use]
    pub fn root() -> Self {
        Self {
            group_id: "root".to_string(),
            artifact_id: "root".to_string(),
            build_duration: None,
        }
    }

    #[must_use]
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    #[must_use]
    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    #[must_use]
    pub const fn build_duration(&self) -> Option<Duration> {
        self.build_duration
    }

    /// `groupId:artifactId`, without the duration.
    #[must_use]
    pub fn coordinates(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }

    /// Return `true` for the synthetic root module.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.coordinates() == ROOT_COORDINATES
    }
}

impl PartialEq for Module {
    fn eq(&self, other: &Self) -> bool {
        self.group_id == other.group_id && self.artifact_id == other.artifact_id
    }
}

impl Eq for Module {}

impl Hash for Module {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.group_id.hash(state);
        self.artifact_id.hash(state);
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)?;
        if let Some(duration) = self.build_duration {
            write!(f, "[{}]", format_build_duration(duration))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ModuleRegistry
// ---------------------------------------------------------------------------

/// Duration-bearing modules keyed by coordinates.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: HashSet<Module>,
}

impl ModuleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module, replacing any earlier entry with the same
    /// coordinates.
    pub fn insert(&mut self, module: Module) {
        self.modules.replace(module);
    }

    /// Look up the registered module equal to `query`.
    #[must_use]
    pub fn resolve(&self, query: &Module) -> Option<&Module> {
        self.modules.get(query)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter()
    }
}

impl FromIterator<Module> for ModuleRegistry {
    fn from_iter<I: IntoIterator<Item = Module>>(iter: I) -> Self {
        let mut registry = Self::new();
        for module in iter {
            registry.insert(module);
        }
        registry
    }
}
