use std::{collections::BTreeSet, fmt::Display};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::provider::Provider;

use super::{
    capability::{Capability, CapabilitySet, TEST_FIXTURES_CAPABILITY_APPENDIX},
    project::{Project, ProjectPath, ProjectRegistry},
};

/// Read and write access shared by both flavours of external module dependency.
pub trait ModuleDependency {
    fn group(&self) -> &str;
    fn name(&self) -> &str;
    fn version(&self) -> Option<&str>;
    fn capabilities(&self) -> &CapabilitySet;
    fn capabilities_mut(&mut self) -> &mut CapabilitySet;
}

/// Selects a single artifact of a module instead of its default one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyArtifact {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub classifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub extension: Option<String>,
}

fn is_true(value: &bool) -> bool {
    *value
}

fn default_true() -> bool {
    true
}

/// A dependency on a published module, as created from a notation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalModuleDependency {
    pub group: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub artifact: Option<DependencyArtifact>,
    #[serde(skip_serializing_if = "is_true", default = "default_true")]
    pub transitive: bool,
    #[serde(skip_serializing_if = "CapabilitySet::is_empty", default)]
    pub capabilities: CapabilitySet,
}

impl ExternalModuleDependency {
    /// `group` may be empty when the module has no group.
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        version: Option<String>,
    ) -> Self {
        ExternalModuleDependency {
            group: group.into(),
            name: name.into(),
            version,
            artifact: None,
            transitive: true,
            capabilities: CapabilitySet::new(),
        }
    }
}

/// A module dependency carrying only coordinates and capabilities, as found in version catalogs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimalExternalModuleDependency {
    pub group: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "CapabilitySet::is_empty", default)]
    pub capabilities: CapabilitySet,
}

impl MinimalExternalModuleDependency {
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        version: Option<String>,
    ) -> Self {
        MinimalExternalModuleDependency {
            group: group.into(),
            name: name.into(),
            version,
            capabilities: CapabilitySet::new(),
        }
    }
}

impl From<MinimalExternalModuleDependency> for ExternalModuleDependency {
    fn from(minimal: MinimalExternalModuleDependency) -> Self {
        ExternalModuleDependency {
            capabilities: minimal.capabilities,
            ..ExternalModuleDependency::new(minimal.group, minimal.name, minimal.version)
        }
    }
}

macro_rules! module_dependency {
    ($ty:ty) => {
        impl ModuleDependency for $ty {
            fn group(&self) -> &str {
                &self.group
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn version(&self) -> Option<&str> {
                self.version.as_deref()
            }

            fn capabilities(&self) -> &CapabilitySet {
                &self.capabilities
            }

            fn capabilities_mut(&mut self) -> &mut CapabilitySet {
                &mut self.capabilities
            }
        }

        impl Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}:{}", self.group, self.name)?;
                if let Some(version) = &self.version {
                    write!(f, ":{}", version)?;
                }
                Ok(())
            }
        }
    };
}

module_dependency!(ExternalModuleDependency);
module_dependency!(MinimalExternalModuleDependency);

/// Requests the test fixtures variant of a project. Identity is the project itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectTestFixtures {
    pub project: ProjectPath,
}

impl ProjectTestFixtures {
    pub fn new(project: ProjectPath) -> Self {
        ProjectTestFixtures { project }
    }

    /// The capability the fixtures variant of `project` publishes.
    pub fn to_capability(&self, project: &Project) -> Capability {
        Capability::new(
            project.group.clone(),
            format!("{}{}", project.name, TEST_FIXTURES_CAPABILITY_APPENDIX),
            project.version.clone(),
        )
    }
}

/// A dependency on another project of the same build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDependency {
    pub project: ProjectPath,
    #[serde(skip_serializing_if = "CapabilitySet::is_empty", default)]
    pub capabilities: CapabilitySet,
    #[serde(skip_serializing_if = "BTreeSet::is_empty", default)]
    pub test_fixtures: BTreeSet<ProjectTestFixtures>,
}

impl ProjectDependency {
    pub fn new(project: ProjectPath) -> Self {
        ProjectDependency {
            project,
            capabilities: CapabilitySet::new(),
            test_fixtures: BTreeSet::new(),
        }
    }

    /// Returns whether the marker was not already present.
    pub fn require_project_fixtures(&mut self, fixtures: ProjectTestFixtures) -> bool {
        self.test_fixtures.insert(fixtures)
    }

    /// Explicit capabilities followed by the ones derived from fixtures markers.
    /// Markers for projects unknown to `registry` are skipped.
    pub fn resolved_capabilities(&self, registry: &ProjectRegistry) -> CapabilitySet {
        let derived = self
            .test_fixtures
            .iter()
            .filter_map(|fixtures| match registry.get(&fixtures.project) {
                Some(project) => Some(fixtures.to_capability(project)),
                None => {
                    debug!(
                        "Skipping test fixtures of {}, the project is not registered",
                        fixtures.project
                    );
                    None
                }
            });
        self.capabilities.iter().cloned().chain(derived).collect()
    }
}

impl Display for ProjectDependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "project '{}'", self.project)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Dependency {
    Module(ExternalModuleDependency),
    MinimalModule(MinimalExternalModuleDependency),
    Project(ProjectDependency),
}

impl Dependency {
    pub fn capabilities(&self) -> &CapabilitySet {
        match self {
            Dependency::Module(dependency) => &dependency.capabilities,
            Dependency::MinimalModule(dependency) => &dependency.capabilities,
            Dependency::Project(dependency) => &dependency.capabilities,
        }
    }
}

impl Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dependency::Module(dependency) => Display::fmt(dependency, f),
            Dependency::MinimalModule(dependency) => Display::fmt(dependency, f),
            Dependency::Project(dependency) => Display::fmt(dependency, f),
        }
    }
}

impl From<ExternalModuleDependency> for Dependency {
    fn from(dependency: ExternalModuleDependency) -> Self {
        Dependency::Module(dependency)
    }
}

impl From<MinimalExternalModuleDependency> for Dependency {
    fn from(dependency: MinimalExternalModuleDependency) -> Self {
        Dependency::MinimalModule(dependency)
    }
}

impl From<ProjectDependency> for Dependency {
    fn from(dependency: ProjectDependency) -> Self {
        Dependency::Project(dependency)
    }
}

/// Every shape a dependency can be declared with.
#[derive(Debug, Clone)]
pub enum DependencyNotation {
    /// `group:name[:version[:classifier]][@extension]`
    Text(String),
    Coordinates {
        group: Option<String>,
        name: String,
        version: Option<String>,
    },
    Module(ExternalModuleDependency),
    MinimalModule(MinimalExternalModuleDependency),
    Project(ProjectDependency),
    Lazy(Provider<DependencyNotation>),
}

impl From<&str> for DependencyNotation {
    fn from(text: &str) -> Self {
        DependencyNotation::Text(text.to_owned())
    }
}

impl From<String> for DependencyNotation {
    fn from(text: String) -> Self {
        DependencyNotation::Text(text)
    }
}

impl From<Dependency> for DependencyNotation {
    fn from(dependency: Dependency) -> Self {
        match dependency {
            Dependency::Module(dependency) => DependencyNotation::Module(dependency),
            Dependency::MinimalModule(dependency) => DependencyNotation::MinimalModule(dependency),
            Dependency::Project(dependency) => DependencyNotation::Project(dependency),
        }
    }
}

impl From<ExternalModuleDependency> for DependencyNotation {
    fn from(dependency: ExternalModuleDependency) -> Self {
        DependencyNotation::Module(dependency)
    }
}

impl From<MinimalExternalModuleDependency> for DependencyNotation {
    fn from(dependency: MinimalExternalModuleDependency) -> Self {
        DependencyNotation::MinimalModule(dependency)
    }
}

impl From<ProjectDependency> for DependencyNotation {
    fn from(dependency: ProjectDependency) -> Self {
        DependencyNotation::Project(dependency)
    }
}

impl From<Provider<DependencyNotation>> for DependencyNotation {
    fn from(provider: Provider<DependencyNotation>) -> Self {
        DependencyNotation::Lazy(provider)
    }
}

/// The result of declaring a notation: a dependency now, or one realized on demand.
#[derive(Debug, Clone)]
pub enum DeclaredDependency {
    Resolved(Dependency),
    Deferred(Provider<Dependency>),
}

impl DeclaredDependency {
    /// Realizes the dependency, evaluating the provider if deferred.
    pub fn realize(&self) -> anyhow::Result<Dependency> {
        match self {
            DeclaredDependency::Resolved(dependency) => Ok(dependency.clone()),
            DeclaredDependency::Deferred(provider) => provider.get(),
        }
    }
}
