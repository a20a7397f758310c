//! Selecting the test fixtures variant of a dependency.
//!
//! Modules publish their test fixtures as a separate variant carrying the
//! capability `group:name-test-fixtures`. Requiring that capability on a
//! dependency makes the resolver pick the fixtures variant instead of the
//! default one. Project dependencies get a [`ProjectTestFixtures`] marker
//! instead, since the capability of a project is derived from the project.

use log::debug;

use crate::{
    api::{Dependencies, DependencyError},
    model::{
        capability::Capability,
        dependency::{
            DeclaredDependency, Dependency, DependencyNotation, ExternalModuleDependency,
            MinimalExternalModuleDependency, ModuleDependency, ProjectDependency,
            ProjectTestFixtures,
        },
    },
    provider::{Provider, ProviderConvertible},
};

/// Requires the test fixtures capability of the module itself.
///
/// Applying this more than once leaves a single requirement.
pub fn module_with_test_fixtures<D: ModuleDependency>(mut dependency: D) -> D {
    let capability = Capability::test_fixtures_of(dependency.group(), dependency.name());
    debug!(
        "Requiring capability {} on {}:{}",
        capability,
        dependency.group(),
        dependency.name()
    );
    dependency
        .capabilities_mut()
        .require_capability(capability);
    dependency
}

/// Marks a project dependency as targeting the fixtures of that same project.
pub fn project_with_test_fixtures(mut dependency: ProjectDependency) -> ProjectDependency {
    debug!("Requiring test fixtures of project {}", dependency.project);
    let fixtures = ProjectTestFixtures::new(dependency.project.clone());
    dependency.require_project_fixtures(fixtures);
    dependency
}

pub fn with_test_fixtures(dependency: Dependency) -> Dependency {
    match dependency {
        Dependency::Module(dependency) => Dependency::Module(module_with_test_fixtures(dependency)),
        Dependency::MinimalModule(dependency) => {
            Dependency::MinimalModule(module_with_test_fixtures(dependency))
        }
        Dependency::Project(dependency) => {
            Dependency::Project(project_with_test_fixtures(dependency))
        }
    }
}

/// Dependency APIs for using test fixtures in dependency declarations.
pub trait TestFixturesDependencyModifiers {
    fn dependencies(&self) -> &Dependencies;

    /// Creates a module dependency from `notation` and selects its test fixtures.
    fn test_fixtures_notation(
        &self,
        notation: &str,
    ) -> Result<ExternalModuleDependency, DependencyError> {
        let dependency = self.dependencies().dependency_factory().create(notation)?;
        Ok(module_with_test_fixtures(dependency))
    }

    fn test_fixtures_coordinates(
        &self,
        group: Option<&str>,
        name: &str,
        version: Option<&str>,
    ) -> Result<ExternalModuleDependency, DependencyError> {
        let dependency = self
            .dependencies()
            .dependency_factory()
            .create_from_coordinates(group, name, version)?;
        Ok(module_with_test_fixtures(dependency))
    }

    fn test_fixtures_module(
        &self,
        dependency: ExternalModuleDependency,
    ) -> ExternalModuleDependency {
        module_with_test_fixtures(dependency)
    }

    fn test_fixtures_minimal(
        &self,
        dependency: MinimalExternalModuleDependency,
    ) -> MinimalExternalModuleDependency {
        module_with_test_fixtures(dependency)
    }

    fn test_fixtures_project(&self, dependency: ProjectDependency) -> ProjectDependency {
        project_with_test_fixtures(dependency)
    }

    /// Derives a provider of the fixtures variant. The source is not evaluated.
    fn test_fixtures_provider(
        &self,
        dependency: &Provider<ExternalModuleDependency>,
    ) -> Provider<ExternalModuleDependency> {
        dependency.map(module_with_test_fixtures)
    }

    fn test_fixtures_convertible<C>(
        &self,
        dependency: &C,
    ) -> Provider<MinimalExternalModuleDependency>
    where
        C: ProviderConvertible<MinimalExternalModuleDependency>,
        Self: Sized,
    {
        dependency.as_provider().map(module_with_test_fixtures)
    }

    /// Normalizes any notation and selects its test fixtures.
    fn test_fixtures(
        &self,
        notation: DependencyNotation,
    ) -> Result<DeclaredDependency, DependencyError> {
        Ok(match self.dependencies().declare(notation)? {
            DeclaredDependency::Resolved(dependency) => {
                DeclaredDependency::Resolved(with_test_fixtures(dependency))
            }
            DeclaredDependency::Deferred(provider) => {
                DeclaredDependency::Deferred(provider.map(with_test_fixtures))
            }
        })
    }
}

impl TestFixturesDependencyModifiers for Dependencies {
    fn dependencies(&self) -> &Dependencies {
        self
    }
}
