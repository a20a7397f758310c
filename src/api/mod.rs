use std::sync::Arc;

use log::debug;
use thiserror::Error;

use crate::{
    factory::{DependencyFactory, NotationParseError},
    model::{
        dependency::{DeclaredDependency, Dependency, DependencyNotation, ProjectDependency},
        project::{
            ProjectError, ProjectNotFoundError, ProjectPath, ProjectPathError, ProjectRegistry,
        },
    },
};

mod builder;

pub use builder::DependenciesBuilder;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyError {
    #[error(transparent)]
    NotationParse(#[from] NotationParseError),
    #[error(transparent)]
    ProjectPath(#[from] ProjectPathError),
    #[error(transparent)]
    ProjectNotFound(#[from] ProjectNotFoundError),
}

impl From<ProjectError> for DependencyError {
    fn from(error: ProjectError) -> Self {
        match error {
            ProjectError::Path(error) => DependencyError::ProjectPath(error),
            ProjectError::NotFound(error) => DependencyError::ProjectNotFound(error),
        }
    }
}

/// Dependency APIs available to every dependency declaration of one project.
///
/// Cloning is cheap; clones share the factory and the project registry.
#[derive(Clone)]
pub struct Dependencies {
    factory: Arc<dyn DependencyFactory>,
    registry: Arc<ProjectRegistry>,
    current: ProjectPath,
}

impl Dependencies {
    pub fn builder() -> DependenciesBuilder {
        DependenciesBuilder::default()
    }

    /// The factory used to turn notations into dependencies.
    pub fn dependency_factory(&self) -> &dyn DependencyFactory {
        self.factory.as_ref()
    }

    pub fn registry(&self) -> &ProjectRegistry {
        &self.registry
    }

    pub fn current_project_path(&self) -> &ProjectPath {
        &self.current
    }

    /// Converts an absolute or relative (to the current project) colon separated
    /// path into a project dependency.
    pub fn project(&self, path: &str) -> Result<ProjectDependency, DependencyError> {
        let project = self.registry.resolve(&self.current, path)?;
        debug!("Resolved project {} from {}", project.path, self.current);
        Ok(ProjectDependency::new(project.path.clone()))
    }

    /// The current project as a dependency.
    pub fn current_project(&self) -> ProjectDependency {
        ProjectDependency::new(self.current.clone())
    }

    /// Normalizes any notation into a dependency.
    ///
    /// Lazy notations stay lazy: the returned provider normalizes the realized
    /// notation each time it is evaluated.
    pub fn declare(
        &self,
        notation: DependencyNotation,
    ) -> Result<DeclaredDependency, DependencyError> {
        let dependency: Dependency = match notation {
            DependencyNotation::Text(text) => self.factory.create(&text)?.into(),
            DependencyNotation::Coordinates {
                group,
                name,
                version,
            } => self
                .factory
                .create_from_coordinates(group.as_deref(), &name, version.as_deref())?
                .into(),
            DependencyNotation::Module(dependency) => dependency.into(),
            DependencyNotation::MinimalModule(dependency) => dependency.into(),
            DependencyNotation::Project(dependency) => dependency.into(),
            DependencyNotation::Lazy(provider) => {
                let dependencies = self.clone();
                let deferred = provider.try_map(move |notation| -> anyhow::Result<Dependency> {
                    dependencies.declare(notation)?.realize()
                });
                return Ok(DeclaredDependency::Deferred(deferred));
            }
        };
        Ok(DeclaredDependency::Resolved(dependency))
    }
}
