use std::sync::Arc;

use crate::{
    factory::{DependencyFactory, ModuleNotationFactory},
    model::project::{ProjectPath, ProjectRegistry},
};

use super::{Dependencies, DependencyError};

const DEFAULT_ROOT_PROJECT_NAME: &str = "root";

#[derive(Default)]
pub struct DependenciesBuilder {
    registry: Option<ProjectRegistry>,
    current_project: Option<String>,
    factory: Option<Arc<dyn DependencyFactory>>,
}

impl DependenciesBuilder {
    /// Projects of the build.
    ///
    /// Defaults to a build with a single root project named `root`.
    pub fn registry(mut self, registry: ProjectRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Path of the project dependencies are declared in. Relative project
    /// paths are resolved against it.
    ///
    /// Defaults to the root project `:`.
    pub fn current_project(mut self, path: impl Into<String>) -> Self {
        self.current_project = Some(path.into());
        self
    }

    /// Factory used to parse notations.
    ///
    /// Defaults to [`ModuleNotationFactory`].
    pub fn factory(mut self, factory: impl DependencyFactory + 'static) -> Self {
        self.factory = Some(Arc::new(factory));
        self
    }

    pub fn try_build(self) -> Result<Dependencies, DependencyError> {
        let Self {
            registry,
            current_project,
            factory,
        } = self;

        let registry = match registry {
            Some(registry) => registry,
            None => ProjectRegistry::new(DEFAULT_ROOT_PROJECT_NAME, None, None),
        };

        let current = match current_project {
            Some(path) => registry.resolve(&ProjectPath::root(), &path)?.path.clone(),
            None => ProjectPath::root(),
        };

        let factory = factory.unwrap_or_else(|| Arc::new(ModuleNotationFactory));

        Ok(Dependencies {
            factory,
            registry: Arc::new(registry),
            current,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        factory::NotationParseError,
        model::{dependency::ExternalModuleDependency, project::ProjectNotFoundError},
    };

    use super::*;

    use pretty_assertions::assert_eq;

    struct FixedFactory;

    impl DependencyFactory for FixedFactory {
        fn create(&self, _notation: &str) -> Result<ExternalModuleDependency, NotationParseError> {
            Ok(ExternalModuleDependency::new("fixed", "fixed", None))
        }

        fn create_from_coordinates(
            &self,
            _group: Option<&str>,
            name: &str,
            _version: Option<&str>,
        ) -> Result<ExternalModuleDependency, NotationParseError> {
            Ok(ExternalModuleDependency::new("fixed", name, None))
        }
    }

    #[test]
    fn defaults() {
        let dependencies = DependenciesBuilder::default().try_build().unwrap();
        assert!(dependencies.current_project_path().is_root());
        assert_eq!(dependencies.registry().root().name, "root");
    }

    #[test]
    fn unknown_current_project() {
        let error = Dependencies::builder()
            .current_project(":missing")
            .try_build()
            .err()
            .unwrap();
        assert_eq!(
            error,
            DependencyError::ProjectNotFound(ProjectNotFoundError {
                path: ":missing".to_owned(),
                from: ProjectPath::root(),
            })
        );
    }

    #[test]
    fn custom_factory() {
        let dependencies = Dependencies::builder()
            .factory(FixedFactory)
            .try_build()
            .unwrap();
        let dependency = dependencies
            .dependency_factory()
            .create("anything")
            .unwrap();
        assert_eq!(dependency.group, "fixed");
    }
}
