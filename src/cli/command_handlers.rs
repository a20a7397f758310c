use log::{debug, info};
use serde::Serialize;

use crate::{
    fixtures::TestFixturesDependencyModifiers,
    model::{
        build::{BuildDescriptor, ProjectDescriptor},
        dependency::{Dependency, DependencyNotation},
        project::{ProjectPath, ProjectRegistry},
    },
    Dependencies,
};
use std::{error::Error, path::Path};

pub const DEFAULT_BUILD_FILE_NAME: &str = "build.toml";

#[derive(Debug, Serialize)]
struct ResolvedBuild {
    projects: Vec<ResolvedProject>,
}

#[derive(Debug, Serialize)]
struct ResolvedProject {
    path: ProjectPath,
    dependencies: Vec<Dependency>,
}

/// Handler to resolve command
/// Loads the build descriptor and normalizes the declarations of one or every project
pub fn do_resolve(build_file: &Path, project: Option<&str>) -> Result<String, Box<dyn Error>> {
    let descriptor = BuildDescriptor::from_file(build_file)?;
    let registry = descriptor.registry();

    let selected: Vec<&ProjectDescriptor> = match project {
        Some(path) => {
            let path = registry.resolve(&ProjectPath::root(), path)?.path.clone();
            match descriptor.project(&path) {
                Some(project) => vec![project],
                None => {
                    info!("Project {} declares no dependencies", path);
                    vec![]
                }
            }
        }
        None => descriptor.projects.iter().collect(),
    };

    let projects = selected
        .into_iter()
        .map(|project| resolve_project(&registry, project))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(toml::to_string_pretty(&ResolvedBuild { projects })?)
}

fn resolve_project(
    registry: &ProjectRegistry,
    project: &ProjectDescriptor,
) -> Result<ResolvedProject, Box<dyn Error>> {
    debug!("Resolving dependencies of project {}", project.path);
    let dependencies = Dependencies::builder()
        .registry(registry.clone())
        .current_project(project.path.to_string())
        .try_build()?;

    let resolved = project
        .dependencies
        .iter()
        .map(|entry| -> Result<Dependency, Box<dyn Error>> {
            Ok(entry.declare(&dependencies)?.realize()?)
        })
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        "Resolved {} dependencies of project {}",
        resolved.len(),
        project.path
    );
    Ok(ResolvedProject {
        path: dependencies.current_project_path().clone(),
        dependencies: resolved,
    })
}

/// Handler to notation command
pub fn do_notation(notation: &str, test_fixtures: bool) -> Result<String, Box<dyn Error>> {
    let dependencies = Dependencies::builder().try_build()?;
    let notation = DependencyNotation::from(notation);
    let declared = if test_fixtures {
        dependencies.test_fixtures(notation)?
    } else {
        dependencies.declare(notation)?
    };
    Ok(toml::to_string_pretty(&declared.realize()?)?)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    use pretty_assertions::assert_eq;

    fn build_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const BUILD: &str = r#"
        name = "shop"
        group = "com.example"

        [projects.":app"]
            dependencies = [
                { notation = "com.example:mylib:1.0", test_fixtures = true },
                { project = ":lib" },
            ]
        [projects.":lib"]
            dependencies = ["org.slf4j:slf4j-api:2.0.9"]
    "#;

    #[test]
    fn resolve_single_project() {
        let file = build_file(BUILD);
        let output = do_resolve(file.path(), Some(":app")).unwrap();
        let parsed = toml::from_str::<toml::Table>(&output).unwrap();
        let expected = toml::from_str::<toml::Table>(
            r#"
            [[projects]]
            path = ":app"

            [[projects.dependencies]]
            kind = "module"
            group = "com.example"
            name = "mylib"
            version = "1.0"

            [[projects.dependencies.capabilities]]
            group = "com.example"
            name = "mylib-test-fixtures"

            [[projects.dependencies]]
            kind = "project"
            project = ":lib"
            "#,
        )
        .unwrap();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn resolve_every_project() {
        let file = build_file(BUILD);
        let output = do_resolve(file.path(), None).unwrap();
        let parsed = toml::from_str::<toml::Table>(&output).unwrap();
        assert_eq!(parsed["projects"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn resolve_unknown_project() {
        let file = build_file(BUILD);
        assert!(do_resolve(file.path(), Some(":missing")).is_err());
    }

    #[test]
    fn notation_with_test_fixtures() {
        let output = do_notation("com.example:mylib:1.0", true).unwrap();
        assert!(output.contains("mylib-test-fixtures"));
        assert!(do_notation("com.example", false).is_err());
    }
}
