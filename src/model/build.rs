use std::path::Path;

use log::{debug, error};
use toml::{Table, Value};

use crate::{
    api::{Dependencies, DependencyError},
    fixtures::TestFixturesDependencyModifiers,
    model::{
        dependency::{DeclaredDependency, DependencyNotation},
        project::{Project, ProjectPath, ProjectRegistry},
        ParseError,
    },
};

/// A build: its root project coordinates and what every project depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDescriptor {
    pub name: String,
    pub group: Option<String>,
    pub version: Option<String>,
    pub projects: Vec<ProjectDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDescriptor {
    pub path: ProjectPath,
    pub group: Option<String>,
    pub version: Option<String>,
    pub dependencies: Vec<DeclarationEntry>,
}

/// One dependency declaration as written in the build file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationEntry {
    pub notation: EntryNotation,
    pub test_fixtures: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryNotation {
    Text(String),
    Coordinates {
        group: Option<String>,
        name: String,
        version: Option<String>,
    },
    /// Absolute or relative to the declaring project.
    Project(String),
}

impl DeclarationEntry {
    /// Declares this entry in the context of `dependencies`.
    pub fn declare(
        &self,
        dependencies: &Dependencies,
    ) -> Result<DeclaredDependency, DependencyError> {
        let notation = match &self.notation {
            EntryNotation::Text(text) => DependencyNotation::Text(text.clone()),
            EntryNotation::Coordinates {
                group,
                name,
                version,
            } => DependencyNotation::Coordinates {
                group: group.clone(),
                name: name.clone(),
                version: version.clone(),
            },
            EntryNotation::Project(path) => dependencies.project(path)?.into(),
        };
        if self.test_fixtures {
            dependencies.test_fixtures(notation)
        } else {
            dependencies.declare(notation)
        }
    }
}

impl BuildDescriptor {
    pub fn from_file(path: &Path) -> Result<BuildDescriptor, ParseError> {
        debug!(
            "Attempting to read build descriptor from {}",
            path.display()
        );
        let contents = std::fs::read_to_string(path)?;

        let descriptor = BuildDescriptor::from_toml_str(&contents);
        if let Err(err) = &descriptor {
            error!(
                "Could not build a valid build descriptor from {} due to err {err}",
                path.display()
            )
        }
        descriptor
    }

    pub fn from_toml_str(data: &str) -> Result<BuildDescriptor, ParseError> {
        let mut toml_value = toml::from_str::<Table>(data)?;

        let name = toml_value
            .remove("name")
            .ok_or_else(|| ParseError::MissingKey("name".to_string()))
            .and_then(|v| v.try_into::<String>().map_err(|e| e.into()))?;

        let group = optional_string(&mut toml_value, "group")?;
        let version = optional_string(&mut toml_value, "version")?;

        let projects = match toml_value.remove("projects") {
            None => vec![],
            Some(Value::Table(projects)) => projects
                .into_iter()
                .map(|(path, value)| parse_project(&path, value))
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err(ParseError::InvalidValue("projects".to_string())),
        };

        if let Some(key) = toml_value.keys().next() {
            return Err(ParseError::UnknownKey(key.clone()));
        }

        Ok(BuildDescriptor {
            name,
            group,
            version,
            projects,
        })
    }

    /// Every project of the build, including implicit parents of declared projects.
    pub fn registry(&self) -> ProjectRegistry {
        let mut registry =
            ProjectRegistry::new(self.name.clone(), self.group.clone(), self.version.clone());
        for project in &self.projects {
            let defaults = registry.add(project.path.clone()).clone();
            registry.insert(Project {
                group: project.group.clone().unwrap_or(defaults.group),
                version: project.version.clone().or(defaults.version),
                ..defaults
            });
        }
        registry
    }

    pub fn project(&self, path: &ProjectPath) -> Option<&ProjectDescriptor> {
        self.projects.iter().find(|p| &p.path == path)
    }
}

fn optional_string(table: &mut Table, key: &str) -> Result<Option<String>, ParseError> {
    Ok(table
        .remove(key)
        .map(|v| v.try_into::<String>())
        .map_or(Ok(None), |v| v.map(Some))?)
}

fn parse_project(path: &str, value: Value) -> Result<ProjectDescriptor, ParseError> {
    let path = path.parse::<ProjectPath>()?;
    let mut table = match value {
        Value::Table(table) => table,
        _ => return Err(ParseError::InvalidValue(path.to_string())),
    };

    let group = optional_string(&mut table, "group")?;
    let version = optional_string(&mut table, "version")?;

    let dependencies = match table.remove("dependencies") {
        None => vec![],
        Some(Value::Array(entries)) => entries
            .into_iter()
            .map(parse_entry)
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(ParseError::InvalidValue(format!("{path}.dependencies"))),
    };

    if let Some(key) = table.keys().next() {
        return Err(ParseError::UnknownKey(format!("{path}.{key}")));
    }

    Ok(ProjectDescriptor {
        path,
        group,
        version,
        dependencies,
    })
}

fn parse_entry(value: Value) -> Result<DeclarationEntry, ParseError> {
    let description = value.to_string();
    let mut table = match value {
        Value::String(text) => {
            return Ok(DeclarationEntry {
                notation: EntryNotation::Text(text),
                test_fixtures: false,
            });
        }
        Value::Table(table) => table,
        _ => return Err(ParseError::InvalidDependency(description)),
    };

    let test_fixtures = table
        .remove("test_fixtures")
        .map(|v| v.try_into::<bool>())
        .transpose()?
        .unwrap_or(false);
    let text = optional_string(&mut table, "notation")?;
    let project = optional_string(&mut table, "project")?;
    let name = optional_string(&mut table, "name")?;
    let group = optional_string(&mut table, "group")?;
    let version = optional_string(&mut table, "version")?;

    if let Some(key) = table.keys().next() {
        return Err(ParseError::UnknownKey(key.clone()));
    }

    // `group` and `version` only qualify a `name`.
    let has_coordinates = group.is_some() || version.is_some();
    let notation = match (text, project, name) {
        (Some(text), None, None) if !has_coordinates => EntryNotation::Text(text),
        (None, Some(path), None) if !has_coordinates => EntryNotation::Project(path),
        (None, None, Some(name)) => EntryNotation::Coordinates {
            group,
            name,
            version,
        },
        _ => return Err(ParseError::InvalidDependency(description)),
    };

    Ok(DeclarationEntry {
        notation,
        test_fixtures,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::model::{
        capability::Capability,
        dependency::{Dependency, ExternalModuleDependency, ProjectTestFixtures},
    };

    use super::*;

    use pretty_assertions::assert_eq;

    const BUILD: &str = r#"
        name = "shop"
        group = "com.example"
        version = "1.0"

        [projects.":app"]
            dependencies = [
                "com.example:mylib:1.0",
                { notation = "com.example:other:2.0", test_fixtures = true },
                { group = "org.junit", name = "junit-bom", version = "5.10.0" },
                { project = ":lib", test_fixtures = true },
            ]
        [projects.":lib"]
            version = "1.1"
    "#;

    fn path(s: &str) -> ProjectPath {
        s.parse().unwrap()
    }

    #[test]
    fn load_valid_build() {
        let expected = BuildDescriptor {
            name: "shop".to_owned(),
            group: Some("com.example".to_owned()),
            version: Some("1.0".to_owned()),
            projects: vec![
                ProjectDescriptor {
                    path: path(":app"),
                    group: None,
                    version: None,
                    dependencies: vec![
                        DeclarationEntry {
                            notation: EntryNotation::Text("com.example:mylib:1.0".to_owned()),
                            test_fixtures: false,
                        },
                        DeclarationEntry {
                            notation: EntryNotation::Text("com.example:other:2.0".to_owned()),
                            test_fixtures: true,
                        },
                        DeclarationEntry {
                            notation: EntryNotation::Coordinates {
                                group: Some("org.junit".to_owned()),
                                name: "junit-bom".to_owned(),
                                version: Some("5.10.0".to_owned()),
                            },
                            test_fixtures: false,
                        },
                        DeclarationEntry {
                            notation: EntryNotation::Project(":lib".to_owned()),
                            test_fixtures: true,
                        },
                    ],
                },
                ProjectDescriptor {
                    path: path(":lib"),
                    group: None,
                    version: Some("1.1".to_owned()),
                    dependencies: vec![],
                },
            ],
        };
        assert_eq!(BuildDescriptor::from_toml_str(BUILD).unwrap(), expected);
    }

    #[test]
    fn registry_inherits_root_coordinates() {
        let registry = BuildDescriptor::from_toml_str(BUILD).unwrap().registry();
        let lib = registry.get(&path(":lib")).unwrap();
        assert_eq!(lib.group, "com.example");
        assert_eq!(lib.version.as_deref(), Some("1.1"));
        let app = registry.get(&path(":app")).unwrap();
        assert_eq!(app.version.as_deref(), Some("1.0"));
    }

    #[test]
    fn declare_entries() {
        let build = BuildDescriptor::from_toml_str(BUILD).unwrap();
        let dependencies = Dependencies::builder()
            .registry(build.registry())
            .current_project(":app")
            .try_build()
            .unwrap();
        let declared = build
            .project(&path(":app"))
            .unwrap()
            .dependencies
            .iter()
            .map(|entry| -> anyhow::Result<Dependency> {
                Ok(entry.declare(&dependencies)?.realize()?)
            })
            .collect::<anyhow::Result<Vec<_>>>()
            .unwrap();

        assert_eq!(
            declared[0],
            Dependency::Module(ExternalModuleDependency::new(
                "com.example",
                "mylib",
                Some("1.0".to_owned())
            ))
        );
        assert_eq!(
            declared[1]
                .capabilities()
                .iter()
                .cloned()
                .collect::<Vec<_>>(),
            vec![Capability::test_fixtures_of("com.example", "other")]
        );
        assert!(declared[2].capabilities().is_empty());
        match &declared[3] {
            Dependency::Project(project) => assert!(project
                .test_fixtures
                .contains(&ProjectTestFixtures::new(path(":lib")))),
            other => panic!("unexpected dependency {other}"),
        }
    }

    #[test]
    fn load_missing_name() {
        let error = BuildDescriptor::from_toml_str("group = \"g\"").unwrap_err();
        assert!(matches!(
            error,
            ParseError::MissingKey(key) if key == "name"
        ));
    }

    #[test]
    fn load_invalid_entry() {
        let str = r#"
            name = "shop"
            [projects.":app"]
                dependencies = [{ version = "1.0" }]
        "#;
        assert!(matches!(
            BuildDescriptor::from_toml_str(str),
            Err(ParseError::InvalidDependency(_))
        ));
    }

    #[test]
    fn load_invalid_project_path() {
        let str = r#"
            name = "shop"
            [projects.":a::b"]
        "#;
        assert!(matches!(
            BuildDescriptor::from_toml_str(str),
            Err(ParseError::ProjectPath(_))
        ));
    }

    #[test]
    fn load_unknown_key() {
        let str = r#"
            name = "shop"
            plugins = []
        "#;
        assert!(matches!(
            BuildDescriptor::from_toml_str(str),
            Err(ParseError::UnknownKey(key)) if key == "plugins"
        ));
    }

    #[test]
    fn load_unknown_project_key() {
        let str = r#"
            name = "shop"
            [projects.":app"]
                dependecies = ["com.example:mylib:1.0"]
        "#;
        assert!(matches!(
            BuildDescriptor::from_toml_str(str),
            Err(ParseError::UnknownKey(key)) if key == ":app.dependecies"
        ));
    }

    #[test]
    fn load_unknown_entry_key() {
        let str = r#"
            name = "shop"
            [projects.":app"]
                dependencies = [{ notation = "g:n:1", test_fixture = true }]
        "#;
        assert!(matches!(
            BuildDescriptor::from_toml_str(str),
            Err(ParseError::UnknownKey(key)) if key == "test_fixture"
        ));
    }

    #[test]
    fn load_ambiguous_entry() {
        for entry in [
            r#"{ notation = "g:n:1", project = ":lib" }"#,
            r#"{ project = ":lib", name = "n" }"#,
            r#"{ notation = "g:n:1", version = "2" }"#,
        ] {
            let str = format!("name = \"shop\"\n[projects.\":app\"]\ndependencies = [{entry}]");
            assert!(
                matches!(
                    BuildDescriptor::from_toml_str(&str),
                    Err(ParseError::InvalidDependency(_))
                ),
                "{entry}"
            );
        }
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(BUILD.as_bytes()).unwrap();
        let descriptor = BuildDescriptor::from_file(file.path()).unwrap();
        assert_eq!(descriptor.projects.len(), 2);
    }
}
