use std::{collections::BTreeMap, fmt::Display, str::FromStr, sync::OnceLock};

use log::trace;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SEPARATOR: char = ':';
const NAME_PATTERN: &str = r#"^[^/\\:<>"?*|]+$"#;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectPathError {
    #[error("Project path must not be empty")]
    Empty,
    #[error("Project path `{path}` contains an empty segment")]
    EmptySegment { path: String },
    #[error("Project path `{path}` contains an invalid project name `{segment}`")]
    InvalidName { path: String, segment: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Project with path '{path}' could not be found in project '{from}'")]
pub struct ProjectNotFoundError {
    pub path: String,
    pub from: ProjectPath,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectError {
    #[error(transparent)]
    Path(#[from] ProjectPathError),
    #[error(transparent)]
    NotFound(#[from] ProjectNotFoundError),
}

/// Absolute, colon separated location of a project in the build, `:` being the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectPath {
    segments: Vec<String>,
}

impl ProjectPath {
    pub fn root() -> ProjectPath {
        ProjectPath::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment of the path, `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn parent(&self) -> Option<ProjectPath> {
        let (_, parent) = self.segments.split_last()?;
        Some(ProjectPath {
            segments: parent.to_vec(),
        })
    }

    /// Resolves `path` against this path. Paths starting with `:` are absolute,
    /// everything else is relative to `self`.
    pub fn resolve(&self, path: &str) -> Result<ProjectPath, ProjectPathError> {
        if path.is_empty() {
            return Err(ProjectPathError::Empty);
        }
        let (mut resolved, relative) = match path.strip_prefix(SEPARATOR) {
            Some(rest) => (ProjectPath::root(), rest),
            None => (self.clone(), path),
        };
        if relative.is_empty() {
            return Ok(resolved);
        }
        for segment in relative.split(SEPARATOR) {
            if segment.is_empty() {
                return Err(ProjectPathError::EmptySegment {
                    path: path.to_owned(),
                });
            }
            if !valid_project_name(segment) {
                return Err(ProjectPathError::InvalidName {
                    path: path.to_owned(),
                    segment: segment.to_owned(),
                });
            }
            resolved.segments.push(segment.to_owned());
        }
        trace!(
            "Resolved project path {} against {} to {}",
            path,
            self,
            resolved
        );
        Ok(resolved)
    }

    /// Every ancestor of this path from the root down, excluding the path itself.
    pub fn ancestors(&self) -> impl Iterator<Item = ProjectPath> + '_ {
        (0..self.segments.len()).map(|len| ProjectPath {
            segments: self.segments[..len].to_vec(),
        })
    }
}

fn valid_project_name(segment: &str) -> bool {
    static NAME: OnceLock<Regex> = OnceLock::new();
    let pattern = NAME.get_or_init(|| Regex::new(NAME_PATTERN).unwrap());
    pattern.is_match(segment) && segment.trim() == segment
}

impl FromStr for ProjectPath {
    type Err = ProjectPathError;

    /// Parses an absolute path. Relative paths are resolved against the root.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectPath::root().resolve(s)
    }
}

impl TryFrom<String> for ProjectPath {
    type Error = ProjectPathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ProjectPath> for String {
    fn from(path: ProjectPath) -> Self {
        path.to_string()
    }
}

impl Display for ProjectPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_root() {
            return f.write_str(":");
        }
        for segment in &self.segments {
            write!(f, ":{}", segment)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Project {
    pub path: ProjectPath,
    pub name: String,
    pub group: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub version: Option<String>,
}

/// All projects of one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRegistry {
    projects: BTreeMap<ProjectPath, Project>,
}

impl ProjectRegistry {
    /// Creates a registry holding only the root project.
    pub fn new(
        root_name: impl Into<String>,
        group: Option<String>,
        version: Option<String>,
    ) -> Self {
        let root = Project {
            path: ProjectPath::root(),
            name: root_name.into(),
            group: group.unwrap_or_default(),
            version,
        };
        ProjectRegistry {
            projects: BTreeMap::from([(ProjectPath::root(), root)]),
        }
    }

    pub fn root(&self) -> &Project {
        &self.projects[&ProjectPath::root()]
    }

    /// Registers `path` and any missing ancestors, inheriting group and version from the root.
    pub fn add(&mut self, path: ProjectPath) -> &Project {
        let root = self.root().clone();
        for ancestor in path.ancestors().chain(std::iter::once(path.clone())) {
            self.projects
                .entry(ancestor.clone())
                .or_insert_with(|| Project {
                    name: ancestor.name().unwrap_or(&root.name).to_owned(),
                    path: ancestor,
                    group: root.group.clone(),
                    version: root.version.clone(),
                });
        }
        &self.projects[&path]
    }

    /// Registers `project`, replacing any project at the same path. Missing ancestors are added.
    pub fn insert(&mut self, project: Project) {
        if let Some(parent) = project.path.parent() {
            self.add(parent);
        }
        self.projects.insert(project.path.clone(), project);
    }

    pub fn get(&self, path: &ProjectPath) -> Option<&Project> {
        self.projects.get(path)
    }

    /// Resolves a raw absolute or relative `path` as seen from project `from`.
    pub fn resolve(&self, from: &ProjectPath, path: &str) -> Result<&Project, ProjectError> {
        let resolved = from.resolve(path)?;
        self.projects.get(&resolved).ok_or_else(|| {
            ProjectNotFoundError {
                path: path.to_owned(),
                from: from.clone(),
            }
            .into()
        })
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }
}
