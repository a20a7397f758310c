use std::sync::OnceLock;

use log::trace;
use regex_lite::{Captures, Regex};
use thiserror::Error;

use crate::model::dependency::{DependencyArtifact, ExternalModuleDependency};

const EXPECTED_FORMAT: &str = "expected `group:name[:version[:classifier]][@extension]`";
const EMPTY_NAME: &str = "module name must not be empty";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid dependency notation `{notation}`: {reason}")]
pub struct NotationParseError {
    pub notation: String,
    pub reason: String,
}

impl NotationParseError {
    fn new(notation: impl Into<String>, reason: impl Into<String>) -> Self {
        NotationParseError {
            notation: notation.into(),
            reason: reason.into(),
        }
    }
}

/// Turns dependency notations into module dependencies.
pub trait DependencyFactory: Send + Sync {
    fn create(&self, notation: &str) -> Result<ExternalModuleDependency, NotationParseError>;

    fn create_from_coordinates(
        &self,
        group: Option<&str>,
        name: &str,
        version: Option<&str>,
    ) -> Result<ExternalModuleDependency, NotationParseError>;
}

/// Parses `group:name[:version[:classifier]][@extension]` notations.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModuleNotationFactory;

impl ModuleNotationFactory {
    fn notation_regex() -> &'static Regex {
        static NOTATION: OnceLock<Regex> = OnceLock::new();
        NOTATION.get_or_init(|| {
            Regex::new(
                r"^(?P<group>[^:@]*):(?P<name>[^:@]*)(?::(?P<version>[^:@]*))?(?::(?P<classifier>[^:@]*))?(?:@(?P<extension>[^:@]*))?$",
            )
            .unwrap()
        })
    }
}

fn non_empty<'a>(captures: &Captures<'a>, name: &str) -> Option<&'a str> {
    captures
        .name(name)
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
}

impl DependencyFactory for ModuleNotationFactory {
    fn create(&self, notation: &str) -> Result<ExternalModuleDependency, NotationParseError> {
        let captures = Self::notation_regex()
            .captures(notation)
            .ok_or_else(|| NotationParseError::new(notation, EXPECTED_FORMAT))?;

        let name = non_empty(&captures, "name")
            .ok_or_else(|| NotationParseError::new(notation, EMPTY_NAME))?;

        let extension = captures.name("extension").map(|m| m.as_str());
        if extension == Some("") {
            return Err(NotationParseError::new(
                notation,
                "extension must not be empty",
            ));
        }
        let classifier = non_empty(&captures, "classifier");

        let mut dependency = ExternalModuleDependency::new(
            non_empty(&captures, "group").unwrap_or_default(),
            name,
            non_empty(&captures, "version").map(str::to_owned),
        );
        if classifier.is_some() || extension.is_some() {
            dependency.artifact = Some(DependencyArtifact {
                classifier: classifier.map(str::to_owned),
                extension: extension.map(str::to_owned),
            });
        }
        trace!("Parsed notation {} into {:?}", notation, dependency);
        Ok(dependency)
    }

    fn create_from_coordinates(
        &self,
        group: Option<&str>,
        name: &str,
        version: Option<&str>,
    ) -> Result<ExternalModuleDependency, NotationParseError> {
        if name.is_empty() {
            return Err(NotationParseError::new(
                format!("{}:{}:{}", group.unwrap_or(""), name, version.unwrap_or("")),
                EMPTY_NAME,
            ));
        }
        Ok(ExternalModuleDependency::new(
            group.unwrap_or_default(),
            name,
            version.map(str::to_owned),
        ))
    }
}
