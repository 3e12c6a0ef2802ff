//! Maven build descriptor model.

use crate::xml;
use roxmltree::Node;
use std::fmt;

/// Default `groupId` Maven assumes for plugins that omit it.
pub const DEFAULT_PLUGIN_GROUP: &str = "org.apache.maven.plugins";

#[derive(Debug, thiserror::Error)]
pub enum PomError {
    #[error("{0}")]
    Xml(#[from] roxmltree::Error),
    #[error("root element is <{0}>, expected <project>")]
    NotAProject(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Coordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
}

impl Coordinate {
    pub fn is(&self, group_id: &str, artifact_id: &str) -> bool {
        self.group_id == group_id && self.artifact_id == artifact_id
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Plugin {
    pub coordinate: Coordinate,
    /// `<configuration><version>`, used by the Mule packaging plugin.
    pub configuration_version: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PomModel {
    pub coordinate: Coordinate,
    pub parent: Option<Coordinate>,
    pub properties: Vec<(String, String)>,
    pub dependencies: Vec<Coordinate>,
    pub managed_dependencies: Vec<Coordinate>,
    pub plugins: Vec<Plugin>,
    pub managed_plugins: Vec<Plugin>,
}

impl PomModel {
    pub fn parse(text: &str) -> Result<Self, PomError> {
        let doc = xml::parse(text)?;
        let project = doc.root_element();
        if project.tag_name().name() != "project" {
            return Err(PomError::NotAProject(project.tag_name().name().to_string()));
        }

        let parent = xml::child(project, "parent").map(coordinate);
        let mut own = coordinate(project);
        if let Some(p) = &parent {
            if own.group_id.is_empty() {
                own.group_id = p.group_id.clone();
            }
            if own.version.is_none() {
                own.version = p.version.clone();
            }
        }

        let properties = xml::child(project, "properties")
            .map(|props| {
                props
                    .children()
                    .filter(Node::is_element)
                    .map(|p| {
                        (
                            p.tag_name().name().to_string(),
                            p.text().unwrap_or_default().trim().to_string(),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();

        let dependencies = coordinates_under(xml::child(project, "dependencies"), "dependency");
        let managed_dependencies = coordinates_under(
            xml::child(project, "dependencyManagement").and_then(|m| xml::child(m, "dependencies")),
            "dependency",
        );

        let build = xml::child(project, "build");
        let plugins = plugins_under(build.and_then(|b| xml::child(b, "plugins")));
        let managed_plugins = plugins_under(
            build
                .and_then(|b| xml::child(b, "pluginManagement"))
                .and_then(|m| xml::child(m, "plugins")),
        );

        Ok(Self {
            coordinate: own,
            parent,
            properties,
            dependencies,
            managed_dependencies,
            plugins,
            managed_plugins,
        })
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Expands a whole-value `${name}` reference from `<properties>` or the project's own
    /// coordinate. Anything else, including unknown references, is returned as given.
    pub fn resolve(&self, value: &str) -> String {
        let trimmed = value.trim();
        let Some(name) = trimmed
            .strip_prefix("${")
            .and_then(|r| r.strip_suffix('}'))
        else {
            return value.to_string();
        };
        let builtin = match name {
            "project.version" | "version" => self.coordinate.version.as_deref(),
            "project.groupId" | "groupId" => Some(self.coordinate.group_id.as_str()),
            "project.artifactId" | "artifactId" => Some(self.coordinate.artifact_id.as_str()),
            _ => None,
        };
        self.property(name)
            .or(builtin)
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string())
    }

    /// Direct then managed dependencies.
    pub fn all_dependencies(&self) -> impl Iterator<Item = &Coordinate> {
        self.dependencies.iter().chain(&self.managed_dependencies)
    }

    /// Build plugins then plugin management.
    pub fn all_plugins(&self) -> impl Iterator<Item = &Plugin> {
        self.plugins.iter().chain(&self.managed_plugins)
    }

    pub fn find_dependency(&self, group_id: &str, artifact_id: &str) -> Option<&Coordinate> {
        self.all_dependencies().find(|d| d.is(group_id, artifact_id))
    }

    pub fn find_plugin(&self, group_id: &str, artifact_id: &str) -> Option<&Plugin> {
        self.all_plugins()
            .find(|p| p.coordinate.is(group_id, artifact_id))
    }

    /// `None` when the dependency is not declared at all. A direct entry without a `<version>`
    /// inherits the version from `<dependencyManagement>`.
    pub fn dependency_version(&self, group_id: &str, artifact_id: &str) -> Option<Option<String>> {
        let declared = self.find_dependency(group_id, artifact_id)?;
        Some(declared.version.clone().or_else(|| {
            self.managed_dependencies
                .iter()
                .find(|d| d.is(group_id, artifact_id))
                .and_then(|d| d.version.clone())
        }))
    }

    /// Like [`Self::dependency_version`], falling back to `<pluginManagement>`.
    pub fn plugin_version(&self, group_id: &str, artifact_id: &str) -> Option<Option<String>> {
        let declared = self.find_plugin(group_id, artifact_id)?;
        Some(declared.coordinate.version.clone().or_else(|| {
            self.managed_plugins
                .iter()
                .find(|p| p.coordinate.is(group_id, artifact_id))
                .and_then(|p| p.coordinate.version.clone())
        }))
    }
}

fn coordinate(node: Node<'_, '_>) -> Coordinate {
    Coordinate {
        group_id: xml::child_text(node, "groupId")
            .unwrap_or_default()
            .to_string(),
        artifact_id: xml::child_text(node, "artifactId")
            .unwrap_or_default()
            .to_string(),
        version: xml::child_text(node, "version").map(str::to_string),
    }
}

fn coordinates_under(list: Option<Node<'_, '_>>, item: &str) -> Vec<Coordinate> {
    list.map(|l| {
        l.children()
            .filter(|c| c.is_element() && c.tag_name().name() == item)
            .map(coordinate)
            .collect()
    })
    .unwrap_or_default()
}

fn plugins_under(list: Option<Node<'_, '_>>) -> Vec<Plugin> {
    list.map(|l| {
        l.children()
            .filter(|c| c.is_element() && c.tag_name().name() == "plugin")
            .map(|p| {
                let mut coordinate = coordinate(p);
                if coordinate.group_id.is_empty() {
                    coordinate.group_id = DEFAULT_PLUGIN_GROUP.to_string();
                }
                Plugin {
                    coordinate,
                    configuration_version: xml::child(p, "configuration")
                        .and_then(|c| xml::child_text(c, "version"))
                        .map(str::to_string),
                }
            })
            .collect()
    })
    .unwrap_or_default()
}
