use std::{error::Error, fmt::Display, path::Path};

use regex::Regex;
use serde::{Deserialize, Serialize};

const PHP_IDENTIFIER: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";
const PACKAGE_SEGMENT: &str = r"^[A-Za-z0-9_-]+$";

#[derive(Debug, Clone)]
pub enum ModelError {
    InvalidClassName { table: String, class_name: String },
    InvalidPackage { table: String, package: String },
}

impl Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::InvalidClassName { table, class_name } => write!(
                f,
                "Inheritance child {class_name:?} of table {table} is not a valid class name."
            ),
            ModelError::InvalidPackage { table, package } => write!(
                f,
                "Package {package:?} of table {table} must be dot separated names."
            ),
        }
    }
}

impl Error for ModelError {}

/// One subclass variant of a single table inheritance hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InheritanceChild {
    pub class_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Discriminator value stored in the inheritance column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
}

impl InheritanceChild {
    #[cfg(test)]
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            package: None,
            key: None,
            extends: None,
        }
    }

    #[cfg(test)]
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TableDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub package: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, rename = "child")]
    pub children: Vec<InheritanceChild>,
}

impl TableDescriptor {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            package: String::new(),
            namespace: None,
            children: vec![],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[must_use]
pub struct Model {
    #[serde(default, rename = "table")]
    pub tables: Vec<TableDescriptor>,
}

impl Model {
    pub fn from_toml(content: &str) -> Result<Self, Box<dyn Error>> {
        let model: Model = toml::from_str(content)?;
        model.validate()?;
        Ok(model)
    }

    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let content = std::fs::read_to_string(path).map_err(|error| {
            format!("encountered '{error}' attempting to read {}", path.display())
        })?;
        Self::from_toml(&content)
    }

    fn validate(&self) -> Result<(), Box<dyn Error>> {
        let identifier = Regex::new(PHP_IDENTIFIER)?;
        let segment = Regex::new(PACKAGE_SEGMENT)?;
        let check_package = |table: &TableDescriptor, package: &str| {
            match package.split('.').all(|part| segment.is_match(part)) {
                true => Ok(()),
                false => Err(ModelError::InvalidPackage {
                    table: table.name.clone(),
                    package: package.to_owned(),
                }),
            }
        };
        for table in &self.tables {
            if !table.package.is_empty() {
                check_package(table, &table.package)?;
            }
            for child in &table.children {
                if let Some(package) = child.package.as_deref().filter(|p| !p.is_empty()) {
                    check_package(table, package)?;
                }
                if !identifier.is_match(&child.class_name) {
                    Err(ModelError::InvalidClassName {
                        table: table.name.clone(),
                        class_name: child.class_name.clone(),
                    })?
                }
            }
        }
        Ok(())
    }

    /// Every (table, child) pair in manifest order.
    pub fn stubs(&self) -> impl Iterator<Item = (&TableDescriptor, &InheritanceChild)> {
        self.tables
            .iter()
            .flat_map(|table| table.children.iter().map(move |child| (table, child)))
    }
}
