use std::fmt;

use serde::Deserialize;

use weave_core::identifier::Id;

/// Application configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Registry configuration section
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Output configuration section
    #[serde(default)]
    pub output: OutputConfig,
}

/// Registry configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Extra scalar types registered next to `String` and `Float`
    #[serde(default)]
    scalars: Vec<String>,
}

impl RegistryConfig {
    /// Get the configured scalar names.
    /// Returns an error naming the first entry that is not a valid type name.
    pub fn scalars(&self) -> Result<Vec<Id>, String> {
        self.scalars
            .iter()
            .map(|name| {
                if is_type_name(name) {
                    Ok(Id::new(name))
                } else {
                    Err(format!("Invalid scalar type name in config: `{name}`"))
                }
            })
            .collect()
    }
}

fn is_type_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// How the CLI prints parsed documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Indented definition tree
    #[default]
    Tree,
    /// The AST's compact debugging form
    Debug,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Tree => write!(f, "tree"),
            OutputFormat::Debug => write!(f, "debug"),
        }
    }
}

/// Output configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct OutputConfig {
    /// Default output format
    #[serde(default)]
    pub format: OutputFormat,
}
