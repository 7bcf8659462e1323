use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::num::NonZeroU32;
use std::str::FromStr;

/// Canonical identity of a listable resource type, as reported by the
/// cluster's type registry.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ResourceIdentifier {
    pub group: String,
    pub version: String,
    pub resource: String,
    pub kind: String,
    pub namespaced: bool,
}

impl ResourceIdentifier {
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// `resource.group` for named groups, `resource` for the core group.
    pub fn qualified_name(&self) -> String {
        if self.group.is_empty() {
            self.resource.clone()
        } else {
            format!("{}.{}", self.resource, self.group)
        }
    }
}

impl Display for ResourceIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.api_version(), self.resource)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum NamespaceScope {
    All,
    Named(String),
}

impl NamespaceScope {
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Named(namespace) => Some(namespace),
        }
    }
}

impl Display for NamespaceScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Named(namespace) => write!(f, "{namespace}"),
        }
    }
}

/// Server-issued cursor. Handed back verbatim on the next request and never
/// inspected client-side.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ContinueToken(String);

impl ContinueToken {
    /// Returns `None` for the empty string, which the server uses to signal
    /// the end of the collection.
    pub fn from_server(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() { None } else { Some(Self(raw)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ContinueToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PageRequest {
    pub limit: NonZeroU32,
    pub continue_token: Option<ContinueToken>,
    pub label_selector: Option<String>,
    pub scope: NamespaceScope,
}

#[derive(Debug, Clone)]
pub struct PageResponse {
    pub body: PageBody,
    pub next_token: Option<ContinueToken>,
}

impl PageResponse {
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The two shapes a list response can take, depending on whether the server
/// honoured the request for server-side table printing.
#[derive(Debug, Clone)]
pub enum PageBody {
    Table(ServerTable),
    Objects(ObjectList),
}

impl PageBody {
    pub fn len(&self) -> usize {
        match self {
            Self::Table(table) => table.rows.len(),
            Self::Objects(list) => list.items.len(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerTable {
    #[serde(default)]
    pub column_definitions: Vec<TableColumn>,
    #[serde(default)]
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableColumn {
    pub name: String,
    #[serde(default, rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub priority: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub cells: Vec<Value>,
    #[serde(default)]
    pub object: Option<Value>,
}

impl TableRow {
    pub fn namespace(&self) -> Option<&str> {
        self.object
            .as_ref()
            .and_then(|object| object.pointer("/metadata/namespace"))
            .and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ObjectList {
    pub items: Vec<Value>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum PeekMode {
    Interactive,
    SinglePass { resume_from: Option<ContinueToken> },
}

impl PeekMode {
    pub fn initial_token(&self) -> Option<ContinueToken> {
        match self {
            Self::Interactive => None,
            Self::SinglePass { resume_from } => resume_from.clone(),
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Interactive)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Wide,
    Json,
    Yaml,
    Name,
}

impl OutputFormat {
    pub const ALLOWED: &'static str = "json, name, wide, yaml";

    pub fn is_tabular(self) -> bool {
        matches!(self, Self::Table | Self::Wide)
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" => Ok(Self::Table),
            "wide" => Ok(Self::Wide),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "name" => Ok(Self::Name),
            other => Err(format!(
                "unable to match a printer suitable for the output format \"{other}\", allowed formats are: {}",
                Self::ALLOWED
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ContinueToken, OutputFormat, ResourceIdentifier};

    #[test]
    fn empty_server_token_means_exhausted() {
        assert_eq!(ContinueToken::from_server(""), None);
        assert_eq!(
            ContinueToken::from_server("abc").map(|token| token.to_string()),
            Some("abc".to_string())
        );
    }

    #[test]
    fn output_formats_parse_case_insensitively() {
        assert_eq!("".parse::<OutputFormat>(), Ok(OutputFormat::Table));
        assert_eq!("WIDE".parse::<OutputFormat>(), Ok(OutputFormat::Wide));
        assert_eq!("yml".parse::<OutputFormat>(), Ok(OutputFormat::Yaml));
        assert!("jsonpath={.items}".parse::<OutputFormat>().is_err());
        assert!(OutputFormat::Wide.is_tabular());
        assert!(!OutputFormat::Name.is_tabular());
    }

    #[test]
    fn api_version_omits_core_group() {
        let mut id = ResourceIdentifier {
            group: String::new(),
            version: "v1".to_string(),
            resource: "pods".to_string(),
            kind: "Pod".to_string(),
            namespaced: true,
        };
        assert_eq!(id.api_version(), "v1");
        assert_eq!(id.qualified_name(), "pods");

        id.group = "apps".to_string();
        id.resource = "deployments".to_string();
        assert_eq!(id.api_version(), "apps/v1");
        assert_eq!(id.qualified_name(), "deployments.apps");
        assert_eq!(id.to_string(), "apps/v1/deployments");
    }
}
