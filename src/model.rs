//! Unit descriptors: the input data model
//!
//! A [`Unit`] describes one source class marked for building, plus every
//! type the generator may need to introspect (supertypes, goal result
//! types). It stands in for the host compiler's element model.
//!
//! ## Example Unit
//!
//! ```yaml
//! package: cube
//! source: Cube
//! builders:
//!   recycle: true
//! types:
//!   - name: Cube
//!     modifiers: [final]
//!     fields:
//!       - { name: width, type: String, modifiers: [final] }
//!       - { name: length, type: "List<String>", modifiers: [final] }
//!     constructors:
//!       - params:
//!           - { name: width, type: String }
//!           - { name: length, type: "List<String>" }
//!         goal: { updater: true }
//! ```

use crate::error::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A generation unit: one source class and its type universe
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "stepgen Unit", description = "Step builder generation unit")]
pub struct Unit {
    /// Package of the source type and of the generated type
    #[serde(default)]
    pub package: String,

    /// Name of the type carrying the builders marker (`Outer.Inner` if nested)
    pub source: String,

    /// The builders marker; goals outside a marked class are rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builders: Option<BuildersOptions>,

    /// Declared types visible to introspection
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

/// Options of the builders marker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BuildersOptions {
    /// Reuse builder instances through a thread-local cache
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recycle: Option<bool>,

    /// Default access level of generated entry points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,

    /// Default null policy of goal parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_policy: Option<NullPolicy>,
}

/// Access level of a generated entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Access {
    #[default]
    Public,
    Package,
}

/// Whether a parameter may receive `null`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NullPolicy {
    #[default]
    Allow,
    Reject,
}

/// Java modifiers that matter to analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Static,
    Abstract,
    Final,
}

/// Class or interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
}

/// A declared type
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TypeDecl {
    /// Simple name, `Outer.Inner` for nested types
    pub name: String,

    /// Package; defaults to the unit's package
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,

    #[serde(default)]
    pub kind: TypeKind,

    #[serde(default)]
    pub modifiers: Vec<Modifier>,

    #[serde(default)]
    pub type_params: Vec<TypeParamDecl>,

    /// Direct superclass, e.g. `Base<String>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,

    #[serde(default)]
    pub interfaces: Vec<String>,

    #[serde(default)]
    pub fields: Vec<FieldDecl>,

    /// Declared constructors; none means the implicit public no-arg one
    #[serde(default)]
    pub constructors: Vec<ConstructorDecl>,

    #[serde(default)]
    pub methods: Vec<MethodDecl>,

    /// Type-level goal marker, which makes this a bean goal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<GoalAnnotation>,
}

/// A type variable declaration
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TypeParamDecl {
    pub name: String,

    #[serde(default)]
    pub bounds: Vec<String>,
}

/// A field
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FieldDecl {
    pub name: String,

    #[serde(rename = "type")]
    pub typ: String,

    #[serde(default)]
    pub modifiers: Vec<Modifier>,
}

/// A constructor
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ConstructorDecl {
    #[serde(default)]
    pub modifiers: Vec<Modifier>,

    #[serde(default)]
    pub type_params: Vec<TypeParamDecl>,

    #[serde(default)]
    pub params: Vec<ParamDecl>,

    #[serde(default)]
    pub throws: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<GoalAnnotation>,
}

/// A method
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct MethodDecl {
    pub name: String,

    #[serde(default)]
    pub modifiers: Vec<Modifier>,

    #[serde(default)]
    pub type_params: Vec<TypeParamDecl>,

    /// Return type
    #[serde(default = "default_returns")]
    pub returns: String,

    #[serde(default)]
    pub params: Vec<ParamDecl>,

    #[serde(default)]
    pub throws: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<GoalAnnotation>,

    /// Step marker on a bean getter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<StepAnnotation>,

    /// Exclude this bean property
    #[serde(default)]
    pub ignore: bool,
}

fn default_returns() -> String {
    "void".to_string()
}

/// A parameter of a constructor or method
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ParamDecl {
    pub name: String,

    #[serde(rename = "type")]
    pub typ: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<StepAnnotation>,
}

/// Goal marker options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GoalAnnotation {
    /// Explicit goal name; derived from the goal type otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Generate a step builder
    #[serde(default = "default_true")]
    pub builder: bool,

    /// Generate an updater seeded from an existing instance
    #[serde(default)]
    pub updater: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builder_access: Option<Access>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updater_access: Option<Access>,

    /// Override the unit's recycling option for this goal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recycle: Option<bool>,

    /// Default null policy for this goal's parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_policy: Option<NullPolicy>,
}

impl Default for GoalAnnotation {
    fn default() -> Self {
        Self {
            name: None,
            builder: true,
            updater: false,
            builder_access: None,
            updater_access: None,
            recycle: None,
            null_policy: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Step marker: explicit position and null policy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StepAnnotation {
    /// Zero-based position in the step chain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_policy: Option<NullPolicy>,
}

impl Unit {
    /// Parse from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_norway::from_str(yaml).map_err(|e| Error::Descriptor(e.to_string()))
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_norway::to_string(self).map_err(|e| Error::Descriptor(e.to_string()))
    }

    /// Parse from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Descriptor(e.to_string()))
    }

    /// Load from a file, choosing the format by extension
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    /// Compute hash for change detection and provenance
    pub fn hash(&self) -> Result<String> {
        use sha2::{Digest, Sha256};
        let content = self.to_yaml()?;
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        Ok(format!("sha256:{}", hex::encode(&hasher.finalize()[..8])))
    }

    /// Look up a declared type by its nesting name
    pub fn find_type(&self, name: &str) -> Option<&TypeDecl> {
        self.types.iter().find(|t| t.name == name)
    }
}

impl TypeDecl {
    pub fn has(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

/// JSON Schema of the descriptor format
pub fn schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(Unit)).unwrap_or_default()
}
