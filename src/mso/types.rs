use serde::{Deserialize, Serialize};
use serde_json::Value;

// --- NDO API types ---

/// One entry of the template summaries listing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub template_id: String,
    pub template_name: String,
    pub template_type: String,
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub tenant_name: String,
}

/// A Route Map Policy for Route Control, as returned by the tenant-scoped
/// objects listing. Only the uuid is ever embedded into an L3Out.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMapObject {
    pub uuid: String,
    pub name: String,
}

/// A VRF object from the tenant-scoped objects listing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VrfObject {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub schema_name: String,
    #[serde(default)]
    pub template_name: String,
    /// Layer 3 Multicast flag; absent on older backends
    #[serde(default, rename = "l3MCast")]
    pub l3_multicast: Option<bool>,
}

// --- Patch operations ---

/// The operation kinds accepted by the template PATCH endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOpKind {
    Add,
    Replace,
    Remove,
}

/// One document transformation: {kind, path, value}, submitted as part of
/// an ordered atomic batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOp {
    pub op: PatchOpKind,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl PatchOp {
    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: PatchOpKind::Add,
            path: path.into(),
            value: Some(value),
        }
    }

    pub fn replace(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: PatchOpKind::Replace,
            path: path.into(),
            value: Some(value),
        }
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Self {
            op: PatchOpKind::Remove,
            path: path.into(),
            value: None,
        }
    }
}
