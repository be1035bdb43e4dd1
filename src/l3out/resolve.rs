use std::collections::HashMap;

use crate::error::{ReconcileError, Result};
use crate::mso::types::{RouteMapObject, VrfObject};

use super::params::VrfKey;

/// Per-run reference resolver.
///
/// Holds the pre-fetched tenant-scoped collections plus a cache of names
/// already resolved; both have the lifetime of one invocation. Resolution
/// is read-only and returns opaque identifiers, never the referenced
/// objects themselves (except the VRF, whose multicast flag is needed for
/// validation).
pub struct RefResolver {
    tenant_name: String,
    route_maps: Vec<RouteMapObject>,
    vrfs: Vec<VrfObject>,
    resolved_route_maps: HashMap<String, String>,
}

impl RefResolver {
    pub fn new(
        tenant_name: impl Into<String>,
        route_maps: Vec<RouteMapObject>,
        vrfs: Vec<VrfObject>,
    ) -> Self {
        Self {
            tenant_name: tenant_name.into(),
            route_maps,
            vrfs,
            resolved_route_maps: HashMap::new(),
        }
    }

    /// Resolve a route-map policy name to its uuid, exact and
    /// case-sensitive. An empty name means the caller did not request a
    /// resolution this run and yields `None`; a non-empty name matching
    /// nothing is an error.
    pub fn route_map_uuid(&mut self, name: &str) -> Result<Option<String>> {
        if name.is_empty() {
            return Ok(None);
        }
        if let Some(uuid) = self.resolved_route_maps.get(name) {
            return Ok(Some(uuid.clone()));
        }
        let found = self
            .route_maps
            .iter()
            .find(|rm| rm.name == name)
            .ok_or_else(|| ReconcileError::ReferenceNotFound {
                kind: "route map policy",
                name: name.to_string(),
                tenant: self.tenant_name.clone(),
            })?;
        self.resolved_route_maps
            .insert(name.to_string(), found.uuid.clone());
        Ok(Some(found.uuid.clone()))
    }

    /// Resolve a VRF by name within its schema and template. The full
    /// object is returned because the diff engine embeds the uuid and the
    /// validator inspects the multicast flag.
    pub fn vrf(&self, key: &VrfKey) -> Result<&VrfObject> {
        self.vrfs
            .iter()
            .find(|vrf| {
                vrf.name == key.name
                    && vrf.schema_name == key.schema
                    && vrf.template_name == key.template
            })
            .ok_or_else(|| ReconcileError::ReferenceNotFound {
                kind: "VRF",
                name: key.name.clone(),
                tenant: self.tenant_name.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route_map(name: &str, uuid: &str) -> RouteMapObject {
        serde_json::from_value(serde_json::json!({"uuid": uuid, "name": name})).unwrap()
    }

    fn vrf(name: &str, uuid: &str, schema: &str, template: &str) -> VrfObject {
        serde_json::from_value(serde_json::json!({
            "uuid": uuid,
            "name": name,
            "schemaName": schema,
            "templateName": template,
            "l3MCast": true
        }))
        .unwrap()
    }

    fn resolver() -> RefResolver {
        RefResolver::new(
            "tenant_1",
            vec![route_map("rm_1", "RM1"), route_map("rm_2", "RM2")],
            vec![vrf("VRF1", "V1", "Schema1", "Template1")],
        )
    }

    #[test]
    fn test_route_map_resolution() {
        let mut resolver = resolver();
        assert_eq!(resolver.route_map_uuid("rm_1").unwrap(), Some("RM1".to_string()));
        assert_eq!(resolver.route_map_uuid("rm_2").unwrap(), Some("RM2".to_string()));
    }

    #[test]
    fn test_empty_name_is_skipped() {
        let mut resolver = resolver();
        assert_eq!(resolver.route_map_uuid("").unwrap(), None);
    }

    #[test]
    fn test_unknown_name_fails() {
        let mut resolver = resolver();
        match resolver.route_map_uuid("missing") {
            Err(ReconcileError::ReferenceNotFound { kind, name, tenant }) => {
                assert_eq!(kind, "route map policy");
                assert_eq!(name, "missing");
                assert_eq!(tenant, "tenant_1");
            }
            other => panic!("expected ReferenceNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_resolution_is_case_sensitive() {
        let mut resolver = resolver();
        assert!(resolver.route_map_uuid("RM_1").is_err());
    }

    #[test]
    fn test_resolved_names_are_cached() {
        let mut resolver = resolver();
        resolver.route_map_uuid("rm_1").unwrap();
        // drop the collection; the cached name must still resolve
        resolver.route_maps.clear();
        assert_eq!(resolver.route_map_uuid("rm_1").unwrap(), Some("RM1".to_string()));
        assert!(resolver.route_map_uuid("rm_2").is_err());
    }

    #[test]
    fn test_vrf_resolution_matches_full_key() {
        let resolver = resolver();
        let key = VrfKey {
            name: "VRF1".to_string(),
            schema: "Schema1".to_string(),
            template: "Template1".to_string(),
        };
        assert_eq!(resolver.vrf(&key).unwrap().uuid, "V1");

        let wrong_schema = VrfKey {
            schema: "Schema2".to_string(),
            ..key
        };
        assert!(resolver.vrf(&wrong_schema).is_err());
    }
}
