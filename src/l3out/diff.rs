use serde_json::{json, Map, Value};

use crate::error::{ReconcileError, Result};
use crate::mso::types::{PatchOp, VrfObject};

use super::params::{L3OutParams, OriginateDefaultRoute, RoutingProtocol, Section};
use super::resolve::RefResolver;

/// Pointer prefix of the L3Out collection inside the template document
pub const L3OUTS_PATH: &str = "/l3outTemplate/l3outs";

/// The outcome of diffing one entity: the ordered operation list plus the
/// working copy with every decided change applied
#[derive(Debug)]
pub struct EntityDiff {
    pub ops: Vec<PatchOp>,
    pub proposed: Value,
}

/// Route-map references resolved for this run. Resolution happens in full
/// before any operation is generated, so a failed resolution aborts with
/// an empty operation list.
struct ResolvedRefs {
    interleak: Option<String>,
    static_route: Option<String>,
    connected_route: Option<String>,
    attached_host_route: Option<String>,
    inbound: Option<String>,
    outbound: Option<String>,
    dampening_v4: Option<String>,
    dampening_v6: Option<String>,
}

impl ResolvedRefs {
    fn any_advanced(&self) -> bool {
        self.interleak.is_some()
            || self.static_route.is_some()
            || self.connected_route.is_some()
            || self.attached_host_route.is_some()
            || self.dampening_v4.is_some()
            || self.dampening_v6.is_some()
    }
}

fn resolve_route_maps(params: &L3OutParams, resolver: &mut RefResolver) -> Result<ResolvedRefs> {
    let name = |opt: &Option<String>| -> String { opt.clone().unwrap_or_default() };
    let bgp = params.bgp.as_ref().and_then(Section::config);

    Ok(ResolvedRefs {
        interleak: resolver.route_map_uuid(&name(&params.interleak))?,
        static_route: resolver.route_map_uuid(&name(&params.static_route_redistribution))?,
        connected_route: resolver.route_map_uuid(&name(&params.connected_route_redistribution))?,
        attached_host_route: resolver
            .route_map_uuid(&name(&params.attached_host_route_redistribution))?,
        inbound: match bgp {
            Some(bgp) => resolver.route_map_uuid(&name(&bgp.inbound_route_map))?,
            None => None,
        },
        outbound: match bgp {
            Some(bgp) => resolver.route_map_uuid(&name(&bgp.outbound_route_map))?,
            None => None,
        },
        dampening_v4: match bgp {
            Some(bgp) => resolver.route_map_uuid(&name(&bgp.route_dampening_ipv4))?,
            None => None,
        },
        dampening_v6: match bgp {
            Some(bgp) => resolver.route_map_uuid(&name(&bgp.route_dampening_ipv6))?,
            None => None,
        },
    })
}

/// Business rules, checked before any operation is built
pub fn validate(identifier: &str, params: &L3OutParams, vrf: Option<&VrfObject>) -> Result<()> {
    if params.pim == Some(true) {
        if let Some(vrf) = vrf {
            if vrf.l3_multicast == Some(false) {
                return Err(ReconcileError::ValidationConflict(format!(
                    "Invalid configuration in L3Out '{}', 'PIM' cannot be enabled while using the VRF '{}' with L3 Multicast disabled",
                    identifier, vrf.name
                )));
            }
        }
    }
    Ok(())
}

/// Build the single append operation creating a new L3Out.
///
/// The payload is sparse: a field absent from the input is absent from the
/// payload, never defaulted. Compound sub-structures appear only when at
/// least one child was provided, and the derived routing protocol only
/// when at least one protocol section was.
pub fn build_create_ops(
    name: &str,
    vrf_ref: &str,
    params: &L3OutParams,
    resolver: &mut RefResolver,
) -> Result<Vec<PatchOp>> {
    let refs = resolve_route_maps(params, resolver)?;

    let mut payload = Map::new();
    payload.insert("name".to_string(), json!(name));
    payload.insert("vrfRef".to_string(), json!(vrf_ref));

    if let Some(description) = params.description.as_deref().filter(|s| !s.is_empty()) {
        payload.insert("description".to_string(), json!(description));
    }
    if let Some(l3_domain) = params.l3_domain.as_deref().filter(|s| !s.is_empty()) {
        payload.insert("l3domain".to_string(), json!(l3_domain));
    }
    if let Some(target_dscp) = params.target_dscp {
        payload.insert("targetDscp".to_string(), json!(target_dscp.api_value()));
    }
    if let Some(pim) = params.pim {
        payload.insert("pim".to_string(), json!(pim));
    }
    if let Some(protocol) = RoutingProtocol::derive(params.bgp.as_ref(), params.ospf.as_ref()) {
        payload.insert("routingProtocol".to_string(), json!(protocol.api_value()));
    }

    let mut advanced = Map::new();
    for (field, uuid) in [
        ("interleakRef", &refs.interleak),
        ("staticRouteRedistRef", &refs.static_route),
        ("connectedRouteRedistRef", &refs.connected_route),
        ("attachedHostRouteRedistRef", &refs.attached_host_route),
        ("routeDampeningV4Ref", &refs.dampening_v4),
        ("routeDampeningV6Ref", &refs.dampening_v6),
    ] {
        if let Some(uuid) = uuid {
            advanced.insert(field.to_string(), json!(uuid));
        }
    }
    if !advanced.is_empty() {
        payload.insert("advancedRouteMapRefs".to_string(), Value::Object(advanced));
    }

    if params.bgp.as_ref().and_then(Section::config).is_some() {
        if let Some(uuid) = &refs.inbound {
            payload.insert("importRouteMapRef".to_string(), json!(uuid));
        }
        payload.insert("importRouteControl".to_string(), json!(refs.inbound.is_some()));
        if let Some(uuid) = &refs.outbound {
            payload.insert("exportRouteMapRef".to_string(), json!(uuid));
        }
    }

    if let Some(ospf) = params.ospf.as_ref().and_then(Section::config) {
        let mut area = Map::new();
        area.insert("cost".to_string(), json!(ospf.cost));
        area.insert("id".to_string(), json!(ospf.area_id));
        area.insert("areaType".to_string(), json!(ospf.area_type.api_value()));

        let mut control = Map::new();
        if let Some(redistribute) = ospf.send_redistributed_lsas {
            control.insert("redistribute".to_string(), json!(redistribute));
        }
        if let Some(originate) = ospf.originate_summary_lsa {
            control.insert("originate".to_string(), json!(originate));
        }
        if let Some(suppress_fa) = ospf.suppress_forwarding_addr_translated_lsa {
            control.insert("suppressFA".to_string(), json!(suppress_fa));
        }
        if !control.is_empty() {
            area.insert("control".to_string(), Value::Object(control));
        }
        payload.insert("ospfAreaConfig".to_string(), Value::Object(area));

        let mut leak = Map::new();
        if let Some(route) = ospf
            .originate_default_route
            .filter(|r| *r != OriginateDefaultRoute::Clear)
        {
            leak.insert("originateDefaultRoute".to_string(), json!(route.api_value()));
        }
        if let Some(always) = ospf.originate_default_route_always {
            leak.insert("always".to_string(), json!(always));
        }
        if !leak.is_empty() {
            payload.insert("defaultRouteLeak".to_string(), Value::Object(leak));
        }
    }

    Ok(vec![PatchOp::add(
        format!("{}/-", L3OUTS_PATH),
        Value::Object(payload),
    )])
}

/// Working state for one update diff: the entity path prefix, a working
/// copy of the stored entity that absorbs every decided change so later
/// comparisons stay consistent within the run, and the accumulated
/// operation list.
struct UpdateContext {
    path: String,
    working: Value,
    ops: Vec<PatchOp>,
}

impl UpdateContext {
    fn new(index: usize, existing: &Value) -> Self {
        Self {
            path: format!("{}/{}", L3OUTS_PATH, index),
            working: existing.clone(),
            ops: Vec::new(),
        }
    }

    fn field_path(&self, field: &str) -> String {
        format!("{}/{}", self.path, field)
    }

    /// Current value at a slash-separated field path within the working copy
    fn current(&self, field: &str) -> Option<&Value> {
        field.split('/').try_fold(&self.working, |node, part| node.get(part))
    }

    /// A container counts as missing when it is absent, null or empty
    fn container_missing(&self, field: &str) -> bool {
        match self.current(field) {
            None | Some(Value::Null) => true,
            Some(Value::Object(map)) => map.is_empty(),
            Some(_) => false,
        }
    }

    /// Emit a replace when the desired value differs from the working
    /// copy, superseding the working copy. Returns whether an operation
    /// was emitted.
    fn replace_if_changed(&mut self, field: &str, desired: Value) -> bool {
        if self.current(field) == Some(&desired) {
            return false;
        }
        self.ops.push(PatchOp::replace(self.field_path(field), desired.clone()));
        self.set_working(field, desired);
        true
    }

    /// Create an empty container ahead of its children's writes
    fn create_container(&mut self, field: &str, op: fn(String, Value) -> PatchOp) {
        self.ops.push(op(self.field_path(field), json!({})));
        self.set_working(field, json!({}));
    }

    /// Remove a whole sub-structure and drop it from the working copy
    fn remove(&mut self, field: &str) {
        self.ops.push(PatchOp::remove(self.field_path(field)));
        self.remove_working(field);
    }

    fn set_working(&mut self, field: &str, value: Value) {
        let mut slot = Some(value);
        let mut node = &mut self.working;
        let mut parts = field.split('/').peekable();
        while let Some(part) = parts.next() {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            let Some(map) = node.as_object_mut() else {
                return;
            };
            if parts.peek().is_none() {
                if let Some(value) = slot.take() {
                    map.insert(part.to_string(), value);
                }
                return;
            }
            node = map
                .entry(part.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
    }

    fn remove_working(&mut self, field: &str) {
        let mut parts: Vec<&str> = field.split('/').collect();
        let Some(last) = parts.pop() else { return };
        let mut node = &mut self.working;
        for part in parts {
            match node.get_mut(part) {
                Some(next) => node = next,
                None => return,
            }
        }
        if let Some(map) = node.as_object_mut() {
            map.remove(last);
        }
    }
}

/// Diff the desired fields against an existing L3Out and produce the
/// ordered operation list transforming the stored entity into the desired
/// one. Unspecified fields are never touched; equal values produce
/// nothing; container creation always precedes child writes.
pub fn build_update_ops(
    index: usize,
    existing: &Value,
    params: &L3OutParams,
    vrf_ref: Option<&str>,
    resolver: &mut RefResolver,
) -> Result<EntityDiff> {
    let refs = resolve_route_maps(params, resolver)?;
    let mut ctx = UpdateContext::new(index, existing);

    if let Some(name) = &params.name {
        ctx.replace_if_changed("name", json!(name));
    }
    if let Some(vrf_ref) = vrf_ref {
        ctx.replace_if_changed("vrfRef", json!(vrf_ref));
    }
    if let Some(description) = &params.description {
        ctx.replace_if_changed("description", json!(description));
    }
    if let Some(l3_domain) = &params.l3_domain {
        ctx.replace_if_changed("l3domain", json!(l3_domain));
    }
    if let Some(target_dscp) = params.target_dscp {
        ctx.replace_if_changed("targetDscp", json!(target_dscp.api_value()));
    }
    if let Some(pim) = params.pim {
        ctx.replace_if_changed("pim", json!(pim));
    }

    // Recomputed from this run's inputs only; when neither protocol
    // section was touched nothing is derived and the stored value stays,
    // whatever it is.
    if let Some(protocol) = RoutingProtocol::derive(params.bgp.as_ref(), params.ospf.as_ref()) {
        ctx.replace_if_changed("routingProtocol", json!(protocol.api_value()));
    }

    if refs.any_advanced() && ctx.container_missing("advancedRouteMapRefs") {
        ctx.create_container("advancedRouteMapRefs", PatchOp::add);
    }
    for (field, uuid) in [
        ("advancedRouteMapRefs/interleakRef", &refs.interleak),
        ("advancedRouteMapRefs/staticRouteRedistRef", &refs.static_route),
        ("advancedRouteMapRefs/connectedRouteRedistRef", &refs.connected_route),
        (
            "advancedRouteMapRefs/attachedHostRouteRedistRef",
            &refs.attached_host_route,
        ),
    ] {
        if let Some(uuid) = uuid {
            ctx.replace_if_changed(field, json!(uuid));
        }
    }

    if let Some(uuid) = &refs.inbound {
        if ctx.replace_if_changed("importRouteMapRef", json!(uuid)) {
            ctx.replace_if_changed("importRouteControl", json!(true));
        }
    }
    if let Some(uuid) = &refs.outbound {
        ctx.replace_if_changed("exportRouteMapRef", json!(uuid));
    }
    if let Some(uuid) = &refs.dampening_v4 {
        ctx.replace_if_changed("advancedRouteMapRefs/routeDampeningV4Ref", json!(uuid));
    }
    if let Some(uuid) = &refs.dampening_v6 {
        ctx.replace_if_changed("advancedRouteMapRefs/routeDampeningV6Ref", json!(uuid));
    }

    match &params.ospf {
        Some(Section::Config(ospf)) => {
            match ospf.originate_default_route {
                Some(OriginateDefaultRoute::Clear) => {
                    if !ctx.container_missing("defaultRouteLeak") {
                        ctx.remove("defaultRouteLeak");
                    }
                }
                Some(route) => {
                    if ctx.container_missing("defaultRouteLeak") {
                        ctx.create_container("defaultRouteLeak", PatchOp::replace);
                    }
                    ctx.replace_if_changed(
                        "defaultRouteLeak/originateDefaultRoute",
                        json!(route.api_value()),
                    );
                    if let Some(always) = ospf.originate_default_route_always {
                        ctx.replace_if_changed("defaultRouteLeak/always", json!(always));
                    }
                }
                None => {}
            }

            if ctx.container_missing("ospfAreaConfig") {
                ctx.create_container("ospfAreaConfig", PatchOp::replace);
            }
            ctx.replace_if_changed("ospfAreaConfig/cost", json!(ospf.cost));
            ctx.replace_if_changed("ospfAreaConfig/id", json!(ospf.area_id));
            ctx.replace_if_changed("ospfAreaConfig/areaType", json!(ospf.area_type.api_value()));

            let control_given = ospf.send_redistributed_lsas.is_some()
                || ospf.originate_summary_lsa.is_some()
                || ospf.suppress_forwarding_addr_translated_lsa.is_some();
            if control_given && ctx.container_missing("ospfAreaConfig/control") {
                ctx.create_container("ospfAreaConfig/control", PatchOp::replace);
            }
            if let Some(redistribute) = ospf.send_redistributed_lsas {
                ctx.replace_if_changed("ospfAreaConfig/control/redistribute", json!(redistribute));
            }
            if let Some(originate) = ospf.originate_summary_lsa {
                ctx.replace_if_changed("ospfAreaConfig/control/originate", json!(originate));
            }
            if let Some(suppress_fa) = ospf.suppress_forwarding_addr_translated_lsa {
                ctx.replace_if_changed("ospfAreaConfig/control/suppressFA", json!(suppress_fa));
            }
        }
        Some(Section::Clear) => {
            if !ctx.container_missing("ospfAreaConfig") {
                ctx.remove("ospfAreaConfig");
            }
        }
        None => {}
    }

    Ok(EntityDiff {
        ops: ctx.ops,
        proposed: ctx.working,
    })
}

/// Delete the entity at the given position; no field-level diffing
pub fn build_delete_ops(index: usize) -> Vec<PatchOp> {
    vec![PatchOp::remove(format!("{}/{}", L3OUTS_PATH, index))]
}
