use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{ReconcileError, Result};

/// What a single invocation should do with the target L3Out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    #[default]
    Query,
    Present,
    Absent,
}

/// One reconciliation request: the template to operate on, the desired
/// lifecycle state, and the desired partial L3Out configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconcileRequest {
    pub template: String,
    #[serde(default)]
    pub state: State,
    /// Compute the operation list but never submit it
    #[serde(default)]
    pub check_mode: bool,
    #[serde(flatten)]
    pub params: L3OutParams,
}

impl ReconcileRequest {
    /// Required-parameter rules, checked before any network traffic
    pub fn validate(&self) -> Result<()> {
        let p = &self.params;
        let has_id = p.name.is_some() || p.uuid.is_some();
        match self.state {
            State::Absent if !has_id => Err(ReconcileError::ValidationConflict(
                "state 'absent' requires 'name' or 'uuid'".to_string(),
            )),
            State::Present if !has_id => Err(ReconcileError::ValidationConflict(
                "state 'present' requires 'name' or 'uuid'".to_string(),
            )),
            State::Present if p.vrf.is_none() && p.uuid.is_none() => {
                Err(ReconcileError::ValidationConflict(
                    "state 'present' requires 'vrf' or 'uuid'".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }
}

/// Desired L3Out fields.
///
/// Every field is tri-state: `None` means not provided this run (leave
/// as-is). For strings, `Some("")` means clear and anything else is an
/// explicit value. The three states never collapse into each other;
/// presence is tracked by the `Option`, never by emptiness checks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct L3OutParams {
    pub name: Option<String>,
    pub uuid: Option<String>,
    pub description: Option<String>,
    pub vrf: Option<VrfKey>,
    pub l3_domain: Option<String>,
    pub target_dscp: Option<TargetDscp>,
    pub pim: Option<bool>,
    pub interleak: Option<String>,
    pub static_route_redistribution: Option<String>,
    pub connected_route_redistribution: Option<String>,
    pub attached_host_route_redistribution: Option<String>,
    pub bgp: Option<Section<BgpConfig>>,
    pub ospf: Option<Section<OspfConfig>>,
}

/// Addresses a VRF within the tenant-scoped object collection
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VrfKey {
    pub name: String,
    pub schema: String,
    pub template: String,
}

/// A compound sub-structure in the request.
///
/// Three states, kept distinct through the whole pipeline: absent (the
/// wrapping `Option` is `None`, section untouched), present-but-empty
/// (`Clear`, the stored sub-structure is removed), and
/// present-with-children (`Config`).
#[derive(Debug, Clone, PartialEq)]
pub enum Section<T> {
    /// `{}` in the request: clear the whole sub-structure
    Clear,
    Config(T),
}

impl<T> Section<T> {
    pub fn config(&self) -> Option<&T> {
        match self {
            Section::Config(cfg) => Some(cfg),
            Section::Clear => None,
        }
    }
}

impl<'de, T> Deserialize<'de> for Section<T>
where
    T: serde::de::DeserializeOwned,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = serde_json::Map::deserialize(deserializer)?;
        if map.is_empty() {
            Ok(Section::Clear)
        } else {
            serde_json::from_value(Value::Object(map))
                .map(Section::Config)
                .map_err(serde::de::Error::custom)
        }
    }
}

/// BGP configuration of the L3Out. All children are route-map policy names
/// resolved per run; an empty string skips the resolution.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BgpConfig {
    pub inbound_route_map: Option<String>,
    pub outbound_route_map: Option<String>,
    pub route_dampening_ipv4: Option<String>,
    pub route_dampening_ipv6: Option<String>,
}

/// OSPF configuration of the L3Out. The area triple is mandatory whenever
/// the section is configured; the rest is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OspfConfig {
    pub area_id: String,
    pub area_type: OspfAreaType,
    pub cost: u64,
    #[serde(default)]
    pub originate_summary_lsa: Option<bool>,
    #[serde(default)]
    pub send_redistributed_lsas: Option<bool>,
    #[serde(default)]
    pub suppress_forwarding_addr_translated_lsa: Option<bool>,
    #[serde(default)]
    pub originate_default_route: Option<OriginateDefaultRoute>,
    #[serde(default)]
    pub originate_default_route_always: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OspfAreaType {
    Regular,
    Stub,
    Nssa,
}

impl OspfAreaType {
    pub fn api_value(self) -> &'static str {
        match self {
            OspfAreaType::Regular => "regular",
            OspfAreaType::Stub => "stub",
            OspfAreaType::Nssa => "nssa",
        }
    }
}

/// Originate Default Route setting of the OSPF default route leak.
/// The empty string is a valid input and clears the whole setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginateDefaultRoute {
    Only,
    InAddition,
    #[serde(rename = "")]
    Clear,
}

impl OriginateDefaultRoute {
    pub fn api_value(self) -> &'static str {
        match self {
            OriginateDefaultRoute::Only => "only",
            OriginateDefaultRoute::InAddition => "inAddition",
            OriginateDefaultRoute::Clear => "",
        }
    }
}

/// DSCP Level of the L3Out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetDscp {
    Af11,
    Af12,
    Af13,
    Af21,
    Af22,
    Af23,
    Af31,
    Af32,
    Af33,
    Af41,
    Af42,
    Af43,
    Cs0,
    Cs1,
    Cs2,
    Cs3,
    Cs4,
    Cs5,
    Cs6,
    Cs7,
    ExpeditedForwarding,
    Unspecified,
    VoiceAdmit,
}

impl TargetDscp {
    pub fn api_value(self) -> &'static str {
        match self {
            TargetDscp::Af11 => "af11",
            TargetDscp::Af12 => "af12",
            TargetDscp::Af13 => "af13",
            TargetDscp::Af21 => "af21",
            TargetDscp::Af22 => "af22",
            TargetDscp::Af23 => "af23",
            TargetDscp::Af31 => "af31",
            TargetDscp::Af32 => "af32",
            TargetDscp::Af33 => "af33",
            TargetDscp::Af41 => "af41",
            TargetDscp::Af42 => "af42",
            TargetDscp::Af43 => "af43",
            TargetDscp::Cs0 => "cs0",
            TargetDscp::Cs1 => "cs1",
            TargetDscp::Cs2 => "cs2",
            TargetDscp::Cs3 => "cs3",
            TargetDscp::Cs4 => "cs4",
            TargetDscp::Cs5 => "cs5",
            TargetDscp::Cs6 => "cs6",
            TargetDscp::Cs7 => "cs7",
            TargetDscp::ExpeditedForwarding => "expeditedForwarding",
            TargetDscp::Unspecified => "unspecified",
            TargetDscp::VoiceAdmit => "voiceAdmit",
        }
    }
}

/// The routing protocol combination derived from which protocol sections
/// were provided this run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingProtocol {
    Bgp,
    Ospf,
    BgpOspf,
}

impl RoutingProtocol {
    pub fn api_value(self) -> &'static str {
        match self {
            RoutingProtocol::Bgp => "bgp",
            RoutingProtocol::Ospf => "ospf",
            RoutingProtocol::BgpOspf => "bgpOspf",
        }
    }

    /// Recompute the combination from the sections provided this run,
    /// never from stored state. `Clear` and absent both count as not
    /// configured, so a run touching neither section derives nothing and
    /// the stored value is left alone.
    pub fn derive(
        bgp: Option<&Section<BgpConfig>>,
        ospf: Option<&Section<OspfConfig>>,
    ) -> Option<Self> {
        let bgp_on = matches!(bgp, Some(Section::Config(_)));
        let ospf_on = matches!(ospf, Some(Section::Config(_)));
        match (bgp_on, ospf_on) {
            (true, true) => Some(RoutingProtocol::BgpOspf),
            (true, false) => Some(RoutingProtocol::Bgp),
            (false, true) => Some(RoutingProtocol::Ospf),
            (false, false) => None,
        }
    }
}
