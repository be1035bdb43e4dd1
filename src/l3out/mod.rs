pub mod diff;
pub mod locate;
pub mod params;
pub mod resolve;

pub use params::{L3OutParams, ReconcileRequest, State};

use serde::Serialize;
use serde_json::Value;

use crate::error::{ReconcileError, Result};
use crate::mso::types::{PatchOp, RouteMapObject, VrfObject};
use crate::mso::MsoClient;

use resolve::RefResolver;

/// The result of one reconciliation run
#[derive(Debug, Serialize)]
pub struct ReconcileOutcome {
    pub changed: bool,
    /// The entity as stored at fetch time, when one was located
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<Value>,
    /// The entity after the computed operations apply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<Value>,
    /// The whole collection, for an identifier-less query
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<Value>>,
    pub ops: Vec<PatchOp>,
}

impl ReconcileOutcome {
    fn unchanged() -> Self {
        Self {
            changed: false,
            previous: None,
            current: None,
            entities: None,
            ops: Vec::new(),
        }
    }
}

/// Run one reconciliation: fetch a fresh template snapshot, locate the
/// target entity, resolve references, diff, and submit the resulting
/// operations as a single atomic PATCH. An empty operation list sends
/// nothing; in check mode the operations are computed but never submitted.
pub async fn reconcile(client: &MsoClient, request: &ReconcileRequest) -> Result<ReconcileOutcome> {
    request.validate()?;
    let params = &request.params;

    let summaries = client.list_template_summaries().await?;
    let summary = summaries
        .iter()
        .find(|s| s.template_name == request.template && s.template_type == "l3out")
        .ok_or_else(|| {
            ReconcileError::Template(format!("L3Out template '{}' not found", request.template))
        })?;
    let template = client.get_template(&summary.template_id).await?;

    let l3outs: Vec<Value> = template
        .pointer(diff::L3OUTS_PATH)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    tracing::debug!(
        "Fetched template '{}' ({}) with {} l3outs",
        summary.template_name,
        summary.template_id,
        l3outs.len()
    );

    let located = if let Some(uuid) = &params.uuid {
        locate::find_object(&l3outs, &[("uuid", uuid)])
    } else if let Some(name) = &params.name {
        locate::find_object(&l3outs, &[("name", name)])
    } else {
        None
    };

    match request.state {
        State::Query => {
            if params.uuid.is_none() && params.name.is_none() {
                return Ok(ReconcileOutcome {
                    entities: Some(l3outs.clone()),
                    ..ReconcileOutcome::unchanged()
                });
            }
            Ok(ReconcileOutcome {
                current: located.map(|m| m.details.clone()),
                ..ReconcileOutcome::unchanged()
            })
        }
        State::Absent => {
            let (ops, previous) = match &located {
                Some(found) => (diff::build_delete_ops(found.index), Some(found.details.clone())),
                None => (Vec::new(), None),
            };
            let changed = !ops.is_empty();
            submit(client, &summary.template_id, &ops, request.check_mode).await?;
            Ok(ReconcileOutcome {
                changed,
                previous,
                current: None,
                entities: None,
                ops,
            })
        }
        State::Present => {
            if params.uuid.is_some() && located.is_none() {
                return Err(ReconcileError::NotFound(format!(
                    "L3Out with the uuid '{}' not found",
                    params.uuid.as_deref().unwrap_or_default()
                )));
            }

            let identifier = match (&params.name, &params.uuid) {
                (Some(name), _) => format!("Name: {}", name),
                (None, Some(uuid)) => format!("UUID: {}", uuid),
                (None, None) => String::new(),
            };

            // Reference collections are read-only and independent, so the
            // fetches run concurrently; resolution completes before any
            // diffing starts.
            let (route_maps, vrfs): (Vec<RouteMapObject>, Vec<VrfObject>) = futures::try_join!(
                client.list_template_objects("routeMap", &summary.tenant_id),
                async {
                    if params.vrf.is_some() {
                        client.list_template_objects("vrf", &summary.tenant_id).await
                    } else {
                        Ok(Vec::new())
                    }
                },
            )?;
            let mut resolver = RefResolver::new(summary.tenant_name.clone(), route_maps, vrfs);

            let vrf_object = match &params.vrf {
                Some(key) => Some(resolver.vrf(key)?.clone()),
                None => None,
            };
            diff::validate(&identifier, params, vrf_object.as_ref())?;
            let vrf_ref = vrf_object.map(|vrf| vrf.uuid);

            let (ops, previous, current) = match &located {
                None => {
                    // request.validate() guarantees a name when no uuid was
                    // given, and the uuid path returned NotFound above
                    let name = params.name.as_deref().unwrap_or_default();
                    let vrf_ref = vrf_ref.as_deref().ok_or_else(|| {
                        ReconcileError::ValidationConflict(format!(
                            "'vrf' is required when creating the L3Out '{}'",
                            identifier
                        ))
                    })?;
                    let ops = diff::build_create_ops(name, vrf_ref, params, &mut resolver)?;
                    let payload = ops.first().and_then(|op| op.value.clone());
                    (ops, None, payload)
                }
                Some(found) => {
                    let entity_diff = diff::build_update_ops(
                        found.index,
                        found.details,
                        params,
                        vrf_ref.as_deref(),
                        &mut resolver,
                    )?;
                    (
                        entity_diff.ops,
                        Some(found.details.clone()),
                        Some(entity_diff.proposed),
                    )
                }
            };

            let changed = !ops.is_empty();
            submit(client, &summary.template_id, &ops, request.check_mode).await?;
            Ok(ReconcileOutcome {
                changed,
                previous,
                current,
                entities: None,
                ops,
            })
        }
    }
}

async fn submit(
    client: &MsoClient,
    template_id: &str,
    ops: &[PatchOp],
    check_mode: bool,
) -> Result<()> {
    if ops.is_empty() {
        tracing::debug!("No changes required");
        return Ok(());
    }
    if check_mode {
        tracing::info!("Check mode: {} operations computed, not submitted", ops.len());
        return Ok(());
    }
    tracing::info!("Submitting {} patch operations", ops.len());
    client.patch_template(template_id, ops).await?;
    Ok(())
}
