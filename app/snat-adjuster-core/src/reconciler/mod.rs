use log::{info, warn};
use serde::Serialize;

use crate::{
    desired::{DesiredAssignment, DesiredState},
    executor::{execute_action, ActionOutcome},
    gateway::{CreateRuleRequest, NatGatewayApi},
    observed::{fetch_observed_rules, ObservedRules},
};

use self::{
    action::{DeleteRuleRequest, PodDecision, SnatAction},
    context::ReconcilerContext,
    error::ReconcilerError,
};

pub mod action;
pub mod context;
pub mod error;

/// Desired assignments of one gateway next to the rules it currently holds
#[derive(Debug, Clone)]
pub struct GatewayGroup {
    pub gateway_id: String,
    pub assignments: Vec<DesiredAssignment>,
    pub observed: ObservedRules,
}

impl GatewayGroup {
    pub async fn load(
        api: &dyn NatGatewayApi,
        gateway_id: String,
        assignments: Vec<DesiredAssignment>,
    ) -> Result<Self, ReconcilerError> {
        let observed = fetch_observed_rules(api, &gateway_id)
            .await
            .map_err(|error| ReconcilerError::ObservedStateError(gateway_id.clone(), error))?;

        Ok(Self {
            gateway_id,
            assignments,
            observed,
        })
    }

    pub fn decisions(&self) -> impl Iterator<Item = (&DesiredAssignment, PodDecision)> {
        self.assignments
            .iter()
            .map(move |assignment| (assignment, decide(&self.gateway_id, assignment, &self.observed)))
    }
}

/// A rule matches a pod when its source CIDR is the pod address, with or without a suffix.
pub fn cidr_matches_ip(source_cidr: &str, pod_ip: &str) -> bool {
    match source_cidr.strip_prefix(pod_ip) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Compares a single assignment with the rule bound to its EIP.
pub fn decide(
    gateway_id: &str,
    assignment: &DesiredAssignment,
    observed: &ObservedRules,
) -> PodDecision {
    let pod = &assignment.pod;

    if pod.pod_ip.is_empty() {
        return PodDecision::Unscheduled;
    }

    let replacement = CreateRuleRequest {
        gateway_id: gateway_id.to_owned(),
        eip_id: assignment.assigned_eip.clone(),
        rule_name: pod.pod_name.clone(),
        source_cidr: pod.source_cidr(),
    };

    match observed.get(&assignment.assigned_eip) {
        None => PodDecision::Create(replacement),
        Some(rule) if cidr_matches_ip(&rule.source_cidr, &pod.pod_ip) => PodDecision::InSync {
            rule_id: rule.rule_id.clone(),
        },
        Some(rule) => PodDecision::Replace {
            stale: DeleteRuleRequest {
                gateway_id: gateway_id.to_owned(),
                rule_id: rule.rule_id.clone(),
                eip_id: rule.eip_id.clone(),
                pod_name: pod.pod_name.clone(),
                stale_cidr: rule.source_cidr.clone(),
            },
            replacement,
        },
    }
}

/// Actions needed to converge one gateway. A replaced rule is always deleted before its
/// replacement is created, actions of different pods don't depend on each other.
pub fn plan_gateway(group: &GatewayGroup) -> Vec<SnatAction> {
    group
        .decisions()
        .flat_map(|(_, decision)| decision.into_actions())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    pub action: SnatAction,
    /// `None` for dry runs
    pub outcome: Option<ActionOutcome>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassSummary {
    pub gateways: usize,
    pub created: usize,
    pub deleted: usize,
    pub in_sync: usize,
    pub unscheduled: usize,
    /// pods left without an EIP by a shortfall or a blank slot
    pub skipped: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PassReport {
    pub actions: Vec<ActionRecord>,
    pub summary: PassSummary,
}

/// Runs one reconciliation pass over every gateway group.
///
/// The pass stops at the first failing gateway call, mutations applied up to that point stay
/// in place. Deleting a drifted rule and creating its replacement are separate calls, so a
/// failure in between leaves the pod without a rule until the next pass.
pub async fn reconcile_egress(
    context: &ReconcilerContext,
    desired: DesiredState,
) -> Result<PassReport, ReconcilerError> {
    let mut report = PassReport::default();
    report.summary.skipped = desired.skipped.len();

    for (gateway_id, assignments) in desired.groups {
        if assignments.is_empty() {
            continue;
        }

        let group = GatewayGroup::load(context.gateway.as_ref(), gateway_id, assignments).await?;

        reconcile_group(context, &group, &mut report).await?;
        report.summary.gateways += 1;
    }

    let summary = &report.summary;
    info!(
        "Pass finished: {} gateway(s), {} rule(s) created, {} deleted, {} pod(s) in sync, {} unscheduled, {} skipped{}",
        summary.gateways,
        summary.created,
        summary.deleted,
        summary.in_sync,
        summary.unscheduled,
        summary.skipped,
        if context.dry_run { " (dry run)" } else { "" }
    );

    Ok(report)
}

async fn reconcile_group(
    context: &ReconcilerContext,
    group: &GatewayGroup,
    report: &mut PassReport,
) -> Result<(), ReconcilerError> {
    for (assignment, decision) in group.decisions() {
        let pod_name = &assignment.pod.pod_name;

        match &decision {
            PodDecision::InSync { rule_id } => {
                info!("'{pod_name}' is already bound to '{}' by '{rule_id}'", assignment.assigned_eip);
                report.summary.in_sync += 1;
            }
            PodDecision::Unscheduled => {
                warn!("'{pod_name}' has no IP address yet, skipping");
                report.summary.unscheduled += 1;
            }
            PodDecision::Create(_) => {
                info!("'{pod_name}' has no SNAT rule on '{}'", assignment.assigned_eip);
            }
            PodDecision::Replace { stale, replacement } => {
                warn!(
                    "'{pod_name}' moved from {} to {}, replacing SNAT rule '{}'",
                    stale.stale_cidr, replacement.source_cidr, stale.rule_id
                );
            }
        }

        for action in decision.into_actions() {
            let outcome = if context.dry_run {
                info!(
                    "Would {} SNAT rule for '{pod_name}' on '{}' ({} -> {})",
                    if action.is_create() { "create" } else { "delete" },
                    action.gateway_id(),
                    action.source_cidr(),
                    action.eip_id()
                );
                None
            } else {
                Some(apply(context.gateway.as_ref(), &action).await?)
            };

            if action.is_create() {
                report.summary.created += 1;
            } else {
                report.summary.deleted += 1;
            }

            report.actions.push(ActionRecord { action, outcome });
        }
    }

    Ok(())
}

async fn apply(api: &dyn NatGatewayApi, action: &SnatAction) -> Result<ActionOutcome, ReconcilerError> {
    execute_action(api, action).await.map_err(|error| match action {
        SnatAction::Create(request) => ReconcilerError::CreateRuleError(
            request.rule_name.clone(),
            request.gateway_id.clone(),
            error,
        ),
        SnatAction::Delete(request) => ReconcilerError::DeleteRuleError(
            request.rule_id.clone(),
            request.gateway_id.clone(),
            error,
        ),
    })
}
