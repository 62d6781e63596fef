use std::collections::BTreeMap;

use log::{debug, warn};

use crate::resources::egress::PodEgressSpec;

/// EIP a pod is expected to egress through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredAssignment {
    pub pod: PodEgressSpec,
    /// rank of the pod within its gateway group
    pub ordinal: usize,
    pub assigned_eip: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredState {
    /// assignments keyed by gateway ID
    pub groups: BTreeMap<String, Vec<DesiredAssignment>>,
    /// pods left without an EIP for this pass
    pub skipped: Vec<PodEgressSpec>,
}

/// Groups pods by their target gateway and hands out EIP candidates by ordinal position.
///
/// Within a group the pods are sorted by name (namespace breaks ties), the i-th pod gets the
/// i-th entry of its own candidate list. Pods whose slot is past the end of the list, or whose
/// slot is blank, end up in `skipped`.
pub fn build_desired_state(specs: impl IntoIterator<Item = PodEgressSpec>) -> DesiredState {
    let mut pods_by_gateway: BTreeMap<String, Vec<PodEgressSpec>> = BTreeMap::new();

    for spec in specs.into_iter().filter(PodEgressSpec::is_participating) {
        pods_by_gateway
            .entry(spec.gateway_id.clone())
            .or_default()
            .push(spec);
    }

    let mut state = DesiredState::default();

    for (gateway_id, pods) in pods_by_gateway {
        let assignments = assign_group(&gateway_id, pods, &mut state.skipped);

        state.groups.insert(gateway_id, assignments);
    }

    state
}

fn assign_group(
    gateway_id: &str,
    mut pods: Vec<PodEgressSpec>,
    skipped: &mut Vec<PodEgressSpec>,
) -> Vec<DesiredAssignment> {
    pods.sort_by(|a, b| {
        a.pod_name
            .cmp(&b.pod_name)
            .then_with(|| a.namespace.cmp(&b.namespace))
    });

    let mut assignments = Vec::with_capacity(pods.len());

    for (ordinal, pod) in pods.into_iter().enumerate() {
        let assigned_eip = match pod.eip_candidates.get(ordinal) {
            Some(eip) if !eip.is_empty() => eip.to_owned(),
            Some(_) => {
                debug!(
                    "'{}' has no EIP declared for slot {ordinal} on '{gateway_id}', skipping",
                    pod.pod_name
                );
                skipped.push(pod);
                continue;
            }
            None => {
                warn!(
                    "'{}' is pod #{} on '{gateway_id}' but declares only {} EIP candidate(s), skipping",
                    pod.pod_name,
                    ordinal + 1,
                    pod.eip_candidates.len()
                );
                skipped.push(pod);
                continue;
            }
        };

        assignments.push(DesiredAssignment {
            pod,
            ordinal,
            assigned_eip,
        });
    }

    assignments
}
