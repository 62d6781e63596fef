use crate::gateway::CreateRuleRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRuleRequest {
    pub gateway_id: String,
    pub rule_id: String,
    pub eip_id: String,
    /// pod whose drift made the rule stale
    pub pod_name: String,
    pub stale_cidr: String,
}

/// Single gateway mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnatAction {
    Create(CreateRuleRequest),
    Delete(DeleteRuleRequest),
}

impl SnatAction {
    pub fn gateway_id(&self) -> &str {
        match self {
            Self::Create(request) => &request.gateway_id,
            Self::Delete(request) => &request.gateway_id,
        }
    }

    pub fn pod_name(&self) -> &str {
        match self {
            Self::Create(request) => &request.rule_name,
            Self::Delete(request) => &request.pod_name,
        }
    }

    pub fn eip_id(&self) -> &str {
        match self {
            Self::Create(request) => &request.eip_id,
            Self::Delete(request) => &request.eip_id,
        }
    }

    pub fn source_cidr(&self) -> &str {
        match self {
            Self::Create(request) => &request.source_cidr,
            Self::Delete(request) => &request.stale_cidr,
        }
    }

    pub fn is_create(&self) -> bool {
        matches!(self, Self::Create(_))
    }
}

/// What a pass decided for a single pod
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PodDecision {
    /// the rule bound to the assigned EIP already points at the pod
    InSync { rule_id: String },
    /// the pod has no IP yet, its slot stays reserved
    Unscheduled,
    Create(CreateRuleRequest),
    /// the pod moved, the stale rule is deleted before the new one is created
    Replace {
        stale: DeleteRuleRequest,
        replacement: CreateRuleRequest,
    },
}

impl PodDecision {
    pub fn into_actions(self) -> Vec<SnatAction> {
        match self {
            Self::InSync { .. } | Self::Unscheduled => Vec::new(),
            Self::Create(request) => vec![SnatAction::Create(request)],
            Self::Replace { stale, replacement } => vec![
                SnatAction::Delete(stale),
                SnatAction::Create(replacement),
            ],
        }
    }
}
