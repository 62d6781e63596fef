use log::info;

use crate::{
    gateway::{GatewayError, NatGatewayApi},
    reconciler::action::SnatAction,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Created { rule_id: String },
    Deleted { rule_id: String },
}

impl ActionOutcome {
    pub fn rule_id(&self) -> &str {
        match self {
            Self::Created { rule_id } | Self::Deleted { rule_id } => rule_id,
        }
    }
}

/// Applies a single action to the gateway. Failures are returned untouched, nothing is retried.
pub async fn execute_action(
    api: &dyn NatGatewayApi,
    action: &SnatAction,
) -> Result<ActionOutcome, GatewayError> {
    match action {
        SnatAction::Create(request) => {
            info!(
                "Creating SNAT rule '{}' on '{}' ({} -> {})...",
                request.rule_name, request.gateway_id, request.source_cidr, request.eip_id
            );

            let rule_id = api.create_rule(request).await?;

            info!("Created SNAT rule '{rule_id}' for '{}'", request.rule_name);

            Ok(ActionOutcome::Created { rule_id })
        }
        SnatAction::Delete(request) => {
            info!(
                "Deleting SNAT rule '{}' on '{}' ({} -> {})...",
                request.rule_id, request.gateway_id, request.stale_cidr, request.eip_id
            );

            api.delete_rule(&request.rule_id).await?;

            Ok(ActionOutcome::Deleted {
                rule_id: request.rule_id.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        gateway::CreateRuleRequest,
        reconciler::action::DeleteRuleRequest,
        testing::{rule, InMemoryGateway},
    };

    use super::*;

    fn create_action() -> SnatAction {
        SnatAction::Create(CreateRuleRequest {
            gateway_id: "ngw-1".to_owned(),
            eip_id: "eip-1".to_owned(),
            rule_name: "web-a".to_owned(),
            source_cidr: "10.1.1.2/32".to_owned(),
        })
    }

    #[tokio::test]
    async fn create_returns_new_rule_id() {
        let gateway = InMemoryGateway::with_gateway("ngw-1");

        let outcome = execute_action(&gateway, &create_action()).await.unwrap();

        assert_eq!(
            outcome,
            ActionOutcome::Created {
                rule_id: "snat-new-1".to_owned()
            }
        );

        let rules = gateway.rules();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name.as_deref(), Some("web-a"));
        assert_eq!(rules[0].source_cidr, "10.1.1.2/32");
    }

    #[tokio::test]
    async fn delete_removes_rule() {
        let gateway = InMemoryGateway::with_gateway("ngw-1");
        gateway.insert_rule(rule("snat-1", "ngw-1", "eip-1", "10.0.0.5/32"));

        let action = SnatAction::Delete(DeleteRuleRequest {
            gateway_id: "ngw-1".to_owned(),
            rule_id: "snat-1".to_owned(),
            eip_id: "eip-1".to_owned(),
            pod_name: "web-a".to_owned(),
            stale_cidr: "10.0.0.5/32".to_owned(),
        });
        let outcome = execute_action(&gateway, &action).await.unwrap();

        assert_eq!(outcome.rule_id(), "snat-1");
        assert!(gateway.rules().is_empty());
    }

    #[tokio::test]
    async fn failures_are_propagated() {
        let gateway = InMemoryGateway::with_gateway("ngw-1");
        gateway.fail_on("create_rule");

        let result = execute_action(&gateway, &create_action()).await;

        assert!(matches!(result, Err(GatewayError::Api { .. })));
        assert!(gateway.rules().is_empty());
    }
}
