use std::collections::{btree_map::Entry, BTreeMap};

use log::{debug, warn};

use crate::gateway::{GatewayError, NatGatewayApi, SnatRule};

/// SNAT rules of a single gateway, indexed by the EIP they bind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservedRules(BTreeMap<String, SnatRule>);

impl ObservedRules {
    pub fn get(&self, eip_id: &str) -> Option<&SnatRule> {
        self.0.get(eip_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<SnatRule> for ObservedRules {
    fn from_iter<T: IntoIterator<Item = SnatRule>>(iter: T) -> Self {
        let mut rules = BTreeMap::new();

        for rule in iter {
            match rules.entry(rule.eip_id.clone()) {
                Entry::Vacant(entry) => {
                    entry.insert(rule);
                }
                Entry::Occupied(entry) => {
                    let kept: &SnatRule = entry.get();
                    warn!(
                        "EIP '{}' is bound by both '{}' and '{}', only '{}' will be considered",
                        rule.eip_id, kept.rule_id, rule.rule_id, kept.rule_id
                    );
                }
            }
        }

        Self(rules)
    }
}

/// Loads the SNAT rules currently configured on a gateway.
///
/// A gateway without any rules yields an empty index. API failures are passed through as-is.
pub async fn fetch_observed_rules(
    api: &dyn NatGatewayApi,
    gateway_id: &str,
) -> Result<ObservedRules, GatewayError> {
    let rule_ids = api.describe_gateway(gateway_id).await?;

    if rule_ids.is_empty() {
        debug!("'{gateway_id}' has no SNAT rules yet");
        return Ok(ObservedRules::default());
    }

    let rules = api
        .describe_rules(gateway_id, &rule_ids)
        .await?
        .into_iter()
        .collect::<ObservedRules>();

    debug!("'{gateway_id}' has {} SNAT rule(s) bound to EIPs", rules.len());

    Ok(rules)
}

#[cfg(test)]
mod tests {
    use crate::testing::{rule, InMemoryGateway};

    use super::*;

    #[tokio::test]
    async fn empty_gateway_yields_empty_index() {
        let gateway = InMemoryGateway::with_gateway("ngw-1");

        let rules = fetch_observed_rules(&gateway, "ngw-1").await.unwrap();

        assert!(rules.is_empty());
        assert_eq!(gateway.describe_rules_calls(), 0);
    }

    #[tokio::test]
    async fn indexes_rules_by_eip() {
        let gateway = InMemoryGateway::with_gateway("ngw-1");
        gateway.insert_rule(rule("snat-1", "ngw-1", "eip-1", "10.0.0.5/32"));
        gateway.insert_rule(rule("snat-2", "ngw-1", "eip-2", "10.0.0.6/32"));

        let rules = fetch_observed_rules(&gateway, "ngw-1").await.unwrap();

        assert_eq!(rules.len(), 2);
        assert_eq!(rules.get("eip-2").unwrap().rule_id, "snat-2");
        assert!(rules.get("eip-3").is_none());
    }

    #[tokio::test]
    async fn unknown_gateway_is_an_error() {
        let gateway = InMemoryGateway::with_gateway("ngw-1");

        let result = fetch_observed_rules(&gateway, "ngw-404").await;

        assert!(matches!(result, Err(GatewayError::GatewayNotFound(id)) if id == "ngw-404"));
    }

    #[test]
    fn first_rule_wins_on_duplicate_eip() {
        let rules = [
            rule("snat-1", "ngw-1", "eip-1", "10.0.0.5/32"),
            rule("snat-2", "ngw-1", "eip-1", "10.0.0.6/32"),
        ]
        .into_iter()
        .collect::<ObservedRules>();

        assert_eq!(rules.len(), 1);
        assert_eq!(rules.get("eip-1").unwrap().rule_id, "snat-1");
    }
}
