use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;

use crate::{
    gateway::{CreateRuleRequest, GatewayError, NatGatewayApi, SnatRule},
    resources::{
        annotations::{get_eip_candidates_annotation, get_gateway_id_annotation},
        egress::PodEgressSpec,
    },
};

pub fn egress_annotations(gateway_id: &str, eip_candidates: &[&str]) -> BTreeMap<String, String> {
    BTreeMap::from([
        (get_gateway_id_annotation(), gateway_id.to_owned()),
        (get_eip_candidates_annotation(), eip_candidates.join(",")),
    ])
}

pub fn spec(name: &str, ip: &str, gateway_id: &str, eips: &[&str]) -> PodEgressSpec {
    PodEgressSpec {
        pod_name: name.to_owned(),
        namespace: Some("default".to_owned()),
        pod_ip: ip.to_owned(),
        enabled: true,
        gateway_id: gateway_id.to_owned(),
        eip_candidates: eips.iter().map(|eip| eip.to_string()).collect(),
    }
}

pub fn rule(rule_id: &str, gateway_id: &str, eip_id: &str, source_cidr: &str) -> SnatRule {
    SnatRule {
        rule_id: rule_id.to_owned(),
        gateway_id: gateway_id.to_owned(),
        eip_id: eip_id.to_owned(),
        source_cidr: source_cidr.to_owned(),
        name: None,
    }
}

#[derive(Debug, Default)]
struct GatewayState {
    gateways: BTreeSet<String>,
    rules: Vec<SnatRule>,
    next_rule: usize,
    calls: Vec<String>,
    failing_call: Option<&'static str>,
}

/// Gateway double keeping its rules in memory and recording every call
#[derive(Debug, Default)]
pub struct InMemoryGateway(Mutex<GatewayState>);

impl InMemoryGateway {
    pub fn with_gateway(gateway_id: &str) -> Self {
        let gateway = Self::default();
        gateway.state().gateways.insert(gateway_id.to_owned());

        gateway
    }

    pub fn add_gateway(&self, gateway_id: &str) {
        self.state().gateways.insert(gateway_id.to_owned());
    }

    pub fn insert_rule(&self, rule: SnatRule) {
        self.state().rules.push(rule);
    }

    pub fn fail_on(&self, call: &'static str) {
        self.state().failing_call = Some(call);
    }

    pub fn rules(&self) -> Vec<SnatRule> {
        self.state().rules.clone()
    }

    pub fn mutating_calls(&self) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .filter(|call| call.starts_with("create") || call.starts_with("delete"))
            .cloned()
            .collect()
    }

    pub fn describe_rules_calls(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| call.starts_with("describe_rules"))
            .count()
    }

    fn state(&self) -> MutexGuard<'_, GatewayState> {
        self.0.lock().unwrap()
    }

    fn record(&self, call: &'static str, details: String) -> Result<(), GatewayError> {
        let mut state = self.state();
        state.calls.push(format!("{call} {details}"));

        if state.failing_call == Some(call) {
            return Err(GatewayError::Api {
                code: "InternalError".to_owned(),
                message: format!("{call} failed"),
                request_id: "req-1".to_owned(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl NatGatewayApi for InMemoryGateway {
    async fn describe_gateway(&self, gateway_id: &str) -> Result<Vec<String>, GatewayError> {
        self.record("describe_gateway", gateway_id.to_owned())?;

        let state = self.state();
        if !state.gateways.contains(gateway_id) {
            return Err(GatewayError::GatewayNotFound(gateway_id.to_owned()));
        }

        Ok(state
            .rules
            .iter()
            .filter(|rule| rule.gateway_id == gateway_id)
            .map(|rule| rule.rule_id.clone())
            .collect())
    }

    async fn describe_rules(
        &self,
        gateway_id: &str,
        rule_ids: &[String],
    ) -> Result<Vec<SnatRule>, GatewayError> {
        self.record("describe_rules", gateway_id.to_owned())?;

        Ok(self
            .state()
            .rules
            .iter()
            .filter(|rule| rule.gateway_id == gateway_id && rule_ids.contains(&rule.rule_id))
            .cloned()
            .collect())
    }

    async fn create_rule(&self, request: &CreateRuleRequest) -> Result<String, GatewayError> {
        self.record(
            "create_rule",
            format!("{} {} {}", request.eip_id, request.rule_name, request.source_cidr),
        )?;

        let mut state = self.state();
        state.next_rule += 1;
        let rule_id = format!("snat-new-{}", state.next_rule);

        state.rules.push(SnatRule {
            rule_id: rule_id.clone(),
            gateway_id: request.gateway_id.clone(),
            eip_id: request.eip_id.clone(),
            source_cidr: request.source_cidr.clone(),
            name: Some(request.rule_name.clone()),
        });

        Ok(rule_id)
    }

    async fn delete_rule(&self, rule_id: &str) -> Result<(), GatewayError> {
        self.record("delete_rule", rule_id.to_owned())?;

        self.state().rules.retain(|rule| rule.rule_id != rule_id);

        Ok(())
    }
}
