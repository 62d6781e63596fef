use std::borrow::Cow;

use async_trait::async_trait;
use thiserror::Error;

/// SNAT rule as it currently exists on a NAT gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnatRule {
    pub rule_id: String,
    pub gateway_id: String,
    pub eip_id: String,
    /// `<ip>/32`
    pub source_cidr: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRuleRequest {
    pub gateway_id: String,
    pub eip_id: String,
    pub rule_name: String,
    pub source_cidr: String,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Couldn't reach the gateway API! Reason: {}", .0)]
    Transport(Cow<'static, str>),
    #[error("Gateway API rejected the request ({code}): {message} [request id: {request_id}]")]
    Api {
        code: String,
        message: String,
        request_id: String,
    },
    #[error("Gateway API returned an invalid response! Details: {}", .0)]
    InvalidResponse(Cow<'static, str>),
    #[error("NAT gateway '{}' doesn't exist!", .0)]
    GatewayNotFound(String),
}

/// Rule management capabilities of a cloud NAT gateway.
///
/// Calls are awaited one at a time, implementations don't need to handle concurrent use.
#[async_trait]
pub trait NatGatewayApi: Send + Sync {
    /// Returns the IDs of every SNAT rule associated with the gateway.
    async fn describe_gateway(&self, gateway_id: &str) -> Result<Vec<String>, GatewayError>;

    async fn describe_rules(
        &self,
        gateway_id: &str,
        rule_ids: &[String],
    ) -> Result<Vec<SnatRule>, GatewayError>;

    /// Creates a rule and returns its ID.
    async fn create_rule(&self, request: &CreateRuleRequest) -> Result<String, GatewayError>;

    async fn delete_rule(&self, rule_id: &str) -> Result<(), GatewayError>;
}
