use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, trace};
use serde::de::DeserializeOwned;
use snat_adjuster_core::gateway::{CreateRuleRequest, GatewayError, NatGatewayApi, SnatRule};
use url::Url;

use crate::config::GatewayConfig;

use super::{
    model::{
        ApiResponse, CreateSnatEntryResult, DescribeNatGatewaysResult, DescribeSnatEntriesResult,
        ResponseMetadata, SnatEntry,
    },
    signer::{canonical_query, RequestSigner},
    API_VERSION, DESCRIBE_PAGE_SIZE, NATGATEWAY_SERVICE, REQUEST_TIMEOUT_SECS,
};

/// NAT gateway API client talking to the Volcengine OpenAPI endpoint
pub struct VolcengineNatGateway {
    http: reqwest::Client,
    signer: RequestSigner,
    endpoint: Url,
}

impl VolcengineNatGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|error| GatewayError::Transport(error.to_string().into()))?;

        Ok(Self {
            http,
            signer: RequestSigner::new(
                config.credentials.clone(),
                &config.region,
                NATGATEWAY_SERVICE,
            ),
            endpoint: config.endpoint.clone(),
        })
    }

    fn host(&self) -> Result<String, GatewayError> {
        let host = self.endpoint.host_str().ok_or_else(|| {
            GatewayError::Transport(format!("endpoint '{}' has no host", self.endpoint).into())
        })?;

        Ok(match self.endpoint.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_owned(),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        action: &str,
        mut params: Vec<(String, String)>,
    ) -> Result<Option<T>, GatewayError> {
        params.push(("Action".to_owned(), action.to_owned()));
        params.push(("Version".to_owned(), API_VERSION.to_owned()));

        let query = canonical_query(&params);
        let signature = self.signer.sign("GET", &self.host()?, &query, b"", Utc::now());

        let mut url = self.endpoint.clone();
        url.set_path("/");
        url.set_query(Some(&query));

        trace!("GET {url}");

        let response = self
            .http
            .get(url)
            .header("X-Date", &signature.x_date)
            .header("X-Content-Sha256", &signature.content_sha256)
            .header("Authorization", &signature.authorization)
            .send()
            .await
            .map_err(|error| GatewayError::Transport(error.to_string().into()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| GatewayError::Transport(error.to_string().into()))?;

        let envelope = serde_json::from_str::<ApiResponse<T>>(&body);

        match envelope {
            Ok(ApiResponse {
                response_metadata:
                    ResponseMetadata {
                        request_id,
                        error: Some(error),
                    },
                ..
            }) => {
                debug!("{action} failed with {} (request id {request_id})", error.code);

                Err(GatewayError::Api {
                    code: error.code,
                    message: error.message,
                    request_id,
                })
            }
            Ok(envelope) if status.is_success() => Ok(envelope.result),
            Ok(_) => Err(GatewayError::InvalidResponse(
                format!("{action} returned HTTP {status} without error details").into(),
            )),
            Err(_) if !status.is_success() => Err(GatewayError::Transport(
                format!("{action} returned HTTP {status}").into(),
            )),
            Err(error) => Err(GatewayError::InvalidResponse(
                format!("couldn't decode {action} response: {error}").into(),
            )),
        }
    }

    async fn call_for_result<T: DeserializeOwned>(
        &self,
        action: &str,
        params: Vec<(String, String)>,
    ) -> Result<T, GatewayError> {
        self.call(action, params).await?.ok_or_else(|| {
            GatewayError::InvalidResponse(format!("{action} response has no result").into())
        })
    }
}

fn param(key: &str, value: impl Into<String>) -> (String, String) {
    (key.to_owned(), value.into())
}

impl From<SnatEntry> for SnatRule {
    fn from(entry: SnatEntry) -> Self {
        Self {
            rule_id: entry.snat_entry_id,
            gateway_id: entry.nat_gateway_id,
            eip_id: entry.eip_id,
            source_cidr: entry.source_cidr,
            name: entry.snat_entry_name,
        }
    }
}

#[async_trait]
impl NatGatewayApi for VolcengineNatGateway {
    async fn describe_gateway(&self, gateway_id: &str) -> Result<Vec<String>, GatewayError> {
        let result = self
            .call_for_result::<DescribeNatGatewaysResult>(
                "DescribeNatGateways",
                vec![param("NatGatewayIds.1", gateway_id)],
            )
            .await
            .map_err(|error| match error {
                GatewayError::Api { code, .. } if code.ends_with("NotFound") => {
                    GatewayError::GatewayNotFound(gateway_id.to_owned())
                }
                other => other,
            })?;

        result
            .nat_gateways
            .into_iter()
            .find(|gateway| gateway.nat_gateway_id == gateway_id)
            .map(|gateway| gateway.snat_entry_ids)
            .ok_or_else(|| GatewayError::GatewayNotFound(gateway_id.to_owned()))
    }

    async fn describe_rules(
        &self,
        gateway_id: &str,
        rule_ids: &[String],
    ) -> Result<Vec<SnatRule>, GatewayError> {
        let mut rules = Vec::with_capacity(rule_ids.len());

        for chunk in rule_ids.chunks(DESCRIBE_PAGE_SIZE) {
            let mut params = vec![
                param("NatGatewayId", gateway_id),
                param("PageSize", DESCRIBE_PAGE_SIZE.to_string()),
            ];
            params.extend(
                chunk
                    .iter()
                    .enumerate()
                    .map(|(index, id)| param(&format!("SnatEntryIds.{}", index + 1), id)),
            );

            let result = self
                .call_for_result::<DescribeSnatEntriesResult>("DescribeSnatEntries", params)
                .await?;

            rules.extend(result.snat_entries.into_iter().map(SnatRule::from));
        }

        Ok(rules)
    }

    async fn create_rule(&self, request: &CreateRuleRequest) -> Result<String, GatewayError> {
        let result = self
            .call_for_result::<CreateSnatEntryResult>(
                "CreateSnatEntry",
                vec![
                    param("NatGatewayId", &request.gateway_id),
                    param("EipId", &request.eip_id),
                    param("SnatEntryName", &request.rule_name),
                    param("SourceCidr", &request.source_cidr),
                ],
            )
            .await?;

        Ok(result.snat_entry_id)
    }

    async fn delete_rule(&self, rule_id: &str) -> Result<(), GatewayError> {
        self.call::<serde_json::Value>("DeleteSnatEntry", vec![param("SnatEntryId", rule_id)])
            .await?;

        Ok(())
    }
}
