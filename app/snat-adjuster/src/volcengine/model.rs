use serde::Deserialize;

/// Envelope shared by every OpenAPI response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiResponse<T> {
    pub response_metadata: ResponseMetadata,
    pub result: Option<T>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseMetadata {
    #[serde(default)]
    pub request_id: String,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeNatGatewaysResult {
    #[serde(default)]
    pub nat_gateways: Vec<NatGateway>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NatGateway {
    pub nat_gateway_id: String,
    #[serde(default)]
    pub snat_entry_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeSnatEntriesResult {
    #[serde(default)]
    pub snat_entries: Vec<SnatEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SnatEntry {
    pub snat_entry_id: String,
    pub nat_gateway_id: String,
    pub eip_id: String,
    /// unset for subnet scoped entries
    #[serde(default)]
    pub source_cidr: String,
    pub snat_entry_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateSnatEntryResult {
    pub snat_entry_id: String,
}
