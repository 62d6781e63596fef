use std::sync::Arc;

use crate::gateway::NatGatewayApi;

pub struct ReconcilerContext {
    pub gateway: Arc<dyn NatGatewayApi>,
    /// plan only, no rule gets created or deleted
    pub dry_run: bool,
}
