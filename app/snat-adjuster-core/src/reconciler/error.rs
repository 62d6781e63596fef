use thiserror::Error;

use crate::gateway::GatewayError;

#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error("Couldn't load SNAT rules of '{}'! Reason: {}", .0, .1)]
    ObservedStateError(String, GatewayError),
    #[error("Couldn't create SNAT rule for '{}' on '{}'! Reason: {}", .0, .1, .2)]
    CreateRuleError(String, String, GatewayError),
    #[error("Couldn't delete SNAT rule '{}' of '{}'! Reason: {}", .0, .1, .2)]
    DeleteRuleError(String, String, GatewayError),
}
