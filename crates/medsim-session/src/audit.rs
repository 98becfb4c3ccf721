use serde::Serialize;
use tracing::info;

/// A structured record of a state change, written through `tracing`.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub action: &'static str,
    pub resource_type: &'static str,
    pub resource_id: String,
    pub actor: String,
    pub details: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(
        action: &'static str,
        resource_type: &'static str,
        resource_id: impl ToString,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            action,
            resource_type,
            resource_id: resource_id.to_string(),
            actor: actor.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// The full event as a JSON record.
    pub fn to_record(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    pub fn emit(&self) {
        info!(
            audit.action = self.action,
            audit.resource_type = self.resource_type,
            audit.resource_id = %self.resource_id,
            audit.actor = %self.actor,
            audit.record = %self.to_record(),
            "audit event"
        );
    }
}
