use chrono::Utc;
use metrics::counter;
use uuid::Uuid;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::Value as Json;
use std::sync::Arc;
use tracing::{instrument, warn};

use crate::entities::core_data::{audit_log, AuditAction};
use crate::services::Actor;

/// Writes audit trail entries. Failures are logged and never abort the audited operation.
#[derive(Clone)]
pub struct AuditService {
    db: Arc<DatabaseConnection>,
}

impl AuditService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, actor, object_id, changes), fields(model = model_name))]
    pub async fn record(
        &self,
        actor: &Actor,
        action: AuditAction,
        model_name: &str,
        object_id: impl ToString,
        object_repr: &str,
        changes: Option<Json>,
    ) {
        let entry = audit_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(actor.user_id),
            action: Set(action),
            model_name: Set(model_name.to_string()),
            object_id: Set(object_id.to_string()),
            object_repr: Set(truncate(object_repr, 200)),
            changes: Set(changes),
            ip_address: Set(actor.ip_address.clone()),
            user_agent: Set(actor.user_agent.clone()),
            created_at: Set(Utc::now()),
        };

        match entry.insert(&*self.db).await {
            Ok(_) => counter!("farjad.audit.entries", 1, "model" => model_name.to_string()),
            Err(e) => warn!(error = %e, action = ?action, "Failed to write audit log entry"),
        }
    }
}

fn truncate(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate("فرجاد", 3), "فرج");
        assert_eq!(truncate("short", 200), "short");
    }
}
