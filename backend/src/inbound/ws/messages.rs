//! Wire-level message definitions for the WebSocket adapter.
//!
//! Every outbound frame is one JSON text message:
//! `{"event_type":"insert"|"update"|"delete","record":{...load...}}`.

use serde::Serialize;

use crate::domain::{ChangeKind, Load, LoadChange};

/// Outbound payload for one committed load change.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ChangeMessage {
    pub event_type: ChangeKind,
    /// Row after the change; the removed row for deletes.
    pub record: Load,
}

impl From<LoadChange> for ChangeMessage {
    fn from(value: LoadChange) -> Self {
        Self {
            event_type: value.kind,
            record: value.record,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use insta::assert_json_snapshot;
    use rstest::rstest;
    use uuid::Uuid;

    use super::*;
    use crate::domain::{ClientName, ClientNumber, LoadDraft, LoadId, LoadStatus, UserId};

    #[rstest]
    fn serialises_update_change() {
        let created_at = Utc
            .with_ymd_and_hms(2026, 5, 20, 9, 30, 0)
            .single()
            .expect("valid instant");
        let mut draft = LoadDraft::new(
            ClientName::new("Acme Freight").expect("name"),
            ClientNumber::new("AC-104").expect("number"),
        );
        draft.assigned_to = Some(UserId::from_uuid(Uuid::from_u128(2)));
        let before = Load::create(
            LoadId::from_uuid(Uuid::from_u128(1)),
            draft,
            UserId::from_uuid(Uuid::from_u128(3)),
            created_at,
        );
        let mut after = before.clone();
        after.status = LoadStatus::InProgress;
        after.updated_at = created_at + chrono::Duration::minutes(15);

        let message = ChangeMessage::from(LoadChange::updated(after, &before));
        assert_json_snapshot!(message);
    }

    #[rstest]
    fn delete_carries_the_removed_row() {
        let load = Load::create(
            LoadId::random(),
            LoadDraft::new(
                ClientName::new("Acme").expect("name"),
                ClientNumber::new("1").expect("number"),
            ),
            UserId::random(),
            Utc::now(),
        );
        let message = ChangeMessage::from(LoadChange::deleted(load.clone()));
        let value = serde_json::to_value(&message).expect("json");
        assert_eq!(value["event_type"], "delete");
        assert_eq!(value["record"]["id"], load.id.to_string());
    }
}
