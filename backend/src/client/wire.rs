//! Row shapes exchanged with the backend and their normalisation.
//!
//! Older rows name the client `title`, and some omit `employee_count`;
//! both drifts are absorbed here so the rest of the client only ever sees
//! the canonical [`Load`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ClientError;
use crate::domain::{
    ChangeKind, ClientName, ClientNumber, EmployeeCount, Load, LoadDraft, LoadId, LoadPatch,
    LoadStatus, UserId,
};

/// A load row as the backend sends it.
#[derive(Debug, Clone, Deserialize)]
pub struct LoadRecord {
    pub id: LoadId,
    #[serde(alias = "title")]
    pub client_name: String,
    pub client_number: String,
    pub status: String,
    #[serde(default)]
    pub employee_count: Option<i64>,
    #[serde(default)]
    pub assigned_to: Option<UserId>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<LoadRecord> for Load {
    type Error = ClientError;

    fn try_from(record: LoadRecord) -> Result<Self, Self::Error> {
        let invalid = |err: crate::domain::LoadValidationError| ClientError::decode(err.to_string());
        let employee_count = match record.employee_count {
            None | Some(0) => EmployeeCount::ONE,
            Some(count) => EmployeeCount::new(count).map_err(invalid)?,
        };
        Ok(Self {
            id: record.id,
            client_name: ClientName::new(record.client_name).map_err(invalid)?,
            client_number: ClientNumber::new(record.client_number).map_err(invalid)?,
            status: record
                .status
                .parse::<LoadStatus>()
                .map_err(invalid)?,
            employee_count,
            assigned_to: record.assigned_to,
            created_by: record.created_by,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// Decode and normalise one row from JSON.
pub fn decode_load(value: serde_json::Value) -> Result<Load, ClientError> {
    let record: LoadRecord =
        serde_json::from_value(value).map_err(|err| ClientError::decode(err.to_string()))?;
    Load::try_from(record)
}

/// Push message: `{ "event_type": "update", "record": { ... } }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeEnvelope {
    pub event_type: ChangeKind,
    pub record: LoadRecord,
}

/// A normalised change event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub record: Load,
}

impl ChangeEvent {
    /// Parse a push message from text.
    pub fn parse(text: &str) -> Result<Self, ClientError> {
        let envelope: ChangeEnvelope =
            serde_json::from_str(text).map_err(|err| ClientError::decode(err.to_string()))?;
        Ok(Self {
            kind: envelope.event_type,
            record: Load::try_from(envelope.record)?,
        })
    }
}

/// Body for `POST /loads`.
#[derive(Debug, Clone, Serialize)]
pub struct NewLoadBody<'a> {
    pub client_name: &'a str,
    pub client_number: &'a str,
    pub employee_count: u32,
    pub assigned_to: Option<UserId>,
    pub status: LoadStatus,
}

impl<'a> From<&'a LoadDraft> for NewLoadBody<'a> {
    fn from(draft: &'a LoadDraft) -> Self {
        Self {
            client_name: draft.client_name.as_ref(),
            client_number: draft.client_number.as_ref(),
            employee_count: draft.employee_count.get(),
            assigned_to: draft.assigned_to,
            status: draft.status,
        }
    }
}

/// Body for `PUT /loads/{id}`; absent fields stay untouched and an explicit
/// `"assigned_to": null` clears the assignee.
#[derive(Debug, Clone, Serialize)]
pub struct PatchBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_number: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LoadStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Option<UserId>>,
}

impl<'a> From<&'a LoadPatch> for PatchBody<'a> {
    fn from(patch: &'a LoadPatch) -> Self {
        Self {
            client_name: patch.client_name.as_ref().map(|name| name.as_ref()),
            client_number: patch.client_number.as_ref().map(|number| number.as_ref()),
            status: patch.status,
            employee_count: patch.employee_count.map(EmployeeCount::get),
            assigned_to: patch.assigned_to,
        }
    }
}
