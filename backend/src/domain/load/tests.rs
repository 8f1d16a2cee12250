//! Load field validation and state machine coverage.

use super::*;
use chrono::{Duration, TimeZone};
use rstest::{fixture, rstest};
use serde_json::json;

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn load() -> Load {
    let draft = LoadDraft::new(
        ClientName::new("Acme").expect("name"),
        ClientNumber::new("123").expect("number"),
    );
    Load::create(LoadId::random(), draft, UserId::random(), at(9))
}

#[rstest]
fn status_tokens_are_exactly_the_five_lowercase_values() {
    let tokens: Vec<&str> = LoadStatus::ALL.iter().map(|s| s.as_str()).collect();
    assert_eq!(
        tokens,
        ["pending", "in_progress", "paused", "completed", "transferred"]
    );
    for status in LoadStatus::ALL {
        let wire = serde_json::to_value(status).expect("serialize");
        assert_eq!(wire, json!(status.as_str()));
        assert_eq!(status.as_str().parse::<LoadStatus>(), Ok(status));
    }
}

#[rstest]
#[case("Pending")]
#[case("in-progress")]
#[case("done")]
#[case("")]
fn unknown_status_tokens_are_rejected(#[case] token: &str) {
    assert_eq!(
        token.parse::<LoadStatus>(),
        Err(LoadValidationError::InvalidStatus(token.to_owned()))
    );
    assert!(serde_json::from_value::<LoadStatus>(json!(token)).is_err());
}

#[rstest]
#[case(LoadStatus::Pending, LoadStatus::InProgress, true)]
#[case(LoadStatus::Pending, LoadStatus::Completed, false)]
#[case(LoadStatus::InProgress, LoadStatus::Paused, true)]
#[case(LoadStatus::InProgress, LoadStatus::Completed, true)]
#[case(LoadStatus::InProgress, LoadStatus::Transferred, true)]
#[case(LoadStatus::InProgress, LoadStatus::Pending, false)]
#[case(LoadStatus::Paused, LoadStatus::InProgress, true)]
#[case(LoadStatus::Paused, LoadStatus::Completed, false)]
#[case(LoadStatus::Completed, LoadStatus::InProgress, false)]
#[case(LoadStatus::Transferred, LoadStatus::Pending, false)]
#[case(LoadStatus::Paused, LoadStatus::Paused, true)]
fn strict_policy_follows_the_graph(
    #[case] from: LoadStatus,
    #[case] to: LoadStatus,
    #[case] allowed: bool,
) {
    assert_eq!(TransitionPolicy::Strict.check(from, to).is_ok(), allowed);
}

#[rstest]
fn permissive_policy_accepts_every_pair() {
    for from in LoadStatus::ALL {
        for to in LoadStatus::ALL {
            assert!(TransitionPolicy::Permissive.check(from, to).is_ok());
        }
    }
}

#[rstest]
fn only_completed_and_transferred_are_terminal() {
    let terminal: Vec<LoadStatus> = LoadStatus::ALL
        .into_iter()
        .filter(|s| s.is_terminal())
        .collect();
    assert_eq!(terminal, [LoadStatus::Completed, LoadStatus::Transferred]);
}

#[rstest]
#[case("", LoadValidationError::EmptyClientName)]
#[case("   ", LoadValidationError::EmptyClientName)]
fn client_name_must_not_be_blank(#[case] raw: &str, #[case] expected: LoadValidationError) {
    let err = ClientName::new(raw).expect_err("blank name");
    assert_eq!(err, expected);
    assert_eq!(err.field(), "client_name");
}

#[rstest]
#[case(0)]
#[case(-3)]
#[case(i64::from(u32::MAX) + 1)]
fn employee_count_must_be_positive(#[case] raw: i64) {
    let err = EmployeeCount::new(raw).expect_err("invalid count");
    assert_eq!(err.field(), "employee_count");
}

#[rstest]
fn draft_defaults_to_pending_single_employee_unassigned(load: Load) {
    assert_eq!(load.status, LoadStatus::Pending);
    assert_eq!(load.employee_count.get(), 1);
    assert!(load.assigned_to.is_none());
    assert_eq!(load.created_at, load.updated_at);
}

#[rstest]
fn with_patch_bumps_updated_at(load: Load) {
    let next = load.with_patch(&LoadPatch::status(LoadStatus::InProgress), at(10));
    assert_eq!(next.status, LoadStatus::InProgress);
    assert_eq!(next.updated_at, at(10));
    assert_eq!(next.created_at, load.created_at);
}

#[rstest]
fn with_patch_never_moves_updated_at_backwards(load: Load) {
    let next = load.with_patch(&LoadPatch::status(LoadStatus::InProgress), at(9) - Duration::hours(2));
    assert_eq!(next.updated_at, load.updated_at);
}

#[rstest]
fn assign_patch_sets_and_clears_assignee(load: Load) {
    let user = UserId::random();
    let assigned = load.with_patch(&LoadPatch::assign(Some(user)), at(10));
    assert!(assigned.is_assigned_to(&user));
    let cleared = assigned.with_patch(&LoadPatch::assign(None), at(11));
    assert!(cleared.assigned_to.is_none());
}

#[rstest]
fn status_only_detection() {
    assert!(LoadPatch::status(LoadStatus::Paused).is_status_only());
    assert!(!LoadPatch::assign(None).is_status_only());
    assert!(LoadPatch::default().is_empty());
    let mixed = LoadPatch {
        employee_count: Some(EmployeeCount::ONE),
        ..LoadPatch::status(LoadStatus::Paused)
    };
    assert!(!mixed.is_status_only());
}

#[rstest]
fn load_json_uses_wire_field_names(load: Load) {
    let value = serde_json::to_value(&load).expect("serialize load");
    assert_eq!(value["client_name"], json!("Acme"));
    assert_eq!(value["status"], json!("pending"));
    assert_eq!(value["employee_count"], json!(1));
    assert_eq!(value["assigned_to"], json!(null));
    let decoded: Load = serde_json::from_value(value).expect("decode load");
    assert_eq!(decoded, load);
}

#[rstest]
fn load_json_rejects_invalid_status(load: Load) {
    let mut value = serde_json::to_value(&load).expect("serialize load");
    value["status"] = json!("archived");
    assert!(serde_json::from_value::<Load>(value).is_err());
}
