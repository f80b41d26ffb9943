use super::*;

fn patient() -> Session {
    Session {
        id: "p-1".into(),
        email: "patient1@email.com".into(),
        name: "John Smith".into(),
        avatar: None,
        profile: Profile::Patient { zip_code: "10001".into() },
    }
}

fn staff() -> Session {
    Session {
        id: "h-1".into(),
        email: "staff1@hospital.com".into(),
        name: "Dr. Sarah Wilson".into(),
        avatar: Some("/avatars/sarah.png".into()),
        profile: Profile::HospitalStaff {
            hospital_name: "Central Hospital".into(),
            staff_role: "Physician".into(),
            zip_code: "10002".into(),
        },
    }
}

// =============================================================================
// Role
// =============================================================================

#[test]
fn role_tags_are_kebab_case() {
    assert_eq!(Role::Patient.as_str(), "patient");
    assert_eq!(Role::HospitalStaff.as_str(), "hospital-staff");
    assert_eq!(Role::HospitalStaff.to_string(), "hospital-staff");
}

#[test]
fn role_follows_profile_variant() {
    assert_eq!(patient().role(), Role::Patient);
    assert_eq!(staff().role(), Role::HospitalStaff);
}

// =============================================================================
// Session serialization
// =============================================================================

#[test]
fn session_serializes_flat_with_role_tag() {
    let value = serde_json::to_value(staff()).unwrap();
    assert_eq!(value["role"], "hospital-staff");
    assert_eq!(value["hospital_name"], "Central Hospital");
    assert_eq!(value["staff_role"], "Physician");
    assert_eq!(value["email"], "staff1@hospital.com");
    assert!(value.get("profile").is_none());
}

#[test]
fn session_deserializes_without_avatar() {
    let raw = r#"{"id":"p-9","email":"a@b.c","name":"A","role":"patient","zip_code":"90210"}"#;
    let session: Session = serde_json::from_str(raw).unwrap();
    assert_eq!(session.role(), Role::Patient);
    assert!(session.avatar.is_none());
}

#[test]
fn session_rejects_unknown_role() {
    let raw = r#"{"id":"x","email":"a@b.c","name":"A","role":"admin","zip_code":"1"}"#;
    assert!(serde_json::from_str::<Session>(raw).is_err());
}

#[test]
fn session_rejects_missing_role_fields() {
    let raw = r#"{"id":"x","email":"a@b.c","name":"A","role":"hospital-staff","zip_code":"1"}"#;
    assert!(serde_json::from_str::<Session>(raw).is_err());
}

// =============================================================================
// SessionState
// =============================================================================

#[test]
fn session_state_defaults_to_unauthenticated() {
    let state = SessionState::default();
    assert!(!state.is_authenticated());
    assert!(state.session().is_none());
    assert!(state.role().is_none());
}

#[test]
fn session_state_exposes_role_when_authenticated() {
    let state = SessionState::Authenticated(patient());
    assert!(state.is_authenticated());
    assert_eq!(state.role(), Some(Role::Patient));
}
