use couple_types::{CoupleRole, CoupleState, Entitlement, Identity, PairingStatus, Snapshot};
use pretty_assertions::assert_eq;

// ── CoupleRole / Entitlement ─────────────────────────────────────

#[test]
fn role_roundtrips_through_str() {
    for role in [CoupleRole::None, CoupleRole::Owner, CoupleRole::Partner] {
        assert_eq!(role.as_str().parse::<CoupleRole>().unwrap(), role);
    }
    assert!("admin".parse::<CoupleRole>().is_err());
}

#[test]
fn role_counterpart() {
    assert_eq!(CoupleRole::Owner.counterpart(), Some(CoupleRole::Partner));
    assert_eq!(CoupleRole::Partner.counterpart(), Some(CoupleRole::Owner));
    assert_eq!(CoupleRole::None.counterpart(), None);
}

#[test]
fn entitlement_parses() {
    assert_eq!("locked".parse::<Entitlement>().unwrap(), Entitlement::Locked);
    assert_eq!("unlocked".parse::<Entitlement>().unwrap(), Entitlement::Unlocked);
    assert!("".parse::<Entitlement>().is_err());
}

#[test]
fn role_serde_is_lowercase() {
    let json = serde_json::to_string(&CoupleRole::Partner).unwrap();
    assert_eq!(json, "\"partner\"");
}

// ── CoupleState ──────────────────────────────────────────────────

#[test]
fn default_state_is_unpaired_and_unlocked() {
    let state = CoupleState::default();
    assert_eq!(state.role, CoupleRole::None);
    assert!(state.is_unlocked());
    assert!(!state.paired);
    assert_eq!(state.status(), PairingStatus::Unpaired);
    assert!(!state.can_sync());
}

#[test]
fn active_code_ignores_empty() {
    let mut state = CoupleState::default();
    state.invite_code = Some(String::new());
    assert_eq!(state.active_code(), None);
    state.invite_code = Some("   ".into());
    assert_eq!(state.active_code(), None);
    state.invite_code = Some("ABCD-EFGH".into());
    assert_eq!(state.active_code(), Some("ABCD-EFGH"));
}

#[test]
fn status_follows_role_and_paired() {
    let owner = CoupleState {
        role: CoupleRole::Owner,
        entitlement: Entitlement::Unlocked,
        paired: true,
        invite_code: Some("ABCD-EFGH".into()),
    };
    assert_eq!(owner.status(), PairingStatus::OwnerPaired);
    assert!(owner.can_sync());

    let partner = CoupleState {
        role: CoupleRole::Partner,
        ..owner.clone()
    };
    assert_eq!(partner.status(), PairingStatus::PartnerPaired);

    let stale = CoupleState {
        role: CoupleRole::None,
        ..owner.clone()
    };
    assert_eq!(stale.status(), PairingStatus::Unpaired);
    assert!(!stale.can_sync());

    let locked = CoupleState {
        entitlement: Entitlement::Locked,
        ..owner
    };
    assert!(!locked.can_sync());
}

// ── Snapshot / Identity ──────────────────────────────────────────

#[test]
fn default_snapshot_pair_label() {
    assert_eq!(Snapshot::default().pair_label(), "A ↔ B");
}

#[test]
fn normalized_snapshot_matches_persisted_form() {
    let mut snapshot = Snapshot::default();
    snapshot.couple.invite_code = Some(" ".into());
    snapshot.me.lat = Some(52.52);
    snapshot.me.lon = Some(13.405);
    snapshot.partner.city_label = Some("  Vienna ".into());
    snapshot.countdown.label = Some("  Wiedersehen in Wien".into());
    snapshot.note.text = "x".repeat(120);

    let normalized = snapshot.normalized();
    assert_eq!(normalized.couple.invite_code, None);
    assert_eq!(normalized.me.coordinates(), None);
    assert_eq!(normalized.me.lat, None);
    assert_eq!(normalized.partner.city_label.as_deref(), Some("Vienna"));
    assert_eq!(normalized.countdown.label.as_deref(), Some("Wiedersehen "));
    assert_eq!(normalized.note.text.chars().count(), 100);
}

#[test]
fn snapshot_serde_roundtrip() {
    let mut snapshot = Snapshot::default();
    snapshot.me.set_name("Lena", "A");
    let json = serde_json::to_string(&snapshot).unwrap();
    let parsed: Snapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, snapshot);
}

#[test]
fn identity_is_transparent() {
    let id = Identity::new("001234.abcd");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"001234.abcd\"");
    assert_eq!(id.to_string(), "001234.abcd");
    assert!(!id.is_empty());
}
