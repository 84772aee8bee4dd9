use couple_types::{
    clip_countdown_label, clip_note_text, Countdown, Note, NoteAuthor, Streak,
    COUNTDOWN_LABEL_MAX_LEN, NOTE_TEXT_MAX_LEN,
};

// ── Clipping ─────────────────────────────────────────────────────

#[test]
fn label_within_limit_is_kept() {
    let clipped = clip_countdown_label("  Reunion ");
    assert_eq!(clipped.value, "Reunion");
    assert!(!clipped.truncated);
}

#[test]
fn label_over_limit_is_cut() {
    let clipped = clip_countdown_label("Wiedersehen in Wien");
    assert_eq!(clipped.value.chars().count(), COUNTDOWN_LABEL_MAX_LEN);
    assert_eq!(clipped.value, "Wiedersehen ");
    assert!(clipped.truncated);
}

#[test]
fn label_counts_characters_not_bytes() {
    let clipped = clip_countdown_label("ÄÖÜäöüÄÖÜäöü");
    assert_eq!(clipped.value, "ÄÖÜäöüÄÖÜäöü");
    assert!(!clipped.truncated);
}

#[test]
fn note_within_limit_is_trimmed() {
    let clipped = clip_note_text("  miss you \n");
    assert_eq!(clipped.value, "miss you");
    assert!(!clipped.truncated);
}

#[test]
fn note_over_limit_is_cut() {
    let long = "x".repeat(NOTE_TEXT_MAX_LEN + 20);
    let clipped = clip_note_text(&long);
    assert_eq!(clipped.value.chars().count(), NOTE_TEXT_MAX_LEN);
    assert!(clipped.truncated);
}

#[test]
fn note_exactly_at_limit_is_not_truncated() {
    let exact = "y".repeat(NOTE_TEXT_MAX_LEN);
    let clipped = clip_note_text(&exact);
    assert_eq!(clipped.value, exact);
    assert!(!clipped.truncated);
}

// ── Countdown ────────────────────────────────────────────────────

#[test]
fn countdown_title_falls_back() {
    let mut countdown = Countdown::default();
    assert_eq!(countdown.display_title(), "Countdown");

    countdown.label = Some("   ".into());
    assert_eq!(countdown.display_title(), "Countdown");

    countdown.label = Some("Paris".into());
    assert_eq!(countdown.display_title(), "Paris");
}

#[test]
fn set_label_clears_on_empty() {
    let mut countdown = Countdown::default();
    countdown.set_label("Trip");
    assert_eq!(countdown.label.as_deref(), Some("Trip"));

    let clipped = countdown.set_label("   ");
    assert!(clipped.value.is_empty());
    assert_eq!(countdown.label, None);
}

// ── Note ─────────────────────────────────────────────────────────

fn note(author: NoteAuthor, initials: &str) -> Note {
    Note {
        text: "hi".into(),
        author_initials: initials.into(),
        author,
        updated_at: None,
    }
}

#[test]
fn author_me_uses_current_me_initials() {
    assert_eq!(note(NoteAuthor::Me, "OLD").display_author_initials("LS", "JB"), "LS");
}

#[test]
fn author_partner_uses_current_partner_initials() {
    assert_eq!(note(NoteAuthor::Partner, "OLD").display_author_initials("LS", "JB"), "JB");
}

#[test]
fn unknown_author_infers_from_initials() {
    assert_eq!(note(NoteAuthor::Unknown, "LS").display_author_initials("LS", "JB"), "LS");
    assert_eq!(note(NoteAuthor::Unknown, "JB").display_author_initials("LS", "JB"), "JB");
}

#[test]
fn unknown_author_without_match_keeps_stored() {
    assert_eq!(note(NoteAuthor::Unknown, "QQ").display_author_initials("LS", "JB"), "QQ");
}

#[test]
fn note_author_parses() {
    assert_eq!("me".parse::<NoteAuthor>().unwrap(), NoteAuthor::Me);
    assert_eq!("partner".parse::<NoteAuthor>().unwrap(), NoteAuthor::Partner);
    assert_eq!("unknown".parse::<NoteAuthor>().unwrap(), NoteAuthor::Unknown);
    assert!("both".parse::<NoteAuthor>().is_err());
}

// ── Streak ───────────────────────────────────────────────────────

#[test]
fn streak_default_is_one() {
    let streak = Streak::default();
    assert_eq!(streak.streak_count, 1);
    assert_eq!(streak.longest_streak, 1);
    assert!(streak.last_note_at.is_none());
}
