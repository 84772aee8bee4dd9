//! Command handling for `couplectl`.
//!
//! Each invocation opens the local state file and a record directory,
//! runs one command through a [`CoupleSession`] and returns the text to
//! print. Two state files sharing one record directory behave like two
//! paired devices.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use couple_display::DisplayState;
use couple_store::{LocalStateStore, SqliteStateStore};
use couple_sync::{
    CoupleSession, FsRecordStore, FsRecordStoreConfig, PushOutcome, RedeemReport, StaticIdentity,
    SyncConfig, SyncEngine,
};
use couple_types::{Identity, NoteAuthor, PairingStatus, Snapshot};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "couplectl")]
#[command(about = "Pair two devices and sync their shared couple state")]
pub struct Args {
    /// Local state database
    #[arg(long, env = "COUPLE_STATE", default_value = "couple-state.db")]
    pub state: PathBuf,

    /// Folder holding the shared records
    #[arg(long, env = "COUPLE_REMOTE", default_value = "couple-records")]
    pub remote: PathBuf,

    /// Identity of the signed-in user; omit to act signed out
    #[arg(long, env = "COUPLE_IDENTITY")]
    pub identity: Option<String>,

    /// JSON file with sync settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print machine-readable output where supported
    #[arg(long)]
    pub json: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show pairing and widget values
    Status,
    /// Start a new pairing as owner
    Create,
    /// Issue a new invite code and delete the old record
    Regenerate,
    /// Join a pairing with an invite code
    Redeem { code: String },
    /// Leave the pairing
    Unlink,
    /// Set a display name
    Name {
        name: String,
        /// Rename the partner instead of yourself
        #[arg(long)]
        partner: bool,
    },
    /// Set or clear a location
    City {
        label: Option<String>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
        /// Set the partner's location instead of yours
        #[arg(long)]
        partner: bool,
        /// Remove the location
        #[arg(long, conflicts_with_all = ["label", "country", "lat", "lon"])]
        clear: bool,
    },
    /// Set the countdown target (RFC 3339) and label
    Countdown {
        #[arg(long)]
        at: Option<DateTime<Utc>>,
        #[arg(long)]
        label: Option<String>,
        #[arg(long, conflicts_with_all = ["at", "label"])]
        reset: bool,
    },
    /// Save the shared note
    Note {
        #[arg(required_unless_present = "reset")]
        text: Option<String>,
        #[arg(long)]
        initials: Option<String>,
        /// Record the note as written by the partner
        #[arg(long)]
        partner_wrote: bool,
        #[arg(long, conflicts_with = "text")]
        reset: bool,
    },
    /// Write local state to the shared record
    Push,
    /// Merge the shared record into local state
    Pull,
    /// Push, pull and retry pending deletions
    Foreground,
}

/// Reads sync settings from `path`, or defaults.
pub fn load_config(path: Option<&Path>) -> Result<SyncConfig> {
    let Some(path) = path else {
        return Ok(SyncConfig::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid config {}", path.display()))
}

/// Opens the local store, record folder and session for `args`.
pub fn open_session(args: &Args) -> Result<(CoupleSession, Arc<SqliteStateStore>)> {
    let config = load_config(args.config.as_deref())?;
    let store = Arc::new(
        SqliteStateStore::open(&args.state)
            .with_context(|| format!("failed to open state {}", args.state.display()))?,
    );
    let remote = Arc::new(FsRecordStore::new(FsRecordStoreConfig::new(&args.remote)));
    let engine = SyncEngine::new(remote, config);
    let identity = Arc::new(StaticIdentity::new(
        args.identity.as_deref().map(Identity::from),
    ));
    debug!("Opened session on {}", args.state.display());
    Ok((CoupleSession::new(store.clone(), engine, identity), store))
}

/// Runs the command in `args` and returns its output.
pub async fn run(args: &Args) -> Result<String> {
    let (session, store) = open_session(args)?;
    let now = Utc::now();

    let output = match &args.command {
        Command::Status => {
            let snapshot = session.snapshot();
            let pending = store.pending_delete();
            if args.json {
                serde_json::to_string_pretty(&StatusView::new(&snapshot, pending, now))?
            } else {
                render_status(&snapshot, pending.as_deref(), now)
            }
        }
        Command::Create => {
            let code = session.create_pairing(&mut rand::thread_rng()).await?;
            let push = session.sync_push().await;
            format!("Created pairing. Invite code: {code}\n{}", push_line(push))
        }
        Command::Regenerate => match session
            .regenerate_invite_code(&mut rand::thread_rng())
            .await?
        {
            Some(code) => {
                let push = session.sync_push().await;
                let pending = match store.pending_delete() {
                    Some(old) => format!("\nOld record {old} is pending deletion."),
                    None => String::new(),
                };
                format!("New invite code: {code}{pending}\n{}", push_line(push))
            }
            None => "Only a paired owner can regenerate the invite code.".to_string(),
        },
        Command::Redeem { code } => redeem_line(session.redeem_invite_code(code).await?),
        Command::Unlink => {
            session.unlink().await?;
            "Unlinked.".to_string()
        }
        Command::Name { name, partner } => {
            if *partner {
                session.update_partner_name(name)?;
            } else {
                session.update_my_name(name)?;
            }
            let snapshot = session.snapshot();
            let profile = if *partner { &snapshot.partner } else { &snapshot.me };
            format!("Name set to {} ({}).", profile.name, profile.initials)
        }
        Command::City {
            label,
            country,
            lat,
            lon,
            partner,
            clear,
        } => {
            let coordinates = lat.zip(*lon);
            let (label, country) = if *clear {
                (None, None)
            } else {
                (label.as_deref(), country.as_deref())
            };
            if *partner {
                session.set_partner_location(label, country, coordinates)?;
            } else {
                session.set_my_location(label, country, coordinates)?;
            }
            match store.display_cache() {
                Some(cache) if cache.distance_km > 0 => {
                    format!("Location saved. Distance: {} km", cache.distance_km)
                }
                _ => "Location saved.".to_string(),
            }
        }
        Command::Countdown { at, label, reset } => {
            if *reset {
                session.reset_countdown()?;
                "Countdown cleared.".to_string()
            } else {
                let clipped = session.set_countdown(*at, label.as_deref())?;
                let mut out = String::new();
                if clipped.as_ref().is_some_and(|c| c.truncated) {
                    out.push_str("Label was shortened.\n");
                }
                let display = DisplayState::from_snapshot(&session.snapshot(), now);
                write!(out, "{}: {}", display.countdown_title, display.countdown_text)?;
                out
            }
        }
        Command::Note {
            text,
            initials,
            partner_wrote,
            reset,
        } => {
            if *reset {
                session.reset_note(now)?;
                "Note cleared.".to_string()
            } else {
                let author = if *partner_wrote {
                    NoteAuthor::Partner
                } else {
                    NoteAuthor::Me
                };
                let snapshot = session.snapshot();
                let initials = initials.clone().unwrap_or_else(|| match author {
                    NoteAuthor::Partner => snapshot.partner.initials.clone(),
                    _ => snapshot.me.initials.clone(),
                });
                let text = text.as_deref().unwrap_or_default();
                let clipped = session.save_note(text, &initials, author, now)?;
                let streak = session.snapshot().streak;
                let mut out = String::new();
                if clipped.truncated {
                    out.push_str("Note was shortened to 100 characters.\n");
                }
                write!(out, "Note saved. Streak: {}", streak.streak_count)?;
                out
            }
        }
        Command::Push => push_line(session.sync_push().await).to_string(),
        Command::Pull => {
            if session.sync_pull().await? {
                "Pulled shared record.".to_string()
            } else {
                "Nothing pulled.".to_string()
            }
        }
        Command::Foreground => {
            let report = session.on_foreground().await?;
            let mut out = push_line(report.push).to_string();
            if report.pulled {
                out.push_str("\nPulled shared record.");
            }
            if !report.pending_delete_cleared {
                out.push_str("\nOld record is still pending deletion.");
            }
            out
        }
    };
    Ok(output)
}

fn push_line(outcome: PushOutcome) -> &'static str {
    match outcome {
        PushOutcome::Success => "Sync: up to date.",
        PushOutcome::PartnerSlotAlreadyTaken => "Sync: this code is already used by someone else.",
        PushOutcome::SaveFailed => "Sync: failed, will retry later.",
    }
}

fn redeem_line(report: RedeemReport) -> String {
    match report {
        RedeemReport::EmptyCode => "Enter an invite code.",
        RedeemReport::SignInRequired => "Sign in (--identity) before redeeming a code.",
        RedeemReport::CodeAlreadyClaimed => {
            "This code is already used by someone else. The pairing was undone."
        }
        RedeemReport::SyncFailed => "Joined locally, but the shared record could not be updated.",
        RedeemReport::Joined => "Joined the pairing.",
        RedeemReport::Unchanged => "Nothing changed.",
    }
    .to_string()
}

fn status_name(status: PairingStatus) -> &'static str {
    match status {
        PairingStatus::Unpaired => "unpaired",
        PairingStatus::OwnerPaired => "owner",
        PairingStatus::PartnerPaired => "partner",
    }
}

/// Human-readable status.
pub fn render_status(snapshot: &Snapshot, pending_delete: Option<&str>, now: DateTime<Utc>) -> String {
    let display = DisplayState::from_snapshot(snapshot, now);
    let couple = &snapshot.couple;

    let mut out = String::new();
    let _ = write!(out, "Pairing:   {}", status_name(couple.status()));
    if let Some(code) = couple.active_code() {
        let _ = write!(out, " ({code})");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Pair:      {}", display.pair_label);
    match display.distance_km {
        Some(km) => {
            let _ = writeln!(out, "Distance:  {km} km");
        }
        None => {
            let _ = writeln!(out, "Distance:  unknown");
        }
    }
    let _ = writeln!(
        out,
        "{}: {}",
        display.countdown_title, display.countdown_text
    );
    if !display.note_text.is_empty() {
        let _ = writeln!(
            out,
            "Note:      {} ({})",
            display.note_text, display.note_author_initials
        );
    }
    let _ = write!(
        out,
        "Streak:    {} (longest {})",
        display.streak_count, display.longest_streak
    );
    if let Some(code) = pending_delete {
        let _ = write!(out, "\nPending deletion of record for {code}");
    }
    out
}

/// Machine-readable status.
#[derive(Debug, Serialize)]
pub struct StatusView {
    pub status: PairingStatus,
    pub invite_code: Option<String>,
    pub pending_delete: Option<String>,
    pub display: DisplayState,
}

impl StatusView {
    pub fn new(snapshot: &Snapshot, pending_delete: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            status: snapshot.couple.status(),
            invite_code: snapshot.couple.active_code().map(str::to_string),
            pending_delete,
            display: DisplayState::from_snapshot(snapshot, now),
        }
    }
}
