//! Pairing and shared-record sync for the couple core.
//!
//! Two devices pair through an invite code: the owner creates it, the
//! partner redeems it. Both then read and write one shared record keyed by
//! the code, enforcing that only one partner identity can ever claim it.
//!
//! ## Components
//!
//! - **Invite**: code generation and normalization
//! - **Pairing**: pure state transitions on the local pairing state
//! - **Record**: the shared record and its role-dependent field mapping
//! - **Engine**: push, pull, record deletion and partner-slot release
//! - **Session**: the single writer of a device's local state, sequencing
//!   commits with sync calls
//!
//! # Example
//!
//! ```
//! use couple_sync::{invite, pairing};
//! use couple_types::{CoupleRole, CoupleState};
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let owner = pairing::create(&CoupleState::default(), &mut rng);
//! let code = owner.invite_code.clone().unwrap();
//!
//! let partner = pairing::redeem(&CoupleState::default(), &code.to_lowercase());
//! assert_eq!(partner.role, CoupleRole::Partner);
//! assert_eq!(invite::record_key(&code), code.replace('-', ""));
//! ```

pub mod display;
mod engine;
mod error;
pub mod identity;
pub mod invite;
pub mod pairing;
pub mod record;
pub mod remote;
mod session;
pub mod streak;
pub mod subscription;

pub use display::{CountingRefresh, DisplayRefresh, NoopRefresh};
pub use engine::{PushOutcome, SyncConfig, SyncEngine};
pub use error::{SyncError, SyncResult};
pub use identity::{IdentityProvider, StaticIdentity};
pub use pairing::{IgnoreReason, RedeemTransition};
pub use record::{build_record_fields, FieldSet, FieldValue, RemoteRecord};
pub use remote::{FsRecordStore, FsRecordStoreConfig, MemoryRecordStore, RecordStore};
pub use session::{CoupleSession, ForegroundReport, RedeemReport};
pub use subscription::{ChangeSubscriptions, LocalSubscriptions, NoopSubscriptions};
