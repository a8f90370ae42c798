//! # Fest Admission Core
//!
//! Domain types and store traits for the festival registration admission-control core.
//!
//! This crate has no I/O of its own. It defines:
//!
//! - **Records**: [`TeamRegistration`] and [`TeamMember`], the two documents written at admission
//! - **Ticket categories**: which workshop/competition tracks a category allows, requires or forces
//! - **Capacity pools**: the scarce resources (`overall`, `workshop:<track>`, `competition:<track>`)
//! - **Store**: the [`RegistrationStore`](store::RegistrationStore) trait implemented by the
//!   `PostgreSQL` crate and the in-memory test double
//! - **Notification**: the [`MessageRenderer`](notify::MessageRenderer) and
//!   [`Mailer`](notify::Mailer) seams used for confirmation messages
//! - **Environment**: injected dependencies ([`Clock`](environment::Clock),
//!   [`PasskeyGenerator`](environment::PasskeyGenerator))
//!
//! ## Admission flow
//!
//! ```text
//! request ─► normalize tracks ─► duplicate guard ─► occupancy ─► policy ─► commit ─► notify
//!                 (category)        (store read)     (store read)  (pure)   (store write)
//! ```
//!
//! The components themselves live in the `fest-registration` crate; everything they
//! exchange is defined here.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod category;
pub mod environment;
pub mod notify;
pub mod pool;
pub mod store;
pub mod types;

pub use category::{CompetitionTrack, NormalizedTracks, TicketCategory, TrackError, TrackRule, WorkshopTrack};
pub use pool::{Capacities, OccupancySnapshot, PoolKey};
pub use types::*;
