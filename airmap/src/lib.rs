//! Airmap keeps air-quality tile overlays on a map in sync with a region
//! selection and an animated time index.
//!
//! The pieces, leaf first:
//!
//! - [`provider`] answers a [`MapRequest`] with tile URLs, statistics, legend
//!   colors and boundary geometry. [`Catalog`] does so in-process,
//!   [`HttpLookupProvider`] asks a running server.
//! - [`sync::OverlaySynchronizer`] turns the desired selection into add/remove
//!   calls on a [`RenderSurface`].
//! - [`animation::AnimationDriver`] produces tick events every few seconds
//!   while playing.
//! - [`MapSession`] owns all of the above and processes events one at a time.

pub mod animation;
pub mod dataset;
mod error;
pub mod geometry;
pub mod keys;
pub mod provider;
pub mod request;
pub mod session;
pub mod surface;
pub mod sync;

pub use error::AirmapError;
pub use keys::{OverlayKey, RegionKey, TimeKey};
pub use provider::catalog::Catalog;
pub use provider::http::HttpLookupProvider;
pub use provider::{LookupProvider, MapResponse};
pub use request::{MapRequest, ValidatedRequest, ValidationError};
pub use session::{MapSession, SessionEvent};
pub use surface::RenderSurface;
