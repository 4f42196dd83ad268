//! HTTP surface
//!
//! warp routes over the catalog, patient intake and seeding, plus the
//! generated API docs and static landing page.

pub mod docs;
pub mod rejection;
pub mod rest;

pub use rest::RestApi;
