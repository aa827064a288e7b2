//! Google Drive publication
//!
//! Credentials come either from a service-account key (JWT bearer exchange)
//! or from an installed-app client secret plus a stored refresh token.
//! Publishing is find-or-update by file name within the configured folder,
//! so re-runs overwrite the previous export instead of piling up copies.

mod auth;
mod client;

pub use client::{DriveClient, DriveFile};
