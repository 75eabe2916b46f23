//! # dogshare-core
//!
//! The publishing pipeline behind `dogshare`: a file is uploaded to object
//! storage, its access URL is shortened, and the pair is kept in a local
//! registry that can be listed and expires with the links it holds.
//!
//! ```text
//! ┌──────────────────┐
//! │    Publisher     │  ← upload → shorten → record
//! ├────────┬─────────┤
//! │ Object │  Link   │  ← ObjectPublisher / LinkShortener ports
//! │ store  │ shorten │
//! ├────────┴─────────┤
//! │     Registry     │  ← JSON file, owned by the publisher
//! └──────────────────┘
//! ```
//!
//! Storage and shortener backends live in `dogshare-blob` and
//! `dogshare-yourls`; this crate only knows them through the traits in
//! [`ports`].

pub mod config;
mod error;
pub mod ports;
mod publisher;
pub mod registry;
mod types;

pub use config::{ConfigStore, Settings};
pub use error::{ShareError, ShareResult};
pub use ports::{LinkShortener, ObjectPublisher};
pub use publisher::{PublishOptions, Publisher};
pub use registry::Registry;
pub use types::{Expiry, UploadRecord, Visibility};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Expiry, LinkShortener, ObjectPublisher, Publisher, Registry, ShareError, ShareResult,
        UploadRecord, Visibility,
    };
}
