//! # dogshare-blob: object storage for dogshare
//!
//! Everything `dogshare` needs from an S3-compatible store:
//!
//! - **Provisioning**: a `-public` / `-private` bucket pair, created on demand,
//!   with an anonymous-read policy on the public half
//! - **Content sniffing**: MIME type from file signatures, random object names
//!   that keep the original extension
//! - **Access links**: direct URLs for public objects, presigned GET URLs for
//!   private ones
//!
//! ```text
//! ┌─────────────────┐
//! │  ObjectGateway  │  ← bucket pair, classification, link choice
//! ├─────────────────┤
//! │   ObjectStore   │  ← S3ObjectStore / MemoryObjectStore
//! └─────────────────┘
//! ```
//!
//! ```rust,no_run
//! use dogshare_blob::ObjectGateway;
//! use dogshare_core::{Expiry, ShareResult};
//!
//! # async fn run() -> ShareResult<()> {
//! let mut gateway = ObjectGateway::connect("http://localhost:9000", "minio", "minio123").await?;
//! gateway.setup("dogshare", "us-east-1").await?;
//!
//! let link = gateway
//!     .upload("./report.pdf".as_ref(), false, Expiry::hours(24))
//!     .await?;
//! println!("{link}");
//! # Ok(())
//! # }
//! ```

mod config;
mod content;
mod gateway;
mod memory_store;
mod s3_store;
pub mod store;

pub use config::{Endpoint, StoreConfig};
pub use content::{classify, object_name_for, sniff, Classified, SNIFF_LEN};
pub use gateway::{public_read_policy, BucketPair, ObjectGateway};
pub use memory_store::{MemoryObjectStore, StoredObject};
pub use s3_store::S3ObjectStore;
pub use store::{ObjectStore, PutResult, MAX_PRESIGN_DURATION};
