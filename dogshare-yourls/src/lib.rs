//! YOURLS link shortening for dogshare.
//!
//! ```rust,no_run
//! use dogshare_yourls::YourlsClient;
//!
//! # async fn run() -> dogshare_core::ShareResult<()> {
//! let client = YourlsClient::new("https://sho.rt/yourls-api.php", "0123456789")?;
//! let short = client
//!     .shorten("https://files.example.com/dogshare-public/a1b2.png", "shortened using dogshare")
//!     .await?;
//! println!("{short}");
//! # Ok(())
//! # }
//! ```

mod client;

pub use client::YourlsClient;
