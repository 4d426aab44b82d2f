//! Output generation.
//!
//! # Submodules
//!
//! - [`text`]: Renders a [`Digest`](crate::models::Digest) as the plain-text
//!   report printed to standard output
//!
//! # Output Structure
//!
//! ```text
//!
//! Top Headlines from News API:
//!
//! Title: ...
//! Source: ...
//! Published: 18/10/25 09:15
//! URL: ...
//!
//!
//! All Articles from News API:
//! ...
//!
//! Articles from RSS Feeds:
//! ...
//! ```

pub mod text;
