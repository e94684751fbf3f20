//! Blog content for the TidyHome site
//!
//! Articles come from two places: a dataset bundled into the binary and a
//! database table fed by the RankPill content webhook. Readers see the
//! merged view.

pub mod dataset;
pub mod error;
pub mod merge;
pub mod rankpill;
pub mod service;

pub use dataset::static_articles;
pub use error::{ContentError, ContentResult};
pub use merge::merge_articles;
pub use rankpill::{authenticate, RankPillArticle, SIGNATURE_HEADER};
pub use service::BlogService;
