//! VPN Gate server list feed.
//!
//! Downloads the public CSV feed and turns its rows into [`CatalogRecord`]s
//! ready for [`RecordStore::upsert_all`].
//!
//! [`CatalogRecord`]: crate::storage::CatalogRecord
//! [`RecordStore::upsert_all`]: crate::storage::RecordStore::upsert_all

mod fetch;
mod parse;

pub use fetch::{download_records, fetch_feed};
pub use parse::{parse_feed, parse_row, FeedBatch};
