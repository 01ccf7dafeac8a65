//! JobGraph Ingest — structured extraction records → graph upserts.

pub mod ingest;
pub mod record;

pub use ingest::JobIngester;
pub use record::JobRecord;
