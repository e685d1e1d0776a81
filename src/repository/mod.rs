//! Repository Layer
//!
//! Data access abstractions and implementations.

mod traits;
mod subscription;
mod memory;
mod firestore;
mod idea_repo;
mod vendor_repo;


pub use traits::{from_snapshots, to_document, Document, DocumentSnapshot, DocumentStore, OrderBy};
pub use subscription::{feed, FeedSender, Subscription, FEED_BUFFER};
pub use memory::MemoryDocumentStore;
pub use firestore::{decode_value, encode_value, FirestoreStore};
pub use idea_repo::{IdeaRepository, SessionClock, IDEAS_COLLECTION};
pub use vendor_repo::{VendorRepository, VENDORS_COLLECTION};
