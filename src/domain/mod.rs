//! Domain Layer
//!
//! Contains all domain entities and core abstractions.

mod entity;
mod idea;
mod vendor;

pub use entity::{Entity, DomainError, DomainResult};
pub use idea::{Category, Idea, IdeaType, IdeaUpdate, NewIdea, Note};
pub use vendor::{CategoryRating, Vendor, VendorStatus, VendorUpdate};
