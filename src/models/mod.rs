//! Data models for Sitestock

pub mod auth;
pub mod dashboard;
pub mod enums;
pub mod equipment;
pub mod request;
pub mod site;
pub mod transfer;
pub mod user;

// Re-export commonly used types
pub use enums::{EquipmentStatus, RequestStatus, RequestType, Role, TransferStatus};
pub use equipment::{Equipment, EquipmentWithSite};
pub use request::{EquipmentRequest, EquipmentRequestDetails};
pub use site::{ConstructionSite, SiteDetails};
pub use transfer::{EquipmentTransfer, TransferDetails};
pub use user::{Session, User};
