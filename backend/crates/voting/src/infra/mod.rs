//! Infrastructure Layer - Catalog and session backends

pub mod memory;
pub mod remote;
pub mod sessions;
pub mod soap;

pub use memory::MemoryGameCatalog;
pub use remote::RemoteGameCatalog;
pub use sessions::MemorySessionStore;
pub use soap::SoapCatalogClient;
