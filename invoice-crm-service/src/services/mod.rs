pub mod crm;
pub mod memory;
pub mod metrics;
pub mod mongo;
pub mod store;

pub use crm::CrmService;
pub use memory::MemoryStore;
pub use metrics::{get_metrics, init_metrics};
pub use mongo::MongoStore;
pub use store::CrmStore;
