pub mod company;
pub mod invoice;

pub use company::Company;
pub use invoice::Invoice;
