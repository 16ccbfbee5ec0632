pub mod address;

pub use address::Entity as Address;
