pub mod address_service;

pub use address_service::{ AddressService, CreateAddress, UpdateAddress };
