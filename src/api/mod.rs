use std::sync::Arc;

pub mod address;

use crate::services::AddressService;

#[derive(Clone)]
pub struct AppState {
    pub address_service: Arc<AddressService>,
}

impl AppState {
    pub fn new(address_service: Arc<AddressService>) -> Self {
        Self { address_service }
    }
}
