use axum::{ extract::{ Path, Query, State }, http::StatusCode, Json };
use serde::{ Deserialize, Serialize };

use crate::db::entity::address;
use crate::error::{ AppError, Result };
use crate::services::{ CreateAddress, UpdateAddress };

use super::AppState;

#[derive(Deserialize)]
pub struct CreateAddressRequest {
    pub street: String,
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    pub country: String,
    #[serde(default)]
    pub postal_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize, Default)]
pub struct UpdateAddressRequest {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

#[derive(Deserialize)]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub distance_km: f64,
}

#[derive(Serialize)]
pub struct AddressResponse {
    pub id: i32,
    pub street: String,
    pub city: String,
    pub state: Option<String>,
    pub country: String,
    pub postal_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<address::Model> for AddressResponse {
    fn from(model: address::Model) -> Self {
        Self {
            id: model.id,
            street: model.street,
            city: model.city,
            state: model.state,
            country: model.country,
            postal_code: model.postal_code,
            latitude: model.latitude,
            longitude: model.longitude,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

fn check_length(field: &'static str, value: &str, min: usize, max: usize) -> Result<()> {
    let length = value.chars().count();
    if length < min || length > max {
        return Err(
            AppError::validation(
                field,
                format!("length must be between {} and {} characters", min, max)
            )
        );
    }
    Ok(())
}

fn check_latitude(field: &'static str, value: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&value) {
        return Err(AppError::validation(field, "must be between -90 and 90"));
    }
    Ok(())
}

fn check_longitude(field: &'static str, value: f64) -> Result<()> {
    if !(-180.0..=180.0).contains(&value) {
        return Err(AppError::validation(field, "must be between -180 and 180"));
    }
    Ok(())
}

impl CreateAddressRequest {
    fn validate(&self) -> Result<()> {
        check_length("street", &self.street, 1, 255)?;
        check_length("city", &self.city, 1, 100)?;
        if let Some(state) = &self.state {
            check_length("state", state, 0, 100)?;
        }
        check_length("country", &self.country, 1, 100)?;
        if let Some(postal_code) = &self.postal_code {
            check_length("postal_code", postal_code, 0, 20)?;
        }
        check_latitude("latitude", self.latitude)?;
        check_longitude("longitude", self.longitude)
    }

    fn into_input(self) -> CreateAddress {
        CreateAddress {
            street: self.street,
            city: self.city,
            state: self.state,
            country: self.country,
            postal_code: self.postal_code,
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

impl UpdateAddressRequest {
    fn validate(&self) -> Result<()> {
        if let Some(street) = &self.street {
            check_length("street", street, 1, 255)?;
        }
        if let Some(city) = &self.city {
            check_length("city", city, 1, 100)?;
        }
        if let Some(state) = &self.state {
            check_length("state", state, 0, 100)?;
        }
        if let Some(country) = &self.country {
            check_length("country", country, 1, 100)?;
        }
        if let Some(postal_code) = &self.postal_code {
            check_length("postal_code", postal_code, 0, 20)?;
        }
        if let Some(latitude) = self.latitude {
            check_latitude("latitude", latitude)?;
        }
        if let Some(longitude) = self.longitude {
            check_longitude("longitude", longitude)?;
        }
        Ok(())
    }

    fn into_input(self) -> UpdateAddress {
        UpdateAddress {
            street: self.street,
            city: self.city,
            state: self.state,
            country: self.country,
            postal_code: self.postal_code,
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

impl ListQuery {
    fn validate(&self) -> Result<()> {
        if self.skip < 0 {
            return Err(AppError::validation("skip", "must be greater than or equal to 0"));
        }
        if !(1..=100).contains(&self.limit) {
            return Err(AppError::validation("limit", "must be between 1 and 100"));
        }
        Ok(())
    }
}

impl NearbyQuery {
    fn validate(&self) -> Result<()> {
        check_latitude("latitude", self.latitude)?;
        check_longitude("longitude", self.longitude)?;
        if self.distance_km <= 0.0 {
            return Err(AppError::validation("distance_km", "must be greater than 0"));
        }
        Ok(())
    }
}

pub async fn create_address(
    State(state): State<AppState>,
    Json(request): Json<CreateAddressRequest>
) -> Result<(StatusCode, Json<AddressResponse>)> {
    request.validate()?;

    let created = state.address_service.create(request.into_input()).await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn list_addresses(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>
) -> Result<Json<Vec<AddressResponse>>> {
    query.validate()?;

    let addresses = state.address_service.list(query.skip as u64, query.limit as u64).await?;

    Ok(Json(addresses.into_iter().map(AddressResponse::from).collect()))
}

pub async fn find_nearby_addresses(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>
) -> Result<Json<Vec<AddressResponse>>> {
    query.validate()?;

    let addresses = state.address_service.find_nearby(
        query.latitude,
        query.longitude,
        query.distance_km
    ).await?;

    Ok(Json(addresses.into_iter().map(AddressResponse::from).collect()))
}

pub async fn get_address(
    State(state): State<AppState>,
    Path(address_id): Path<i32>
) -> Result<Json<AddressResponse>> {
    let address = state.address_service.get(address_id).await?;

    Ok(Json(address.into()))
}

pub async fn update_address(
    State(state): State<AppState>,
    Path(address_id): Path<i32>,
    Json(request): Json<UpdateAddressRequest>
) -> Result<Json<AddressResponse>> {
    request.validate()?;

    let updated = state.address_service.update(address_id, request.into_input()).await?;

    Ok(Json(updated.into()))
}

pub async fn delete_address(
    State(state): State<AppState>,
    Path(address_id): Path<i32>
) -> Result<StatusCode> {
    state.address_service.delete(address_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
