use std::sync::Arc;
use sea_orm::*;

use crate::db::entity::address;
use crate::db::entity::address::Entity as Address;
use crate::error::{ AppError, Result };
use crate::geo::haversine_distance;

/// Input for address creation. Field constraints are enforced at the API
/// boundary before this reaches the store.
#[derive(Debug, Clone)]
pub struct CreateAddress {
    pub street: String,
    pub city: String,
    pub state: Option<String>,
    pub country: String,
    pub postal_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Partial update input. Only fields carrying `Some` overwrite the stored
/// value; everything else keeps its prior value.
#[derive(Debug, Clone, Default)]
pub struct UpdateAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

pub struct AddressService {
    db: Arc<DatabaseConnection>,
}

impl AddressService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a new address; the store assigns the id and both timestamps.
    pub async fn create(&self, input: CreateAddress) -> Result<address::Model> {
        tracing::info!("Creating new address: {}, {}", input.street, input.city);

        let now = chrono::Utc::now();
        let model = address::ActiveModel {
            id: NotSet,
            street: Set(input.street),
            city: Set(input.city),
            state: Set(input.state),
            country: Set(input.country),
            postal_code: Set(input.postal_code),
            latitude: Set(input.latitude),
            longitude: Set(input.longitude),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = model.insert(self.db.as_ref()).await?;

        tracing::info!("Address created with id {}", created.id);
        Ok(created)
    }

    /// Fetch a single address by id.
    pub async fn get(&self, id: i32) -> Result<address::Model> {
        Address::find_by_id(id)
            .one(self.db.as_ref()).await?
            .ok_or_else(|| {
                tracing::warn!("Address not found: {}", id);
                AppError::AddressNotFound
            })
    }

    /// Page through addresses in insertion (id) order.
    pub async fn list(&self, skip: u64, limit: u64) -> Result<Vec<address::Model>> {
        tracing::info!("Fetching addresses (skip={}, limit={})", skip, limit);

        let addresses = Address::find()
            .order_by_asc(address::Column::Id)
            .offset(skip)
            .limit(limit)
            .all(self.db.as_ref()).await?;

        Ok(addresses)
    }

    /// Apply a partial update and refresh `updated_at`.
    pub async fn update(&self, id: i32, input: UpdateAddress) -> Result<address::Model> {
        let existing = Address::find_by_id(id)
            .one(self.db.as_ref()).await?
            .ok_or_else(|| {
                tracing::warn!("Address not found for update: {}", id);
                AppError::AddressNotFound
            })?;

        let mut active_model: address::ActiveModel = existing.into();

        if let Some(street) = input.street {
            active_model.street = Set(street);
        }
        if let Some(city) = input.city {
            active_model.city = Set(city);
        }
        if let Some(state) = input.state {
            active_model.state = Set(Some(state));
        }
        if let Some(country) = input.country {
            active_model.country = Set(country);
        }
        if let Some(postal_code) = input.postal_code {
            active_model.postal_code = Set(Some(postal_code));
        }
        if let Some(latitude) = input.latitude {
            active_model.latitude = Set(latitude);
        }
        if let Some(longitude) = input.longitude {
            active_model.longitude = Set(longitude);
        }
        active_model.updated_at = Set(chrono::Utc::now());

        let updated = active_model.update(self.db.as_ref()).await?;

        tracing::info!("Address {} updated", id);
        Ok(updated)
    }

    /// Remove an address permanently.
    pub async fn delete(&self, id: i32) -> Result<()> {
        let result = Address::delete_by_id(id).exec(self.db.as_ref()).await?;

        if result.rows_affected == 0 {
            tracing::warn!("Address not found for deletion: {}", id);
            return Err(AppError::AddressNotFound);
        }

        tracing::info!("Address {} deleted", id);
        Ok(())
    }

    /// Every address within `distance_km` of the center point.
    ///
    /// Exhaustive scan: fetches all rows and filters by great-circle
    /// distance. Results keep fetch order, not distance order.
    pub async fn find_nearby(
        &self,
        latitude: f64,
        longitude: f64,
        distance_km: f64
    ) -> Result<Vec<address::Model>> {
        tracing::info!(
            "Searching addresses near ({}, {}) within {}km",
            latitude,
            longitude,
            distance_km
        );

        let all_addresses = Address::find().all(self.db.as_ref()).await?;

        let nearby: Vec<address::Model> = all_addresses
            .into_iter()
            .filter(|addr| {
                haversine_distance(latitude, longitude, addr.latitude, addr.longitude) <=
                    distance_km
            })
            .collect();

        tracing::info!("Found {} addresses within range", nearby.len());
        Ok(nearby)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{ Migrator, MigratorTrait };

    async fn setup() -> AddressService {
        // Single connection so the in-memory database is shared
        let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
        options.max_connections(1);

        let db = Database::connect(options).await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        AddressService::new(Arc::new(db))
    }

    fn paris() -> CreateAddress {
        CreateAddress {
            street: "1 Rue de Rivoli".to_string(),
            city: "Paris".to_string(),
            state: None,
            country: "France".to_string(),
            postal_code: Some("75001".to_string()),
            latitude: 48.8566,
            longitude: 2.3522,
        }
    }

    fn at(latitude: f64, longitude: f64) -> CreateAddress {
        CreateAddress {
            street: "742 Evergreen Terrace".to_string(),
            city: "Springfield".to_string(),
            state: Some("OR".to_string()),
            country: "USA".to_string(),
            postal_code: None,
            latitude,
            longitude,
        }
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let service = setup().await;

        let created = service.create(paris()).await.unwrap();
        let fetched = service.get(created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.street, "1 Rue de Rivoli");
        assert_eq!(fetched.state, None);
        assert_eq!(fetched.postal_code, Some("75001".to_string()));
        assert_eq!(fetched.created_at, fetched.updated_at);
    }

    #[tokio::test]
    async fn test_get_missing_returns_not_found() {
        let service = setup().await;

        let err = service.get(42).await.unwrap_err();

        assert!(matches!(err, AppError::AddressNotFound));
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let service = setup().await;
        let created = service.create(paris()).await.unwrap();

        let updated = service
            .update(created.id, UpdateAddress {
                city: Some("Lyon".to_string()),
                ..Default::default()
            }).await
            .unwrap();

        assert_eq!(updated.city, "Lyon");
        assert_eq!(updated.street, created.street);
        assert_eq!(updated.country, created.country);
        assert_eq!(updated.postal_code, created.postal_code);
        assert_eq!(updated.latitude, created.latitude);
        assert_eq!(updated.longitude, created.longitude);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_returns_not_found() {
        let service = setup().await;

        let err = service
            .update(7, UpdateAddress {
                street: Some("Nowhere".to_string()),
                ..Default::default()
            }).await
            .unwrap_err();

        assert!(matches!(err, AppError::AddressNotFound));
    }

    #[tokio::test]
    async fn test_delete_then_get_returns_not_found() {
        let service = setup().await;
        let created = service.create(paris()).await.unwrap();

        service.delete(created.id).await.unwrap();

        let get_err = service.get(created.id).await.unwrap_err();
        assert!(matches!(get_err, AppError::AddressNotFound));

        // Deleting a second time reports absence as well
        let delete_err = service.delete(created.id).await.unwrap_err();
        assert!(matches!(delete_err, AppError::AddressNotFound));
    }

    #[tokio::test]
    async fn test_list_returns_all_in_insertion_order() {
        let service = setup().await;
        for lon in [1.0, 2.0, 3.0] {
            service.create(at(0.0, lon)).await.unwrap();
        }

        let page = service.list(0, 100).await.unwrap();

        assert_eq!(page.len(), 3);
        assert!(page.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn test_list_pagination_skips_and_limits() {
        let service = setup().await;
        for lon in [1.0, 2.0, 3.0] {
            service.create(at(0.0, lon)).await.unwrap();
        }
        let all = service.list(0, 100).await.unwrap();

        let page = service.list(1, 1).await.unwrap();

        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, all[1].id);
    }

    #[tokio::test]
    async fn test_nearby_one_degree_apart() {
        let service = setup().await;
        let origin = service.create(at(0.0, 0.0)).await.unwrap();
        let one_degree = service.create(at(0.0, 1.0)).await.unwrap();

        // The two points are ~111 km apart
        let close = service.find_nearby(0.0, 0.0, 50.0).await.unwrap();
        let close_ids: Vec<i32> = close.iter().map(|a| a.id).collect();
        assert_eq!(close_ids, vec![origin.id]);

        let wide = service.find_nearby(0.0, 0.0, 200.0).await.unwrap();
        let mut wide_ids: Vec<i32> = wide.iter().map(|a| a.id).collect();
        wide_ids.sort();
        assert_eq!(wide_ids, vec![origin.id, one_degree.id]);
    }

    #[tokio::test]
    async fn test_nearby_on_empty_store() {
        let service = setup().await;

        let nearby = service.find_nearby(10.0, 10.0, 100.0).await.unwrap();

        assert!(nearby.is_empty());
    }

    #[tokio::test]
    async fn test_nearby_radius_above_max_distance_returns_everything() {
        let service = setup().await;
        service.create(at(0.0, 0.0)).await.unwrap();
        service.create(at(52.52, 13.405)).await.unwrap();
        service.create(at(-33.87, 151.21)).await.unwrap();

        let matched = service.find_nearby(40.7128, -74.006, 20001.0).await.unwrap();

        assert_eq!(matched.len(), 3);
    }

    #[tokio::test]
    async fn test_nearby_includes_coincident_point_with_tiny_radius() {
        let service = setup().await;
        let created = service.create(at(12.34, 56.78)).await.unwrap();

        let matched = service.find_nearby(12.34, 56.78, 0.0001).await.unwrap();

        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, created.id);
    }
}
