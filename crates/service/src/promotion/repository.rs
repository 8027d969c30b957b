use async_trait::async_trait;
use migration::{Migrator, MigratorTrait};
use models::promotion::{self, Entity as PromotionEntity, Promotion};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Select,
};
use tracing::{debug, info};

use crate::errors::ServiceError;

/// Record store for promotions. Every write commits on its own.
#[async_trait]
pub trait PromotionRepository: Send + Sync {
    /// Create the schema if it is missing.
    async fn init(&self) -> Result<(), ServiceError>;
    /// Insert when `id` is unset (and assign it), otherwise overwrite the row with that `id`.
    async fn save(&self, promotion: &mut Promotion) -> Result<(), ServiceError>;
    /// Remove the row for `promotion.id`; absent rows are not an error.
    async fn delete(&self, promotion: &Promotion) -> Result<(), ServiceError>;
    async fn find(&self, id: i32) -> Result<Option<Promotion>, ServiceError>;
    async fn all(&self) -> Result<Vec<Promotion>, ServiceError>;
    async fn find_by_category(&self, category: &str) -> Result<Vec<Promotion>, ServiceError>;
    async fn find_by_promo_name(&self, promo_name: &str) -> Result<Vec<Promotion>, ServiceError>;
    async fn find_by_availability(&self, available: bool) -> Result<Vec<Promotion>, ServiceError>;
    /// Bulk delete of `available = false` rows; returns how many went.
    async fn remove_unavailable(&self) -> Result<u64, ServiceError>;
    async fn remove_all(&self) -> Result<u64, ServiceError>;
}

/// SeaORM-backed repository implementation.
pub struct SeaOrmPromotionRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmPromotionRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    async fn fetch(&self, select: Select<PromotionEntity>) -> Result<Vec<Promotion>, ServiceError> {
        let rows = select
            .order_by_asc(promotion::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(rows.into_iter().map(Promotion::from).collect())
    }
}

#[async_trait]
impl PromotionRepository for SeaOrmPromotionRepository {
    async fn init(&self) -> Result<(), ServiceError> {
        info!("initializing database");
        Migrator::up(&self.db, None).await.map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn save(&self, promotion: &mut Promotion) -> Result<(), ServiceError> {
        let am = promotion.clone().into_active_model();
        let saved = match promotion.id {
            None => am.insert(&self.db).await,
            Some(id) => am.update(&self.db).await.map_err(|e| match e {
                DbErr::RecordNotUpdated => DbErr::RecordNotFound(format!("promotion {id}")),
                other => other,
            }),
        };
        let saved = match saved {
            Ok(m) => m,
            Err(DbErr::RecordNotFound(_)) => {
                return Err(ServiceError::not_found(promotion.id.unwrap_or_default()))
            }
            Err(e) => return Err(ServiceError::Db(e.to_string())),
        };
        debug!(id = saved.id, "saved promotion");
        *promotion = saved.into();
        Ok(())
    }

    async fn delete(&self, promotion: &Promotion) -> Result<(), ServiceError> {
        let Some(id) = promotion.id else { return Ok(()); };
        let res = PromotionEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        debug!(id, rows = res.rows_affected, "deleted promotion");
        Ok(())
    }

    async fn find(&self, id: i32) -> Result<Option<Promotion>, ServiceError> {
        debug!(id, "processing lookup");
        let found = PromotionEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(found.map(Promotion::from))
    }

    async fn all(&self) -> Result<Vec<Promotion>, ServiceError> {
        self.fetch(PromotionEntity::find()).await
    }

    async fn find_by_category(&self, category: &str) -> Result<Vec<Promotion>, ServiceError> {
        debug!(%category, "processing category query");
        self.fetch(PromotionEntity::find().filter(promotion::Column::Category.eq(category))).await
    }

    async fn find_by_promo_name(&self, promo_name: &str) -> Result<Vec<Promotion>, ServiceError> {
        debug!(%promo_name, "processing promotion name query");
        let query = PromotionEntity::find().filter(promotion::Column::PromoName.eq(promo_name));
        self.fetch(query).await
    }

    async fn find_by_availability(&self, available: bool) -> Result<Vec<Promotion>, ServiceError> {
        debug!(available, "processing availability query");
        self.fetch(PromotionEntity::find().filter(promotion::Column::Available.eq(available))).await
    }

    async fn remove_unavailable(&self) -> Result<u64, ServiceError> {
        let res = PromotionEntity::delete_many()
            .filter(promotion::Column::Available.eq(false))
            .exec(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        info!(count = res.rows_affected, "deleted unavailable promotions");
        Ok(res.rows_affected)
    }

    async fn remove_all(&self) -> Result<u64, ServiceError> {
        let res = PromotionEntity::delete_many()
            .exec(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        info!(count = res.rows_affected, "deleted all promotions");
        Ok(res.rows_affected)
    }
}
