use std::sync::Arc;

use models::promotion::Promotion;
use serde_json::Value;
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::promotion::repository::PromotionRepository;

/// Which rows a list request wants. At most one filter applies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PromotionFilter {
    All,
    Category(String),
    PromoName(String),
    Availability(bool),
}

impl PromotionFilter {
    /// Pick the filter from list query parameters. `category` beats `name`,
    /// which beats `availability`; the others are ignored.
    pub fn select(
        category: Option<String>,
        name: Option<String>,
        availability: Option<&str>,
    ) -> Result<Self, ServiceError> {
        if let Some(category) = category {
            return Ok(Self::Category(category));
        }
        if let Some(name) = name {
            return Ok(Self::PromoName(name));
        }
        match availability {
            Some(raw) => Ok(Self::Availability(parse_availability(raw)?)),
            None => Ok(Self::All),
        }
    }
}

fn parse_availability(raw: &str) -> Result<bool, ServiceError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ServiceError::Validation(format!(
            "availability must be true or false, got '{raw}'"
        ))),
    }
}

/// Application service encapsulating promotion business rules.
pub struct PromotionService<R: PromotionRepository> {
    repo: Arc<R>,
}

impl<R: PromotionRepository> PromotionService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn init(&self) -> Result<(), ServiceError> {
        self.repo.init().await
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filter: PromotionFilter) -> Result<Vec<Promotion>, ServiceError> {
        let rows = match &filter {
            PromotionFilter::All => self.repo.all().await?,
            PromotionFilter::Category(category) => self.repo.find_by_category(category).await?,
            PromotionFilter::PromoName(name) => self.repo.find_by_promo_name(name).await?,
            PromotionFilter::Availability(flag) => self.repo.find_by_availability(*flag).await?,
        };
        info!(count = rows.len(), "listed promotions");
        Ok(rows)
    }

    /// Absence is a `NotFound` error.
    pub async fn require(&self, id: i32) -> Result<Promotion, ServiceError> {
        self.repo.find(id).await?.ok_or_else(|| ServiceError::not_found(id))
    }

    /// Decode `data` into a new promotion and persist it. Any `id` in the body is ignored.
    #[instrument(skip_all)]
    pub async fn create(&self, data: &Value) -> Result<Promotion, ServiceError> {
        let mut promotion = Promotion::from_json(data)?;
        self.repo.save(&mut promotion).await?;
        info!(id = ?promotion.id, promo_name = %promotion.promo_name, "created promotion");
        Ok(promotion)
    }

    /// Overwrite every business field of `existing` from `data`, keeping its `id`.
    #[instrument(skip_all, fields(id = ?existing.id))]
    pub async fn replace(
        &self,
        existing: Promotion,
        data: &Value,
    ) -> Result<Promotion, ServiceError> {
        let id = existing.id;
        let mut promotion = existing;
        promotion.deserialize(data)?;
        promotion.id = id;
        self.repo.save(&mut promotion).await?;
        info!("updated promotion");
        Ok(promotion)
    }

    /// Delete by id; returns whether a row existed. Absent ids are not an error.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        match self.repo.find(id).await? {
            Some(promotion) => {
                self.repo.delete(&promotion).await?;
                info!("deleted promotion");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn delete_unavailable(&self) -> Result<u64, ServiceError> {
        self.repo.remove_unavailable().await
    }

    pub async fn reset(&self) -> Result<u64, ServiceError> {
        self.repo.remove_all().await
    }
}
