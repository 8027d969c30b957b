pub mod repository;
pub mod service;

pub use repository::{PromotionRepository, SeaOrmPromotionRepository};
pub use service::{PromotionFilter, PromotionService};
