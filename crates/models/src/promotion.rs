//! Promotion entity: the `promotion` table row and its in-memory form.
//!
//! [`Model`] is what SeaORM reads back from the table; [`Promotion`] is the
//! entity handlers work with, whose `id` stays `None` until the first save.

use sea_orm::entity::prelude::*;
use sea_orm::{IntoActiveModel, NotSet, Set};
use serde_json::{json, Map, Value as JsonValue};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "promotion")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub promo_name: String,
    pub goods_name: String,
    pub category: String,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    #[sea_orm(column_type = "Double")]
    pub discount: f64,
    pub available: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Keys a request body must carry, in the order they are checked.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "promo_name",
    "goods_name",
    "category",
    "price",
    "discount",
    "available",
];

pub const BAD_DATA: &str = "Invalid promotion: body of request contained bad or no data";

/// A promotional discount on one good.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Promotion {
    pub id: Option<i32>,
    pub promo_name: String,
    pub goods_name: String,
    pub category: String,
    pub price: f64,
    pub discount: f64,
    pub available: bool,
}

impl Promotion {
    pub fn new(
        promo_name: impl Into<String>,
        goods_name: impl Into<String>,
        category: impl Into<String>,
        price: f64,
        discount: f64,
        available: bool,
    ) -> Self {
        Self {
            id: None,
            promo_name: promo_name.into(),
            goods_name: goods_name.into(),
            category: category.into(),
            price,
            discount,
            available,
        }
    }

    /// Flat JSON object with the six business fields plus `id` (`null` when unsaved).
    pub fn serialize(&self) -> JsonValue {
        json!({
            "id": self.id,
            "promo_name": self.promo_name,
            "goods_name": self.goods_name,
            "category": self.category,
            "price": self.price,
            "discount": self.discount,
            "available": self.available,
        })
    }

    /// Overwrite the business fields from a JSON object. `id` is left alone.
    ///
    /// Nothing is written unless every field decodes.
    pub fn deserialize(&mut self, data: &JsonValue) -> Result<&mut Self, ModelError> {
        let map = data
            .as_object()
            .ok_or_else(|| ModelError::Validation(BAD_DATA.to_string()))?;
        if let Some(missing) = REQUIRED_FIELDS.iter().find(|k| !map.contains_key(**k)) {
            return Err(ModelError::Validation(format!("Invalid promotion: missing {missing}")));
        }

        let promo_name = text(map, "promo_name")?;
        let goods_name = text(map, "goods_name")?;
        let category = text(map, "category")?;
        let price = number(map, "price")?;
        let discount = number(map, "discount")?;
        let available = flag(map, "available")?;

        self.promo_name = promo_name;
        self.goods_name = goods_name;
        self.category = category;
        self.price = price;
        self.discount = discount;
        self.available = available;
        Ok(self)
    }

    /// Fresh unsaved entity decoded from `data`.
    pub fn from_json(data: &JsonValue) -> Result<Self, ModelError> {
        let mut promotion = Self::default();
        promotion.deserialize(data)?;
        Ok(promotion)
    }
}

fn invalid(key: &str, expected: &str) -> ModelError {
    ModelError::Validation(format!("Invalid promotion: {key} must be {expected}"))
}

fn text(map: &Map<String, JsonValue>, key: &str) -> Result<String, ModelError> {
    match map.get(key) {
        Some(JsonValue::String(s)) => Ok(s.clone()),
        _ => Err(invalid(key, "a string")),
    }
}

// Clients historically send prices as strings ("2.99"), so numeric strings pass.
fn number(map: &Map<String, JsonValue>, key: &str) -> Result<f64, ModelError> {
    let value = match map.get(key) {
        Some(JsonValue::Number(n)) => n.as_f64(),
        Some(JsonValue::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(key, "a number"))
}

fn flag(map: &Map<String, JsonValue>, key: &str) -> Result<bool, ModelError> {
    match map.get(key) {
        Some(JsonValue::Bool(b)) => Ok(*b),
        _ => Err(invalid(key, "a boolean")),
    }
}

impl From<Model> for Promotion {
    fn from(m: Model) -> Self {
        Self {
            id: Some(m.id),
            promo_name: m.promo_name,
            goods_name: m.goods_name,
            category: m.category,
            price: m.price,
            discount: m.discount,
            available: m.available,
        }
    }
}

impl IntoActiveModel<ActiveModel> for Promotion {
    fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: match self.id {
                Some(id) => Set(id),
                None => NotSet,
            },
            promo_name: Set(self.promo_name),
            goods_name: Set(self.goods_name),
            category: Set(self.category),
            price: Set(self.price),
            discount: Set(self.discount),
            available: Set(self.available),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn broccoli() -> JsonValue {
        json!({
            "promo_name": "20% off",
            "goods_name": "broccoli",
            "category": "Vegetable",
            "price": 3.45,
            "discount": 0.8,
            "available": false,
        })
    }

    #[test]
    fn unsaved_promotion_serializes_null_id() {
        let p = Promotion::new("random", "random_good", "random_category", 20.0, 20.0, true);
        let v = p.serialize();
        assert!(v["id"].is_null());
        assert_eq!(v["promo_name"], "random");
        assert_eq!(v["goods_name"], "random_good");
        assert_eq!(v["category"], "random_category");
        assert_eq!(v["price"], 20.0);
        assert_eq!(v["available"], true);
        assert_eq!(v.as_object().unwrap().len(), 7);
    }

    #[test]
    fn deserialize_fills_business_fields_and_keeps_id() {
        let mut p = Promotion { id: Some(7), ..Promotion::default() };
        p.deserialize(&broccoli()).unwrap();
        assert_eq!(p.id, Some(7));
        assert_eq!(p.promo_name, "20% off");
        assert_eq!(p.goods_name, "broccoli");
        assert_eq!(p.category, "Vegetable");
        assert_eq!(p.price, 3.45);
        assert_eq!(p.discount, 0.8);
        assert!(!p.available);
    }

    #[test]
    fn body_id_is_ignored() {
        let mut body = broccoli();
        body["id"] = json!(99);
        let p = Promotion::from_json(&body).unwrap();
        assert_eq!(p.id, None);
    }

    #[test]
    fn each_missing_key_is_named() {
        for key in REQUIRED_FIELDS {
            let mut body = broccoli();
            body.as_object_mut().unwrap().remove(key);
            match Promotion::from_json(&body) {
                Err(ModelError::Validation(msg)) => {
                    assert!(msg.ends_with(&format!("missing {key}")), "{msg}")
                }
                other => panic!("expected validation error for {key}, got {other:?}"),
            }
        }
    }

    #[test]
    fn non_object_body_is_bad_data() {
        for body in [json!("just a string"), json!([1, 2, 3]), JsonValue::Null, json!(42)] {
            match Promotion::from_json(&body) {
                Err(ModelError::Validation(msg)) => assert!(msg.contains("bad or no data")),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn numeric_strings_are_accepted_for_prices() {
        let mut body = broccoli();
        body["price"] = json!("2.99");
        body["discount"] = json!(" 0.5 ");
        let p = Promotion::from_json(&body).unwrap();
        assert_eq!(p.price, 2.99);
        assert_eq!(p.discount, 0.5);
    }

    #[test]
    fn wrong_types_are_rejected_without_partial_writes() {
        let mut p = Promotion::from_json(&broccoli()).unwrap();
        let before = p.clone();

        let mut body = broccoli();
        body["goods_name"] = json!("carrot");
        body["price"] = json!("cheap");
        assert!(matches!(p.deserialize(&body), Err(ModelError::Validation(_))));
        assert_eq!(p, before);

        let mut body = broccoli();
        body["available"] = json!("yes");
        assert!(p.deserialize(&body).is_err());

        let mut body = broccoli();
        body["category"] = json!(5);
        assert!(p.deserialize(&body).is_err());

        let mut body = broccoli();
        body["discount"] = JsonValue::Null;
        assert!(p.deserialize(&body).is_err());
    }

    #[test]
    fn serialize_then_deserialize_keeps_business_fields() {
        let mut original = Promotion::from_json(&broccoli()).unwrap();
        original.id = Some(3);
        let copy = Promotion::from_json(&original.serialize()).unwrap();
        assert_eq!(copy, Promotion { id: None, ..original });
    }

    #[test]
    fn active_model_leaves_id_unset_for_new_rows() {
        let am = Promotion::from_json(&broccoli()).unwrap().into_active_model();
        assert!(matches!(am.id, sea_orm::ActiveValue::NotSet));
        let am = Promotion { id: Some(4), ..Promotion::default() }.into_active_model();
        assert!(matches!(am.id, sea_orm::ActiveValue::Set(4)));
    }

    #[tokio::test]
    async fn row_round_trips_through_table() -> anyhow::Result<()> {
        use migration::MigratorTrait;
        use sea_orm::ActiveModelTrait;

        let db = crate::db::connect_with_config(&configs::DatabaseConfig::sqlite_memory()).await?;
        migration::Migrator::up(&db, None).await?;

        let saved = Promotion::from_json(&broccoli())?.into_active_model().insert(&db).await?;
        assert!(saved.id > 0);

        let found = Entity::find_by_id(saved.id).one(&db).await?.map(Promotion::from);
        let found = found.expect("row present");
        assert_eq!(found.id, Some(saved.id));
        assert_eq!(found.goods_name, "broccoli");
        assert_eq!(found.price, 3.45);
        Ok(())
    }
}
