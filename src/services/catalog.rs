use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait,
    ActiveValue::Set,
    ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{entities::product, errors::ServiceError};

const DEFAULT_PRODUCT_LIMIT: u64 = 100;
const MAX_PRODUCT_LIMIT: u64 = 500;

fn default_pack_size() -> i32 {
    1
}

/// Query parameters for browsing the catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductFilter {
    pub department: Option<String>,
    pub vendor: Option<String>,
    /// Case-insensitive substring of the product name
    pub search: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewProduct {
    #[validate(length(min = 1, max = 50))]
    pub upc: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub department: Option<String>,
    pub current_vendor: Option<String>,
    pub current_cost: Option<Decimal>,
    pub retail_price: Option<Decimal>,
    #[serde(default = "default_pack_size")]
    #[validate(range(min = 1))]
    pub pack_size: i32,
    #[serde(default)]
    pub on_hand: i32,
    pub reorder_point: Option<i32>,
    pub reorder_qty: Option<i32>,
}

/// Mutable catalog fields. UPC is the identity and never changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProductUpdate {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub department: Option<String>,
    pub current_vendor: Option<String>,
    pub current_cost: Option<Decimal>,
    pub retail_price: Option<Decimal>,
    #[validate(range(min = 1))]
    pub pack_size: Option<i32>,
    pub on_hand: Option<i32>,
    pub reorder_point: Option<i32>,
    pub reorder_qty: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductStats {
    pub total_products: u64,
    pub products_with_cost: u64,
    pub products_with_vendor: u64,
    pub departments: u64,
}

fn clamp_limit(limit: Option<u64>) -> u64 {
    limit.unwrap_or(DEFAULT_PRODUCT_LIMIT).clamp(1, MAX_PRODUCT_LIMIT)
}

/// Read/write access to the product catalog
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self, filter: ProductFilter) -> Result<Vec<product::Model>, ServiceError> {
        let mut query = product::Entity::find();

        if let Some(department) = filter.department {
            query = query.filter(product::Column::Department.eq(department));
        }
        if let Some(vendor) = filter.vendor {
            query = query.filter(product::Column::CurrentVendor.eq(vendor));
        }
        if let Some(search) = filter.search.filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", search.trim().to_lowercase());
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(product::Column::Name))).like(pattern),
            );
        }

        let products = query
            .order_by_asc(product::Column::Name)
            .order_by_asc(product::Column::Id)
            .limit(clamp_limit(filter.limit))
            .offset(filter.offset.unwrap_or(0))
            .all(&*self.db)
            .await?;

        Ok(products)
    }

    /// Distinct non-null departments, sorted
    #[instrument(skip(self))]
    pub async fn list_departments(&self) -> Result<Vec<String>, ServiceError> {
        let departments: Vec<Option<String>> = product::Entity::find()
            .select_only()
            .column(product::Column::Department)
            .filter(product::Column::Department.is_not_null())
            .distinct()
            .order_by_asc(product::Column::Department)
            .into_tuple()
            .all(&*self.db)
            .await?;

        Ok(departments.into_iter().flatten().collect())
    }

    /// Distinct non-null current vendors, sorted
    #[instrument(skip(self))]
    pub async fn list_vendors(&self) -> Result<Vec<String>, ServiceError> {
        let vendors: Vec<Option<String>> = product::Entity::find()
            .select_only()
            .column(product::Column::CurrentVendor)
            .filter(product::Column::CurrentVendor.is_not_null())
            .distinct()
            .order_by_asc(product::Column::CurrentVendor)
            .into_tuple()
            .all(&*self.db)
            .await?;

        Ok(vendors.into_iter().flatten().collect())
    }

    #[instrument(skip(self))]
    pub async fn product_stats(&self) -> Result<ProductStats, ServiceError> {
        let db = &*self.db;

        let total_products = product::Entity::find().count(db).await?;
        let products_with_cost = product::Entity::find()
            .filter(product::Column::CurrentCost.is_not_null())
            .count(db)
            .await?;
        let products_with_vendor = product::Entity::find()
            .filter(product::Column::CurrentVendor.is_not_null())
            .count(db)
            .await?;
        let departments = self.list_departments().await?.len() as u64;

        Ok(ProductStats {
            total_products,
            products_with_cost,
            products_with_vendor,
            departments,
        })
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i32) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", id))
    }

    #[instrument(skip(self))]
    pub async fn get_product_by_upc(&self, upc: &str) -> Result<product::Model, ServiceError> {
        product::Entity::find()
            .filter(product::Column::Upc.eq(upc))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product with UPC {} not found", upc)))
    }

    #[instrument(skip(self, input), fields(upc = %input.upc))]
    pub async fn create_product(&self, input: NewProduct) -> Result<product::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let now = Utc::now();
        let upc = input.upc.clone();

        let created = product::ActiveModel {
            upc: Set(input.upc),
            name: Set(input.name),
            department: Set(input.department),
            current_vendor: Set(input.current_vendor),
            current_cost: Set(input.current_cost),
            retail_price: Set(input.retail_price),
            pack_size: Set(input.pack_size),
            on_hand: Set(input.on_hand),
            reorder_point: Set(input.reorder_point),
            reorder_qty: Set(input.reorder_qty),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                ServiceError::Conflict(format!("Product with UPC {} already exists", upc))
            }
            _ => ServiceError::DatabaseError(e),
        })?;

        txn.commit().await?;

        info!(product_id = created.id, "Product created");
        Ok(created)
    }

    #[instrument(skip(self, update))]
    pub async fn update_product(
        &self,
        id: i32,
        update: ProductUpdate,
    ) -> Result<product::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let mut active = product::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", id))?
            .into_active_model();

        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(department) = update.department {
            active.department = Set(Some(department));
        }
        if let Some(vendor) = update.current_vendor {
            active.current_vendor = Set(Some(vendor));
        }
        if let Some(cost) = update.current_cost {
            active.current_cost = Set(Some(cost));
        }
        if let Some(retail) = update.retail_price {
            active.retail_price = Set(Some(retail));
        }
        if let Some(pack_size) = update.pack_size {
            active.pack_size = Set(pack_size);
        }
        if let Some(on_hand) = update.on_hand {
            active.on_hand = Set(on_hand);
        }
        if let Some(point) = update.reorder_point {
            active.reorder_point = Set(Some(point));
        }
        if let Some(qty) = update.reorder_qty {
            active.reorder_qty = Set(Some(qty));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!(product_id = id, "Product updated");
        Ok(updated)
    }
}
