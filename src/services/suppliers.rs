use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    entities::{
        supplier::{self, FeedType},
        supplier_shipping, upc_alias,
    },
    errors::ServiceError,
};

fn default_lead_days() -> i32 {
    2
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewSupplier {
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub website: Option<String>,
    pub account_number: Option<String>,
    pub rep_name: Option<String>,
    pub rep_phone: Option<String>,
    pub min_order_amount: Option<Decimal>,
    pub min_order_cases: Option<i32>,
    #[serde(default = "default_lead_days")]
    #[validate(range(min = 0, max = 60))]
    pub order_lead_days: i32,
    pub delivery_days: Option<String>,
    #[serde(default)]
    pub feed_type: FeedType,
}

/// Fields an operator may change on a supplier. `code` is immutable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct SupplierUpdate {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub website: Option<String>,
    pub account_number: Option<String>,
    pub rep_name: Option<String>,
    pub rep_phone: Option<String>,
    pub min_order_amount: Option<Decimal>,
    pub min_order_cases: Option<i32>,
    #[validate(range(min = 0, max = 60))]
    pub order_lead_days: Option<i32>,
    pub delivery_days: Option<String>,
    pub feed_type: Option<FeedType>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewShippingProfile {
    #[validate(length(min = 1, max = 50))]
    pub method: String,
    pub per_case_fee: Option<Decimal>,
    pub flat_fee: Option<Decimal>,
    pub free_shipping_threshold: Option<Decimal>,
    pub effective_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewUpcAlias {
    #[validate(length(min = 1, max = 50))]
    pub supplier_sku: String,
    #[validate(length(min = 1, max = 50))]
    pub standard_upc: String,
    pub supplier_name: Option<String>,
    pub match_method: Option<String>,
    pub created_by: Option<String>,
}

#[derive(Clone)]
pub struct SupplierService {
    db: Arc<DatabaseConnection>,
}

impl SupplierService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Suppliers ordered by name
    #[instrument(skip(self))]
    pub async fn list_suppliers(&self, active_only: bool) -> Result<Vec<supplier::Model>, ServiceError> {
        let mut query = supplier::Entity::find();
        if active_only {
            query = query.filter(supplier::Column::IsActive.eq(true));
        }

        Ok(query
            .order_by_asc(supplier::Column::Name)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_supplier(&self, id: i32) -> Result<supplier::Model, ServiceError> {
        supplier::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Supplier", id))
    }

    #[instrument(skip(self, input), fields(code = %input.code))]
    pub async fn create_supplier(&self, input: NewSupplier) -> Result<supplier::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let existing = supplier::Entity::find()
            .filter(supplier::Column::Code.eq(input.code.as_str()))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::InvalidInput(format!(
                "Supplier with code '{}' already exists",
                input.code
            )));
        }

        let now = Utc::now();
        let created = supplier::ActiveModel {
            code: Set(input.code),
            name: Set(input.name),
            contact_name: Set(input.contact_name),
            phone: Set(input.phone),
            email: Set(input.email),
            website: Set(input.website),
            account_number: Set(input.account_number),
            rep_name: Set(input.rep_name),
            rep_phone: Set(input.rep_phone),
            min_order_amount: Set(input.min_order_amount),
            min_order_cases: Set(input.min_order_cases),
            order_lead_days: Set(input.order_lead_days),
            delivery_days: Set(input.delivery_days),
            feed_type: Set(input.feed_type),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(supplier_id = created.id, "Supplier created");
        Ok(created)
    }

    #[instrument(skip(self, update))]
    pub async fn update_supplier(
        &self,
        id: i32,
        update: SupplierUpdate,
    ) -> Result<supplier::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let mut active = supplier::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Supplier", id))?
            .into_active_model();

        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(contact_name) = update.contact_name {
            active.contact_name = Set(Some(contact_name));
        }
        if let Some(phone) = update.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(email) = update.email {
            active.email = Set(Some(email));
        }
        if let Some(website) = update.website {
            active.website = Set(Some(website));
        }
        if let Some(account_number) = update.account_number {
            active.account_number = Set(Some(account_number));
        }
        if let Some(rep_name) = update.rep_name {
            active.rep_name = Set(Some(rep_name));
        }
        if let Some(rep_phone) = update.rep_phone {
            active.rep_phone = Set(Some(rep_phone));
        }
        if let Some(amount) = update.min_order_amount {
            active.min_order_amount = Set(Some(amount));
        }
        if let Some(cases) = update.min_order_cases {
            active.min_order_cases = Set(Some(cases));
        }
        if let Some(days) = update.order_lead_days {
            active.order_lead_days = Set(days);
        }
        if let Some(delivery_days) = update.delivery_days {
            active.delivery_days = Set(Some(delivery_days));
        }
        if let Some(feed_type) = update.feed_type {
            active.feed_type = Set(feed_type);
        }
        if let Some(is_active) = update.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!(supplier_id = id, "Supplier updated");
        Ok(updated)
    }

    /// Soft delete. Prices and orders keep pointing at the row.
    #[instrument(skip(self))]
    pub async fn deactivate_supplier(&self, id: i32) -> Result<supplier::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let mut active = supplier::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Supplier", id))?
            .into_active_model();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now());

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!(supplier_id = id, "Supplier deactivated");
        Ok(updated)
    }

    #[instrument(skip(self, input))]
    pub async fn add_shipping_profile(
        &self,
        supplier_id: i32,
        input: NewShippingProfile,
    ) -> Result<supplier_shipping::Model, ServiceError> {
        let txn = self.db.begin().await?;

        supplier::Entity::find_by_id(supplier_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Supplier", supplier_id))?;

        let created = supplier_shipping::ActiveModel {
            supplier_id: Set(supplier_id),
            method: Set(input.method),
            per_case_fee: Set(input.per_case_fee),
            flat_fee: Set(input.flat_fee),
            free_shipping_threshold: Set(input.free_shipping_threshold),
            effective_date: Set(input.effective_date.unwrap_or_else(Utc::now)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(supplier_id, profile_id = created.id, "Shipping profile added");
        Ok(created)
    }

    #[instrument(skip(self, input), fields(sku = %input.supplier_sku))]
    pub async fn add_upc_alias(
        &self,
        supplier_id: i32,
        input: NewUpcAlias,
    ) -> Result<upc_alias::Model, ServiceError> {
        let txn = self.db.begin().await?;

        supplier::Entity::find_by_id(supplier_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Supplier", supplier_id))?;

        let sku = input.supplier_sku.clone();
        let created = upc_alias::ActiveModel {
            supplier_id: Set(supplier_id),
            supplier_sku: Set(input.supplier_sku),
            supplier_name: Set(input.supplier_name),
            standard_upc: Set(input.standard_upc),
            match_method: Set(input.match_method.or_else(|| Some("manual".to_string()))),
            created_at: Set(Utc::now()),
            created_by: Set(input.created_by),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => ServiceError::Conflict(format!(
                "Alias '{}' already exists for supplier {}",
                sku, supplier_id
            )),
            _ => ServiceError::DatabaseError(e),
        })?;

        txn.commit().await?;

        info!(supplier_id, alias_id = created.id, "UPC alias added");
        Ok(created)
    }
}
