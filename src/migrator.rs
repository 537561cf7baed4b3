use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241001_000001_create_catalog_tables::Migration),
            Box::new(m20241001_000002_create_comparisons_table::Migration),
            Box::new(m20241001_000003_create_purchase_order_tables::Migration),
            Box::new(m20241001_000004_create_receiving_tables::Migration),
            Box::new(m20241001_000005_create_cart_table::Migration),
        ]
    }
}

mod m20241001_000001_create_catalog_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20241001_000001_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Products::Upc).string_len(20).not_null())
                        .col(ColumnDef::new(Products::Name).string_len(255).not_null())
                        .col(ColumnDef::new(Products::Department).string_len(100).null())
                        .col(ColumnDef::new(Products::CurrentVendor).string_len(100).null())
                        .col(ColumnDef::new(Products::CurrentCost).decimal_len(10, 4).null())
                        .col(ColumnDef::new(Products::RetailPrice).decimal_len(10, 2).null())
                        .col(
                            ColumnDef::new(Products::PackSize)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(Products::OnHand)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Products::ReorderPoint).integer().null())
                        .col(ColumnDef::new(Products::ReorderQty).integer().null())
                        .col(
                            ColumnDef::new(Products::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .unique()
                        .name("idx_products_upc")
                        .table(Products::Table)
                        .col(Products::Upc)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Suppliers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Suppliers::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Suppliers::Code).string_len(20).not_null())
                        .col(ColumnDef::new(Suppliers::Name).string_len(100).not_null())
                        .col(ColumnDef::new(Suppliers::ContactName).string_len(100).null())
                        .col(ColumnDef::new(Suppliers::Phone).string_len(20).null())
                        .col(ColumnDef::new(Suppliers::Email).string_len(100).null())
                        .col(ColumnDef::new(Suppliers::Website).string_len(255).null())
                        .col(ColumnDef::new(Suppliers::AccountNumber).string_len(50).null())
                        .col(ColumnDef::new(Suppliers::RepName).string_len(100).null())
                        .col(ColumnDef::new(Suppliers::RepPhone).string_len(20).null())
                        .col(
                            ColumnDef::new(Suppliers::MinOrderAmount)
                                .decimal_len(10, 2)
                                .null(),
                        )
                        .col(ColumnDef::new(Suppliers::MinOrderCases).integer().null())
                        .col(
                            ColumnDef::new(Suppliers::OrderLeadDays)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(ColumnDef::new(Suppliers::DeliveryDays).string_len(50).null())
                        .col(
                            ColumnDef::new(Suppliers::FeedType)
                                .string_len(20)
                                .not_null()
                                .default("manual"),
                        )
                        .col(
                            ColumnDef::new(Suppliers::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Suppliers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Suppliers::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .unique()
                        .name("idx_suppliers_code")
                        .table(Suppliers::Table)
                        .col(Suppliers::Code)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SupplierPrices::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SupplierPrices::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(SupplierPrices::Upc).string_len(20).not_null())
                        .col(ColumnDef::new(SupplierPrices::ProductId).integer().null())
                        .col(ColumnDef::new(SupplierPrices::SupplierId).integer().not_null())
                        .col(ColumnDef::new(SupplierPrices::SupplierSku).string_len(50).null())
                        .col(
                            ColumnDef::new(SupplierPrices::UnitCost)
                                .decimal_len(10, 4)
                                .not_null(),
                        )
                        .col(ColumnDef::new(SupplierPrices::CaseCost).decimal_len(10, 4).null())
                        .col(
                            ColumnDef::new(SupplierPrices::CasePack)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(SupplierPrices::EffectiveDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SupplierPrices::ExpiresAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(SupplierPrices::PriceType)
                                .string_len(20)
                                .not_null()
                                .default("list"),
                        )
                        .col(ColumnDef::new(SupplierPrices::PromoName).string_len(100).null())
                        .col(ColumnDef::new(SupplierPrices::Source).string_len(50).null())
                        .col(
                            ColumnDef::new(SupplierPrices::InStock)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(SupplierPrices::AvailableQty).integer().null())
                        .col(
                            ColumnDef::new(SupplierPrices::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_supplier_prices_supplier_id")
                                .from(SupplierPrices::Table, SupplierPrices::SupplierId)
                                .to(Suppliers::Table, Suppliers::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_supplier_prices_product_id")
                                .from(SupplierPrices::Table, SupplierPrices::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::SetNull)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_supplier_prices_lookup")
                        .table(SupplierPrices::Table)
                        .col(SupplierPrices::Upc)
                        .col(SupplierPrices::SupplierId)
                        .col(SupplierPrices::EffectiveDate)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(UpcAliases::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(UpcAliases::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(UpcAliases::SupplierId).integer().not_null())
                        .col(ColumnDef::new(UpcAliases::SupplierSku).string_len(50).not_null())
                        .col(ColumnDef::new(UpcAliases::SupplierName).string_len(255).null())
                        .col(ColumnDef::new(UpcAliases::StandardUpc).string_len(20).not_null())
                        .col(ColumnDef::new(UpcAliases::MatchMethod).string_len(20).null())
                        .col(
                            ColumnDef::new(UpcAliases::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(UpcAliases::CreatedBy).string_len(50).null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_upc_aliases_supplier_id")
                                .from(UpcAliases::Table, UpcAliases::SupplierId)
                                .to(Suppliers::Table, Suppliers::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .unique()
                        .name("idx_upc_aliases_supplier_sku")
                        .table(UpcAliases::Table)
                        .col(UpcAliases::SupplierId)
                        .col(UpcAliases::SupplierSku)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_upc_aliases_standard_upc")
                        .table(UpcAliases::Table)
                        .col(UpcAliases::StandardUpc)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SupplierShipping::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SupplierShipping::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(SupplierShipping::SupplierId).integer().not_null())
                        .col(
                            ColumnDef::new(SupplierShipping::Method)
                                .string_len(50)
                                .not_null()
                                .default("delivery"),
                        )
                        .col(
                            ColumnDef::new(SupplierShipping::PerCaseFee)
                                .decimal_len(10, 4)
                                .null(),
                        )
                        .col(ColumnDef::new(SupplierShipping::FlatFee).decimal_len(10, 2).null())
                        .col(
                            ColumnDef::new(SupplierShipping::FreeShippingThreshold)
                                .decimal_len(10, 2)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(SupplierShipping::EffectiveDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_supplier_shipping_supplier_id")
                                .from(SupplierShipping::Table, SupplierShipping::SupplierId)
                                .to(Suppliers::Table, Suppliers::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SupplierShipping::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(UpcAliases::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SupplierPrices::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Suppliers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Products {
        Table,
        Id,
        Upc,
        Name,
        Department,
        CurrentVendor,
        CurrentCost,
        RetailPrice,
        PackSize,
        OnHand,
        ReorderPoint,
        ReorderQty,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum Suppliers {
        Table,
        Id,
        Code,
        Name,
        ContactName,
        Phone,
        Email,
        Website,
        AccountNumber,
        RepName,
        RepPhone,
        MinOrderAmount,
        MinOrderCases,
        OrderLeadDays,
        DeliveryDays,
        FeedType,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum SupplierPrices {
        Table,
        Id,
        Upc,
        ProductId,
        SupplierId,
        SupplierSku,
        UnitCost,
        CaseCost,
        CasePack,
        EffectiveDate,
        ExpiresAt,
        PriceType,
        PromoName,
        Source,
        InStock,
        AvailableQty,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum UpcAliases {
        Table,
        Id,
        SupplierId,
        SupplierSku,
        SupplierName,
        StandardUpc,
        MatchMethod,
        CreatedAt,
        CreatedBy,
    }

    #[derive(DeriveIden)]
    enum SupplierShipping {
        Table,
        Id,
        SupplierId,
        Method,
        PerCaseFee,
        FlatFee,
        FreeShippingThreshold,
        EffectiveDate,
    }
}

mod m20241001_000002_create_comparisons_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20241001_000002_create_comparisons_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(BestBuyComparisons::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(BestBuyComparisons::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(BestBuyComparisons::Upc).string_len(20).not_null())
                        .col(ColumnDef::new(BestBuyComparisons::ProductId).integer().null())
                        .col(
                            ColumnDef::new(BestBuyComparisons::ScannedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(BestBuyComparisons::ScannedBy).string_len(50).null())
                        .col(
                            ColumnDef::new(BestBuyComparisons::CurrentCost)
                                .decimal_len(10, 4)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(BestBuyComparisons::CurrentVendor)
                                .string_len(100)
                                .null(),
                        )
                        .col(ColumnDef::new(BestBuyComparisons::BestSupplierId).integer().null())
                        .col(
                            ColumnDef::new(BestBuyComparisons::BestUnitCost)
                                .decimal_len(10, 4)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(BestBuyComparisons::SavingsPerUnit)
                                .decimal_len(10, 4)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(BestBuyComparisons::SavingsPercent)
                                .decimal_len(5, 2)
                                .null(),
                        )
                        .col(ColumnDef::new(BestBuyComparisons::AllOptions).json().not_null())
                        .col(
                            ColumnDef::new(BestBuyComparisons::Action)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BestBuyComparisons::OrderedFromSupplierId)
                                .integer()
                                .null(),
                        )
                        .col(ColumnDef::new(BestBuyComparisons::OrderQty).integer().null())
                        .col(
                            ColumnDef::new(BestBuyComparisons::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_best_buy_comparisons_upc")
                        .table(BestBuyComparisons::Table)
                        .col(BestBuyComparisons::Upc)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(BestBuyComparisons::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum BestBuyComparisons {
        Table,
        Id,
        Upc,
        ProductId,
        ScannedAt,
        ScannedBy,
        CurrentCost,
        CurrentVendor,
        BestSupplierId,
        BestUnitCost,
        SavingsPerUnit,
        SavingsPercent,
        AllOptions,
        Action,
        OrderedFromSupplierId,
        OrderQty,
        CreatedAt,
    }
}

mod m20241001_000003_create_purchase_order_tables {
    use super::m20241001_000001_create_catalog_tables::Suppliers;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20241001_000003_create_purchase_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrders::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::PoNumber).string_len(50).not_null())
                        .col(ColumnDef::new(PurchaseOrders::SupplierId).integer().not_null())
                        .col(
                            ColumnDef::new(PurchaseOrders::Status)
                                .string_len(20)
                                .not_null()
                                .default("draft"),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::SentAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::ExpectedDelivery)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::ClosedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::TotalItems)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::TotalCases)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::TotalCost)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::ItemsReceived)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::CasesReceived)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(PurchaseOrders::Notes).text().null())
                        .col(ColumnDef::new(PurchaseOrders::CreatedBy).string_len(50).null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_orders_supplier_id")
                                .from(PurchaseOrders::Table, PurchaseOrders::SupplierId)
                                .to(Suppliers::Table, Suppliers::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            // Guards po_number generation against concurrent creation for the same day
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .unique()
                        .name("idx_purchase_orders_po_number")
                        .table(PurchaseOrders::Table)
                        .col(PurchaseOrders::PoNumber)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_orders_status")
                        .table(PurchaseOrders::Table)
                        .col(PurchaseOrders::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PoLineItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PoLineItems::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(PoLineItems::PoId).integer().not_null())
                        .col(ColumnDef::new(PoLineItems::Upc).string_len(20).not_null())
                        .col(ColumnDef::new(PoLineItems::ProductId).integer().null())
                        .col(ColumnDef::new(PoLineItems::ProductName).string_len(255).null())
                        .col(ColumnDef::new(PoLineItems::SupplierSku).string_len(50).null())
                        .col(ColumnDef::new(PoLineItems::QtyOrdered).integer().not_null())
                        .col(ColumnDef::new(PoLineItems::UnitCost).decimal_len(10, 4).not_null())
                        .col(
                            ColumnDef::new(PoLineItems::CasePack)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(ColumnDef::new(PoLineItems::LineTotal).decimal_len(12, 2).not_null())
                        .col(
                            ColumnDef::new(PoLineItems::QtyReceived)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(PoLineItems::QtyPending).integer().not_null())
                        .col(
                            ColumnDef::new(PoLineItems::Status)
                                .string_len(20)
                                .not_null()
                                .default("pending"),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_po_line_items_po_id")
                                .from(PoLineItems::Table, PoLineItems::PoId)
                                .to(PurchaseOrders::Table, PurchaseOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_po_line_items_po_id")
                        .table(PoLineItems::Table)
                        .col(PoLineItems::PoId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PoLineItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PurchaseOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum PurchaseOrders {
        Table,
        Id,
        PoNumber,
        SupplierId,
        Status,
        CreatedAt,
        SentAt,
        ExpectedDelivery,
        ClosedAt,
        TotalItems,
        TotalCases,
        TotalCost,
        ItemsReceived,
        CasesReceived,
        Notes,
        CreatedBy,
    }

    #[derive(DeriveIden)]
    pub(super) enum PoLineItems {
        Table,
        Id,
        PoId,
        Upc,
        ProductId,
        ProductName,
        SupplierSku,
        QtyOrdered,
        UnitCost,
        CasePack,
        LineTotal,
        QtyReceived,
        QtyPending,
        Status,
    }
}

mod m20241001_000004_create_receiving_tables {
    use super::m20241001_000003_create_purchase_order_tables::{PoLineItems, PurchaseOrders};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20241001_000004_create_receiving_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ReceivingSessions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ReceivingSessions::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(ReceivingSessions::PoId).integer().null())
                        .col(ColumnDef::new(ReceivingSessions::SupplierId).integer().null())
                        .col(
                            ColumnDef::new(ReceivingSessions::ReceivedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReceivingSessions::CompletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(ReceivingSessions::ReceivedBy).string_len(50).null())
                        .col(
                            ColumnDef::new(ReceivingSessions::InvoiceNumber)
                                .string_len(50)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ReceivingSessions::DeliveryTicket)
                                .string_len(50)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ReceivingSessions::Status)
                                .string_len(20)
                                .not_null()
                                .default("in_progress"),
                        )
                        .col(
                            ColumnDef::new(ReceivingSessions::TotalItems)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ReceivingSessions::TotalCases)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ReceivingSessions::ItemsShort)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ReceivingSessions::ItemsOver)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ReceivingSessions::ItemsDamaged)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(ReceivingSessions::Notes).text().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_receiving_sessions_po_id")
                                .from(ReceivingSessions::Table, ReceivingSessions::PoId)
                                .to(PurchaseOrders::Table, PurchaseOrders::Id)
                                .on_delete(ForeignKeyAction::SetNull)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ReceivingItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ReceivingItems::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(ReceivingItems::SessionId).integer().not_null())
                        .col(ColumnDef::new(ReceivingItems::PoLineId).integer().null())
                        .col(ColumnDef::new(ReceivingItems::Upc).string_len(20).not_null())
                        .col(ColumnDef::new(ReceivingItems::ProductName).string_len(255).null())
                        .col(ColumnDef::new(ReceivingItems::QtyReceived).integer().not_null())
                        .col(ColumnDef::new(ReceivingItems::QtyExpected).integer().null())
                        .col(
                            ColumnDef::new(ReceivingItems::QtyDamaged)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(ReceivingItems::QtyGood).integer().not_null())
                        .col(
                            ColumnDef::new(ReceivingItems::DiscrepancyType)
                                .string_len(20)
                                .not_null()
                                .default("none"),
                        )
                        .col(
                            ColumnDef::new(ReceivingItems::DiscrepancyQty)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(ReceivingItems::DiscrepancyNotes).text().null())
                        .col(
                            ColumnDef::new(ReceivingItems::ScannedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_receiving_items_session_id")
                                .from(ReceivingItems::Table, ReceivingItems::SessionId)
                                .to(ReceivingSessions::Table, ReceivingSessions::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_receiving_items_po_line_id")
                                .from(ReceivingItems::Table, ReceivingItems::PoLineId)
                                .to(PoLineItems::Table, PoLineItems::Id)
                                .on_delete(ForeignKeyAction::SetNull)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_receiving_items_session_id")
                        .table(ReceivingItems::Table)
                        .col(ReceivingItems::SessionId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ReceivingItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ReceivingSessions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ReceivingSessions {
        Table,
        Id,
        PoId,
        SupplierId,
        ReceivedAt,
        CompletedAt,
        ReceivedBy,
        InvoiceNumber,
        DeliveryTicket,
        Status,
        TotalItems,
        TotalCases,
        ItemsShort,
        ItemsOver,
        ItemsDamaged,
        Notes,
    }

    #[derive(DeriveIden)]
    enum ReceivingItems {
        Table,
        Id,
        SessionId,
        PoLineId,
        Upc,
        ProductName,
        QtyReceived,
        QtyExpected,
        QtyDamaged,
        QtyGood,
        DiscrepancyType,
        DiscrepancyQty,
        DiscrepancyNotes,
        ScannedAt,
    }
}

mod m20241001_000005_create_cart_table {
    use super::m20241001_000001_create_catalog_tables::Suppliers;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20241001_000005_create_cart_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderCartItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderCartItems::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(OrderCartItems::Upc).string_len(20).not_null())
                        .col(ColumnDef::new(OrderCartItems::ProductName).string_len(255).null())
                        .col(ColumnDef::new(OrderCartItems::SupplierId).integer().not_null())
                        .col(
                            ColumnDef::new(OrderCartItems::Quantity)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(OrderCartItems::UnitCost)
                                .decimal_len(10, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderCartItems::CasePack)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(OrderCartItems::AddedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderCartItems::AddedBy).string_len(50).null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_cart_items_supplier_id")
                                .from(OrderCartItems::Table, OrderCartItems::SupplierId)
                                .to(Suppliers::Table, Suppliers::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .unique()
                        .name("idx_order_cart_items_upc_supplier")
                        .table(OrderCartItems::Table)
                        .col(OrderCartItems::Upc)
                        .col(OrderCartItems::SupplierId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderCartItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum OrderCartItems {
        Table,
        Id,
        Upc,
        ProductName,
        SupplierId,
        Quantity,
        UnitCost,
        CasePack,
        AddedAt,
        AddedBy,
    }
}
