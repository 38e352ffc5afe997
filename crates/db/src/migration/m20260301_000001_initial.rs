//! Initial schema: catalog, orders, invoices and payments.
//!
//! Money columns are `DECIMAL(16, 2)`; the tax rate is `DECIMAL(5, 2)`.
//! `invoices.order_id` is unique, so an order can be invoiced once.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Clients::Table)
                    .if_not_exists()
                    .col(pk_uuid(Clients::Id))
                    .col(string_len(Clients::Name, 200))
                    .col(string_len_null(Clients::Email, 254))
                    .col(string_len_null(Clients::Phone, 50))
                    .col(boolean(Clients::IsActive).default(true))
                    .col(timestamp_with_time_zone(Clients::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(pk_uuid(Products::Id))
                    .col(string_len(Products::Name, 200))
                    .col(string_len_uniq(Products::Sku, 64))
                    .col(string_len_null(Products::Category, 100))
                    .col(decimal_len(Products::CostPrice, 16, 2))
                    .col(decimal_len(Products::SellingPrice, 16, 2))
                    .col(integer(Products::Quantity).default(0))
                    .col(integer(Products::ReorderLevel).default(0))
                    .col(boolean(Products::IsActive).default(true))
                    .col(timestamp_with_time_zone(Products::CreatedAt))
                    .check(Expr::col(Products::Quantity).gte(0))
                    .check(Expr::col(Products::ReorderLevel).gte(0))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(pk_uuid(Orders::Id))
                    .col(string_len_uniq(Orders::OrderNumber, 32))
                    .col(uuid(Orders::ClientId))
                    .col(string_len(Orders::Status, 20))
                    .col(text_null(Orders::Notes))
                    .col(uuid(Orders::CreatedBy))
                    .col(timestamp_with_time_zone(Orders::OrderedAt))
                    .col(timestamp_with_time_zone(Orders::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_client")
                            .from(Orders::Table, Orders::ClientId)
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderItems::Table)
                    .if_not_exists()
                    .col(pk_uuid(OrderItems::Id))
                    .col(uuid(OrderItems::OrderId))
                    .col(uuid(OrderItems::ProductId))
                    .col(integer(OrderItems::Position))
                    .col(integer(OrderItems::Quantity))
                    .col(decimal_len(OrderItems::UnitPrice, 16, 2))
                    .check(Expr::col(OrderItems::Quantity).gt(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_items_order")
                            .from(OrderItems::Table, OrderItems::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_items_product")
                            .from(OrderItems::Table, OrderItems::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Invoices::Table)
                    .if_not_exists()
                    .col(pk_uuid(Invoices::Id))
                    .col(string_len_uniq(Invoices::InvoiceNumber, 32))
                    .col(uuid_uniq(Invoices::OrderId))
                    .col(decimal_len(Invoices::Subtotal, 16, 2))
                    .col(decimal_len(Invoices::TaxRate, 5, 2))
                    .col(decimal_len(Invoices::Discount, 16, 2))
                    .col(decimal_len(Invoices::TotalAmount, 16, 2))
                    .col(string_len(Invoices::Status, 20))
                    .col(text_null(Invoices::Notes))
                    .col(uuid(Invoices::CreatedBy))
                    .col(timestamp_with_time_zone(Invoices::IssuedAt))
                    .col(timestamp_with_time_zone(Invoices::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoices_order")
                            .from(Invoices::Table, Invoices::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(pk_uuid(Payments::Id))
                    .col(uuid(Payments::InvoiceId))
                    .col(decimal_len(Payments::Amount, 16, 2))
                    .col(string_len(Payments::Method, 20))
                    .col(string_len_null(Payments::Reference, 100))
                    .col(text_null(Payments::Notes))
                    .col(date(Payments::PaymentDate))
                    .col(uuid(Payments::CreatedBy))
                    .col(timestamp_with_time_zone(Payments::CreatedAt))
                    .check(Expr::col(Payments::Amount).gt(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_invoice")
                            .from(Payments::Table, Payments::InvoiceId)
                            .to(Invoices::Table, Invoices::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_ordered_at")
                    .table(Orders::Table)
                    .col(Orders::OrderedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_order_items_order")
                    .table(OrderItems::Table)
                    .col(OrderItems::OrderId)
                    .col(OrderItems::Position)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payments_invoice")
                    .table(Payments::Table)
                    .col(Payments::InvoiceId)
                    .col(Payments::PaymentDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payments::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Invoices::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OrderItems::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orders::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Clients::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Clients {
    Table,
    Id,
    Name,
    Email,
    Phone,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Name,
    Sku,
    Category,
    CostPrice,
    SellingPrice,
    Quantity,
    ReorderLevel,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    OrderNumber,
    ClientId,
    Status,
    Notes,
    CreatedBy,
    OrderedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OrderItems {
    Table,
    Id,
    OrderId,
    ProductId,
    Position,
    Quantity,
    UnitPrice,
}

#[derive(DeriveIden)]
enum Invoices {
    Table,
    Id,
    InvoiceNumber,
    OrderId,
    Subtotal,
    TaxRate,
    Discount,
    TotalAmount,
    Status,
    Notes,
    CreatedBy,
    IssuedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Payments {
    Table,
    Id,
    InvoiceId,
    Amount,
    Method,
    Reference,
    Notes,
    PaymentDate,
    CreatedBy,
    CreatedAt,
}
