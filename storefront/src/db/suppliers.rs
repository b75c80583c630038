// storefront/src/db/suppliers.rs

use crate::errors::AppError;
use crate::models::supplier::{Supplier, SupplierPayload};
use sqlx::PgPool;
use uuid::Uuid;

const COLUMNS: &str = "id, name, contact_person, email, phone, address, city, country, commercial_register, \
  tax_id, bank_account, payment_terms, notes, created_at";

pub async fn list(pool: &PgPool) -> Result<Vec<Supplier>, AppError> {
  let suppliers = sqlx::query_as::<_, Supplier>(&format!("SELECT {} FROM suppliers ORDER BY created_at DESC, id DESC", COLUMNS))
    .fetch_all(pool)
    .await?;
  Ok(suppliers)
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Supplier>, AppError> {
  let supplier = sqlx::query_as::<_, Supplier>(&format!("SELECT {} FROM suppliers WHERE id = $1", COLUMNS))
    .bind(id)
    .fetch_optional(pool)
    .await?;
  Ok(supplier)
}

fn bind_payload<'q>(
  query: sqlx::query::QueryAs<'q, sqlx::Postgres, Supplier, sqlx::postgres::PgArguments>,
  p: &'q SupplierPayload,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, Supplier, sqlx::postgres::PgArguments> {
  query
    .bind(&p.name)
    .bind(&p.contact_person)
    .bind(&p.email)
    .bind(&p.phone)
    .bind(&p.address)
    .bind(&p.city)
    .bind(&p.country)
    .bind(&p.commercial_register)
    .bind(&p.tax_id)
    .bind(&p.bank_account)
    .bind(&p.payment_terms)
    .bind(&p.notes)
}

/// Inserts a supplier; the caller has already checked that `name` is present.
pub async fn insert(pool: &PgPool, payload: &SupplierPayload) -> Result<Supplier, AppError> {
  let sql = format!(
    "INSERT INTO suppliers (name, contact_person, email, phone, address, city, country, commercial_register, \
     tax_id, bank_account, payment_terms, notes) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
     RETURNING {}",
    COLUMNS
  );
  let supplier = bind_payload(sqlx::query_as::<_, Supplier>(&sql), payload)
    .fetch_one(pool)
    .await?;
  Ok(supplier)
}

pub async fn update(pool: &PgPool, id: Uuid, payload: &SupplierPayload) -> Result<Option<Supplier>, AppError> {
  let sql = format!(
    "UPDATE suppliers SET name = COALESCE($1, name), contact_person = COALESCE($2, contact_person), \
     email = COALESCE($3, email), phone = COALESCE($4, phone), address = COALESCE($5, address), \
     city = COALESCE($6, city), country = COALESCE($7, country), \
     commercial_register = COALESCE($8, commercial_register), tax_id = COALESCE($9, tax_id), \
     bank_account = COALESCE($10, bank_account), payment_terms = COALESCE($11, payment_terms), \
     notes = COALESCE($12, notes) WHERE id = $13 RETURNING {}",
    COLUMNS
  );
  let supplier = bind_payload(sqlx::query_as::<_, Supplier>(&sql), payload)
    .bind(id)
    .fetch_optional(pool)
    .await?;
  Ok(supplier)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, AppError> {
  let result = sqlx::query("DELETE FROM suppliers WHERE id = $1").bind(id).execute(pool).await?;
  Ok(result.rows_affected() > 0)
}
