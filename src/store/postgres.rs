//! PostgreSQL record store. One generic implementation; each entity supplies
//! its table layout and how to bind a row.

use super::{normalize_category, now, update_key, PetStore, ProductStore, RecordStore, StaffStore, StorageRow};
use crate::error::{AppError, NotFoundError};
use crate::model::{Customer, Pet, Product, Record, Role, Staff};
use async_trait::async_trait;
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::QueryAs;
use sqlx::PgPool;
use std::marker::PhantomData;

pub type RowQuery<'q, R> = QueryAs<'q, Postgres, R, PgArguments>;

/// Table layout of a persisted entity.
pub trait PgRecord: Record {
    const TABLE: &'static str;
    const KEY: &'static str;
    /// Non-key columns in bind order. `data_cadastro` must be last.
    const COLUMNS: &'static [&'static str];
    /// Column `find_by_*` lookups order by.
    const ORDER_BY: &'static str = "nome";

    /// Bind every entry of [`Self::COLUMNS`], in order.
    fn bind_row<'q>(row: Self::Row, query: RowQuery<'q, Self::Row>) -> RowQuery<'q, Self::Row>;
}

pub struct PgRecordStore<T> {
    pool: PgPool,
    table: String,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for PgRecordStore<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            table: self.table.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: PgRecord> PgRecordStore<T> {
    /// `schema` must already be a validated identifier.
    pub fn new(pool: PgPool, schema: &str) -> Self {
        Self {
            pool,
            table: format!("{}.{}", schema, T::TABLE),
            _record: PhantomData,
        }
    }

    fn select_list() -> String {
        format!("{}, {}", T::KEY, T::COLUMNS.join(", "))
    }

    async fn select_where<V>(&self, column: &str, value: V) -> Result<Vec<T>, AppError>
    where
        V: for<'q> sqlx::Encode<'q, Postgres> + sqlx::Type<Postgres> + Send + 'static,
    {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = $1 ORDER BY {} ASC",
            Self::select_list(),
            self.table,
            column,
            T::ORDER_BY
        );
        tracing::debug!(sql = %sql, "select");
        let rows: Vec<T::Row> = sqlx::query_as(&sql).bind(value).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(T::revive_from_storage).collect())
    }
}

#[async_trait]
impl<T: PgRecord> RecordStore<T> for PgRecordStore<T> {
    async fn insert(&self, record: &T) -> Result<T, AppError> {
        let mut row = record.to_row();
        if row.registered_at().is_none() {
            row.set_registered_at(Some(now()));
        }
        let placeholders: Vec<String> = (1..=T::COLUMNS.len()).map(|i| format!("${}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            self.table,
            T::COLUMNS.join(", "),
            placeholders.join(", "),
            Self::select_list()
        );
        tracing::debug!(sql = %sql, "insert");
        let stored: T::Row = T::bind_row(row, sqlx::query_as(&sql))
            .fetch_one(&self.pool)
            .await?;
        Ok(T::revive_from_storage(stored))
    }

    async fn find_by_id(&self, id: i32) -> Result<T, AppError> {
        let sql = format!("SELECT {} FROM {} WHERE {} = $1", Self::select_list(), self.table, T::KEY);
        tracing::debug!(sql = %sql, id, "find_by_id");
        let row: Option<T::Row> = sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(T::revive_from_storage)
            .ok_or_else(|| NotFoundError { entity: T::ENTITY, id }.into())
    }

    async fn list_all(&self) -> Result<Vec<T>, AppError> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {} ASC, {} ASC",
            Self::select_list(),
            self.table,
            T::ORDER_BY,
            T::KEY
        );
        tracing::debug!(sql = %sql, "list_all");
        let rows: Vec<T::Row> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(T::revive_from_storage).collect())
    }

    async fn update(&self, record: &T) -> Result<T, AppError> {
        let key = update_key(record)?;
        let mut row = record.to_row();
        if row.registered_at().is_none() {
            row.set_registered_at(Some(now()));
        }
        let last = T::COLUMNS.len();
        let assignments: Vec<String> = T::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, col)| {
                if i + 1 == last {
                    format!("{col} = COALESCE({col}, ${})", i + 1)
                } else {
                    format!("{col} = ${}", i + 1)
                }
            })
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
            self.table,
            assignments.join(", "),
            T::KEY,
            last + 1,
            Self::select_list()
        );
        tracing::debug!(sql = %sql, key, "update");
        let stored: Option<T::Row> = T::bind_row(row, sqlx::query_as(&sql))
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        stored
            .map(T::revive_from_storage)
            .ok_or_else(|| NotFoundError { entity: T::ENTITY, id: key }.into())
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let sql = format!("DELETE FROM {} WHERE {} = $1", self.table, T::KEY);
        tracing::debug!(sql = %sql, id, "delete");
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

impl PgRecord for Customer {
    const TABLE: &'static str = "tb_cliente";
    const KEY: &'static str = "id_cliente";
    const COLUMNS: &'static [&'static str] = &["nome", "cpf", "telefone", "email", "endereco", "data_cadastro"];

    fn bind_row<'q>(row: Self::Row, query: RowQuery<'q, Self::Row>) -> RowQuery<'q, Self::Row> {
        query
            .bind(row.nome)
            .bind(row.cpf)
            .bind(row.telefone)
            .bind(row.email)
            .bind(row.endereco)
            .bind(row.data_cadastro)
    }
}

impl PgRecord for Pet {
    const TABLE: &'static str = "tb_pet";
    const KEY: &'static str = "id_pet";
    const COLUMNS: &'static [&'static str] = &[
        "id_cliente",
        "nome",
        "especie",
        "raca",
        "data_nascimento",
        "peso",
        "observacoes",
        "data_cadastro",
    ];

    fn bind_row<'q>(row: Self::Row, query: RowQuery<'q, Self::Row>) -> RowQuery<'q, Self::Row> {
        query
            .bind(row.id_cliente)
            .bind(row.nome)
            .bind(row.especie)
            .bind(row.raca)
            .bind(row.data_nascimento)
            .bind(row.peso)
            .bind(row.observacoes)
            .bind(row.data_cadastro)
    }
}

impl PgRecord for Product {
    const TABLE: &'static str = "tb_produto";
    const KEY: &'static str = "id_produto";
    const COLUMNS: &'static [&'static str] =
        &["nome", "descricao", "preco", "estoque", "categoria", "ativo", "data_cadastro"];

    fn bind_row<'q>(row: Self::Row, query: RowQuery<'q, Self::Row>) -> RowQuery<'q, Self::Row> {
        query
            .bind(row.nome)
            .bind(row.descricao)
            .bind(row.preco)
            .bind(row.estoque)
            .bind(row.categoria)
            .bind(row.ativo)
            .bind(row.data_cadastro)
    }
}

impl PgRecord for Staff {
    const TABLE: &'static str = "tb_funcionario";
    const KEY: &'static str = "id_funcionario";
    const COLUMNS: &'static [&'static str] = &[
        "nome",
        "cpf",
        "telefone",
        "email",
        "cargo",
        "salario_base",
        "data_contratacao",
        "ativo",
        "data_cadastro",
    ];

    fn bind_row<'q>(row: Self::Row, query: RowQuery<'q, Self::Row>) -> RowQuery<'q, Self::Row> {
        query
            .bind(row.nome)
            .bind(row.cpf)
            .bind(row.telefone)
            .bind(row.email)
            .bind(row.cargo)
            .bind(row.salario_base)
            .bind(row.data_contratacao)
            .bind(row.ativo)
            .bind(row.data_cadastro)
    }
}

#[async_trait]
impl PetStore for PgRecordStore<Pet> {
    async fn find_by_customer(&self, customer_id: i32) -> Result<Vec<Pet>, AppError> {
        self.select_where("id_cliente", customer_id).await
    }
}

#[async_trait]
impl StaffStore for PgRecordStore<Staff> {
    async fn find_by_role(&self, role: Role) -> Result<Vec<Staff>, AppError> {
        self.select_where("cargo", role.tag().to_string()).await
    }
}

#[async_trait]
impl ProductStore for PgRecordStore<Product> {
    async fn find_by_category(&self, category: &str) -> Result<Vec<Product>, AppError> {
        let category = normalize_category(category)?;
        self.select_where("categoria", category).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ends_with_registration<T: PgRecord>() -> bool {
        T::COLUMNS.last() == Some(&"data_cadastro")
    }

    #[test]
    fn test_registration_column_is_last() {
        assert!(ends_with_registration::<Customer>());
        assert!(ends_with_registration::<Pet>());
        assert!(ends_with_registration::<Product>());
        assert!(ends_with_registration::<Staff>());
    }

    #[test]
    fn test_key_not_in_bound_columns() {
        assert!(!Customer::COLUMNS.contains(&Customer::KEY));
        assert!(!Pet::COLUMNS.contains(&Pet::KEY));
        assert!(!Product::COLUMNS.contains(&Product::KEY));
        assert!(!Staff::COLUMNS.contains(&Staff::KEY));
    }
}
