//! Storage row shapes, one per table. Column names match the tables
//! created by [`super::schema::ensure_tables`].

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::postgres::PgRow;

/// What every store needs from a row regardless of entity.
pub trait StorageRow: for<'r> sqlx::FromRow<'r, PgRow> + Clone + Send + Sync + Unpin + 'static {
    fn key(&self) -> i32;
    fn set_key(&mut self, key: i32);
    fn registered_at(&self) -> Option<NaiveDateTime>;
    fn set_registered_at(&mut self, at: Option<NaiveDateTime>);
    /// Listing order.
    fn sort_name(&self) -> &str;
}

macro_rules! storage_row {
    ($row:ty, $key:ident) => {
        impl StorageRow for $row {
            fn key(&self) -> i32 {
                self.$key
            }

            fn set_key(&mut self, key: i32) {
                self.$key = key;
            }

            fn registered_at(&self) -> Option<NaiveDateTime> {
                self.data_cadastro
            }

            fn set_registered_at(&mut self, at: Option<NaiveDateTime>) {
                self.data_cadastro = at;
            }

            fn sort_name(&self) -> &str {
                self.nome.as_deref().unwrap_or_default()
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CustomerRow {
    pub id_cliente: i32,
    pub nome: Option<String>,
    pub cpf: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub endereco: Option<String>,
    pub data_cadastro: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PetRow {
    pub id_pet: i32,
    pub id_cliente: Option<i32>,
    pub nome: Option<String>,
    pub especie: Option<String>,
    pub raca: Option<String>,
    pub data_nascimento: Option<NaiveDate>,
    pub peso: Option<f64>,
    pub observacoes: Option<String>,
    pub data_cadastro: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ProductRow {
    pub id_produto: i32,
    pub nome: Option<String>,
    pub descricao: Option<String>,
    pub preco: Option<f64>,
    pub estoque: Option<i32>,
    pub categoria: Option<String>,
    pub ativo: Option<bool>,
    pub data_cadastro: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StaffRow {
    pub id_funcionario: i32,
    pub nome: Option<String>,
    pub cpf: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub cargo: Option<String>,
    pub salario_base: Option<f64>,
    pub data_contratacao: Option<NaiveDate>,
    pub ativo: Option<bool>,
    pub data_cadastro: Option<NaiveDateTime>,
}

storage_row!(CustomerRow, id_cliente);
storage_row!(PetRow, id_pet);
storage_row!(ProductRow, id_produto);
storage_row!(StaffRow, id_funcionario);
