//! Storage bootstrap: create the database, schema and tables when missing.
//! Idempotent; existing tables are left alone.

use super::postgres::PgRecord;
use crate::error::AppError;
use crate::model::{Customer, Pet, Product, Staff};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

/// Create the database named in `database_url` when it is missing.
///
/// The check runs over a short-lived connection to the `postgres`
/// maintenance database, so call this before building the main pool. A URL
/// without a database path names the server default and is left alone.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let target = TargetDatabase::parse(database_url)?;
    let Some(name) = target.name.filter(|n| n != "postgres") else {
        return Ok(());
    };
    let mut conn = sqlx::postgres::PgConnectOptions::from_str(&target.admin_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?
        .connect()
        .await?;
    let present: Option<i32> = sqlx::query_scalar("SELECT 1 FROM pg_database WHERE datname = $1")
        .bind(&name)
        .fetch_optional(&mut conn)
        .await?;
    if present.is_none() {
        tracing::info!(database = %name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Create `schema` and the four entity tables with their lookup indexes.
pub async fn ensure_tables(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", schema))
        .execute(pool)
        .await?;
    for ddl in table_ddl(schema) {
        tracing::debug!(sql = %ddl, "bootstrap");
        sqlx::query(&ddl).execute(pool).await?;
    }
    Ok(())
}

fn table_ddl(schema: &str) -> Vec<String> {
    let customer = format!("{}.{}", schema, Customer::TABLE);
    let pet = format!("{}.{}", schema, Pet::TABLE);
    let product = format!("{}.{}", schema, Product::TABLE);
    let staff = format!("{}.{}", schema, Staff::TABLE);
    vec![
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {customer} (
                id_cliente SERIAL PRIMARY KEY,
                nome VARCHAR(100) NOT NULL,
                cpf VARCHAR(11) NOT NULL,
                telefone VARCHAR(11),
                email VARCHAR(100) NOT NULL,
                endereco VARCHAR(255),
                data_cadastro TIMESTAMP
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {pet} (
                id_pet SERIAL PRIMARY KEY,
                id_cliente INTEGER NOT NULL,
                nome VARCHAR(100) NOT NULL,
                especie VARCHAR(50) NOT NULL,
                raca VARCHAR(50),
                data_nascimento DATE,
                peso DOUBLE PRECISION,
                observacoes TEXT,
                data_cadastro TIMESTAMP
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {product} (
                id_produto SERIAL PRIMARY KEY,
                nome VARCHAR(100) NOT NULL,
                descricao TEXT,
                preco DOUBLE PRECISION NOT NULL,
                estoque INTEGER NOT NULL DEFAULT 0,
                categoria VARCHAR(50),
                ativo BOOLEAN NOT NULL DEFAULT TRUE,
                data_cadastro TIMESTAMP
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {staff} (
                id_funcionario SERIAL PRIMARY KEY,
                nome VARCHAR(100) NOT NULL,
                cpf VARCHAR(11) NOT NULL,
                telefone VARCHAR(11),
                email VARCHAR(100) NOT NULL,
                cargo VARCHAR(20) NOT NULL,
                salario_base DOUBLE PRECISION,
                data_contratacao DATE,
                ativo BOOLEAN NOT NULL DEFAULT TRUE,
                data_cadastro TIMESTAMP
            )
            "#
        ),
        format!("CREATE INDEX IF NOT EXISTS idx_pet_cliente ON {pet} (id_cliente)"),
        format!("CREATE INDEX IF NOT EXISTS idx_produto_categoria ON {product} (categoria)"),
        format!("CREATE INDEX IF NOT EXISTS idx_funcionario_cargo ON {staff} (cargo)"),
    ]
}

/// A connection URL taken apart into the database it names and the URL of
/// the maintenance database on the same server.
#[derive(Debug, PartialEq, Eq)]
struct TargetDatabase {
    admin_url: String,
    name: Option<String>,
}

impl TargetDatabase {
    fn parse(url: &str) -> Result<Self, AppError> {
        let (scheme, rest) = url
            .split_once("://")
            .ok_or_else(|| AppError::BadRequest("DATABASE_URL: expected scheme://host/database".into()))?;
        let (location, query) = match rest.split_once('?') {
            Some((location, query)) => (location, Some(query)),
            None => (rest, None),
        };
        let (authority, path) = location.split_once('/').unwrap_or((location, ""));
        let name = path.trim().trim_end_matches('/');
        let mut admin_url = format!("{}://{}/postgres", scheme, authority);
        if let Some(query) = query {
            admin_url.push('?');
            admin_url.push_str(query);
        }
        Ok(Self {
            admin_url,
            name: (!name.is_empty()).then(|| name.to_string()),
        })
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_database_with_path_and_query() {
        let target = TargetDatabase::parse("postgres://u:p@localhost:5432/petshop?sslmode=disable").unwrap();
        assert_eq!(target.admin_url, "postgres://u:p@localhost:5432/postgres?sslmode=disable");
        assert_eq!(target.name.as_deref(), Some("petshop"));
    }

    #[test]
    fn test_target_database_without_path() {
        for url in ["postgres://localhost", "postgres://u@db:5432/", "postgresql://db?sslmode=require"] {
            let target = TargetDatabase::parse(url).unwrap();
            assert_eq!(target.name, None, "{url}");
            assert!(target.admin_url.ends_with("/postgres") || target.admin_url.contains("/postgres?"));
        }
        assert!(TargetDatabase::parse("petshop").is_err());
    }

    #[test]
    fn test_quote_ident_doubles_quotes() {
        assert_eq!(quote_ident("pet\"shop"), "\"pet\"\"shop\"");
    }

    #[test]
    fn test_ddl_is_schema_qualified() {
        let ddl = table_ddl("loja");
        assert_eq!(ddl.len(), 7);
        assert!(ddl.iter().all(|s| s.contains("loja.tb_")));
        assert!(ddl.iter().all(|s| s.contains("IF NOT EXISTS")));
    }
}
