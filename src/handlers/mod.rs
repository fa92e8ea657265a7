//! Resource handler: maps a request's method and path onto a store operation.
//!
//! Routes live under `/api`: `clientes`, `pets`, `produtos`, `funcionarios`,
//! each with `/{id}`, plus the lookups `pets/cliente/{id}`,
//! `funcionarios/cargo/{cargo}` and `produtos/categoria/{categoria}`.
//! Lookup values in the path are percent-decoded before matching.

pub mod entity;

use crate::error::{AppError, ValidationError};
use crate::model::{Customer, Pet, Product, Role, Staff};
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::http::Method;
use entity::decode_payload;
use percent_encoding::percent_decode_str;
use std::borrow::Cow;

pub const API_PREFIX: &str = "/api";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Customers,
    Pets,
    Products,
    Staff,
}

impl Resource {
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "clientes" => Some(Resource::Customers),
            "pets" => Some(Resource::Pets),
            "produtos" => Some(Resource::Products),
            "funcionarios" => Some(Resource::Staff),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target<'a> {
    Collection,
    Item(i32),
    ByCustomer(i32),
    ByRole(Cow<'a, str>),
    ByCategory(Cow<'a, str>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Get,
    Post,
    Put,
    Delete,
    Options,
    Other,
}

impl From<&Method> for Verb {
    fn from(method: &Method) -> Self {
        if method == Method::GET {
            Verb::Get
        } else if method == Method::POST {
            Verb::Post
        } else if method == Method::PUT {
            Verb::Put
        } else if method == Method::DELETE {
            Verb::Delete
        } else if method == Method::OPTIONS {
            Verb::Options
        } else {
            Verb::Other
        }
    }
}

fn parse_id(raw: &str) -> Result<i32, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("invalid id '{}'", raw)))
}

fn decode_segment(raw: &str) -> Result<Cow<'_, str>, AppError> {
    percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| AppError::BadRequest(format!("path segment '{}' is not valid UTF-8", raw)))
}

/// Split an `/api/...` path into its resource and target.
pub fn parse_route(path: &str) -> Result<(Resource, Target<'_>), AppError> {
    let unknown = || AppError::UnknownRoute(path.to_string());
    let rest = path
        .strip_prefix(API_PREFIX)
        .and_then(|r| r.strip_prefix('/'))
        .ok_or_else(unknown)?;
    let segments: Vec<&str> = rest.trim_end_matches('/').split('/').collect();
    let resource = segments
        .first()
        .and_then(|s| Resource::from_segment(s))
        .ok_or_else(unknown)?;
    let target = match (resource, &segments[1..]) {
        (_, []) => Target::Collection,
        (_, [id]) => Target::Item(parse_id(id)?),
        (Resource::Pets, ["cliente", id]) => Target::ByCustomer(parse_id(id)?),
        (Resource::Staff, ["cargo", role]) => Target::ByRole(decode_segment(*role)?),
        (Resource::Products, ["categoria", category]) => Target::ByCategory(decode_segment(*category)?),
        _ => return Err(unknown()),
    };
    Ok((resource, target))
}

/// Handle one request. Never fails: errors become error responses.
pub async fn dispatch(state: &AppState, method: &Method, path: &str, body: &str) -> ApiResponse {
    let verb = Verb::from(method);
    if verb == Verb::Options {
        return ApiResponse::preflight();
    }
    tracing::debug!(%method, path, "dispatch");
    match route(state, method, verb, path, body).await {
        Ok(response) => response,
        Err(err) => ApiResponse::from_error(&err),
    }
}

async fn route(state: &AppState, method: &Method, verb: Verb, path: &str, body: &str) -> Result<ApiResponse, AppError> {
    let (resource, target) = parse_route(path)?;
    let not_allowed = || AppError::MethodNotAllowed(method.clone());
    match (verb, target) {
        (Verb::Get, Target::Collection) => match resource {
            Resource::Customers => entity::list::<Customer, _>(state.customers.as_ref()).await,
            Resource::Pets => entity::list::<Pet, _>(state.pets.as_ref()).await,
            Resource::Products => entity::list::<Product, _>(state.products.as_ref()).await,
            Resource::Staff => entity::list::<Staff, _>(state.staff.as_ref()).await,
        },
        (Verb::Get, Target::Item(id)) => match resource {
            Resource::Customers => entity::read::<Customer, _>(state.customers.as_ref(), id).await,
            Resource::Pets => entity::read::<Pet, _>(state.pets.as_ref(), id).await,
            Resource::Products => entity::read::<Product, _>(state.products.as_ref(), id).await,
            Resource::Staff => entity::read::<Staff, _>(state.staff.as_ref(), id).await,
        },
        (Verb::Get, Target::ByCustomer(customer_id)) => {
            let pets = state.pets.find_by_customer(customer_id).await?;
            Ok(ApiResponse::many(&pets))
        }
        (Verb::Get, Target::ByRole(tag)) => {
            let role = Role::from_tag(&tag)
                .ok_or_else(|| ValidationError::new("cargo", format!("unknown role '{}'", tag)))?;
            let staff = state.staff.find_by_role(role).await?;
            Ok(ApiResponse::many(&staff))
        }
        (Verb::Get, Target::ByCategory(category)) => {
            let products = state.products.find_by_category(&category).await?;
            Ok(ApiResponse::many(&products))
        }
        (Verb::Post, Target::Collection) => match resource {
            Resource::Customers => {
                let customer: Customer = decode_payload(body)?;
                entity::create(state.customers.as_ref(), &customer).await
            }
            Resource::Pets => {
                let pet: Pet = decode_payload(body)?;
                ensure_owner_exists(state, &pet).await?;
                entity::create(state.pets.as_ref(), &pet).await
            }
            Resource::Products => {
                let product: Product = decode_payload(body)?;
                entity::create(state.products.as_ref(), &product).await
            }
            Resource::Staff => {
                let staff: Staff = decode_payload(body)?;
                entity::create(state.staff.as_ref(), &staff).await
            }
        },
        (Verb::Put, Target::Item(id)) => match resource {
            Resource::Customers => {
                let customer: Customer = decode_payload(body)?;
                entity::update(state.customers.as_ref(), id, customer).await
            }
            Resource::Pets => {
                let pet: Pet = decode_payload(body)?;
                ensure_owner_exists(state, &pet).await?;
                entity::update(state.pets.as_ref(), id, pet).await
            }
            Resource::Products => {
                let product: Product = decode_payload(body)?;
                entity::update(state.products.as_ref(), id, product).await
            }
            Resource::Staff => {
                let staff: Staff = decode_payload(body)?;
                entity::update(state.staff.as_ref(), id, staff).await
            }
        },
        (Verb::Delete, Target::Item(id)) => match resource {
            Resource::Customers => {
                let response = entity::delete::<Customer, _>(state.customers.as_ref(), id).await?;
                warn_orphaned_pets(state, id).await;
                Ok(response)
            }
            Resource::Pets => entity::delete::<Pet, _>(state.pets.as_ref(), id).await,
            Resource::Products => entity::delete::<Product, _>(state.products.as_ref(), id).await,
            Resource::Staff => entity::delete::<Staff, _>(state.staff.as_ref(), id).await,
        },
        _ => Err(not_allowed()),
    }
}

/// A pet's owner must be a stored customer.
async fn ensure_owner_exists(state: &AppState, pet: &Pet) -> Result<(), AppError> {
    match state.customers.find_by_id(pet.owner_id()).await {
        Ok(_) => Ok(()),
        Err(AppError::NotFound(_)) => Err(ValidationError::new(
            "idCliente",
            format!("customer {} does not exist", pet.owner_id()),
        )
        .into()),
        Err(e) => Err(e),
    }
}

/// Deleting a customer leaves their pets in place.
async fn warn_orphaned_pets(state: &AppState, customer_id: i32) {
    match state.pets.find_by_customer(customer_id).await {
        Ok(pets) if !pets.is_empty() => {
            tracing::warn!(customer_id, orphaned = pets.len(), "deleted customer still has pets");
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(customer_id, error = %e, "could not check for orphaned pets"),
    }
}
