//! Entity CRUD over any record store: decode, validate, persist, encode.

use crate::codec::{decode, FlatMap, ToFlatJson};
use crate::error::{AppError, NotFoundError, ValidationError};
use crate::model::{Customer, Pet, Product, Record, Staff};
use crate::response::ApiResponse;
use crate::store::RecordStore;

/// An entity that can arrive in a request body.
pub trait Payload: Record + ToFlatJson {
    fn parse(fields: &FlatMap) -> Result<Self, ValidationError>;

    /// Take the key from the request path, overriding any in the body.
    fn assign_id(&mut self, id: i32) -> Result<(), ValidationError>;
}

impl Payload for Customer {
    fn parse(fields: &FlatMap) -> Result<Self, ValidationError> {
        Customer::parse_validated(fields)
    }

    fn assign_id(&mut self, id: i32) -> Result<(), ValidationError> {
        self.set_id(Some(id))
    }
}

impl Payload for Pet {
    fn parse(fields: &FlatMap) -> Result<Self, ValidationError> {
        Pet::parse_validated(fields)
    }

    fn assign_id(&mut self, id: i32) -> Result<(), ValidationError> {
        self.set_id(Some(id))
    }
}

impl Payload for Product {
    fn parse(fields: &FlatMap) -> Result<Self, ValidationError> {
        Product::parse_validated(fields)
    }

    fn assign_id(&mut self, id: i32) -> Result<(), ValidationError> {
        self.set_id(Some(id))
    }
}

impl Payload for Staff {
    fn parse(fields: &FlatMap) -> Result<Self, ValidationError> {
        Staff::parse_validated(fields)
    }

    fn assign_id(&mut self, id: i32) -> Result<(), ValidationError> {
        self.profile_mut().set_id(Some(id))
    }
}

/// Decode a request body and build a validated entity from it.
pub fn decode_payload<T: Payload>(body: &str) -> Result<T, AppError> {
    let fields = decode(body)?;
    Ok(T::parse(&fields)?)
}

pub async fn list<T, S>(store: &S) -> Result<ApiResponse, AppError>
where
    T: Payload,
    S: RecordStore<T> + ?Sized,
{
    let records = store.list_all().await?;
    Ok(ApiResponse::many(&records))
}

pub async fn read<T, S>(store: &S, id: i32) -> Result<ApiResponse, AppError>
where
    T: Payload,
    S: RecordStore<T> + ?Sized,
{
    let record = store.find_by_id(id).await?;
    Ok(ApiResponse::one(&record))
}

pub async fn create<T, S>(store: &S, record: &T) -> Result<ApiResponse, AppError>
where
    T: Payload,
    S: RecordStore<T> + ?Sized,
{
    let stored = store.insert(record).await?;
    tracing::info!(entity = T::ENTITY, id = ?stored.id(), "created");
    Ok(ApiResponse::created(&stored))
}

pub async fn update<T, S>(store: &S, id: i32, mut record: T) -> Result<ApiResponse, AppError>
where
    T: Payload,
    S: RecordStore<T> + ?Sized,
{
    record.assign_id(id)?;
    let stored = store.update(&record).await?;
    tracing::info!(entity = T::ENTITY, id, "updated");
    Ok(ApiResponse::one(&stored))
}

pub async fn delete<T, S>(store: &S, id: i32) -> Result<ApiResponse, AppError>
where
    T: Payload,
    S: RecordStore<T> + ?Sized,
{
    if !store.delete(id).await? {
        return Err(NotFoundError { entity: T::ENTITY, id }.into());
    }
    tracing::info!(entity = T::ENTITY, id, "deleted");
    Ok(ApiResponse::message(&format!("{} {} deleted", T::ENTITY, id)))
}
