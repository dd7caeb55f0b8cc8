//! API client for the pet-care REST service.
//!
//! `PetApi` is the seam between the cache and the HTTP collaborator:
//! `ApiClient` implements it over reqwest, tests implement it with
//! counting stubs.

mod client;
mod error;

pub use client::ApiClient;
pub use error::ApiError;

use std::future::Future;

use crate::models::{CareEvent, NewCare, NewPet, Pet};

/// The remote operations the service exposes. One HTTP call each, no
/// retries.
pub trait PetApi: Send + Sync {
    fn list_pets(
        &self,
        limit: u32,
        offset: u32,
    ) -> impl Future<Output = Result<Vec<Pet>, ApiError>> + Send;

    fn create_pet(&self, pet: &NewPet) -> impl Future<Output = Result<Pet, ApiError>> + Send;

    fn delete_pet(&self, id: i64) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn list_cares(
        &self,
        pet_id: i64,
    ) -> impl Future<Output = Result<Vec<CareEvent>, ApiError>> + Send;

    fn create_care(
        &self,
        pet_id: i64,
        care: &NewCare,
    ) -> impl Future<Output = Result<CareEvent, ApiError>> + Send;

    fn delete_care(&self, id: i64) -> impl Future<Output = Result<(), ApiError>> + Send;
}
