//! HTTP handlers, one module per resource

pub mod attendance;
pub mod auth;
pub mod customers;
pub mod data;
pub mod expenses;
pub mod jobs;
pub mod materials;
pub mod personnel;

use crate::core::entity::{Entity, RecordId};
use crate::core::error::{CrewResult, EntityError, ValidationError};
use crate::core::service::DataService;

/// Load a record addressed by the route, 404 when absent
pub(crate) async fn require<T, S>(service: &S, id: RecordId) -> CrewResult<T>
where
    T: Entity,
    S: DataService<T> + ?Sized,
{
    service
        .get(id)
        .await?
        .ok_or_else(|| EntityError::not_found(T::resource_name_singular(), id).into())
}

/// Check a foreign key carried in a request body, 400 when dangling
pub(crate) async fn require_reference<T, S>(service: &S, id: RecordId, field: &str) -> CrewResult<()>
where
    T: Entity,
    S: DataService<T> + ?Sized,
{
    match service.get(id).await? {
        Some(_) => Ok(()),
        None => Err(ValidationError::field(
            field,
            format!("does not reference an existing {}", T::resource_name_singular()),
        )
        .into()),
    }
}
