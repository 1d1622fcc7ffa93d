//! Record traits shared by every persisted type

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Store-assigned record identifier
pub type RecordId = i64;

/// Id carried by a record the store has not persisted yet
pub const UNASSIGNED: RecordId = 0;

/// Base trait for every persisted record.
///
/// Ids are assigned by the store on insert; whatever id a caller puts on a
/// record before `create` is ignored.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// The plural resource name used in routes and table names (e.g. "jobs")
    fn resource_name() -> &'static str;

    /// The singular resource name used in error messages (e.g. "job")
    fn resource_name_singular() -> &'static str;

    fn id(&self) -> RecordId;

    fn set_id(&mut self, id: RecordId);
}

/// A record owned by a parent job through a foreign key.
///
/// Children never hold a reference back to the parent object, only its id,
/// and are loaded explicitly with "children of parent id" queries.
pub trait ChildRecord: Entity + validator::Validate {
    fn parent_id(&self) -> RecordId;

    fn set_parent_id(&mut self, parent_id: RecordId);

    /// Detach from any client-supplied identity and attach to `parent_id`
    fn adopt(mut self, parent_id: RecordId) -> Self {
        self.set_id(UNASSIGNED);
        self.set_parent_id(parent_id);
        self
    }
}

/// Implement [`Entity`] for a record with an `id: RecordId` field
///
/// # Example
/// ```rust,ignore
/// impl_entity!(Customer, "customers", "customer");
/// ```
#[macro_export]
macro_rules! impl_entity {
    ($type:ident, $plural:literal, $singular:literal) => {
        impl $crate::core::entity::Entity for $type {
            fn resource_name() -> &'static str {
                $plural
            }

            fn resource_name_singular() -> &'static str {
                $singular
            }

            fn id(&self) -> $crate::core::entity::RecordId {
                self.id
            }

            fn set_id(&mut self, id: $crate::core::entity::RecordId) {
                self.id = id;
            }
        }
    };
}

/// Implement [`ChildRecord`] for a record whose parent key is `$parent_field`
#[macro_export]
macro_rules! impl_child_record {
    ($type:ident, $parent_field:ident) => {
        impl $crate::core::entity::ChildRecord for $type {
            fn parent_id(&self) -> $crate::core::entity::RecordId {
                self.$parent_field
            }

            fn set_parent_id(&mut self, parent_id: $crate::core::entity::RecordId) {
                self.$parent_field = parent_id;
            }
        }
    };
}
