// ============================================================================
// RustMemDB Lifecycle Policies
// ============================================================================

//! Lifecycle policies for persisted entities.
//!
//! Two behaviours are provided on top of any [`EntityStore`]:
//!
//! - **Soft delete**: deleting an entity whose type carries a
//!   [`SoftDeletePolicy`] writes a deletion timestamp instead of removing the
//!   record, emits `preSoftDelete` / `postSoftDelete` events, and the
//!   per-session [`VisibilityFilter`] hides such records from reads.
//! - **Uploadable**: an [`UploadConfig`] declared for an entity type is
//!   validated into an [`UploadPolicy`] when the type is registered.
//!
//! Policies are validated once, at [`PolicyEngine::register`], and a type with
//! an invalid policy never becomes usable.

pub mod config;
pub mod core;
pub mod engine;
pub mod events;
pub mod metadata;
pub mod session;
pub mod soft_delete;
pub mod storage;
pub mod uploadable;

pub use config::{EngineConfig, TargetFieldRule, ValidatorConfig};
pub use self::core::{
    Clock, Condition, Criteria, DataType, ManualClock, PolicyError, Record, Result, SystemClock,
    Value,
};
pub use engine::{EntityDefinition, EntityRegistration, PolicyEngine};
pub use events::{EventBus, EventSubscriber, LifecycleEvent, LifecycleEventKind, SoftDeleteEventArgs};
pub use metadata::{ClassMetadata, EntityMetadata, FieldMapping};
pub use session::Session;
pub use soft_delete::{
    DeleteOutcome, LifecycleGovernor, SoftDeleteConfig, SoftDeletePolicy, VisibilityFilter,
};
pub use storage::{EntityStore, InMemoryStore};
pub use uploadable::{
    FileInfo, FilenameGenerator, FilenameGeneratorRegistry, UploadConfig, UploadPolicy,
    UploadableField, Validator,
};
