// ============================================================================
// Policy Engine
// ============================================================================

use crate::config::EngineConfig;
use crate::core::{PolicyError, Result};
use crate::events::{EventBus, EventSubscriber};
use crate::metadata::EntityMetadata;
use crate::session::Session;
use crate::soft_delete::{LifecycleGovernor, SoftDeleteConfig, SoftDeletePolicy};
use crate::storage::EntityStore;
use crate::uploadable::{FilenameGenerator, FilenameGeneratorRegistry, UploadConfig, UploadPolicy, Validator};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// An entity type offered for registration, with its raw policy configuration.
pub struct EntityDefinition {
    metadata: Arc<dyn EntityMetadata>,
    soft_delete: Option<SoftDeleteConfig>,
    upload: Option<UploadConfig>,
}

impl EntityDefinition {
    pub fn new(metadata: impl EntityMetadata + 'static) -> Self {
        Self {
            metadata: Arc::new(metadata),
            soft_delete: None,
            upload: None,
        }
    }

    pub fn soft_delete(mut self, config: SoftDeleteConfig) -> Self {
        self.soft_delete = Some(config);
        self
    }

    pub fn uploadable(mut self, config: UploadConfig) -> Self {
        self.upload = Some(config);
        self
    }
}

/// A registered entity type and its validated policies.
pub struct EntityRegistration {
    metadata: Arc<dyn EntityMetadata>,
    soft_delete: Option<Arc<SoftDeletePolicy>>,
    upload: Option<Arc<UploadPolicy>>,
}

impl EntityRegistration {
    pub fn entity_type(&self) -> &str {
        self.metadata.entity_type()
    }

    pub fn metadata(&self) -> &dyn EntityMetadata {
        self.metadata.as_ref()
    }

    pub fn soft_delete(&self) -> Option<&Arc<SoftDeletePolicy>> {
        self.soft_delete.as_ref()
    }

    pub fn upload(&self) -> Option<&Arc<UploadPolicy>> {
        self.upload.as_ref()
    }
}

pub(crate) struct EngineInner {
    pub(crate) config: EngineConfig,
    pub(crate) store: Arc<dyn EntityStore>,
    pub(crate) bus: Arc<EventBus>,
    pub(crate) governor: LifecycleGovernor,
    validator: Validator,
    generators: RwLock<FilenameGeneratorRegistry>,
    registrations: RwLock<HashMap<String, Arc<EntityRegistration>>>,
}

impl EngineInner {
    pub(crate) fn soft_delete_policy(&self, entity_type: &str) -> Result<Option<Arc<SoftDeletePolicy>>> {
        let registrations = self.registrations.read()?;
        Ok(registrations
            .get(entity_type)
            .and_then(|r| r.soft_delete.clone()))
    }
}

/// Entry point: registers entity types and opens sessions.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use rustmemodb_lifecycle::{
///     ClassMetadata, Criteria, DataType, EngineConfig, EntityDefinition, InMemoryStore,
///     PolicyEngine, Record, SoftDeleteConfig,
/// };
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = PolicyEngine::new(Arc::new(InMemoryStore::new()), EngineConfig::default());
/// engine.register(
///     EntityDefinition::new(
///         ClassMetadata::new("User")
///             .field("username", DataType::Text)
///             .field("deletedAt", DataType::DateTime),
///     )
///     .soft_delete(SoftDeleteConfig::new("deletedAt")),
/// )?;
///
/// let session = engine.session();
/// let mut user = Record::new("User").field("username", "alice");
/// session.persist(&user).await?;
/// session.remove(&mut user).await?;
///
/// let found = session.find_one_by("User", Criteria::new().eq("username", "alice")).await?;
/// assert!(found.is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PolicyEngine {
    inner: Arc<EngineInner>,
}

impl PolicyEngine {
    /// Deletion stamps and time-aware visibility both use `store.now()`.
    pub fn new(store: Arc<dyn EntityStore>, config: EngineConfig) -> Self {
        let bus = Arc::new(EventBus::new());
        let inner = EngineInner {
            validator: Validator::new(config.validator.clone()),
            governor: LifecycleGovernor::new(bus.clone()),
            config,
            store,
            bus,
            generators: RwLock::new(FilenameGeneratorRegistry::new()),
            registrations: RwLock::new(HashMap::new()),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.inner.store
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.inner.bus
    }

    pub fn subscribe(&self, subscriber: Arc<dyn EventSubscriber>) -> Result<()> {
        self.inner.bus.subscribe(subscriber)
    }

    /// Makes a custom strategy available to upload policies registered afterwards.
    pub fn register_filename_generator(
        &self,
        name: impl Into<String>,
        generator: Arc<dyn FilenameGenerator>,
    ) -> Result<()> {
        let mut generators = self.inner.generators.write()?;
        generators.register(name, generator)
    }

    /// Validates the definition's policies and registers the entity type.
    ///
    /// Fails fast: on any error the entity type stays unregistered.
    pub fn register(&self, definition: EntityDefinition) -> Result<Arc<EntityRegistration>> {
        let entity_type = definition.metadata.entity_type().to_string();
        if self.inner.registrations.read()?.contains_key(&entity_type) {
            return Err(PolicyError::EntityTypeExists(entity_type));
        }

        let registration = self.build_registration(definition).inspect_err(|err| {
            warn!(entity_type = %entity_type, error = %err, "entity type rejected");
        })?;
        let registration = Arc::new(registration);

        {
            let mut registrations = self.inner.registrations.write()?;
            if registrations.contains_key(&entity_type) {
                return Err(PolicyError::EntityTypeExists(entity_type));
            }
            registrations.insert(entity_type.clone(), registration.clone());
        }
        self.inner.generators.write()?.declare_type(entity_type.clone());

        info!(
            entity_type = %entity_type,
            soft_delete = registration.soft_delete.is_some(),
            uploadable = registration.upload.is_some(),
            "entity type registered"
        );
        Ok(registration)
    }

    fn build_registration(&self, definition: EntityDefinition) -> Result<EntityRegistration> {
        let metadata = definition.metadata;

        let soft_delete = match &definition.soft_delete {
            Some(config) => Some(Arc::new(
                config.validate(metadata.as_ref(), self.inner.config.time_aware_filtering)?,
            )),
            None => None,
        };

        let upload = match &definition.upload {
            Some(config) => {
                let generators = self.inner.generators.read()?;
                Some(Arc::new(self.inner.validator.validate_configuration(
                    metadata.as_ref(),
                    config,
                    &generators,
                )?))
            }
            None => None,
        };

        Ok(EntityRegistration {
            metadata,
            soft_delete,
            upload,
        })
    }

    pub fn registration(&self, entity_type: &str) -> Result<Arc<EntityRegistration>> {
        self.inner
            .registrations
            .read()?
            .get(entity_type)
            .cloned()
            .ok_or_else(|| PolicyError::EntityTypeNotRegistered(entity_type.to_string()))
    }

    pub fn is_registered(&self, entity_type: &str) -> Result<bool> {
        Ok(self.inner.registrations.read()?.contains_key(entity_type))
    }

    /// Opens a unit of work with a fresh visibility filter.
    pub fn session(&self) -> Session {
        Session::new(self.inner.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DataType;
    use crate::metadata::ClassMetadata;
    use crate::storage::InMemoryStore;

    fn engine(config: EngineConfig) -> PolicyEngine {
        PolicyEngine::new(Arc::new(InMemoryStore::new()), config)
    }

    fn user() -> ClassMetadata {
        ClassMetadata::new("User")
            .field("username", DataType::Text)
            .field("deletedAt", DataType::DateTime)
    }

    #[test]
    fn test_register_and_lookup() {
        let engine = engine(EngineConfig::default());
        engine
            .register(EntityDefinition::new(user()).soft_delete(SoftDeleteConfig::new("deletedAt")))
            .unwrap();

        let registration = engine.registration("User").unwrap();
        assert_eq!(registration.entity_type(), "User");
        assert_eq!(registration.soft_delete().unwrap().field(), "deletedAt");
        assert!(registration.upload().is_none());
        assert!(registration.metadata().field_mapping("username").is_ok());
    }

    #[test]
    fn test_duplicate_registration() {
        let engine = engine(EngineConfig::default());
        engine.register(EntityDefinition::new(user())).unwrap();
        assert!(matches!(
            engine.register(EntityDefinition::new(user())),
            Err(PolicyError::EntityTypeExists(_))
        ));
    }

    #[test]
    fn test_invalid_policy_leaves_type_unregistered() {
        let engine = engine(EngineConfig::default());
        let result = engine.register(
            EntityDefinition::new(user()).soft_delete(SoftDeleteConfig::new("username")),
        );
        assert!(matches!(result, Err(PolicyError::InvalidMapping(_))));
        assert!(!engine.is_registered("User").unwrap());
        assert!(matches!(
            engine.registration("User"),
            Err(PolicyError::EntityTypeNotRegistered(_))
        ));
    }

    #[test]
    fn test_time_aware_capability() {
        let engine = engine(EngineConfig::default().time_aware_filtering(false));
        let result = engine.register(
            EntityDefinition::new(user())
                .soft_delete(SoftDeleteConfig::new("deletedAt").time_aware(true)),
        );
        assert!(matches!(result, Err(PolicyError::InvalidMapping(_))));
    }

    #[test]
    fn test_registered_type_is_not_a_filename_generator() {
        let engine = engine(EngineConfig::default());
        engine.register(EntityDefinition::new(user())).unwrap();

        let file = ClassMetadata::new("File").field("path", DataType::Text);
        let result = engine.register(
            EntityDefinition::new(file)
                .uploadable(UploadConfig::new().file_path_field("path").filename_generator("User")),
        );
        match result {
            Err(PolicyError::InvalidMapping(msg)) => assert!(msg.contains("FilenameGenerator")),
            _ => panic!("expected missing capability error"),
        }
    }
}
