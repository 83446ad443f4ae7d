/// Uploadable mapping tests
///
/// Registration-time validation of upload configurations and the checks a
/// validated policy applies to incoming files.
/// Run with: cargo test --test uploadable_tests

use rustmemodb_lifecycle::uploadable::{
    FILENAME_GENERATOR_ALPHANUMERIC, FILENAME_GENERATOR_SHA256, validate_path,
};
use rustmemodb_lifecycle::{
    ClassMetadata, DataType, EngineConfig, EntityDefinition, FileInfo, FilenameGenerator,
    InMemoryStore, PolicyEngine, PolicyError, TargetFieldRule, UploadConfig, ValidatorConfig,
};
use std::sync::Arc;

fn engine() -> PolicyEngine {
    engine_with(EngineConfig::default())
}

fn engine_with(config: EngineConfig) -> PolicyEngine {
    PolicyEngine::new(Arc::new(InMemoryStore::new()), config)
}

fn file_metadata() -> ClassMetadata {
    ClassMetadata::new("File")
        .field("path", DataType::Text)
        .field("name", DataType::Text)
        .field("mime", DataType::Text)
        .field("size", DataType::Decimal)
        .field("count", DataType::Integer)
        .method("getPath")
        .method("onUpload")
}

fn register(engine: &PolicyEngine, config: UploadConfig) -> rustmemodb_lifecycle::Result<()> {
    engine
        .register(EntityDefinition::new(file_metadata()).uploadable(config))
        .map(|_| ())
}

fn assert_invalid_mapping(result: rustmemodb_lifecycle::Result<()>) {
    match result {
        Err(PolicyError::InvalidMapping(_)) => {}
        other => panic!("expected InvalidMapping, got {:?}", other),
    }
}

#[test]
fn test_validate_field_with_invalid_type() {
    let engine = engine();
    let result = register(&engine, UploadConfig::new().file_path_field("count"));
    match result {
        Err(PolicyError::InvalidMapping(msg)) => {
            assert!(msg.contains("UploadableFilePath"));
            assert!(msg.contains("'string'"));
        }
        other => panic!("expected InvalidMapping, got {:?}", other),
    }
    assert!(!engine.is_registered("File").unwrap());
}

#[test]
fn test_validate_field_size_must_be_decimal() {
    assert_invalid_mapping(register(
        &engine(),
        UploadConfig::new().file_path_field("path").file_size_field("count"),
    ));
    assert!(register(
        &engine(),
        UploadConfig::new().file_path_field("path").file_size_field("size"),
    )
    .is_ok());
}

#[test]
fn test_validate_field_missing_mapping() {
    assert_invalid_mapping(register(
        &engine(),
        UploadConfig::new().file_path_field("path").file_mime_type_field("missing"),
    ));
}

#[test]
fn test_validate_path_with_empty_path() {
    assert!(matches!(validate_path(""), Err(PolicyError::InvalidPath(_))));
}

#[test]
fn test_validate_path_creates_nested_directories() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("uploads").join("nested").join("deeper");
    assert!(!dir.exists());

    validate_path(&dir).unwrap();
    assert!(dir.is_dir());

    // second call on an existing directory is a no-op
    validate_path(&dir).unwrap();
    assert!(dir.is_dir());
}

#[test]
fn test_configured_path_is_created_on_registration() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("files");
    let engine = engine();
    register(
        &engine,
        UploadConfig::new()
            .file_path_field("path")
            .path(dir.to_string_lossy().to_string()),
    )
    .unwrap();

    assert!(dir.is_dir());
    let registration = engine.registration("File").unwrap();
    assert_eq!(registration.upload().unwrap().path(), Some(dir.as_path()));
}

#[test]
fn test_validate_configuration_without_target_fields() {
    let result = register(&engine(), UploadConfig::new());
    match result {
        Err(PolicyError::InvalidMapping(msg)) => assert!(msg.contains("at least one")),
        other => panic!("expected InvalidMapping, got {:?}", other),
    }
}

#[test]
fn test_validate_configuration_with_both_target_fields() {
    let config = UploadConfig::new().file_path_field("path").file_name_field("name");
    assert!(register(&engine(), config.clone()).is_ok());

    let strict = engine_with(
        EngineConfig::new()
            .validator(ValidatorConfig::default().target_field_rule(TargetFieldRule::ExactlyOne)),
    );
    assert_invalid_mapping(register(&strict, config));
}

#[test]
fn test_validate_configuration_with_invalid_path_method() {
    assert_invalid_mapping(register(
        &engine(),
        UploadConfig::new().file_path_field("path").path_method("invalidMethod"),
    ));
}

#[test]
fn test_validate_configuration_with_invalid_callback() {
    assert_invalid_mapping(register(
        &engine(),
        UploadConfig::new().file_path_field("path").callback("invalidMethod"),
    ));
}

#[test]
fn test_validate_configuration_with_declared_methods() {
    let engine = engine();
    register(
        &engine,
        UploadConfig::new()
            .file_path_field("path")
            .path_method("getPath")
            .callback("onUpload"),
    )
    .unwrap();

    let policy = engine.registration("File").unwrap().upload().unwrap().clone();
    assert_eq!(policy.path_method(), Some("getPath"));
    assert_eq!(policy.callback(), Some("onUpload"));
}

#[test]
fn test_validate_configuration_with_invalid_filename_generator() {
    assert_invalid_mapping(register(
        &engine(),
        UploadConfig::new().file_path_field("path").filename_generator("invalidClass"),
    ));
}

#[test]
fn test_validate_configuration_with_type_lacking_generator_capability() {
    let engine = engine();
    engine
        .register(EntityDefinition::new(
            ClassMetadata::new("Image").field("name", DataType::Text),
        ))
        .unwrap();

    let result = register(
        &engine,
        UploadConfig::new().file_path_field("path").filename_generator("Image"),
    );
    match result {
        Err(PolicyError::InvalidMapping(msg)) => assert!(msg.contains("FilenameGenerator")),
        other => panic!("expected InvalidMapping, got {:?}", other),
    }
}

#[test]
fn test_validate_configuration_with_builtin_generator() {
    let engine = engine();
    register(
        &engine,
        UploadConfig::new()
            .file_path_field("path")
            .filename_generator(FILENAME_GENERATOR_SHA256),
    )
    .unwrap();

    let policy = engine.registration("File").unwrap().upload().unwrap().clone();
    assert_eq!(policy.filename_generator_name(), FILENAME_GENERATOR_SHA256);
    let name = policy.generate_file_name("report.pdf");
    assert_eq!(name.len(), 64 + ".pdf".len());
    assert!(name.ends_with(".pdf"));
}

struct StaticGenerator;

impl FilenameGenerator for StaticGenerator {
    fn generate(&self, _raw: &str) -> String {
        "fixed.bin".to_string()
    }
}

#[test]
fn test_validate_configuration_with_custom_generator() {
    let engine = engine();
    engine
        .register_filename_generator("static", Arc::new(StaticGenerator))
        .unwrap();
    register(
        &engine,
        UploadConfig::new().file_path_field("path").filename_generator("static"),
    )
    .unwrap();

    let policy = engine.registration("File").unwrap().upload().unwrap().clone();
    assert_eq!(policy.generate_file_name("anything.txt"), "fixed.bin");
}

#[test]
fn test_builtin_generator_names_cannot_be_replaced() {
    let engine = engine();
    let result = engine.register_filename_generator(FILENAME_GENERATOR_ALPHANUMERIC, Arc::new(StaticGenerator));
    assert!(matches!(result, Err(PolicyError::Config(_))));
}

#[test]
fn test_validate_configuration_with_negative_max_size() {
    assert_invalid_mapping(register(
        &engine(),
        UploadConfig::new().file_path_field("path").max_size(-1.0),
    ));
}

#[test]
fn test_validate_configuration_with_nan_max_size() {
    let engine = engine();
    assert_invalid_mapping(register(
        &engine,
        UploadConfig::new().file_path_field("path").max_size(f64::NAN),
    ));
    assert!(!engine.is_registered("File").unwrap());
}

#[test]
fn test_validate_configuration_with_allowed_and_disallowed_types() {
    let config = UploadConfig::new()
        .file_path_field("path")
        .allowed_types("text/plain,text/css")
        .disallowed_types("video/jpeg");
    assert_invalid_mapping(register(&engine(), config.clone()));

    let relaxed = engine_with(
        EngineConfig::new()
            .validator(ValidatorConfig::default().enforce_mime_type_exclusivity(false)),
    );
    assert!(register(&relaxed, config).is_ok());
}

#[test]
fn test_rejection_names_first_failing_rule() {
    // negative max size and a bad generator: the generator rule comes first
    let result = register(
        &engine(),
        UploadConfig::new()
            .file_path_field("path")
            .filename_generator("invalidClass")
            .max_size(-1.0),
    );
    match result {
        Err(PolicyError::InvalidMapping(msg)) => assert!(msg.contains("invalidClass")),
        other => panic!("expected InvalidMapping, got {:?}", other),
    }
}

#[test]
fn test_check_upload_limits() {
    let engine = engine();
    register(
        &engine,
        UploadConfig::new()
            .file_path_field("path")
            .max_size(100.0)
            .allowed_types("text/plain, text/css"),
    )
    .unwrap();
    let policy = engine.registration("File").unwrap().upload().unwrap().clone();

    assert!(policy.check_upload(&FileInfo::new("a.txt", 10).mime_type("text/plain")).is_ok());
    assert!(policy.check_upload(&FileInfo::new("a.css", 100).mime_type("text/css")).is_ok());
    assert!(matches!(
        policy.check_upload(&FileInfo::new("a.txt", 101).mime_type("text/plain")),
        Err(PolicyError::MaxSizeExceeded { size: 101, .. })
    ));
    assert!(matches!(
        policy.check_upload(&FileInfo::new("a.png", 10).mime_type("image/png")),
        Err(PolicyError::InvalidMimeType(_))
    ));
}

#[test]
fn test_upload_config_from_json() {
    let config = UploadConfig::from_json(
        r#"{"filePathField": "path", "filenameGenerator": "ALPHANUMERIC", "maxSize": 2048.0}"#,
    )
    .unwrap();

    let engine = engine();
    register(&engine, config).unwrap();
    let policy = engine.registration("File").unwrap().upload().unwrap().clone();
    assert_eq!(policy.max_size(), 2048.0);
    assert_eq!(policy.generate_file_name("My Report.PDF"), "my-report.PDF");
}
