use next_store::{Record, Store, StoreOptions, Version, error::Error};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::{fs, io, path::Path};
use tempfile::TempDir;

/// Helper to create a temporary directory for tests
fn temp_store_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[serde(default)]
struct User {
    version: Version<1>,
    name: String,
    age: u32,
}

impl Default for User {
    fn default() -> Self {
        Self {
            version: Version,
            name: "Adnan".to_string(),
            age: 30,
        }
    }
}

/// A record without schema defaults for `id`.
#[derive(Debug, Serialize, Deserialize, Record)]
struct Strict {
    #[serde(default)]
    version: Version<1>,
    id: u64,
}

fn options(dir: &Path) -> StoreOptions {
    StoreOptions::builder()
        .name("user")
        .path(dir)
        .build()
        .expect("Failed to build options")
}

fn read_json(path: &Path) -> Value {
    let raw = fs::read_to_string(path).expect("Failed to read store file");
    serde_json::from_str(&raw).expect("Store file is not JSON")
}

#[test]
fn test_open_creates_file_and_parent_directories() {
    let temp_dir = temp_store_dir();
    let nested = temp_dir.path().join("a").join("b");

    let store = Store::<User>::open(options(&nested)).expect("Failed to open store");

    let file = nested.join("user.json");
    assert!(file.exists(), "Store file should be created on open");
    assert_eq!(store.path(), file);
    assert_eq!(
        read_json(&file),
        json!({ "version": 1, "name": "Adnan", "age": 30 })
    );
}

#[test]
fn test_file_is_pretty_printed() {
    let temp_dir = temp_store_dir();
    let store = Store::<User>::open(options(temp_dir.path())).expect("Failed to open store");

    let raw = fs::read_to_string(store.path()).unwrap();
    assert_eq!(
        raw,
        "{\n  \"version\": 1,\n  \"name\": \"Adnan\",\n  \"age\": 30\n}"
    );
}

#[test]
fn test_caller_defaults_override_schema_defaults() {
    let temp_dir = temp_store_dir();
    let options = StoreOptions::builder()
        .name("user")
        .path(temp_dir.path())
        .defaults(json!({ "name": "John Doe" }))
        .build()
        .unwrap();

    let store = Store::<User>::open(options).expect("Failed to open store");

    let expected = json!({ "version": 1, "name": "John Doe", "age": 30 });
    assert_eq!(Value::Object(store.store()), expected);
    assert_eq!(Value::Object(store.defaults().clone()), expected);
    assert_eq!(read_json(store.path()), expected);
}

#[test]
fn test_defaults_must_be_an_object() {
    let temp_dir = temp_store_dir();
    let options = StoreOptions::builder()
        .name("user")
        .path(temp_dir.path())
        .defaults(json!(["not", "an", "object"]))
        .build()
        .unwrap();

    let result = Store::<User>::open(options);
    assert!(matches!(result, Err(Error::InvalidDefaults)));
}

#[test]
fn test_schema_without_defaults_fails_to_initialize() {
    let temp_dir = temp_store_dir();
    let result = Store::<Strict>::open(options(temp_dir.path()));
    assert!(matches!(result, Err(Error::SchemaValidation(_))));

    let options = StoreOptions::builder()
        .name("user")
        .path(temp_dir.path())
        .defaults(json!({ "id": 7 }))
        .build()
        .unwrap();
    let store = Store::<Strict>::open(options).expect("Defaults complete the schema");
    assert_eq!(store.get().unwrap().id, 7);
}

#[test]
fn test_set_persists_and_survives_reopen() {
    let temp_dir = temp_store_dir();
    let mut store = Store::<User>::open(options(temp_dir.path())).unwrap();

    store.set(json!({ "name": "John" })).expect("Failed to set");
    assert_eq!(
        read_json(store.path()),
        json!({ "version": 1, "name": "John", "age": 30 })
    );

    let reopened = Store::<User>::open(options(temp_dir.path())).unwrap();
    assert_eq!(
        reopened.get().unwrap(),
        User {
            version: Version,
            name: "John".to_string(),
            age: 30,
        }
    );
}

#[test]
fn test_set_accepts_serializable_patches() {
    #[derive(Serialize)]
    struct AgePatch {
        age: u32,
    }

    let temp_dir = temp_store_dir();
    let mut store = Store::<User>::open(options(temp_dir.path())).unwrap();

    store.set(AgePatch { age: 41 }).unwrap();
    assert_eq!(store.get().unwrap().age, 41);
    assert_eq!(store.get().unwrap().name, "Adnan");
}

#[test]
fn test_set_with_optional_patch_fields_leaves_unset_fields() {
    #[derive(Serialize)]
    struct UserPatch {
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        age: Option<u32>,
    }

    let temp_dir = temp_store_dir();
    let mut store = Store::<User>::open(options(temp_dir.path())).unwrap();

    store
        .set(UserPatch {
            name: None,
            age: Some(5),
        })
        .unwrap();

    let expected = json!({ "version": 1, "name": "Adnan", "age": 5 });
    assert_eq!(Value::Object(store.store()), expected);

    let reopened = Store::<User>::open(options(temp_dir.path())).expect("Failed to reopen store");
    assert_eq!(Value::Object(reopened.store()), expected);
}

#[test]
fn test_update_sees_preceding_set() {
    let temp_dir = temp_store_dir();
    let mut store = Store::<User>::open(options(temp_dir.path())).unwrap();

    store.set(json!({ "name": "John" })).unwrap();
    store
        .update(|user| User {
            age: user.age + 1,
            ..user
        })
        .unwrap();

    let expected = json!({ "version": 1, "name": "John", "age": 31 });
    assert_eq!(Value::Object(store.store()), expected);
    assert_eq!(read_json(store.path()), expected);
}

#[test]
fn test_set_rejects_version_and_non_objects() {
    let temp_dir = temp_store_dir();
    let mut store = Store::<User>::open(options(temp_dir.path())).unwrap();

    let err = store.set(json!({ "version": 5 })).unwrap_err();
    assert!(matches!(err, Error::InvalidPatch(_)));

    let err = store.set(json!("name")).unwrap_err();
    assert!(matches!(err, Error::InvalidPatch(_)));

    assert_eq!(store.get().unwrap(), User::default());
}

#[test]
fn test_set_does_not_validate_the_merged_record() {
    let temp_dir = temp_store_dir();
    let mut store = Store::<User>::open(options(temp_dir.path())).unwrap();

    store.set(json!({ "age": "forty" })).expect("Object-form set is unvalidated");

    assert_eq!(store.store()["age"], json!("forty"));
    assert_eq!(read_json(store.path())["age"], json!("forty"));
    assert!(matches!(store.get(), Err(Error::SchemaValidation(_))));
}

#[test]
fn test_store_returns_a_copy() {
    let temp_dir = temp_store_dir();
    let store = Store::<User>::open(options(temp_dir.path())).unwrap();

    let mut copy = store.store();
    copy.insert("name".to_string(), json!("Mallory"));

    assert_eq!(store.store()["name"], json!("Adnan"));
}

#[test]
fn test_update_reads_validated_record_from_disk() {
    let temp_dir = temp_store_dir();
    let mut store = Store::<User>::open(options(temp_dir.path())).unwrap();
    store.set(json!({ "name": "John" })).unwrap();

    // Changes made behind the store's back are visible to `update`.
    fs::write(store.path(), r#"{ "version": 1, "name": "Edited", "age": 50 }"#).unwrap();

    store
        .update(|user| User {
            age: user.age + 1,
            ..user
        })
        .expect("Failed to update");

    assert_eq!(
        Value::Object(store.store()),
        json!({ "version": 1, "name": "Edited", "age": 51 })
    );
    assert_eq!(read_json(store.path()), Value::Object(store.store()));
}

#[test]
fn test_update_fails_on_invalid_file() {
    let temp_dir = temp_store_dir();
    let mut store = Store::<User>::open(options(temp_dir.path())).unwrap();

    fs::write(store.path(), r#"{ "version": 1, "age": "old" }"#).unwrap();
    let err = store.update(|user| user).unwrap_err();
    assert!(matches!(err, Error::SchemaValidation(_)));

    fs::remove_file(store.path()).unwrap();
    let err = store.update(|user| user).unwrap_err();
    assert!(matches!(err, Error::Io(ref e) if e.kind() == io::ErrorKind::NotFound));

    // The in-memory record is untouched by failed updates.
    assert_eq!(store.get().unwrap(), User::default());
}

#[test]
fn test_reset_restores_defaults_snapshot() {
    let temp_dir = temp_store_dir();
    let options = StoreOptions::builder()
        .name("user")
        .path(temp_dir.path())
        .defaults(json!({ "age": 18 }))
        .build()
        .unwrap();
    let mut store = Store::<User>::open(options).unwrap();

    store.set(json!({ "name": "John", "age": 99 })).unwrap();
    store.update(|user| User { age: 100, ..user }).unwrap();
    store.reset().expect("Failed to reset");

    let expected = json!({ "version": 1, "name": "Adnan", "age": 18 });
    assert_eq!(Value::Object(store.store()), expected);
    assert_eq!(read_json(store.path()), expected);
}

#[test]
fn test_load_existing_file_validates_and_canonicalizes() {
    let temp_dir = temp_store_dir();
    let path = temp_dir.path().join("user.json");
    fs::write(&path, r#"{"age":44,"version":1,"extra":true}"#).unwrap();

    let store = Store::<User>::open(options(temp_dir.path())).unwrap();

    let expected = json!({ "version": 1, "name": "Adnan", "age": 44 });
    assert_eq!(Value::Object(store.store()), expected);
    assert_eq!(read_json(&path), expected);
}

#[test]
fn test_non_conforming_file_fails_without_migration() {
    let temp_dir = temp_store_dir();
    let path = temp_dir.path().join("user.json");

    fs::write(&path, r#"{ "version": 1, "age": "thirty" }"#).unwrap();
    let result = Store::<User>::open(options(temp_dir.path()));
    assert!(matches!(result, Err(Error::SchemaValidation(_))));

    fs::write(&path, r#"{ "version": 2, "name": "John" }"#).unwrap();
    let result = Store::<User>::open(options(temp_dir.path()));
    assert!(matches!(result, Err(Error::SchemaValidation(_))));
}

#[test]
fn test_empty_file_is_initialized_with_defaults() {
    let temp_dir = temp_store_dir();
    let path = temp_dir.path().join("user.json");
    fs::write(&path, "").unwrap();

    let store = Store::<User>::open(options(temp_dir.path())).unwrap();

    assert_eq!(store.get().unwrap(), User::default());
    assert_eq!(read_json(&path), json!({ "version": 1, "name": "Adnan", "age": 30 }));
}

#[test]
fn test_invalid_contents_fail_to_open() {
    let temp_dir = temp_store_dir();
    let path = temp_dir.path().join("user.json");

    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        Store::<User>::open(options(temp_dir.path())),
        Err(Error::Json(_))
    ));

    for contents in ["null", "[1, 2, 3]", "\"text\"", "42"] {
        fs::write(&path, contents).unwrap();
        assert!(
            matches!(
                Store::<User>::open(options(temp_dir.path())),
                Err(Error::InvalidFormat)
            ),
            "{contents} should be an invalid format"
        );
    }

    for contents in [r#"{ "name": "John" }"#, r#"{ "version": "1" }"#, r#"{ "version": null }"#] {
        fs::write(&path, contents).unwrap();
        assert!(
            matches!(
                Store::<User>::open(options(temp_dir.path())),
                Err(Error::InvalidVersion)
            ),
            "{contents} should have an invalid version"
        );
    }

    // Failed opens leave the file as it was.
    assert_eq!(fs::read_to_string(&path).unwrap(), r#"{ "version": null }"#);
}

#[cfg(unix)]
#[test]
fn test_open_keeps_file_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = temp_store_dir();
    let path = temp_dir.path().join("user.json");
    fs::write(&path, r#"{ "version": 1, "name": "John", "age": 30 }"#).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

    let mut store = Store::<User>::open(options(temp_dir.path())).unwrap();
    assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o644);

    store.set(json!({ "age": 31 })).unwrap();
    assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o644);
}

struct DeniedFileSystem;

impl next_store::FileSystem for DeniedFileSystem {
    fn read(&self, _path: &Path) -> io::Result<String> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
    }

    fn write(&self, _path: &Path, _contents: &str) -> io::Result<()> {
        panic!("nothing should be written after a failed read");
    }

    fn create_dir_all(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_read_errors_other_than_not_found_are_fatal() {
    let options = StoreOptions::builder()
        .name("user")
        .fs(DeniedFileSystem)
        .build()
        .unwrap();

    let result = Store::<User>::open(options);
    assert!(matches!(
        result,
        Err(Error::Io(ref e)) if e.kind() == io::ErrorKind::PermissionDenied
    ));
}
