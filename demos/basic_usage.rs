use next_store::{Record, Store, StoreOptions, Version};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Serialize, Deserialize, Record)]
#[serde(default)]
struct AppState {
    version: Version<1>,
    theme: String,
    window_width: u32,
    recent_files: Vec<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            version: Version,
            theme: "light".to_string(),
            window_width: 1280,
            recent_files: Vec::new(),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let temp_dir = tempfile::tempdir()?;

    let options = StoreOptions::builder()
        .name("app_state")
        .path(temp_dir.path().join("state"))
        .build()?;
    let mut store = Store::<AppState>::open(options)?;

    println!("Created {}:", store.path().display());
    println!("{}", std::fs::read_to_string(store.path())?);

    store.set(json!({ "theme": "dark" }))?;

    store.update(|mut state| {
        state.recent_files.push("notes.txt".to_string());
        state
    })?;

    println!("After updates:");
    println!("{:#?}", store.get()?);

    store.reset()?;
    println!("After reset:");
    println!("{:#?}", store.get()?);

    Ok(())
}
