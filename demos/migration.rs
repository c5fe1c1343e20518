use next_store::{Record, Store, StoreOptions, Version, migration};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize, Record)]
#[serde(default)]
struct ServerStateV1 {
    version: Version<1>,
    host: String,
    port: u16,
}

#[derive(Debug, Serialize, Deserialize, Record)]
#[serde(default)]
struct ServerState {
    version: Version<2>,
    address: String,
    use_tls: bool, // added in v2
}

impl Default for ServerState {
    fn default() -> Self {
        Self {
            version: Version,
            address: "localhost:8080".to_string(),
            use_tls: false,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnyServerState {
    V1(ServerStateV1),
    V2(ServerState),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let temp_dir = tempfile::tempdir()?;

    // Write a v1 file (host and port as separate fields)
    let v1_state = r#"{
  "version": 1,
  "host": "production.example.com",
  "port": 443
}"#;

    println!("Before migration:");
    println!("{}", v1_state);

    std::fs::write(temp_dir.path().join("server.json"), v1_state)?;

    // Opening the store runs the migration and rewrites the file
    let options = StoreOptions::builder()
        .name("server")
        .path(temp_dir.path())
        .migrations(migration::typed(|state: AnyServerState| match state {
            AnyServerState::V1(v1) => ServerState {
                version: Version,
                address: format!("{}:{}", v1.host, v1.port),
                use_tls: v1.port == 443,
            },
            AnyServerState::V2(current) => current,
        }))
        .build()?;
    let store = Store::<ServerState>::open(options)?;

    println!("After migration:");
    println!("{:#?}", store.get()?);

    Ok(())
}
