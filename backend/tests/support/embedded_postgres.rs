//! Test database provisioning.
//!
//! `WAKEUP_TEST_DATABASE_URL` points the suites at an existing database.
//! Without it each test gets a fresh database cloned from a migrated template
//! on the shared embedded cluster.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use backend::outbound::persistence::run_pending_migrations;
use pg_embedded_setup_unpriv::test_support::{hash_directory, shared_cluster_handle};
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use uuid::Uuid;

/// Environment variable naming an external database to test against.
pub const DATABASE_URL_ENV: &str = "WAKEUP_TEST_DATABASE_URL";

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const TEMPLATE_NAME_PREFIX: &str = "wakeup_template";
const PROVISION_RETRIES: usize = 5;
const PROVISION_RETRY_DELAY: Duration = Duration::from_millis(500);

/// A migrated database that lives as long as this value.
pub enum TestDatabase {
    /// Caller-supplied database; names in tests are randomised to avoid clashes.
    External(String),
    /// Temporary database dropped with the handle.
    Embedded(TemporaryDatabase),
}

impl TestDatabase {
    /// Connection URL for the database.
    pub fn url(&self) -> String {
        match self {
            Self::External(url) => url.clone(),
            Self::Embedded(database) => database.url().to_string(),
        }
    }
}

fn template_database_name() -> Result<String, String> {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let hash = hash_directory(dir).map_err(|err| format!("hash migrations: {err}"))?;
    let short_hash = hash.get(..8).unwrap_or(&hash);
    Ok(format!("{TEMPLATE_NAME_PREFIX}_{short_hash}"))
}

fn ensure_template_database(cluster: &ClusterHandle) -> Result<String, String> {
    let template_name = template_database_name()?;
    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let exists = cluster
        .database_exists(template_name.as_str())
        .map_err(|err| format!("template check: {err:?}"))?;
    if !exists {
        cluster
            .create_database(template_name.as_str())
            .map_err(|err| format!("create template: {err:?}"))?;
        let url = cluster.connection().database_url(&template_name);
        run_pending_migrations(&url).map_err(|err| err.to_string())?;
    }
    Ok(template_name)
}

fn provision_embedded() -> Result<TemporaryDatabase, String> {
    let cluster = shared_cluster_handle().map_err(|err| format!("shared cluster: {err:?}"))?;
    let mut last_error = String::from("exhausted retries");
    for attempt in 1..=PROVISION_RETRIES {
        let outcome = ensure_template_database(cluster).and_then(|template| {
            let name = format!("test_{}", Uuid::new_v4().simple());
            cluster
                .temporary_database_from_template(name.as_str(), template.as_str())
                .map_err(|err| format!("create database from template: {err:?}"))
        });
        match outcome {
            Ok(database) => return Ok(database),
            Err(err) => last_error = format!("attempt {attempt}/{PROVISION_RETRIES}: {err}"),
        }
        if attempt < PROVISION_RETRIES {
            std::thread::sleep(PROVISION_RETRY_DELAY);
        }
    }
    Err(last_error)
}

/// Provision a migrated database for one test.
pub fn provision_database() -> Result<TestDatabase, String> {
    match std::env::var(DATABASE_URL_ENV) {
        Ok(url) => {
            run_pending_migrations(&url).map_err(|err| err.to_string())?;
            Ok(TestDatabase::External(url))
        }
        Err(_) => provision_embedded().map(TestDatabase::Embedded),
    }
}
