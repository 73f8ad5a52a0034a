//! # Schema Bootstrapper
//!
//! Creates the SSMS tables and loads the starter data.
//!
//! ## Usage
//! ```bash
//! # MySQL (default backend)
//! DB_HOST=localhost DB_USER=root DB_PASSWORD=... DB_NAME=ssms_db \
//!     cargo run -p ssms-db --bin ssms-bootstrap
//!
//! # SQLite file, with an admin login
//! DB_BACKEND=sqlite DB_NAME=./ssms.db SSMS_ADMIN_PASSWORD=... \
//!     cargo run -p ssms-db --bin ssms-bootstrap
//! ```
//!
//! Exit code 0 when every step succeeded, 1 otherwise. Safe to re-run.

use std::env;
use std::process::ExitCode;

use ssms_db::{init_tracing, DbConfig, SchemaBootstrapper, Session};

/// Password for the seeded `admin` user; no admin is seeded without it.
const ENV_ADMIN_PASSWORD: &str = "SSMS_ADMIN_PASSWORD";

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let config = DbConfig::from_env();
    println!("Setting up database at {} ({})", config.target(), config.backend);

    if !Session::test_connection_with(config.clone(), ssms_db::SqlxConnector).await {
        eprintln!("Cannot connect to the database; check DB_* settings.");
        return ExitCode::FAILURE;
    }
    println!("Connection OK");

    let mut bootstrapper = SchemaBootstrapper::new(config);
    match env::var(ENV_ADMIN_PASSWORD) {
        Ok(password) if !password.is_empty() => {
            bootstrapper = bootstrapper.admin_password(password);
        }
        _ => println!("{} not set; skipping admin user", ENV_ADMIN_PASSWORD),
    }

    match bootstrapper.run().await {
        Ok(report) => {
            println!("Tables ready: {}", report.tables);
            println!(
                "Seed statements: {} ({} rows inserted)",
                report.seed_statements, report.rows_inserted
            );
            println!("Database setup completed");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Database setup failed: {}", err);
            ExitCode::FAILURE
        }
    }
}
