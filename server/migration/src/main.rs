use sea_orm_migration::prelude::*;

#[async_std::main]
async fn main() {
    // DATABASE_URL and MTT_POPULATE_DATABASE may come from a .env file.
    match dotenvy::dotenv() {
        Ok(path) => eprintln!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => eprintln!("Ignoring malformed .env file: {e}"),
    }
    cli::run_cli(migration::Migrator).await;
}
