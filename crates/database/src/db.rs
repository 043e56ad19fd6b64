use sea_orm::{Database, DatabaseConnection, DbErr};

/// Creates a database connection from `DATABASE_URL` (a `.env` file is
/// honored when present).
pub async fn create_connection() -> Result<DatabaseConnection, DbErr> {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL")
        .map_err(|_| DbErr::Custom("DATABASE_URL is not set".to_string()))?;
    Database::connect(url).await
}
