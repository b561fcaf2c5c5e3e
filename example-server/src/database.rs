use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use std::path::Path;

/// Create the demo database at `path` (if needed) and fill it with sample rows
pub async fn seed(path: &Path) -> Result<(), sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePool::connect_with(options).await?;

    setup(&pool).await?;
    pool.close().await;
    Ok(())
}

async fn setup(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT UNIQUE NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            is_active BOOLEAN DEFAULT true
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            price REAL NOT NULL,
            stock INTEGER DEFAULT 0,
            thumbnail BLOB
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Foreign keys with explicit actions so the structure view has something to show
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            product_id INTEGER REFERENCES products(id) ON UPDATE CASCADE ON DELETE SET NULL,
            quantity INTEGER NOT NULL,
            status TEXT DEFAULT 'pending',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    let (user_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    if user_count > 0 {
        tracing::info!("Demo database already seeded");
        return Ok(());
    }

    seed_sample_data(pool).await
}

async fn seed_sample_data(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let names = [
        "Alice Johnson", "Bob Smith", "Charlie Brown", "Diana Prince", "Evan Davis",
        "Fiona Wilson", "George Taylor", "Hannah Anderson", "Isaac Thomas", "Julia Jackson",
    ];
    let products = [
        ("Notebook", 3.49), ("Fountain Pen", 24.90), ("Desk Lamp", 39.00),
        ("Monitor Stand", 54.95), ("Headphones", 89.00), ("Keyboard", 69.50),
    ];
    let statuses = ["pending", "processing", "shipped", "completed", "cancelled"];

    let mut transaction = pool.begin().await?;

    for (index, name) in names.iter().enumerate() {
        let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
        sqlx::query("INSERT INTO users (name, email, is_active) VALUES (?, ?, ?)")
            .bind(*name)
            .bind(email)
            .bind(index % 4 != 0)
            .execute(&mut *transaction)
            .await?;
    }

    for (index, (name, price)) in products.iter().enumerate() {
        let thumbnail = (index % 2 == 0).then(|| name.as_bytes().to_vec());
        sqlx::query("INSERT INTO products (name, price, stock, thumbnail) VALUES (?, ?, ?, ?)")
            .bind(*name)
            .bind(*price)
            .bind((index as i64 * 17) % 50)
            .bind(thumbnail)
            .execute(&mut *transaction)
            .await?;
    }

    for index in 0..60_i64 {
        let user_id = index % names.len() as i64 + 1;
        let product_id = index % products.len() as i64 + 1;
        let status = statuses[index as usize % statuses.len()];

        sqlx::query("INSERT INTO orders (user_id, product_id, quantity, status) VALUES (?, ?, ?, ?)")
            .bind(user_id)
            .bind(product_id)
            .bind(index % 5 + 1)
            .bind(status)
            .execute(&mut *transaction)
            .await?;
    }

    transaction.commit().await?;

    tracing::info!(
        users = names.len(),
        products = products.len(),
        orders = 60,
        "Sample data seeded"
    );
    Ok(())
}
