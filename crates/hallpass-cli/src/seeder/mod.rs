//! Development data for a Hallpass database.
//!
//! Seeding creates faculty per department, wardens per hostel and a mix of
//! resident and day-scholar students. Every seeded account logs in with
//! [`SEED_PASSWORD`].

pub mod models;
pub mod users;

use sqlx::PgPool;
use std::time::Instant;

pub use models::{Headcount, SEED_EMAIL_DOMAIN, SEED_PASSWORD, SeedConfig, UserSeed};

/// Seeded accounts never reach production, so a cheap cost keeps large
/// seeds fast.
const SEED_HASH_COST: u32 = 6;

pub async fn seed_all(db: &PgPool, config: SeedConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.departments.is_empty() {
        return Err("At least one department is required".into());
    }

    let start_time = Instant::now();
    println!("🌱 Seeding Hallpass database");
    println!("   Departments: {}", config.departments.join(", "));
    if config.hostels.is_empty() {
        println!("   Hostels: none (every student is a day scholar)");
    } else {
        println!("   Hostels: {}", config.hostels.join(", "));
    }

    let password_hash = bcrypt::hash(SEED_PASSWORD, SEED_HASH_COST)?;
    users::seed_users(db, &config, &password_hash).await?;

    println!("\n✅ Seeding finished in {:?}", start_time.elapsed());
    println!("   All seeded accounts use the password: {}", SEED_PASSWORD);
    Ok(())
}

pub async fn clear_all(db: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    let deleted = users::clear_users(db).await?;
    println!(
        "\n✅ Cleared {} seeded users in {:?}",
        deleted,
        start_time.elapsed()
    );
    Ok(())
}
