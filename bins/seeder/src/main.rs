//! Database seeder for Kassa development and testing.
//!
//! Seeds demo banks, clients, and accounts for local development. The home
//! bank (id 1) is created by the migrations; everything here is additive
//! and safe to run repeatedly.
//!
//! Usage: cargo run --bin seeder

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::str::FromStr;

use kassa_db::entities::{accounts, banks, users};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = kassa_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding banks...");
    let home_bank_id = seed_bank(&db, "Kassa").await;
    let partner_bank_id = seed_bank(&db, "Meridian Trust").await;

    println!("Seeding clients...");
    let ivan_id = seed_user(&db, "Ivan", "Petrov", date(1987, 4, 12)).await;
    let maria_id = seed_user(&db, "Maria", "Sokolova", date(1993, 11, 2)).await;

    println!("Seeding accounts...");
    seed_account(&db, "4050840112345678", "USD", "1000.00", ivan_id, home_bank_id).await;
    seed_account(&db, "4050978187654321", "EUR", "500.00", maria_id, home_bank_id).await;
    seed_account(&db, "4099840100000001", "USD", "250.00", maria_id, partner_bank_id).await;

    println!("Seeding complete!");
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid seed date")
}

/// Seeds one bank and returns its id. Reuses the existing row when a bank
/// with this name is already present.
async fn seed_bank(db: &DatabaseConnection, name: &str) -> i64 {
    if let Some(existing) = banks::Entity::find()
        .filter(banks::Column::Name.eq(name))
        .one(db)
        .await
        .expect("Failed to query banks")
    {
        println!("  Bank {name} already exists (id {}), skipping...", existing.id);
        return existing.id;
    }

    let bank = banks::ActiveModel {
        name: Set(name.to_string()),
        active: Set(true),
        ..Default::default()
    };
    let inserted = bank.insert(db).await.expect("Failed to insert bank");
    println!("  Created bank {name} (id {})", inserted.id);
    inserted.id
}

/// Seeds one client and returns their id.
async fn seed_user(db: &DatabaseConnection, name: &str, surname: &str, birthdate: NaiveDate) -> i64 {
    if let Some(existing) = users::Entity::find()
        .filter(users::Column::Name.eq(name))
        .filter(users::Column::Surname.eq(surname))
        .one(db)
        .await
        .expect("Failed to query users")
    {
        println!(
            "  Client {name} {surname} already exists (id {}), skipping...",
            existing.id
        );
        return existing.id;
    }

    let user = users::ActiveModel {
        name: Set(name.to_string()),
        surname: Set(surname.to_string()),
        birthdate: Set(birthdate),
        active: Set(true),
        ..Default::default()
    };
    let inserted = user.insert(db).await.expect("Failed to insert user");
    println!("  Created client {name} {surname} (id {})", inserted.id);
    inserted.id
}

/// Seeds one account with an opening balance.
async fn seed_account(
    db: &DatabaseConnection,
    number: &str,
    currency: &str,
    balance: &str,
    user_id: i64,
    bank_id: i64,
) {
    if accounts::Entity::find()
        .filter(accounts::Column::Number.eq(number))
        .one(db)
        .await
        .expect("Failed to query accounts")
        .is_some()
    {
        println!("  Account {number} already exists, skipping...");
        return;
    }

    let account = accounts::ActiveModel {
        number: Set(number.to_string()),
        balance: Set(Decimal::from_str(balance).expect("valid seed amount")),
        currency: Set(currency.to_string()),
        user_id: Set(user_id),
        bank_id: Set(bank_id),
        active: Set(true),
        ..Default::default()
    };
    match account.insert(db).await {
        Ok(inserted) => println!("  Created account {number} ({currency}, id {})", inserted.id),
        Err(e) => eprintln!("Failed to insert account {number}: {e}"),
    }
}
