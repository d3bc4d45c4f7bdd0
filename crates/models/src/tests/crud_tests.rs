use crate::db::connect;
use crate::{category, transaction};
use anyhow::Result;
use migration::MigratorTrait;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

/// Connect and migrate; `None` means no database is reachable and the
/// test should be skipped.
async fn setup_test_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let db = match connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("skip: cannot connect to db: {}", e);
            return None;
        }
    };
    if let Err(e) = migration::Migrator::up(&db, None).await {
        eprintln!("skip: migrate up failed: {}", e);
        return None;
    }
    Some(db)
}

#[tokio::test]
async fn test_category_crud() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let title = format!("test_category_{}", Uuid::new_v4());
    let created = category::create(&db, &title).await?;
    assert_eq!(created.title, title);

    let found = category::Entity::find_by_id(created.id).one(&db).await?;
    assert!(found.is_some());
    assert_eq!(found.unwrap().title, title);

    let by_title = category::find_by_title(&db, &title).await?;
    assert_eq!(by_title.unwrap().id, created.id);

    // Unique key on title rejects a second insert
    let dup = category::create(&db, &title).await;
    assert!(dup.is_err());

    category::Entity::delete_by_id(created.id).exec(&db).await?;
    Ok(())
}

#[tokio::test]
async fn test_category_title_validation() {
    assert!(category::validate_title("Food").is_ok());
    assert!(category::validate_title("").is_err());
    assert!(category::validate_title("   ").is_err());
}

#[tokio::test]
async fn test_transaction_crud() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let cat = category::create(&db, &format!("txn_cat_{}", Uuid::new_v4())).await?;

    let created = transaction::create(
        &db,
        "Salary",
        Decimal::new(500000, 2),
        transaction::TransactionKind::Income,
        cat.id,
    )
    .await?;
    assert_eq!(created.title, "Salary");
    assert_eq!(created.kind, transaction::TransactionKind::Income);
    assert_eq!(created.category_id, cat.id);

    let found = transaction::Entity::find_by_id(created.id).one(&db).await?;
    assert!(found.is_some());
    let found = found.unwrap();
    assert_eq!(found.value, Decimal::new(500000, 2));

    let by_category = transaction::Entity::find()
        .filter(transaction::Column::CategoryId.eq(cat.id))
        .all(&db)
        .await?;
    assert_eq!(by_category.len(), 1);

    transaction::Entity::delete_by_id(created.id).exec(&db).await?;
    category::Entity::delete_by_id(cat.id).exec(&db).await?;
    Ok(())
}

#[tokio::test]
async fn test_transaction_rejects_bad_input() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let cat = category::create(&db, &format!("txn_val_{}", Uuid::new_v4())).await?;

    let empty_title = transaction::create(
        &db,
        "  ",
        Decimal::new(100, 0),
        transaction::TransactionKind::Income,
        cat.id,
    )
    .await;
    assert!(empty_title.is_err());

    let zero_value = transaction::create(
        &db,
        "Nothing",
        Decimal::ZERO,
        transaction::TransactionKind::Outcome,
        cat.id,
    )
    .await;
    assert!(zero_value.is_err());

    category::Entity::delete_by_id(cat.id).exec(&db).await?;
    Ok(())
}
