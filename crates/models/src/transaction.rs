use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{category, errors};

/// A single ledger entry. Immutable once created, except for deletion.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub value: Decimal,
    pub kind: TransactionKind,
    pub category_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    #[sea_orm(string_value = "income")]
    Income,
    #[sea_orm(string_value = "outcome")]
    Outcome,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Category }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Category => Entity::belongs_to(category::Entity)
                .from(Column::CategoryId)
                .to(category::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn parse_kind(k: &str) -> Result<TransactionKind, errors::ModelError> {
    match k {
        "income" => Ok(TransactionKind::Income),
        "outcome" => Ok(TransactionKind::Outcome),
        _ => Err(errors::ModelError::Validation("kind must be 'income' or 'outcome'".into())),
    }
}

pub fn validate_title(t: &str) -> Result<(), errors::ModelError> {
    if t.trim().is_empty() {
        return Err(errors::ModelError::Validation("title required".into()));
    }
    Ok(())
}

pub fn validate_value(v: Decimal) -> Result<(), errors::ModelError> {
    if v <= Decimal::ZERO {
        return Err(errors::ModelError::Validation("value must be > 0".into()));
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(
    conn: &C,
    title: &str,
    value: Decimal,
    kind: TransactionKind,
    category_id: Uuid,
) -> Result<Model, errors::ModelError> {
    validate_title(title)?;
    validate_value(value)?;

    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title.to_string()),
        value: Set(value),
        kind: Set(kind),
        category_id: Set(category_id),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(conn).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_kind_accepts_only_literals() {
        assert_eq!(parse_kind("income").unwrap(), TransactionKind::Income);
        assert_eq!(parse_kind("outcome").unwrap(), TransactionKind::Outcome);
        assert!(parse_kind("Income").is_err());
        assert!(parse_kind("transfer").is_err());
        assert!(parse_kind("").is_err());
    }

    #[test]
    fn value_must_be_positive() {
        assert!(validate_value(Decimal::new(1, 2)).is_ok());
        assert!(validate_value(Decimal::ZERO).is_err());
        assert!(validate_value(Decimal::new(-100, 2)).is_err());
    }
}
