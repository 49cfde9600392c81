//! The application settings row.
//!
//! There is exactly one row. It is created with defaults the first time it
//! is read, and afterwards only ever updated.

use model::entities::settings::{self, SINGLETON_ID, Theme};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{debug, info, instrument};
use validator::Validate;

use crate::Result;
use crate::validation::{percentage, positive};

/// Editable settings, validated as a whole before every write.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct SettingsValues {
    #[validate(custom(function = "positive"))]
    pub rub_to_usd_rate: Decimal,
    pub theme: Theme,
    #[validate(custom(function = "percentage"))]
    pub mandatory_percent: Decimal,
    #[validate(custom(function = "percentage"))]
    pub variable_percent: Decimal,
    #[validate(custom(function = "percentage"))]
    pub savings_percent: Decimal,
    #[validate(custom(function = "percentage"))]
    pub investments_percent: Decimal,
    pub password_hash: Option<String>,
}

impl Default for SettingsValues {
    fn default() -> Self {
        Self {
            rub_to_usd_rate: Decimal::new(11, 3),
            theme: Theme::Light,
            mandatory_percent: Decimal::new(50, 0),
            variable_percent: Decimal::new(30, 0),
            savings_percent: Decimal::new(10, 0),
            investments_percent: Decimal::new(10, 0),
            password_hash: None,
        }
    }
}

impl SettingsValues {
    fn assign(self, active: &mut settings::ActiveModel) {
        active.rub_to_usd_rate = Set(self.rub_to_usd_rate);
        active.theme = Set(self.theme);
        active.mandatory_percent = Set(self.mandatory_percent);
        active.variable_percent = Set(self.variable_percent);
        active.savings_percent = Set(self.savings_percent);
        active.investments_percent = Set(self.investments_percent);
        active.password_hash = Set(self.password_hash);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SettingsPatch {
    pub rub_to_usd_rate: Option<Decimal>,
    pub theme: Option<Theme>,
    pub mandatory_percent: Option<Decimal>,
    pub variable_percent: Option<Decimal>,
    pub savings_percent: Option<Decimal>,
    pub investments_percent: Option<Decimal>,
    pub password_hash: Option<Option<String>>,
}

impl SettingsPatch {
    fn apply(self, current: &settings::Model) -> SettingsValues {
        SettingsValues {
            rub_to_usd_rate: self.rub_to_usd_rate.unwrap_or(current.rub_to_usd_rate),
            theme: self.theme.unwrap_or(current.theme),
            mandatory_percent: self.mandatory_percent.unwrap_or(current.mandatory_percent),
            variable_percent: self.variable_percent.unwrap_or(current.variable_percent),
            savings_percent: self.savings_percent.unwrap_or(current.savings_percent),
            investments_percent: self.investments_percent.unwrap_or(current.investments_percent),
            password_hash: self
                .password_hash
                .unwrap_or_else(|| current.password_hash.clone()),
        }
    }
}

async fn load_or_init<C: ConnectionTrait>(conn: &C) -> Result<settings::Model> {
    if let Some(existing) = settings::Entity::find_by_id(SINGLETON_ID.to_owned())
        .one(conn)
        .await?
    {
        return Ok(existing);
    }

    debug!("No settings stored yet, inserting defaults");
    let mut active = settings::ActiveModel {
        id: Set(SINGLETON_ID.to_owned()),
        ..Default::default()
    };
    SettingsValues::default().assign(&mut active);
    Ok(active.insert(conn).await?)
}

/// Read the settings, storing the defaults on first access.
#[instrument(skip(db))]
pub async fn load(db: &DatabaseConnection) -> Result<settings::Model> {
    let txn = db.begin().await?;
    let current = load_or_init(&txn).await?;
    txn.commit().await?;
    Ok(current)
}

#[instrument(skip(db))]
pub async fn update(db: &DatabaseConnection, patch: SettingsPatch) -> Result<settings::Model> {
    let txn = db.begin().await?;

    let current = load_or_init(&txn).await?;
    let values = patch.apply(&current);
    values.validate()?;

    let mut active: settings::ActiveModel = current.into();
    values.assign(&mut active);
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    info!("Settings updated successfully");
    Ok(updated)
}
