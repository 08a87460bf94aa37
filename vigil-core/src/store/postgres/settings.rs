use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use vigil_model::{CompanySettings, UserId};

use crate::error::Result;
use crate::store::ports::SettingsRepository;

#[derive(Debug, Clone)]
pub struct PgSettingsRepository {
    pool: PgPool,
}

impl PgSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for PgSettingsRepository {
    async fn get(&self, company_id: &str) -> Result<Option<CompanySettings>> {
        let row = sqlx::query(
            r#"
            SELECT company_id, user_id, sector, tax_regime, legal_form, updated_at
            FROM company_settings
            WHERE company_id = $1
            "#,
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| CompanySettings {
            company_id: row.get("company_id"),
            user_id: row.get::<Option<Uuid>, _>("user_id").map(UserId::from),
            sector: row.get("sector"),
            tax_regime: row.get("tax_regime"),
            legal_form: row.get("legal_form"),
            updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
        }))
    }

    async fn upsert(&self, settings: &CompanySettings) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO company_settings
                (company_id, user_id, sector, tax_regime, legal_form, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (company_id) DO UPDATE SET
                user_id = EXCLUDED.user_id,
                sector = EXCLUDED.sector,
                tax_regime = EXCLUDED.tax_regime,
                legal_form = EXCLUDED.legal_form,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&settings.company_id)
        .bind(settings.user_id.map(|id| id.to_uuid()))
        .bind(&settings.sector)
        .bind(&settings.tax_regime)
        .bind(&settings.legal_form)
        .bind(settings.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
