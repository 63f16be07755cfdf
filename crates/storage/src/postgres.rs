//! Weather store backed by PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgConnection, PgPool};
use tracing::{debug, info, instrument};

use weather_common::{
    reconcile, CityKey, DailyWeather, FullWeather, FullWeatherUpdate, HourlyWeather, Location,
    RealtimeWeather, WeatherError, WeatherResult,
};

use crate::repository::WeatherRepository;

/// Database connection pool and weather operations.
pub struct PgWeatherStore {
    pool: PgPool,
}

impl PgWeatherStore {
    /// Create a new store from a database URL.
    pub async fn connect(database_url: &str, max_connections: u32) -> WeatherResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| WeatherError::DatabaseError(format!("Connection failed: {}", e)))?;

        info!(max_connections, "Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> WeatherResult<()> {
        // Split SQL statements and execute them individually
        for statement in SCHEMA_SQL.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| WeatherError::DatabaseError(format!("Migration failed: {}", e)))?;
            }
        }

        info!("Database schema is up to date");
        Ok(())
    }

    async fn begin(&self) -> WeatherResult<sqlx::Transaction<'static, sqlx::Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|e| WeatherError::DatabaseError(format!("Transaction failed: {}", e)))
    }
}

async fn commit(tx: sqlx::Transaction<'static, sqlx::Postgres>) -> WeatherResult<()> {
    tx.commit()
        .await
        .map_err(|e| WeatherError::DatabaseError(format!("Commit failed: {}", e)))
}

/// Lock an untrashed location row for the rest of the transaction.
async fn lock_location(conn: &mut PgConnection, code: &str) -> WeatherResult<Location> {
    let row = sqlx::query_as::<_, LocationRow>(
        "SELECT code, city_name, region_name, country_name, country_code, enabled, trashed \
         FROM locations WHERE code = $1 AND trashed = FALSE FOR UPDATE",
    )
    .bind(code)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| WeatherError::DatabaseError(format!("Query failed: {}", e)))?;

    row.map(Location::from)
        .ok_or_else(|| WeatherError::LocationNotFound(code.to_string()))
}

async fn upsert_realtime(conn: &mut PgConnection, weather: &RealtimeWeather) -> WeatherResult<()> {
    sqlx::query(
        r#"
        INSERT INTO realtime_weather (
            location_code, temperature, humidity, precipitation,
            wind_speed, status, last_updated
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (location_code)
        DO UPDATE SET
            temperature = EXCLUDED.temperature,
            humidity = EXCLUDED.humidity,
            precipitation = EXCLUDED.precipitation,
            wind_speed = EXCLUDED.wind_speed,
            status = EXCLUDED.status,
            last_updated = EXCLUDED.last_updated
        "#,
    )
    .bind(&weather.location_code)
    .bind(weather.temperature)
    .bind(weather.humidity)
    .bind(weather.precipitation)
    .bind(weather.wind_speed)
    .bind(&weather.status)
    .bind(weather.last_updated)
    .execute(&mut *conn)
    .await
    .map_err(|e| WeatherError::DatabaseError(format!("Upsert failed: {}", e)))?;

    Ok(())
}

async fn select_hourly(conn: &mut PgConnection, code: &str) -> WeatherResult<Vec<HourlyWeather>> {
    let rows = sqlx::query_as::<_, HourlyRow>(
        "SELECT location_code, hour_of_day, temperature, precipitation, status \
         FROM weather_hourly WHERE location_code = $1 ORDER BY hour_of_day",
    )
    .bind(code)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| WeatherError::DatabaseError(format!("Query failed: {}", e)))?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

async fn select_daily(conn: &mut PgConnection, code: &str) -> WeatherResult<Vec<DailyWeather>> {
    let rows = sqlx::query_as::<_, DailyRow>(
        "SELECT location_code, day_of_month, month, min_temp, max_temp, precipitation, status \
         FROM weather_daily WHERE location_code = $1 ORDER BY month, day_of_month",
    )
    .bind(code)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| WeatherError::DatabaseError(format!("Query failed: {}", e)))?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

async fn apply_hourly(
    conn: &mut PgConnection,
    code: &str,
    records: Vec<HourlyWeather>,
) -> WeatherResult<Vec<HourlyWeather>> {
    let stored = select_hourly(conn, code).await?;
    let plan = reconcile(&stored, records);
    debug!(
        location = code,
        deleted = plan.to_delete.len(),
        upserted = plan.to_upsert.len(),
        "Reconciling hourly forecast"
    );

    if !plan.to_delete.is_empty() {
        let hours: Vec<i32> = plan.to_delete.iter().map(|k| k.hour_of_day).collect();
        sqlx::query("DELETE FROM weather_hourly WHERE location_code = $1 AND hour_of_day = ANY($2)")
            .bind(code)
            .bind(&hours)
            .execute(&mut *conn)
            .await
            .map_err(|e| WeatherError::DatabaseError(format!("Delete failed: {}", e)))?;
    }

    for record in &plan.to_upsert {
        sqlx::query(
            r#"
            INSERT INTO weather_hourly (location_code, hour_of_day, temperature, precipitation, status)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (location_code, hour_of_day)
            DO UPDATE SET
                temperature = EXCLUDED.temperature,
                precipitation = EXCLUDED.precipitation,
                status = EXCLUDED.status
            "#,
        )
        .bind(code)
        .bind(record.hour_of_day)
        .bind(record.temperature)
        .bind(record.precipitation)
        .bind(&record.status)
        .execute(&mut *conn)
        .await
        .map_err(|e| WeatherError::DatabaseError(format!("Upsert failed: {}", e)))?;
    }

    select_hourly(conn, code).await
}

async fn apply_daily(
    conn: &mut PgConnection,
    code: &str,
    records: Vec<DailyWeather>,
) -> WeatherResult<Vec<DailyWeather>> {
    let stored = select_daily(conn, code).await?;
    let plan = reconcile(&stored, records);
    debug!(
        location = code,
        deleted = plan.to_delete.len(),
        upserted = plan.to_upsert.len(),
        "Reconciling daily forecast"
    );

    if !plan.to_delete.is_empty() {
        let months: Vec<i32> = plan.to_delete.iter().map(|k| k.month).collect();
        let days: Vec<i32> = plan.to_delete.iter().map(|k| k.day_of_month).collect();
        sqlx::query(
            "DELETE FROM weather_daily WHERE location_code = $1 \
             AND (month, day_of_month) IN (SELECT * FROM UNNEST($2::int[], $3::int[]))",
        )
        .bind(code)
        .bind(&months)
        .bind(&days)
        .execute(&mut *conn)
        .await
        .map_err(|e| WeatherError::DatabaseError(format!("Delete failed: {}", e)))?;
    }

    for record in &plan.to_upsert {
        sqlx::query(
            r#"
            INSERT INTO weather_daily (
                location_code, day_of_month, month,
                min_temp, max_temp, precipitation, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (location_code, day_of_month, month)
            DO UPDATE SET
                min_temp = EXCLUDED.min_temp,
                max_temp = EXCLUDED.max_temp,
                precipitation = EXCLUDED.precipitation,
                status = EXCLUDED.status
            "#,
        )
        .bind(code)
        .bind(record.day_of_month)
        .bind(record.month)
        .bind(record.min_temp)
        .bind(record.max_temp)
        .bind(record.precipitation)
        .bind(&record.status)
        .execute(&mut *conn)
        .await
        .map_err(|e| WeatherError::DatabaseError(format!("Upsert failed: {}", e)))?;
    }

    select_daily(conn, code).await
}

#[async_trait]
impl WeatherRepository for PgWeatherStore {
    async fn ping(&self) -> WeatherResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| WeatherError::DatabaseError(format!("Ping failed: {}", e)))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn location_exists(&self, code: &str) -> WeatherResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM locations WHERE code = $1)")
                .bind(code)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| WeatherError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(exists)
    }

    #[instrument(skip(self, location), fields(code = %location.code))]
    async fn add_location(&self, location: &Location) -> WeatherResult<Location> {
        let row = sqlx::query_as::<_, LocationRow>(
            r#"
            INSERT INTO locations (
                code, city_name, region_name, country_name, country_code, enabled, trashed
            ) VALUES ($1, $2, $3, $4, $5, $6, FALSE)
            RETURNING code, city_name, region_name, country_name, country_code, enabled, trashed
            "#,
        )
        .bind(&location.code)
        .bind(&location.city_name)
        .bind(&location.region_name)
        .bind(&location.country_name)
        .bind(&location.country_code)
        .bind(location.enabled)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                WeatherError::duplicate_location(&location.code)
            }
            e => WeatherError::DatabaseError(format!("Insert failed: {}", e)),
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn list_locations(&self) -> WeatherResult<Vec<Location>> {
        let rows = sqlx::query_as::<_, LocationRow>(
            "SELECT code, city_name, region_name, country_name, country_code, enabled, trashed \
             FROM locations WHERE trashed = FALSE ORDER BY code",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| WeatherError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    #[instrument(skip(self))]
    async fn find_location(&self, code: &str) -> WeatherResult<Option<Location>> {
        let row = sqlx::query_as::<_, LocationRow>(
            "SELECT code, city_name, region_name, country_name, country_code, enabled, trashed \
             FROM locations WHERE code = $1 AND trashed = FALSE",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| WeatherError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(row.map(|r| r.into()))
    }

    #[instrument(skip(self))]
    async fn find_location_by_city(&self, key: &CityKey) -> WeatherResult<Option<Location>> {
        let row = sqlx::query_as::<_, LocationRow>(
            "SELECT code, city_name, region_name, country_name, country_code, enabled, trashed \
             FROM locations \
             WHERE country_code = $1 AND city_name = $2 AND trashed = FALSE \
             ORDER BY code LIMIT 1",
        )
        .bind(&key.country_code)
        .bind(&key.city_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| WeatherError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(row.map(|r| r.into()))
    }

    #[instrument(skip(self, location), fields(code = %location.code))]
    async fn update_location(&self, location: &Location) -> WeatherResult<Location> {
        let row = sqlx::query_as::<_, LocationRow>(
            r#"
            UPDATE locations SET
                city_name = $2,
                region_name = $3,
                country_name = $4,
                country_code = $5,
                enabled = $6
            WHERE code = $1 AND trashed = FALSE
            RETURNING code, city_name, region_name, country_name, country_code, enabled, trashed
            "#,
        )
        .bind(&location.code)
        .bind(&location.city_name)
        .bind(&location.region_name)
        .bind(&location.country_name)
        .bind(&location.country_code)
        .bind(location.enabled)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| WeatherError::DatabaseError(format!("Update failed: {}", e)))?;

        row.map(Location::from)
            .ok_or_else(|| WeatherError::unknown_location(&location.code))
    }

    #[instrument(skip(self))]
    async fn trash_location(&self, code: &str) -> WeatherResult<()> {
        let result =
            sqlx::query("UPDATE locations SET trashed = TRUE WHERE code = $1 AND trashed = FALSE")
                .bind(code)
                .execute(&self.pool)
                .await
                .map_err(|e| WeatherError::DatabaseError(format!("Update failed: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(WeatherError::unknown_location(code));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_realtime(&self, code: &str) -> WeatherResult<Option<RealtimeWeather>> {
        let row = sqlx::query_as::<_, RealtimeRow>(
            "SELECT r.location_code, r.temperature, r.humidity, r.precipitation, \
             r.wind_speed, r.status, r.last_updated \
             FROM realtime_weather r JOIN locations l ON l.code = r.location_code \
             WHERE r.location_code = $1 AND l.trashed = FALSE",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| WeatherError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(row.map(|r| r.into()))
    }

    #[instrument(skip(self))]
    async fn find_realtime_by_city(
        &self,
        key: &CityKey,
    ) -> WeatherResult<Option<(Location, RealtimeWeather)>> {
        let Some(location) = self.find_location_by_city(key).await? else {
            return Ok(None);
        };
        let weather = self.find_realtime(&location.code).await?;
        Ok(weather.map(|w| (location, w)))
    }

    #[instrument(skip(self, weather), fields(code = %weather.location_code))]
    async fn save_realtime(&self, weather: &RealtimeWeather) -> WeatherResult<RealtimeWeather> {
        let mut tx = self.begin().await?;
        lock_location(&mut tx, &weather.location_code).await?;
        upsert_realtime(&mut tx, weather).await?;
        commit(tx).await?;

        Ok(weather.clone())
    }

    #[instrument(skip(self))]
    async fn list_hourly(&self, code: &str) -> WeatherResult<Vec<HourlyWeather>> {
        self.list_hourly_after(code, -1).await
    }

    #[instrument(skip(self))]
    async fn list_hourly_after(
        &self,
        code: &str,
        current_hour: i32,
    ) -> WeatherResult<Vec<HourlyWeather>> {
        let rows = sqlx::query_as::<_, HourlyRow>(
            "SELECT h.location_code, h.hour_of_day, h.temperature, h.precipitation, h.status \
             FROM weather_hourly h JOIN locations l ON l.code = h.location_code \
             WHERE h.location_code = $1 AND h.hour_of_day > $2 AND l.trashed = FALSE \
             ORDER BY h.hour_of_day",
        )
        .bind(code)
        .bind(current_hour)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| WeatherError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn replace_hourly(
        &self,
        code: &str,
        records: Vec<HourlyWeather>,
    ) -> WeatherResult<Vec<HourlyWeather>> {
        let mut tx = self.begin().await?;
        lock_location(&mut tx, code).await?;
        let hourly = apply_hourly(&mut tx, code, records).await?;
        commit(tx).await?;

        Ok(hourly)
    }

    #[instrument(skip(self))]
    async fn list_daily(&self, code: &str) -> WeatherResult<Vec<DailyWeather>> {
        let rows = sqlx::query_as::<_, DailyRow>(
            "SELECT d.location_code, d.day_of_month, d.month, d.min_temp, d.max_temp, \
             d.precipitation, d.status \
             FROM weather_daily d JOIN locations l ON l.code = d.location_code \
             WHERE d.location_code = $1 AND l.trashed = FALSE \
             ORDER BY d.month, d.day_of_month",
        )
        .bind(code)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| WeatherError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn replace_daily(
        &self,
        code: &str,
        records: Vec<DailyWeather>,
    ) -> WeatherResult<Vec<DailyWeather>> {
        let mut tx = self.begin().await?;
        lock_location(&mut tx, code).await?;
        let daily = apply_daily(&mut tx, code, records).await?;
        commit(tx).await?;

        Ok(daily)
    }

    #[instrument(skip(self, update))]
    async fn replace_full(
        &self,
        code: &str,
        mut update: FullWeatherUpdate,
    ) -> WeatherResult<FullWeather> {
        update.assign_location(code);

        let mut tx = self.begin().await?;
        let location = lock_location(&mut tx, code).await?;
        upsert_realtime(&mut tx, &update.realtime).await?;
        let hourly = apply_hourly(&mut tx, code, update.hourly).await?;
        let daily = apply_daily(&mut tx, code, update.daily).await?;
        commit(tx).await?;

        Ok(FullWeather {
            location,
            realtime: Some(update.realtime),
            hourly,
            daily,
        })
    }
}

// Internal row types for SQLx

#[derive(FromRow)]
struct LocationRow {
    code: String,
    city_name: String,
    region_name: String,
    country_name: String,
    country_code: String,
    enabled: bool,
    trashed: bool,
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Location {
            code: row.code,
            city_name: row.city_name,
            region_name: row.region_name,
            country_name: row.country_name,
            country_code: row.country_code,
            enabled: row.enabled,
            trashed: row.trashed,
        }
    }
}

#[derive(FromRow)]
struct RealtimeRow {
    location_code: String,
    temperature: i32,
    humidity: i32,
    precipitation: i32,
    wind_speed: i32,
    status: String,
    last_updated: DateTime<Utc>,
}

impl From<RealtimeRow> for RealtimeWeather {
    fn from(row: RealtimeRow) -> Self {
        RealtimeWeather {
            location_code: row.location_code,
            temperature: row.temperature,
            humidity: row.humidity,
            precipitation: row.precipitation,
            wind_speed: row.wind_speed,
            status: row.status,
            last_updated: row.last_updated,
        }
    }
}

#[derive(FromRow)]
struct HourlyRow {
    location_code: String,
    hour_of_day: i32,
    temperature: i32,
    precipitation: i32,
    status: String,
}

impl From<HourlyRow> for HourlyWeather {
    fn from(row: HourlyRow) -> Self {
        HourlyWeather {
            location_code: row.location_code,
            hour_of_day: row.hour_of_day,
            temperature: row.temperature,
            precipitation: row.precipitation,
            status: row.status,
        }
    }
}

#[derive(FromRow)]
struct DailyRow {
    location_code: String,
    day_of_month: i32,
    month: i32,
    min_temp: i32,
    max_temp: i32,
    precipitation: i32,
    status: String,
}

impl From<DailyRow> for DailyWeather {
    fn from(row: DailyRow) -> Self {
        DailyWeather {
            location_code: row.location_code,
            day_of_month: row.day_of_month,
            month: row.month,
            min_temp: row.min_temp,
            max_temp: row.max_temp,
            precipitation: row.precipitation,
            status: row.status,
        }
    }
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS locations (
    code VARCHAR(12) PRIMARY KEY,
    city_name VARCHAR(128) NOT NULL,
    region_name VARCHAR(128) NOT NULL DEFAULT '',
    country_name VARCHAR(64) NOT NULL,
    country_code VARCHAR(2) NOT NULL,
    enabled BOOLEAN NOT NULL DEFAULT TRUE,
    trashed BOOLEAN NOT NULL DEFAULT FALSE
);

CREATE INDEX IF NOT EXISTS idx_locations_city ON locations(country_code, city_name);

CREATE TABLE IF NOT EXISTS realtime_weather (
    location_code VARCHAR(12) PRIMARY KEY REFERENCES locations(code),
    temperature INTEGER NOT NULL,
    humidity INTEGER NOT NULL,
    precipitation INTEGER NOT NULL,
    wind_speed INTEGER NOT NULL,
    status VARCHAR(50) NOT NULL,
    last_updated TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS weather_hourly (
    location_code VARCHAR(12) NOT NULL REFERENCES locations(code),
    hour_of_day INTEGER NOT NULL,
    temperature INTEGER NOT NULL,
    precipitation INTEGER NOT NULL,
    status VARCHAR(50) NOT NULL,
    PRIMARY KEY (location_code, hour_of_day)
);

CREATE TABLE IF NOT EXISTS weather_daily (
    location_code VARCHAR(12) NOT NULL REFERENCES locations(code),
    day_of_month INTEGER NOT NULL,
    month INTEGER NOT NULL,
    min_temp INTEGER NOT NULL,
    max_temp INTEGER NOT NULL,
    precipitation INTEGER NOT NULL,
    status VARCHAR(50) NOT NULL,
    PRIMARY KEY (location_code, day_of_month, month)
)
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_split_cleanly() {
        let statements: Vec<&str> = SCHEMA_SQL
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        assert_eq!(statements.len(), 5);
        assert!(statements.iter().all(|s| s.starts_with("CREATE")));
    }
}
