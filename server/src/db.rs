use shared::protocol::{ResultRecord, StatsSummary};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::sync::RwLock;

/// Connect to Postgres using the provided DATABASE_URL.
pub async fn connect(url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(url)
        .await?;
    // Ensure table exists
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS results (
            id SERIAL PRIMARY KEY,
            wpm BIGINT NOT NULL,
            accuracy BIGINT NOT NULL,
            cpm BIGINT NOT NULL,
            total_chars BIGINT NOT NULL,
            duration BIGINT NOT NULL,
            timestamp TEXT NOT NULL,
            ip_address TEXT
        )
        "#,
    )
    .execute(&pool)
    .await?;
    Ok(pool)
}

/// Where saved results go: Postgres when configured, otherwise process memory.
///
/// Only Postgres records the client address; the memory store keeps results.
pub enum Store {
    Postgres(PgPool),
    Memory(RwLock<Vec<ResultRecord>>),
}

type ResultRow = (i64, i64, i64, i64, i64, String);

fn to_u32(v: i64) -> u32 {
    u32::try_from(v).unwrap_or_default()
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

impl Store {
    pub fn memory() -> Self {
        Store::Memory(RwLock::new(Vec::new()))
    }

    pub async fn insert(&self, record: &ResultRecord, ip_address: Option<String>) -> anyhow::Result<()> {
        match self {
            Store::Postgres(pool) => {
                sqlx::query(
                    "INSERT INTO results (wpm, accuracy, cpm, total_chars, duration, timestamp, ip_address)
                     VALUES ($1, $2, $3, $4, $5, $6, $7)",
                )
                .bind(i64::from(record.wpm))
                .bind(i64::from(record.accuracy))
                .bind(i64::from(record.cpm))
                .bind(record.total_chars as i64)
                .bind(i64::from(record.duration))
                .bind(&record.timestamp)
                .bind(ip_address)
                .execute(pool)
                .await?;
            }
            Store::Memory(results) => {
                results.write().await.push(record.clone());
            }
        }
        Ok(())
    }

    /// Best results first.
    pub async fn leaderboard(&self, limit: usize) -> anyhow::Result<Vec<ResultRecord>> {
        match self {
            Store::Postgres(pool) => {
                let rows = sqlx::query_as::<_, ResultRow>(
                    "SELECT wpm, accuracy, cpm, total_chars, duration, timestamp
                     FROM results
                     ORDER BY wpm DESC
                     LIMIT $1",
                )
                .bind(limit as i64)
                .fetch_all(pool)
                .await?;
                Ok(rows
                    .into_iter()
                    .map(|(wpm, accuracy, cpm, total_chars, duration, timestamp)| ResultRecord {
                        wpm: to_u32(wpm),
                        accuracy: to_u32(accuracy),
                        cpm: to_u32(cpm),
                        total_chars: usize::try_from(total_chars).unwrap_or_default(),
                        duration: to_u32(duration),
                        timestamp,
                    })
                    .collect())
            }
            Store::Memory(results) => {
                let mut records = results.read().await.clone();
                records.sort_by(|a, b| b.wpm.cmp(&a.wpm));
                records.truncate(limit);
                Ok(records)
            }
        }
    }

    pub async fn stats(&self) -> anyhow::Result<StatsSummary> {
        let (total_tests, avg_wpm, max_wpm, avg_accuracy) = match self {
            Store::Postgres(pool) => {
                sqlx::query_as::<_, (i64, Option<f64>, Option<i64>, Option<f64>)>(
                    "SELECT COUNT(*), AVG(wpm)::FLOAT8, MAX(wpm), AVG(accuracy)::FLOAT8 FROM results",
                )
                .fetch_one(pool)
                .await?
            }
            Store::Memory(results) => {
                let results = results.read().await;
                let n = results.len();
                let mean = |f: fn(&ResultRecord) -> u32| {
                    (n > 0).then(|| {
                        results.iter().map(|r| f64::from(f(r))).sum::<f64>() / n as f64
                    })
                };
                (
                    n as i64,
                    mean(|r| r.wpm),
                    results.iter().map(|r| i64::from(r.wpm)).max(),
                    mean(|r| r.accuracy),
                )
            }
        };

        Ok(StatsSummary {
            total_tests,
            avg_wpm: round1(avg_wpm.unwrap_or(0.0)),
            max_wpm: max_wpm.unwrap_or(0),
            avg_accuracy: round1(avg_accuracy.unwrap_or(0.0)),
        })
    }
}
