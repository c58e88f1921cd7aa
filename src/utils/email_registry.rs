use std::sync::RwLock;
use std::time::Duration;

use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures_util::StreamExt;
use moka::future::Cache;
use sqlx::MySqlPool;
use tracing::info;

use crate::error::AppResult;
use crate::repository::EmployeeRepository;

/// Expected capacity and false-positive rate.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

const CACHE_CAPACITY: u64 = 50_000;
const CACHE_TTL: Duration = Duration::from_secs(86_400);

#[inline]
fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Answers "is this email already registered?" without touching the
/// database in the common cases.
///
/// 1. cuckoo filter: a miss means the email is certainly free
/// 2. moka cache: a hit means it is certainly taken
/// 3. otherwise ask the repository
pub struct EmailRegistry {
    filter: RwLock<CuckooFilter<String>>,
    taken: Cache<String, bool>,
}

impl Default for EmailRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EmailRegistry {
    pub fn new() -> Self {
        Self {
            filter: RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)),
            taken: Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(CACHE_TTL)
                .build(),
        }
    }

    /// False positives possible. A poisoned filter answers "maybe".
    pub fn might_exist(&self, email: &str) -> bool {
        let email = normalize(email);
        self.filter
            .read()
            .map(|filter| filter.contains(&email))
            .unwrap_or(true)
    }

    pub async fn is_taken_cached(&self, email: &str) -> bool {
        self.taken.get(&normalize(email)).await.unwrap_or(false)
    }

    pub async fn mark_taken(&self, email: &str) {
        let email = normalize(email);
        if let Ok(mut filter) = self.filter.write() {
            filter.add(&email);
        }
        self.taken.insert(email, true).await;
    }

    pub async fn is_available<R>(&self, email: &str, repo: &R) -> AppResult<bool>
    where
        R: EmployeeRepository + ?Sized,
    {
        if !self.might_exist(email) {
            return Ok(true);
        }

        if self.is_taken_cached(email).await {
            return Ok(false);
        }

        let exists = repo.email_exists(&normalize(email)).await?;
        if exists {
            self.taken.insert(normalize(email), true).await;
        }
        Ok(!exists)
    }

    /// Streams every registered email into the filter.
    pub async fn warmup_filter(&self, pool: &MySqlPool, batch_size: usize) -> Result<()> {
        let mut stream = sqlx::query_as::<_, (String,)>("SELECT email FROM employees").fetch(pool);

        let mut batch = Vec::with_capacity(batch_size);
        let mut total = 0usize;

        while let Some(row) = stream.next().await {
            let (email,) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;
            batch.push(normalize(&email));
            total += 1;

            if batch.len() == batch_size {
                self.insert_batch(&batch)?;
                batch.clear();
            }
        }

        if !batch.is_empty() {
            self.insert_batch(&batch)?;
        }

        info!(total, "Email filter warmup complete");
        Ok(())
    }

    /// Marks emails of recently registered employees as taken in the cache.
    pub async fn warmup_cache(&self, pool: &MySqlPool, days: u32, batch_size: usize) -> Result<()> {
        let mut stream = sqlx::query_as::<_, (String,)>(
            r#"
            SELECT email
            FROM employees
            WHERE created_at >= NOW() - INTERVAL ? DAY
            ORDER BY created_at DESC
            "#,
        )
        .bind(days)
        .fetch(pool);

        let mut batch = Vec::with_capacity(batch_size);
        let mut total = 0usize;

        while let Some(row) = stream.next().await {
            let (email,) = row?;
            batch.push(normalize(&email));
            total += 1;

            if batch.len() >= batch_size {
                self.cache_batch(&batch).await;
                batch.clear();
            }
        }

        if !batch.is_empty() {
            self.cache_batch(&batch).await;
        }

        info!(total, days, "Email cache warmup complete");
        Ok(())
    }

    fn insert_batch(&self, emails: &[String]) -> Result<()> {
        let mut filter = self
            .filter
            .write()
            .map_err(|_| anyhow!("email filter poisoned"))?;

        for email in emails {
            filter.add(email);
        }
        Ok(())
    }

    async fn cache_batch(&self, emails: &[String]) {
        let inserts: Vec<_> = emails
            .iter()
            .map(|e| self.taken.insert(e.clone(), true))
            .collect();

        futures::future::join_all(inserts).await;
    }
}
