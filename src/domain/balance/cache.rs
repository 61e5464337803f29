use {
    super::{AggregatedBalances, Aggregator},
    crate::{domain::eth, infra::metrics},
    moka::ops::compute::{CompResult, Op},
    std::{
        sync::{
            Arc,
            atomic::{self, AtomicU64},
        },
        time::Duration,
    },
    tokio::time::Instant,
};

#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// How long a snapshot is served before the balances get fetched again.
    pub ttl: Duration,
    /// Coalesce concurrent misses for the same address into a single fetch.
    /// Otherwise every overlapping miss fetches and the last one to finish
    /// wins.
    pub single_flight: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30),
            single_flight: false,
        }
    }
}

#[derive(Clone, Debug)]
struct Record {
    snapshot: Arc<AggregatedBalances>,
    captured_at: Instant,
}

impl Record {
    fn new(snapshot: AggregatedBalances) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
            captured_at: Instant::now(),
        }
    }
}

/// Per address balance snapshots. Snapshots are checked for staleness when
/// they are read, nothing is refreshed in the background.
pub struct Cache {
    aggregator: Aggregator,
    records: moka::future::Cache<eth::Address, Record>,
    /// Bumped on every invalidation of an address. A fetch only stores its
    /// snapshot if the generation is unchanged since it started.
    generations: moka::future::Cache<eth::Address, Arc<AtomicU64>>,
    config: Config,
}

impl Cache {
    pub fn new(aggregator: Aggregator, config: Config) -> Self {
        Self {
            aggregator,
            records: moka::future::Cache::builder().build(),
            generations: moka::future::Cache::builder().build(),
            config,
        }
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Returns the cached snapshot for `owner` if it is younger than the TTL
    /// and fetches a new one otherwise. Snapshots containing failed entries
    /// are cached like any other.
    pub async fn get_or_fetch(&self, owner: eth::Address) -> Arc<AggregatedBalances> {
        if self.config.single_flight {
            return self.get_or_fetch_coalesced(owner).await;
        }

        if let Some(record) = self.records.get(&owner).await {
            if self.is_fresh(&record) {
                metrics::cache_hit();
                return record.snapshot;
            }
        }

        metrics::cache_miss();
        let generation = self.generation(owner).await;
        let started = generation.load(atomic::Ordering::SeqCst);
        let record = Record::new(self.aggregator.fetch_all_balances(owner).await);
        let snapshot = record.snapshot.clone();
        // Storing goes through the same per key lock as `invalidate`.
        self.records
            .entry(owner)
            .and_compute_with(|_| async move {
                if generation.load(atomic::Ordering::SeqCst) == started {
                    Op::Put(record)
                } else {
                    tracing::debug!(%owner, "dropping balances fetched before invalidation");
                    Op::Nop
                }
            })
            .await;
        snapshot
    }

    async fn get_or_fetch_coalesced(&self, owner: eth::Address) -> Arc<AggregatedBalances> {
        let result = self
            .records
            .entry(owner)
            .and_compute_with(|current| async move {
                match current {
                    Some(entry) if self.is_fresh(entry.value()) => Op::Nop,
                    _ => Op::Put(Record::new(self.aggregator.fetch_all_balances(owner).await)),
                }
            })
            .await;

        match result {
            CompResult::Unchanged(entry) => {
                metrics::cache_hit();
                entry.into_value().snapshot
            }
            CompResult::Inserted(entry) | CompResult::ReplacedWith(entry) => {
                metrics::cache_miss();
                entry.into_value().snapshot
            }
            // The computation always puts or keeps a record.
            CompResult::Removed(_) | CompResult::StillNone(_) => {
                metrics::cache_miss();
                Arc::new(self.aggregator.fetch_all_balances(owner).await)
            }
        }
    }

    /// Drops the snapshot of `owner`, the next read fetches. Fetches that are
    /// in flight while invalidating don't store their results.
    pub async fn invalidate(&self, owner: eth::Address) {
        let generation = self.generation(owner).await;
        self.records
            .entry(owner)
            .and_compute_with(|_| async move {
                generation.fetch_add(1, atomic::Ordering::SeqCst);
                Op::Remove
            })
            .await;
        tracing::debug!(%owner, "invalidated balances");
    }

    async fn generation(&self, owner: eth::Address) -> Arc<AtomicU64> {
        self.generations.get_with(owner, async { Arc::default() }).await
    }

    fn is_fresh(&self, record: &Record) -> bool {
        record.captured_at.elapsed() < self.config.ttl
    }
}
