//! Layered Cache demo
//!
//! Composes a cache from environment variables and runs a short scripted
//! workload against it, logging what it observes.

use std::thread;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use layered_cache::{Cache, CacheBuilder, CacheConfig, ComposedCache};

const WORKERS: usize = 4;
const KEYS_PER_WORKER: usize = 25;

/// Main entry point for the demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Compose the cache chain
/// 4. Run the workload (from several threads when thread-safe)
fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "layered_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CacheConfig::from_env().context("failed to load cache configuration")?;
    info!(
        "Configuration loaded: capacity={:?}, default_ttl={:?}, flush_interval={:?}, thread_safe={}",
        config.capacity, config.default_ttl, config.flush_interval, config.thread_safe
    );

    let mut cache = CacheBuilder::from_config(config)
        .build::<String, String>()
        .context("failed to compose cache")?;
    info!("Cache composed with layers {:?}", cache.layers());

    if let Some(shared) = cache.share() {
        run_concurrent(shared)?;
    } else {
        run_sequential(&mut cache);
    }

    cache.set("temp".to_string(), "x".to_string());
    cache.set_with_ttl("blink".to_string(), "y".to_string(), Duration::ZERO);
    info!(
        "temp={:?} blink={:?} size={}",
        cache.get(&"temp".to_string()),
        cache.get(&"blink".to_string()),
        cache.size()
    );

    cache.clear();
    info!("Cache cleared, size={}", cache.size());
    Ok(())
}

fn run_sequential(cache: &mut ComposedCache<String, String>) {
    for i in 0..WORKERS * KEYS_PER_WORKER {
        cache.set(format!("key-{i}"), format!("value-{i}"));
    }
    let hits = (0..WORKERS * KEYS_PER_WORKER)
        .filter(|i| cache.contains_key(&format!("key-{i}")))
        .count();
    info!("Sequential workload done: {} of {} keys retained", hits, WORKERS * KEYS_PER_WORKER);
}

fn run_concurrent(mut cache: ComposedCache<String, String>) -> anyhow::Result<()> {
    let mut handles = Vec::with_capacity(WORKERS);
    for worker in 0..WORKERS {
        let mut cache = cache.share().context("cache chain is not thread-safe")?;
        handles.push(thread::spawn(move || {
            let mut hits = 0;
            for i in 0..KEYS_PER_WORKER {
                let key = format!("worker-{worker}-key-{i}");
                cache.set(key.clone(), format!("value-{i}"));
                if cache.get(&key).is_some() {
                    hits += 1;
                }
            }
            hits
        }));
    }

    let mut total_hits = 0;
    for handle in handles {
        match handle.join() {
            Ok(hits) => total_hits += hits,
            Err(_) => warn!("Worker thread panicked"),
        }
    }

    info!(
        "Concurrent workload done: {} read-backs hit, size={}",
        total_hits,
        cache.size()
    );
    Ok(())
}
