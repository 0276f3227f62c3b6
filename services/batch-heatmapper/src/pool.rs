//! Parallel map over input files.

use std::collections::HashMap;
use std::hash::Hash;
use std::num::NonZeroUsize;

use rayon::prelude::*;
use tracing::debug;

/// Apply `f` to every item on a dedicated pool of `workers` threads and
/// collect the returned pairs into a map.
///
/// Items run in no particular order. The first error aborts the phase and
/// is returned; results of other items are dropped. A new pool is built per
/// call so each phase runs with exactly the requested parallelism.
pub fn parallel_map<K, V, E, F>(items: &[K], workers: NonZeroUsize, f: F) -> Result<HashMap<K, V>, E>
where
    K: Eq + Hash + Send + Sync,
    V: Send,
    E: Send + From<rayon::ThreadPoolBuildError>,
    F: Fn(&K) -> Result<(K, V), E> + Send + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.get())
        .thread_name(|i| format!("heatmap-worker-{}", i))
        .build()?;

    debug!(items = items.len(), workers = workers.get(), "Starting parallel phase");
    pool.install(|| items.par_iter().map(&f).collect())
}
