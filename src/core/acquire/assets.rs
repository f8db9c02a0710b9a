use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::future::try_join_all;
use tracing::{debug, info};

use super::report::StageReport;
use super::StageContext;
use crate::core::assets::AssetIndex;
use crate::core::config::{ensure_dir, probe_file};
use crate::core::error::LauncherResult;
use crate::core::events::Stage;
use crate::core::pool::WorkerPool;

/// Create every shard directory the index references, concurrently and
/// outside the pool. A file sitting where a shard should be is fatal.
async fn prepare_shards(ctx: &StageContext, index: &AssetIndex) -> LauncherResult<()> {
    let shards = index.shards();
    debug!("Creating {} asset shard directories", shards.len());
    try_join_all(shards.into_iter().map(|shard| {
        let dir = ctx.layout.object_shard_dir(shard);
        async move { ensure_dir(&dir).await }
    }))
    .await?;
    Ok(())
}

/// Fetch every object of `index` that is not already on disk.
///
/// Progress is `(total objects, objects downloaded so far)`, emitted once up
/// front and after each successful download.
pub(crate) async fn download_assets(
    ctx: &StageContext,
    index: &AssetIndex,
    base_url: &str,
) -> LauncherResult<StageReport> {
    let total = index.objects.len();
    let mut report = StageReport::new(Stage::Assets, total);

    prepare_shards(ctx, index).await?;
    ctx.events.progress(Stage::Assets, total, 0);

    let mut pool = WorkerPool::new(ctx.capacity);
    let completed = Arc::new(AtomicUsize::new(0));
    let mut submitted = 0;

    for (name, object) in index.sorted_objects() {
        let dest = ctx.layout.object(object.shard(), &object.hash);
        if probe_file(&dest).await? {
            report.skipped += 1;
            continue;
        }

        let url = object.url(base_url);
        let transport = ctx.transport.clone();
        let events = ctx.events.clone();
        let completed = Arc::clone(&completed);

        pool.submit(name, async move {
            transport.download(&url, &dest).await?;
            let current = completed.fetch_add(1, Ordering::SeqCst) + 1;
            events.progress(Stage::Assets, total, current);
            Ok(())
        })
        .await?;
        submitted += 1;
    }

    info!(
        "Queued {} asset objects ({} already present) on {} slots",
        submitted,
        report.skipped,
        pool.capacity()
    );
    pool.join().await;
    report.settle(submitted, pool.drain_failures());
    Ok(report)
}
