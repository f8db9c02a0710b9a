use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use super::report::StageReport;
use super::StageContext;
use crate::core::config::probe_file;
use crate::core::downloader::{extract_archive, ExtractFilter};
use crate::core::error::LauncherResult;
use crate::core::events::Stage;
use crate::core::pool::WorkerPool;
use crate::core::version::{Library, VersionJson};

/// One file a library task still has to fetch.
struct PendingFile {
    url: String,
    dest: PathBuf,
}

/// The work left for one library after the skip-if-present checks.
struct LibraryJob {
    native: Option<PendingFile>,
    extract: Option<ExtractFilter>,
    artifact: Option<PendingFile>,
}

async fn pending(ctx: &StageContext, url: &str, relative: &str) -> LauncherResult<Option<PendingFile>> {
    let dest = ctx.layout.library(relative);
    if probe_file(&dest).await? {
        return Ok(None);
    }
    Ok(Some(PendingFile {
        url: url.to_string(),
        dest,
    }))
}

async fn plan_library(ctx: &StageContext, library: &Library) -> LauncherResult<LibraryJob> {
    let native = match library.native_artifact(&ctx.platform) {
        Some((key, artifact)) => {
            debug!("{} uses native classifier {}", library.name, key);
            pending(ctx, &artifact.url, &artifact.path).await?
        }
        None => None,
    };
    let artifact = match &library.downloads.artifact {
        Some(artifact) => pending(ctx, &artifact.url, &artifact.path).await?,
        None => None,
    };

    Ok(LibraryJob {
        extract: native.as_ref().and_then(|_| library.extract_filter()),
        native,
        artifact,
    })
}

/// Fetch the libraries that apply to this platform, one pool task per
/// library.
///
/// A native classifier is downloaded first and, if the library carries an
/// `extract` directive, unpacked into the shared natives directory. The plain
/// artifact follows. Either half is skipped when its file already exists.
pub(crate) async fn download_libraries(
    ctx: &StageContext,
    manifest: &VersionJson,
) -> LauncherResult<StageReport> {
    let applicable: Vec<&Library> = manifest.applicable_libraries(&ctx.platform).collect();
    debug!(
        "{} of {} libraries apply to {}",
        applicable.len(),
        manifest.libraries.len(),
        ctx.platform.os.as_str()
    );

    let total = applicable.len();
    let mut report = StageReport::new(Stage::Libraries, total);
    ctx.events.progress(Stage::Libraries, total, 0);

    let natives_dir = ctx.layout.natives_dir();
    let mut pool = WorkerPool::new(ctx.capacity);
    let completed = Arc::new(AtomicUsize::new(0));
    let mut submitted = 0;

    for library in applicable {
        let job = plan_library(ctx, library).await?;
        if job.native.is_none() && job.artifact.is_none() {
            report.skipped += 1;
            continue;
        }

        let transport = ctx.transport.clone();
        let events = ctx.events.clone();
        let completed = Arc::clone(&completed);
        let natives_dir = natives_dir.clone();

        pool.submit(library.name.as_str(), async move {
            if let Some(native) = job.native {
                transport.download(&native.url, &native.dest).await?;
                if let Some(filter) = job.extract {
                    let count =
                        extract_archive(&native.dest, &natives_dir, &filter, transport.events())
                            .await?;
                    debug!("Extracted {} entries from {:?}", count, native.dest);
                }
            }
            if let Some(artifact) = job.artifact {
                transport.download(&artifact.url, &artifact.dest).await?;
            }

            let current = completed.fetch_add(1, Ordering::SeqCst) + 1;
            events.progress(Stage::Libraries, total, current);
            Ok(())
        })
        .await?;
        submitted += 1;
    }

    info!(
        "Queued {} libraries ({} already present) on {} slots",
        submitted,
        report.skipped,
        pool.capacity()
    );
    pool.join().await;
    report.settle(submitted, pool.drain_failures());
    Ok(report)
}
