//! End-to-end acquisition runs against an in-memory file server.

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use ultralaunch::core::acquire::Orchestrator;
use ultralaunch::core::config::{GameLayout, LauncherConfig, LoaderConfig};
use ultralaunch::core::downloader::Fetcher;
use ultralaunch::core::error::{LauncherError, LauncherResult};
use ultralaunch::core::events::{AcquireEvent, EventSink, Stage};
use ultralaunch::core::launch::plan_launch;
use ultralaunch::core::version::{OsFamily, Platform};

const DETAIL_URL: &str = "mem://versions/1.8.9.json";
const CLIENT_URL: &str = "mem://client.jar";
const INDEX_URL: &str = "mem://indexes/1.8.json";
const LWJGL_URL: &str = "mem://libs/org/lwjgl/lwjgl/lwjgl/2.9.4/lwjgl-2.9.4.jar";
const TOOL_URL: &str = "mem://libs/com/example/tool/1.0/tool-1.0.jar";

const HASH_A: &str = "aa11111111111111111111111111111111111111";
const HASH_B: &str = "bb22222222222222222222222222222222222222";
const HASH_C: &str = "cc33333333333333333333333333333333333333";

/// Serves registered bodies and records every URL it was asked for.
#[derive(Default)]
struct MemoryFetcher {
    files: Mutex<HashMap<String, Vec<u8>>>,
    requests: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    fn serve(&self, url: &str, body: impl Into<Vec<u8>>) {
        self.files.lock().unwrap().insert(url.to_string(), body.into());
    }

    fn serve_json(&self, url: &str, value: serde_json::Value) {
        self.serve(url, serde_json::to_vec(&value).unwrap());
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn reset_requests(&self) {
        self.requests.lock().unwrap().clear();
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch(&self, url: &str, dest: &Path, _events: &EventSink) -> LauncherResult<()> {
        self.requests.lock().unwrap().push(url.to_string());
        let body = self.files.lock().unwrap().get(url).cloned();
        let Some(body) = body else {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: 404,
            });
        };
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, body).await?;
        Ok(())
    }
}

fn base_config(root: &Path) -> LauncherConfig {
    LauncherConfig {
        version: "1.8.9".into(),
        custom_version_url: Some(DETAIL_URL.into()),
        game_directory: root.to_path_buf(),
        parallel_downloads: 2,
        max_tries: 2,
        retry_delay_ms: 0,
        libraries_base_url: "mem://libs/".into(),
        assets_base_url: "mem://resources".into(),
        ..LauncherConfig::default()
    }
}

fn object_url(hash: &str) -> String {
    format!("mem://resources/{}/{}", &hash[..2], hash)
}

/// A vanilla-shaped version with three assets and two Linux libraries, one
/// of which has no download block.
fn vanilla_detail() -> serde_json::Value {
    json!({
        "id": "1.8.9",
        "type": "release",
        "mainClass": "net.minecraft.client.main.Main",
        "minecraftArguments": "--username ${auth_player_name} --version ${version_name} --assetIndex ${assets_index_name}",
        "downloads": { "client": { "url": CLIENT_URL } },
        "assetIndex": { "id": "1.8", "url": INDEX_URL },
        "libraries": [
            {
                "name": "org.lwjgl.lwjgl:lwjgl:2.9.4",
                "downloads": {
                    "artifact": {
                        "path": "org/lwjgl/lwjgl/lwjgl/2.9.4/lwjgl-2.9.4.jar",
                        "url": LWJGL_URL
                    }
                }
            },
            { "name": "com.example:tool:1.0" },
            {
                "name": "ca.weblite:java-objc-bridge:1.0.0",
                "rules": [{ "action": "allow", "os": { "name": "osx" } }],
                "downloads": {
                    "artifact": {
                        "path": "ca/weblite/java-objc-bridge/1.0.0/java-objc-bridge-1.0.0.jar",
                        "url": "mem://never-requested.jar"
                    }
                }
            }
        ]
    })
}

fn serve_vanilla(fetcher: &MemoryFetcher) {
    fetcher.serve_json(DETAIL_URL, vanilla_detail());
    fetcher.serve_json(
        INDEX_URL,
        json!({
            "objects": {
                "icons/a.png": { "hash": HASH_A, "size": 1 },
                "icons/b.png": { "hash": HASH_B, "size": 1 },
                "sounds/c.ogg": { "hash": HASH_C, "size": 1 }
            }
        }),
    );
    fetcher.serve(CLIENT_URL, b"client".to_vec());
    fetcher.serve(LWJGL_URL, b"lwjgl".to_vec());
    fetcher.serve(TOOL_URL, b"tool".to_vec());
    for hash in [HASH_A, HASH_B, HASH_C] {
        fetcher.serve(&object_url(hash), hash.as_bytes().to_vec());
    }
}

fn place_object(layout: &GameLayout, hash: &str) {
    let path = layout.object(&hash[..2], hash);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, hash).unwrap();
}

fn orchestrator(config: LauncherConfig, fetcher: &Arc<MemoryFetcher>, events: EventSink) -> Orchestrator {
    Orchestrator::new(config, fetcher.clone(), events)
        .with_platform(Platform::new(OsFamily::Linux, "x86_64"))
}

fn asset_progress(rx: &mut tokio::sync::mpsc::UnboundedReceiver<AcquireEvent>) -> Vec<(usize, usize)> {
    let mut seen = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let AcquireEvent::StageProgress {
            stage: Stage::Assets,
            total,
            current,
        } = event
        {
            seen.push((total, current));
        }
    }
    seen
}

#[tokio::test]
async fn fetches_only_missing_files_and_reports_progress() {
    let dir = tempfile::tempdir().unwrap();
    let config = base_config(dir.path());
    let layout = config.layout();
    let fetcher = Arc::new(MemoryFetcher::default());
    serve_vanilla(&fetcher);
    place_object(&layout, HASH_A);
    place_object(&layout, HASH_B);

    let (events, mut rx) = EventSink::channel();
    let acquisition = orchestrator(config, &fetcher, events).acquire().await.unwrap();

    let requests = fetcher.requests();
    let object_requests: Vec<&String> = requests
        .iter()
        .filter(|url| url.starts_with("mem://resources/"))
        .collect();
    assert_eq!(object_requests, vec![&object_url(HASH_C)]);
    assert!(requests.contains(&TOOL_URL.to_string()));
    assert!(!requests.iter().any(|url| url.contains("never-requested")));

    assert_eq!(asset_progress(&mut rx).last(), Some(&(3, 1)));

    let report = &acquisition.report;
    assert!(report.is_complete());
    let assets = report.stage(Stage::Assets).unwrap();
    assert_eq!((assets.total, assets.skipped, assets.fetched), (3, 2, 1));
    let libraries = report.stage(Stage::Libraries).unwrap();
    assert_eq!((libraries.total, libraries.fetched), (2, 2));

    assert_eq!(acquisition.critical_jar, layout.version_jar("1.8.9"));
    assert_eq!(std::fs::read(&acquisition.critical_jar).unwrap(), b"client");
    assert_eq!(
        std::fs::read(layout.object("cc", HASH_C)).unwrap(),
        HASH_C.as_bytes()
    );
    assert!(layout.library("com/example/tool/1.0/tool-1.0.jar").is_file());
}

#[tokio::test]
async fn second_run_downloads_nothing_but_documents() {
    let dir = tempfile::tempdir().unwrap();
    let config = base_config(dir.path());
    let fetcher = Arc::new(MemoryFetcher::default());
    serve_vanilla(&fetcher);

    orchestrator(config.clone(), &fetcher, EventSink::disabled())
        .acquire()
        .await
        .unwrap();
    fetcher.reset_requests();

    let again = orchestrator(config, &fetcher, EventSink::disabled())
        .acquire()
        .await
        .unwrap();

    assert_eq!(fetcher.requests(), vec![DETAIL_URL.to_string(), INDEX_URL.to_string()]);
    for stage in [Stage::CriticalFile, Stage::Assets, Stage::Libraries] {
        assert_eq!(again.report.stage(stage).unwrap().fetched, 0, "{stage}");
    }
    assert!(again.report.is_complete());
}

#[tokio::test]
async fn failed_objects_are_reported_and_block_launch() {
    let dir = tempfile::tempdir().unwrap();
    let config = base_config(dir.path());
    let fetcher = Arc::new(MemoryFetcher::default());
    serve_vanilla(&fetcher);
    fetcher.files.lock().unwrap().remove(&object_url(HASH_B));

    let acquisition = orchestrator(config, &fetcher, EventSink::disabled())
        .acquire()
        .await
        .unwrap();

    let assets = acquisition.report.stage(Stage::Assets).unwrap();
    assert_eq!(assets.fetched, 2);
    assert_eq!(assets.failures.len(), 1);
    assert_eq!(assets.failures[0].label, "icons/b.png");
    assert!(matches!(
        assets.failures[0].error,
        LauncherError::RetriesExhausted { attempts: 2, .. }
    ));

    // Later stages still ran.
    assert!(acquisition.report.stage(Stage::Libraries).unwrap().is_clean());
    assert!(matches!(
        acquisition.report.ensure_complete(),
        Err(LauncherError::IncompleteAcquisition { failures: 1 })
    ));

    let retries = fetcher
        .requests()
        .iter()
        .filter(|url| **url == object_url(HASH_B))
        .count();
    assert_eq!(retries, 2);
}

#[tokio::test]
async fn missing_client_download_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = base_config(dir.path());
    let fetcher = Arc::new(MemoryFetcher::default());
    serve_vanilla(&fetcher);
    fetcher.files.lock().unwrap().remove(CLIENT_URL);

    let err = orchestrator(config, &fetcher, EventSink::disabled())
        .acquire()
        .await
        .unwrap_err();

    assert!(matches!(err, LauncherError::RetriesExhausted { .. }));
    assert!(!fetcher.requests().iter().any(|url| url == INDEX_URL));
}

#[tokio::test]
async fn remote_config_selects_loader_and_syncs_mods() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = base_config(dir.path());
    config.remote_config_url = Some("mem://remote.json".into());
    config.loader = Some(LoaderConfig {
        meta_url: "mem://fabric".into(),
        ..LoaderConfig::fabric("0.14.0")
    });
    let layout = config.layout();

    let fetcher = Arc::new(MemoryFetcher::default());
    serve_vanilla(&fetcher);
    fetcher.serve_json(
        "mem://remote.json",
        json!({
            "loader": "fabric",
            "loaderID": "0.15.0",
            "mods": [
                { "name": "Sodium", "filename": "sodium.jar", "url": "mem://mods/sodium.jar" },
                { "name": "Escape", "filename": "../evil.jar", "url": "mem://mods/evil.jar" }
            ]
        }),
    );
    fetcher.serve_json(
        "mem://fabric/versions/loader/1.8.9/0.15.0/profile/json",
        json!({
            "id": "fabric-loader-0.15.0-1.8.9",
            "inheritsFrom": "1.8.9",
            "mainClass": "net.fabricmc.loader.impl.launch.knot.KnotClient",
            "libraries": [
                { "name": "net.fabricmc:intermediary:1.8.9", "url": "mem://fabric-maven/" }
            ]
        }),
    );
    fetcher.serve(
        "mem://fabric-maven/net/fabricmc/intermediary/1.8.9/intermediary-1.8.9.jar",
        b"intermediary".to_vec(),
    );
    fetcher.serve(
        "https://maven.fabricmc.net/net/fabricmc/fabric-loader/0.15.0/fabric-loader-0.15.0.jar",
        b"loader".to_vec(),
    );
    fetcher.serve("mem://mods/sodium.jar", b"sodium".to_vec());

    std::fs::create_dir_all(layout.mods_dir()).unwrap();
    std::fs::write(layout.mods_dir().join("stale.jar"), b"old").unwrap();
    std::fs::write(layout.mods_dir().join("mine.custom.jar"), b"mine").unwrap();

    let acquisition = orchestrator(config.clone(), &fetcher, EventSink::disabled())
        .acquire()
        .await
        .unwrap();

    assert_eq!(
        acquisition.manifest.main_class,
        "net.fabricmc.loader.impl.launch.knot.KnotClient"
    );
    assert!(layout.loader_json("1.8.9", "0.15.0").is_file());
    assert!(layout
        .library("net/fabricmc/fabric-loader/0.15.0/fabric-loader-0.15.0.jar")
        .is_file());

    let mods = acquisition.report.stage(Stage::Mods).unwrap();
    assert_eq!(mods.fetched, 1);
    assert_eq!(mods.failures.len(), 1);
    assert_eq!(mods.failures[0].label, "Escape");
    assert!(layout.mods_dir().join("sodium.jar").is_file());
    assert!(!layout.mods_dir().join("stale.jar").exists());
    assert!(layout.mods_dir().join("mine.custom.jar").is_file());
    assert!(!dir.path().join("evil.jar").exists());

    // The launch line is built from the merged manifest.
    let plan = plan_launch(&config, &acquisition, &Platform::new(OsFamily::Linux, "x86_64"));
    let main_at = plan
        .args
        .iter()
        .position(|arg| arg == "net.fabricmc.loader.impl.launch.knot.KnotClient")
        .unwrap();
    let classpath = &plan.args[main_at - 1];
    assert!(classpath.contains("intermediary-1.8.9.jar"));
    assert!(classpath.ends_with("1.8.9.jar"));
    assert_eq!(
        &plan.args[main_at + 1..main_at + 5],
        &["--username", "steve", "--version", "1.8.9"]
    );
}

fn natives_jar(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in entries {
        zip.start_file(*name, zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(body).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

#[tokio::test]
async fn native_classifier_is_downloaded_and_extracted_into_bin() {
    let dir = tempfile::tempdir().unwrap();
    let config = base_config(dir.path());
    let layout = config.layout();
    let fetcher = Arc::new(MemoryFetcher::default());
    serve_vanilla(&fetcher);

    let mut detail = vanilla_detail();
    detail["libraries"].as_array_mut().unwrap().push(json!({
        "name": "org.lwjgl.lwjgl:lwjgl-platform:2.9.4",
        "natives": { "linux": "natives-linux", "windows": "natives-windows-${arch}" },
        "extract": { "exclude": ["docs/"] },
        "downloads": {
            "classifiers": {
                "natives-linux": {
                    "path": "org/lwjgl/lwjgl/lwjgl-platform/2.9.4/lwjgl-platform-2.9.4-natives-linux.jar",
                    "url": "mem://natives-linux.jar"
                },
                "natives-windows-64": {
                    "path": "org/lwjgl/lwjgl/lwjgl-platform/2.9.4/lwjgl-platform-2.9.4-natives-windows-64.jar",
                    "url": "mem://natives-windows.jar"
                }
            }
        }
    }));
    fetcher.serve_json(DETAIL_URL, detail);
    fetcher.serve(
        "mem://natives-linux.jar",
        natives_jar(&[
            ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0"),
            ("liblwjgl.so", b"elf"),
            ("docs/readme.txt", b"skip"),
            ("libopenal.so", b"elf2"),
        ]),
    );

    let (events, mut rx) = EventSink::channel();
    let acquisition = orchestrator(config, &fetcher, events).acquire().await.unwrap();

    let libraries = acquisition.report.stage(Stage::Libraries).unwrap();
    assert_eq!((libraries.total, libraries.fetched), (3, 3));
    assert!(libraries.is_clean());

    let requests = fetcher.requests();
    assert!(requests.contains(&"mem://natives-linux.jar".to_string()));
    assert!(!requests.contains(&"mem://natives-windows.jar".to_string()));
    assert!(!requests
        .iter()
        .any(|url| url.ends_with("lwjgl-platform-2.9.4.jar")));
    assert!(layout
        .library("org/lwjgl/lwjgl/lwjgl-platform/2.9.4/lwjgl-platform-2.9.4-natives-linux.jar")
        .is_file());

    let bin = layout.natives_dir();
    assert_eq!(std::fs::read(bin.join("liblwjgl.so")).unwrap(), b"elf");
    assert_eq!(std::fs::read(bin.join("libopenal.so")).unwrap(), b"elf2");
    assert!(!bin.join("META-INF").exists());
    assert!(!bin.join("docs").exists());

    let mut extracted = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let AcquireEvent::Extracting { entry, .. } = event {
            extracted.push(entry);
        }
    }
    assert_eq!(extracted, vec!["liblwjgl.so", "libopenal.so"]);
}

#[tokio::test]
async fn file_in_place_of_a_shard_directory_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = base_config(dir.path());
    let layout = config.layout();
    let fetcher = Arc::new(MemoryFetcher::default());
    serve_vanilla(&fetcher);

    std::fs::create_dir_all(layout.objects_dir()).unwrap();
    std::fs::write(layout.object_shard_dir("bb"), b"not a directory").unwrap();

    let err = orchestrator(config, &fetcher, EventSink::disabled())
        .acquire()
        .await
        .unwrap_err();

    match err {
        LauncherError::WrongEntryType { path, expected } => {
            assert_eq!(path, layout.object_shard_dir("bb"));
            assert_eq!(expected, "directory");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!fetcher
        .requests()
        .iter()
        .any(|url| url.starts_with("mem://resources/")));
}

#[tokio::test]
async fn empty_remote_mod_list_prunes_the_mods_directory() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = base_config(dir.path());
    config.remote_config_url = Some("mem://remote.json".into());
    let layout = config.layout();

    let fetcher = Arc::new(MemoryFetcher::default());
    serve_vanilla(&fetcher);
    fetcher.serve_json("mem://remote.json", json!({ "mods": [] }));

    std::fs::create_dir_all(layout.mods_dir()).unwrap();
    std::fs::write(layout.mods_dir().join("stale.jar"), b"old").unwrap();
    std::fs::write(layout.mods_dir().join("off.jar.disabled"), b"off").unwrap();

    let acquisition = orchestrator(config, &fetcher, EventSink::disabled())
        .acquire()
        .await
        .unwrap();

    let mods = acquisition.report.stage(Stage::Mods).unwrap();
    assert_eq!((mods.total, mods.fetched), (0, 0));
    assert!(!layout.mods_dir().join("stale.jar").exists());
    assert!(layout.mods_dir().join("off.jar.disabled").is_file());
}

#[tokio::test]
async fn remote_config_without_mods_leaves_the_directory_alone() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = base_config(dir.path());
    config.remote_config_url = Some("mem://remote.json".into());
    let layout = config.layout();

    let fetcher = Arc::new(MemoryFetcher::default());
    serve_vanilla(&fetcher);
    fetcher.serve_json("mem://remote.json", json!({}));

    std::fs::create_dir_all(layout.mods_dir()).unwrap();
    std::fs::write(layout.mods_dir().join("mine.jar"), b"mine").unwrap();

    let acquisition = orchestrator(config, &fetcher, EventSink::disabled())
        .acquire()
        .await
        .unwrap();

    assert!(acquisition.report.stage(Stage::Mods).is_none());
    assert!(layout.mods_dir().join("mine.jar").is_file());
}
