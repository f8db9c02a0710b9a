// ─── Ultralaunch Core ───
// Game file acquisition and launch.
//
// Architecture:
//   core/
//     pool         Fixed-capacity FIFO slot scheduler with failure channel
//     downloader/  Single-attempt fetchers, retry policy, archive extraction
//     events       Stage/file progress delivered over a channel
//     config/      JSON configuration + game directory layout
//     version/     Version index, version JSON, platform rules
//     maven/       Coordinate parsing for artifact synthesis
//     assets/      Asset index + content-addressed objects
//     loaders/     Overlay transform + Fabric profile source
//     mods/        Remote config + mod sync
//     acquire/     Stage orchestrator and run reports
//     auth/        Account values handed to the game
//     java/        Java binary discovery
//     launch/      Argument templating, classpath, process host

pub mod acquire;
pub mod assets;
pub mod auth;
pub mod config;
pub mod downloader;
pub mod error;
pub mod events;
pub mod http;
pub mod java;
pub mod launch;
pub mod loaders;
pub mod maven;
pub mod mods;
pub mod pool;
pub mod version;
