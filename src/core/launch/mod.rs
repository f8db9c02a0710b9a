pub mod arguments;
pub mod classpath;
pub mod process;

pub use arguments::{expand_game_arguments, fill_in_table, memory_flags, FillInTable};
pub use classpath::build_classpath;
pub use process::{spawn_game, LaunchPlan};

use crate::core::acquire::Acquisition;
use crate::core::auth::AccountProfile;
use crate::core::config::LauncherConfig;
use crate::core::java::guess_java_path;
use crate::core::version::Platform;

use arguments::{logging_argument, physical_memory_mb, server_arguments, LaunchArguments};

/// Turn a finished acquisition into the process the game runs as.
pub fn plan_launch(
    config: &LauncherConfig,
    acquisition: &Acquisition,
    platform: &Platform,
) -> LaunchPlan {
    let layout = config.layout();
    let manifest = &acquisition.manifest;
    let account = AccountProfile::from_config(config);

    let table = fill_in_table(config, manifest, &layout, &account);
    let game = expand_game_arguments(
        &manifest.game_argument_tokens(),
        &table,
        account.access_token.is_some(),
    );

    let mut extra_game = config.custom_game_args.clone();
    extra_game.extend(server_arguments(config));

    let natives_dir = layout.natives_dir();
    let args = LaunchArguments {
        memory: memory_flags(
            config.initial_memory_mb,
            config.max_memory_mb,
            physical_memory_mb(),
        ),
        logging: logging_argument(manifest, &layout),
        natives_dir: &natives_dir,
        extra_jvm: &config.custom_jvm_args,
        classpath: build_classpath(manifest, &layout, platform, &acquisition.critical_jar),
        main_class: &manifest.main_class,
        game,
        extra_game,
    }
    .into_vec();

    LaunchPlan {
        java: guess_java_path(config.java_path.as_deref()),
        args,
        working_dir: layout.root().to_path_buf(),
        env: process::launch_env(&natives_dir),
    }
}
