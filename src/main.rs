use anyhow::Result;
use catalauncher::{
    builds::LocalBuilds,
    clean::clean,
    cli::{Cli, Commands},
    config::{home_dir, Config},
    launch::run_game,
    logging,
    setup, ConsoleUi, LaunchOptions, Launcher, UiApp,
};
use std::io;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    logging::init(cli.log_level);

    let config_given = cli.config.is_some();
    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let mut config = Config::load(&config_path)?;
    if let Some(root) = cli.root {
        config.root = Some(root);
    }

    match cli.command {
        Commands::Launch {
            build,
            tui,
            sync_extras,
            no_launch,
        } => {
            let launcher = Launcher::new(config)?;
            let options = LaunchOptions { build, sync_extras };

            let prepared = if tui {
                let mut ui = UiApp::new()?;
                match launcher.prepare(&options, &mut ui) {
                    Ok(prepared) if no_launch => {
                        ui.finish(&format!("Build #{} is ready", prepared.build_number))?;
                        prepared
                    }
                    result => {
                        ui.restore()?;
                        result?
                    }
                }
            } else {
                launcher.prepare(&options, &mut ConsoleUi::new())?
            };

            if no_launch {
                println!(
                    "Build #{} is ready at {}",
                    prepared.build_number,
                    prepared.game_dir.display()
                );
            } else {
                run_game(
                    &launcher.config().docker_image,
                    launcher.layout(),
                    &prepared.game_dir,
                    &mut ConsoleUi::new(),
                )?;
            }
        }

        Commands::Clean { max, keep } => {
            let local = LocalBuilds::new(config.layout()?.builds_dir());
            clean(&local, max, &keep, &mut ConsoleUi::new())?;
        }

        Commands::Setup => {
            setup::check_for_docker()?;
            let home = home_dir()?;
            let stdin = io::stdin();
            setup::run(
                config,
                &config_path,
                config_given,
                &home,
                &mut stdin.lock(),
                &mut io::stdout(),
            )?;
        }

        Commands::Builds => {
            let local = LocalBuilds::new(config.layout()?.builds_dir());
            let all = local.all()?;
            if all.is_empty() {
                println!("No builds have been downloaded yet");
            }
            for (i, build) in all.iter().enumerate() {
                let marker = if i + 1 == all.len() { " (latest)" } else { "" };
                println!("  {}{}", build, marker);
            }
        }
    }

    Ok(())
}
