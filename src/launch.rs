//! Running the game inside the player container

use nix::unistd::{getgid, getuid};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::command;
use crate::config::{home_dir, Layout};
use crate::error::{Error, Result};
use crate::ui::{Phase, Ui};

/// Who the game runs as and where its pieces are on the host
#[derive(Debug, Clone)]
pub struct ContainerSpec<'a> {
    pub image: &'a str,
    pub uid: u32,
    pub gid: u32,
    pub home: &'a Path,
    pub game_data_dir: &'a Path,
    pub game_dir: &'a Path,
}

/// Arguments for `docker run`
pub fn docker_run_args(spec: &ContainerSpec<'_>) -> Vec<String> {
    let run_pulse = format!("/run/user/{}/pulse", spec.uid);
    let mount = |host: &Path, guest: &str| format!("{}:{}", host.display(), guest);

    vec![
        "run".into(),
        // The container goes away when the game exits.
        "--rm".into(),
        // Saves must belong to the player, not root.
        "--user".into(),
        format!("{}:{}", spec.uid, spec.gid),
        // Sound through the host's PulseAudio
        "-v".into(),
        "/etc/machine-id:/etc/machine-id".into(),
        "-v".into(),
        format!("{}:{}", run_pulse, run_pulse),
        "-v".into(),
        "/var/lib/dbus:/var/lib/dbus".into(),
        "-v".into(),
        mount(&spec.home.join(".pulse"), "/.pulse"),
        // Graphics
        "-e".into(),
        "DISPLAY".into(),
        "--device".into(),
        "/dev/dri".into(),
        "-v".into(),
        "/tmp/.X11-unix:/tmp/.X11-unix".into(),
        "-v".into(),
        mount(spec.game_data_dir, "/data"),
        "-v".into(),
        mount(spec.game_dir, "/game"),
        // The game looks for its data relative to the working directory.
        "-w".into(),
        "/game".into(),
        spec.image.into(),
        "./cataclysm-tiles".into(),
        "--savedir".into(),
        "/data/save/".into(),
        "--configdir".into(),
        "/data/config/".into(),
        "--memorialdir".into(),
        "/data/graveyard/".into(),
    ]
}

/// Pull the player image and run the game from `game_dir`
pub fn run_game(image: &str, layout: &Layout, game_dir: &Path, ui: &mut impl Ui) -> Result<()> {
    ui.set_phase(Phase::Launching);

    let game_data_dir = layout.game_data_dir();
    fs::create_dir_all(&game_data_dir).map_err(|e| Error::io(&game_data_dir, e))?;

    let image_name = image.split(':').next().unwrap_or(image);
    ui.log(format!("Pulling the latest {} image", image_name));
    command::run("docker", ["pull", image])?;

    let home = home_dir()?;
    let spec = ContainerSpec {
        image,
        uid: getuid().as_raw(),
        gid: getgid().as_raw(),
        home: &home,
        game_data_dir: &game_data_dir,
        game_dir,
    };

    ui.log(format!("Starting the game from {}", game_dir.display()));
    info!("Launching {:?} in {}", game_dir, image);
    command::run("docker", docker_run_args(&spec))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docker_run_args() {
        let spec = ContainerSpec {
            image: "houseabsolute/catalauncher-player:latest",
            uid: 1000,
            gid: 100,
            home: Path::new("/home/player"),
            game_data_dir: Path::new("/srv/cdda/game-data"),
            game_dir: Path::new("/srv/cdda/builds/12/cataclysmdda-0.E"),
        };
        let args = docker_run_args(&spec);
        let joined = args.join(" ");

        assert_eq!(args[0], "run");
        assert!(joined.contains("--user 1000:100"));
        assert!(joined.contains("-v /run/user/1000/pulse:/run/user/1000/pulse"));
        assert!(joined.contains("-v /home/player/.pulse:/.pulse"));
        assert!(joined.contains("-v /srv/cdda/game-data:/data"));
        assert!(joined.contains("-v /srv/cdda/builds/12/cataclysmdda-0.E:/game"));
        assert!(joined.contains(
            "houseabsolute/catalauncher-player:latest ./cataclysm-tiles --savedir /data/save/"
        ));
        assert_eq!(args.last().map(String::as_str), Some("/data/graveyard/"));
    }
}
