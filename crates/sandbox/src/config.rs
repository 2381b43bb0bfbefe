use std::env;
use std::path::PathBuf;

/// Sandbox settings read from the environment.
#[derive(Clone, Debug)]
pub struct SandboxConfig {
    pub content_dir: PathBuf,
    pub hero: String,
    pub frame_dt: f32,
    pub max_frames: u32,
}

impl SandboxConfig {
    /// Environment variables:
    /// - `ARCANA_CONTENT_DIR` - Directory with `heroes.ron` and `ability.toml`
    ///   (default: the crate's `content/` directory)
    /// - `ARCANA_HERO` - Hero to spawn (default: `warden`)
    /// - `ARCANA_FRAME_DT` - Seconds per simulated frame (default: 0.5)
    /// - `ARCANA_MAX_FRAMES` - Frame cap per scenario phase (default: 40)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("ARCANA_CONTENT_DIR") {
            config.content_dir = PathBuf::from(dir);
        }
        if let Ok(hero) = env::var("ARCANA_HERO") {
            config.hero = hero;
        }
        if let Some(dt) = read_env::<f32>("ARCANA_FRAME_DT").filter(|dt| *dt > 0.0) {
            config.frame_dt = dt;
        }
        if let Some(frames) = read_env::<u32>("ARCANA_MAX_FRAMES") {
            config.max_frames = frames.max(1);
        }

        config
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/content")),
            hero: "warden".to_owned(),
            frame_dt: 0.5,
            max_frames: 40,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
