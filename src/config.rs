use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use std::{fs, path::{Path, PathBuf}, time::Duration};
use thiserror::Error;

use crate::display::{FaceConfig, Palette, PaletteKind};
use crate::display::mode_controller::DEFAULT_DEBOUNCE;
use crate::display::watchface::DEFAULT_LOOKAHEAD;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub display: Option<DisplayConfig>,
    pub clock: Option<ClockConfig>,
    pub reveal: Option<RevealConfig>,
    pub sim: Option<SimConfig>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
pub struct DisplayConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub palette: Option<PaletteKind>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
pub struct ClockConfig {
    pub hour_24: Option<bool>,
    pub lookahead_secs: Option<u32>, // digits run this far ahead of the ring
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
pub struct RevealConfig {
    pub debounce_secs: Option<u32>,
}

/// Starting conditions for the simulated host
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
pub struct SimConfig {
    pub battery_percent: Option<u8>,
    pub bluetooth: Option<bool>,
    pub snapshot: Option<PathBuf>,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "plusone", version, about = "PlusOne watchface simulator")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, short = 'c', value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Enable debug log level
    #[arg(long, short = 'v', alias = "verbose", action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long)]
    pub display_width: Option<u32>,
    #[arg(long)]
    pub display_height: Option<u32>,
    #[arg(long, value_enum)]
    pub palette: Option<PaletteArg>,
    #[arg(long, action = ArgAction::Set)]
    pub hour_24: Option<bool>,
    #[arg(long)]
    pub lookahead_secs: Option<u32>,
    #[arg(long)]
    pub debounce_secs: Option<u32>,
    #[arg(long)]
    pub battery: Option<u8>,
    #[arg(long, action = ArgAction::Set)]
    pub bluetooth: Option<bool>,
    /// Write every rendered frame to this PPM file
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub snapshot: Option<PathBuf>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// clap-facing mirror of `PaletteKind`
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PaletteArg {
    Color,
    Mono,
}

impl From<PaletteArg> for PaletteKind {
    fn from(arg: PaletteArg) -> Self {
        match arg {
            PaletteArg::Color => PaletteKind::Color,
            PaletteArg::Mono => PaletteKind::Mono,
        }
    }
}

/// Public entry point: read YAML, merge CLI, validate.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Pretty YAML of effective config (nice for debugging)
pub fn dump(cfg: &Config) -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(cfg)?)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/plusone/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/plusone/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/plusone.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["plusone.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some() { dst.log_level = src.log_level; }

    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => {
            if s.width.is_some()   { d.width = s.width; }
            if s.height.is_some()  { d.height = s.height; }
            if s.palette.is_some() { d.palette = s.palette; }
        }
        _ => {}
    }
    match (&mut dst.clock, src.clock) {
        (None, Some(c)) => dst.clock = Some(c),
        (Some(d), Some(s)) => {
            if s.hour_24.is_some()        { d.hour_24 = s.hour_24; }
            if s.lookahead_secs.is_some() { d.lookahead_secs = s.lookahead_secs; }
        }
        _ => {}
    }
    match (&mut dst.reveal, src.reveal) {
        (None, Some(c)) => dst.reveal = Some(c),
        (Some(d), Some(s)) => {
            if s.debounce_secs.is_some() { d.debounce_secs = s.debounce_secs; }
        }
        _ => {}
    }
    match (&mut dst.sim, src.sim) {
        (None, Some(c)) => dst.sim = Some(c),
        (Some(d), Some(s)) => {
            if s.battery_percent.is_some() { d.battery_percent = s.battery_percent; }
            if s.bluetooth.is_some()       { d.bluetooth = s.bluetooth; }
            if s.snapshot.is_some()        { d.snapshot = s.snapshot; }
        }
        _ => {}
    }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.debug { cfg.log_level = Some("debug".to_string()); }
    if cli.log_level.is_some() { cfg.log_level = cli.log_level.clone(); }

    if cli.display_width.is_some() || cli.display_height.is_some() || cli.palette.is_some() {
        let display = cfg.display.get_or_insert_with(DisplayConfig::default);
        if cli.display_width.is_some()  { display.width = cli.display_width; }
        if cli.display_height.is_some() { display.height = cli.display_height; }
        if let Some(p) = cli.palette    { display.palette = Some(p.into()); }
    }

    if cli.hour_24.is_some() || cli.lookahead_secs.is_some() {
        let clock = cfg.clock.get_or_insert_with(ClockConfig::default);
        if cli.hour_24.is_some()        { clock.hour_24 = cli.hour_24; }
        if cli.lookahead_secs.is_some() { clock.lookahead_secs = cli.lookahead_secs; }
    }

    if cli.debounce_secs.is_some() {
        cfg.reveal.get_or_insert_with(RevealConfig::default).debounce_secs = cli.debounce_secs;
    }

    if cli.battery.is_some() || cli.bluetooth.is_some() || cli.snapshot.is_some() {
        let sim = cfg.sim.get_or_insert_with(SimConfig::default);
        if cli.battery.is_some()   { sim.battery_percent = cli.battery; }
        if cli.bluetooth.is_some() { sim.bluetooth = cli.bluetooth; }
        if cli.snapshot.is_some()  { sim.snapshot = cli.snapshot.clone(); }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(display) = cfg.display.as_ref() {
        if display.width == Some(0) || display.height == Some(0) {
            return Err(ConfigError::Validation("display width/height must be > 0".into()));
        }
    }
    if let Some(clock) = cfg.clock.as_ref() {
        if clock.lookahead_secs.is_some_and(|s| s > 59) {
            return Err(ConfigError::Validation("clock lookahead_secs must be 0..=59".into()));
        }
    }
    if let Some(reveal) = cfg.reveal.as_ref() {
        if reveal.debounce_secs == Some(0) {
            return Err(ConfigError::Validation("reveal debounce_secs must be > 0".into()));
        }
    }
    if let Some(sim) = cfg.sim.as_ref() {
        if sim.battery_percent.is_some_and(|b| b > 100) {
            return Err(ConfigError::Validation("sim battery_percent must be 0..=100".into()));
        }
    }
    Ok(())
}

impl Config {
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    /// Panel size, the native face size unless configured
    pub fn display_size(&self) -> (u32, u32) {
        let d = self.display.as_ref();
        (
            d.and_then(|d| d.width).unwrap_or(crate::display::SCREEN_SIZE.width),
            d.and_then(|d| d.height).unwrap_or(crate::display::SCREEN_SIZE.height),
        )
    }

    pub fn palette_kind(&self) -> Option<PaletteKind> {
        self.display.as_ref().and_then(|d| d.palette)
    }

    pub fn hour_24(&self) -> bool {
        self.clock.as_ref().and_then(|c| c.hour_24).unwrap_or(true)
    }

    pub fn battery_percent(&self) -> u8 {
        self.sim.as_ref().and_then(|s| s.battery_percent).unwrap_or(100)
    }

    pub fn bluetooth(&self) -> bool {
        self.sim.as_ref().and_then(|s| s.bluetooth).unwrap_or(true)
    }

    pub fn snapshot(&self) -> Option<&Path> {
        self.sim.as_ref().and_then(|s| s.snapshot.as_deref())
    }

    /// Face tunables; `fallback` supplies the palette when none is configured
    pub fn face_config(&self, fallback: Palette) -> FaceConfig {
        let lookahead = self
            .clock
            .as_ref()
            .and_then(|c| c.lookahead_secs)
            .map(|s| Duration::from_secs(s as u64))
            .unwrap_or(DEFAULT_LOOKAHEAD);
        let debounce = self
            .reveal
            .as_ref()
            .and_then(|r| r.debounce_secs)
            .map(|s| Duration::from_secs(s as u64))
            .unwrap_or(DEFAULT_DEBOUNCE);

        FaceConfig {
            palette: self.palette_kind().map(Palette::from_kind).unwrap_or(fallback),
            debounce,
            lookahead,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_sections() {
        let cfg = parse_yaml(
            "log_level: debug\n\
             display:\n  palette: mono\n\
             clock:\n  hour_24: false\n  lookahead_secs: 0\n\
             reveal:\n  debounce_secs: 5\n",
        )
        .unwrap();

        assert_eq!(cfg.log_level(), "debug");
        assert_eq!(cfg.palette_kind(), Some(PaletteKind::Mono));
        assert!(!cfg.hour_24());

        let face = cfg.face_config(Palette::color());
        assert_eq!(face.palette, Palette::mono());
        assert_eq!(face.lookahead, Duration::ZERO);
        assert_eq!(face.debounce, Duration::from_secs(5));
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.log_level(), "info");
        assert_eq!(cfg.display_size(), (144, 168));
        assert!(cfg.hour_24());
        assert!(cfg.bluetooth());
        assert_eq!(cfg.battery_percent(), 100);

        let face = cfg.face_config(Palette::mono());
        assert_eq!(face.palette, Palette::mono());
        assert_eq!(face.debounce, DEFAULT_DEBOUNCE);
        assert_eq!(face.lookahead, DEFAULT_LOOKAHEAD);
    }

    #[test]
    fn test_cli_overrides_yaml() {
        let mut cfg = parse_yaml("sim:\n  battery_percent: 40\n  bluetooth: true\n").unwrap();
        let cli = Cli {
            bluetooth: Some(false),
            palette: Some(PaletteArg::Color),
            debug: true,
            ..Default::default()
        };
        apply_cli_overrides(&mut cfg, &cli);

        assert_eq!(cfg.battery_percent(), 40);
        assert!(!cfg.bluetooth());
        assert_eq!(cfg.palette_kind(), Some(PaletteKind::Color));
        assert_eq!(cfg.log_level(), "debug");
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut dst = parse_yaml("clock:\n  hour_24: false\n").unwrap();
        merge(&mut dst, parse_yaml("clock:\n  lookahead_secs: 2\n").unwrap());

        let clock = dst.clock.unwrap();
        assert_eq!(clock.hour_24, Some(false));
        assert_eq!(clock.lookahead_secs, Some(2));
    }

    #[test]
    fn test_validation() {
        let bad = [
            "display:\n  width: 0\n",
            "clock:\n  lookahead_secs: 60\n",
            "reveal:\n  debounce_secs: 0\n",
            "sim:\n  battery_percent: 101\n",
        ];
        for yaml in bad {
            let cfg = parse_yaml(yaml).unwrap();
            assert!(matches!(validate(&cfg), Err(ConfigError::Validation(_))), "{}", yaml);
        }
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_missing_explicit_config_file() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/plusone.yaml")),
            ..Default::default()
        };
        assert!(matches!(load(&cli), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "plusone", "--palette", "mono", "--hour-24", "false", "--battery", "5", "-v",
        ])
        .unwrap();
        assert_eq!(cli.palette, Some(PaletteArg::Mono));
        assert_eq!(cli.hour_24, Some(false));
        assert_eq!(cli.battery, Some(5));
        assert!(cli.debug);
    }
}
