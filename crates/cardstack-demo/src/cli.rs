use std::io::Write;
use std::path::PathBuf;

use cardstack_core::MotionKnob;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::commands::{run_knobs, run_poses, run_swipe, run_tap};
use crate::error::Result;
use crate::logging::init_tracing;

#[derive(Debug, Parser)]
#[command(
    name = "cardstack-demo",
    about = "Replay card stack gestures headlessly and print poses and frames as JSON",
    version
)]
pub struct Cli {
    /// Stack configuration file (TOML, or JSON by extension).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the resting pose of every slot.
    Poses(PosesArgs),

    /// Replay one drag-and-release on the swipe stack.
    Swipe(SwipeArgs),

    /// Tap the front card of the before/after stack.
    Tap(TapArgs),

    /// List motion knobs with ranges and current values.
    Knobs(KnobsArgs),
}

/// Which stack to build, overriding the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VariantArg {
    Primary,
    BeforeAfter,
}

#[derive(Debug, Clone, Args)]
pub struct PosesArgs {
    #[arg(long, value_enum)]
    pub variant: Option<VariantArg>,
}

#[derive(Debug, Clone, Args)]
pub struct SwipeArgs {
    /// Horizontal drag distance at release.
    #[arg(long, allow_hyphen_values = true)]
    pub offset: f64,

    /// Horizontal velocity at release.
    #[arg(long, allow_hyphen_values = true)]
    pub velocity: f64,

    /// Intermediate move samples before the release.
    #[arg(long, default_value_t = 3)]
    pub moves: usize,

    /// Frame interval in milliseconds.
    #[arg(long, default_value_t = 16)]
    pub frame_ms: u64,

    /// Give up after this many frames.
    #[arg(long, default_value_t = 600)]
    pub max_frames: usize,

    /// Print every n-th frame (the last frame is always printed).
    #[arg(long, default_value_t = 10)]
    pub every: usize,
}

#[derive(Debug, Clone, Args)]
pub struct TapArgs {
    /// Photo to show before tapping.
    #[arg(long, default_value_t = 0)]
    pub photo: usize,

    /// Number of taps.
    #[arg(long, default_value_t = 1)]
    pub count: usize,

    /// Frame interval in milliseconds.
    #[arg(long, default_value_t = 16)]
    pub frame_ms: u64,
}

#[derive(Debug, Clone, Args)]
pub struct KnobsArgs {
    /// Override a knob, e.g. `--set spring_duration=0.5`. Repeatable.
    #[arg(long = "set", value_parser = parse_knob_setting)]
    pub set: Vec<(MotionKnob, f64)>,

    /// Snap overrides onto the slider grid.
    #[arg(long)]
    pub snap: bool,
}

fn parse_knob_setting(raw: &str) -> std::result::Result<(MotionKnob, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{raw}`"))?;
    let knob: MotionKnob = name.trim().parse().map_err(|e| format!("{e}"))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value for {knob}: {e}"))?;
    Ok((knob, value))
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out)
}

pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let config = crate::commands::load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Poses(args) => run_poses(&config, &args, out),
        Commands::Swipe(args) => run_swipe(&config, &args, out),
        Commands::Tap(args) => run_tap(&config, &args, out),
        Commands::Knobs(args) => run_knobs(&config, &args, out),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn swipe_accepts_negative_values() {
        let cli = Cli::parse_from([
            "cardstack-demo",
            "swipe",
            "--offset",
            "-200",
            "--velocity",
            "-60",
        ]);
        let Commands::Swipe(args) = cli.command else {
            panic!("expected swipe");
        };
        assert_eq!(args.offset, -200.0);
        assert_eq!(args.velocity, -60.0);
        assert_eq!(args.every, 10);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["cardstack-demo", "knobs", "--json-logs", "--config", "x.toml"]);
        assert!(cli.json_logs);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("x.toml")));
    }

    #[test]
    fn knob_setting_parses() {
        assert_eq!(
            parse_knob_setting("drag_elastic=1.2").unwrap(),
            (MotionKnob::DragElasticity, 1.2)
        );
        assert!(parse_knob_setting("drag_elastic").is_err());
        assert!(parse_knob_setting("wobble=1").unwrap_err().contains("unknown motion knob"));
    }

    #[test]
    fn variant_flag_parses() {
        let cli = Cli::parse_from(["cardstack-demo", "poses", "--variant", "before-after"]);
        let Commands::Poses(args) = cli.command else {
            panic!("expected poses");
        };
        assert_eq!(args.variant, Some(VariantArg::BeforeAfter));
    }
}
