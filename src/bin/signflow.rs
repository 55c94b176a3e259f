use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "signflow", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve text into its playable unit sequence and print it.
    Resolve(ResolveArgs),
    /// Play text and capture the output as an MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct ResolveArgs {
    /// Directory holding `<WORD>.<ext>` and `<LETTER>.<ext>` clips.
    #[arg(long)]
    content_root: PathBuf,

    /// Input text (upper-cased before lookup).
    text: String,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Directory holding `<WORD>.<ext>` and `<LETTER>.<ext>` clips.
    #[arg(long)]
    content_root: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Optional playback config JSON; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Playback speed multiplier.
    #[arg(long)]
    speed: Option<f32>,

    /// Transition strategy between clips.
    #[arg(long, value_enum)]
    transition: Option<TransitionChoice>,

    /// Number of bridge frames per transition.
    #[arg(long)]
    steps: Option<u32>,

    /// Idle still image shown between spelled words and at the end.
    #[arg(long)]
    idle_image: Option<PathBuf>,

    /// Output frame rate.
    #[arg(long, default_value_t = 50)]
    fps: u32,

    /// Input text (upper-cased before lookup).
    text: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TransitionChoice {
    None,
    CrossDissolve,
    FlowMorph,
    FlowMorphSymmetric,
}

impl TransitionChoice {
    fn to_mode(self) -> Option<signflow::TransitionMode> {
        match self {
            Self::None => None,
            Self::CrossDissolve => Some(signflow::TransitionMode::CrossDissolve),
            Self::FlowMorph => Some(signflow::TransitionMode::FlowMorph),
            Self::FlowMorphSymmetric => Some(signflow::TransitionMode::FlowMorphSymmetric),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Resolve(args) => cmd_resolve(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn cmd_resolve(args: ResolveArgs) -> anyhow::Result<()> {
    let store = signflow::ClipStore::new(&args.content_root);
    let resolution = signflow::resolve(&args.text, &store);

    for unit in &resolution.units {
        match unit {
            signflow::PlayUnit::Word { token, path } => {
                println!("word   {token} -> {}", path.display());
            }
            signflow::PlayUnit::Letter { ch, path } => {
                println!("letter {ch} -> {}", path.display());
            }
            signflow::PlayUnit::Pause => println!("pause"),
        }
    }
    for warning in &resolution.warnings {
        eprintln!("warning: {warning}");
    }
    if resolution.is_idle() {
        eprintln!("nothing to play (idle)");
    }
    Ok(())
}

fn read_config_json(path: &std::path::Path) -> anyhow::Result<signflow::PlaybackConfig> {
    let f = std::fs::File::open(path)
        .with_context(|| format!("open playback config '{}'", path.display()))?;
    let r = std::io::BufReader::new(f);
    let config: signflow::PlaybackConfig =
        serde_json::from_reader(r).with_context(|| "parse playback config JSON")?;
    Ok(config)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => read_config_json(path)?,
        None => signflow::PlaybackConfig::default(),
    };
    if let Some(speed) = args.speed {
        config.speed_factor = speed;
    }
    if let Some(choice) = args.transition {
        config.transition = choice.to_mode();
    }
    if let Some(steps) = args.steps {
        config.transition_steps = steps;
    }

    let mut store = signflow::ClipStore::new(&args.content_root);
    if let Some(idle) = &args.idle_image {
        store = store.with_idle_image(idle);
    }

    let mut scheduler =
        signflow::Scheduler::new(store, signflow::FrameCache::new(), config)?;

    // Pacing is meaningless when piping straight into the encoder; the
    // output frame rate carries the timing instead.
    let mut surface = signflow::Mp4Surface::new(&args.out, args.fps, true);
    let mut clock = signflow::NullClock;
    let resolution = scheduler.play_text(&args.text, &mut surface, &mut clock)?;

    for warning in &resolution.warnings {
        eprintln!("warning: {warning}");
    }
    if surface.frames_written() == 0 {
        anyhow::bail!("nothing was rendered (no clips matched and no idle image configured)");
    }
    surface.finish()?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
