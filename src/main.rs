use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wavecut::archive::DirectoryExport;
use wavecut::audio::decoder::SourceFile;
use wavecut::audio::encoder::WAV_EXTENSION;
use wavecut::cli::{Cli, Command, EditArgs, SplitArgs};
use wavecut::config::SplitterConfig;
use wavecut::naming::format_minutes_seconds;
use wavecut::pipeline::ProgressEvent;
use wavecut::session::SplitSession;

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Split(args) => handle_split(&args),
        Command::Edit(args) => handle_edit(&args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wavecut=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_split(args: &SplitArgs) -> Result<()> {
    args.validate()
        .context("Failed to validate command-line arguments")?;
    let config = SplitterConfig::from_override(args.config.clone())?;
    let default_pattern = config.default_pattern;

    let source = SourceFile::from_path(&args.input, &config)
        .with_context(|| format!("Failed to read input file {:?}", args.input))?;
    let mut session = SplitSession::new(config);
    session
        .load(source)
        .with_context(|| format!("Failed to load audio from {:?}", args.input))?;

    let request = args.mode.request()?;
    let namer = session.namer(&args.prefix, args.naming_pattern(default_pattern));

    if args.dry_run {
        let plan = session.plan(&request, &namer).context("Invalid split settings")?;
        println!("{} segments planned:", plan.len());
        for segment in &plan {
            println!(
                "  {}.{}  {:.3}s - {:.3}s ({})",
                segment.name,
                WAV_EXTENSION,
                segment.start,
                segment.end,
                format_minutes_seconds(segment.duration())
            );
        }
        return Ok(());
    }

    let count = session
        .split(&request, &namer, |event| {
            if let ProgressEvent::Segment { index, total, name } = event {
                eprintln!("   [{}/{}] {}", index, total, name);
            }
        })
        .context("Split failed")?
        .len();

    let mut export = DirectoryExport::new(&args.output).overwrite(args.overwrite);
    session
        .export(&mut export, &mut |_, _| {})
        .with_context(|| format!("Failed to write segments to {:?}", args.output))?;

    for result in session.results() {
        println!(
            "{}  {:.3}s  {} bytes",
            export.path_for(result).display(),
            result.duration_seconds,
            result.byte_size
        );
    }
    println!("Wrote {} files to {:?}", count, args.output);
    Ok(())
}

fn handle_edit(args: &EditArgs) -> Result<()> {
    let config = SplitterConfig::from_override(args.config.clone())?;
    wavecut::ui::launch_editor(config, args.input.clone(), args.output.clone())
}
