use chunked_stem_splitter::{
    cli::Cli, list_models, set_split_progress_callback, split_file, SplitError, SplitProgress,
    Splitter,
};
use clap::Parser;
use std::{path::Path, process::ExitCode};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            let code = e
                .downcast_ref::<SplitError>()
                .map(SplitError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

fn init_logging(cli: &Cli) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if cli.list_models {
        return handle_list();
    }

    let input = cli
        .input
        .as_deref()
        .ok_or_else(|| SplitError::invalid("missing input file"))?;
    let opts = cli.to_options();

    if cli.dry_run {
        return handle_dry_run(input, Splitter::from_options(opts));
    }

    if !cli.quiet {
        setup_progress_callback();
        eprintln!("🎵 Chunked Stem Splitter");
        eprintln!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        eprintln!("Input:  {}", input.display());
        eprintln!("Output: {}", opts.output_dir.display());
        eprintln!("Model:  {}", opts.model);
        eprintln!("Chunk:  {}s", opts.chunk_secs);
        eprintln!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        eprintln!();
    }

    let result = split_file(input, opts)?;

    if !cli.quiet {
        eprintln!();
        eprintln!(
            "✅ Finished: {} chunk(s), {:.2}s of audio",
            result.chunks, result.duration
        );
        eprintln!();
        eprintln!("Output files:");
        for stem in &result.stems {
            eprintln!("  • {:<14} {}", stem.name, stem.path.display());
        }
    } else {
        for stem in &result.stems {
            println!("{}", stem.path.display());
        }
    }

    Ok(())
}

fn handle_dry_run<M, S>(input: &Path, splitter: Splitter<M, S>) -> anyhow::Result<()>
where
    M: chunked_stem_splitter::MediaTool,
    S: chunked_stem_splitter::Separator,
{
    let plan = splitter.plan(input)?;
    println!(
        "Duration {:.2}s -> {} chunk(s) of {}s",
        plan.total_duration,
        plan.chunks.len(),
        plan.chunk_length
    );
    for c in &plan.chunks {
        println!("  chunk {:>4}  [{:>10.3}, {:>10.3})", c.index, c.start, c.end);
    }
    Ok(())
}

fn handle_list() -> anyhow::Result<()> {
    let (models, default) = list_models()?;

    eprintln!("📋 Available Models");
    eprintln!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for model in models {
        let marker = if model.name == default { " (default)" } else { "" };
        eprintln!("  • {}{}: {}", model.name, marker, model.stems.join(", "));
    }
    eprintln!();
    eprintln!("Use --model <name> to pick one, or --stems for models not listed");

    Ok(())
}

fn setup_progress_callback() {
    set_split_progress_callback(|progress| match progress {
        SplitProgress::Stage(stage) => {
            let stage_name = match stage {
                "plan" => "Probing and planning chunks",
                "separate" => "Extracting and separating chunks",
                "concatenate" => "Joining stems",
                _ => stage,
            };
            eprintln!("⏳ {}", stage_name);
        }
        SplitProgress::Chunks {
            done,
            total,
            percent,
        } => {
            eprint!("\r🔄 Separating: {}/{} chunks ({:.0}%)", done, total, percent);
            if done >= total {
                eprintln!();
            }
        }
        SplitProgress::Stem { name, done, total } => {
            eprintln!("💾 Joining {} ({}/{})", name, done + 1, total);
        }
        SplitProgress::Finished => {}
    });
}
