#![forbid(unsafe_code)]

//! Guidepost demo binary entry point.

use guidepost_demo::cli;
use guidepost_demo::tours;
use guidepost_runtime::{FileFlags, HeadlessPage, Runner, RunnerConfig};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let opts = cli::Opts::parse();
    init_tracing();

    let mut config = RunnerConfig::from_env();
    if let Some(mode) = opts.mode {
        config = config.with_skip_mode(mode);
    }
    let mut runner = Runner::new(tours::page(), config).with_book(tours::book());
    if let Some(path) = &opts.flags_file {
        runner = runner.with_flags(FileFlags::new(path));
    }

    if opts.inputs {
        for line in tours::inputs(runner.page()) {
            println!("{line}");
        }
        return;
    }

    if opts.list {
        for (name, title) in runner.book().menu() {
            println!("{name:<12} {title}");
        }
        return;
    }

    let started = if opts.auto {
        runner.show_auto(&opts.tour)
    } else {
        runner.run_named(&opts.tour).map(|()| true)
    };
    match started {
        Ok(true) => {}
        Ok(false) => {
            println!("Auto tour disabled; run without --auto to play it anyway.");
            return;
        }
        Err(e) => {
            eprintln!("Could not start tour: {e}");
            std::process::exit(1);
        }
    }

    if let Err(e) = play_and_choose(&mut runner, &opts) {
        eprintln!("Tour error: {e}");
        std::process::exit(1);
    }

    for line in runner.log().lines() {
        println!("{line}");
    }
    if let Some(page) = runner.page_as::<HeadlessPage>() {
        println!();
        for line in tours::summary(page) {
            println!("{line}");
        }
    }
}

fn play_and_choose(
    runner: &mut Runner,
    opts: &cli::Opts,
) -> guidepost_runtime::TourResult<()> {
    let elapsed = tours::play(runner, opts.frame_ms)?;
    tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "tour finished");

    if let Some(prompt) = runner.prompt() {
        println!("{}", prompt.message);
        for (i, item) in prompt.items.iter().enumerate() {
            println!("  [{i}] {}", item.label);
        }
        if let Some(choice) = opts.choose {
            runner.choose_prompt(choice)?;
            tours::play(runner, opts.frame_ms)?;
            runner.run_until_idle();
        }
    }
    Ok(())
}
