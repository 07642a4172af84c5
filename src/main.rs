// src/main.rs

mod aggregator;
mod cli;
mod client;
mod color;
mod error;
mod export;
mod host;
mod layout;
mod model;
mod renderer;
mod scene;
mod session;
mod svg;

use anyhow::{bail, Context};
use clap::Parser;
use cli::Args;
use client::GitHubClient;
use export::ExportKind;
use host::VisualizationHost;
use model::ProfileData;
use session::{Notice, NoticeLevel, Session};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let start_time = Instant::now();
    let client = GitHubClient::new(&args.api_url, Duration::from_secs(args.timeout_secs))
        .context("Failed to build HTTP client")?;

    let mut session = Session::default();
    session.search(&client, &args.username).await;
    print_notices(session.take_notices());
    tracing::debug!(in_flight = session.in_flight(), "query settled");

    let Some(data) = session.data() else {
        match session.error() {
            Some(banner) => bail!("{banner}"),
            None => bail!("No query was run"),
        }
    };
    println!("Query finished in {:.2?}.", start_time.elapsed());
    print_summary(data);

    let mut host = VisualizationHost::new(args.width, args.height, args.seed);
    match host.mount(args.mode, data) {
        Some(view) => {
            let primitives: usize = view.scene().groups.iter().map(|g| g.primitives.len()).sum();
            println!("Mounted {} view with {} primitives.", view.mode(), primitives);
        }
        None => {
            if let Some(placeholder) = host.placeholder() {
                println!("{placeholder}");
            }
            return Ok(());
        }
    }

    export_still(&mut host, &args, &args.output);

    if let Some((width, height)) = args.resize {
        host.resize(width, height, data);
        if let Some(view) = host.active() {
            println!("Resized {} view to {}x{}.", view.mode(), width, height);
        }
        export_still(&mut host, &args, &args.output.join(format!("{width}x{height}")));
    }

    if args.frames > 0 {
        println!("Starting frame rendering...");
        let render_start = Instant::now();
        host.animate(args.frames, args.fps, &args.output.join("frames"))
            .context("Failed to render animation frames")?;
        println!("Rendering finished in {:.2?}.", render_start.elapsed());
    }

    host.unmount();
    println!("Total time: {:.2?}", start_time.elapsed());
    Ok(())
}

/// Export failures are reported as notices and never abort the run
fn export_still(host: &mut VisualizationHost, args: &Args, dir: &Path) {
    let Some(kind) = ExportKind::resolve(args.export, args.mode) else {
        return;
    };
    match host.export(kind, args.hover, dir) {
        Ok(path) => print_notices(vec![Notice::info("Visualization Exported", path.display().to_string())]),
        Err(e) => print_notices(vec![Notice {
            level: NoticeLevel::Error,
            title: "Export Failed".into(),
            message: e.to_string(),
        }]),
    }
}

fn print_notices(notices: Vec<Notice>) {
    for notice in notices {
        match notice.level {
            NoticeLevel::Info => println!("{}: {}", notice.title, notice.message),
            NoticeLevel::Error => eprintln!("{}: {}", notice.title, notice.message),
        }
    }
}

fn print_summary(data: &ProfileData) {
    let user = &data.user;
    let summary = aggregator::summarize(&data.repos, &data.languages);

    println!("{} (@{}), on GitHub since {}", user.display_name(), user.login, user.created_at.format("%Y"));
    if let Some(bio) = &user.bio {
        println!("  {bio}");
    }
    println!("  Avatar: {}", user.avatar_url);
    println!("  {} public repositories, {} followers", user.public_repos, user.followers);

    let forks = data.repos.iter().filter(|r| r.is_fork).count();
    println!(
        "Repositories: {} ({} forks)  Stars: {}  Top language: {}",
        summary.repo_count, forks, summary.total_stars, summary.top_language
    );
    if let Some(latest) = data.repos.first() {
        println!("  Most recently updated: {} ({})", latest.name, latest.updated_at.to_rfc2822());
    }
    if let Some(oldest) = data.repos.iter().min_by_key(|r| r.created_at) {
        println!("  Oldest: {} (created {})", oldest.name, oldest.created_at.format("%Y-%m-%d"));
    }

    if !summary.legend.is_empty() {
        println!("Language distribution:");
        for lang in &summary.legend {
            println!("  {:<14} {:>5.1}%  {}", lang.name, lang.percentage, color::hex(lang.color));
        }
    }
}
