//! Console viewer for an airmap server.

mod cli;
mod console;

use airmap::animation::PlaybackState;
use airmap::{HttpLookupProvider, MapSession};
use clap::Parser;
use env_logger::Env;

use crate::cli::Args;
use crate::console::ConsoleSurface;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let provider = HttpLookupProvider::new(&args.server)?;
    let mut session = MapSession::new(ConsoleSurface::default(), args.animation());
    session.submit(&provider, &args.request()).await?;

    let shown = args.shown_regions();
    if !shown.is_empty() {
        session.select_regions(shown)?;
        session.fit_to_selection();
    }

    print_legend(&session);
    print_frame(&session);

    if args.play {
        play(&mut session, args.ticks).await;
    }

    Ok(())
}

/// Plays until `ticks` periods were shown, or until interrupted when `ticks` is 0.
async fn play(session: &mut MapSession<ConsoleSurface>, ticks: usize) {
    if session.toggle_playback() != PlaybackState::Playing {
        log::warn!("Nothing to play");
        return;
    }

    let mut shown = 0;
    while ticks == 0 || shown < ticks {
        tokio::select! {
            event = session.next_event() => {
                let Some(event) = event else { break };
                if session.handle_event(event).is_some() {
                    shown += 1;
                    print_frame(session);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("Interrupted");
                break;
            }
        }
    }

    session.toggle_playback();
}

fn print_legend(session: &MapSession<ConsoleSurface>) {
    if let Some(dataset) = session.dataset() {
        println!("{}", dataset.quantity());
    }
    if let Some(view) = session.surface().view() {
        println!(
            "  view {:.2},{:.2} .. {:.2},{:.2}",
            view.min().x,
            view.min().y,
            view.max().x,
            view.max().y
        );
    }
    for entry in session.legend_entries() {
        println!("  {:<10} {}", entry.color, entry.label);
    }
}

fn print_frame(session: &MapSession<ConsoleSurface>) {
    let period = session
        .current_time_key()
        .map(|time| time.to_string())
        .unwrap_or_default();
    println!("[{period}]");
    for line in session.surface().marker_lines() {
        println!("  {line}");
    }
    for layer in session.surface().layers() {
        println!("  {}", layer.url);
    }
}
