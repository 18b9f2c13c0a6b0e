//! Headless run of the whole pipeline: brief -> variants -> selection -> rendered files.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use copyforge::batch::{BatchDriver, plan_batch};
use copyforge::cli::ServiceOptions;
use copyforge::clients::{CompletionClient, CompositorClient};
use copyforge::config::{CampaignConfig, setup_logging};
use copyforge::error::CopyforgeError;
use copyforge::export::export_images;
use copyforge::generation::generate_variants;
use copyforge::session::SessionCache;
use copyforge::variants::CampaignMode;
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Generate copy variants for a brief and render the chosen ones onto a template.
///
/// Minimal UX:
///   render_batch "marketing for black friday" --select 1,3
#[derive(Parser, Debug)]
#[command(name = "render_batch")]
struct Args {
    /// Marketing brief the variants are written for
    brief: String,

    /// single-field (titles) or multi-field (header + CTA couples)
    #[arg(long, default_value = "single-field")]
    mode: CampaignMode,

    /// 1-based variant numbers to render, eg `1,3,5`. Prompts when omitted.
    #[arg(long, conflicts_with = "all")]
    select: Option<String>,

    /// Render every generated variant
    #[arg(long)]
    all: bool,

    /// Output directory for the rendered images
    #[arg(long, default_value = "./renders", env = "COPYFORGE_OUT_DIR")]
    out_dir: PathBuf,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    #[command(flatten)]
    service: ServiceOptions,
}

/// Parses `1,3 5` style variant numbers into 0-based indices.
fn parse_selection(input: &str) -> Result<BTreeSet<usize>, CopyforgeError> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<usize>()
                .ok()
                .and_then(|number| number.checked_sub(1))
                .ok_or_else(|| {
                    CopyforgeError::Precondition(format!("{part:?} is not a variant number"))
                })
        })
        .collect()
}

/// Asks which variants to render.
fn prompt_selection(count: usize) -> Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "Select variants to render (1-{count}, eg 1,3): ")?;
    stdout.flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.debug).map_err(|err| anyhow!("{err}"))?;

    let config = CampaignConfig::from_options(&args.service);
    config.require_render_settings()?;
    let completion =
        CompletionClient::new(&args.service, config.credentials.completion_key.clone())?;
    let compositor =
        CompositorClient::new(&args.service, config.credentials.compositor_key.clone())?;

    let mut cache = SessionCache::new();
    let parsed = generate_variants(
        &completion,
        &args.brief,
        args.mode,
        args.service.variant_limit,
    )
    .await?;
    if parsed.shortfall().is_some() {
        eprintln!(
            "Warning: only {} of {} variants were generated.",
            parsed.len(),
            parsed.requested
        );
    }
    cache.set_variants(parsed);
    for variant in cache.variant_list() {
        println!("{:>2}. {}", variant.index + 1, variant.label());
    }

    let indices: BTreeSet<usize> = if args.all {
        (0..cache.variant_list().len()).collect()
    } else {
        let input = match args.select {
            Some(select) => select,
            None => prompt_selection(cache.variant_list().len())?,
        };
        parse_selection(&input)?
    };
    for index in indices {
        cache.toggle(index)?;
    }

    let plan = plan_batch(
        cache.variant_list(),
        &cache.selection().current(),
        &config,
    )?;

    let cancel = Arc::new(AtomicBool::new(false));
    let signal_flag = Arc::clone(&cancel);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Cancelling after the current image...");
            signal_flag.store(true, Ordering::Relaxed);
        }
    });

    let report = BatchDriver::new(&compositor)
        .with_cancellation(cancel.as_ref())
        .run(plan, |progress| {
            eprintln!(
                "[{:>3.0}%] {}/{} {}",
                progress.fraction() * 100.0,
                progress.completed,
                progress.total,
                progress.label
            );
        })
        .await;

    for failure in &report.failures {
        eprintln!("{failure}");
    }
    let written = export_images(&args.out_dir, &report.images)
        .with_context(|| format!("Failed to write images to {}", args.out_dir.display()))?;
    for (path, image) in written.iter().zip(&report.images) {
        eprintln!("Saved: {} ({})", path.display(), image.variant.label());
    }
    eprintln!("{}", report.summary());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_accepts_commas_and_spaces() {
        let parsed = parse_selection(" 3,1  5,3\n").unwrap();
        assert_eq!(parsed.into_iter().collect::<Vec<_>>(), vec![0, 2, 4]);
    }

    #[test]
    fn selection_rejects_zero_and_words() {
        assert!(parse_selection("0").is_err());
        assert!(parse_selection("1,two").is_err());
        assert!(parse_selection("").unwrap().is_empty());
    }
}
