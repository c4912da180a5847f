use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use tcg_catalog::WalkOptions;
use tcg_catalog_import::{PipelineOptions, RemoteSource, RunSummary, run_local, run_pipeline};
use tcg_catalog_sources::TcgdexClient;

use crate::CliError;
use crate::cli_types::BuildArgs;
use crate::progress::BarProgress;
use crate::settings::Settings;

use super::open_store;

/// Run the full pipeline and print what was stored.
pub(crate) async fn run_build(
    settings: &Settings,
    args: BuildArgs,
    quiet: bool,
) -> Result<(), CliError> {
    let db_path = args.db.unwrap_or_else(|| settings.database_path.clone());
    let options = PipelineOptions {
        data_dir: args.data_dir.unwrap_or_else(|| settings.data_dir.clone()),
        walk: WalkOptions {
            extension: args
                .extension
                .unwrap_or_else(|| settings.file_extension.clone()),
            convention: args
                .series_folder
                .map(Into::into)
                .unwrap_or(settings.series_folder),
        },
        archive_path: args.archive.or_else(|| settings.archive_path.clone()),
        allow_empty_catalog: args.allow_empty,
    };

    let conn = open_store(&db_path)?;

    log::info!(
        "{}",
        format!(
            "Building catalog from {} into {}",
            options.data_dir.display(),
            db_path.display()
        )
        .if_supports_color(Stdout, |t| t.bold()),
    );

    let progress = BarProgress::new(quiet);
    let result = if args.remote || settings.remote.enabled {
        let client = TcgdexClient::new(&settings.remote.base_url)
            .map_err(|e| CliError::remote(format!("Failed to create client: {}", e)))?;
        let mut fetch = settings.remote.fetch_options();
        fetch.limit = args.limit.or(fetch.limit);
        log::info!("  Remote API: {}", client.base_url());
        let remote = RemoteSource {
            api: &client,
            options: fetch,
        };
        run_pipeline(&conn, &options, Some(remote), &progress).await
    } else {
        run_local(&conn, &options, &progress).await
    };
    progress.clear();

    let summary = result?;
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    crate::log_blank();
    log::info!(
        "  Walked:        {} series, {} sets, {} cards",
        summary.walked_series,
        summary.walked_sets,
        summary.walked_cards,
    );

    if let Some(fetch) = &summary.fetch {
        log::info!(
            "  Remote:        {} sets ({} failed), {} cards ({} failed)",
            fetch.sets_fetched,
            fetch.sets_failed,
            fetch.cards_fetched,
            fetch.cards_failed,
        );
    }

    for source in &summary.report.sources {
        log::info!(
            "  {:<14} {} sets matched, {} unmatched, {} cards supplemented",
            format!("{}:", source.source),
            source.matched_sets,
            source.unmatched_sets,
            source.supplemented_cards,
        );
    }

    let duplicates: Vec<&str> = summary.report.all_duplicate_names().collect();
    if !duplicates.is_empty() {
        log::warn!(
            "  {} {} ambiguous set name(s): {}",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            duplicates.len(),
            duplicates.join(", "),
        );
    }

    let stored = &summary.persisted;
    crate::log_blank();
    log::info!(
        "{} Stored {} series, {} sets, {} cards, {} search rows",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        stored.series,
        stored.sets,
        stored.cards,
        stored.search_rows,
    );
    if stored.skipped_cards > 0 {
        log::warn!("  Skipped {} cards without a set", stored.skipped_cards);
    }
}
