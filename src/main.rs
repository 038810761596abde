use anyhow::Result;
use kestrel_placement::cli::CliOverrides;
use kestrel_placement::config::AppConfig;
use kestrel_placement::scene::{LevelSummary, PlacementBatch};
use kestrel_placement::{ActorPlacer, AssetCatalog, Level, MaterialInstanceEditor, MaterialRegistry, PlacementOutcome};
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: kestrel_placement [--config FILE] \
     (--catalog FILE --requests FILE [--output FILE] [--align on|off]) | \
     (--materials FILE --instance PATH [--show-hidden on|off])";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = match CliOverrides::parse_from_env() {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("[cli] {err}");
            std::process::exit(2);
        }
    };
    if let Err(err) = run(&cli) {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}

fn run(cli: &CliOverrides) -> Result<()> {
    let mut config = cli.config.as_ref().map(AppConfig::load_or_default).unwrap_or_default();
    let overrides = cli.config_overrides();
    if !overrides.is_empty() {
        info!(fields = ?overrides.applied_fields(), "applying command-line overrides");
        config.apply_overrides(&overrides);
    }

    match (&cli.catalog, &cli.requests, &cli.materials, &cli.instance) {
        (Some(catalog), Some(requests), _, _) => {
            let catalog = AssetCatalog::load(catalog)?;
            let batch = PlacementBatch::load_from_path(requests)?;
            let mut level = Level::with_context(batch.context);
            let placer = ActorPlacer::new(&config.placement);
            for (index, outcome) in placer.place_batch(&mut level, &catalog, &batch.requests).into_iter().enumerate() {
                match outcome {
                    Ok(PlacementOutcome::Placed { label, .. }) => println!("{index}: placed {label}"),
                    Ok(PlacementOutcome::Skipped { reason }) => println!("{index}: skipped ({reason})"),
                    Err(err) => println!("{index}: failed ({err:#})"),
                }
            }
            if let Some(output) = &cli.output {
                LevelSummary::capture(&level).save_to_path(output)?;
                info!(path = %output.display(), actors = level.actor_count(), "wrote level summary");
            }
        }
        (_, _, Some(materials), Some(instance)) => {
            let registry = MaterialRegistry::load(materials)?;
            let editor = MaterialInstanceEditor::open(&registry, instance)?
                .with_history_limit(config.material_editor.history_limit);
            print!("{}", editor.details_layout(config.material_editor.show_hidden_parameters).render());
        }
        _ => println!("{USAGE}"),
    }
    Ok(())
}
