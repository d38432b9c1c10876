//! Championship tree generator.
//!
//! Loads the participants of a championship, optionally stores new settings,
//! then replaces the championship's first rounds in one transaction.

mod config;
mod logging;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Error};
use kendo_tournaments::{
    db::{ChampionshipSource, Database, PgTreeRepository},
    tree::{ChampionshipId, EntityLevel, Round, TreeGenerator},
};
use log::{info, warn};
use pico_args::Arguments;

use config::{SettingsOverrides, TreegenConfig};

const HELP: &str = "\
Generate the first rounds of a championship tree

USAGE:
  kt_treegen --championship ID [OPTIONS]

OPTIONS:
  --championship  ID      Championship to generate
  --db-url        URL     Database connection string  [default: env DATABASE_URL or postgres://postgres@localhost/kendo_tournaments]
  --group-by      LEVEL   Keep fighters of one federation|association|club apart  [default: env TREEGEN_GROUP_BY]
  --group-size    N       Preliminary group size (3, 4 or 5)
  --tree-type     TYPE    round-robin|direct-elimination
  --areas         N       Number of fighting areas (1, 2, 4 or 8)

FLAGS:
  --preliminary           Fight preliminary groups before the tree
  --no-preliminary        Go straight to the tree
  --init-schema           Create missing tables first
  --json                  Print the stored rounds as JSON
  -h, --help              Print help information

Settings options are merged into the stored settings and saved before
generation.

ENVIRONMENT:
  DATABASE_URL            PostgreSQL connection string
  TREEGEN_GROUP_BY        Default entity level
  TREEGEN_INIT_SCHEMA     Create missing tables first (true|false)
  RUST_LOG                Log filter [default: info,sqlx=warn]
";

struct Args {
    championship: ChampionshipId,
    database_url: Option<String>,
    group_by: Option<EntityLevel>,
    overrides: SettingsOverrides,
    init_schema: bool,
    json: bool,
}

fn parse_args(mut pargs: Arguments) -> Result<Args, Error> {
    let has_preliminary = if pargs.contains("--preliminary") {
        Some(true)
    } else if pargs.contains("--no-preliminary") {
        Some(false)
    } else {
        None
    };

    let args = Args {
        championship: pargs
            .value_from_str("--championship")
            .context("--championship ID is required")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
        group_by: pargs.opt_value_from_str("--group-by")?,
        overrides: SettingsOverrides {
            has_preliminary,
            preliminary_group_size: pargs.opt_value_from_str("--group-size")?,
            tree_type: pargs.opt_value_from_str("--tree-type")?,
            fighting_areas: pargs.opt_value_from_str("--areas")?,
        },
        init_schema: pargs.contains("--init-schema"),
        json: pargs.contains("--json"),
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        warn!("Ignoring unused arguments: {remaining:?}");
    }

    Ok(args)
}

fn print_rounds(rounds: &[Round]) {
    for round in rounds {
        let members = if round.member_ids.is_empty() {
            "-".to_string()
        } else {
            round
                .member_ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" vs ")
        };
        println!("area {} round {:>2}: {members}", round.area, round.order);
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    logging::init();
    let args = parse_args(pargs)?;

    let config = TreegenConfig::from_env(args.database_url, args.group_by)?;
    config.validate()?;

    info!("Connecting to database: {}", config.database.database_url);
    let db = Database::new(&config.database)
        .await
        .context("Failed to connect to database")?;

    if args.init_schema || config.init_schema {
        db.apply_schema().await.context("Failed to create schema")?;
        info!("Schema ready");
    }

    let repository = Arc::new(PgTreeRepository::new(db.pool().clone()));
    let generator =
        TreeGenerator::from_repository(repository.clone()).with_group_by(config.group_by);

    if !args.overrides.is_empty() {
        let stored = repository.get_championship(args.championship).await?;
        let settings = args.overrides.apply(stored.settings);
        generator
            .update_settings(args.championship, &settings)
            .await
            .context("Failed to save settings")?;
        info!("Saved settings for championship {}: {settings:?}", args.championship);
    }

    let start = Instant::now();
    let rounds = generator
        .generate_bracket(args.championship)
        .await
        .with_context(|| format!("Failed to generate tree for championship {}", args.championship))?;
    logging::log_generation(
        args.championship,
        rounds.len(),
        start.elapsed().as_millis() as u64,
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rounds)?);
    } else {
        print_rounds(&rounds);
    }

    db.close().await;
    Ok(())
}
