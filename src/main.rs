mod aggregate;
mod api;
mod calendar;
mod cli;
mod cost;
mod filter;
mod prelude;
mod profile;
mod quantity;
mod report;
mod settings;
mod tariff;
mod validator;

use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::{
    api::usurdb::Api,
    cli::{Args, Command, EstimateArgs, InspectArgs, SettingsArgs},
    cost::CostModel,
    filter::admit,
    prelude::*,
    profile::ConsumptionProfile,
    report::{ReportWriter, build_admissibility_table, build_cheapest_table},
    settings::Settings,
    tariff::TariffRecord,
};

#[tokio::main]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Args::parse().command {
        Command::Estimate(args) => estimate(*args).await,
        Command::Inspect(args) => inspect(*args).await,
    }
}

fn load_settings(args: &SettingsArgs) -> Result<Settings> {
    args.path.as_deref().map_or_else(|| Ok(Settings::default()), Settings::read_from)
}

async fn estimate(args: EstimateArgs) -> Result {
    let settings = load_settings(&args.settings)?;
    let baseline = ConsumptionProfile::read_from(&args.baseline_profile)?;
    let charging = ConsumptionProfile::read_from(&args.charging_profile)?;
    let api = Api::try_new(args.api.api_key, settings.request_parameters.clone())?;
    let mut report = ReportWriter::try_new(&args.output)?;

    let now = Utc::now();
    let mut offset = 0;
    let mut n_costed: usize = 0;
    let mut n_rejected: usize = 0;
    let mut n_failed: usize = 0;
    let mut summary = Vec::new();

    loop {
        let items = api.get_rates_page(offset, args.api.page_size).await?;
        if items.is_empty() {
            break;
        }
        offset += items.len();
        info!(offset, "Processing…");

        for item in items {
            let record: TariffRecord = match serde_json::from_value(item) {
                Ok(record) => record,
                Err(error) => {
                    warn!(%error, "Skipping an unreadable record");
                    n_failed += 1;
                    continue;
                }
            };
            if let Some(rejection) = admit(&record, &settings.exclusion_keywords, now) {
                report.write_rejection(&record, &rejection)?;
                n_rejected += 1;
                continue;
            }
            let model = CostModel::builder()
                .record(&record)
                .baseline(&baseline)
                .charging(&charging)
                .build();
            match model.annual_cost() {
                Ok(annual_cost) => {
                    report.write_cost(&record, annual_cost)?;
                    summary.push((record.utility.clone(), record.name.clone(), annual_cost));
                    n_costed += 1;
                }
                Err(error) => {
                    // A bad record must not take the batch down with it.
                    error!(label = %record.label, error = format!("{error:#}"), "Skipping");
                    n_failed += 1;
                }
            }
        }
    }

    report.finish()?;
    info!(n_costed, n_rejected, n_failed, "Done");
    println!("{}", build_cheapest_table(&summary, args.n_cheapest));
    Ok(())
}

async fn inspect(args: InspectArgs) -> Result {
    let settings = load_settings(&args.settings)?;
    let api = Api::try_new(args.api.api_key, settings.request_parameters.clone())?;
    let now = Utc::now();

    let mut rows = Vec::new();
    for item in api.get_rates_page(args.offset, args.api.page_size).await? {
        match serde_json::from_value::<TariffRecord>(item) {
            Ok(record) => {
                let rejection = admit(&record, &settings.exclusion_keywords, now);
                rows.push((record.utility, record.name, rejection));
            }
            Err(error) => warn!(%error, "Unreadable record"),
        }
    }
    println!("{}", build_admissibility_table(&rows));
    Ok(())
}
