use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: download the tariff catalog, estimate the annual EV
    /// charging cost under every admissible tariff, and write the results.
    Estimate(Box<EstimateArgs>),

    /// Fetch one catalog page and show which records would be admitted.
    Inspect(Box<InspectArgs>),
}

#[derive(Parser)]
pub struct ApiArgs {
    /// OpenEI API key; see <https://openei.org/services/api/signup/>.
    #[clap(long = "api-key", env = "OPENEI_API_KEY")]
    pub api_key: String,

    /// Records per catalog request.
    #[clap(long = "page-size", default_value = "500", env = "OPENEI_PAGE_SIZE")]
    pub page_size: usize,
}

#[derive(Parser)]
pub struct SettingsArgs {
    /// Optional TOML file with exclusion keywords and extra request parameters.
    #[clap(long = "settings", env = "EVCOST_SETTINGS_PATH")]
    pub path: Option<PathBuf>,
}

#[derive(Parser)]
pub struct EstimateArgs {
    #[clap(flatten)]
    pub api: ApiArgs,

    #[clap(flatten)]
    pub settings: SettingsArgs,

    /// Baseline household consumption profile CSV.
    #[clap(
        long = "baseline-profile",
        default_value = "inputs/baseline_profile.csv",
        env = "BASELINE_PROFILE_PATH"
    )]
    pub baseline_profile: PathBuf,

    /// EV charging consumption profile CSV.
    #[clap(
        long = "charging-profile",
        default_value = "inputs/charging_profile.csv",
        env = "CHARGING_PROFILE_PATH"
    )]
    pub charging_profile: PathBuf,

    /// Directory for the result CSV files.
    #[clap(long = "output", default_value = "results", env = "EVCOST_OUTPUT_PATH")]
    pub output: PathBuf,

    /// How many of the cheapest tariffs to print at the end.
    #[clap(long = "top", default_value = "10")]
    pub n_cheapest: usize,
}

#[derive(Parser)]
pub struct InspectArgs {
    #[clap(flatten)]
    pub api: ApiArgs,

    #[clap(flatten)]
    pub settings: SettingsArgs,

    /// Catalog offset of the page to inspect.
    #[clap(long, default_value = "0")]
    pub offset: usize,
}
