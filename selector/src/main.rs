//! Terminal region picker.
//!
//! Loads the region list from the configured directory, asks for a region and
//! one of its sub-regions, then confirms. The navigation request is printed.
//!
//! ```sh
//! cargo run --bin region-picker
//! REGION_DIRECTORY_URL=http://localhost:8080 REGION_DIRECTORY_LAYOUT=generic \
//!     cargo run --bin region-picker
//! ```

use anyhow::Context;
use cascade_core::environment::SystemClock;
use cascade_runtime::Store;
use region_selector::{
    HttpRegionDirectory, LoadStatus, NavigationParams, Navigator, RegionCode, SelectorAction,
    SelectorEnvironment, SelectorError, SelectorReducer, SelectorState, SubRegionName,
    config::SelectorConfig,
};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type PickerStore = Store<SelectorState, SelectorAction, SelectorEnvironment, SelectorReducer>;

const CONFIRM_TIMEOUT: Duration = Duration::from_secs(5);
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Navigator that prints the request instead of changing screens
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate_to(&self, screen: &str, params: NavigationParams) {
        let rendered = serde_json::to_string(&params).unwrap_or_else(|_| format!("{params:?}"));
        println!("\n→ navigate_to({screen}, {rendered})");
    }
}

struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Ask a question; `None` means the user quit or closed stdin
    async fn ask(&mut self, question: &str) -> anyhow::Result<Option<String>> {
        print!("{question} ");
        std::io::stdout().flush()?;

        let answer = self.lines.next_line().await?;
        Ok(answer
            .map(|line| line.trim().to_string())
            .filter(|line| !line.eq_ignore_ascii_case("q")))
    }
}

async fn dispatch(store: &PickerStore, action: SelectorAction) -> anyhow::Result<()> {
    store.send(action).await?.wait().await;
    Ok(())
}

fn print_columns<T: std::fmt::Display>(items: &[T], numbered: bool) {
    for (row, chunk) in items.chunks(6).enumerate() {
        let line: Vec<String> = chunk
            .iter()
            .enumerate()
            .map(|(col, item)| {
                if numbered {
                    format!("{:>3}. {item:<22}", row * 6 + col + 1)
                } else {
                    format!("{item:<4}")
                }
            })
            .collect();
        println!("  {}", line.join(" "));
    }
}

/// Load regions, offering retries on failure; `false` if the user gave up
async fn load_regions(store: &PickerStore, prompt: &mut Prompt) -> anyhow::Result<bool> {
    dispatch(store, SelectorAction::Initialize).await?;

    loop {
        let status = store.state(|s| s.regions.status.clone()).await;
        match status {
            LoadStatus::Loaded => return Ok(true),
            LoadStatus::Failed { message } => {
                println!("Could not load regions: {message}");
                if prompt.ask("Press Enter to retry (q to quit):").await?.is_none() {
                    return Ok(false);
                }
                dispatch(store, SelectorAction::RetryRegions).await?;
            },
            LoadStatus::Idle | LoadStatus::Loading { .. } => {
                tokio::time::sleep(Duration::from_millis(50)).await;
            },
        }
    }
}

/// Message shown when the sub-region list cannot be offered
fn sub_region_notice(status: &LoadStatus) -> Option<String> {
    match status {
        LoadStatus::Failed { message } => Some(format!("Could not load sub-regions: {message}")),
        LoadStatus::Idle => Some("No sub-region lookup is running; pick a region first.".to_string()),
        LoadStatus::Loaded | LoadStatus::Loading { .. } => None,
    }
}

/// Make sure the sub-regions of the selected region are loaded
async fn load_sub_regions(store: &PickerStore, prompt: &mut Prompt) -> anyhow::Result<bool> {
    loop {
        let status = store.state(|s| s.sub_regions.status.clone()).await;
        if let Some(notice) = sub_region_notice(&status) {
            println!("{notice}");
        }
        match status {
            LoadStatus::Loaded => return Ok(true),
            LoadStatus::Failed { .. } => {
                if prompt.ask("Press Enter to retry (q to pick another region):").await?.is_none() {
                    return Ok(false);
                }
                dispatch(store, SelectorAction::RetrySubRegions).await?;
            },
            LoadStatus::Idle => return Ok(false),
            LoadStatus::Loading { .. } => {
                tokio::time::sleep(Duration::from_millis(50)).await;
            },
        }
    }
}

/// Resolve a typed answer to a sub-region, accepting list numbers
fn resolve_sub_region(answer: &str, options: &[SubRegionName]) -> Option<SubRegionName> {
    match answer.parse::<usize>() {
        Ok(index) if index > 0 => options.get(index - 1).cloned(),
        _ => SubRegionName::parse_selection(answer),
    }
}

fn report_rejection(error: Option<SelectorError>) -> bool {
    match error {
        Some(error) if !error.is_network() => {
            println!("{error}");
            true
        },
        _ => false,
    }
}

/// Run the picker; `true` once navigation happened
async fn run(store: &PickerStore) -> anyhow::Result<bool> {
    let mut prompt = Prompt::new();

    if !load_regions(store, &mut prompt).await? {
        return Ok(false);
    }

    loop {
        let regions = store.state(|s| s.regions.items.clone()).await;
        println!("\nRegions:");
        print_columns(&regions, false);

        let Some(answer) = prompt.ask("Region code (0 to clear, q to quit):").await? else {
            return Ok(false);
        };
        dispatch(store, SelectorAction::SelectRegion(RegionCode::parse_selection(&answer))).await?;
        if report_rejection(store.state(|s| s.last_error.clone()).await) {
            continue;
        }

        let Some(region) = store.state(|s| s.selection.region.clone()).await else {
            continue;
        };
        if !load_sub_regions(store, &mut prompt).await? {
            continue;
        }

        let options = store.state(|s| s.sub_regions.items.clone()).await;
        println!("\nSub-regions of {region}:");
        print_columns(&options, true);

        let Some(answer) = prompt.ask("Sub-region (name or number):").await? else {
            continue;
        };
        let choice = resolve_sub_region(&answer, &options);
        dispatch(store, SelectorAction::SelectSubRegion(choice)).await?;
        if report_rejection(store.state(|s| s.last_error.clone()).await) {
            continue;
        }

        let Some(answer) = prompt.ask("Confirm? [Y/n]").await? else {
            return Ok(false);
        };
        if answer.eq_ignore_ascii_case("n") {
            continue;
        }

        let outcome = store
            .send_and_wait_for(
                SelectorAction::Confirm,
                |action| {
                    matches!(
                        action,
                        SelectorAction::Navigated { .. } | SelectorAction::ConfirmRejected { .. }
                    )
                },
                CONFIRM_TIMEOUT,
            )
            .await?;

        match outcome {
            SelectorAction::ConfirmRejected { reason } => println!("{reason}"),
            _ => return Ok(true),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "region_selector=debug,region_directory=debug,cascade_runtime=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = SelectorConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        url = %config.directory.base_url,
        layout = %config.directory.layout,
        policy = %config.confirm_policy,
        "Starting region picker"
    );

    let directory = HttpRegionDirectory::from_config(&config.directory)
        .context("cannot build directory client")?;
    let env = SelectorEnvironment::new(
        Arc::new(directory),
        Arc::new(ConsoleNavigator),
        Arc::new(SystemClock),
    )
    .with_confirm_policy(config.confirm_policy)
    .with_next_screen(config.next_screen.as_str());

    let store = Store::new(SelectorState::new(), SelectorReducer::new(), env);

    println!("=== Region Picker ===");
    let navigated = run(&store).await?;
    if !navigated {
        println!("Bye.");
    }

    store.shutdown(SHUTDOWN_TIMEOUT).await?;
    Ok(())
}
