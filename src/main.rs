//! CLI interface for sky-flights

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use sky_flights::booking::{self, PassengerDetails};
use sky_flights::logging::{self, LogConfig};
use sky_flights::{
    sort_offers, CabinClass, ClientConfig, FlightClient, FlightOffer, PassengerCounts,
    SearchRequest, SortCriterion, SortOrder,
};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sky-flights")]
#[command(about = "Search, sort and select flights from the Sky Scrapper API")]
#[command(version)]
pub struct Cli {
    /// Write JSON logs to this directory instead of stderr
    #[arg(long, global = true, env = "SKY_FLIGHTS_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search for flights
    Search {
        /// Origin airport code (e.g., JFK)
        #[arg(short, long)]
        from: String,
        /// Destination airport code (e.g., LAX)
        #[arg(short, long)]
        to: String,
        /// Departure date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Cabin class (economy, premium-economy, business, first)
        #[arg(long, default_value = "economy")]
        class: String,
        /// Number of adults
        #[arg(long, default_value = "1")]
        adults: u32,
        /// Number of children
        #[arg(long, default_value = "0")]
        children: u32,
        /// Number of lap infants
        #[arg(long, default_value = "0")]
        infants: u32,
        /// Sort by price, duration or departure
        #[arg(long, default_value = "price")]
        sort: String,
        /// Sort order (asc, desc)
        #[arg(long, default_value = "asc")]
        order: String,
        /// Output file for JSON results
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Select the N-th listed offer (1-based) for the passenger details step
        #[arg(long)]
        select: Option<usize>,
        /// RapidAPI key
        #[arg(long, env = "RAPIDAPI_KEY", hide_env_values = true)]
        api_key: String,
        /// Override the API base URL
        #[arg(long, env = "SKY_SCRAPPER_BASE_URL")]
        base_url: Option<String>,
    },
    /// Book a previously selected offer (demo, nothing is persisted)
    Book {
        /// Selected offer JSON, as written by `search --select`
        #[arg(long)]
        offer: PathBuf,
        /// JSON array of passenger details
        #[arg(long)]
        passengers: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = logging::init(&LogConfig {
        default_directive: cli.log_level.clone(),
        log_dir: cli.log_dir.clone(),
    })?;

    match cli.command {
        Commands::Search {
            from,
            to,
            date,
            class,
            adults,
            children,
            infants,
            sort,
            order,
            output,
            select,
            api_key,
            base_url,
        } => {
            let request = SearchRequest {
                from,
                to,
                date: date.unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string()),
                cabin_class: class.parse::<CabinClass>()?,
                passengers: PassengerCounts::new(adults, children, infants)?,
            };
            let criterion = sort.parse::<SortCriterion>()?;
            let order = order.parse::<SortOrder>()?;

            let mut config = ClientConfig::new(api_key);
            if let Some(base_url) = base_url {
                config = config.with_base_url(base_url);
            }
            let client = FlightClient::new(config)?;

            println!("Searching for flights...");
            let result = match client.search(&request).await {
                Ok(result) => result,
                Err(e) => {
                    eprintln!("Error searching for flights: {}", e);
                    std::process::exit(1);
                }
            };

            if let Some(notice) = result.notice() {
                println!("{}", notice);
                return Ok(());
            }

            let offers = sort_offers(&result.offers, criterion, order);
            for (i, offer) in offers.iter().enumerate() {
                print_offer(i + 1, offer);
            }

            println!("\nSummary:");
            println!("Route: {} -> {}", result.from.label(), result.to.label());
            println!("Found {} flights (sorted by {} {})", offers.len(), criterion, order);
            if result.dropped + result.malformed > 0 {
                println!("Skipped {} unusable itineraries", result.dropped + result.malformed);
            }

            if let Some(output_file) = output {
                fs::write(&output_file, serde_json::to_string_pretty(&offers)?)?;
                println!("Results saved to {}", output_file.display());
            }

            if let Some(index) = select {
                let Some(offer) = index.checked_sub(1).and_then(|i| offers.get(i)) else {
                    bail!("--select must be between 1 and {}", offers.len());
                };
                let selected_path = PathBuf::from("selected-offer.json");
                fs::write(&selected_path, serde_json::to_string_pretty(offer)?)?;
                let forms_path = PathBuf::from("passengers.json");
                fs::write(&forms_path, serde_json::to_string_pretty(&booking::blank_forms(offer))?)?;

                println!(
                    "\nSelected flight {} from {} to {}",
                    offer.flight_number_display(),
                    offer.departure,
                    offer.arrival
                );
                println!(
                    "Fill in {} passenger form(s) in {} and run: sky-flights book --offer {} --passengers {}",
                    offer.passengers.total(),
                    forms_path.display(),
                    selected_path.display(),
                    forms_path.display()
                );
            }
        }
        Commands::Book { offer, passengers } => {
            let offer: FlightOffer = serde_json::from_str(
                &fs::read_to_string(&offer).with_context(|| format!("reading {}", offer.display()))?,
            )
            .context("parsing selected offer")?;
            let details: Vec<PassengerDetails> = serde_json::from_str(
                &fs::read_to_string(&passengers)
                    .with_context(|| format!("reading {}", passengers.display()))?,
            )
            .context("parsing passenger details")?;

            let confirmation = booking::submit(&offer, &details)?;
            println!("{}", confirmation.message);
            println!(
                "{} passenger(s) on {} from {} to {}",
                confirmation.passengers,
                offer.flight_number_display(),
                offer.departure,
                offer.arrival
            );
        }
    }

    Ok(())
}

fn print_offer(position: usize, offer: &FlightOffer) {
    println!("\n--- Flight {} ---", position);
    println!("Airline: {} ({})", offer.airline_display(), offer.flight_number_display());
    println!(
        "Departure: {} {} ({})",
        offer.departure,
        offer.departure_time.time_of_day(),
        offer.departure_time
    );
    println!(
        "Arrival: {} {} ({})",
        offer.arrival,
        offer.arrival_time.time_of_day(),
        offer.arrival_time
    );
    println!("Duration: {}", offer.duration_display());
    println!(
        "Passengers: {} ({} adults, {} children, {} infants)",
        offer.passengers.total(),
        offer.passengers.adults,
        offer.passengers.children,
        offer.passengers.infants
    );
    println!("Price: {}", offer.price_display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "sky-flights",
            "search",
            "--from", "JFK",
            "--to", "LAX",
            "--date", "2026-11-15",
            "--children", "2",
            "--sort", "duration",
            "--api-key", "k",
        ]);

        assert!(cli.is_ok());

        if let Ok(Cli { command: Commands::Search { from, to, date, children, sort, adults, .. }, .. }) = cli {
            assert_eq!(from, "JFK");
            assert_eq!(to, "LAX");
            assert_eq!(date.as_deref(), Some("2026-11-15"));
            assert_eq!(adults, 1);
            assert_eq!(children, 2);
            assert_eq!(sort, "duration");
        }
    }

    #[test]
    fn test_book_parsing() {
        let cli = Cli::try_parse_from([
            "sky-flights",
            "book",
            "--offer", "selected-offer.json",
            "--passengers", "passengers.json",
        ]);
        assert!(matches!(cli, Ok(Cli { command: Commands::Book { .. }, .. })));
    }
}
