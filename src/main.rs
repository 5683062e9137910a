//! Run a ShareWood.tv search from the command line and print the results

use anyhow::{bail, Context, Result};

use sharewood_automator::{Automator, Config, SearchCriteria, SortDirection, SortKey};

fn main() -> Result<()> {
    if let Some(log_path) = sharewood_automator::log::init_log() {
        eprintln!("logging to {}", log_path.display());
    }

    let config = Config::from_env().context("loading configuration")?;
    let query = std::env::args().nth(1).unwrap_or_else(|| "ubuntu".to_string());
    eprintln!("searching for \"{}\"", query);

    let automator = Automator::new(config)?;

    if !automator.connect()? {
        bail!("login did not complete; check credentials and site availability");
    }

    let mut criteria = SearchCriteria::for_query(query);
    criteria.sorting = Some(SortKey::CreatedAt);
    criteria.direction = Some(SortDirection::Desc);

    let results = automator.search(&criteria)?;
    eprintln!("{} results", results.len());
    println!("{}", serde_json::to_string_pretty(&results)?);

    automator.disconnect()?;
    Ok(())
}
