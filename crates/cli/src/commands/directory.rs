//! Directory browsing commands.

use townboard_directory::backend::ListingRow;
use townboard_directory::gateway::ListingFilter;

/// Print listings, optionally filtered by category and search text.
pub async fn listings(
    category: Option<String>,
    search: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = super::bootstrapped_state().await?;

    let filter = ListingFilter { category, search };
    let rows = state.gateway().search(&filter).await?;
    print_listings(&rows);
    Ok(())
}

/// Print the standard category menu.
#[allow(clippy::print_stdout)]
pub fn categories() {
    for category in townboard_core::BUSINESS_CATEGORIES {
        println!("{category}");
    }
}

#[allow(clippy::print_stdout)]
fn print_listings(rows: &[ListingRow]) {
    if rows.is_empty() {
        println!("No listings found");
        return;
    }
    for row in rows {
        println!("{} [{}]", row.name, row.category);
        if let Some(address) = &row.address {
            println!("    {address}");
        }
        if let Some(description) = &row.description {
            println!("    {description}");
        }
    }
    println!("{} listing(s)", rows.len());
}
