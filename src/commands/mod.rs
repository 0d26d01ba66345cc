//! Command implementations: auth, search, listing management, favorites and
//! recommendations. Commands talk to the backend through the `PropertyApi`
//! seam and render listings as plain-text cards.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate};
use clap::Args;
use serde_json::Value;
use tracing::info;

use crate::api::{PropertyApi, SearchFilters};
use crate::auth::{AuthClient, CurrentUser};
use crate::models::{Furnished, ListedBy, ListingType, NewProperty, Property, RegisterUser};

/// Login guard: protected commands call this first and fail with a pointer
/// to `proplist login` when no token is stored.
pub fn require_login(auth: &AuthClient) -> Result<CurrentUser> {
    auth.current_user()?
        .context("Not logged in. Run `proplist login <email> <password>` first")
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// First name
    #[arg(long)]
    pub first_name: String,
    /// Last name
    #[arg(long)]
    pub last_name: String,
    /// Account email
    #[arg(long)]
    pub email: String,
    /// Account password
    #[arg(long)]
    pub password: String,
    /// Repeat the password to guard against typos
    #[arg(long)]
    pub confirm_password: Option<String>,
}

pub async fn register(auth: &AuthClient, args: RegisterArgs) -> Result<()> {
    if let Some(confirm) = &args.confirm_password {
        if confirm != &args.password {
            bail!("Passwords do not match");
        }
    }
    if !args.email.contains('@') {
        bail!("'{}' does not look like an email address", args.email);
    }

    let body = auth
        .register(&RegisterUser {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email.clone(),
            password: args.password,
        })
        .await?;

    if let Some(message) = body.get("message").and_then(Value::as_str) {
        println!("{}", message);
    }
    println!("Registered {}. Log in with `proplist login`.", args.email);
    Ok(())
}

pub async fn login(auth: &AuthClient, email: &str, password: &str) -> Result<()> {
    let user = auth.login(email, password).await?;
    match user.user_id() {
        Some(id) => println!("Logged in as {} (user {})", email, id),
        None => println!("Logged in as {}", email),
    }
    Ok(())
}

pub fn logout(auth: &AuthClient) -> Result<()> {
    if auth.logout()? {
        println!("Logged out.");
    } else {
        println!("No one was logged in.");
    }
    Ok(())
}

pub fn whoami(auth: &AuthClient) -> Result<()> {
    match auth.current_user()? {
        None => println!("Not logged in."),
        Some(user) => {
            match (user.user_id(), user.email()) {
                (Some(id), Some(email)) => println!("Logged in as {} (user {})", email, id),
                (Some(id), None) => println!("Logged in as user {}", id),
                _ => println!("A token is stored but no user id could be decoded from it."),
            }
            if user.is_expired() {
                println!("The stored token has expired; log in again.");
            }
        }
    }
    Ok(())
}

#[derive(Debug, Args, Default)]
pub struct SearchArgs {
    /// Filter by title substring
    #[arg(long)]
    pub title: Option<String>,
    /// Property type name (e.g. Apartment)
    #[arg(long = "type")]
    pub property_type: Option<String>,
    /// Minimum price
    #[arg(long)]
    pub min_price: Option<i64>,
    /// Maximum price
    #[arg(long)]
    pub max_price: Option<i64>,
    /// State name
    #[arg(long)]
    pub state: Option<String>,
    /// City name
    #[arg(long)]
    pub city: Option<String>,
    /// Minimum number of bedrooms
    #[arg(long)]
    pub min_bedrooms: Option<u32>,
    /// Minimum number of bathrooms
    #[arg(long)]
    pub min_bathrooms: Option<u32>,
    /// Amenity name, repeatable
    #[arg(long = "amenity")]
    pub amenities: Vec<String>,
    /// Tag name, repeatable
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    /// Furnishing status: Furnished, Unfurnished or Semi
    #[arg(long)]
    pub furnished: Option<String>,
    /// Minimum rating, 0-5
    #[arg(long)]
    pub min_rating: Option<f32>,
    /// sale or rent
    #[arg(long)]
    pub listing_type: Option<String>,
    /// Available on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub available_from: Option<NaiveDate>,
    /// Print the raw listing array as JSON instead of cards
    #[arg(long)]
    pub json: bool,
}

pub async fn search(api: &dyn PropertyApi, args: SearchArgs) -> Result<()> {
    let json = args.json;
    let filters = build_filters(api, args).await?;
    if filters.is_empty() {
        info!("No filters given; listing everything");
    }
    let listings = api.search(&filters).await?;
    render(&listings, json)
}

/// Translate human-readable filter values into the ids and wire spellings
/// the search endpoint wants, fetching reference data as needed.
pub async fn build_filters(api: &dyn PropertyApi, args: SearchArgs) -> Result<SearchFilters> {
    let mut filters = SearchFilters {
        title: args.title,
        min_price: args.min_price,
        max_price: args.max_price,
        min_bedrooms: args.min_bedrooms,
        min_bathrooms: args.min_bathrooms,
        min_rating: args.min_rating,
        available_from: args.available_from,
        ..Default::default()
    };

    if let Some(name) = &args.property_type {
        filters.type_id = Some(resolve_type_id(api, name).await?);
    }
    if let Some(name) = &args.state {
        filters.state_id = Some(resolve_state_id(api, name).await?);
    }
    if let Some(name) = &args.city {
        filters.city_id = Some(resolve_city_id(api, filters.state_id.as_deref(), name).await?);
    }
    if !args.amenities.is_empty() {
        filters.amenity_ids = resolve_amenity_ids(api, &args.amenities).await?;
    }
    if !args.tags.is_empty() {
        filters.tag_ids = resolve_tag_ids(api, &args.tags).await?;
    }
    if let Some(raw) = &args.furnished {
        filters.furnished = Some(raw.parse::<Furnished>()?.to_string());
    }
    if let Some(raw) = &args.listing_type {
        filters.listing_type = Some(raw.parse::<ListingType>()?.to_string());
    }

    Ok(filters)
}

#[derive(Debug, Args)]
pub struct ListingArgs {
    /// Listing title
    #[arg(long)]
    pub title: String,
    /// Property type name (e.g. Apartment)
    #[arg(long = "type")]
    pub property_type: String,
    /// Asking price (sale) or monthly rent
    #[arg(long)]
    pub price: f64,
    /// State name
    #[arg(long)]
    pub state: String,
    /// City name
    #[arg(long)]
    pub city: String,
    /// Floor area in square feet
    #[arg(long)]
    pub area_sq_ft: f64,
    #[arg(long)]
    pub bedrooms: u32,
    #[arg(long)]
    pub bathrooms: u32,
    /// Amenity name, repeatable
    #[arg(long = "amenity")]
    pub amenities: Vec<String>,
    /// Tag name, repeatable
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    /// Furnished, Unfurnished or Semi
    #[arg(long)]
    pub furnished: Furnished,
    /// Date the property becomes available (YYYY-MM-DD)
    #[arg(long)]
    pub available_from: NaiveDate,
    /// Builder, Owner or Agent
    #[arg(long)]
    pub listed_by: ListedBy,
    /// sale or rent
    #[arg(long)]
    pub listing_type: ListingType,
}

pub async fn create(api: &dyn PropertyApi, args: ListingArgs) -> Result<()> {
    let payload = build_listing(api, args).await?;
    let listing = api.create_listing(&payload).await?;
    println!("Property listed successfully.");
    print_card(1, &listing);
    Ok(())
}

pub async fn update(api: &dyn PropertyApi, id: &str, args: ListingArgs) -> Result<()> {
    let payload = build_listing(api, args).await?;
    let listing = api.update_listing(id, &payload).await?;
    println!("Property updated successfully.");
    print_card(1, &listing);
    Ok(())
}

pub async fn delete(api: &dyn PropertyApi, id: &str) -> Result<()> {
    api.delete_listing(id).await?;
    println!("Property {} deleted.", id);
    Ok(())
}

pub async fn mine(api: &dyn PropertyApi, json: bool) -> Result<()> {
    let listings = api.my_properties().await?;
    render(&listings, json)
}

pub async fn favorites_list(api: &dyn PropertyApi, json: bool) -> Result<()> {
    let listings = api.favorites().await?;
    render(&listings, json)
}

pub async fn favorite_add(api: &dyn PropertyApi, property_id: &str) -> Result<()> {
    api.add_favorite(property_id).await?;
    println!("Property {} added to favourites.", property_id);
    Ok(())
}

pub async fn favorite_remove(api: &dyn PropertyApi, property_id: &str) -> Result<()> {
    api.remove_favorite(property_id).await?;
    println!("Property {} removed from favourites.", property_id);
    Ok(())
}

pub async fn recommend(api: &dyn PropertyApi, property_id: &str, email: &str) -> Result<()> {
    if !email.contains('@') {
        bail!("'{}' does not look like an email address", email);
    }
    api.recommend(property_id, email).await?;
    println!("Property recommended to {}.", email);
    Ok(())
}

pub async fn recommendations(api: &dyn PropertyApi, json: bool) -> Result<()> {
    let listings = api.recommendations().await?;
    if listings.is_empty() && !json {
        println!("No property recommendations available for you at the moment.");
        return Ok(());
    }
    render(&listings, json)
}

/// Validate and resolve a listing form into the backend payload.
async fn build_listing(api: &dyn PropertyApi, args: ListingArgs) -> Result<NewProperty> {
    if args.title.trim().is_empty() {
        bail!("Title must not be empty");
    }
    if args.price <= 0.0 {
        bail!("Price must be positive");
    }
    if args.area_sq_ft <= 0.0 {
        bail!("Area must be positive");
    }

    let type_id = resolve_type_id(api, &args.property_type).await?;
    let state_id = resolve_state_id(api, &args.state).await?;
    let city_id = resolve_city_id(api, Some(&state_id), &args.city).await?;

    let amenity_ids = if args.amenities.is_empty() {
        None
    } else {
        Some(resolve_amenity_ids(api, &args.amenities).await?)
    };
    let tag_ids = if args.tags.is_empty() {
        None
    } else {
        Some(resolve_tag_ids(api, &args.tags).await?)
    };

    Ok(NewProperty {
        title: args.title,
        type_id,
        price: args.price,
        state_id,
        city_id,
        area_sq_ft: args.area_sq_ft,
        bedrooms: args.bedrooms,
        bathrooms: args.bathrooms,
        amenity_ids,
        tag_ids,
        furnished: args.furnished,
        available_from: args.available_from,
        listed_by: args.listed_by,
        listing_type: args.listing_type,
    })
}

async fn resolve_type_id(api: &dyn PropertyApi, name: &str) -> Result<String> {
    let types = api.property_types().await?;
    match types.iter().find(|t| t.name.eq_ignore_ascii_case(name)) {
        Some(found) => Ok(found.id.clone()),
        None => bail!(
            "Unknown property type '{}'. Known types: {}",
            name,
            join_names(types.iter().map(|t| t.name.as_str()))
        ),
    }
}

async fn resolve_state_id(api: &dyn PropertyApi, name: &str) -> Result<String> {
    let states = api.states().await?;
    match states.iter().find(|s| s.state.eq_ignore_ascii_case(name)) {
        Some(found) => Ok(found.id.clone()),
        None => bail!(
            "Unknown state '{}'. Known states: {}",
            name,
            join_names(states.iter().map(|s| s.state.as_str()))
        ),
    }
}

async fn resolve_city_id(
    api: &dyn PropertyApi,
    state_id: Option<&str>,
    name: &str,
) -> Result<String> {
    // Narrow by state when one was chosen
    let cities = match state_id {
        Some(state_id) => api.cities_by_state(state_id).await?,
        None => Vec::new(),
    };
    let cities = if cities.is_empty() {
        api.cities().await?
    } else {
        cities
    };

    match cities.iter().find(|c| c.city.eq_ignore_ascii_case(name)) {
        Some(found) => Ok(found.id.clone()),
        None => bail!(
            "Unknown city '{}'. Known cities: {}",
            name,
            join_names(cities.iter().map(|c| c.city.as_str()))
        ),
    }
}

async fn resolve_amenity_ids(api: &dyn PropertyApi, names: &[String]) -> Result<Vec<String>> {
    let amenities = api.amenities().await?;
    names
        .iter()
        .map(|name| {
            amenities
                .iter()
                .find(|a| a.name.eq_ignore_ascii_case(name))
                .map(|a| a.id.clone())
                .with_context(|| {
                    format!(
                        "Unknown amenity '{}'. Known amenities: {}",
                        name,
                        join_names(amenities.iter().map(|a| a.name.as_str()))
                    )
                })
        })
        .collect()
}

async fn resolve_tag_ids(api: &dyn PropertyApi, names: &[String]) -> Result<Vec<String>> {
    let tags = api.property_tags().await?;
    names
        .iter()
        .map(|name| {
            tags.iter()
                .find(|t| t.name.eq_ignore_ascii_case(name))
                .map(|t| t.id.clone())
                .with_context(|| {
                    format!(
                        "Unknown tag '{}'. Known tags: {}",
                        name,
                        join_names(tags.iter().map(|t| t.name.as_str()))
                    )
                })
        })
        .collect()
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let joined: Vec<&str> = names.collect();
    if joined.is_empty() {
        "(none)".to_string()
    } else {
        joined.join(", ")
    }
}

fn render(listings: &[Property], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(listings)?);
        return Ok(());
    }

    if listings.is_empty() {
        println!("No properties found. Try adjusting your filters.");
        return Ok(());
    }

    info!("Rendering {} listing(s)", listings.len());
    for (i, listing) in listings.iter().enumerate() {
        print_card(i + 1, listing);
    }
    Ok(())
}

fn print_card(index: usize, listing: &Property) {
    let price_suffix = match listing.listing_type {
        Some(ListingType::Rent) => " / month",
        _ => "",
    };
    println!("{}. {} (${}{})", index, listing.title, listing.price, price_suffix);
    if let Some(kind) = &listing.property_type {
        println!("   Type: {}", kind);
    }
    if !listing.city.is_empty() || !listing.state.is_empty() {
        println!("   Location: {}, {}", listing.city, listing.state);
    }
    println!("   Area: {} sq ft", listing.area_sq_ft);
    println!("   Beds: {}, Baths: {}", listing.bedrooms, listing.bathrooms);
    if let Some(furnished) = &listing.furnished {
        println!("   Furnished: {}", furnished);
    }
    if let Some(raw) = &listing.available_from {
        println!("   Available: {}", format_date(raw));
    }
    if !listing.amenities.is_empty() {
        println!("   Amenities: {}", listing.amenities.join(", "));
    }
    if !listing.tags.is_empty() {
        println!("   Tags: {}", listing.tags.join(", "));
    }
    if let Some(listed_by) = &listing.listed_by {
        println!("   Listed By: {}", listed_by);
    }
    if let Some(rating) = listing.rating {
        println!("   Rating: {:.1}/5", rating);
    }
    println!("   ID: {}", listing.id);
    println!();
}

/// Dates arrive as ISO datetimes or plain dates; show the date part and
/// fall back to the raw value rather than erroring a whole card.
fn format_date(raw: &str) -> String {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return datetime.date_naive().to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.to_string();
    }
    raw.to_string()
}
