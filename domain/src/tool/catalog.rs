//! The closed tool catalog
//!
//! Exactly eleven tools exist. Their names, parameter schemas and the fixed
//! priority order used by selection and aggregation are defined here; the
//! registry rejects anything else at start-up.

use super::entities::{ParamType, ToolDefinition, ToolParameter};

/// Semantic search over the curated knowledge store
pub const SEARCH_DATE_IDEAS: &str = "search_date_ideas";
/// Featured / special items from the knowledge store
pub const SEARCH_FEATURED_DATES: &str = "search_featured_dates";
/// Real-time place search
pub const GOOGLE_PLACES_SEARCH: &str = "google_places_search";
/// Venues near a coordinate
pub const FIND_NEARBY_VENUES: &str = "find_nearby_venues";
pub const GET_DIRECTIONS: &str = "get_directions";
pub const WEB_SCRAPE_VENUE_INFO: &str = "web_scrape_venue_info";
/// General web search with automatic crawling of top results
pub const ENHANCED_WEB_SEARCH: &str = "enhanced_web_search";
pub const GEOCODE_LOCATION: &str = "geocode_location";
/// Legacy web search alias
pub const WEB_SEARCH: &str = "web_search";
/// JavaScript-rendering scrape
pub const SCRAPINGBEE_SCRAPE: &str = "scrapingbee_scrape";
/// Event-platform search
pub const EVENTBRITE_SEARCH: &str = "eventbrite_search";

/// All catalog tools, highest priority first.
///
/// The curated knowledge store leads; utility tools that rarely produce
/// recommendable entities (geocoding, directions) trail.
pub const TOOL_PRIORITY: [&str; 11] = [
    SEARCH_DATE_IDEAS,
    SEARCH_FEATURED_DATES,
    GOOGLE_PLACES_SEARCH,
    FIND_NEARBY_VENUES,
    ENHANCED_WEB_SEARCH,
    EVENTBRITE_SEARCH,
    WEB_SEARCH,
    WEB_SCRAPE_VENUE_INFO,
    SCRAPINGBEE_SCRAPE,
    GEOCODE_LOCATION,
    GET_DIRECTIONS,
];

/// Tools forced after the intent recommendations when diversity is short
pub const BASELINE_FORCED_TOOLS: [&str; 4] = [
    SEARCH_DATE_IDEAS,
    GOOGLE_PLACES_SEARCH,
    ENHANCED_WEB_SEARCH,
    EVENTBRITE_SEARCH,
];

/// Rank of a tool in [`TOOL_PRIORITY`] (lower is better).
///
/// Names outside the catalog rank after every catalog tool.
pub fn priority(tool_name: &str) -> usize {
    TOOL_PRIORITY
        .iter()
        .position(|t| *t == tool_name)
        .unwrap_or(TOOL_PRIORITY.len())
}

pub fn is_catalog_tool(tool_name: &str) -> bool {
    TOOL_PRIORITY.contains(&tool_name)
}

/// Definition of one catalog tool
pub fn definition(tool_name: &str) -> Option<ToolDefinition> {
    let def = match tool_name {
        SEARCH_DATE_IDEAS => ToolDefinition::new(
            SEARCH_DATE_IDEAS,
            "Search the curated knowledge base for date ideas using semantic similarity and filters.",
        )
        .with_parameter(ToolParameter::new(
            "query",
            "Natural language query describing the desired date idea",
            true,
        ))
        .with_parameter(ToolParameter::new("city", "City to filter by", false))
        .with_parameter(
            ToolParameter::new(
                "max_price_tier",
                "Maximum price tier (1=budget, 2=moderate, 3=expensive)",
                false,
            )
            .with_type(ParamType::Integer)
            .with_allowed([1, 2, 3]),
        )
        .with_parameter(
            ToolParameter::new("indoor", "Whether the activity should be indoors", false)
                .with_type(ParamType::Boolean),
        )
        .with_parameter(
            ToolParameter::new(
                "categories",
                "Categories to filter by (e.g., romantic, outdoor, food)",
                false,
            )
            .with_type(ParamType::StringArray),
        )
        .with_parameter(
            ToolParameter::new("min_duration", "Minimum duration in minutes", false)
                .with_type(ParamType::Integer),
        )
        .with_parameter(
            ToolParameter::new("max_duration", "Maximum duration in minutes", false)
                .with_type(ParamType::Integer),
        )
        .with_parameter(
            ToolParameter::new("top_k", "Number of results to return", false)
                .with_type(ParamType::Integer),
        ),

        SEARCH_FEATURED_DATES => ToolDefinition::new(
            SEARCH_FEATURED_DATES,
            "Search for featured, unique, or special date ideas in the knowledge base.",
        )
        .with_parameter(ToolParameter::new("city", "City to search in", false))
        .with_parameter(ToolParameter::new(
            "category",
            "Specific category of featured dates (romantic, adventure, cultural, etc.)",
            false,
        )),

        GOOGLE_PLACES_SEARCH => ToolDefinition::new(
            GOOGLE_PLACES_SEARCH,
            "Search for places, restaurants and venues with detailed real-time information.",
        )
        .with_parameter(ToolParameter::new(
            "query",
            "Search query for places (e.g., 'romantic restaurants', 'art galleries')",
            true,
        ))
        .with_parameter(ToolParameter::new(
            "location",
            "Location to search around (city name or address)",
            false,
        ))
        .with_parameter(
            ToolParameter::new("radius", "Search radius in meters (default 25km)", false)
                .with_type(ParamType::Integer),
        ),

        FIND_NEARBY_VENUES => ToolDefinition::new(
            FIND_NEARBY_VENUES,
            "Find venues near a specific latitude/longitude coordinate.",
        )
        .with_parameter(
            ToolParameter::new("lat", "Latitude coordinate", true).with_type(ParamType::Number),
        )
        .with_parameter(
            ToolParameter::new("lon", "Longitude coordinate", true).with_type(ParamType::Number),
        )
        .with_parameter(ToolParameter::new(
            "venue_type",
            "Type of venue (restaurant, entertainment, museum, etc.)",
            false,
        ))
        .with_parameter(
            ToolParameter::new("radius_km", "Search radius in kilometers", false)
                .with_type(ParamType::Number),
        ),

        GET_DIRECTIONS => ToolDefinition::new(
            GET_DIRECTIONS,
            "Get directions and travel information between two locations.",
        )
        .with_parameter(ToolParameter::new(
            "origin",
            "Starting location (address or place name)",
            true,
        ))
        .with_parameter(ToolParameter::new(
            "destination",
            "Destination location (address or place name)",
            true,
        ))
        .with_parameter(
            ToolParameter::new("mode", "Transportation mode", false)
                .with_allowed(["driving", "walking", "transit", "bicycling"]),
        ),

        WEB_SCRAPE_VENUE_INFO => ToolDefinition::new(
            WEB_SCRAPE_VENUE_INFO,
            "Scrape detailed information from a venue's website including hours, menu, events and contact info.",
        )
        .with_parameter(ToolParameter::new("url", "Website URL to scrape", true))
        .with_parameter(ToolParameter::new(
            "venue_name",
            "Name of the venue (helps with extraction)",
            false,
        )),

        ENHANCED_WEB_SEARCH => ToolDefinition::new(
            ENHANCED_WEB_SEARCH,
            "Web search with specialised result types for venues and events; top results are crawled automatically.",
        )
        .with_parameter(ToolParameter::new("query", "Search query", true))
        .with_parameter(ToolParameter::new("city", "City to focus search on", false))
        .with_parameter(
            ToolParameter::new("result_type", "Type of information to focus on", false)
                .with_allowed(["general", "events", "reviews", "deals", "hours"]),
        ),

        GEOCODE_LOCATION => ToolDefinition::new(
            GEOCODE_LOCATION,
            "Convert an address or place name to latitude/longitude coordinates.",
        )
        .with_parameter(ToolParameter::new(
            "address",
            "Address or place name to geocode",
            true,
        )),

        WEB_SEARCH => ToolDefinition::new(
            WEB_SEARCH,
            "Basic web search for venue hours, tickets, or new events. Prefer enhanced_web_search.",
        )
        .with_parameter(ToolParameter::new("query", "Search query", true))
        .with_parameter(ToolParameter::new("city", "City to focus search on", false)),

        SCRAPINGBEE_SCRAPE => ToolDefinition::new(
            SCRAPINGBEE_SCRAPE,
            "Advanced scraping for JavaScript-heavy sites.",
        )
        .with_parameter(ToolParameter::new("url", "Website URL to scrape", true))
        .with_parameter(
            ToolParameter::new("premium_proxy", "Use premium proxy for better success rate", false)
                .with_type(ParamType::Boolean),
        )
        .with_parameter(ToolParameter::new(
            "country_code",
            "Country code for proxy location",
            false,
        )),

        EVENTBRITE_SEARCH => ToolDefinition::new(
            EVENTBRITE_SEARCH,
            "Search for events on the event platform.",
        )
        .with_parameter(ToolParameter::new("query", "Event search query", true))
        .with_parameter(ToolParameter::new("city", "City to search in", false))
        .with_parameter(ToolParameter::new(
            "date_range",
            "Date range for events (e.g., 'today', 'this weekend')",
            false,
        )),

        _ => return None,
    };
    Some(def)
}

/// Definitions of every catalog tool in priority order
pub fn catalog() -> Vec<ToolDefinition> {
    TOOL_PRIORITY.iter().filter_map(|name| definition(name)).collect()
}
