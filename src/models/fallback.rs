//! Built-in catalog shown when the backend has no rows yet, and inserted by
//! the admin seed action.

use uuid::Uuid;

use crate::models::destination::{Destination, DestinationInput};
use crate::models::package::{Package, PackageInput, PackageTheme};

pub fn fallback_destinations() -> Vec<DestinationInput> {
    [
        (
            "Santorini",
            "Greece",
            "May to October",
            "Whitewashed cliff villages above a flooded caldera, with sunset views over the Aegean.",
            "https://images.unsplash.com/photo-1570077188670-e3a8d69ac5ff",
        ),
        (
            "Kyoto",
            "Japan",
            "March to May",
            "Temple gardens, tea houses and cherry blossom along the Philosopher's Path.",
            "https://images.unsplash.com/photo-1493976040374-85c8e12f0c0e",
        ),
        (
            "Banff",
            "Canada",
            "June to September",
            "Glacier lakes and alpine trails in the heart of the Canadian Rockies.",
            "https://images.unsplash.com/photo-1503614472-8c93d56e92ce",
        ),
        (
            "Marrakech",
            "Morocco",
            "October to April",
            "Souks, riads and day trips to the Atlas Mountains.",
            "https://images.unsplash.com/photo-1597212618440-806262de4f6b",
        ),
        (
            "Queenstown",
            "New Zealand",
            "December to February",
            "Lake cruises, vineyards and the fjords of Milford Sound.",
            "https://images.unsplash.com/photo-1507699622108-4be3abd695ad",
        ),
    ]
    .into_iter()
    .map(|(name, region, season, description, image)| DestinationInput {
        name: name.to_string(),
        region: region.to_string(),
        season: season.to_string(),
        description: description.to_string(),
        image_url: Some(image.to_string()),
    })
    .collect()
}

pub fn fallback_packages() -> Vec<PackageInput> {
    [
        (
            "Explorer",
            "$1,299",
            PackageTheme::White,
            vec![
                "5 nights in 3-star hotels",
                "Airport transfers",
                "Daily breakfast",
                "Guided city walk",
            ],
        ),
        (
            "Adventurer",
            "$2,499",
            PackageTheme::Teal,
            vec![
                "7 nights in boutique hotels",
                "Return flights",
                "Two guided excursions",
                "Travel insurance",
                "24/7 trip support",
            ],
        ),
        (
            "Luxury Escape",
            "$4,999",
            PackageTheme::Periwinkle,
            vec![
                "10 nights in 5-star resorts",
                "Business class flights",
                "Private guide and driver",
                "Spa day",
                "Concierge service",
            ],
        ),
    ]
    .into_iter()
    .map(|(name, price, color, features)| PackageInput {
        name: name.to_string(),
        price: price.to_string(),
        color,
        features: features.iter().map(|f| f.to_string()).collect(),
    })
    .collect()
}

/// Display records for the fallback catalog. Ids are stable across calls.
pub fn fallback_destination_records() -> Vec<Destination> {
    fallback_destinations()
        .into_iter()
        .enumerate()
        .map(|(i, input)| Destination {
            id: Uuid::from_u128(0xd000 + i as u128),
            name: input.name,
            region: input.region,
            season: input.season,
            description: input.description,
            image_url: input.image_url,
            created_at: None,
        })
        .collect()
}

pub fn fallback_package_records() -> Vec<Package> {
    fallback_packages()
        .into_iter()
        .enumerate()
        .map(|(i, input)| Package {
            id: Uuid::from_u128(0xf000 + i as u128),
            name: input.name,
            price: input.price,
            color: input.color,
            features: input.features,
            created_at: None,
        })
        .collect()
}

/// True for ids handed out by [`fallback_package_records`]; no stored row has them.
pub fn is_fallback_package(id: Uuid) -> bool {
    fallback_package_records().iter().any(|package| package.id == id)
}
