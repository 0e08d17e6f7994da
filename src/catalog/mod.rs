//! Destination catalog
//!
//! The static reference list of browsable places shown on the map when no
//! AI search result set is active, plus the city directory used by the
//! departure picker.

pub mod cities;

use crate::types::{Destination, DestinationKind, SocialNote};
use std::sync::{Arc, LazyLock};

pub use cities::{CityDirectory, Country, Region};

struct Row {
    id: &'static str,
    kind: DestinationKind,
    name: &'static str,
    location: &'static str,
    lat: f64,
    lng: f64,
    rating: f32,
    tags: &'static [&'static str],
    travel_time: &'static str,
    transport: &'static str,
    duration: &'static str,
    budget: &'static str,
    description: &'static str,
    reason: &'static str,
    image: &'static str,
    price: Option<&'static str>,
    distance: &'static str,
}

const IMAGE_BASE: &str = "https://images.unsplash.com/photo-";
const IMAGE_PARAMS: &str = "?auto=format&fit=crop&w=300&q=80";

const ROWS: &[Row] = &[
    Row {
        id: "1",
        kind: DestinationKind::Destination,
        name: "Yanqi Lake",
        location: "Huairou, Beijing",
        lat: 40.395,
        lng: 116.685,
        rating: 4.8,
        tags: &["Popular", "Family"],
        travel_time: "25m",
        transport: "Self-drive",
        duration: "1 day",
        budget: "¥200",
        description: "The West Lake of the north.",
        reason: "Stunning lakeside scenery all year round.",
        image: "1501785888041-af3ef285b470",
        price: None,
        distance: "15km",
    },
    Row {
        id: "2",
        kind: DestinationKind::Destination,
        name: "Mutianyu Great Wall",
        location: "Huairou, Beijing",
        lat: 40.431,
        lng: 116.562,
        rating: 4.9,
        tags: &["Majestic", "Must-see"],
        travel_time: "45m",
        transport: "Self-drive",
        duration: "Half day",
        budget: "¥150",
        description: "The finest restored stretch of the Wall.",
        reason: "Cable car to the ridge, easy for older travellers.",
        image: "1508804185872-d7badad00f7d",
        price: None,
        distance: "28km",
    },
    Row {
        id: "3",
        kind: DestinationKind::Destination,
        name: "Olympic Forest Park",
        location: "Chaoyang, Beijing",
        lat: 40.015,
        lng: 116.392,
        rating: 4.7,
        tags: &["Running", "Fresh air"],
        travel_time: "15m",
        transport: "Metro",
        duration: "3 hours",
        budget: "Free",
        description: "The green lung of the city.",
        reason: "The largest urban green landscape in Asia.",
        image: "1441974231531-c6227db76b6e",
        price: None,
        distance: "5km",
    },
    Row {
        id: "4",
        kind: DestinationKind::Destination,
        name: "Temple of Heaven",
        location: "Dongcheng, Beijing",
        lat: 39.8822,
        lng: 116.4066,
        rating: 4.9,
        tags: &["Temple", "History"],
        travel_time: "30m",
        transport: "Metro",
        duration: "Half day",
        budget: "¥34",
        description: "Imperial altar where emperors prayed for harvest.",
        reason: "Iconic Ming architecture and morning tai chi in the park.",
        image: "1547981609-4b6bfe67ca0b",
        price: None,
        distance: "10km",
    },
    Row {
        id: "hsr-1",
        kind: DestinationKind::Hsr,
        name: "Tianjin Italian Style Town",
        location: "Tianjin",
        lat: 39.135,
        lng: 117.200,
        rating: 4.5,
        tags: &["European", "Photography"],
        travel_time: "30m",
        transport: "High-speed rail",
        duration: "1 day",
        budget: "¥400",
        description: "A slice of Europe an hour away.",
        reason: "Rich foreign atmosphere, perfect for photos.",
        image: "1516483638261-f4dbaf036963",
        price: Some("¥54.5"),
        distance: "120km",
    },
    Row {
        id: "hsr-2",
        kind: DestinationKind::Hsr,
        name: "Beidaihe Beach",
        location: "Qinhuangdao",
        lat: 39.820,
        lng: 119.480,
        rating: 4.6,
        tags: &["Beach", "Summer"],
        travel_time: "2h",
        transport: "High-speed rail",
        duration: "2 days",
        budget: "¥800",
        description: "The closest sea to Beijing.",
        reason: "First choice for the seaside with mature facilities.",
        image: "1507525428034-b723cf961d3e",
        price: Some("¥140"),
        distance: "280km",
    },
    Row {
        id: "drive-1",
        kind: DestinationKind::Drive,
        name: "Jinhai Lake",
        location: "Pinggu",
        lat: 40.180,
        lng: 117.330,
        rating: 4.6,
        tags: &["Camping", "Yacht"],
        travel_time: "1.5h",
        transport: "Self-drive",
        duration: "1 day",
        budget: "¥300",
        description: "The little Switzerland outside Beijing.",
        reason: "Open water and well kept lawns.",
        image: "1504280390367-361c6d9f38f4",
        price: None,
        distance: "85km",
    },
    Row {
        id: "drive-2",
        kind: DestinationKind::Drive,
        name: "Grassland Sky Road",
        location: "Zhangjiakou",
        lat: 41.150,
        lng: 114.900,
        rating: 4.8,
        tags: &["Scenic", "Road trip"],
        travel_time: "3.5h",
        transport: "Self-drive",
        duration: "2 days",
        budget: "¥600",
        description: "China's Route 66.",
        reason: "Ever-changing scenery and a great drive.",
        image: "1464822759023-fed622ff2c3b",
        price: None,
        distance: "220km",
    },
    Row {
        id: "hotel-1",
        kind: DestinationKind::Hotel,
        name: "Kempinski Sunrise",
        location: "Huairou",
        lat: 40.390,
        lng: 116.690,
        rating: 4.9,
        tags: &["Landmark", "Luxury"],
        travel_time: "1h",
        transport: "Self-drive",
        duration: "1 night",
        budget: "¥2000",
        description: "The glowing scallop-shell building.",
        reason: "Floor-to-ceiling lake views and top facilities.",
        image: "1566073771259-6a8506099945",
        price: Some("¥1888"),
        distance: "60km",
    },
    Row {
        id: "hotel-2",
        kind: DestinationKind::Hotel,
        name: "Commune by the Great Wall",
        location: "Yanqing",
        lat: 40.355,
        lng: 116.015,
        rating: 4.8,
        tags: &["Design", "Mountain"],
        travel_time: "1.2h",
        transport: "Self-drive",
        duration: "1 night",
        budget: "¥3000",
        description: "A world-famous design hotel.",
        reason: "Sleep inside architecture with the Wall outside.",
        image: "1582719478250-c89cae4dc85b",
        price: Some("¥2500"),
        distance: "70km",
    },
    Row {
        id: "museum-1",
        kind: DestinationKind::Museum,
        name: "Red Brick Art Museum",
        location: "Cuigezhuang",
        lat: 40.035,
        lng: 116.510,
        rating: 4.7,
        tags: &["Red brick", "Art"],
        travel_time: "30m",
        transport: "Taxi",
        duration: "3 hours",
        budget: "¥150",
        description: "A garden-style art museum.",
        reason: "Light and shadow everywhere, every shot works.",
        image: "1518998053901-5348d3961a04",
        price: Some("¥120"),
        distance: "12km",
    },
    Row {
        id: "museum-2",
        kind: DestinationKind::Museum,
        name: "China Oil Painting Academy",
        location: "Gaobeidian",
        lat: 39.902,
        lng: 116.535,
        rating: 4.6,
        tags: &["White chapel", "Serene"],
        travel_time: "20m",
        transport: "Self-drive",
        duration: "2 hours",
        budget: "¥50",
        description: "Minimalist aesthetics at their peak.",
        reason: "Home of the famous white auditorium.",
        image: "1493106819501-66d381c466f1",
        price: Some("Free"),
        distance: "8km",
    },
];

fn sample_notes(id: &str, name: &str) -> Vec<SocialNote> {
    vec![
        SocialNote {
            id: format!("note-{}-1", id),
            author: "Photographer Ali".to_string(),
            likes: 1250,
            content: format!(
                "The sunset at {} is unreal. Get to the viewpoint around 5pm for the best light.",
                name
            ),
            image_url: format!("https://picsum.photos/seed/{}1/300/400", id),
        },
        SocialNote {
            id: format!("note-{}-2", id),
            author: "Parenting Pro".to_string(),
            likes: 890,
            content: format!(
                "Taking kids to {}: bring sunscreen and snacks, the restaurants have long queues.",
                name
            ),
            image_url: format!("https://picsum.photos/seed/{}2/300/400", id),
        },
    ]
}

impl From<&Row> for Destination {
    fn from(row: &Row) -> Self {
        Destination {
            id: row.id.to_string(),
            kind: row.kind,
            name: row.name.to_string(),
            location: row.location.to_string(),
            lat: row.lat,
            lng: row.lng,
            rating: row.rating,
            tags: row.tags.iter().map(|t| t.to_string()).collect(),
            travel_time: row.travel_time.to_string(),
            suggested_transport: row.transport.to_string(),
            suggested_duration: row.duration.to_string(),
            budget: row.budget.to_string(),
            description: row.description.to_string(),
            ai_reason: row.reason.to_string(),
            image_url: format!("{}{}{}", IMAGE_BASE, row.image, IMAGE_PARAMS),
            notes: sample_notes(row.id, row.name),
            price: row.price.map(str::to_string),
            distance: Some(row.distance.to_string()),
        }
    }
}

static BUILTIN: LazyLock<Arc<Catalog>> =
    LazyLock::new(|| Arc::new(Catalog::new(ROWS.iter().map(Destination::from).collect())));

/// Immutable list of destinations keyed by id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    destinations: Vec<Destination>,
}

impl Catalog {
    pub fn new(destinations: Vec<Destination>) -> Self {
        Self { destinations }
    }

    /// The catalog shipped with the application.
    pub fn builtin() -> Arc<Catalog> {
        Arc::clone(&BUILTIN)
    }

    pub fn all(&self) -> &[Destination] {
        &self.destinations
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Destination> {
        self.destinations.iter().find(|d| d.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Destinations whose name or tags mention `intent`.
    ///
    /// An empty intent, or one that matches nothing, yields the whole catalog
    /// so the map never goes blank.
    pub fn filter_by_intent(&self, intent: &str) -> Vec<&Destination> {
        if intent.trim().is_empty() {
            return self.destinations.iter().collect();
        }
        let matched: Vec<&Destination> =
            self.destinations.iter().filter(|d| d.matches(intent)).collect();
        if matched.is_empty() {
            self.destinations.iter().collect()
        } else {
            matched
        }
    }

    /// `None` means every kind.
    pub fn filter_by_kind(&self, kind: Option<DestinationKind>) -> Vec<&Destination> {
        match kind {
            None => self.destinations.iter().collect(),
            Some(kind) => self.destinations.iter().filter(|d| d.kind == kind).collect(),
        }
    }

    /// Free-text search box on the map; unlike intent filtering there is no fallback.
    pub fn search(&self, query: &str) -> Vec<&Destination> {
        self.destinations.iter().filter(|d| d.matches(query)).collect()
    }
}
