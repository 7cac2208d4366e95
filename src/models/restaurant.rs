use serde::{Deserialize, Serialize};

/// Restaurant record mapped from an OpenStreetMap node.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,
}

/// One element of an Overpass API response.
#[derive(Debug, Clone, Deserialize)]
pub struct OsmElement {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: i64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(default)]
    pub tags: Option<OsmTags>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OsmTags {
    pub name: Option<String>,
    pub cuisine: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub opening_hours: Option<String>,
    #[serde(rename = "addr:housenumber")]
    pub addr_housenumber: Option<String>,
    #[serde(rename = "addr:street")]
    pub addr_street: Option<String>,
    #[serde(rename = "addr:city")]
    pub addr_city: Option<String>,
    #[serde(rename = "addr:state")]
    pub addr_state: Option<String>,
    #[serde(rename = "addr:postcode")]
    pub addr_postcode: Option<String>,
}

impl Restaurant {
    /// Map an Overpass element to a Restaurant. Only named `node` elements
    /// with coordinates qualify; everything else is dropped.
    pub fn from_node(element: &OsmElement) -> Option<Restaurant> {
        if element.kind != "node" {
            return None;
        }
        let (lat, lon) = (element.lat?, element.lon?);
        let tags = element.tags.as_ref()?;
        let name = tags.name.clone()?;

        Some(Restaurant {
            id: element.id.to_string(),
            name,
            latitude: lat,
            longitude: lon,
            address: assemble_address(tags),
            cuisine: tags.cuisine.clone(),
            phone: tags.phone.clone(),
            website: tags.website.clone(),
            opening_hours: tags.opening_hours.clone(),
        })
    }
}

/// Build a display address from OSM `addr:*` components. Requires at least
/// a house number and street; city/state/postcode are appended when present.
fn assemble_address(tags: &OsmTags) -> Option<String> {
    let number = tags.addr_housenumber.as_deref()?;
    let street = tags.addr_street.as_deref()?;
    let mut address = format!("{} {}", number, street);
    if let Some(city) = &tags.addr_city {
        address.push_str(&format!(", {}", city));
    }
    if let Some(state) = &tags.addr_state {
        address.push_str(&format!(", {}", state));
    }
    if let Some(postcode) = &tags.addr_postcode {
        address.push_str(&format!(" {}", postcode));
    }
    Some(address)
}
