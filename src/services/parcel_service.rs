use std::time::Duration;

use crate::error::Result;
use reqwest::Client;
use serde::{Deserialize, Deserializer};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const OUT_FIELDS: &str = "ACCTID,PREMADDR,ACRES,OWNNAME1";

fn deserialize_string_flexible<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<StringOrNumber>::deserialize(deserializer)? {
        Some(StringOrNumber::String(s)) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Some(StringOrNumber::Int(i)) => Some(i.to_string()),
        Some(StringOrNumber::Float(f)) => Some(f.to_string()),
        None => None,
    })
}

#[derive(Debug, Default, Deserialize)]
struct ParcelAttributes {
    #[serde(rename = "ACCTID", default, deserialize_with = "deserialize_string_flexible")]
    acctid: Option<String>,
    #[serde(rename = "PREMADDR", default, deserialize_with = "deserialize_string_flexible")]
    premaddr: Option<String>,
    #[serde(rename = "ACRES", default)]
    acres: Option<f64>,
    #[serde(rename = "OWNNAME1", default, deserialize_with = "deserialize_string_flexible")]
    owner: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryFeature {
    #[serde(default)]
    attributes: ParcelAttributes,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    features: Vec<QueryFeature>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParcelInfo {
    pub parcel_id: Option<String>,
    pub address: Option<String>,
    pub acres: Option<f64>,
    pub owner: Option<String>,
}

/// An authoritative lot size and the parcel it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedSize {
    pub acres: f64,
    pub parcel_id: Option<String>,
}

/// Client for the state property-data query endpoint, scoped to one
/// jurisdiction code.
#[derive(Clone)]
pub struct ParcelService {
    client: Client,
    query_url: String,
    jurisdiction: String,
}

impl ParcelService {
    pub fn new(client: Client, query_url: String, jurisdiction: String) -> Self {
        Self {
            client,
            query_url,
            jurisdiction,
        }
    }

    pub fn where_clause(&self, street_address: &str, city: &str, zipcode: &str) -> String {
        let street = sanitize_input(&street_address.to_uppercase());
        let city = sanitize_input(&city.to_uppercase());
        let zip: String = zipcode.chars().take(5).collect();
        let zip = sanitize_input(&zip);
        format!(
            "JURSCODE = '{}' AND PREMADDR LIKE '%{}%' AND RESICITY = '{}' AND RESIZIPCODE LIKE '{}%'",
            sanitize_input(&self.jurisdiction),
            street,
            city,
            zip
        )
    }

    /// First parcel matching the address, or `None` when the query has no features.
    pub async fn fetch_parcel(
        &self,
        street_address: &str,
        city: &str,
        zipcode: &str,
    ) -> Result<Option<ParcelInfo>> {
        let where_clause = self.where_clause(street_address, city, zipcode);
        let response = self
            .client
            .get(&self.query_url)
            .query(&[
                ("where", where_clause.as_str()),
                ("outFields", OUT_FIELDS),
                ("returnGeometry", "false"),
                ("f", "json"),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let body = response.json::<QueryResponse>().await?;
        Ok(body.features.into_iter().next().map(|f| ParcelInfo {
            parcel_id: f.attributes.acctid,
            address: f.attributes.premaddr,
            acres: f.attributes.acres,
            owner: f.attributes.owner,
        }))
    }

    /// Authoritative size for an address. Every failure mode (transport,
    /// status, body, no match, missing or non-positive acreage) maps to `None`
    /// so the caller can fall back to the claimed size.
    pub async fn fetch_actual_size(
        &self,
        street_address: &str,
        city: &str,
        zipcode: &str,
    ) -> Option<VerifiedSize> {
        match self.fetch_parcel(street_address, city, zipcode).await {
            Ok(Some(parcel)) => match parcel.acres {
                Some(acres) if acres.is_finite() && acres > 0.0 => Some(VerifiedSize {
                    acres,
                    parcel_id: parcel.parcel_id,
                }),
                _ => {
                    tracing::info!(
                        parcel_id = ?parcel.parcel_id,
                        "parcel matched without usable acreage for {}, {}",
                        street_address,
                        city
                    );
                    None
                }
            },
            Ok(None) => {
                tracing::info!("no parcel found for {}, {}, {}", street_address, city, zipcode);
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "parcel lookup failed for {}", street_address);
                None
            }
        }
    }
}

/// Strips characters that could break out of the query's quoted literals.
pub fn sanitize_input(value: &str) -> String {
    let mut result = value.to_string();
    for pattern in ["'", "\"", ";", "--", "/*", "*/", "\\"] {
        result = result.replace(pattern, "");
    }
    result.trim().to_string()
}
