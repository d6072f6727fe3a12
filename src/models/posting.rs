use serde::{Deserialize, Deserializer};
use std::fmt;

use super::EMOJI_SHIPPING;

// NewType pattern for type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostingId(pub String);

impl fmt::Display for PostingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One clearance listing as observed at fetch time. Built fresh on every
/// poll from a [`RawPosting`], never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    pub posting_id: PostingId,
    pub pim_id: String,
    pub name: String,
    pub posting_text: String,
    pub price: f64,
    pub shipping_cost: f64,
    pub discount_in_percent: f64,
    pub base_url: String,
    pub outlet_id: Option<String>,
}

impl Posting {
    pub fn from_raw(raw: RawPosting, base_url: &str) -> Self {
        Self {
            posting_id: PostingId(raw.posting_id),
            pim_id: raw.pim_id,
            name: raw.name,
            posting_text: raw.posting_text,
            price: raw.price,
            shipping_cost: raw.shipping_cost,
            discount_in_percent: raw.discount_in_percent,
            base_url: base_url.to_string(),
            outlet_id: raw.outlet.map(|o| o.id),
        }
    }

    /// Direct browsing URL for this posting on its originating endpoint.
    pub fn direct_url(&self) -> String {
        match &self.outlet_id {
            Some(outlet_id) => format!(
                "{}?outletIds={}&text={}",
                self.base_url, outlet_id, self.pim_id
            ),
            None => format!("{}?text={}", self.base_url, self.pim_id),
        }
    }
}

impl fmt::Display for Posting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} ({} {}) ({} %)",
            self.name, self.price, EMOJI_SHIPPING, self.shipping_cost, self.discount_in_percent
        )
    }
}

/// Raw posting record as returned by the postings API. The endpoint sends
/// more fields than these; unknown keys are deliberately ignored. Ids come
/// back as strings or numbers depending on endpoint version, so both are
/// accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPosting {
    #[serde(deserialize_with = "de_loose_string")]
    pub posting_id: String,
    #[serde(deserialize_with = "de_loose_string")]
    pub pim_id: String,
    pub name: String,
    #[serde(default)]
    pub posting_text: String,
    #[serde(deserialize_with = "de_loose_f64")]
    pub price: f64,
    #[serde(deserialize_with = "de_loose_f64")]
    pub shipping_cost: f64,
    #[serde(deserialize_with = "de_loose_f64")]
    pub discount_in_percent: f64,
    #[serde(default)]
    pub outlet: Option<RawOutlet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawOutlet {
    #[serde(deserialize_with = "de_loose_string")]
    pub id: String,
}

fn de_loose_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Loose::deserialize(deserializer)? {
        Loose::Text(s) => s,
        Loose::Int(i) => i.to_string(),
        Loose::Float(f) => f.to_string(),
    })
}

fn de_loose_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Num(f64),
        Text(String),
    }

    match Loose::deserialize(deserializer)? {
        Loose::Num(n) => Ok(n),
        Loose::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
