//! Shipping rate offers

use super::id::{BoxId, OrderId};
use super::package::Weight;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Rate lookup request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateQuery {
    pub order_id: OrderId,
    pub weight: Weight,
    pub box_id: BoxId,
}

/// Single rate offer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingRate {
    #[serde(default)]
    pub rate_id: Option<String>,
    /// Rate shopping service that quoted the offer
    #[serde(default)]
    pub provider: String,
    pub carrier: String,
    pub service: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub estimated_days: Option<u32>,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Rate offers of one provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderRates {
    pub provider: String,
    #[serde(default)]
    pub rates: Vec<ShippingRate>,
}

/// Group a flat rate list by provider, keeping first-seen provider order
pub fn group_by_provider(rates: Vec<ShippingRate>) -> Vec<ProviderRates> {
    let mut groups: Vec<ProviderRates> = Vec::new();
    for rate in rates {
        match groups.iter_mut().find(|g| g.provider == rate.provider) {
            Some(group) => group.rates.push(rate),
            None => groups.push(ProviderRates {
                provider: rate.provider.clone(),
                rates: vec![rate],
            }),
        }
    }
    groups
}

/// Cheapest offer across every provider
pub fn cheapest(groups: &[ProviderRates]) -> Option<&ShippingRate> {
    groups
        .iter()
        .flat_map(|g| g.rates.iter())
        .min_by(|a, b| a.amount.cmp(&b.amount))
}
