use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Buy => write!(f, "Buy"),
            OrderType::Sell => write!(f, "Sell"),
        }
    }
}

impl FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Buy" => Ok(OrderType::Buy),
            "Sell" => Ok(OrderType::Sell),
            _ => Err(format!("Unknown order type: {}", s)),
        }
    }
}

/// Body of a `POST /place_order` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub order_type: OrderType,
    pub ticker: String,
    pub price: f64,
    pub quantity: u32,
}

impl Order {
    pub fn new(order_type: OrderType, ticker: &str, price: f64, quantity: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_type,
            ticker: ticker.to_string(),
            price,
            quantity,
        }
    }
}

/// A sell and a buy on the same ticker with `sell.price <= buy.price`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPair {
    pub sell: Order,
    pub buy: Order,
}

impl OrderPair {
    pub fn into_orders(self) -> [Order; 2] {
        [self.sell, self.buy]
    }
}

/// Round to two decimal places.
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
