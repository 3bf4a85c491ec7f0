use rand::Rng;

use crate::error::LoadTestError;
use crate::models::{round_to_cents, Order, OrderPair, OrderType};

pub const DEFAULT_TICKERS: [&str; 4] = ["AAPL", "GOOG", "TSLA", "MSFT"];

/// Bounds for generated order pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSettings {
    pub tickers: Vec<String>,
    pub sell_price_min: f64,
    pub sell_price_max: f64,
    pub buy_price_max: f64,
    pub quantity_min: u32,
    pub quantity_max: u32,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            tickers: DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect(),
            sell_price_min: 100.0,
            sell_price_max: 150.0,
            buy_price_max: 200.0,
            quantity_min: 10,
            quantity_max: 100,
        }
    }
}

impl GeneratorSettings {
    pub fn validate(&self) -> Result<(), LoadTestError> {
        if self.tickers.is_empty() {
            return Err(LoadTestError::InvalidSettings("ticker list is empty".into()));
        }
        let prices = [self.sell_price_min, self.sell_price_max, self.buy_price_max];
        // prices are rounded through value * 100.0
        if prices.iter().any(|p| !(p * 100.0).is_finite()) {
            return Err(LoadTestError::InvalidSettings("price bounds must be finite".into()));
        }
        let sell_width = self.sell_price_max - self.sell_price_min;
        let buy_width = self.buy_price_max - self.sell_price_min;
        if !sell_width.is_finite() || !buy_width.is_finite() {
            return Err(LoadTestError::InvalidSettings(format!(
                "price range too wide: {} .. {}",
                self.sell_price_min, self.buy_price_max
            )));
        }
        if self.sell_price_min > self.sell_price_max || self.sell_price_max > self.buy_price_max {
            return Err(LoadTestError::InvalidSettings(format!(
                "price bounds must satisfy sell_min <= sell_max <= buy_max, got {} / {} / {}",
                self.sell_price_min, self.sell_price_max, self.buy_price_max
            )));
        }
        if self.quantity_min > self.quantity_max {
            return Err(LoadTestError::InvalidSettings(format!(
                "quantity_min {} exceeds quantity_max {}",
                self.quantity_min, self.quantity_max
            )));
        }
        Ok(())
    }
}

/// Produces matching buy/sell pairs. Holds no mutable state, so one
/// instance can be shared by every worker.
#[derive(Debug, Clone, Default)]
pub struct OrderPairGenerator {
    settings: GeneratorSettings,
}

impl OrderPairGenerator {
    pub fn new(settings: GeneratorSettings) -> Result<Self, LoadTestError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    pub fn generate(&self) -> OrderPair {
        self.generate_with(&mut rand::thread_rng())
    }

    pub fn generate_with<R: Rng>(&self, rng: &mut R) -> OrderPair {
        let s = &self.settings;
        let ticker = &s.tickers[rng.gen_range(0..s.tickers.len())];

        let sell_price = round_to_cents(rng.gen_range(s.sell_price_min..=s.sell_price_max));
        // sell_price may round past a buy_max that is not on a cent boundary
        let buy_high = s.buy_price_max.max(sell_price);
        let buy_price = round_to_cents(rng.gen_range(sell_price..=buy_high));

        let sell = Order::new(
            OrderType::Sell,
            ticker,
            sell_price,
            rng.gen_range(s.quantity_min..=s.quantity_max),
        );
        let buy = Order::new(
            OrderType::Buy,
            ticker,
            buy_price,
            rng.gen_range(s.quantity_min..=s.quantity_max),
        );

        OrderPair { sell, buy }
    }

    /// `pairs` pairs flattened as sell, buy, sell, buy, ...
    pub fn generate_batch(&self, pairs: usize) -> Vec<Order> {
        let mut rng = rand::thread_rng();
        let mut orders = Vec::with_capacity(pairs * 2);
        for _ in 0..pairs {
            orders.extend(self.generate_with(&mut rng).into_orders());
        }
        orders
    }
}

/// One pair with the default bounds and the thread-local random source.
pub fn generate_matching_orders() -> OrderPair {
    OrderPairGenerator::default().generate()
}
