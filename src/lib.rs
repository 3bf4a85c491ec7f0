pub mod configure;
pub mod dispatcher;
pub mod error;
pub mod logger;
pub mod models;
pub mod order_generator;

pub use dispatcher::{
    load_test, Dispatcher, LoadTestReport, LoadTestSettings, RoundReport, SubmitOutcome,
};
pub use error::LoadTestError;
pub use order_generator::{generate_matching_orders, GeneratorSettings, OrderPairGenerator};
