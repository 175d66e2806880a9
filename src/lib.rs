pub mod anomaly;
pub mod calibrator;
pub mod config;
pub mod data_loader;
pub mod data_structures;
pub mod error;
pub mod forecast;
pub mod plotting;
pub mod utils;

pub use anomaly::*;
pub use calibrator::*;
pub use config::*;
pub use data_loader::*;
pub use data_structures::*;
pub use error::*;
pub use forecast::*;
pub use plotting::*;
pub use utils::*;
