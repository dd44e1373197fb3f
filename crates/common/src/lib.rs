pub mod dasha;
pub mod error;
pub mod forecast;
pub mod kundli;
pub mod signs;

pub use dasha::{AntarPeriod, CurrentDasha, MahaPeriod};
pub use error::{Error, Result};
pub use forecast::ForecastSections;
pub use kundli::{BirthChartData, KundliData, PlanetPosition};
pub use signs::{sign_by_id, sign_by_vedic_name, western_zodiac_for, Sign, SIGNS};
