//! Data types and associated functions and methods

use crate::error::PanelError;

use serde::Deserialize;
use strum_macros::Display;

/// A measurement column of the weather-station sample table.
///
/// This is the only source of column identifiers used in query construction:
/// user-supplied names are parsed into this enum and rejected if they do not
/// match one of the seven known columns.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum Field {
    /// Air temperature
    TemperaturaAire,
    /// Air humidity
    HumedadAire,
    /// Light intensity
    IntensidadLuz,
    /// UV index
    IndiceUv,
    /// Wind speed
    VelocidadViento,
    /// Wind direction
    DireccionViento,
    /// Barometric pressure
    PresionBarometrica,
}

impl Field {
    /// All measurement fields, in the order they appear on the index page.
    pub const ALL: [Field; 7] = [
        Field::TemperaturaAire,
        Field::HumedadAire,
        Field::IntensidadLuz,
        Field::IndiceUv,
        Field::VelocidadViento,
        Field::DireccionViento,
        Field::PresionBarometrica,
    ];

    /// Returns the column name in the sample table.
    pub fn column(self) -> &'static str {
        match self {
            Self::TemperaturaAire => "temperaturaaire",
            Self::HumedadAire => "humedadaire",
            Self::IntensidadLuz => "intensidadluz",
            Self::IndiceUv => "indiceuv",
            Self::VelocidadViento => "velocidadviento",
            Self::DireccionViento => "direccionviento",
            Self::PresionBarometrica => "presionbarometrica",
        }
    }
}

impl std::str::FromStr for Field {
    type Err = PanelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|field| field.column() == s)
            .copied()
            .ok_or_else(|| PanelError::UnknownField {
                name: s.to_string(),
            })
    }
}

/// Query parameters of the correlation endpoint.
///
/// Both parameters are optional at the HTTP layer so that a missing selection
/// can be answered with the informational message rather than a serde
/// rejection.
#[derive(Debug, Deserialize)]
pub struct CorrelationParams {
    /// First selected field name
    pub var1: Option<String>,
    /// Second selected field name
    pub var2: Option<String>,
}
