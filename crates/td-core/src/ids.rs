use core::fmt;
use core::str::FromStr;

use crate::CoreError;

/// Simulation year.
pub type Year = u32;

macro_rules! define_name_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(String);

        impl $name {
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self::new(name)
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self(name)
            }
        }
    };
}

define_name_id!(
    /// Region identifier; the set is fixed for a run.
    RegionId
);
define_name_id!(
    /// Submodel grouping of enduses (residential, service, industry, ...).
    SectorId
);
define_name_id!(
    /// Purpose of energy consumption (space heating, lighting, ...).
    EnduseId
);
define_name_id!(
    /// Technology identifier.
    TechId
);

/// Energy carrier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Fueltype {
    SolidFuel,
    Gas,
    Electricity,
    Oil,
    Biomass,
    Hydrogen,
    Heat,
}

impl Fueltype {
    pub const ALL: [Fueltype; 7] = [
        Fueltype::SolidFuel,
        Fueltype::Gas,
        Fueltype::Electricity,
        Fueltype::Oil,
        Fueltype::Biomass,
        Fueltype::Hydrogen,
        Fueltype::Heat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Fueltype::SolidFuel => "solid_fuel",
            Fueltype::Gas => "gas",
            Fueltype::Electricity => "electricity",
            Fueltype::Oil => "oil",
            Fueltype::Biomass => "biomass",
            Fueltype::Hydrogen => "hydrogen",
            Fueltype::Heat => "heat",
        }
    }
}

impl fmt::Display for Fueltype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Fueltype {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Fueltype::ALL
            .into_iter()
            .find(|ft| ft.as_str() == s)
            .ok_or_else(|| CoreError::UnknownFueltype {
                name: s.to_string(),
            })
    }
}
