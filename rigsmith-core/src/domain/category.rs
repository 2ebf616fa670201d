//! Category: the fixed set of slots a build fills.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One slot in a build. Declaration order is the catalog order used by the
/// tiered assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "CPU")]
    Cpu,
    #[serde(rename = "GPU")]
    Gpu,
    Mainboard,
    Memory,
    Storage,
    PowerSupply,
    Case,
    Cooler,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category: '{0}'")]
pub struct UnknownCategory(pub String);

impl Category {
    /// All categories in catalog-declaration order.
    pub const ALL: [Category; 8] = [
        Category::Cpu,
        Category::Gpu,
        Category::Mainboard,
        Category::Memory,
        Category::Storage,
        Category::PowerSupply,
        Category::Case,
        Category::Cooler,
    ];

    /// Categories filled after processor and mainboard, in priority order.
    pub const SECONDARY: [Category; 6] = [
        Category::Gpu,
        Category::Memory,
        Category::Storage,
        Category::PowerSupply,
        Category::Case,
        Category::Cooler,
    ];

    /// Categories a scenario build cannot ship without.
    pub const CORE: [Category; 6] = [
        Category::Cpu,
        Category::Mainboard,
        Category::Memory,
        Category::Gpu,
        Category::Storage,
        Category::PowerSupply,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cpu => "CPU",
            Self::Gpu => "GPU",
            Self::Mainboard => "Mainboard",
            Self::Memory => "Memory",
            Self::Storage => "Storage",
            Self::PowerSupply => "PowerSupply",
            Self::Case => "Case",
            Self::Cooler => "Cooler",
        }
    }

    pub fn is_core(&self) -> bool {
        Self::CORE.contains(self)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Accepts canonical names plus the common retail aliases
    /// (`motherboard`, `ram`, `psu`, `processor`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "cpu" | "processor" => Ok(Self::Cpu),
            "gpu" | "graphics" | "videocard" => Ok(Self::Gpu),
            "mainboard" | "motherboard" => Ok(Self::Mainboard),
            "memory" | "ram" => Ok(Self::Memory),
            "storage" | "disk" => Ok(Self::Storage),
            "powersupply" | "psu" => Ok(Self::PowerSupply),
            "case" | "chassis" => Ok(Self::Case),
            "cooler" | "cpucooler" => Ok(Self::Cooler),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_order_matches_all() {
        let mut sorted = Category::ALL;
        sorted.sort();
        assert_eq!(sorted, Category::ALL);
    }

    #[test]
    fn parses_aliases() {
        assert_eq!("Motherboard".parse::<Category>().unwrap(), Category::Mainboard);
        assert_eq!("RAM".parse::<Category>().unwrap(), Category::Memory);
        assert_eq!("psu".parse::<Category>().unwrap(), Category::PowerSupply);
        assert_eq!("power_supply".parse::<Category>().unwrap(), Category::PowerSupply);
        assert!("monitor".parse::<Category>().is_err());
    }

    #[test]
    fn case_and_cooler_are_not_core() {
        assert!(!Category::Case.is_core());
        assert!(!Category::Cooler.is_core());
        assert!(Category::Gpu.is_core());
    }

    #[test]
    fn serializes_with_display_names() {
        let json = serde_json::to_string(&Category::Cpu).unwrap();
        assert_eq!(json, "\"CPU\"");
        let back: Category = serde_json::from_str("\"PowerSupply\"").unwrap();
        assert_eq!(back, Category::PowerSupply);
    }
}
