//! PartRecord: one purchasable item in the catalog.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::Category;

/// Numeric attributes that can be weighted, normalized and compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    Price,
    Speed,
    CoreCount,
    ThreadCount,
    Power,
    /// Graphics memory size.
    Vram,
    /// Memory module capacity.
    Size,
    /// Storage capacity.
    Space,
    SataPorts,
    PcieSlots,
    UsbPorts,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown feature: '{0}'")]
pub struct UnknownFeature(pub String);

impl Feature {
    pub const ALL: [Feature; 11] = [
        Feature::Price,
        Feature::Speed,
        Feature::CoreCount,
        Feature::ThreadCount,
        Feature::Power,
        Feature::Vram,
        Feature::Size,
        Feature::Space,
        Feature::SataPorts,
        Feature::PcieSlots,
        Feature::UsbPorts,
    ];

    /// Column name as it appears in catalog sources.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Speed => "speed",
            Self::CoreCount => "coreCount",
            Self::ThreadCount => "threadCount",
            Self::Power => "power",
            Self::Vram => "VRAM",
            Self::Size => "size",
            Self::Space => "space",
            Self::SataPorts => "sataPorts",
            Self::PcieSlots => "pcieSlots",
            Self::UsbPorts => "usbPorts",
        }
    }

    /// Features worth plotting or comparing for a category.
    pub fn chartable(category: Category) -> &'static [Feature] {
        match category {
            Category::Cpu => &[
                Feature::Speed,
                Feature::CoreCount,
                Feature::ThreadCount,
                Feature::Power,
                Feature::Price,
            ],
            Category::Gpu => &[Feature::Vram, Feature::Power, Feature::Price],
            Category::Memory => &[Feature::Size, Feature::Price],
            Category::Storage => &[Feature::Space, Feature::Price],
            Category::PowerSupply => &[Feature::Power, Feature::Price],
            Category::Mainboard => &[
                Feature::Price,
                Feature::SataPorts,
                Feature::PcieSlots,
                Feature::UsbPorts,
            ],
            Category::Case | Category::Cooler => &[Feature::Price],
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Feature {
    type Err = UnknownFeature;

    /// Case-insensitive; `_`, `-` and spaces are ignored, so `core_count`,
    /// `coreCount` and `CORECOUNT` all resolve.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_key(s);
        Feature::ALL
            .into_iter()
            .find(|f| normalize_key(f.column()) == key)
            .ok_or_else(|| UnknownFeature(s.to_string()))
    }
}

/// Lowercases and drops separators so column spellings compare equal.
pub fn normalize_key(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// One catalog item.
///
/// Well-known attributes are typed optional fields; a `None` (or non-finite)
/// feature contributes nothing when the part is scored. Source columns the
/// engine does not know about are kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartRecord {
    pub category: Category,
    pub name: String,
    pub price: f64,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket: Option<String>,
    /// Mainboard/case form factor (`size` column on mainboards).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_factor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vram: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sata_ports: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pcie_slots: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usb_ports: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl PartRecord {
    /// A record with only the required fields set.
    pub fn new(category: Category, name: impl Into<String>, price: f64) -> Self {
        Self {
            category,
            name: name.into(),
            price,
            image: String::new(),
            socket: None,
            form_factor: None,
            speed: None,
            core_count: None,
            thread_count: None,
            power: None,
            vram: None,
            size: None,
            space: None,
            sata_ports: None,
            pcie_slots: None,
            usb_ports: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_socket(mut self, socket: impl Into<String>) -> Self {
        self.socket = Some(socket.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Builder-style setter for any numeric feature.
    pub fn with_feature(mut self, feature: Feature, value: f64) -> Self {
        self.set_feature(feature, Some(value));
        self
    }

    /// Value of a numeric feature, or `None` when missing or not finite.
    pub fn feature(&self, feature: Feature) -> Option<f64> {
        let value = match feature {
            Feature::Price => Some(self.price),
            Feature::Speed => self.speed,
            Feature::CoreCount => self.core_count,
            Feature::ThreadCount => self.thread_count,
            Feature::Power => self.power,
            Feature::Vram => self.vram,
            Feature::Size => self.size,
            Feature::Space => self.space,
            Feature::SataPorts => self.sata_ports,
            Feature::PcieSlots => self.pcie_slots,
            Feature::UsbPorts => self.usb_ports,
        };
        value.filter(|v| v.is_finite())
    }

    pub fn set_feature(&mut self, feature: Feature, value: Option<f64>) {
        match feature {
            Feature::Price => {
                if let Some(v) = value {
                    self.price = v;
                }
            }
            Feature::Speed => self.speed = value,
            Feature::CoreCount => self.core_count = value,
            Feature::ThreadCount => self.thread_count = value,
            Feature::Power => self.power = value,
            Feature::Vram => self.vram = value,
            Feature::Size => self.size = value,
            Feature::Space => self.space = value,
            Feature::SataPorts => self.sata_ports = value,
            Feature::PcieSlots => self.pcie_slots = value,
            Feature::UsbPorts => self.usb_ports = value,
        }
    }

    /// True when this record's socket equals `socket`. A record without a
    /// socket never matches.
    pub fn fits_socket(&self, socket: &str) -> bool {
        self.socket.as_deref() == Some(socket)
    }

    /// Catalog invariant: finite, non-negative price.
    pub fn has_valid_price(&self) -> bool {
        self.price.is_finite() && self.price >= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_parsing_ignores_case_and_separators() {
        assert_eq!("coreCount".parse::<Feature>().unwrap(), Feature::CoreCount);
        assert_eq!("core_count".parse::<Feature>().unwrap(), Feature::CoreCount);
        assert_eq!("VRAM".parse::<Feature>().unwrap(), Feature::Vram);
        assert_eq!("vram".parse::<Feature>().unwrap(), Feature::Vram);
        assert!("socket".parse::<Feature>().is_err());
    }

    #[test]
    fn non_finite_feature_reads_as_missing() {
        let part = PartRecord::new(Category::Cpu, "x", 100.0).with_feature(Feature::Speed, f64::NAN);
        assert_eq!(part.feature(Feature::Speed), None);
        assert_eq!(part.feature(Feature::CoreCount), None);
        assert_eq!(part.feature(Feature::Price), Some(100.0));
    }

    #[test]
    fn socket_matching_requires_a_socket() {
        let with = PartRecord::new(Category::Cpu, "a", 1.0).with_socket("AM5");
        let without = PartRecord::new(Category::Cpu, "b", 1.0);
        assert!(with.fits_socket("AM5"));
        assert!(!with.fits_socket("LGA1700"));
        assert!(!without.fits_socket("AM5"));
    }

    #[test]
    fn price_validity() {
        assert!(PartRecord::new(Category::Case, "a", 0.0).has_valid_price());
        assert!(!PartRecord::new(Category::Case, "b", -1.0).has_valid_price());
        assert!(!PartRecord::new(Category::Case, "c", f64::NAN).has_valid_price());
    }

    #[test]
    fn chartable_features_include_price() {
        for category in Category::ALL {
            assert!(Feature::chartable(category).contains(&Feature::Price));
        }
    }
}
