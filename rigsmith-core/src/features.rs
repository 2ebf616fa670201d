//! Fixed feature vector handed to the predictive scorer.
//!
//! The layout is part of the scorer contract: eight fields, always in this
//! order. Missing attributes are encoded as 0.

use serde::{Deserialize, Serialize};

use crate::domain::{Build, Category, Feature};

/// Field names in vector order.
pub const FEATURE_NAMES: [&str; 8] = [
    "cpu_speed",
    "cpu_cores",
    "cpu_threads",
    "gpu_vram",
    "ram_size",
    "storage_space",
    "psu_power",
    "total_price",
];

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    pub cpu_speed: f64,
    pub cpu_cores: f64,
    pub cpu_threads: f64,
    pub gpu_vram: f64,
    pub ram_size: f64,
    pub storage_space: f64,
    pub psu_power: f64,
    pub total_price: f64,
}

impl FeatureVector {
    pub fn from_build(build: &Build) -> Self {
        let get = |category: Category, feature: Feature| {
            build
                .part(category)
                .and_then(|p| p.feature(feature))
                .unwrap_or(0.0)
        };
        Self {
            cpu_speed: get(Category::Cpu, Feature::Speed),
            cpu_cores: get(Category::Cpu, Feature::CoreCount),
            cpu_threads: get(Category::Cpu, Feature::ThreadCount),
            gpu_vram: get(Category::Gpu, Feature::Vram),
            ram_size: get(Category::Memory, Feature::Size),
            storage_space: get(Category::Storage, Feature::Space),
            psu_power: get(Category::PowerSupply, Feature::Power),
            total_price: build.cost,
        }
    }

    pub fn to_array(&self) -> [f64; 8] {
        [
            self.cpu_speed,
            self.cpu_cores,
            self.cpu_threads,
            self.gpu_vram,
            self.ram_size,
            self.storage_space,
            self.psu_power,
            self.total_price,
        ]
    }

    /// Value by field name (see [`FEATURE_NAMES`]).
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.to_array()[i])
    }
}
