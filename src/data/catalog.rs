use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Energy,
    Metals,
    Agriculture,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CommodityInfo {
    pub key: &'static str,
    #[serde(skip)]
    pub function: &'static str,
    pub category: Category,
    pub description: &'static str,
}

/// Provider function for the global commodity index
pub const INDEX_FUNCTION: &str = "ALL_COMMODITIES";

pub const COMMODITIES: &[CommodityInfo] = &[
    CommodityInfo {
        key: "wti",
        function: "WTI",
        category: Category::Energy,
        description: "West Texas Intermediate crude oil",
    },
    CommodityInfo {
        key: "brent",
        function: "BRENT",
        category: Category::Energy,
        description: "Brent crude oil",
    },
    CommodityInfo {
        key: "natural_gas",
        function: "NATURAL_GAS",
        category: Category::Energy,
        description: "Henry Hub natural gas spot price",
    },
    CommodityInfo {
        key: "copper",
        function: "COPPER",
        category: Category::Metals,
        description: "Global copper price",
    },
    CommodityInfo {
        key: "aluminum",
        function: "ALUMINUM",
        category: Category::Metals,
        description: "Global aluminum price",
    },
    CommodityInfo {
        key: "wheat",
        function: "WHEAT",
        category: Category::Agriculture,
        description: "Global wheat price",
    },
    CommodityInfo {
        key: "corn",
        function: "CORN",
        category: Category::Agriculture,
        description: "Global corn price",
    },
    CommodityInfo {
        key: "cotton",
        function: "COTTON",
        category: Category::Agriculture,
        description: "Global cotton price",
    },
    CommodityInfo {
        key: "sugar",
        function: "SUGAR",
        category: Category::Agriculture,
        description: "Global sugar price",
    },
    CommodityInfo {
        key: "coffee",
        function: "COFFEE",
        category: Category::Agriculture,
        description: "Global coffee price",
    },
];

/// Lowercase and map spaces/hyphens to underscores ("Natural Gas" -> "natural_gas")
pub fn normalize_symbol(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn lookup(key: &str) -> Option<&'static CommodityInfo> {
    COMMODITIES.iter().find(|c| c.key == key)
}
