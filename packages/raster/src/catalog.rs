//! Compile-time registry of raster products.
//!
//! Each product is defined in a TOML file under `products/`. The
//! registry embeds these at compile time and exposes them via
//! [`all_products`] and the typed [`ProductCatalog`].

use parkpulse_raster_models::RasterProduct;

// ── Compile-time embedded TOML files ────────────────────────────────

const PRODUCT_TOMLS: &[(&str, &str)] = &[
    ("ndvi", include_str!("../products/ndvi.toml")),
    ("population", include_str!("../products/population.toml")),
    ("pm25", include_str!("../products/pm25.toml")),
    ("aerosol_index", include_str!("../products/aerosol_index.toml")),
];

#[cfg(test)]
const EXPECTED_PRODUCT_COUNT: usize = 4;

/// Returns every embedded raster product.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_products() -> Vec<RasterProduct> {
    PRODUCT_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse raster product '{name}': {e}"))
        })
        .collect()
}

/// The products the metric providers query.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCatalog {
    /// Summer NDVI composite.
    pub ndvi: RasterProduct,
    /// Gridded population counts.
    pub population: RasterProduct,
    /// Primary annual PM2.5 product.
    pub pm25: RasterProduct,
    /// Aerosol index used as a PM2.5 proxy when the primary product fails.
    pub aerosol_index: RasterProduct,
}

impl ProductCatalog {
    /// Builds the catalog from the embedded product files.
    ///
    /// # Panics
    ///
    /// Panics if an embedded product is missing or malformed.
    #[must_use]
    pub fn embedded() -> Self {
        let products = all_products();
        let take = |id: &str| {
            products
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .unwrap_or_else(|| panic!("Raster product '{id}' is not embedded"))
        };

        Self {
            ndvi: take("ndvi"),
            population: take("population"),
            pm25: take("pm25"),
            aerosol_index: take("aerosol_index"),
        }
    }
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self::embedded()
    }
}
