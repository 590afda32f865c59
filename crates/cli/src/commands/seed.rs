//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! products:
//!   - name: Linen Kurta
//!     description: Breathable linen, straight cut.
//!     base_price: "1499.00"
//!     category: kurtas
//!     stock_quantity: 40
//!     variants:
//!       - { color: Indigo, size: M, stock_quantity: 10 }
//!       - { color: Indigo, size: XL, stock_quantity: 5, price_adjustment: "100" }
//! ```
//!
//! Products whose name is already taken are skipped, so the command can be
//! re-run against a partly seeded database.

use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{error, info, warn};

use i1fashion_admin::db::{
    self, NewProduct, NewVariant, ProductRepository, RepositoryError, VariantRepository,
};
use i1fashion_core::slugify;

use super::database_url;

const PLACEHOLDER_IMAGE_URL: &str = "/api/placeholder/400/500";

/// Top level of a catalog file.
#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub products: Vec<SeedProduct>,
}

#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_price: Decimal,
    pub category: String,
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default = "active")]
    pub is_active: bool,
    #[serde(default)]
    pub variants: Vec<SeedVariant>,
}

#[derive(Debug, Deserialize)]
pub struct SeedVariant {
    pub color: String,
    pub size: String,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default)]
    pub price_adjustment: Decimal,
    #[serde(default = "active")]
    pub is_active: bool,
}

const fn active() -> bool {
    true
}

impl SeedProduct {
    fn to_new_product(&self) -> NewProduct {
        NewProduct {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            base_price: self.base_price,
            category: self.category.trim().to_string(),
            image_url: self
                .image_url
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string()),
            stock_quantity: self.stock_quantity,
            is_active: self.is_active,
        }
    }
}

impl SeedVariant {
    fn to_new_variant(&self) -> NewVariant {
        NewVariant {
            color: self.color.trim().to_string(),
            size: self.size.trim().to_string(),
            stock_quantity: self.stock_quantity,
            price_adjustment: self.price_adjustment,
            is_active: self.is_active,
        }
    }
}

/// Check a catalog before touching the database. Returns every problem found.
pub fn validate_catalog(catalog: &CatalogFile) -> Vec<String> {
    let mut errors = Vec::new();
    let mut slugs = HashSet::new();

    for (i, product) in catalog.products.iter().enumerate() {
        let label = if product.name.trim().is_empty() {
            format!("product #{}", i + 1)
        } else {
            product.name.trim().to_string()
        };

        if product.name.trim().is_empty() {
            errors.push(format!("{label}: name is required"));
        } else if !slugs.insert(slugify(&product.name)) {
            errors.push(format!("{label}: duplicate product name"));
        }
        if product.category.trim().is_empty() {
            errors.push(format!("{label}: category is required"));
        }
        if product.base_price.is_sign_negative() && !product.base_price.is_zero() {
            errors.push(format!("{label}: base_price must not be negative"));
        }
        if product.stock_quantity < 0 {
            errors.push(format!("{label}: stock_quantity must not be negative"));
        }

        let mut combos = HashSet::new();
        for variant in &product.variants {
            let color = variant.color.trim();
            let size = variant.size.trim();
            if color.is_empty() || size.is_empty() {
                errors.push(format!("{label}: variant needs color and size"));
                continue;
            }
            if !combos.insert((color.to_lowercase(), size.to_lowercase())) {
                errors.push(format!("{label}: duplicate variant {color} / {size}"));
            }
            if variant.stock_quantity < 0 {
                errors.push(format!(
                    "{label}: variant {color} / {size} has negative stock"
                ));
            }
        }
    }

    errors
}

/// Seed products and variants from `file_path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, fails validation,
/// or the database cannot be reached.
pub async fn catalog(file_path: &str, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let catalog: CatalogFile = serde_yaml::from_str(&content)?;
    info!(products = catalog.products.len(), "Parsed catalog");

    let errors = validate_catalog(&catalog);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    info!("Catalog validated successfully");
    if dry_run {
        return Ok(());
    }

    let database_url = database_url()?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let products = ProductRepository::new(&pool);
    let variants = VariantRepository::new(&pool);
    let (mut inserted, mut skipped, mut variant_count) = (0_usize, 0_usize, 0_usize);

    for seed in &catalog.products {
        let product = match products.create(&seed.to_new_product()).await {
            Ok(product) => product,
            Err(RepositoryError::Conflict(_)) => {
                warn!(name = %seed.name, "Product already exists, skipping");
                skipped += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        for variant in &seed.variants {
            variants.create(product.id, &variant.to_new_variant()).await?;
            variant_count += 1;
        }
        inserted += 1;
    }

    info!("Seeding complete!");
    info!("  Products inserted: {inserted}");
    info!("  Variants inserted: {variant_count}");
    info!("  Products skipped (already exist): {skipped}");

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
products:
  - name: Linen Kurta
    base_price: "1499.00"
    category: kurtas
    stock_quantity: 40
    variants:
      - { color: Indigo, size: M, stock_quantity: 10 }
      - { color: Indigo, size: XL, stock_quantity: 5, price_adjustment: "100" }
  - name: Denim Jacket
    description: Washed denim.
    base_price: "2999"
    category: jackets
    is_active: false
"#;

    fn parse(yaml: &str) -> CatalogFile {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_parse_defaults() {
        let catalog = parse(CATALOG);
        assert_eq!(catalog.products.len(), 2);

        let kurta = &catalog.products[0];
        assert!(kurta.is_active);
        assert_eq!(kurta.base_price, Decimal::new(149_900, 2));
        assert_eq!(kurta.variants[0].price_adjustment, Decimal::ZERO);
        assert_eq!(kurta.variants[1].price_adjustment, Decimal::new(100, 0));

        let product = kurta.to_new_product();
        assert_eq!(product.image_url, PLACEHOLDER_IMAGE_URL);
        assert!(product.description.is_empty());

        assert!(!catalog.products[1].is_active);
        assert!(catalog.products[1].variants.is_empty());
    }

    #[test]
    fn test_valid_catalog() {
        assert!(validate_catalog(&parse(CATALOG)).is_empty());
    }

    #[test]
    fn test_duplicate_names_and_variants() {
        let catalog = parse(
            r#"
products:
  - name: Linen Kurta
    base_price: "1499"
    category: kurtas
    variants:
      - { color: Indigo, size: M }
      - { color: indigo, size: m }
  - name: "Linen  Kurta"
    base_price: "1599"
    category: kurtas
"#,
        );
        let errors = validate_catalog(&catalog);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("duplicate variant"));
        assert!(errors[1].contains("duplicate product name"));
    }

    #[test]
    fn test_missing_fields() {
        let catalog = parse(
            r#"
products:
  - name: ""
    base_price: "-5"
    category: " "
    stock_quantity: -1
    variants:
      - { color: Black, size: "" }
"#,
        );
        let errors = validate_catalog(&catalog);
        assert_eq!(
            errors,
            vec![
                "product #1: name is required",
                "product #1: category is required",
                "product #1: base_price must not be negative",
                "product #1: stock_quantity must not be negative",
                "product #1: variant needs color and size",
            ]
        );
    }
}
