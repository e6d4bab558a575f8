use uuid::Uuid;

use crate::models::{Product, Species};

#[derive(Clone)]
pub struct Store {
    products: sled::Tree,
}

impl Store {
    pub fn open(data_dir: &str) -> anyhow::Result<Self> {
        let db = sled::open(data_dir)?;
        Ok(Self {
            products: db.open_tree("products")?,
        })
    }

    pub fn create_product(&self, product: &Product) -> anyhow::Result<()> {
        self.products
            .insert(product.id.as_bytes(), serde_json::to_vec(product)?)?;
        self.products.flush()?;
        Ok(())
    }

    pub fn get_product(&self, id: Uuid) -> anyhow::Result<Option<Product>> {
        match self.products.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn save_product(&self, product: &Product) -> anyhow::Result<()> {
        self.products
            .insert(product.id.as_bytes(), serde_json::to_vec(product)?)?;
        self.products.flush()?;
        Ok(())
    }

    /// Lists products, optionally filtered by species and active state,
    /// sorted by id ascending so downstream ranking ties break
    /// deterministically.
    pub fn list_products(&self, species: Option<Species>, include_inactive: bool) -> anyhow::Result<Vec<Product>> {
        let mut out = Vec::new();
        for item in self.products.iter() {
            let (_, bytes) = item?;
            let product: Product = serde_json::from_slice(&bytes)?;
            if !include_inactive && !product.is_active {
                continue;
            }
            if let Some(species) = species {
                if product.target_species != species {
                    continue;
                }
            }
            out.push(product);
        }
        out.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(out)
    }
}
