use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::foods::repo;
use crate::nutrition::Food;

/// Read access to foods, as needed by meal aggregation.
#[async_trait]
pub trait FoodCatalog: Send + Sync {
    /// Foods for the given ids. Unknown ids are simply absent from the result.
    async fn foods_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Food>>;
}

#[derive(Clone)]
pub struct PgFoodCatalog {
    db: PgPool,
}

impl PgFoodCatalog {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FoodCatalog for PgFoodCatalog {
    async fn foods_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Food>> {
        let rows = repo::get_many(&self.db, ids).await?;
        rows.into_iter()
            .map(|row| row.into_record().map(|r| r.food))
            .collect()
    }
}

#[cfg(test)]
pub mod memory {
    use std::collections::HashMap;
    use std::sync::RwLock;

    use super::*;

    /// In-memory catalog for tests.
    #[derive(Default)]
    pub struct MemoryFoodCatalog {
        foods: RwLock<HashMap<Uuid, Food>>,
    }

    impl MemoryFoodCatalog {
        pub fn with_foods(foods: impl IntoIterator<Item = Food>) -> Self {
            let map = foods.into_iter().map(|f| (f.id, f)).collect();
            Self {
                foods: RwLock::new(map),
            }
        }

        pub fn remove(&self, id: &Uuid) {
            self.foods.write().unwrap().remove(id);
        }
    }

    #[async_trait]
    impl FoodCatalog for MemoryFoodCatalog {
        async fn foods_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Food>> {
            let foods = self.foods.read().unwrap();
            Ok(ids.iter().filter_map(|id| foods.get(id).cloned()).collect())
        }
    }
}
