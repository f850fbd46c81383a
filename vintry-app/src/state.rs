//! In-memory library state
//!
//! Explicit mirror of wines and cellars with defined mutation actions and a
//! reload-from-storage operation. Derived data (the position map) is never
//! patched in place: handlers reload after every write that could change
//! it, so the cache only ever holds what the database last said.

use sqlx::SqlitePool;
use tokio::sync::RwLock;
use uuid::Uuid;
use vintry_common::db::models::{Cellar, Wine};
use vintry_common::db::{cellars, wines};
use vintry_common::Result;

#[derive(Default)]
pub struct Library {
    wines: RwLock<Vec<Wine>>,
    cellars: RwLock<Vec<Cellar>>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn wines(&self) -> Vec<Wine> {
        self.wines.read().await.clone()
    }

    pub async fn cellars(&self) -> Vec<Cellar> {
        self.cellars.read().await.clone()
    }

    pub async fn set_wines(&self, wines: Vec<Wine>) {
        *self.wines.write().await = wines;
    }

    pub async fn add_wine(&self, wine: Wine) {
        self.wines.write().await.insert(0, wine);
    }

    pub async fn update_wine(&self, id: Uuid, wine: Wine) {
        let mut guard = self.wines.write().await;
        if let Some(existing) = guard.iter_mut().find(|w| w.id == id) {
            *existing = wine;
        }
    }

    pub async fn delete_wine(&self, id: Uuid) {
        self.wines.write().await.retain(|w| w.id != id);
    }

    pub async fn set_cellars(&self, cellars: Vec<Cellar>) {
        *self.cellars.write().await = cellars;
    }

    pub async fn add_cellar(&self, cellar: Cellar) {
        self.cellars.write().await.insert(0, cellar);
    }

    pub async fn update_cellar(&self, id: Uuid, cellar: Cellar) {
        let mut guard = self.cellars.write().await;
        if let Some(existing) = guard.iter_mut().find(|c| c.id == id) {
            *existing = cellar;
        }
    }

    pub async fn delete_cellar(&self, id: Uuid) {
        self.cellars.write().await.retain(|c| c.id != id);
    }

    /// Re-fetch the wine list from the database
    pub async fn reload_wines(&self, pool: &SqlitePool) -> Result<()> {
        let fresh = wines::list_wines(pool).await?;
        self.set_wines(fresh).await;
        Ok(())
    }

    /// Re-fetch the cellar list from the database
    pub async fn reload_cellars(&self, pool: &SqlitePool) -> Result<()> {
        let fresh = cellars::list_cellars(pool).await?;
        self.set_cellars(fresh).await;
        Ok(())
    }

    /// Plain-text inventory summary fed to the sommelier collaborator
    pub async fn inventory_summary(&self) -> String {
        let wines = self.wines.read().await;

        let total_wines = wines.len();
        let total_bottles: i64 = wines.iter().map(|w| w.quantity).sum();

        let mut by_type: Vec<(&str, i64)> = Vec::new();
        for wine in wines.iter() {
            let label = wine.wine_type.as_str();
            match by_type.iter_mut().find(|(t, _)| *t == label) {
                Some((_, count)) => *count += wine.quantity,
                None => by_type.push((label, wine.quantity)),
            }
        }
        let type_breakdown = by_type
            .iter()
            .map(|(t, count)| format!("{t}: {count}"))
            .collect::<Vec<_>>()
            .join(", ");

        // The list is kept newest-first
        let recent: Vec<String> = wines.iter().take(5).map(|w| w.name.clone()).collect();

        format!(
            "User's wine cellar:\n\
             - Distinct wines: {total_wines}\n\
             - Total bottles: {total_bottles}\n\
             - Stock by type: {}\n\
             - Recently added: {}",
            if type_breakdown.is_empty() { "none" } else { &type_breakdown },
            if recent.is_empty() { "none".to_string() } else { recent.join(", ") },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vintry_common::db::models::WineType;

    fn wine(name: &str, wine_type: WineType, quantity: i64) -> Wine {
        let mut w = Wine::new(name.into(), "Producer".into(), wine_type, "France".into());
        w.quantity = quantity;
        w
    }

    #[tokio::test]
    async fn mutation_actions_keep_the_mirror_consistent() {
        let library = Library::new();

        let a = wine("A", WineType::Red, 2);
        let b = wine("B", WineType::White, 1);
        library.add_wine(a.clone()).await;
        library.add_wine(b.clone()).await;
        assert_eq!(library.wines().await.len(), 2);
        // Newest first
        assert_eq!(library.wines().await[0].name, "B");

        let mut a2 = a.clone();
        a2.quantity = 5;
        library.update_wine(a.id, a2).await;
        assert_eq!(
            library.wines().await.iter().find(|w| w.id == a.id).unwrap().quantity,
            5
        );

        library.delete_wine(b.id).await;
        assert_eq!(library.wines().await.len(), 1);
    }

    #[tokio::test]
    async fn summary_counts_bottles_and_types() {
        let library = Library::new();
        library.add_wine(wine("Rioja", WineType::Red, 3)).await;
        library.add_wine(wine("Chablis", WineType::White, 2)).await;

        let summary = library.inventory_summary().await;
        assert!(summary.contains("Distinct wines: 2"));
        assert!(summary.contains("Total bottles: 5"));
        assert!(summary.contains("red: 3"));
        assert!(summary.contains("Chablis"));
    }

    #[tokio::test]
    async fn empty_library_summary_says_none() {
        let library = Library::new();
        let summary = library.inventory_summary().await;
        assert!(summary.contains("Stock by type: none"));
        assert!(summary.contains("Recently added: none"));
    }
}
