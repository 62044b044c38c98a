//! Rank catalog management

use std::collections::HashMap;

use crate::error::CatalogError;
use crate::traits::RankCatalog;
use crate::types::{Rank, RankDefinition};

/// In-memory rank catalog, assembled at startup and immutable afterwards
#[derive(Debug, Clone, Default)]
pub struct StaticRankCatalog {
    definitions: HashMap<Rank, RankDefinition>,
}

impl StaticRankCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            definitions: HashMap::new(),
        }
    }

    /// The stock catalog: vip, mvp, mvp++ and immortal with their standard
    /// currency and claim-block grants
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for definition in [
            RankDefinition::new(Rank::Vip, 5_000, 200),
            RankDefinition::new(Rank::Mvp, 8_000, 500),
            RankDefinition::new(Rank::MvpPlusPlus, 12_000, 800),
            RankDefinition::new(Rank::Immortal, 15_000, 1_200),
        ] {
            catalog
                .register(definition)
                .expect("standard catalog has no duplicate ranks");
        }
        catalog
    }

    /// Register a rank definition
    ///
    /// Registering the same rank twice is rejected; amounts are fixed at
    /// assembly time.
    pub fn register(&mut self, definition: RankDefinition) -> Result<(), CatalogError> {
        if self.definitions.contains_key(&definition.rank) {
            return Err(CatalogError::AlreadyRegistered {
                rank: definition.rank.to_string(),
            });
        }
        self.definitions.insert(definition.rank, definition);
        Ok(())
    }

    /// Number of registered ranks
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl RankCatalog for StaticRankCatalog {
    fn lookup(&self, rank: Rank) -> Option<&RankDefinition> {
        self.definitions.get(&rank)
    }
}
