use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ActorId, RegionId, RegionRecord, UnitId, UnitRecord, UnitStatistics, UnitStatus};

/// Port for the external conglomerado service.
///
/// Implementations attach the current session token to every call and map
/// an expired credential to `IfnError::AuthExpired`.
#[async_trait]
pub trait ConglomeradoService: Send + Sync {
    /// List units, optionally restricted to one status
    async fn list_units(&self, status: Option<UnitStatus>) -> Result<Vec<UnitRecord>>;

    /// Fetch a single unit
    async fn get_unit(&self, id: &UnitId) -> Result<UnitRecord>;

    /// Reference list of regions (departamentos)
    async fn list_regions(&self) -> Result<Vec<RegionRecord>>;

    /// Approve a unit and assign it to a region
    async fn approve(&self, id: &UnitId, region: &RegionId, actor: &ActorId)
        -> Result<UnitRecord>;

    /// Reject a unit with a reason
    async fn reject(&self, id: &UnitId, reason: &str, actor: &ActorId) -> Result<UnitRecord>;

    /// Generate `count` new units at random coordinates
    async fn generate(&self, count: u32) -> Result<Vec<UnitRecord>>;

    /// Aggregate counts per status
    async fn statistics(&self) -> Result<UnitStatistics>;

    /// Delete a unit
    async fn delete_unit(&self, id: &UnitId) -> Result<()>;
}
