//! Abstraction over the chart-rendering surface, so the pipeline can be
//! exercised without a real chart (mirrors the emitter seam used for chat).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ── Price levels ────────────────────────────────────────────────

/// Kind of a highlighted price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum LevelKind {
    Support,
    Resistance,
}

/// Support levels render green, resistance red. Fixed by contract with the
/// frontend theme.
pub const SUPPORT_COLOR: &str = "#26a69a";
pub const RESISTANCE_COLOR: &str = "#ef5350";

impl LevelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LevelKind::Support => "support",
            LevelKind::Resistance => "resistance",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            LevelKind::Support => SUPPORT_COLOR,
            LevelKind::Resistance => RESISTANCE_COLOR,
        }
    }
}

impl std::fmt::Display for LevelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Chart surface ───────────────────────────────────────────────

/// Opaque handle to one price-line annotation created on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceLineId(pub u64);

/// The rendering surface the dispatcher draws on: the active price series
/// of the hosting app's chart. Implementations must not panic; failures
/// come back as `Err` and are converted to failed command outcomes at the
/// dispatcher boundary.
pub trait ChartSurface: Send + Sync {
    /// Create a horizontal price-line annotation. Returns a handle usable
    /// with [`ChartSurface::remove_price_line`].
    fn create_price_line(
        &self,
        price: f64,
        color: &str,
        label: Option<&str>,
    ) -> Result<PriceLineId, String>;

    /// Remove a previously created annotation.
    fn remove_price_line(&self, handle: PriceLineId) -> Result<(), String>;
}

/// No-op surface for headless use — annotations are acknowledged but not
/// rendered anywhere.
#[derive(Debug, Default)]
pub struct NoopChart {
    next_id: std::sync::atomic::AtomicU64,
}

impl ChartSurface for NoopChart {
    fn create_price_line(
        &self,
        _price: f64,
        _color: &str,
        _label: Option<&str>,
    ) -> Result<PriceLineId, String> {
        let id = self
            .next_id
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        Ok(PriceLineId(id))
    }

    fn remove_price_line(&self, _handle: PriceLineId) -> Result<(), String> {
        Ok(())
    }
}
