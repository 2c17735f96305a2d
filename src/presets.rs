//! Named bundles of indicator toggles, applied as one command.

use std::sync::OnceLock;

use indexmap::IndexMap;

use crate::indicators::{def, IndicatorId};

/// A preset: an ordered list of indicators to enable, optionally after
/// resetting the chart to its default indicator set.
#[derive(Debug, Clone, Copy)]
pub struct Preset {
    pub name: &'static str,
    pub indicator_ids: &'static [IndicatorId],
    pub resets_defaults: bool,
}

impl Preset {
    /// Human-readable confirmation, e.g. `"Applied basic analysis (MA20, MA50)"`.
    pub fn description(&self) -> String {
        let labels: Vec<&str> = self.indicator_ids.iter().map(|id| def(*id).label).collect();
        format!("Applied {} analysis ({})", self.name, labels.join(", "))
    }
}

fn catalog() -> &'static IndexMap<&'static str, Preset> {
    static CATALOG: OnceLock<IndexMap<&'static str, Preset>> = OnceLock::new();
    CATALOG.get_or_init(|| {
        let presets = [
            Preset {
                name: "basic",
                indicator_ids: &[IndicatorId::Ma20, IndicatorId::Ma50],
                resets_defaults: true,
            },
            Preset {
                name: "advanced",
                indicator_ids: &[
                    IndicatorId::Ma20,
                    IndicatorId::Ma50,
                    IndicatorId::Ma200,
                    IndicatorId::Bollinger,
                    IndicatorId::Volume,
                ],
                resets_defaults: true,
            },
            Preset {
                name: "momentum",
                indicator_ids: &[IndicatorId::Rsi, IndicatorId::Macd],
                resets_defaults: false,
            },
        ];
        presets.into_iter().map(|p| (p.name, p)).collect()
    })
}

/// Case-insensitive preset lookup. Unknown names yield `None`, never a
/// dispatch.
pub fn lookup(name: &str) -> Option<&'static Preset> {
    let norm = name.trim().to_lowercase();
    catalog().get(norm.as_str())
}

/// Preset names in catalog order, for parser keyword matching and help text.
pub fn names() -> impl Iterator<Item = &'static str> {
    catalog().keys().copied()
}
