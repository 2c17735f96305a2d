//! Static registry of chart indicators: canonical ids, alias tables, and
//! display metadata. Defined once at startup, immutable after.

use std::sync::OnceLock;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ── Indicator identity ──────────────────────────────────────────

/// Canonical indicator id. A closed enum so resolution is exhaustive —
/// no stringly-typed indicator can leak past the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum IndicatorId {
    Ma20,
    Ma50,
    Ma100,
    Ma200,
    Rsi,
    Macd,
    Bollinger,
    Volume,
}

impl IndicatorId {
    pub const ALL: [IndicatorId; 8] = [
        IndicatorId::Ma20,
        IndicatorId::Ma50,
        IndicatorId::Ma100,
        IndicatorId::Ma200,
        IndicatorId::Rsi,
        IndicatorId::Macd,
        IndicatorId::Bollinger,
        IndicatorId::Volume,
    ];

    /// Stable string form used on the wire and in result messages.
    pub fn as_str(self) -> &'static str {
        match self {
            IndicatorId::Ma20 => "ma20",
            IndicatorId::Ma50 => "ma50",
            IndicatorId::Ma100 => "ma100",
            IndicatorId::Ma200 => "ma200",
            IndicatorId::Rsi => "rsi",
            IndicatorId::Macd => "macd",
            IndicatorId::Bollinger => "bollinger",
            IndicatorId::Volume => "volume",
        }
    }
}

impl std::fmt::Display for IndicatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registry entry: identity plus everything the dispatcher and the
/// frontend need to know about one indicator.
#[derive(Debug, Clone, Copy)]
pub struct IndicatorDef {
    pub id: IndicatorId,
    /// UI store group the indicator toggles under.
    pub group: &'static str,
    pub aliases: &'static [&'static str],
    /// Oscillator-style indicators render in a separate pane below the
    /// price series and need a second dispatch to show/hide that pane.
    pub requires_aux_pane: bool,
    /// Human display name, used in preset descriptions.
    pub label: &'static str,
    pub explanation: &'static str,
}

const GROUP_MOVING_AVERAGES: &str = "movingAverages";
const GROUP_OSCILLATORS: &str = "oscillators";
const GROUP_OVERLAYS: &str = "overlays";
const GROUP_VOLUME: &str = "volume";

/// Definition lookup. Total over `IndicatorId`, so it cannot fail.
pub fn def(id: IndicatorId) -> &'static IndicatorDef {
    match id {
        IndicatorId::Ma20 => &IndicatorDef {
            id: IndicatorId::Ma20,
            group: GROUP_MOVING_AVERAGES,
            aliases: &["ma20", "ma 20", "20ma", "sma20", "20-day moving average", "20 day moving average", "moving average 20"],
            requires_aux_pane: false,
            label: "MA20",
            explanation: "The 20-day moving average smooths price over the last 20 sessions. Traders use it to read short-term trend direction.",
        },
        IndicatorId::Ma50 => &IndicatorDef {
            id: IndicatorId::Ma50,
            group: GROUP_MOVING_AVERAGES,
            aliases: &["ma50", "ma 50", "50ma", "sma50", "50-day moving average", "50 day moving average", "moving average 50"],
            requires_aux_pane: false,
            label: "MA50",
            explanation: "The 50-day moving average is a medium-term trend gauge. Price holding above it is commonly read as a healthy uptrend.",
        },
        IndicatorId::Ma100 => &IndicatorDef {
            id: IndicatorId::Ma100,
            group: GROUP_MOVING_AVERAGES,
            aliases: &["ma100", "ma 100", "100ma", "sma100", "100-day moving average", "100 day moving average", "moving average 100"],
            requires_aux_pane: false,
            label: "MA100",
            explanation: "The 100-day moving average tracks the intermediate trend, between the 50- and 200-day views.",
        },
        IndicatorId::Ma200 => &IndicatorDef {
            id: IndicatorId::Ma200,
            group: GROUP_MOVING_AVERAGES,
            aliases: &["ma200", "ma 200", "200ma", "sma200", "200-day moving average", "200 day moving average", "moving average 200"],
            requires_aux_pane: false,
            label: "MA200",
            explanation: "The 200-day moving average is the classic long-term trend line. Crosses of shorter averages through it (golden/death crosses) are widely watched.",
        },
        IndicatorId::Rsi => &IndicatorDef {
            id: IndicatorId::Rsi,
            group: GROUP_OSCILLATORS,
            aliases: &["rsi", "relative strength index", "relative strength"],
            requires_aux_pane: true,
            label: "RSI",
            explanation: "RSI (Relative Strength Index) oscillates between 0 and 100. Readings above 70 suggest overbought conditions, below 30 oversold.",
        },
        IndicatorId::Macd => &IndicatorDef {
            id: IndicatorId::Macd,
            group: GROUP_OSCILLATORS,
            aliases: &["macd", "moving average convergence divergence"],
            requires_aux_pane: true,
            label: "MACD",
            explanation: "MACD measures the gap between two exponential moving averages. Signal-line crossovers are used as momentum shifts.",
        },
        IndicatorId::Bollinger => &IndicatorDef {
            id: IndicatorId::Bollinger,
            group: GROUP_OVERLAYS,
            aliases: &["bollinger", "bollinger bands", "bbands", "bands"],
            requires_aux_pane: false,
            label: "Bollinger Bands",
            explanation: "Bollinger Bands plot a volatility envelope two standard deviations around a moving average. Band squeezes often precede larger moves.",
        },
        IndicatorId::Volume => &IndicatorDef {
            id: IndicatorId::Volume,
            group: GROUP_VOLUME,
            aliases: &["volume", "vol"],
            requires_aux_pane: false,
            label: "Volume",
            explanation: "Volume shows how many shares or contracts traded per bar. Moves on heavy volume carry more conviction than moves on light volume.",
        },
    }
}

// ── Alias resolution ────────────────────────────────────────────

/// Lowercased alias → id table, built once. Canonical ids are listed in
/// their own alias sets, so `resolve("ma50")` hits the exact path.
fn alias_table() -> &'static IndexMap<&'static str, IndicatorId> {
    static TABLE: OnceLock<IndexMap<&'static str, IndicatorId>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = IndexMap::new();
        for id in IndicatorId::ALL {
            for alias in def(id).aliases {
                table.insert(*alias, id);
            }
        }
        table
    })
}

/// Whether `needle` occurs in `haystack` bounded by non-alphanumeric
/// characters on both sides, so short aliases cannot match inside longer
/// words ("vol" must not hit "volatility", "bands" not "husbands").
fn contains_word(haystack: &str, needle: &str) -> bool {
    for (idx, matched) in haystack.match_indices(needle) {
        let before_ok = haystack
            .get(..idx)
            .and_then(|prefix| prefix.chars().next_back())
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack
            .get(idx + matched.len()..)
            .and_then(|suffix| suffix.chars().next())
            .map_or(true, |c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
    }
    false
}

/// First run of ASCII digits in `text`, parsed as a period.
fn embedded_period(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Resolve a text fragment to an indicator id. Never panics; `None` means
/// no match.
///
/// Policy: exact alias match first, then the numeric moving-average
/// heuristic ("50-day moving average", "moving average 50", "ma50" all
/// resolve to `ma50`), then per-family keyword matching. The numeric
/// heuristic fails closed: "ma37" resolves to nothing rather than
/// inventing an indicator.
pub fn resolve(fragment: &str) -> Option<IndicatorId> {
    let norm = fragment.trim().to_lowercase();
    if norm.is_empty() {
        return None;
    }

    if let Some(id) = alias_table().get(norm.as_str()) {
        return Some(*id);
    }

    // Numeric moving-average phrasings with an embedded period.
    let looks_like_ma = norm.contains("moving average")
        || norm.contains("-day ma")
        || norm.contains(" day ma")
        || (norm.starts_with("ma") && norm.chars().nth(2).is_some_and(|c| c.is_ascii_digit() || c == ' '));
    if looks_like_ma {
        if let Some(period) = embedded_period(&norm) {
            let candidate = format!("ma{period}");
            return alias_table().get(candidate.as_str()).copied();
        }
    }

    // Keyword scan: any known alias appearing as a whole word inside the
    // fragment. Short aliases (< 3 chars) are excluded outright.
    for id in IndicatorId::ALL {
        for alias in def(id).aliases {
            if alias.len() >= 3 && contains_word(&norm, alias) {
                return Some(id);
            }
        }
    }

    None
}

/// Fixed descriptive text per indicator, with a generic fallback for ids
/// the registry does not know.
pub fn explanation(id_or_alias: &str) -> String {
    match resolve(id_or_alias) {
        Some(id) => def(id).explanation.to_string(),
        None => format!(
            "{id_or_alias} is not an indicator I can explain yet. Supported indicators: moving averages (MA20/50/100/200), RSI, MACD, Bollinger Bands, and Volume."
        ),
    }
}
