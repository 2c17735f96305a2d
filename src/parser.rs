//! Deterministic keyword parser: free-form assistant text in, zero or more
//! typed chart commands out. This is alias matching against a fixed
//! registry, not natural-language understanding — anything it does not
//! recognize it drops, and the rest of the sentence still parses.

use crate::chart::LevelKind;
use crate::indicators::resolve;
use crate::intent::ChartCommand;
use crate::presets;

// ── Free text ───────────────────────────────────────────────────

const ENABLE_VERBS: &[&str] = &["show", "add", "enable", "display", "turn on"];
const DISABLE_VERBS: &[&str] = &["remove", "hide", "disable", "turn off"];

/// Parse free-form text into an ordered list of commands.
///
/// Categories are tried in priority order — indicator toggle, preset,
/// price level, clear drawings — and the first match per category wins,
/// but one sentence may contribute one command from each category.
pub fn parse(text: &str) -> Vec<ChartCommand> {
    let lower = text.to_lowercase();
    let mut commands = Vec::new();

    if let Some(cmd) = parse_indicator_toggle(&lower) {
        commands.push(cmd);
    }
    if let Some(cmd) = parse_preset(&lower) {
        commands.push(cmd);
    }
    if let Some(cmd) = parse_level(text, &lower) {
        commands.push(cmd);
    }
    if let Some(cmd) = parse_clear(&lower) {
        commands.push(cmd);
    }

    commands
}

/// Earliest toggle verb whose trailing text resolves to a known indicator.
/// A verb with an unrecognized indicator contributes nothing — the rest of
/// the sentence is unaffected.
fn parse_indicator_toggle(lower: &str) -> Option<ChartCommand> {
    let mut verbs: Vec<(usize, usize, bool)> = Vec::new();
    for verb in ENABLE_VERBS {
        if let Some(pos) = lower.find(verb) {
            verbs.push((pos, verb.len(), true));
        }
    }
    for verb in DISABLE_VERBS {
        if let Some(pos) = lower.find(verb) {
            verbs.push((pos, verb.len(), false));
        }
    }
    verbs.sort_unstable();

    // Each verb only claims the text up to the next verb, so its polarity
    // cannot attach to an indicator named in a later clause
    // ("remove all drawings and add RSI" enables RSI).
    for (i, &(pos, len, enabled)) in verbs.iter().enumerate() {
        let window_end = verbs
            .get(i + 1)
            .map_or(lower.len(), |&(next_pos, _, _)| next_pos.max(pos + len));
        let rest = lower.get(pos + len..window_end).unwrap_or("");
        if let Some(indicator_id) = resolve(rest) {
            return Some(ChartCommand::ToggleIndicator {
                indicator_id,
                enabled,
            });
        }
    }
    None
}

/// Preset phrases: a known preset name plus an "apply"/"analysis"/"preset"
/// qualifier, so a bare mention of e.g. "momentum" in prose is not a
/// command.
fn parse_preset(lower: &str) -> Option<ChartCommand> {
    let qualified = lower.contains("analysis") || lower.contains("apply") || lower.contains("preset");
    if !qualified {
        return None;
    }
    presets::names()
        .find(|name| lower.contains(name))
        .map(|name| ChartCommand::ApplyPreset {
            preset_name: name.to_string(),
        })
}

/// Price levels: a dollar-denominated number plus a support/resistance
/// keyword. Malformed numbers are skipped, not errors.
fn parse_level(original: &str, lower: &str) -> Option<ChartCommand> {
    let support_pos = lower.find("support");
    let resistance_pos = lower.find("resistance");
    let level_type = match (support_pos, resistance_pos) {
        (Some(s), Some(r)) if r < s => LevelKind::Resistance,
        (Some(_), _) => LevelKind::Support,
        (None, Some(_)) => LevelKind::Resistance,
        (None, None) => return None,
    };

    let price = dollar_amount(lower)?;
    Some(ChartCommand::HighlightLevel {
        price,
        level_type,
        label: extract_label(original),
    })
}

/// First parseable number following a `$`. Accepts integers and decimals,
/// with thousands separators stripped ("$1,000" reads as 1000); skips
/// malformed candidates and keeps scanning.
fn dollar_amount(lower: &str) -> Option<f64> {
    for (pos, _) in lower.match_indices('$') {
        let after = lower.get(pos + 1..).unwrap_or("");
        let number: String = after
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
            .filter(|c| *c != ',')
            .collect();
        if let Ok(price) = number.parse::<f64>() {
            return Some(price);
        }
    }
    None
}

/// Optional label: first quoted span, else the first run of two or more
/// capitalized words (e.g. `Key Support`).
fn extract_label(original: &str) -> Option<String> {
    for quote in ['"', '\''] {
        let mut parts = original.split(quote);
        parts.next();
        let quoted = parts.next();
        // A span counts only with a matching closing quote; a lone
        // apostrophe in a contraction ("There's") opens nothing.
        if parts.next().is_none() {
            continue;
        }
        if let Some(quoted) = quoted {
            let trimmed = quoted.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }

    let words: Vec<&str> = original.split_whitespace().collect();
    let mut run: Vec<&str> = Vec::new();
    // Skip the sentence-initial word: it is capitalized by grammar, not
    // because it names anything.
    for word in words.iter().skip(1) {
        let capitalized = word.chars().next().is_some_and(char::is_uppercase)
            && word.chars().all(|c| c.is_alphabetic());
        if capitalized {
            run.push(word);
        } else {
            if run.len() >= 2 {
                break;
            }
            run.clear();
        }
    }
    if run.len() >= 2 {
        Some(run.join(" "))
    } else {
        None
    }
}

fn parse_clear(lower: &str) -> Option<ChartCommand> {
    const PHRASES: &[&str] = &[
        "clear all drawings",
        "clear drawings",
        "clear the drawings",
        "remove all drawings",
    ];
    PHRASES
        .iter()
        .any(|p| lower.contains(p))
        .then_some(ChartCommand::ClearDrawings)
}

// ── Legacy colon commands ───────────────────────────────────────

/// Outcome of translating one legacy colon-delimited command string.
#[derive(Debug, Clone, PartialEq)]
pub enum LegacyResolution {
    /// Translated into a chart command.
    Resolved(ChartCommand),
    /// An `INDICATOR:` command naming an alias the registry does not know.
    Unknown { alias: String },
    /// A legacy verb owned by another subsystem (`LOAD:`, `TIMEFRAME:`, …).
    Foreign,
}

/// Translate a legacy command such as `"INDICATOR:RSI"`. Indicator aliases
/// go through the same resolution rules as free text; other verbs ride the
/// same channel but belong to other subsystems and are not ours to answer
/// for.
pub fn translate_legacy(command: &str) -> LegacyResolution {
    let Some((verb, arg)) = command.split_once(':') else {
        return LegacyResolution::Foreign;
    };
    if !verb.trim().eq_ignore_ascii_case("indicator") {
        return LegacyResolution::Foreign;
    }
    match resolve(arg) {
        Some(indicator_id) => LegacyResolution::Resolved(ChartCommand::ToggleIndicator {
            indicator_id,
            enabled: true,
        }),
        None => LegacyResolution::Unknown {
            alias: arg.trim().to_string(),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::indicators::IndicatorId;

    #[test]
    fn show_phrase_enables_indicator() {
        let cmds = parse("Show the 50-day moving average");
        assert_eq!(
            cmds,
            vec![ChartCommand::ToggleIndicator {
                indicator_id: IndicatorId::Ma50,
                enabled: true
            }]
        );
    }

    #[test]
    fn hide_phrase_disables_indicator() {
        let cmds = parse("please hide RSI for now");
        assert_eq!(
            cmds,
            vec![ChartCommand::ToggleIndicator {
                indicator_id: IndicatorId::Rsi,
                enabled: false
            }]
        );
    }

    #[test]
    fn unknown_indicator_fails_open_for_rest_of_sentence() {
        let cmds = parse("Add the fibonacci spiral and mark resistance at $500");
        assert_eq!(
            cmds,
            vec![ChartCommand::HighlightLevel {
                price: 500.0,
                level_type: LevelKind::Resistance,
                label: None
            }]
        );
    }

    #[test]
    fn one_sentence_can_yield_multiple_categories() {
        let cmds = parse("Show RSI and there is support at $420");
        assert_eq!(cmds.len(), 2);
        assert!(matches!(
            cmds.first(),
            Some(ChartCommand::ToggleIndicator {
                indicator_id: IndicatorId::Rsi,
                enabled: true
            })
        ));
        assert!(matches!(
            cmds.get(1),
            Some(ChartCommand::HighlightLevel { price, .. }) if (price - 420.0).abs() < f64::EPSILON
        ));
    }

    #[test]
    fn preset_phrase_needs_qualifier() {
        assert_eq!(
            parse("Apply basic analysis"),
            vec![ChartCommand::ApplyPreset {
                preset_name: "basic".to_string()
            }]
        );
        assert!(parse("the momentum looked weak today").is_empty());
    }

    #[test]
    fn level_accepts_decimals_and_quoted_label() {
        let cmds = parse("resistance near $420.50, call it \"Breakout Zone\"");
        assert_eq!(
            cmds,
            vec![ChartCommand::HighlightLevel {
                price: 420.5,
                level_type: LevelKind::Resistance,
                label: Some("Breakout Zone".to_string())
            }]
        );
    }

    #[test]
    fn malformed_dollar_amount_is_skipped() {
        assert!(parse("support at $ soon").is_empty());
        // A later well-formed amount still parses.
        let cmds = parse("support at $.. or maybe $410");
        assert_eq!(
            cmds,
            vec![ChartCommand::HighlightLevel {
                price: 410.0,
                level_type: LevelKind::Support,
                label: None
            }]
        );
    }

    #[test]
    fn contraction_apostrophe_is_not_a_label_quote() {
        let cmds = parse("There's support at $420");
        assert_eq!(
            cmds,
            vec![ChartCommand::HighlightLevel {
                price: 420.0,
                level_type: LevelKind::Support,
                label: None
            }]
        );
    }

    #[test]
    fn single_quoted_label_still_needs_its_closing_quote() {
        let cmds = parse("mark support at $390, call it 'Floor Zone' please");
        assert_eq!(
            cmds,
            vec![ChartCommand::HighlightLevel {
                price: 390.0,
                level_type: LevelKind::Support,
                label: Some("Floor Zone".to_string())
            }]
        );
    }

    #[test]
    fn verb_polarity_stays_within_its_own_clause() {
        let cmds = parse("remove all drawings and add RSI");
        assert_eq!(
            cmds,
            vec![
                ChartCommand::ToggleIndicator {
                    indicator_id: IndicatorId::Rsi,
                    enabled: true
                },
                ChartCommand::ClearDrawings,
            ]
        );
    }

    #[test]
    fn thousands_separator_reads_as_full_amount() {
        let cmds = parse("major resistance at $1,000");
        assert_eq!(
            cmds,
            vec![ChartCommand::HighlightLevel {
                price: 1000.0,
                level_type: LevelKind::Resistance,
                label: None
            }]
        );
    }

    #[test]
    fn clear_phrase_parses() {
        assert_eq!(parse("clear all drawings"), vec![ChartCommand::ClearDrawings]);
    }

    #[test]
    fn legacy_indicator_commands_translate() {
        assert_eq!(
            translate_legacy("INDICATOR:RSI"),
            LegacyResolution::Resolved(ChartCommand::ToggleIndicator {
                indicator_id: IndicatorId::Rsi,
                enabled: true
            })
        );
        assert_eq!(
            translate_legacy("INDICATOR:vwap"),
            LegacyResolution::Unknown {
                alias: "vwap".to_string()
            }
        );
        assert_eq!(translate_legacy("LOAD:TSLA"), LegacyResolution::Foreign);
        assert_eq!(translate_legacy("no colon"), LegacyResolution::Foreign);
    }
}
