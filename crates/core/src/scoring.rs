//! Scoring module - line-clear points, back-to-back and combo bonuses
//!
//! | lines | normal | T-spin |
//! |-------|--------|--------|
//! | 1 | 100 | 800 |
//! | 2 | 300 | 1200 |
//! | 3 | 500 | 1600 |
//! | 4 | 800 | - |
//!
//! A back-to-back clear multiplies the base by 3/2. The (possibly boosted)
//! base is multiplied by the level, then the combo bonus
//! `50 * combo * level` is added whenever `combo > 0`.

use crate::types::{
    ClearKind, B2B_DENOMINATOR, B2B_NUMERATOR, COMBO_BASE, LINE_SCORES, TSPIN_SCORES,
};

/// Breakdown of the points awarded for one clear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    /// Base points times level, including any back-to-back multiplier
    pub line_clear_score: u32,
    /// Combo bonus added on top
    pub combo_bonus: u32,
    pub total: u32,
    /// Category this clear records for the next back-to-back check
    pub kind: ClearKind,
    pub back_to_back: bool,
}

/// Category of a clear: T-spins and Tetrises are special, the rest ordinary
pub fn clear_kind(lines: usize, tspin: bool) -> ClearKind {
    match (tspin, lines) {
        (true, 1..=3) => ClearKind::TSpin,
        (_, 4) => ClearKind::Tetris,
        _ => ClearKind::None,
    }
}

/// Unscaled base points for a clear
pub fn base_points(lines: usize, tspin: bool) -> u32 {
    if tspin && (1..=3).contains(&lines) {
        TSPIN_SCORES[lines]
    } else {
        LINE_SCORES.get(lines).copied().unwrap_or(0)
    }
}

/// Whether the clear chains a back-to-back bonus after `previous`
pub fn is_back_to_back(kind: ClearKind, previous: ClearKind) -> bool {
    kind != ClearKind::None && kind == previous
}

pub fn apply_b2b_multiplier(points: u32) -> u32 {
    points.saturating_mul(B2B_NUMERATOR) / B2B_DENOMINATOR
}

/// `50 * combo * level` for a running chain, zero on its first clear
pub fn combo_bonus(combo: i32, level: u32) -> u32 {
    if combo <= 0 {
        return 0;
    }
    COMBO_BASE
        .saturating_mul(combo as u32)
        .saturating_mul(level)
}

/// Score one clear.
///
/// `combo` is the chain index after counting this clear (0 on the first clear
/// of a chain) and `previous` the category of the last clear.
pub fn calculate_score(
    lines: usize,
    level: u32,
    tspin: bool,
    combo: i32,
    previous: ClearKind,
) -> ScoreResult {
    let kind = clear_kind(lines, tspin);
    let back_to_back = is_back_to_back(kind, previous);

    let mut base = base_points(lines, tspin);
    if back_to_back {
        base = apply_b2b_multiplier(base);
    }
    let line_clear_score = base.saturating_mul(level);
    let combo_bonus = combo_bonus(combo, level);

    ScoreResult {
        line_clear_score,
        combo_bonus,
        total: line_clear_score.saturating_add(combo_bonus),
        kind,
        back_to_back,
    }
}
