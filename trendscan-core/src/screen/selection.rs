//! Candidate ranking and final pick.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::config::Diversification;
use crate::domain::Candidate;

/// Sort by r-score, best first; equal scores fall back to ticker order.
pub fn rank(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        b.r_score
            .partial_cmp(&a.r_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.ticker.cmp(&b.ticker))
    });
}

/// Rank, then keep the top `max_positions`.
///
/// With diversification on, only the best ticker of each sector is eligible
/// and at most `max_sectors` sectors are used.
pub fn select(
    mut candidates: Vec<Candidate>,
    max_positions: usize,
    diversification: &Diversification,
) -> Vec<Candidate> {
    rank(&mut candidates);

    if !diversification.enabled {
        candidates.truncate(max_positions);
        return candidates;
    }

    let cap = max_positions.min(diversification.max_sectors);
    let mut seen = HashSet::new();
    let mut picked = Vec::with_capacity(cap);
    for candidate in candidates {
        if picked.len() == cap {
            break;
        }
        if seen.insert(candidate.sector.clone()) {
            picked.push(candidate);
        }
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(ticker: &str, sector: &str, r_score: f64) -> Candidate {
        Candidate {
            ticker: ticker.into(),
            sector: sector.into(),
            price: 10.0,
            stop: 9.0,
            atr: 1.0,
            shares: 1,
            position_value: 10.0,
            actual_risk: 1.0,
            r_score,
            atr_ratio: 1.0,
            risk_reward: 0.1,
            rsi: None,
            macd_histogram: None,
        }
    }

    fn tickers(cands: &[Candidate]) -> Vec<&str> {
        cands.iter().map(|c| c.ticker.as_str()).collect()
    }

    #[test]
    fn rank_orders_by_score_then_ticker() {
        let mut cands = vec![
            cand("CCC", "A", 0.5),
            cand("BBB", "A", 0.9),
            cand("AAA", "B", 0.5),
        ];
        rank(&mut cands);
        assert_eq!(tickers(&cands), vec!["BBB", "AAA", "CCC"]);
    }

    #[test]
    fn top_n_without_diversification() {
        let cands = vec![
            cand("A1", "Tech", 0.9),
            cand("A2", "Tech", 0.8),
            cand("A3", "Tech", 0.7),
            cand("B1", "Energy", 0.6),
        ];
        let picked = select(cands, 3, &Diversification::default());
        assert_eq!(tickers(&picked), vec!["A1", "A2", "A3"]);
    }

    #[test]
    fn one_per_sector_with_diversification() {
        let cands = vec![
            cand("A1", "Tech", 0.9),
            cand("A2", "Tech", 0.8),
            cand("B1", "Energy", 0.6),
            cand("C1", "Health", 0.5),
            cand("D1", "Retail", 0.4),
        ];
        let div = Diversification {
            enabled: true,
            max_sectors: 3,
        };
        let picked = select(cands.clone(), 5, &div);
        assert_eq!(tickers(&picked), vec!["A1", "B1", "C1"]);

        let picked = select(cands, 2, &div);
        assert_eq!(tickers(&picked), vec!["A1", "B1"]);
    }

    #[test]
    fn empty_input_selects_nothing() {
        assert!(select(Vec::new(), 3, &Diversification::default()).is_empty());
    }
}
