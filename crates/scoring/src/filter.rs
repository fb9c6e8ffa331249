//! Adaptive threshold reduction of a ranked score list.

use tablescout_core::FilterConfig;
use tracing::debug;

use crate::table_score::TableScore;

/// Reduce ranked scores to a bounded, noise-free candidate list.
///
/// 1. keep scores at or above the absolute threshold;
/// 2. if that keeps more than `max_candidates`, raise the bar to
///    `relative_threshold` of the top score (never below the absolute one);
/// 3. if fewer than `min_candidates` survive, take the first `min_fallback`
///    scores that are strictly positive, or the single top score when
///    nothing is positive;
/// 4. truncate to `max_candidates`.
///
/// Input order is preserved. The result is empty only for empty input.
pub fn filter_by_threshold(scores: &[TableScore], config: &FilterConfig) -> Vec<TableScore> {
    let Some(first) = scores.first() else {
        return Vec::new();
    };

    let keep_at_least = |threshold: f64| -> Vec<TableScore> {
        scores
            .iter()
            .filter(|s| s.score() >= threshold)
            .cloned()
            .collect()
    };

    let mut candidates = keep_at_least(config.absolute_threshold);
    let mut strategy = "absolute";

    if candidates.len() > config.max_candidates {
        let top = scores.iter().map(TableScore::score).fold(f64::MIN, f64::max);
        let threshold = config.absolute_threshold.max(top * config.relative_threshold);
        candidates = keep_at_least(threshold);
        strategy = "relative";
    }

    if candidates.len() < config.min_candidates {
        candidates = scores
            .iter()
            .take(config.min_fallback)
            .filter(|s| s.score() > 0.0)
            .cloned()
            .collect();
        strategy = "fallback";
        if candidates.is_empty() {
            candidates = vec![first.clone()];
            strategy = "last-resort";
        }
    }

    candidates.truncate(config.max_candidates);
    debug!(
        "Threshold filter ({}): {} of {} tables kept",
        strategy,
        candidates.len(),
        scores.len()
    );
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablescout_core::SignalCaps;

    use crate::signal::SignalKind;
    use crate::table_score::sort_scores;

    fn ranked(points: &[f64]) -> Vec<TableScore> {
        let mut v: Vec<TableScore> = points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let mut s = TableScore::new(&format!("t{:02}", i), SignalCaps::default());
                if *p > 0.0 {
                    s.add_score(SignalKind::TableName, *p, "x", None);
                }
                s
            })
            .collect();
        sort_scores(&mut v);
        v
    }

    fn names(v: &[TableScore]) -> Vec<&str> {
        v.iter().map(|s| s.table_name()).collect()
    }

    fn filter(points: &[f64]) -> Vec<TableScore> {
        filter_by_threshold(&ranked(points), &FilterConfig::default())
    }

    #[test]
    fn absolute_threshold() {
        let out = filter(&[20.0, 12.0, 5.0, 4.9, 0.0]);
        assert_eq!(names(&out), vec!["t00", "t01", "t02"]);
    }

    #[test]
    fn relative_threshold_when_too_many() {
        // ten tables over 5, top is 100 => bar is 30
        let out = filter(&[100.0, 90.0, 80.0, 40.0, 30.0, 29.0, 20.0, 10.0, 8.0, 6.0]);
        assert_eq!(names(&out), vec!["t00", "t01", "t02", "t03", "t04"]);
    }

    #[test]
    fn relative_pass_still_capped() {
        let out = filter(&[10.0; 12]);
        assert_eq!(out.len(), 8);
        assert_eq!(out[0].table_name(), "t00");
    }

    #[test]
    fn fallback_skips_zero_scores() {
        let out = filter(&[4.0, 2.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(names(&out), vec!["t00", "t01"]);

        let out = filter(&[6.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn last_resort_single_table() {
        let out = filter(&[0.0, 0.0, 0.0]);
        assert_eq!(names(&out), vec!["t00"]);
        assert_eq!(out[0].score(), 0.0);
    }

    #[test]
    fn empty_input() {
        assert!(filter(&[]).is_empty());
    }

    #[test]
    fn bounded_and_noise_free_for_many_shapes() {
        let config = FilterConfig::default();
        let shapes: Vec<Vec<f64>> = vec![
            vec![],
            vec![0.0],
            vec![3.0],
            vec![0.0; 30],
            (0..30).map(|i| i as f64).collect(),
            (0..30).map(|i| (i % 4) as f64 * 3.0).collect(),
            vec![50.0, 0.0, 0.0, 0.0],
            vec![7.0; 9],
        ];
        for shape in shapes {
            let out = filter_by_threshold(&ranked(&shape), &config);
            assert!(out.len() <= config.max_candidates);
            assert_eq!(out.is_empty(), shape.is_empty());
            let zeros = out.iter().filter(|s| s.score() == 0.0).count();
            assert!(zeros == 0 || out.len() == 1, "zero-score noise in {:?}", shape);
        }
    }
}
