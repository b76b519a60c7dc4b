//! Quiet-window evaluation.
//!
//! Pure, total function over well-formed times of day. A window whose
//! start is later than its end spans midnight, so membership becomes the
//! union of the two half-ranges.

use chrono::NaiveTime;

use crate::storage::QuietWindow;

/// True when `now` falls inside the configured quiet window.
///
/// Boundaries are inclusive on both ends.
pub fn is_quiet(now: NaiveTime, window: &QuietWindow) -> bool {
    if !window.enabled {
        return false;
    }
    if window.start <= window.end {
        window.start <= now && now <= window.end
    } else {
        now >= window.start || now <= window.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn window(enabled: bool, start: NaiveTime, end: NaiveTime) -> QuietWindow {
        QuietWindow {
            enabled,
            start,
            end,
        }
    }

    #[test]
    fn disabled_window_is_never_quiet() {
        let w = window(false, t(0, 0), t(23, 59));
        assert!(!is_quiet(t(12, 0), &w));
    }

    #[test]
    fn plain_window_contains_midday() {
        let w = window(true, t(9, 0), t(17, 0));
        assert!(is_quiet(t(9, 0), &w));
        assert!(is_quiet(t(12, 0), &w));
        assert!(is_quiet(t(17, 0), &w));
        assert!(!is_quiet(t(8, 59), &w));
        assert!(!is_quiet(t(17, 1), &w));
    }

    #[test]
    fn overnight_window_spans_midnight() {
        let w = window(true, t(23, 0), t(6, 0));
        assert!(is_quiet(t(0, 30), &w));
        assert!(is_quiet(t(23, 0), &w));
        assert!(is_quiet(t(6, 0), &w));
        assert!(!is_quiet(t(12, 0), &w));
        assert!(!is_quiet(t(22, 59), &w));
    }

    #[test]
    fn degenerate_window_matches_only_its_instant() {
        let w = window(true, t(3, 0), t(3, 0));
        assert!(is_quiet(t(3, 0), &w));
        assert!(!is_quiet(t(3, 1), &w));
    }

    proptest! {
        #[test]
        fn matches_containment_or_wraparound_union(
            sh in 0u32..24, sm in 0u32..60,
            eh in 0u32..24, em in 0u32..60,
            nh in 0u32..24, nm in 0u32..60,
        ) {
            let (start, end, now) = (t(sh, sm), t(eh, em), t(nh, nm));
            let w = window(true, start, end);
            let expected = if start <= end {
                start <= now && now <= end
            } else {
                now >= start || now <= end
            };
            prop_assert_eq!(is_quiet(now, &w), expected);
        }

        #[test]
        fn wraparound_is_complement_of_inner_gap(
            sh in 0u32..24, sm in 0u32..60,
            eh in 0u32..24, em in 0u32..60,
            nh in 0u32..24, nm in 0u32..60,
        ) {
            let (start, end, now) = (t(sh, sm), t(eh, em), t(nh, nm));
            prop_assume!(start > end);
            // Inside the gap strictly between end and start it is not quiet;
            // everywhere else it is.
            let in_gap = now > end && now < start;
            prop_assert_eq!(is_quiet(now, &window(true, start, end)), !in_gap);
        }
    }
}
