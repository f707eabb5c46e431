mod common;

use common::date;
use moneta_domain::{CategoryRule, RulePeriod};

#[test]
fn unbounded_daily_rule_counts_every_day_inclusive() {
    let rule = CategoryRule::new(-100, Some(RulePeriod::Day));
    assert_eq!(
        rule.count_occurrences_between(date(2016, 1, 1), date(2016, 12, 31)),
        366
    );
    assert_eq!(
        rule.count_occurrences_between(date(2015, 1, 1), date(2015, 12, 31)),
        365
    );
}

#[test]
fn biweekly_rule_stays_anchored_to_its_start_date() {
    // Anchored on a Tuesday years before the query window.
    let rule = CategoryRule::new(-2500, Some(RulePeriod::Week))
        .every(2)
        .anchored(date(2012, 4, 17));
    assert_eq!(
        rule.count_occurrences_between(date(2016, 1, 1), date(2016, 7, 18)),
        14
    );
    assert_eq!(
        rule.count_occurrences_between(date(2016, 1, 1), date(2016, 7, 19)),
        15
    );
    assert_eq!(
        rule.count_occurrences_between(date(2016, 1, 1), date(2016, 7, 20)),
        15
    );
}

#[test]
fn quarterly_rule_from_mid_january() {
    let rule = CategoryRule::new(-30000, Some(RulePeriod::Month))
        .every(3)
        .anchored(date(2016, 1, 15));
    assert_eq!(
        rule.count_occurrences_between(date(2016, 1, 1), date(2016, 12, 31)),
        4
    );

    let ends_in_august = rule.clone().until(date(2016, 8, 1));
    assert_eq!(
        ends_in_august.count_occurrences_between(date(2016, 1, 1), date(2016, 12, 31)),
        3
    );

    let ends_mid_october = rule.until(date(2016, 10, 15));
    assert_eq!(
        ends_mid_october.count_occurrences_between(date(2016, 1, 1), date(2016, 12, 31)),
        4
    );
}

#[test]
fn windows_outside_the_rule_bounds_count_nothing() {
    let rule = CategoryRule::new(-100, Some(RulePeriod::Day))
        .anchored(date(2016, 6, 1))
        .until(date(2016, 6, 30));
    assert_eq!(
        rule.count_occurrences_between(date(2016, 1, 1), date(2016, 5, 31)),
        0
    );
    assert_eq!(
        rule.count_occurrences_between(date(2016, 7, 1), date(2016, 12, 31)),
        0
    );
}

#[test]
fn yearly_rule_counts_anniversaries() {
    let rule = CategoryRule::new(-9900, Some(RulePeriod::Year)).anchored(date(2012, 3, 10));
    assert_eq!(
        rule.count_occurrences_between(date(2016, 1, 1), date(2016, 3, 9)),
        0
    );
    assert_eq!(
        rule.count_occurrences_between(date(2016, 1, 1), date(2016, 3, 10)),
        1
    );
    assert_eq!(
        rule.count_occurrences_between(date(2012, 3, 10), date(2016, 3, 10)),
        5
    );
}

#[test]
fn daily_count_over_any_window_equals_its_length() {
    let rule = CategoryRule::new(-1, Some(RulePeriod::Day));
    let starts = [
        date(2016, 1, 1),
        date(2016, 2, 27),
        date(2016, 12, 30),
        date(2017, 5, 14),
    ];
    for start in starts {
        for length in [0i32, 1, 6, 27, 364] {
            let end = plus_days(start, length);
            assert_eq!(
                rule.count_occurrences_between(start, end),
                (length + 1) as u32,
                "window {start} + {length} days"
            );
        }
    }
}

#[test]
fn raising_the_skip_factor_never_raises_the_count() {
    let begin = date(2016, 1, 1);
    let end = date(2017, 6, 30);
    for period in [RulePeriod::Day, RulePeriod::Week, RulePeriod::Month, RulePeriod::Year] {
        let base = CategoryRule::new(-1, Some(period))
            .anchored(date(2015, 3, 7))
            .count_occurrences_between(begin, end);
        for repeat_n in 2..=8 {
            let thinned = CategoryRule::new(-1, Some(period))
                .anchored(date(2015, 3, 7))
                .every(repeat_n)
                .count_occurrences_between(begin, end);
            assert!(
                thinned <= base,
                "{period:?} every {repeat_n}: {thinned} > {base}"
            );
        }
    }
}

fn plus_days(start: moneta_domain::PDate, days: i32) -> moneta_domain::PDate {
    moneta_domain::PDate::from_value(start.value() + days).expect("in range")
}
