//! Tests for the highlight classifier

#[cfg(test)]
mod highlight_tests {
    use crate::blame::{parse, BlameReport, UNCOMMITTED_SHA};
    use crate::color::color_for;
    use crate::config::{LineageConfig, ResolvedConfig};
    use crate::highlight::{classify, uncommitted_color, Classification, GroupKey, HighlightMode};

    fn config() -> ResolvedConfig {
        ResolvedConfig::defaults().expect("defaults should resolve")
    }

    fn sha(ch: char) -> String {
        ch.to_string().repeat(40)
    }

    /// Line 1 by Alice (newest), line 2 by Bob (older), line 3 uncommitted
    fn sample_report() -> BlameReport {
        let raw = format!(
            "{a} 1 1\nauthor Alice\nauthor-time 1700000000\nsummary new\n\tx\n\
             {b} 2 2\nauthor Bob\nauthor-time 1500000000\nsummary old\n\tx\n\
             {z} 3 3\nauthor Not Committed Yet\nauthor-time 1710000000\n\tx\n",
            a = sha('a'),
            b = sha('b'),
            z = UNCOMMITTED_SHA,
        );
        parse(&raw)
    }

    fn lines_of(classification: &Classification, key: &GroupKey) -> Vec<u32> {
        classification
            .groups
            .get(key)
            .map(|group| group.line_numbers.clone())
            .unwrap_or_default()
    }

    #[test]
    fn test_none_mode_classifies_nothing() {
        let classification = classify(&sample_report(), &HighlightMode::None, &config());
        assert!(classification.groups.is_empty());
        assert!(classification.navigation.is_empty());
    }

    #[test]
    fn test_failed_report_classifies_empty() {
        let failed = parse(&format!("{} 1 99999999999999999999\n\tx\n", sha('a')));
        assert!(!failed.success);
        let classification = classify(&failed, &HighlightMode::Author, &config());
        assert!(classification.groups.is_empty());
    }

    #[test]
    fn test_age_mode_cutoff_between_lines() {
        // Cutoff (ms) between Bob's and Alice's timestamps: only line 1 is
        // recent; line 3 is reported separately as uncommitted
        let mode = HighlightMode::Age { cutoff_ms: 1_600_000_000_000 };
        let classification = classify(&sample_report(), &mode, &config());

        assert_eq!(lines_of(&classification, &GroupKey::Recent), vec![1]);
        assert_eq!(lines_of(&classification, &GroupKey::Uncommitted), vec![3]);
        assert_eq!(classification.navigation, vec![1, 3]);
    }

    #[test]
    fn test_age_mode_unknown_timestamp_never_qualifies() {
        let raw = format!("{} 1 1\nauthor Alice\n\tx\n", sha('a'));
        let report = parse(&raw);
        // Cutoff far in the past: a known timestamp would qualify, 0 must not
        let mode = HighlightMode::Age { cutoff_ms: -60_000 };
        let classification = classify(&report, &mode, &config());
        assert!(classification.groups.is_empty());
    }

    #[test]
    fn test_age_mode_uncommitted_disabled() {
        let resolved = LineageConfig {
            highlight_uncommitted: Some(false),
            ..Default::default()
        }
        .resolve()
        .expect("config should resolve");

        let mode = HighlightMode::Age { cutoff_ms: 1_600_000_000_000 };
        let classification = classify(&sample_report(), &mode, &resolved);
        assert!(classification.groups.get(&GroupKey::Uncommitted).is_none());
        assert_eq!(classification.navigation, vec![1]);
    }

    #[test]
    fn test_author_mode_groups_by_author() {
        let cfg = config();
        let classification = classify(&sample_report(), &HighlightMode::Author, &cfg);

        let alice = GroupKey::Author("Alice".to_string());
        let bob = GroupKey::Author("Bob".to_string());
        assert_eq!(lines_of(&classification, &alice), vec![1]);
        assert_eq!(lines_of(&classification, &bob), vec![2]);
        assert_eq!(lines_of(&classification, &GroupKey::Uncommitted), vec![3]);

        // Colors are re-derivable from the group key alone
        let group = classification.groups.get(&alice).expect("alice group");
        assert_eq!(
            group.color,
            color_for("author:Alice", cfg.saturation, cfg.lightness, cfg.opacity)
        );
    }

    #[test]
    fn test_commit_mode_groups_by_commit() {
        let classification = classify(&sample_report(), &HighlightMode::Commit, &config());
        assert_eq!(
            lines_of(&classification, &GroupKey::Commit(sha('a'))),
            vec![1]
        );
        assert_eq!(
            lines_of(&classification, &GroupKey::Commit(sha('b'))),
            vec![2]
        );
        assert!(
            classification.groups.get(&GroupKey::Commit(UNCOMMITTED_SHA.to_string())).is_none(),
            "uncommitted lines must not form a commit group"
        );
    }

    #[test]
    fn test_specific_author_case_insensitive() {
        let mode = HighlightMode::SpecificAuthor { author: "alice".to_string() };
        let classification = classify(&sample_report(), &mode, &config());
        assert_eq!(
            lines_of(&classification, &GroupKey::Match("alice".to_string())),
            vec![1]
        );
    }

    #[test]
    fn test_specific_commit_prefix_match() {
        // Abbreviated id matches by prefix
        let mode = HighlightMode::SpecificCommit { commit: "bbbbbbb".to_string() };
        let classification = classify(&sample_report(), &mode, &config());
        assert_eq!(
            lines_of(&classification, &GroupKey::Match("bbbbbbb".to_string())),
            vec![2]
        );
    }

    #[test]
    fn test_specific_target_scans_uncommitted_lines() {
        let mode = HighlightMode::SpecificAuthor {
            author: "not committed yet".to_string(),
        };
        let classification = classify(&sample_report(), &mode, &config());
        assert_eq!(
            lines_of(&classification, &GroupKey::Match("not committed yet".to_string())),
            vec![3]
        );
    }

    #[test]
    fn test_specific_target_missing_parameter_is_empty() {
        for mode in [
            HighlightMode::SpecificAuthor { author: String::new() },
            HighlightMode::SpecificCommit { commit: String::new() },
        ] {
            let classification = classify(&sample_report(), &mode, &config());
            assert!(
                classification.groups.is_empty(),
                "absent target must classify as empty, not error"
            );
        }
    }

    #[test]
    fn test_specific_target_no_match_is_empty() {
        let mode = HighlightMode::SpecificAuthor { author: "Mallory".to_string() };
        let classification = classify(&sample_report(), &mode, &config());
        assert!(classification.groups.is_empty());
        assert!(classification.navigation.is_empty());
    }

    #[test]
    fn test_heatmap_mode_buckets_and_uncommitted() {
        let cfg = config();
        let classification = classify(&sample_report(), &HighlightMode::Heatmap, &cfg);

        // Bob (oldest) in the first bucket, Alice (newest) in the last
        assert_eq!(lines_of(&classification, &GroupKey::Bucket(0)), vec![2]);
        assert_eq!(
            lines_of(&classification, &GroupKey::Bucket(cfg.heatmap_bucket_count - 1)),
            vec![1]
        );
        assert_eq!(lines_of(&classification, &GroupKey::Uncommitted), vec![3]);
        assert_eq!(classification.navigation, vec![1, 2, 3]);

        let uncommitted = classification
            .groups
            .get(&GroupKey::Uncommitted)
            .expect("uncommitted group");
        assert_eq!(uncommitted.color, uncommitted_color(&cfg));
    }

    #[test]
    fn test_branch_diff_single_group() {
        let mode = HighlightMode::BranchDiff {
            added_lines: vec![7, 3, 7, 12],
        };
        let classification = classify(&sample_report(), &mode, &config());
        assert_eq!(
            lines_of(&classification, &GroupKey::Diff),
            vec![3, 7, 12],
            "externally supplied lines are sorted and de-duplicated"
        );
        assert_eq!(classification.navigation, vec![3, 7, 12]);
    }

    #[test]
    fn test_branch_diff_empty_set_is_empty() {
        let mode = HighlightMode::BranchDiff { added_lines: Vec::new() };
        let classification = classify(&sample_report(), &mode, &config());
        assert!(classification.groups.is_empty());
    }

    #[test]
    fn test_navigation_wraparound() {
        let mode = HighlightMode::BranchDiff {
            added_lines: vec![3, 7, 12],
        };
        let classification = classify(&sample_report(), &mode, &config());

        assert_eq!(classification.navigate_next(12), Some(3), "next wraps to first");
        assert_eq!(classification.navigate_previous(3), Some(12), "previous wraps to last");
        assert_eq!(classification.navigate_next(7), Some(12));
        assert_eq!(classification.navigate_previous(7), Some(3));
        // Positions between highlighted lines resolve to the nearest neighbor
        assert_eq!(classification.navigate_next(5), Some(7));
        assert_eq!(classification.navigate_previous(5), Some(3));
    }

    #[test]
    fn test_navigation_empty_sequence() {
        let classification = Classification::empty();
        assert_eq!(classification.navigate_next(1), None);
        assert_eq!(classification.navigate_previous(1), None);
    }

    #[test]
    fn test_mode_kind_names() {
        assert_eq!(HighlightMode::None.kind(), "none");
        assert_eq!(HighlightMode::Age { cutoff_ms: 0 }.kind(), "age");
        assert_eq!(HighlightMode::Heatmap.kind(), "heatmap");
        assert_eq!(
            HighlightMode::BranchDiff { added_lines: vec![] }.kind(),
            "branch_diff"
        );
    }

    #[test]
    fn test_end_to_end_age_scenario() {
        // Raw report in, classified age groups out: line 1 recent, line 2
        // too old, line 3 uncommitted and reported separately
        let report = sample_report();
        assert_eq!(report.line_count, 3);

        let mode = HighlightMode::Age { cutoff_ms: 1_600_000_000_000 };
        let classification = classify(&report, &mode, &config());

        let recent = lines_of(&classification, &GroupKey::Recent);
        assert!(recent.contains(&1));
        assert!(!recent.contains(&2));
        assert!(!recent.contains(&3));
        assert_eq!(lines_of(&classification, &GroupKey::Uncommitted), vec![3]);
    }
}
