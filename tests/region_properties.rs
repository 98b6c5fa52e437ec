//! Property tests: line-scoped rules never touch fenced code.

use adoc_tidy::rewrite::{prose_pass, CodeRegions, ProseOptions};
use proptest::prelude::*;

const ALL: ProseOptions = ProseOptions {
    list_spacing: true,
    math: true,
};

fn code_line() -> impl Strategy<Value = String> {
    "[ a-z0-9$`*=+_]{0,40}"
}

fn prose_line() -> impl Strategy<Value = String> {
    "[ a-z0-9$*]{0,40}"
}

proptest! {
    #[test]
    fn test_code_lines_survive_prose_pass(
        before in prop::collection::vec(prose_line(), 0..5),
        code in prop::collection::vec(code_line(), 1..8),
        after in prop::collection::vec(prose_line(), 0..5),
    ) {
        let mut lines: Vec<String> = vec!["[source]".to_string()];
        lines.extend(before.iter().cloned());
        lines.push("----".to_string());
        lines.extend(code.iter().cloned());
        lines.push("----".to_string());
        lines.extend(after.iter().cloned());
        let text = format!("{}\n", lines.join("\n"));

        let (out, _) = prose_pass(&text, ALL);
        let out_lines: Vec<&str> = out.lines().collect();

        // Nothing above the fence can grow: no admonition delimiter is open.
        let start = 1 + before.len() + 1;
        let expected: Vec<&str> = code.iter().map(String::as_str).collect();
        prop_assert_eq!(&out_lines[start..start + code.len()], expected.as_slice());
    }

    #[test]
    fn test_detected_spans_cover_only_code(
        code in prop::collection::vec(code_line(), 0..8),
        after in prop::collection::vec(prose_line(), 0..5),
    ) {
        let mut lines: Vec<String> = vec!["intro".to_string(), "----".to_string()];
        lines.extend(code.iter().cloned());
        lines.push("----".to_string());
        lines.extend(after.iter().cloned());
        let text = lines.join("\n");

        let regions = CodeRegions::detect(&text);
        prop_assert_eq!(regions.spans(), &[2..2 + code.len()]);
        for idx in 0..lines.len() {
            prop_assert_eq!(regions.contains(idx), (2..2 + code.len()).contains(&idx));
        }
    }

    #[test]
    fn test_prose_pass_is_idempotent_without_math(
        body in prop::collection::vec(prose_line(), 0..10),
    ) {
        let options = ProseOptions { list_spacing: true, math: false };
        let mut lines = vec!["====".to_string()];
        lines.extend(body.iter().map(|line| format!("  * {line}")));
        lines.push("====".to_string());
        let text = lines.join("\n");

        let (once, _) = prose_pass(&text, options);
        let (twice, counts) = prose_pass(&once, options);
        prop_assert_eq!(once, twice);
        prop_assert_eq!(counts.list_spacing, 0);
    }
}
