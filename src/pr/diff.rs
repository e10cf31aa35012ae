/// Line and file counts for a unified diff, shown to the user before the
/// diff is sent off. The diff itself is never modified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub files: usize,
    pub additions: usize,
    pub deletions: usize,
}

/// Count files and changed lines in the raw text from GitHub's diff endpoint.
///
/// Each file section starts with `diff --git a/{path} b/{path}`. The
/// `--- a/...` / `+++ b/...` headers that follow are not changes; only lines
/// inside a hunk (after an `@@` header) are counted.
pub fn summarize(raw_diff: &str) -> DiffStats {
    let mut stats = DiffStats::default();
    let mut in_hunk = false;

    for line in raw_diff.lines() {
        if line.starts_with("diff --git ") {
            stats.files += 1;
            in_hunk = false;
        } else if line.starts_with("@@") {
            in_hunk = true;
        } else if in_hunk {
            if line.starts_with('+') {
                stats.additions += 1;
            } else if line.starts_with('-') {
                stats.deletions += 1;
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
diff --git a/src/lib.rs b/src/lib.rs
index 1111111..2222222 100644
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1,3 +1,4 @@
 use std::io;
-fn old() {}
+fn new() {}
+fn newer() {}
diff --git a/README.md b/README.md
new file mode 100644
--- /dev/null
+++ b/README.md
@@ -0,0 +1 @@
+# Widget
";

    #[test]
    fn test_summarize_counts_files_and_lines() {
        let stats = summarize(SAMPLE);
        assert_eq!(
            stats,
            DiffStats {
                files: 2,
                additions: 3,
                deletions: 1,
            }
        );
    }

    #[test]
    fn test_summarize_ignores_file_headers() {
        let stats = summarize("diff --git a/x b/x\n--- a/x\n+++ b/x\n");
        assert_eq!(stats.files, 1);
        assert_eq!(stats.additions, 0);
        assert_eq!(stats.deletions, 0);
    }

    #[test]
    fn test_summarize_empty() {
        assert_eq!(summarize(""), DiffStats::default());
    }

    #[test]
    fn test_summarize_headerless_fragment() {
        // No file header, no hunk header: nothing is counted as a change.
        assert_eq!(summarize("+foo").additions, 0);
    }
}
