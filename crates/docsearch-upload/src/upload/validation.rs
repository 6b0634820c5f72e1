//! Extension allow-list checks.

/// Case-insensitive suffix match of `filename` against `allowed`.
///
/// `allowed` entries are expected normalized (lowercase, leading dot), as
/// the config loader leaves them.
pub fn has_allowed_extension(filename: &str, allowed: &[String]) -> bool {
    let lower = filename.trim().to_lowercase();
    allowed.iter().any(|ext| lower.ends_with(ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_allowed_extension_table() {
        let pdf_only = exts(&[".pdf"]);
        let spreadsheet = exts(&[".pdf", ".xlsx", ".xlsm", ".xltx", ".xltm", ".csv"]);

        let cases: &[(&str, &[String], bool)] = &[
            ("report.pdf", pdf_only.as_slice(), true),
            ("REPORT.PDF", pdf_only.as_slice(), true),
            ("scan.Pdf", pdf_only.as_slice(), true),
            ("notes.txt", pdf_only.as_slice(), false),
            ("archive.pdf.zip", pdf_only.as_slice(), false),
            ("pdf", pdf_only.as_slice(), false),
            ("budget.xlsx", pdf_only.as_slice(), false),
            ("budget.xlsx", spreadsheet.as_slice(), true),
            ("macro.XLSM", spreadsheet.as_slice(), true),
            ("template.xltm", spreadsheet.as_slice(), true),
            ("export.csv", spreadsheet.as_slice(), true),
            ("legacy.xls", spreadsheet.as_slice(), false),
        ];

        for (filename, allowed, expected) in cases {
            assert_eq!(
                has_allowed_extension(filename, allowed),
                *expected,
                "filename: {}",
                filename
            );
        }
    }
}
