use std::path::PathBuf;

use colored::*;
use serde::Serialize;

/// Summary of one conversion, printed once the pipeline finishes.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub title: String,
    pub authors: Vec<String>,
    pub chapters: usize,
    pub images: usize,
    pub stylesheets: usize,
    pub unresolved_images: Vec<String>,
    pub output_bytes: Option<u64>,
    pub pages: Option<usize>,
}

impl Report {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Plain summary lines; `print` appends the coloured success line.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Converting: {}", self.input.display())];
        if let Some(output) = &self.output {
            lines.push(format!("Output: {}", output.display()));
        }
        lines.push(format!("Book title: {}", self.title));
        if !self.authors.is_empty() {
            lines.push(format!("Authors: {}", self.authors.join(", ")));
        }
        lines.push(format!("Chapters found: {}", self.chapters));
        lines.push(format!("Images found: {}", self.images));
        if !self.unresolved_images.is_empty() {
            lines.push(format!(
                "Unresolved image references: {}",
                self.unresolved_images.len()
            ));
        }
        lines
    }

    pub fn print(&self) {
        for line in self.lines() {
            println!("{}", line);
        }

        if let (Some(output), Some(bytes)) = (&self.output, self.output_bytes) {
            let pages = self
                .pages
                .map(|p| format!(", {} pages", p))
                .unwrap_or_default();
            println!(
                "{} PDF created: {} ({} bytes{})",
                "Success!".green().bold(),
                output.display().to_string().blue(),
                group_thousands(bytes),
                pages
            );
        }
    }
}

/// `1234567` -> `1,234,567`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> Report {
        Report {
            input: PathBuf::from("books/dune.epub"),
            output: Some(PathBuf::from("output/dune.pdf")),
            title: "Dune".into(),
            authors: vec!["Frank Herbert".into()],
            chapters: 48,
            images: 3,
            stylesheets: 1,
            unresolved_images: vec![],
            output_bytes: Some(1_234_567),
            pages: Some(612),
        }
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_lines() {
        let lines = report().lines();

        assert_eq!(
            lines,
            vec![
                "Converting: books/dune.epub",
                "Output: output/dune.pdf",
                "Book title: Dune",
                "Authors: Frank Herbert",
                "Chapters found: 48",
                "Images found: 3",
            ]
        );
    }

    #[test]
    fn test_lines_with_unresolved_images() {
        let mut r = report();
        r.output = None;
        r.unresolved_images = vec!["a.png".into(), "b.png".into()];

        let lines = r.lines();
        assert!(!lines.iter().any(|l| l.starts_with("Output:")));
        assert_eq!(lines.last().unwrap(), "Unresolved image references: 2");
    }

    #[test]
    fn test_json() {
        let value: serde_json::Value = serde_json::from_str(&report().to_json().unwrap()).unwrap();

        assert_eq!(value["title"], "Dune");
        assert_eq!(value["chapters"], 48);
        assert_eq!(value["images"], 3);
        assert_eq!(value["output_bytes"], 1_234_567);
        assert_eq!(value["pages"], 612);
    }
}
