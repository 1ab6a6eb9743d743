use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output: PathBuf,
    pub pages_fetched: usize,
    pub articles_seen: usize,
    pub records_skipped: usize,
    pub duplicates: usize,
    pub urls_written: usize,
}

impl RunSummary {
    pub fn console_line(&self) -> String {
        format!(
            "Wrote {} with {} URLs.",
            self.output.display(),
            self.urls_written
        )
    }
}
