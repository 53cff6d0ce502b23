use std::fmt;

/// Static result files the service publishes for completed jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultArtifact {
    ResultsJson,
    ReportPdf,
}

impl ResultArtifact {
    pub fn file_name(&self) -> &'static str {
        match self {
            ResultArtifact::ResultsJson => "results.json",
            ResultArtifact::ReportPdf => "report.pdf",
        }
    }
}

impl fmt::Display for ResultArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}
