use crate::coordinator::constants::{RATE_LABEL, REPORT_WIDTH};
use crate::coordinator::measurement::MeasurementResult;
use crate::probe::{Direction, ScaledRate};
use colored::*;

/// Renders the connection speed report box
pub struct Reporter;

impl Reporter {
    fn border() -> String {
        "-".repeat(REPORT_WIDTH)
    }

    /// Format one data line, e.g. `|   - Download: 87.0  Mbps   |`
    ///
    /// The value is rounded to one decimal place and padded to five columns.
    fn format_rate_line(direction: Direction, rate: ScaledRate) -> String {
        let label = match direction {
            Direction::Download => "Download:",
            Direction::Upload => "Upload:  ",
        };
        format!("|   - {} {:<5.1} {}   |", label, rate.rounded(), RATE_LABEL)
    }

    /// Lines of the report; directions that were not measured are left out
    pub fn lines(result: &MeasurementResult) -> Vec<String> {
        let mut lines = vec![Self::border(), "|     CONNECTION SPEED       |".to_string()];
        for direction in [Direction::Download, Direction::Upload] {
            if let Some(rate) = result.get(direction) {
                lines.push(Self::format_rate_line(direction, rate));
            }
        }
        lines.push(Self::border());
        lines
    }

    /// Render the report as plain text, one line per row
    pub fn render(result: &MeasurementResult) -> String {
        let mut out = Self::lines(result).join("\n");
        out.push('\n');
        out
    }

    /// Render the report with a colored frame for terminal output
    pub fn render_styled(result: &MeasurementResult) -> String {
        let lines = Self::lines(result);
        let last = lines.len() - 1;
        let mut out = String::new();
        for (i, line) in lines.iter().enumerate() {
            let styled = if i == 0 || i == last {
                line.cyan().to_string()
            } else if i == 1 {
                line.bold().to_string()
            } else {
                line.to_string()
            };
            out.push_str(&styled);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(download: Option<f64>, upload: Option<f64>) -> MeasurementResult {
        let mut result = MeasurementResult::default();
        if let Some(rate) = download {
            result.record(Direction::Download, ScaledRate(rate));
        }
        if let Some(rate) = upload {
            result.record(Direction::Upload, ScaledRate(rate));
        }
        result
    }

    #[test]
    fn test_render_full_report() {
        let report = Reporter::render(&result(Some(87.3), Some(11.2)));
        let expected = "\
------------------------------
|     CONNECTION SPEED       |
|   - Download: 87.3  Mbps   |
|   - Upload:   11.2  Mbps   |
------------------------------
";
        assert_eq!(report, expected);
    }

    #[test]
    fn test_render_download_only() {
        let report = Reporter::render(&result(Some(512.04), None));
        assert!(report.contains("|   - Download: 512.0 Mbps   |"));
        assert!(!report.contains("Upload"));
        assert_eq!(report.lines().filter(|l| l.contains(RATE_LABEL)).count(), 1);
    }

    #[test]
    fn test_render_upload_only() {
        let report = Reporter::render(&result(None, Some(1.0)));
        assert!(report.contains("|   - Upload:   1.0   Mbps   |"));
        assert!(!report.contains("Download"));
    }

    #[test]
    fn test_rows_keep_box_width_for_short_values() {
        for line in Reporter::lines(&result(Some(87.3), Some(9.96))) {
            assert_eq!(line.chars().count(), REPORT_WIDTH, "{:?}", line);
        }
    }

    #[test]
    fn test_styled_report_keeps_content() {
        let styled = Reporter::render_styled(&result(Some(87.3), None));
        assert!(styled.contains("CONNECTION SPEED"));
        assert!(styled.contains("87.3"));
    }
}
