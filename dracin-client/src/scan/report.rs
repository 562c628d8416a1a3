use dracin_model::{CurrentReport, ScanTotals, SummaryReport};

use super::Phase;

/// The two report panels. Both may hold data, but only one is meaningful
/// for a given phase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportBoard {
    /// Last `GET /scan/report/current` reply.
    pub current: Option<CurrentReport>,
    /// Last `GET /scan/report/summary` reply.
    pub summary: Option<SummaryReport>,
}

/// The report that reflects the scan as currently believed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AuthoritativeReport<'a> {
    /// Live progress of a running scan.
    Current(&'a CurrentReport),
    /// Outcome of the last finished scan.
    Summary(&'a SummaryReport),
}

impl AuthoritativeReport<'_> {
    /// Headline counters of whichever report this is.
    pub fn totals(&self) -> ScanTotals {
        match self {
            AuthoritativeReport::Current(report) => report.totals,
            AuthoritativeReport::Summary(report) => report.totals,
        }
    }
}

impl ReportBoard {
    /// Current report while running, summary report while idle. `None` when
    /// the relevant report has not been fetched yet.
    pub fn authoritative(&self, phase: Phase) -> Option<AuthoritativeReport<'_>> {
        match phase {
            Phase::Running => {
                self.current.as_ref().map(AuthoritativeReport::Current)
            }
            Phase::Idle => self.summary.as_ref().map(AuthoritativeReport::Summary),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_selects_the_report() {
        let board = ReportBoard {
            current: Some(CurrentReport {
                totals: ScanTotals {
                    series_total: 1,
                    ..Default::default()
                },
                ..Default::default()
            }),
            summary: Some(SummaryReport {
                totals: ScanTotals {
                    series_total: 10,
                    episodes_total: 40,
                    tags_total: 5,
                },
                storage_total_size: Some(123_456_789),
                ..Default::default()
            }),
        };

        assert!(matches!(
            board.authoritative(Phase::Running),
            Some(AuthoritativeReport::Current(_))
        ));
        let idle = board.authoritative(Phase::Idle).unwrap();
        assert_eq!(idle.totals().episodes_total, 40);
    }

    #[test]
    fn stale_panel_is_not_authoritative() {
        let board = ReportBoard {
            current: Some(CurrentReport::default()),
            summary: None,
        };
        assert_eq!(board.authoritative(Phase::Idle), None);
    }
}
