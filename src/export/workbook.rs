use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};

use crate::config::{DailyLoanConfig, LoanConfig};
use crate::schedule::{DailySchedule, MonthlySchedule};
use crate::types::DealInfo;

use super::sheets;
use super::ExportError;

/// a named table of string cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, headers: &[&str]) -> Self {
        Self {
            name: name.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// value of the `Value` column for an inputs-style field
    pub fn field(&self, name: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.first().map(String::as_str) == Some(name))
            .and_then(|row| row.get(1))
            .map(String::as_str)
    }

    fn file_name(&self) -> String {
        format!("{}.csv", self.name.replace(' ', "_"))
    }
}

/// sheets ready to be written, named after the deal and run date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workbook {
    pub file_stem: String,
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Inputs and Schedule, followed by whichever input lists apply
    pub fn monthly(config: &LoanConfig, schedule: &MonthlySchedule, time_provider: &SafeTimeProvider) -> Self {
        let mut sheets = vec![
            sheets::monthly_inputs(config, schedule),
            sheets::monthly_schedule(schedule),
        ];
        sheets.extend(sheets::monthly_optional(config));

        Self {
            file_stem: file_stem(&config.deal, time_provider.now().date_naive()),
            sheets,
        }
    }

    pub fn daily(
        deal: &DealInfo,
        config: &DailyLoanConfig,
        schedule: &DailySchedule,
        time_provider: &SafeTimeProvider,
    ) -> Self {
        let mut sheets = vec![
            sheets::daily_inputs(deal, config, schedule),
            sheets::daily_schedule(schedule),
        ];
        sheets.extend(sheets::daily_optional(config));

        Self {
            file_stem: file_stem(deal, time_provider.now().date_naive()),
            sheets,
        }
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Write one csv file per sheet into `<dir>/<file_stem>/` and return that
    /// directory.
    pub fn write_csv_dir(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let target = dir.join(&self.file_stem);
        fs::create_dir_all(&target)?;

        for sheet in &self.sheets {
            let mut writer = csv::Writer::from_path(target.join(sheet.file_name()))?;
            writer.write_record(&sheet.headers)?;
            for row in &sheet.rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }

        tracing::info!(path = %target.display(), sheets = self.sheets.len(), "workbook written");
        Ok(target)
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// write the whole workbook as `<dir>/<file_stem>.json`
    pub fn write_json(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = dir.join(format!("{}.json", self.file_stem));
        fs::write(&path, self.to_json_pretty()?)?;

        tracing::info!(path = %path.display(), "workbook written");
        Ok(path)
    }
}

/// `<client>_<facility>_Amort_<YYYYMMDD>` with labels reduced to letters,
/// digits and underscores
pub fn file_stem(deal: &DealInfo, run_date: NaiveDate) -> String {
    format!(
        "{}_{}_Amort_{}",
        clean_label(&deal.client_name),
        clean_label(&deal.facility_name),
        run_date.format("%Y%m%d")
    )
}

fn clean_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '_')
        .collect::<String>()
        .replace(' ', "_")
}
