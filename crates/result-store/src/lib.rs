// In crates/result-store/src/lib.rs

use analytics::{NamedSummary, RawTrade, RunSummary};
use app_config::DataSettings;
use core_types::Mode;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

pub mod error;
pub mod ping_log;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use ping_log::{ping_line, PingLog};
pub use types::{RawBar, ResultBundle, ResultName};

const SUMMARY_DIR: &str = "summary";
const RESULT_DIR: &str = "result";
const PROCESSED_DIR: &str = "processed";

/// Read-only access to the result files of one data directory.
///
/// Layout under the root:
/// * `summary/<name>.json`: the run summary
/// * `result/<name>.csv`: the trade list
/// * `processed/<symbol>_<timeframe>.csv`: the price series, optional
#[derive(Debug, Clone)]
pub struct ResultStore {
    root: PathBuf,
}

impl ResultStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Opens the store backing the given mode.
    pub fn for_mode(settings: &DataSettings, mode: Mode) -> Self {
        Self::new(settings.root_for(mode))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of all results that have a summary, sorted.
    pub async fn list_results(&self) -> Result<Vec<String>> {
        let dir = self.root.join(SUMMARY_DIR);
        let list_failed = |source| Error::ListFailed {
            path: dir.clone(),
            source,
        };

        let mut entries = tokio::fs::read_dir(&dir).await.map_err(list_failed)?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(list_failed)? {
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(stem) = file_name.strip_suffix(".json") {
                names.push(stem.to_string());
            }
        }
        names.sort();

        Ok(names)
    }

    /// Reads the summary of one result.
    pub async fn load_summary(&self, name: &ResultName) -> Result<RunSummary> {
        let path = self
            .root
            .join(SUMMARY_DIR)
            .join(format!("{}.json", name.as_str()));
        let text = read_existing(&path, name).await?;

        serde_json::from_str(&text).map_err(|source| Error::Json { path, source })
    }

    /// Reads the trade list of one result, in file order.
    pub async fn load_trades(&self, name: &ResultName) -> Result<Vec<RawTrade>> {
        let path = self
            .root
            .join(RESULT_DIR)
            .join(format!("{}.csv", name.as_str()));
        let text = read_existing(&path, name).await?;

        Ok(parse_csv_rows(&text, &path))
    }

    /// Reads the price series matching a result's symbol and timeframe.
    /// A result without one yields an empty series.
    pub async fn load_price_series(&self, name: &ResultName) -> Result<Vec<RawBar>> {
        let Some(stem) = name.price_series_stem() else {
            return Ok(Vec::new());
        };
        let path = self.root.join(PROCESSED_DIR).join(format!("{stem}.csv"));

        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(parse_csv_rows(&text, &path)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No price series for result.");
                Ok(Vec::new())
            }
            Err(source) => Err(Error::Io { path, source }),
        }
    }

    /// Reads the summary, trades and price series of one result.
    pub async fn load_result(&self, name: &ResultName) -> Result<ResultBundle> {
        let summary = self.load_summary(name).await?;
        let trades = self.load_trades(name).await?;
        let raw_data = self.load_price_series(name).await?;

        tracing::debug!(
            name = name.as_str(),
            trades = trades.len(),
            bars = raw_data.len(),
            "Loaded result."
        );

        Ok(ResultBundle {
            name: name.as_str().to_string(),
            summary,
            trades,
            raw_data,
        })
    }

    /// Reads every summary in the store. Unreadable summaries are skipped.
    pub async fn load_all_summaries(&self) -> Result<Vec<NamedSummary>> {
        let mut summaries = Vec::new();
        for name in self.list_results().await? {
            let parsed = match ResultName::parse(&name) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping summary with an unusable name.");
                    continue;
                }
            };
            match self.load_summary(&parsed).await {
                Ok(summary) => summaries.push(NamedSummary { name, summary }),
                Err(e) => tracing::warn!(name = %name, error = ?e, "Skipping unreadable summary."),
            }
        }
        Ok(summaries)
    }
}

/// Reads a file that must exist for `name` to be a known result.
async fn read_existing(path: &Path, name: &ResultName) -> Result<String> {
    tokio::fs::read_to_string(path).await.map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(name.as_str().to_string())
        } else {
            Error::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Parses a CSV document with a header row. Rows that cannot be read are
/// logged and skipped so the rest of the file is still usable.
fn parse_csv_rows<T: DeserializeOwned>(text: &str, path: &Path) -> Vec<T> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.trim().as_bytes());

    let mut rows = Vec::new();
    for (index, record) in reader.deserialize::<T>().enumerate() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) => tracing::warn!(
                path = %path.display(),
                row = index + 1,
                error = %e,
                "Skipping unreadable CSV row."
            ),
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const TRADES_CSV: &str = "\
entry_step,exit_step,entry_date,exit_date,entry_price,exit_price,quantity,type,stop_loss,exit_reason,net_profit_loss,net_profit_loss_pct
3,9,2024-01-02 00:00:00,2024-01-05 00:00:00,42000.0,43000.0,0.5,buy,41000.0,take_profit,480.25,2.28
12,15,2024-01-08 00:00:00,2024-01-10 00:00:00,44000.0,44500.0,0.4,sell,45000.0,stop_loss,-210.5,-1.19
";

    fn seed(root: &Path) {
        for dir in [SUMMARY_DIR, RESULT_DIR, PROCESSED_DIR] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        fs::write(
            root.join("summary/BTC-USDT_1d_2024.json"),
            r#"{"initial_capital": 100000, "net_profit": 269.75, "total_trades": 2}"#,
        )
        .unwrap();
        fs::write(
            root.join("summary/ETH-USDT_4h_2024.json"),
            r#"{"initial_capital": 100000, "net_profit": -50, "total_trades": 1}"#,
        )
        .unwrap();
        fs::write(root.join("summary/notes.txt"), "ignored").unwrap();
        fs::write(root.join("result/BTC-USDT_1d_2024.csv"), TRADES_CSV).unwrap();
        fs::write(
            root.join("processed/btcusdt_1d.csv"),
            "timestamp,open,high,low,close,volume\n1704153600000,42000,42500,41800,42300,12.5\n",
        )
        .unwrap();
    }

    #[tokio::test]
    async fn lists_summary_stems_in_order() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        let store = ResultStore::new(dir.path());

        let names = store.list_results().await.unwrap();
        assert_eq!(names, vec!["BTC-USDT_1d_2024", "ETH-USDT_4h_2024"]);
    }

    #[tokio::test]
    async fn listing_a_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path().join("nowhere"));
        assert!(matches!(
            store.list_results().await,
            Err(Error::ListFailed { .. })
        ));
    }

    #[tokio::test]
    async fn loads_a_full_result() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        let store = ResultStore::new(dir.path());
        let name = ResultName::parse("BTC-USDT_1d_2024").unwrap();

        let bundle = store.load_result(&name).await.unwrap();
        assert_eq!(bundle.summary.get("net_profit"), 269.75);
        assert_eq!(bundle.trades.len(), 2);
        assert_eq!(bundle.trades[0].trade_type, "buy");
        assert_eq!(bundle.trades[1].net_profit_loss, "-210.5");
        assert_eq!(bundle.trades[1].exit_reason, "stop_loss");
        assert_eq!(bundle.raw_data.len(), 1);
        assert_eq!(bundle.raw_data[0].timestamp, "1704153600000");
        assert_eq!(bundle.raw_data[0].close, "42300");
    }

    #[tokio::test]
    async fn missing_trades_file_means_not_found() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        let store = ResultStore::new(dir.path());
        let name = ResultName::parse("ETH-USDT_4h_2024").unwrap();

        let err = store.load_result(&name).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn absent_price_file_gives_an_empty_series() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        fs::write(dir.path().join("result/ETH-USDT_4h_2024.csv"), TRADES_CSV).unwrap();
        let store = ResultStore::new(dir.path());
        let name = ResultName::parse("ETH-USDT_4h_2024").unwrap();

        let bundle = store.load_result(&name).await.unwrap();
        assert!(bundle.raw_data.is_empty());
        assert_eq!(bundle.trades.len(), 2);
    }

    #[tokio::test]
    async fn load_all_summaries_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        fs::write(dir.path().join("summary/broken.json"), "{ not json").unwrap();
        let store = ResultStore::new(dir.path());

        let summaries = store.load_all_summaries().await.unwrap();
        let names: Vec<_> = summaries.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["BTC-USDT_1d_2024", "ETH-USDT_4h_2024"]);
        assert_eq!(summaries[1].summary.get("net_profit"), -50.0);
    }

    #[test]
    fn csv_rows_tolerate_missing_columns() {
        let rows: Vec<RawTrade> = parse_csv_rows(
            "type,exit_date,net_profit_loss\nbuy,2024-01-01,12.5\n",
            Path::new("inline.csv"),
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].net_profit_loss, "12.5");
        assert_eq!(rows[0].entry_price, "");
    }
}
