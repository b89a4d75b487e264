use calamine::{open_workbook_from_rs, Reader, Xlsx};
use serde::de::DeserializeOwned;
use std::io::Cursor;
use thiserror::Error;

use crate::model::{PricingRecord, RentalRecord};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed csv in {name}: {source}")]
    Csv {
        name: String,
        #[source]
        source: csv::Error,
    },
    #[error("malformed xlsx in {name}: {source}")]
    Xlsx {
        name: String,
        #[source]
        source: calamine::XlsxError,
    },
    #[error("{0} has no worksheet")]
    NoWorksheet(String),
    #[error("pricing table is empty")]
    EmptyPricing,
    #[error("mean rental price is not a positive number ({0})")]
    BadMeanPrice(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Xlsx,
}

impl TableFormat {
    /// Picked from the extension of the source, ignoring any query string.
    pub fn detect(source: &str) -> Self {
        let path = source.split(['?', '#']).next().unwrap_or(source);
        if path.to_ascii_lowercase().ends_with(".xlsx") {
            TableFormat::Xlsx
        } else {
            TableFormat::Csv
        }
    }
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Raw bytes of a source: an `http(s)://` URL or a local path.
pub async fn fetch(client: &reqwest::Client, source: &str) -> Result<Vec<u8>, LoadError> {
    if is_remote(source) {
        let http_err = |e| LoadError::Http { url: source.to_string(), source: e };
        tracing::info!(url = source, "fetching table");
        let resp = client
            .get(source)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http_err)?;
        let bytes = resp.bytes().await.map_err(http_err)?;
        Ok(bytes.to_vec())
    } else {
        tracing::info!(path = source, "reading table");
        tokio::fs::read(source).await.map_err(|e| LoadError::Io {
            path: source.to_string(),
            source: e,
        })
    }
}

pub fn parse_csv<T: DeserializeOwned>(name: &str, bytes: &[u8]) -> Result<Vec<T>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);
    rdr.deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| LoadError::Csv { name: name.to_string(), source: e })
}

/// First worksheet, first row as header. Cells go through their text form so
/// both formats share one deserialization path.
pub fn parse_xlsx<T: DeserializeOwned>(name: &str, bytes: Vec<u8>) -> Result<Vec<T>, LoadError> {
    let xlsx_err = |e| LoadError::Xlsx { name: name.to_string(), source: e };
    let mut wb: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).map_err(xlsx_err)?;
    let range = wb
        .worksheet_range_at(0)
        .ok_or_else(|| LoadError::NoWorksheet(name.to_string()))?
        .map_err(xlsx_err)?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: csv::StringRecord = header.iter().map(|c| c.to_string()).collect();

    rows.map(|row| {
        let record: csv::StringRecord = row.iter().map(|c| c.to_string().trim().to_string()).collect();
        record
            .deserialize::<T>(Some(&headers))
            .map_err(|e| LoadError::Csv { name: name.to_string(), source: e })
    })
    .collect()
}

pub fn parse_table<T: DeserializeOwned>(source: &str, bytes: Vec<u8>) -> Result<Vec<T>, LoadError> {
    match TableFormat::detect(source) {
        TableFormat::Csv => parse_csv(source, &bytes),
        TableFormat::Xlsx => parse_xlsx(source, bytes),
    }
}

pub async fn load_rentals(
    client: &reqwest::Client,
    source: &str,
) -> Result<Vec<RentalRecord>, LoadError> {
    let bytes = fetch(client, source).await?;
    let rows: Vec<RentalRecord> = parse_table(source, bytes)?;
    tracing::info!(rows = rows.len(), "rentals loaded");
    Ok(rows)
}

pub async fn load_pricing(
    client: &reqwest::Client,
    source: &str,
) -> Result<Vec<PricingRecord>, LoadError> {
    let bytes = fetch(client, source).await?;
    let rows: Vec<PricingRecord> = parse_table(source, bytes)?;
    tracing::info!(rows = rows.len(), "pricing loaded");
    Ok(rows)
}

/// The only figure of the pricing table the analysis consumes.
pub fn mean_price_per_day(pricing: &[PricingRecord]) -> Result<f64, LoadError> {
    if pricing.is_empty() {
        return Err(LoadError::EmptyPricing);
    }
    let mean = pricing.iter().map(|p| p.rental_price_per_day).sum::<f64>() / pricing.len() as f64;
    if !mean.is_finite() || mean <= 0.0 {
        return Err(LoadError::BadMeanPrice(mean));
    }
    Ok(mean)
}
