//! 由清理後的訓練資料 CSV 產生類別檔 (`unique_categories.json`)。

use crate::domain::model::{CategoryFile, ModelCompany};
use crate::utils::error::Result;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CarRow {
    company: String,
    name: String,
    fuel_type: String,
}

pub fn extract_categories<R: Read>(reader: R) -> Result<CategoryFile> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut companies = BTreeSet::new();
    let mut models = BTreeSet::new();
    let mut fuel_types = BTreeSet::new();
    // (company, name) 排序
    let mut pairs = BTreeSet::new();
    let mut rows = 0usize;

    for record in csv_reader.deserialize() {
        let row: CarRow = record?;
        rows += 1;

        let company = row.company.trim().to_string();
        let name = row.name.trim().to_string();
        let fuel_type = row.fuel_type.trim().to_string();

        if !company.is_empty() && !name.is_empty() {
            pairs.insert((company.clone(), name.clone()));
        }
        if !company.is_empty() {
            companies.insert(company);
        }
        if !name.is_empty() {
            models.insert(name);
        }
        if !fuel_type.is_empty() {
            fuel_types.insert(fuel_type);
        }
    }

    tracing::info!(
        "Scanned {} rows: {} companies, {} models, {} fuel types",
        rows,
        companies.len(),
        models.len(),
        fuel_types.len()
    );

    Ok(CategoryFile {
        company: companies.into_iter().collect(),
        model: models.into_iter().collect(),
        fuel_type: fuel_types.into_iter().collect(),
        model_company: pairs
            .into_iter()
            .map(|(company, name)| ModelCompany { name, company })
            .collect(),
    })
}

pub fn extract_categories_from_path<P: AsRef<Path>>(path: P) -> Result<CategoryFile> {
    let file = std::fs::File::open(path)?;
    extract_categories(file)
}

pub fn write_categories<P: AsRef<Path>>(categories: &CategoryFile, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(categories)?;
    std::fs::write(path, json)?;
    Ok(())
}
