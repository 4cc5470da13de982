//! 類別快取: 啟動時讀取一次類別檔, 之後只在記憶體中查詢。
//!
//! 檔案不存在時回傳空集合 (驗證變為放行), 且不快取這個結果,
//! 之後部署的檔案仍可被讀到。檔案存在但讀取或解析失敗時, 只回報一次錯誤,
//! 之後固定視為空集合。無論成功或失敗都不再重新讀取。

use crate::domain::model::{CategoryField, CategoryFile, CategorySet, ModelCompany};
use crate::utils::error::{Result, ServiceError};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

pub struct CategoryStore {
    path: PathBuf,
    cache: OnceLock<Arc<CategorySet>>,
    init_lock: Mutex<()>,
}

impl CategoryStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cache: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    /// 直接以現成的集合建立 (嵌入或測試用)
    pub fn preloaded(set: CategorySet) -> Self {
        let store = Self::new("");
        let _ = store.cache.set(Arc::new(set));
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Arc<CategorySet>> {
        if let Some(set) = self.cache.get() {
            return Ok(Arc::clone(set));
        }

        let _guard = self.init_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(set) = self.cache.get() {
            return Ok(Arc::clone(set));
        }

        if !self.path.exists() {
            tracing::debug!(
                "Category file {} not found, category validation disabled",
                self.path.display()
            );
            return Ok(Arc::new(CategorySet::default()));
        }

        let set = match self.read_file() {
            Ok(set) => set,
            Err(e) => {
                // 解析失敗視為終態, 需重新部署才會生效
                let _ = self.cache.set(Arc::new(CategorySet::default()));
                return Err(e);
            }
        };

        tracing::info!(
            "📚 Loaded categories from {}: {} companies, {} models, {} fuel types",
            self.path.display(),
            set.companies.len(),
            set.model_names.len(),
            set.fuel_types.len()
        );

        Ok(Arc::clone(self.cache.get_or_init(|| Arc::new(set))))
    }

    fn read_file(&self) -> Result<CategorySet> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| ServiceError::CategoryFile {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;
        let file: CategoryFile =
            serde_json::from_str(&content).map_err(|e| ServiceError::CategoryFile {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(CategorySet::from(file))
    }

    /// 載入失敗時視為空集合
    pub fn current(&self) -> Arc<CategorySet> {
        match self.load() {
            Ok(set) => set,
            Err(e) => {
                tracing::warn!("Category store unavailable: {}", e);
                Arc::new(CategorySet::default())
            }
        }
    }

    pub fn valid_values(&self, field: CategoryField) -> &[String] {
        if let Err(e) = self.load() {
            tracing::warn!("Category store unavailable: {}", e);
        }
        self.cache
            .get()
            .map(|set| set.valid_values(field))
            .unwrap_or(&[])
    }

    pub fn valid_values_by_name(&self, field_name: &str) -> &[String] {
        match CategoryField::from_name(field_name) {
            Some(field) => self.valid_values(field),
            None => &[],
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.get().is_some_and(|set| !set.is_empty())
    }
}

fn normalize_values(values: Vec<String>) -> Vec<String> {
    let mut values: Vec<String> = values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    values.sort();
    values.dedup();
    values
}

/// 由車型名稱推測製造商 (類別檔缺少 model_company 時)
fn derive_pairs(companies: &[String], model_names: &[String]) -> Vec<ModelCompany> {
    let lowered: Vec<(String, &String)> = companies
        .iter()
        .map(|c| (c.to_lowercase(), c))
        .collect();

    let mut pairs = Vec::new();
    for name in model_names {
        let name_lower = name.to_lowercase();
        match lowered.iter().find(|(c, _)| name_lower.contains(c.as_str())) {
            Some((_, company)) => pairs.push(ModelCompany {
                name: name.clone(),
                company: (*company).clone(),
            }),
            None => tracing::debug!("No company matches model '{}', skipping pair", name),
        }
    }
    pairs
}

impl From<CategoryFile> for CategorySet {
    fn from(file: CategoryFile) -> Self {
        let companies = normalize_values(file.company);
        let model_names = normalize_values(file.model);
        let fuel_types = normalize_values(file.fuel_type);

        let mut pairs = if file.model_company.is_empty() {
            derive_pairs(&companies, &model_names)
        } else {
            let company_set: HashSet<&str> = companies.iter().map(String::as_str).collect();
            let model_set: HashSet<&str> = model_names.iter().map(String::as_str).collect();

            file.model_company
                .into_iter()
                .map(|pair| ModelCompany {
                    name: pair.name.trim().to_string(),
                    company: pair.company.trim().to_string(),
                })
                .filter(|pair| {
                    let known = company_set.contains(pair.company.as_str())
                        && model_set.contains(pair.name.as_str());
                    if !known {
                        tracing::warn!(
                            "Dropping model/company pair ({}, {}) not present in category lists",
                            pair.name,
                            pair.company
                        );
                    }
                    known
                })
                .collect()
        };

        pairs.sort_by(|a, b| (&a.company, &a.name).cmp(&(&b.company, &b.name)));
        let mut seen = HashSet::new();
        pairs.retain(|pair| seen.insert(pair.name.clone()));

        Self {
            companies,
            model_names,
            fuel_types,
            model_company_pairs: pairs,
        }
    }
}
