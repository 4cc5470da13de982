use serde::{Deserialize, Serialize};
use std::fmt;

/// 車型與製造商的對應
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModelCompany {
    pub name: String,
    pub company: String,
}

/// 類別檔案的原始格式 (gencat 產出)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryFile {
    #[serde(default)]
    pub company: Vec<String>,
    #[serde(default)]
    pub model: Vec<String>,
    #[serde(default)]
    pub fuel_type: Vec<String>,
    #[serde(default)]
    pub model_company: Vec<ModelCompany>,
}

/// 正規化後、唯讀的合法類別值
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorySet {
    pub companies: Vec<String>,
    pub model_names: Vec<String>,
    pub fuel_types: Vec<String>,
    pub model_company_pairs: Vec<ModelCompany>,
}

impl CategorySet {
    pub fn is_empty(&self) -> bool {
        self.companies.is_empty() && self.model_names.is_empty() && self.fuel_types.is_empty()
    }

    pub fn valid_values(&self, field: CategoryField) -> &[String] {
        match field {
            CategoryField::Company => &self.companies,
            CategoryField::Model => &self.model_names,
            CategoryField::FuelType => &self.fuel_types,
        }
    }
}

/// 需要對照類別檔驗證的欄位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryField {
    Company,
    Model,
    FuelType,
}

impl CategoryField {
    /// 驗證管線的固定順序
    pub const ALL: [CategoryField; 3] = [
        CategoryField::Company,
        CategoryField::Model,
        CategoryField::FuelType,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "company" => Some(CategoryField::Company),
            "name" | "model" => Some(CategoryField::Model),
            "fuel_type" => Some(CategoryField::FuelType),
            _ => None,
        }
    }

    /// 請求中的欄位名稱
    pub fn request_name(&self) -> &'static str {
        match self {
            CategoryField::Company => "company",
            CategoryField::Model => "name",
            CategoryField::FuelType => "fuel_type",
        }
    }
}

impl fmt::Display for CategoryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.request_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub company: String,
    pub name: String,
    pub year: i64,
    pub kms_driven: i64,
    pub fuel_type: String,
}

impl PredictionRequest {
    pub fn category_value(&self, field: CategoryField) -> &str {
        match field {
            CategoryField::Company => &self.company,
            CategoryField::Model => &self.name,
            CategoryField::FuelType => &self.fuel_type,
        }
    }

    pub fn set_category_value(&mut self, field: CategoryField, value: String) {
        match field {
            CategoryField::Company => self.company = value,
            CategoryField::Model => self.name = value,
            CategoryField::FuelType => self.fuel_type = value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_price: f64,
    pub status: String,
    pub message: String,
}

impl PredictionResult {
    pub fn success(predicted_price: f64) -> Self {
        Self {
            predicted_price,
            status: "success".to_string(),
            message: "Prediction successful".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue<'a> {
    Text(&'a str),
    Number(f64),
}

/// 模型的單列輸入, 欄位與訓練資料一致
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub company: String,
    pub name: String,
    pub year: i64,
    pub kms_driven: i64,
    pub fuel_type: String,
}

impl FeatureRow {
    pub const COLUMNS: [&'static str; 5] = ["company", "name", "year", "kms_driven", "fuel_type"];

    pub fn value(&self, column: &str) -> Option<FeatureValue<'_>> {
        match column {
            "company" => Some(FeatureValue::Text(&self.company)),
            "name" => Some(FeatureValue::Text(&self.name)),
            "year" => Some(FeatureValue::Number(self.year as f64)),
            "kms_driven" => Some(FeatureValue::Number(self.kms_driven as f64)),
            "fuel_type" => Some(FeatureValue::Text(&self.fuel_type)),
            _ => None,
        }
    }
}

impl From<PredictionRequest> for FeatureRow {
    fn from(request: PredictionRequest) -> Self {
        Self {
            company: request.company,
            name: request.name,
            year: request.year,
            kms_driven: request.kms_driven,
            fuel_type: request.fuel_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_field_names() {
        assert_eq!(CategoryField::from_name("model"), Some(CategoryField::Model));
        assert_eq!(CategoryField::from_name("name"), Some(CategoryField::Model));
        assert_eq!(CategoryField::from_name("colour"), None);
        assert_eq!(CategoryField::FuelType.to_string(), "fuel_type");
    }

    #[test]
    fn test_feature_row_follows_training_columns() {
        let row = FeatureRow {
            company: "Hyundai".to_string(),
            name: "Hyundai Creta".to_string(),
            year: 2019,
            kms_driven: 35000,
            fuel_type: "Petrol".to_string(),
        };
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(
            json,
            r#"{"company":"Hyundai","name":"Hyundai Creta","year":2019,"kms_driven":35000,"fuel_type":"Petrol"}"#
        );
        assert_eq!(row.value("year"), Some(FeatureValue::Number(2019.0)));
        assert_eq!(row.value("price"), None);
    }
}
