//! 模型檔格式與推論。
//!
//! 模型檔是以 `kind` 區分的 JSON 文件:
//! - `one_hot_linear`: 類別欄位 one-hot 後的線性迴歸
//! - `tree_ensemble`: 梯度提升迴歸樹, 預測值為 `base_score + Σ tree(row)`
//!
//! 遇到模型不認得的類別值時回傳 `ServiceError::Prediction`。

use crate::domain::model::{FeatureRow, FeatureValue};
use crate::domain::ports::Regressor;
use crate::utils::error::{Result, ServiceError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetTransform {
    #[default]
    Identity,
    /// 模型輸出為 ln(price)
    Log,
}

impl TargetTransform {
    fn apply(&self, raw: f64) -> f64 {
        match self {
            TargetTransform::Identity => raw,
            TargetTransform::Log => raw.exp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotLinearModel {
    pub intercept: f64,
    /// 數值欄位係數
    #[serde(default)]
    pub coefficients: HashMap<String, f64>,
    /// 類別欄位 -> (類別值 -> 權重)
    #[serde(default)]
    pub categories: HashMap<String, HashMap<String, f64>>,
    #[serde(default)]
    pub target: TargetTransform,
}

impl OneHotLinearModel {
    fn columns(&self) -> impl Iterator<Item = &String> {
        self.coefficients.keys().chain(self.categories.keys())
    }

    fn raw_predict(&self, row: &FeatureRow) -> Result<f64> {
        let mut total = self.intercept;

        for column in FeatureRow::COLUMNS {
            match row.value(column) {
                Some(FeatureValue::Number(x)) => {
                    if let Some(coef) = self.coefficients.get(column) {
                        total += coef * x;
                    }
                }
                Some(FeatureValue::Text(value)) => {
                    if let Some(weights) = self.categories.get(column) {
                        total += weights.get(value).copied().ok_or_else(|| {
                            ServiceError::prediction(format!(
                                "Found unknown category '{}' in column '{}' during transform",
                                value, column
                            ))
                        })?;
                    }
                }
                None => {}
            }
        }

        Ok(total)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitCondition {
    /// value <= threshold 走左子樹
    Threshold(f64),
    /// value == category 走左子樹
    Category(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitNode {
    pub column: String,
    pub split: SplitCondition,
    pub left: Box<TreeNode>,
    pub right: Box<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Node(SplitNode),
    Leaf { value: f64 },
}

impl TreeNode {
    fn evaluate(&self, row: &FeatureRow) -> Result<f64> {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { value } => return Ok(*value),
                TreeNode::Node(split) => {
                    let goes_left = match (row.value(&split.column), &split.split) {
                        (Some(FeatureValue::Number(x)), SplitCondition::Threshold(t)) => x <= *t,
                        (Some(FeatureValue::Text(v)), SplitCondition::Category(c)) => v == c,
                        (Some(_), _) => {
                            return Err(ServiceError::prediction(format!(
                                "Split on column '{}' does not match its feature type",
                                split.column
                            )))
                        }
                        (None, _) => {
                            return Err(ServiceError::prediction(format!(
                                "Tree references unknown column '{}'",
                                split.column
                            )))
                        }
                    };
                    node = if goes_left {
                        split.left.as_ref()
                    } else {
                        split.right.as_ref()
                    };
                }
            }
        }
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let TreeNode::Node(split) = self {
            out.push(&split.column);
            split.left.collect_columns(out);
            split.right.collect_columns(out);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsembleModel {
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<TreeNode>,
    #[serde(default)]
    pub target: TargetTransform,
}

impl TreeEnsembleModel {
    fn raw_predict(&self, row: &FeatureRow) -> Result<f64> {
        self.trees
            .iter()
            .try_fold(self.base_score, |acc, tree| Ok(acc + tree.evaluate(row)?))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    OneHotLinear(OneHotLinearModel),
    TreeEnsemble(TreeEnsembleModel),
}

impl ModelArtifact {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let artifact_error = |message: String| ServiceError::ModelArtifact {
            path: path.display().to_string(),
            message,
        };

        let content = std::fs::read_to_string(path).map_err(|e| artifact_error(e.to_string()))?;
        let artifact: ModelArtifact =
            serde_json::from_str(&content).map_err(|e| artifact_error(e.to_string()))?;
        artifact.check_columns().map_err(artifact_error)?;
        Ok(artifact)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::OneHotLinear(_) => "one_hot_linear",
            ModelArtifact::TreeEnsemble(_) => "tree_ensemble",
        }
    }

    /// 模型引用的欄位必須屬於訓練 schema
    fn check_columns(&self) -> std::result::Result<(), String> {
        let columns: Vec<&str> = match self {
            ModelArtifact::OneHotLinear(model) => model.columns().map(String::as_str).collect(),
            ModelArtifact::TreeEnsemble(model) => {
                let mut out = Vec::new();
                for tree in &model.trees {
                    tree.collect_columns(&mut out);
                }
                out
            }
        };

        match columns.iter().find(|c| !FeatureRow::COLUMNS.contains(c)) {
            Some(unknown) => Err(format!(
                "column '{}' is not one of {}",
                unknown,
                FeatureRow::COLUMNS.join(", ")
            )),
            None => Ok(()),
        }
    }
}

impl Regressor for ModelArtifact {
    fn predict(&self, row: &FeatureRow) -> Result<f64> {
        match self {
            ModelArtifact::OneHotLinear(model) => {
                Ok(model.target.apply(model.raw_predict(row)?))
            }
            ModelArtifact::TreeEnsemble(model) => {
                Ok(model.target.apply(model.raw_predict(row)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn row(company: &str, name: &str, year: i64, kms: i64, fuel: &str) -> FeatureRow {
        FeatureRow {
            company: company.to_string(),
            name: name.to_string(),
            year,
            kms_driven: kms,
            fuel_type: fuel.to_string(),
        }
    }

    fn linear_json() -> &'static str {
        r#"{
            "kind": "one_hot_linear",
            "intercept": -1000.0,
            "coefficients": {"year": 1.0, "kms_driven": -0.01},
            "categories": {
                "company": {"Hyundai": 100.0, "Maruti": 50.0},
                "fuel_type": {"Petrol": 10.0, "Diesel": 20.0}
            }
        }"#
    }

    #[test]
    fn test_linear_prediction() {
        let artifact: ModelArtifact = serde_json::from_str(linear_json()).unwrap();
        let price = artifact
            .predict(&row("Hyundai", "Hyundai Creta", 2019, 1000, "Petrol"))
            .unwrap();
        // -1000 + 2019 - 10 + 100 + 10
        assert!((price - 1119.0).abs() < 1e-9);
        assert_eq!(artifact.kind(), "one_hot_linear");
    }

    #[test]
    fn test_linear_unknown_category_is_prediction_error() {
        let artifact: ModelArtifact = serde_json::from_str(linear_json()).unwrap();
        let err = artifact
            .predict(&row("Toyoto", "Toyota Innova", 2019, 1000, "Petrol"))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Prediction { .. }));
        assert!(err.to_string().contains("Toyoto"));
    }

    #[test]
    fn test_log_target_is_exponentiated() {
        let artifact: ModelArtifact = serde_json::from_str(
            r#"{"kind": "one_hot_linear", "intercept": 2.0, "target": "log"}"#,
        )
        .unwrap();
        let price = artifact
            .predict(&row("Kia", "Kia Seltos", 2020, 0, "Diesel"))
            .unwrap();
        assert!((price - 2.0_f64.exp()).abs() < 1e-9);
    }

    #[test]
    fn test_tree_ensemble_prediction() {
        let artifact: ModelArtifact = serde_json::from_str(
            r#"{
                "kind": "tree_ensemble",
                "base_score": 100000.0,
                "trees": [
                    {"Node": {
                        "column": "year",
                        "split": {"threshold": 2015.0},
                        "left": {"Leaf": {"value": -20000.0}},
                        "right": {"Leaf": {"value": 50000.0}}
                    }},
                    {"Node": {
                        "column": "fuel_type",
                        "split": {"category": "Diesel"},
                        "left": {"Leaf": {"value": 15000.0}},
                        "right": {"Leaf": {"value": 0.0}}
                    }}
                ]
            }"#,
        )
        .unwrap();

        let new_diesel = artifact
            .predict(&row("Tata", "Tata Nexon", 2019, 10, "Diesel"))
            .unwrap();
        assert_eq!(new_diesel, 165000.0);

        let old_petrol = artifact
            .predict(&row("Tata", "Tata Indica", 2015, 10, "Petrol"))
            .unwrap();
        assert_eq!(old_petrol, 80000.0);
    }

    #[test]
    fn test_mismatched_split_type_is_prediction_error() {
        let artifact = ModelArtifact::TreeEnsemble(TreeEnsembleModel {
            base_score: 0.0,
            trees: vec![TreeNode::Node(SplitNode {
                column: "company".to_string(),
                split: SplitCondition::Threshold(1.0),
                left: Box::new(TreeNode::Leaf { value: 1.0 }),
                right: Box::new(TreeNode::Leaf { value: 2.0 }),
            })],
            target: TargetTransform::Identity,
        });
        assert!(artifact
            .predict(&row("Kia", "Kia Seltos", 2020, 0, "Diesel"))
            .is_err());
    }

    #[test]
    fn test_from_file_rejects_unknown_columns() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"kind": "one_hot_linear", "intercept": 0.0, "coefficients": {{"engine_cc": 1.0}}}}"#
        )
        .unwrap();

        let err = ModelArtifact::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ServiceError::ModelArtifact { .. }));
        assert!(err.to_string().contains("engine_cc"));
    }
}
