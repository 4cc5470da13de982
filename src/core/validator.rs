use crate::domain::model::{CategoryField, CategorySet, PredictionRequest};
use crate::utils::error::ValidationError;

/// 合法選項字串超過此長度時只回報數量
pub const DEFAULT_ALTERNATIVES_LIMIT: usize = 200;

pub const YEAR_MIN: i64 = 1990;
pub const YEAR_MAX: i64 = 2025;
pub const KMS_DRIVEN_MIN: i64 = 0;
pub const KMS_DRIVEN_MAX: i64 = 1_000_000;

#[derive(Debug, Clone, Copy)]
pub struct InputValidator {
    alternatives_limit: usize,
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new(DEFAULT_ALTERNATIVES_LIMIT)
    }
}

impl InputValidator {
    pub fn new(alternatives_limit: usize) -> Self {
        Self { alternatives_limit }
    }

    pub fn alternatives_limit(&self) -> usize {
        self.alternatives_limit
    }

    /// 依固定順序驗證各欄位, 類別欄位改寫成訓練資料中的大小寫。
    /// 只回報第一個失敗的欄位。
    pub fn validate(
        &self,
        mut request: PredictionRequest,
        categories: &CategorySet,
    ) -> Result<PredictionRequest, ValidationError> {
        for field in CategoryField::ALL {
            let valid = categories.valid_values(field);
            if let Some(canonical) =
                self.canonicalize(field, request.category_value(field), valid)?
            {
                request.set_category_value(field, canonical);
            }
        }

        check_range("year", request.year, YEAR_MIN, YEAR_MAX)?;
        check_range(
            "kms_driven",
            request.kms_driven,
            KMS_DRIVEN_MIN,
            KMS_DRIVEN_MAX,
        )?;

        Ok(request)
    }

    /// `Ok(None)` 表示沒有參考資料, 原值放行
    fn canonicalize(
        &self,
        field: CategoryField,
        value: &str,
        valid: &[String],
    ) -> Result<Option<String>, ValidationError> {
        if valid.is_empty() {
            return Ok(None);
        }

        let lowered = value.to_lowercase();
        if let Some(canonical) = valid.iter().find(|v| v.to_lowercase() == lowered) {
            return Ok(Some(canonical.clone()));
        }

        Err(ValidationError::UnknownCategory {
            field: field.request_name().to_string(),
            value: value.to_string(),
            options: self.describe_alternatives(valid),
        })
    }

    fn describe_alternatives(&self, valid: &[String]) -> String {
        let mut sorted: Vec<&str> = valid.iter().map(String::as_str).collect();
        sorted.sort_unstable();

        let joined = sorted.join(", ");
        if joined.chars().count() > self.alternatives_limit {
            format!(
                "{} valid options available. Use /categories endpoint to see all.",
                valid.len()
            )
        } else {
            joined
        }
    }
}

fn check_range(field: &str, value: i64, min: i64, max: i64) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> CategorySet {
        CategorySet {
            companies: vec!["Hyundai".to_string(), "Maruti".to_string()],
            model_names: vec!["Hyundai Creta".to_string(), "Maruti Swift".to_string()],
            fuel_types: vec!["Diesel".to_string(), "Petrol".to_string()],
            model_company_pairs: vec![],
        }
    }

    fn request(company: &str, name: &str, fuel: &str) -> PredictionRequest {
        PredictionRequest {
            company: company.to_string(),
            name: name.to_string(),
            year: 2019,
            kms_driven: 35000,
            fuel_type: fuel.to_string(),
        }
    }

    #[test]
    fn test_any_casing_maps_to_canonical_value() {
        let validator = InputValidator::default();
        for (company, name, fuel) in [
            ("maruti", "maruti swift", "petrol"),
            ("MARUTI", "MARUTI SWIFT", "PETROL"),
            ("mAruTi", "Maruti SWIFT", "Petrol"),
        ] {
            let out = validator
                .validate(request(company, name, fuel), &categories())
                .unwrap();
            assert_eq!(out.company, "Maruti");
            assert_eq!(out.name, "Maruti Swift");
            assert_eq!(out.fuel_type, "Petrol");
        }
    }

    #[test]
    fn test_unknown_value_lists_only_valid_options() {
        let err = InputValidator::default()
            .validate(request("Toyoto", "Hyundai Creta", "Petrol"), &categories())
            .unwrap_err();

        match err {
            ValidationError::UnknownCategory {
                field,
                value,
                options,
            } => {
                assert_eq!(field, "company");
                assert_eq!(value, "Toyoto");
                assert_eq!(options, "Hyundai, Maruti");
                assert!(!options.contains("Toyoto"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_first_failing_field_is_reported() {
        let err = InputValidator::default()
            .validate(request("Hyundai", "Tesla Model 3", "Electric"), &categories())
            .unwrap_err();
        assert_eq!(err.field(), "name");
    }

    #[test]
    fn test_long_alternatives_become_count() {
        let mut set = categories();
        set.model_names = (0..40).map(|i| format!("Model Number {:02}", i)).collect();

        let err = InputValidator::default()
            .validate(request("Hyundai", "Unknown", "Petrol"), &set)
            .unwrap_err();
        assert!(err
            .to_string()
            .ends_with("40 valid options available. Use /categories endpoint to see all."));
    }

    #[test]
    fn test_alternatives_at_limit_are_listed_in_full() {
        let names_with_last = |last: &str| {
            let mut names: Vec<String> = (0..19).map(|i| format!("Model {:02}", i)).collect();
            names.push(last.to_string());
            names
        };

        let mut set = categories();
        set.model_names = names_with_last("Model 19XL");
        let joined = set.model_names.join(", ");
        assert_eq!(joined.chars().count(), DEFAULT_ALTERNATIVES_LIMIT);

        let err = InputValidator::default()
            .validate(request("Hyundai", "Unknown", "Petrol"), &set)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Invalid name: 'Unknown'. Must be one of: {}", joined)
        );

        // 多一個字元就改為只回報數量
        set.model_names = names_with_last("Model 19XXL");
        assert_eq!(
            set.model_names.join(", ").chars().count(),
            DEFAULT_ALTERNATIVES_LIMIT + 1
        );
        let err = InputValidator::default()
            .validate(request("Hyundai", "Unknown", "Petrol"), &set)
            .unwrap_err();
        assert!(err
            .to_string()
            .ends_with("20 valid options available. Use /categories endpoint to see all."));
    }

    #[test]
    fn test_alternatives_limit_is_configurable() {
        let err = InputValidator::new(5)
            .validate(request("Toyoto", "Hyundai Creta", "Petrol"), &categories())
            .unwrap_err();
        assert!(err.to_string().contains("2 valid options available"));
    }

    #[test]
    fn test_empty_categories_accept_anything() {
        let out = InputValidator::default()
            .validate(request("whatever", "any car", "steam"), &CategorySet::default())
            .unwrap();
        assert_eq!(out.company, "whatever");
        assert_eq!(out.name, "any car");
        assert_eq!(out.fuel_type, "steam");
    }

    #[test]
    fn test_range_boundaries_are_inclusive() {
        let validator = InputValidator::default();
        let set = CategorySet::default();

        for (year, kms) in [(1990, 0), (2025, 1_000_000), (2005, 500)] {
            let mut req = request("a", "b", "c");
            req.year = year;
            req.kms_driven = kms;
            assert!(validator.validate(req, &set).is_ok());
        }

        for (year, kms, field) in [
            (1989, 0, "year"),
            (2026, 0, "year"),
            (2000, -1, "kms_driven"),
            (2000, 1_000_001, "kms_driven"),
        ] {
            let mut req = request("a", "b", "c");
            req.year = year;
            req.kms_driven = kms;
            let err = validator.validate(req, &set).unwrap_err();
            assert_eq!(err.field(), field);
            assert!(matches!(err, ValidationError::OutOfRange { .. }));
        }
    }

    #[test]
    fn test_range_message_names_bounds() {
        let mut req = request("a", "b", "c");
        req.year = 1980;
        let err = InputValidator::default()
            .validate(req, &CategorySet::default())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid year: 1980. Must be between 1990 and 2025"
        );
    }
}
