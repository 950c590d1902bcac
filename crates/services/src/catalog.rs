use std::collections::BTreeMap;
use std::sync::Arc;

use trainer_core::model::{HistoryEntry, TestId};

use crate::api::{BackendApi, SaveCategoryRequest};
use crate::error::CategoryError;

/// Mistake taxonomy and past-attempt history, backed by the API.
///
/// The category map is advisory UI data, so a failed fetch falls back to the
/// built-in taxonomy instead of blocking the flag-wrong dialog.
pub struct CategoryCatalog {
    api: Arc<dyn BackendApi>,
}

impl CategoryCatalog {
    #[must_use]
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self { api }
    }

    /// Category -> subcategories map for the flag-wrong dialog.
    pub async fn categories(&self) -> BTreeMap<String, Vec<String>> {
        match self.api.categories().await {
            Ok(map) if !map.is_empty() => map,
            Ok(_) => builtin_categories(),
            Err(err) => {
                tracing::warn!(error = %err, "category fetch failed, using built-in taxonomy");
                builtin_categories()
            }
        }
    }

    /// Attach a reviewed category to one wrong question after the fact.
    ///
    /// # Errors
    ///
    /// Returns `CategoryError::Rejected` when the backend refuses the
    /// assignment, or the transport failure.
    pub async fn save_category(
        &self,
        test_id: &TestId,
        question_number: u32,
        main_category: &str,
        sub_category: &str,
    ) -> Result<(), CategoryError> {
        let req = SaveCategoryRequest {
            test_id: test_id.clone(),
            question_number,
            main_category: main_category.to_string(),
            sub_category: sub_category.to_string(),
        };
        let response = self.api.save_category(&req).await?;
        if !response.success {
            return Err(CategoryError::Rejected);
        }
        Ok(())
    }

    /// Past attempts, newest first as the backend returns them.
    ///
    /// Rows with unparseable dates are dropped with a warning rather than
    /// failing the whole list.
    ///
    /// # Errors
    ///
    /// Returns the transport failure.
    pub async fn history(&self) -> Result<Vec<HistoryEntry>, CategoryError> {
        let rows = self.api.history().await?;
        let entries = rows
            .into_iter()
            .filter_map(|row| match row.into_entry() {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping history row with bad date");
                    None
                }
            })
            .collect();
        Ok(entries)
    }
}

/// Default mistake taxonomy, used when the backend has none configured.
#[must_use]
pub fn builtin_categories() -> BTreeMap<String, Vec<String>> {
    let entries: [(&str, &[&str]); 7] = [
        (
            "Arithmetic",
            &[
                "Addition",
                "Subtraction",
                "Multiplication",
                "Division",
                "Fractions",
                "Decimals",
            ],
        ),
        (
            "Algebra",
            &[
                "Linear Equations",
                "Quadratic Equations",
                "Systems of Equations",
                "Inequalities",
                "Functions",
            ],
        ),
        (
            "Geometry",
            &[
                "Angles",
                "Triangles",
                "Circles",
                "Area",
                "Volume",
                "Coordinate Geometry",
            ],
        ),
        (
            "Statistics",
            &[
                "Mean/Median/Mode",
                "Probability",
                "Data Analysis",
                "Standard Deviation",
            ],
        ),
        (
            "Number Theory",
            &[
                "Prime Numbers",
                "Factors",
                "Multiples",
                "GCD/LCM",
                "Modular Arithmetic",
            ],
        ),
        (
            "Calculus",
            &["Limits", "Derivatives", "Integrals", "Differential Equations"],
        ),
        (
            "Logic",
            &[
                "Word Problems",
                "Pattern Recognition",
                "Logical Reasoning",
                "Proof Techniques",
            ],
        ),
    ];

    entries
        .into_iter()
        .map(|(name, subs)| {
            (
                name.to_string(),
                subs.iter().map(ToString::to_string).collect(),
            )
        })
        .collect()
}
