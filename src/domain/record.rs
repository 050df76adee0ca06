// ============================================================
// Layer 3 — Customer Record Domain Type
// ============================================================
// One row of the churn CSV, typed once at parse time and never
// mutated afterwards.
//
// Column names follow the dataset header exactly, so serde renames
// map the mixed-case CSV headers onto snake_case fields.
//
// Reference: Rust Book §5 (Structs), §6 (Enums)

use serde::{Deserialize, Deserializer, Serialize};

// ─── ChurnLabel ───────────────────────────────────────────────────────────────
/// The binary target. Class indices are fixed:
///   0 = Retained ("No"), 1 = Churned ("Yes")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChurnLabel {
    #[serde(rename = "No")]
    Retained,
    #[serde(rename = "Yes")]
    Churned,
}

impl ChurnLabel {
    /// Number of target classes
    pub const COUNT: usize = 2;

    /// Labels in class-index order
    pub const ALL: [ChurnLabel; 2] = [ChurnLabel::Retained, ChurnLabel::Churned];

    pub fn class_index(self) -> usize {
        match self {
            ChurnLabel::Retained => 0,
            ChurnLabel::Churned  => 1,
        }
    }

    /// Human-readable name used for chart legends and tick labels
    pub fn display_name(self) -> &'static str {
        match self {
            ChurnLabel::Retained => "Retained",
            ChurnLabel::Churned  => "Churned",
        }
    }
}

/// Like `csv::invalid_option`, but "NaN" and "inf" cells are treated as
/// blank too, so every numeric value that survives parsing is finite.
fn finite_option<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(csv::invalid_option::<D, f64>(de)?.filter(|v| v.is_finite()))
}

// ─── CustomerRecord ───────────────────────────────────────────────────────────
/// A single customer. Categorical cells that are blank in the CSV are `None`;
/// numeric cells that are blank or unparsable are `None` as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    #[serde(rename = "customerID")]
    pub customer_id: String,

    pub gender: Option<String>,

    #[serde(rename = "SeniorCitizen", deserialize_with = "finite_option")]
    pub senior_citizen: Option<f64>,

    #[serde(rename = "Partner")]
    pub partner: Option<String>,

    #[serde(rename = "Dependents")]
    pub dependents: Option<String>,

    #[serde(deserialize_with = "finite_option")]
    pub tenure: Option<f64>,

    #[serde(rename = "PhoneService")]
    pub phone_service: Option<String>,

    #[serde(rename = "MultipleLines")]
    pub multiple_lines: Option<String>,

    #[serde(rename = "InternetService")]
    pub internet_service: Option<String>,

    #[serde(rename = "OnlineSecurity")]
    pub online_security: Option<String>,

    #[serde(rename = "OnlineBackup")]
    pub online_backup: Option<String>,

    #[serde(rename = "DeviceProtection")]
    pub device_protection: Option<String>,

    #[serde(rename = "TechSupport")]
    pub tech_support: Option<String>,

    #[serde(rename = "StreamingTV")]
    pub streaming_tv: Option<String>,

    #[serde(rename = "StreamingMovies")]
    pub streaming_movies: Option<String>,

    #[serde(rename = "Contract")]
    pub contract: Option<String>,

    #[serde(rename = "PaperlessBilling")]
    pub paperless_billing: Option<String>,

    #[serde(rename = "PaymentMethod")]
    pub payment_method: Option<String>,

    #[serde(rename = "MonthlyCharges", deserialize_with = "finite_option")]
    pub monthly_charges: Option<f64>,

    #[serde(rename = "TotalCharges", deserialize_with = "finite_option")]
    pub total_charges: Option<f64>,

    #[serde(rename = "Churn")]
    pub churn: ChurnLabel,
}

impl CustomerRecord {
    pub fn label(&self) -> ChurnLabel {
        self.churn
    }

    pub fn is_senior(&self) -> bool {
        self.senior_citizen == Some(1.0)
    }

    pub fn is_male(&self) -> bool {
        self.gender.as_deref() == Some("Male")
    }

    /// Value of a numeric feature, `None` when the cell was blank
    /// or not a finite number
    pub fn numeric(&self, feature: NumericFeature) -> Option<f64> {
        let value = match feature {
            NumericFeature::SeniorCitizen  => self.senior_citizen,
            NumericFeature::Tenure         => self.tenure,
            NumericFeature::MonthlyCharges => self.monthly_charges,
            NumericFeature::TotalCharges   => self.total_charges,
        };
        value.filter(|v| v.is_finite())
    }

    /// Value of a categorical feature, `None` when the cell was blank
    pub fn categorical(&self, feature: CategoricalFeature) -> Option<&str> {
        let value = match feature {
            CategoricalFeature::TechSupport      => &self.tech_support,
            CategoricalFeature::Contract         => &self.contract,
            CategoricalFeature::PaymentMethod    => &self.payment_method,
            CategoricalFeature::Gender           => &self.gender,
            CategoricalFeature::Partner          => &self.partner,
            CategoricalFeature::InternetService  => &self.internet_service,
            CategoricalFeature::Dependents       => &self.dependents,
            CategoricalFeature::PhoneService     => &self.phone_service,
            CategoricalFeature::StreamingTv      => &self.streaming_tv,
            CategoricalFeature::PaperlessBilling => &self.paperless_billing,
        };
        value.as_deref()
    }
}

// ─── Feature selection ────────────────────────────────────────────────────────
/// Numeric columns fed to the model, in column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericFeature {
    SeniorCitizen,
    Tenure,
    MonthlyCharges,
    TotalCharges,
}

impl NumericFeature {
    pub const ALL: [NumericFeature; 4] = [
        NumericFeature::SeniorCitizen,
        NumericFeature::Tenure,
        NumericFeature::MonthlyCharges,
        NumericFeature::TotalCharges,
    ];

    /// The CSV header name
    pub fn column_name(self) -> &'static str {
        match self {
            NumericFeature::SeniorCitizen  => "SeniorCitizen",
            NumericFeature::Tenure         => "tenure",
            NumericFeature::MonthlyCharges => "MonthlyCharges",
            NumericFeature::TotalCharges   => "TotalCharges",
        }
    }
}

/// Categorical columns fed to the model, in one-hot block order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoricalFeature {
    TechSupport,
    Contract,
    PaymentMethod,
    Gender,
    Partner,
    InternetService,
    Dependents,
    PhoneService,
    StreamingTv,
    PaperlessBilling,
}

impl CategoricalFeature {
    pub const ALL: [CategoricalFeature; 10] = [
        CategoricalFeature::TechSupport,
        CategoricalFeature::Contract,
        CategoricalFeature::PaymentMethod,
        CategoricalFeature::Gender,
        CategoricalFeature::Partner,
        CategoricalFeature::InternetService,
        CategoricalFeature::Dependents,
        CategoricalFeature::PhoneService,
        CategoricalFeature::StreamingTv,
        CategoricalFeature::PaperlessBilling,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            CategoricalFeature::TechSupport      => "TechSupport",
            CategoricalFeature::Contract         => "Contract",
            CategoricalFeature::PaymentMethod    => "PaymentMethod",
            CategoricalFeature::Gender           => "gender",
            CategoricalFeature::Partner          => "Partner",
            CategoricalFeature::InternetService  => "InternetService",
            CategoricalFeature::Dependents       => "Dependents",
            CategoricalFeature::PhoneService     => "PhoneService",
            CategoricalFeature::StreamingTv      => "StreamingTV",
            CategoricalFeature::PaperlessBilling => "PaperlessBilling",
        }
    }
}

// ─── Test fixtures ────────────────────────────────────────────────────────────
#[cfg(test)]
pub mod fixtures {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    /// A fully populated record with the given label
    pub fn record(id: &str, churn: ChurnLabel) -> CustomerRecord {
        CustomerRecord {
            customer_id:       id.to_string(),
            gender:            Some("Female".into()),
            senior_citizen:    Some(0.0),
            partner:           Some("Yes".into()),
            dependents:        Some("No".into()),
            tenure:            Some(12.0),
            phone_service:     Some("Yes".into()),
            multiple_lines:    Some("No".into()),
            internet_service:  Some("DSL".into()),
            online_security:   Some("No".into()),
            online_backup:     Some("Yes".into()),
            device_protection: Some("No".into()),
            tech_support:      Some("No".into()),
            streaming_tv:      Some("No".into()),
            streaming_movies:  Some("No".into()),
            contract:          Some("Month-to-month".into()),
            paperless_billing: Some("Yes".into()),
            payment_method:    Some("Electronic check".into()),
            monthly_charges:   Some(50.0),
            total_charges:     Some(600.0),
            churn,
        }
    }

    /// Seeded synthetic customers where short-tenure, month-to-month,
    /// high-charge customers tend to churn
    pub fn synthetic(n: usize, seed: u64) -> Vec<CustomerRecord> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|i| {
                let tenure: f64  = rng.gen_range(0.0..72.0);
                let monthly: f64 = rng.gen_range(20.0..120.0);
                let monthly_contract = rng.gen_bool(0.5);
                let risk = (monthly / 120.0) + if monthly_contract { 0.5 } else { 0.0 }
                    - tenure / 72.0;
                let churn = if risk > 0.4 { ChurnLabel::Churned } else { ChurnLabel::Retained };

                let mut r = record(&format!("C{i:04}"), churn);
                r.gender          = Some(if rng.gen_bool(0.5) { "Male" } else { "Female" }.into());
                r.senior_citizen  = Some(if rng.gen_bool(0.2) { 1.0 } else { 0.0 });
                r.tenure          = Some(tenure.round());
                r.monthly_charges = Some(monthly);
                r.total_charges   = Some(monthly * tenure.round());
                r.contract        = Some(if monthly_contract { "Month-to-month" } else { "Two year" }.into());
                r
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_indices_are_fixed() {
        assert_eq!(ChurnLabel::Retained.class_index(), 0);
        assert_eq!(ChurnLabel::Churned.class_index(), 1);
        assert_eq!(ChurnLabel::ALL.map(ChurnLabel::class_index), [0, 1]);
    }

    #[test]
    fn test_feature_accessors() {
        let mut r = fixtures::record("A", ChurnLabel::Churned);
        r.total_charges = None;
        r.gender        = Some("Male".into());
        assert_eq!(r.numeric(NumericFeature::Tenure), Some(12.0));
        assert_eq!(r.numeric(NumericFeature::TotalCharges), None);
        assert_eq!(r.categorical(CategoricalFeature::Contract), Some("Month-to-month"));
        assert!(r.is_male());
        assert!(!r.is_senior());
    }

    #[test]
    fn test_non_finite_numeric_is_missing() {
        let mut r = fixtures::record("A", ChurnLabel::Retained);
        r.monthly_charges = Some(f64::NAN);
        r.total_charges   = Some(f64::INFINITY);
        assert_eq!(r.numeric(NumericFeature::MonthlyCharges), None);
        assert_eq!(r.numeric(NumericFeature::TotalCharges), None);
        assert_eq!(r.numeric(NumericFeature::Tenure), Some(12.0));
    }
}
