//! Shipped catalog seed data

use crate::dataset::{Access, Catalog, CatalogError, DatasetRecord, QuickStats};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// The six datasets shipped with the catalog
pub fn seed_records() -> Vec<DatasetRecord> {
    vec![
        DatasetRecord {
            id: "plfs".to_string(),
            name: "Periodic Labour Force Survey (PLFS)".to_string(),
            theme: "labour".to_string(),
            access: Access::Public,
            versions: strings(&["2021_q4", "2022_q3", "2023_q1"]),
            description: "Unit-level labour force indicators across India.".to_string(),
            variables: strings(&[
                "state",
                "gender",
                "age",
                "employment_status",
                "sector",
                "wage_monthly",
            ]),
            quick: QuickStats::new("5,200,000", "2024-12-31"),
        },
        DatasetRecord {
            id: "hces".to_string(),
            name: "Household Consumer Expenditure Survey (HCES)".to_string(),
            theme: "consumption".to_string(),
            access: Access::Premium,
            versions: strings(&["2018", "2022"]),
            description: "Household consumption and expenditure patterns.".to_string(),
            variables: strings(&["state", "sector", "mpce", "education", "household_size"]),
            quick: QuickStats::new("1,800,000", "2023-06-10"),
        },
        DatasetRecord {
            id: "nss75".to_string(),
            name: "NSS 75th Round – Health".to_string(),
            theme: "consumption".to_string(),
            access: Access::Public,
            versions: strings(&["2019"]),
            description: "Health and morbidity data from NSS.".to_string(),
            variables: strings(&["state", "age", "gender", "ailment", "treatment_type"]),
            quick: QuickStats::new("750,000", "2020-03-01"),
        },
        DatasetRecord {
            id: "census2011".to_string(),
            name: "Census 2011 Microdata".to_string(),
            theme: "demographics".to_string(),
            access: Access::Premium,
            versions: strings(&["2011"]),
            description: "Detailed demographic and socio-economic data from Census 2011."
                .to_string(),
            variables: strings(&["state", "district", "age", "gender", "education", "occupation"]),
            quick: QuickStats::new("12,000,000", "2012-06-15"),
        },
        DatasetRecord {
            id: "aidis".to_string(),
            name: "All India Debt and Investment Survey (AIDIS)".to_string(),
            theme: "finance".to_string(),
            access: Access::Public,
            versions: strings(&["2019_jan", "2019_dec"]),
            description: "Household debt and investment patterns across India.".to_string(),
            variables: strings(&["state", "sector", "debt_amount", "investment_type", "income"]),
            quick: QuickStats::new("1,100,000", "2020-08-20"),
        },
        DatasetRecord {
            id: "shg".to_string(),
            name: "Self Help Group (SHG) Survey".to_string(),
            theme: "finance".to_string(),
            access: Access::Public,
            versions: strings(&["2020", "2021", "2022"]),
            description: "Self-help group membership and financial inclusion data.".to_string(),
            variables: strings(&["state", "gender", "age", "group_type", "savings_amount"]),
            quick: QuickStats::new("890,000", "2023-03-12"),
        },
    ]
}

/// The shipped catalog, validated
pub fn seed_catalog() -> Result<Catalog, CatalogError> {
    Catalog::new(seed_records())
}
