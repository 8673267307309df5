use creditier_core::{
    ConfigError, ExportConfig, ExportPlan, OutputSchema, PrepareOptions, Record, RuleFamily,
    Table,
};

fn borrower_table(len: usize) -> Table {
    let records = (0..len)
        .map(|value| {
            let available = 60.0 + (value % 10) as f64;
            Record::new(format!("{value:011}"), Some(available), Some(available * 10.0))
                .with_attribute("group", "Prefeitura SP")
                .with_attribute("registration_number", format!("M{value}"))
        })
        .collect();
    Table::from_records(records)
}

#[test]
fn multi_segment_tier_uses_parte_names() {
    let config = ExportConfig {
        chunk_limit: 40,
        ..ExportConfig::default()
    };
    let plan = ExportPlan::from_config(&config).expect("plan");
    let bundle = plan.run(&borrower_table(100)).expect("run");

    assert_eq!(bundle.family, RuleFamily::Ratio);
    assert_eq!(bundle.group_label, "Prefeitura SP");
    let heavy = bundle.tier("heavy_borrower").expect("heavy_borrower tier");
    assert_eq!(heavy.classified_rows, 100);
    let names: Vec<&str> = heavy
        .segments
        .iter()
        .map(|segment| segment.file_name.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "Prefeitura SP - heavy_borrower_parte1.csv",
            "Prefeitura SP - heavy_borrower_parte2.csv",
            "Prefeitura SP - heavy_borrower_parte3.csv",
        ]
    );
    assert_eq!(
        heavy.segments.iter().map(|s| s.table().len()).collect::<Vec<_>>(),
        vec![40, 40, 20]
    );
}

#[test]
fn tiers_follow_rule_order_then_remainder() {
    let plan = ExportPlan::from_config(&ExportConfig::default()).expect("plan");
    let bundle = plan.run(&borrower_table(3)).expect("run");
    let names: Vec<&str> = bundle.tiers.iter().map(|tier| tier.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["negatives", "below_50", "heavy_borrower", "borrower", "remainder"]
    );
}

#[test]
fn identical_inputs_produce_identical_bundles() {
    let config = ExportConfig {
        schema: "identifier_and_credential".to_string(),
        chunk_limit: 7,
        ..ExportConfig::default()
    };
    let plan = ExportPlan::from_config(&config).expect("plan");
    let table = borrower_table(50);
    assert_eq!(plan.run(&table).expect("first"), plan.run(&table).expect("second"));
}

#[test]
fn missing_registration_is_a_gap_not_an_error() {
    let config = ExportConfig {
        schema: "identifier_and_credential".to_string(),
        ..ExportConfig::default()
    };
    let plan = ExportPlan::from_config(&config).expect("plan");
    let table = Table::from_records(vec![Record::new("1", Some(5.0), Some(5.0))]);
    let bundle = plan.run(&table).expect("run");

    assert_eq!(bundle.schema, OutputSchema::IdentifierAndCredential);
    let below = bundle.tier("below_50").expect("below_50 tier");
    assert_eq!(below.classified_rows, 1);
    assert_eq!(below.projected_rows, 0);
    assert_eq!(below.gap.as_deref(), Some("registration_number"));
    assert!(below.segments.is_empty());
}

#[test]
fn preparation_deduplicates_before_classification() {
    let config = ExportConfig {
        prepare: PrepareOptions {
            sort_by_available: true,
            dedup_by_id: true,
        },
        ..ExportConfig::default()
    };
    let plan = ExportPlan::from_config(&config).expect("plan");
    let table = Table::from_records(vec![
        Record::new("7", Some(800.0), Some(800.0)),
        Record::new("7", Some(-3.0), Some(-3.0)),
        Record::new("8", Some(100.0), Some(100.0)),
    ]);
    let bundle = plan.run(&table).expect("run");

    assert_eq!(bundle.family, RuleFamily::Threshold);
    assert_eq!(bundle.tier("negatives").map(|t| t.classified_rows), Some(1));
    assert_eq!(bundle.tier("below_300").map(|t| t.classified_rows), Some(1));
    assert_eq!(bundle.tier("remainder").map(|t| t.classified_rows), Some(0));
    assert_eq!(table.len(), 3);
}

#[test]
fn data_quality_warnings_are_counted_not_raised() {
    let plan = ExportPlan::from_config(&ExportConfig::default()).expect("plan");
    let table = Table::from_records(vec![
        Record::new("1", None, Some(10.0)),
        Record::new("2", Some(70.0), Some(700.0)),
    ]);
    let bundle = plan.run(&table).expect("run");
    assert_eq!(bundle.data_quality_warnings, 1);
    assert_eq!(bundle.tier("remainder").map(|t| t.classified_rows), Some(1));
}

#[test]
fn configuration_errors_name_the_parameter() {
    let unknown_schema = ExportConfig {
        schema: "cpf_only".to_string(),
        ..ExportConfig::default()
    };
    assert_eq!(
        ExportPlan::from_config(&unknown_schema).unwrap_err(),
        ConfigError::UnknownOutputSchema("cpf_only".to_string())
    );

    let negative_limit = ExportConfig {
        chunk_limit: -1,
        ..ExportConfig::default()
    };
    assert_eq!(
        ExportPlan::from_config(&negative_limit).unwrap_err(),
        ConfigError::InvalidChunkLimit(-1)
    );

    let reserved = ExportConfig {
        remainder_tier: "borrower".to_string(),
        ..ExportConfig::default()
    };
    assert_eq!(
        ExportPlan::from_config(&reserved).unwrap_err(),
        ConfigError::ReservedTierName("borrower".to_string())
    );

    let nested_remainder = ExportConfig {
        remainder_tier: "rest/other".to_string(),
        ..ExportConfig::default()
    };
    assert_eq!(
        ExportPlan::from_config(&nested_remainder).unwrap_err(),
        ConfigError::UnsafeTierName("rest/other".to_string())
    );
}

#[test]
fn json_rules_configure_custom_ratio_tiers() {
    let config = ExportConfig::from_json(
        r#"{
            "chunk_limit": 2,
            "rules": {
                "equal_amounts": { "family": "threshold", "rules": [] },
                "distinct_amounts": {
                    "family": "ratio",
                    "rules": [
                        { "name": "high_risk",
                          "predicate": { "kind": "ratio", "below": 0.30 } },
                        { "name": "moderate_risk",
                          "predicate": { "kind": "ratio", "below": 0.60,
                                         "available": { "min": { "value": 50, "inclusive": true } } } }
                    ]
                }
            }
        }"#,
    )
    .expect("config should parse");
    let plan = ExportPlan::from_config(&config).expect("plan");
    let table = Table::from_records(vec![
        Record::new("1", Some(10.0), Some(100.0)),
        Record::new("2", Some(50.0), Some(100.0)),
        Record::new("3", Some(40.0), Some(100.0)),
        Record::new("4", Some(90.0), Some(100.0)),
    ]);
    let bundle = plan.run(&table).expect("run");

    assert_eq!(bundle.tier("high_risk").map(|t| t.classified_rows), Some(1));
    assert_eq!(bundle.tier("moderate_risk").map(|t| t.classified_rows), Some(1));
    assert_eq!(bundle.tier("remainder").map(|t| t.classified_rows), Some(2));
    assert_eq!(
        bundle.tier("remainder").expect("remainder").segments[0].file_name,
        "GROUP - remainder.csv"
    );
}
