//! Reconciliation behaviour: matching, no-op suppression, determinism.

use boardsync_core::{
    find_size, reconcile, DateRangeInName, FieldDefinition, FieldKind, FieldNames, FieldValue,
    Item, IterationOption, MutationRequest, NextReleaseOnOrAfter, NoRelease, ProjectCatalog,
    Reconciler, SingleSelectOption,
};
use chrono::NaiveDate;

const SIZES: [&str; 5] = ["XS", "S", "M", "L", "XL"];

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn catalog() -> ProjectCatalog {
    ProjectCatalog::new("PVT_1")
        .with_field(FieldDefinition::single_select(
            "F_estimate",
            "Estimate",
            SIZES
                .iter()
                .map(|s| SingleSelectOption::new(format!("est_{s}"), *s))
                .collect(),
        ))
        .with_field(FieldDefinition::single_select(
            "F_size",
            "Size",
            SIZES
                .iter()
                .map(|s| SingleSelectOption::new(format!("size_{s}"), *s))
                .collect(),
        ))
        .with_field(FieldDefinition::iteration(
            "F_week",
            "Week",
            vec![
                IterationOption::new("w10", "Week 10", date(2024, 3, 4), 14),
                IterationOption::new("w12", "Week 12", date(2024, 3, 18), 14),
            ],
            vec![IterationOption::new("w08", "Week 8", date(2024, 2, 19), 14)],
        ))
        .with_field(FieldDefinition::single_select(
            "F_release",
            "Release",
            vec![
                SingleSelectOption::new("rel_23", "v2.3 (2024-03-01 - 2024-03-31)"),
                SingleSelectOption::new("rel_24", "v2.4 (2024-04-01 - 2024-04-30)"),
            ],
        ))
}

fn due(item: Item, d: NaiveDate) -> Item {
    item.with_field("Due Date", FieldValue::Date { date: d })
}

fn estimate(item: Item, name: &str) -> Item {
    item.with_field(
        "Estimate",
        FieldValue::SingleSelect {
            option_id: format!("est_{name}"),
            name: name.to_string(),
        },
    )
}

/// Write the mutations back the way the board would store them.
fn apply(mut item: Item, catalog: &ProjectCatalog, mutations: &[MutationRequest]) -> Item {
    for m in mutations {
        let field = catalog.fields.iter().find(|f| f.id == m.field_id).unwrap();
        let value = match m.kind {
            FieldKind::Iteration => {
                let (_, its) = catalog.iterations(&field.name).unwrap();
                let it = its.iter().find(|i| i.id == m.value_id).unwrap();
                FieldValue::Iteration {
                    iteration_id: it.id.clone(),
                    title: it.title.clone(),
                }
            }
            FieldKind::SingleSelect => {
                let (_, opts) = catalog.single_select(&field.name).unwrap();
                let opt = opts.iter().find(|o| o.id == m.value_id).unwrap();
                FieldValue::SingleSelect {
                    option_id: opt.id.clone(),
                    name: opt.name.clone(),
                }
            }
        };
        item.fields.insert(field.name.clone(), value);
    }
    item
}

#[test]
fn due_date_matches_iteration_then_rerun_is_empty() {
    let catalog = catalog();
    let names = FieldNames::default();
    let item = due(Item::new("PVTI_1"), date(2024, 3, 10));

    let first = reconcile(&item, &catalog, &names, &NoRelease);
    assert_eq!(first.mutations.len(), 1);
    assert_eq!(first.mutations[0].field_id, "F_week");
    assert_eq!(first.mutations[0].kind, FieldKind::Iteration);
    assert_eq!(first.mutations[0].value_id, "w10");
    assert_eq!(first.changes[0].value, "Week 10");

    let item = apply(item, &catalog, &first.mutations);
    let second = reconcile(&item, &catalog, &names, &NoRelease);
    assert!(second.is_empty());
    assert!(second.changes.is_empty());
}

#[test]
fn full_derivation_converges_after_one_apply() {
    let catalog = catalog();
    let names = FieldNames::default();
    let item = estimate(due(Item::new("PVTI_1"), date(2024, 3, 10)), "M");

    let first = reconcile(&item, &catalog, &names, &DateRangeInName);
    let targets: Vec<_> = first
        .mutations
        .iter()
        .map(|m| m.value_id.as_str())
        .collect();
    assert_eq!(targets, vec!["size_M", "w10", "rel_23"]);

    let item = apply(item, &catalog, &first.mutations);
    assert!(reconcile(&item, &catalog, &names, &DateRangeInName).is_empty());
}

#[test]
fn start_date_belongs_to_iteration() {
    let item = due(Item::new("PVTI_1"), date(2024, 3, 4));
    let rec = reconcile(&item, &catalog(), &FieldNames::default(), &NoRelease);
    assert_eq!(rec.mutations[0].value_id, "w10");
}

#[test]
fn end_date_belongs_to_next_iteration() {
    let item = due(Item::new("PVTI_1"), date(2024, 3, 18));
    let rec = reconcile(&item, &catalog(), &FieldNames::default(), &NoRelease);
    assert_eq!(rec.mutations[0].value_id, "w12");
}

#[test]
fn completed_iterations_are_candidates() {
    let item = due(Item::new("PVTI_1"), date(2024, 2, 20));
    let rec = reconcile(&item, &catalog(), &FieldNames::default(), &NoRelease);
    assert_eq!(rec.mutations[0].value_id, "w08");
}

#[test]
fn no_due_date_means_no_week_or_release() {
    let item = estimate(Item::new("PVTI_1"), "L");
    let rec = reconcile(&item, &catalog(), &FieldNames::default(), &DateRangeInName);
    assert_eq!(rec.mutations.len(), 1);
    assert_eq!(rec.mutations[0].field_id, "F_size");
}

#[test]
fn no_estimate_means_no_size() {
    let item = due(Item::new("PVTI_1"), date(2024, 4, 2));
    let rec = reconcile(&item, &catalog(), &FieldNames::default(), &DateRangeInName);
    assert!(rec.mutations.iter().all(|m| m.field_id != "F_size"));
    assert_eq!(rec.mutations.len(), 1, "April 2nd has a release but no week");
    assert_eq!(rec.mutations[0].value_id, "rel_24");
}

#[test]
fn bare_item_produces_nothing() {
    let rec = reconcile(
        &Item::new("PVTI_1"),
        &catalog(),
        &FieldNames::default(),
        &DateRangeInName,
    );
    assert!(rec.is_empty());
}

#[test]
fn field_already_at_target_is_suppressed() {
    let item = estimate(Item::new("PVTI_1"), "S").with_field(
        "Size",
        FieldValue::SingleSelect {
            option_id: "size_S".to_string(),
            name: "S".to_string(),
        },
    );
    assert!(reconcile(&item, &catalog(), &FieldNames::default(), &NoRelease).is_empty());
}

#[test]
fn wrong_current_value_is_corrected() {
    let item = estimate(Item::new("PVTI_1"), "XL").with_field(
        "Size",
        FieldValue::SingleSelect {
            option_id: "size_S".to_string(),
            name: "S".to_string(),
        },
    );
    let rec = reconcile(&item, &catalog(), &FieldNames::default(), &NoRelease);
    assert_eq!(rec.mutations[0].value_id, "size_XL");
    assert_eq!(rec.changes[0].field, "Size");
    assert_eq!(rec.changes[0].value, "XL");
}

#[test]
fn unknown_estimate_leaves_size_untouched() {
    let item = estimate(Item::new("PVTI_1"), "XXL");
    assert!(reconcile(&item, &catalog(), &FieldNames::default(), &NoRelease).is_empty());
}

#[test]
fn every_estimate_option_has_a_same_named_size() {
    let catalog = catalog();
    let (_, estimates) = catalog.single_select("Estimate").unwrap();
    let (_, sizes) = catalog.single_select("Size").unwrap();

    for est in estimates {
        let size = find_size(sizes, &est.name)
            .unwrap_or_else(|| panic!("no Size option named {:?}", est.name));
        assert_eq!(size.name, est.name);
    }
}

#[test]
fn reconcile_is_deterministic() {
    let catalog = catalog();
    let names = FieldNames::default();
    let reconciler = Reconciler::new(&catalog, &names, &DateRangeInName);
    let item = estimate(due(Item::new("PVTI_1"), date(2024, 3, 25)), "XS");

    let a = reconciler.reconcile(&item);
    let b = reconciler.reconcile(&item);
    assert_eq!(a, b);
    assert_eq!(a.mutations.len(), 3);
}

#[test]
fn release_policy_is_pluggable() {
    let catalog = ProjectCatalog::new("PVT_1").with_field(FieldDefinition::single_select(
        "F_release",
        "Release",
        vec![
            SingleSelectOption::new("mar", "2024-03-29"),
            SingleSelectOption::new("apr", "2024-04-26"),
        ],
    ));
    let item = due(Item::new("PVTI_1"), date(2024, 4, 2));
    let names = FieldNames::default();

    assert!(reconcile(&item, &catalog, &names, &DateRangeInName).is_empty());
    let rec = reconcile(&item, &catalog, &names, &NextReleaseOnOrAfter);
    assert_eq!(rec.mutations[0].value_id, "apr");
}

#[test]
fn custom_field_names_are_honoured() {
    let names = FieldNames {
        due_date: "Target".to_string(),
        week: "Sprint".to_string(),
        ..FieldNames::default()
    };
    let catalog = ProjectCatalog::new("PVT_1").with_field(FieldDefinition::iteration(
        "F_sprint",
        "Sprint",
        vec![IterationOption::new("s1", "Sprint 1", date(2024, 3, 4), 14)],
        vec![],
    ));
    let item = Item::new("PVTI_1").with_field(
        "Target",
        FieldValue::Date {
            date: date(2024, 3, 5),
        },
    );

    let rec = reconcile(&item, &catalog, &names, &NoRelease);
    assert_eq!(rec.mutations[0].field_id, "F_sprint");
    assert_eq!(rec.changes[0].field, "Sprint");
}
