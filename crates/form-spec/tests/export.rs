use proptest::prelude::*;
use time::OffsetDateTime;

use form_spec::{
    ExportError, ExportFormat, FieldAnswer, FieldDraft, FieldKind, FormDefinition, FormDraft,
    ResponseData, ResponseRecord, build_table, headers, render_csv,
};

fn satisfaction_form() -> FormDefinition {
    FormDraft::new(
        "Satisfaction",
        vec![
            FieldDraft::new("satisfaction", FieldKind::Dropdown)
                .with_options(["Yes", "No"])
                .required()
                .with_branch(
                    "No",
                    vec![FieldDraft::new("reason", FieldKind::Text).required()],
                ),
            FieldDraft::new("comment", FieldKind::Text),
        ],
    )
    .build(OffsetDateTime::UNIX_EPOCH, None)
    .expect("form builds")
}

fn record(form: &FormDefinition, answers: Vec<(&str, FieldAnswer)>) -> ResponseRecord {
    let data = answers
        .into_iter()
        .map(|(name, answer)| (name.to_string(), answer))
        .collect::<ResponseData>();
    ResponseRecord::new(form.uuid, data, OffsetDateTime::UNIX_EPOCH)
}

fn yes_and_no(form: &FormDefinition) -> Vec<ResponseRecord> {
    vec![
        record(form, vec![("satisfaction", FieldAnswer::new("Yes"))]),
        record(
            form,
            vec![(
                "satisfaction",
                FieldAnswer::new("No").with_sub_response("reason", "too slow"),
            )],
        ),
    ]
}

#[test]
fn headers_follow_form_order() {
    assert_eq!(
        headers(&satisfaction_form()),
        vec!["satisfaction", "satisfaction > No > reason", "comment"]
    );
}

#[test]
fn unselected_branch_leaves_an_empty_cell() {
    let form = satisfaction_form();
    let table = build_table(&form, &yes_and_no(&form));
    assert_eq!(table.rows[0], vec!["Yes", "", ""]);
    assert_eq!(table.rows[1], vec!["No", "too slow", ""]);
}

#[test]
fn csv_output() {
    let form = satisfaction_form();
    let csv = render_csv(&build_table(&form, &yes_and_no(&form)));
    insta::assert_snapshot!(csv.replace("\r\n", "\n").trim_end(), @r"
    Satisfaction
    satisfaction,satisfaction > No > reason,comment
    Yes,,
    No,too slow,
    ");
}

#[test]
fn excel_output_carries_every_row() {
    let form = satisfaction_form();
    let xml = ExportFormat::Excel
        .render(&build_table(&form, &yes_and_no(&form)))
        .expect("renders");
    assert_eq!(xml.matches("<Row>").count(), 4);
    assert!(xml.contains("<Data ss:Type=\"String\">satisfaction &gt; No &gt; reason</Data>"));
}

#[test]
fn excel_rejects_unrepresentable_text() {
    let form = satisfaction_form();
    let records = vec![record(
        &form,
        vec![("comment", FieldAnswer::new("null\u{0}byte"))],
    )];
    let err = ExportFormat::Excel
        .render(&build_table(&form, &records))
        .unwrap_err();
    assert_eq!(
        err,
        ExportError::Encoding {
            row: 2,
            column: 2,
            code_point: 0
        }
    );
}

#[test]
fn empty_response_list_still_has_headers() {
    let form = satisfaction_form();
    let csv = ExportFormat::Csv
        .render(&build_table(&form, &[]))
        .expect("renders");
    assert_eq!(
        csv,
        "Satisfaction\r\nsatisfaction,satisfaction > No > reason,comment\r\n"
    );
}

fn answer_strategy() -> impl Strategy<Value = Vec<(String, Option<String>, Option<String>)>> {
    let choice = prop_oneof![
        Just(String::new()),
        Just("Yes".to_string()),
        Just("No".to_string()),
    ];
    let text = || proptest::option::of("[a-zA-Z,\" \n]{0,10}");
    prop::collection::vec((choice, text(), text()), 0..8)
}

proptest! {
    #[test]
    fn tables_are_rectangular_and_stable(answers in answer_strategy()) {
        let form = satisfaction_form();
        let records = answers
            .into_iter()
            .map(|(choice, reason, comment)| {
                let mut satisfaction = FieldAnswer::new(choice);
                if let Some(reason) = reason {
                    satisfaction = satisfaction.with_sub_response("reason", reason);
                }
                let mut answers = vec![("satisfaction", satisfaction)];
                if let Some(comment) = comment {
                    answers.push(("comment", FieldAnswer::new(comment)));
                }
                record(&form, answers)
            })
            .collect::<Vec<_>>();

        let table = build_table(&form, &records);
        prop_assert_eq!(table.rows.len(), records.len());
        for row in &table.rows {
            prop_assert_eq!(row.len(), table.headers.len());
        }

        let again = build_table(&form, &records);
        prop_assert_eq!(render_csv(&table), render_csv(&again));
        prop_assert_eq!(
            ExportFormat::Excel.render(&table),
            ExportFormat::Excel.render(&again)
        );
    }
}
