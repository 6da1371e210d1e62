use crate::catalog::slices::{
    self, applicant, bank_reference, employment, financials, loan,
};
use crate::spec::field::FieldSpec;
use crate::spec::form::FormSpec;
use crate::spec::step::{StepKind, StepSpec};

pub const FORM_ID: &str = "loan";

fn in_section(section: &str, fields: Vec<FieldSpec>) -> Vec<FieldSpec> {
    fields
        .into_iter()
        .map(|field| field.section(section))
        .collect()
}

/// Loan application: one terminal step, sectioned into fieldsets.
pub fn build() -> FormSpec {
    let mut fields = Vec::new();
    fields.extend(in_section(
        "loan",
        vec![
            loan::loan_amount(),
            loan::annual_income(),
            loan::bank_statement(),
            loan::loan_purpose(),
            loan::other_purpose(),
        ],
    ));
    fields.extend(in_section(
        "personal",
        vec![
            applicant::title(),
            applicant::first_name(),
            applicant::last_name(),
            applicant::marital_status(),
            slices::email(),
            slices::phone(),
            applicant::street(),
            applicant::city(),
            applicant::state(),
            applicant::postal_code(),
        ],
    ));
    fields.extend(in_section(
        "employment",
        vec![
            employment::occupation(),
            employment::employer_first_name(),
            employment::employer_last_name(),
            employment::company_name(),
            employment::years_experience(),
        ],
    ));
    fields.extend(in_section(
        "financials",
        vec![
            financials::gross_monthly_income(),
            financials::monthly_rent(),
            financials::down_payment(),
            financials::comments(),
        ],
    ));
    fields.extend(in_section("references", vec![bank_reference::references()]));
    fields.extend(in_section("declarations", vec![slices::consent()]));

    let step = StepSpec {
        id: "application".into(),
        title: "Loan Application".into(),
        kind: StepKind::Fields,
        fields: fields.iter().map(|field| field.id.clone()).collect(),
        content: None,
    };

    FormSpec {
        id: FORM_ID.into(),
        title: "Loan Application Form".into(),
        version: "1.0.0".into(),
        description: None,
        steps: vec![step],
        validations: Vec::new(),
        fields,
    }
}
