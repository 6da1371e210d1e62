//! Field definitions grouped by domain slice. Record schemas clone these
//! rather than restating constraints per form.

use serde_json::json;

use crate::expr::Expr;
use crate::file::{MEDIA_JPEG, MEDIA_PDF, MEDIA_PNG};
use crate::spec::field::{Check, FieldKind, FieldSpec, ListSpec};
use crate::transform::{BlurAction, InputMask};

pub const PHONE_PATTERN: &str = r"^\+?[0-9\s\-()]{5,20}$";
pub const PHONE_MESSAGE: &str = "Please enter a valid phone number including country code";
pub const CARD_NUMBER_PATTERN: &str = r"^\d{4}\s\d{4}\s\d{4}\s\d{4}$";
pub const EXPIRY_PATTERN: &str = r"^(0[1-9]|1[0-2])\s/\s\d{2}$";
pub const CVC_PATTERN: &str = r"^\d{3,4}$";

pub const PAYMENT_METHODS: &[&str] = &["cod", "card"];
pub const LOAN_PURPOSES: &[&str] = &[
    "Education",
    "Business",
    "Home Improvement",
    "House Buying",
    "Investment",
    "Other",
];
pub const MARITAL_STATUSES: &[&str] = &["Single", "Married", "Divorced"];

fn text(id: &str, label: &str) -> FieldSpec {
    FieldSpec::new(id, FieldKind::String, label)
}

fn required_text(id: &str, label: &str, min_len: usize, message: &str) -> FieldSpec {
    text(id, label).required(message).min_len(min_len, message)
}

fn amount(id: &str, label: &str, message: &str) -> FieldSpec {
    FieldSpec::new(id, FieldKind::Number, label)
        .mask(InputMask::Numeric)
        .required(message)
        .invalid_type(message)
        .min(0.0, message)
}

pub fn email() -> FieldSpec {
    text("email", "Email")
        .required("Invalid email")
        .check(Check::Email, "Invalid email")
}

/// International phone number. A missing value reads as empty text and fails
/// with the same message as a malformed one.
pub fn phone() -> FieldSpec {
    text("phone", "Phone")
        .mask(InputMask::Phone)
        .required(PHONE_MESSAGE)
        .pattern(PHONE_PATTERN, PHONE_MESSAGE)
}

pub mod personal {
    use super::*;

    pub fn name() -> FieldSpec {
        required_text("name", "Name", 2, "Name is required")
    }

    pub fn email() -> FieldSpec {
        super::email()
    }

    pub fn phone() -> FieldSpec {
        let mut field = super::phone();
        field.messages.required = Some("Phone number is too short".into());
        field.min_len(10, "Phone number is too short")
    }
}

pub mod shipping {
    use super::*;

    pub fn address() -> FieldSpec {
        required_text("address", "Address", 5, "Address is required")
    }

    pub fn city() -> FieldSpec {
        required_text("city", "City", 2, "City is required")
    }

    /// ZIP codes are coerced to numbers; text that does not parse gets its
    /// own message before the range check runs.
    pub fn zip() -> FieldSpec {
        FieldSpec::new("zip", FieldKind::Number, "ZIP")
            .mask(InputMask::Numeric)
            .required("ZIP code required")
            .invalid_type("Please enter a number ZIP code")
            .min(3.0, "ZIP code required")
    }

    pub fn state() -> FieldSpec {
        required_text("state", "State", 2, "State is required")
    }
}

pub mod payment {
    use super::*;

    fn paying_by_card() -> Expr {
        Expr::equals("method", "card")
    }

    pub fn method() -> FieldSpec {
        FieldSpec::new("method", FieldKind::Enum, "Payment Method")
            .choices(PAYMENT_METHODS)
            .choice_labels(&[("cod", "Cash on Delivery"), ("card", "Card Payment")])
            .required("Select a payment method")
    }

    pub fn card_number() -> FieldSpec {
        text("cardNumber", "Card Number")
            .mask(InputMask::CardNumber)
            .active_if(paying_by_card())
            .pattern(
                CARD_NUMBER_PATTERN,
                "Card number must be 16 digits with 3 spaces between",
            )
    }

    pub fn expiry() -> FieldSpec {
        text("expiry", "Expiry Date")
            .mask(InputMask::Expiry)
            .validate_on_blur()
            .active_if(paying_by_card())
            .pattern(EXPIRY_PATTERN, "Use MM/YY format")
    }

    pub fn cvc() -> FieldSpec {
        text("cvc", "CVC")
            .active_if(paying_by_card())
            .pattern(CVC_PATTERN, "Invalid CVC")
    }

    pub fn same_billing_shipping() -> FieldSpec {
        FieldSpec::new(
            "sameBillingShipping",
            FieldKind::Boolean,
            "Billing address is same as for shipping",
        )
        .required("Confirm whether billing and shipping addresses match")
        .default_value(json!(true))
    }

    fn separate_billing() -> Expr {
        Expr::equals("sameBillingShipping", false)
    }

    pub fn billing_address() -> FieldSpec {
        text("billingAddress", "Billing Address").active_if(separate_billing())
    }

    pub fn billing_state() -> FieldSpec {
        text("billingState", "Billing State").active_if(separate_billing())
    }
}

pub mod loan {
    use super::*;

    pub fn loan_amount() -> FieldSpec {
        FieldSpec::new("loanAmount", FieldKind::Number, "Desired Loan Amount")
            .mask(InputMask::Numeric)
            .required("Enter a valid amount")
            .invalid_type("Enter a valid amount")
            .check(Check::Positive, "Must be greater than 0")
    }

    pub fn annual_income() -> FieldSpec {
        FieldSpec::new("annualIncome", FieldKind::Number, "Annual Income")
            .mask(InputMask::Numeric)
            .required("Enter a valid income")
            .invalid_type("Enter a valid income")
            .check(Check::Positive, "Must be greater than 0 for you to qualify")
    }

    pub fn bank_statement() -> FieldSpec {
        FieldSpec::new(
            "bankStatement",
            FieldKind::File,
            "Bank Statement (PDF, PNG, JPEG)",
        )
        .required("Bank statement is required")
        .invalid_type("Bank statement is required")
        .check(
            Check::MediaType {
                allow: vec![MEDIA_PDF.into(), MEDIA_PNG.into(), MEDIA_JPEG.into()],
            },
            "Only PDF, PNG, or JPEG formats are allowed",
        )
    }

    pub fn loan_purpose() -> FieldSpec {
        FieldSpec::new("loanPurpose", FieldKind::Enum, "Purpose of Loan")
            .choices(LOAN_PURPOSES)
            .required("Select a loan purpose")
    }

    pub fn other_purpose() -> FieldSpec {
        text("otherPurpose", "Other Purpose").active_if(Expr::equals("loanPurpose", "Other"))
    }
}

pub mod applicant {
    use super::*;

    pub fn title() -> FieldSpec {
        required_text(
            "title",
            "Title",
            1,
            "Please enter your title e.g. Mr., Mrs., Dr. etc.",
        )
    }

    pub fn first_name() -> FieldSpec {
        required_text("firstName", "First Name", 2, "Too short")
    }

    pub fn last_name() -> FieldSpec {
        required_text("lastName", "Last Name", 2, "Too short")
    }

    pub fn marital_status() -> FieldSpec {
        FieldSpec::new("maritalStatus", FieldKind::Enum, "Marital Status")
            .choices(MARITAL_STATUSES)
            .required("Select marital status")
    }

    pub fn street() -> FieldSpec {
        required_text("street", "Street", 1, "Required")
    }

    pub fn city() -> FieldSpec {
        required_text("city", "City", 1, "Required")
    }

    pub fn state() -> FieldSpec {
        required_text("state", "State", 1, "Required")
    }

    pub fn postal_code() -> FieldSpec {
        required_text("postalCode", "Postal/ZIP Code", 3, "Invalid postal/ZIP")
    }
}

pub mod employment {
    use super::*;

    pub fn occupation() -> FieldSpec {
        required_text(
            "occupation",
            "Occupation",
            1,
            "Please enter a descriptive occupation name",
        )
    }

    pub fn employer_first_name() -> FieldSpec {
        required_text(
            "employerFirstName",
            "Employer First Name",
            1,
            "Employer name is required (Write your own company name if you are self-employed)",
        )
    }

    pub fn employer_last_name() -> FieldSpec {
        text("employerLastName", "Employer Last Name")
    }

    pub fn company_name() -> FieldSpec {
        required_text(
            "companyName",
            "Company Name",
            1,
            "Current company name is required",
        )
    }

    pub fn years_experience() -> FieldSpec {
        amount(
            "yearsExperience",
            "Years of Experience",
            "Enter a valid number of years",
        )
        .on_blur(BlurAction::Floor)
    }
}

pub mod financials {
    use super::*;

    pub fn gross_monthly_income() -> FieldSpec {
        amount(
            "grossMonthlyIncome",
            "Gross Monthly Income",
            "Enter a valid amount",
        )
    }

    pub fn monthly_rent() -> FieldSpec {
        amount("monthlyRent", "Monthly Rent/Mortgage", "Enter a valid amount")
    }

    pub fn down_payment() -> FieldSpec {
        amount("downPayment", "Down Payment Amount", "Enter a valid amount")
    }

    pub fn comments() -> FieldSpec {
        text("comments", "Additional Comments")
    }
}

pub mod bank_reference {
    use super::*;

    /// Sub-fields of one bank reference entry. All optional, but a phone
    /// number that is present must be well formed.
    pub fn entry_fields() -> Vec<FieldSpec> {
        let mut phone = super::phone();
        phone.required = false;
        phone.label = "Contact".into();
        vec![
            text("institution", "Institution Name"),
            text("savingsAccount", "Savings Account Name"),
            phone,
            text("address", "Address"),
        ]
    }

    pub fn references() -> FieldSpec {
        FieldSpec::new("bankReferences", FieldKind::List, "Bank References")
            .list(ListSpec {
                min_items: None,
                max_items: None,
                fields: entry_fields(),
            })
            .default_value(json!([
                { "institution": "", "savingsAccount": "", "phone": "", "address": "" }
            ]))
    }
}

pub fn consent() -> FieldSpec {
    FieldSpec::new("consent", FieldKind::Boolean, "Consent")
        .required("Please show consent to the above actions")
        .invalid_type("Please show consent to the above actions")
        .check(Check::Accepted, "Please show consent to the above actions")
}
