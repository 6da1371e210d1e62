use crate::catalog::slices::{payment, personal, shipping};
use crate::expr::Expr;
use crate::spec::form::FormSpec;
use crate::spec::step::{DisplayContent, StepSpec};
use crate::spec::validation::CrossFieldValidation;

pub const FORM_ID: &str = "checkout";
pub const PRODUCT_NAME: &str = "Pure Glow Cream";
pub const PRODUCT_PRICE: &str = "UGX 115,000";

pub const PERSONAL_FIELDS: &[&str] = &["name", "email", "phone"];
pub const SHIPPING_FIELDS: &[&str] = &["address", "city", "zip", "state"];
pub const PAYMENT_FIELDS: &[&str] = &[
    "method",
    "cardNumber",
    "expiry",
    "cvc",
    "sameBillingShipping",
    "billingAddress",
    "billingState",
];

/// Card payments need every card detail; cash on delivery needs none.
pub fn card_details_rule() -> CrossFieldValidation {
    CrossFieldValidation {
        id: "card_details".into(),
        message: "All card details are required for card payment".into(),
        path: "cvc".into(),
        fields: vec![
            "method".into(),
            "cardNumber".into(),
            "expiry".into(),
            "cvc".into(),
        ],
        condition: Expr::all(vec![
            Expr::equals("method", "card"),
            Expr::negate(Expr::all(vec![
                Expr::filled("cardNumber"),
                Expr::filled("expiry"),
                Expr::filled("cvc"),
            ])),
        ]),
        code: Some("card_details_required".into()),
    }
}

pub fn billing_address_rule() -> CrossFieldValidation {
    CrossFieldValidation {
        id: "billing_address".into(),
        message: "Please enter separate billing address information".into(),
        path: "billingAddress".into(),
        fields: vec![
            "sameBillingShipping".into(),
            "billingAddress".into(),
            "billingState".into(),
        ],
        condition: Expr::all(vec![
            Expr::equals("sameBillingShipping", false),
            Expr::negate(Expr::all(vec![
                Expr::filled("billingAddress"),
                Expr::filled("billingState"),
            ])),
        ]),
        code: Some("billing_address_required".into()),
    }
}

pub fn build() -> FormSpec {
    FormSpec {
        id: FORM_ID.into(),
        title: "Checkout".into(),
        version: "1.0.0".into(),
        description: Some(format!("Order {PRODUCT_NAME}")),
        steps: vec![
            StepSpec::display(
                "product",
                "Product",
                DisplayContent {
                    heading: PRODUCT_NAME.into(),
                    lines: vec![
                        "A skin rejuvenating cream for radiant, glowing skin.".into(),
                        format!("Price: {PRODUCT_PRICE}"),
                    ],
                },
            ),
            StepSpec::fields("personal", "Personal Information", PERSONAL_FIELDS),
            StepSpec::fields("shipping", "Shipping", SHIPPING_FIELDS),
            StepSpec::fields("payment", "Payment", PAYMENT_FIELDS),
            StepSpec::review("review", "Review Your Order"),
        ],
        validations: vec![card_details_rule(), billing_address_rule()],
        fields: vec![
            personal::name(),
            personal::email(),
            personal::phone(),
            shipping::address(),
            shipping::city(),
            shipping::zip(),
            shipping::state(),
            payment::method(),
            payment::card_number(),
            payment::expiry(),
            payment::cvc(),
            payment::same_billing_shipping(),
            payment::billing_address(),
            payment::billing_state(),
        ],
    }
}
